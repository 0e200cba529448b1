// Progress tracker - keeps the published estimate monotone within a cycle
use std::collections::HashMap;

use crate::domain::machine::{CanonicalStatus, MachineView};
use crate::domain::progress::{estimate_with_fraction, ProgressEstimate};
use crate::domain::reading::Phase;
use rand::Rng;

/// The estimator draws a fresh random intra-phase fraction on every poll, so
/// two consecutive draws could move the bar backwards. This cache pins each
/// machine's published progress to be non-decreasing and its phase to only
/// move forward within one wash cycle. Entries reset when the cycle number
/// changes or the machine leaves IN_USE.
#[derive(Debug, Default)]
pub struct ProgressTracker {
    cycles: HashMap<String, CycleProgress>,
}

#[derive(Debug, Clone)]
struct CycleProgress {
    cycle_number: i64,
    phase: Option<Phase>,
    progress_percent: f64,
    time_remaining_minutes: u32,
}

impl ProgressTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fill in the progress fields of a freshly normalized view.
    pub fn apply(&mut self, view: &mut MachineView) {
        let fraction = rand::thread_rng().gen_range(0.30..=0.80);
        self.apply_with_fraction(view, fraction);
    }

    pub fn apply_with_fraction(&mut self, view: &mut MachineView, fraction: f64) {
        if view.status != CanonicalStatus::InUse {
            // Leaving IN_USE ends the cycle; the next one starts fresh.
            self.cycles.remove(&view.machine_id);
            return;
        }

        let previous = self
            .cycles
            .get(&view.machine_id)
            .filter(|prev| prev.cycle_number == view.cycle_number)
            .cloned();

        // Phase never moves backward within a cycle.
        let mut phase = view.phase;
        if let Some(prev) = &previous {
            if phase_rank(phase) < phase_rank(prev.phase) {
                phase = prev.phase;
            }
        }

        let est = estimate_with_fraction(phase, true, fraction);
        let ProgressEstimate {
            mut progress_percent,
            mut time_remaining_minutes,
            ..
        } = est;

        if let Some(prev) = &previous {
            if prev.progress_percent > progress_percent {
                progress_percent = prev.progress_percent;
                time_remaining_minutes = prev.time_remaining_minutes;
            }
        }

        view.phase = phase;
        view.progress_percent = progress_percent;
        view.time_remaining_minutes = time_remaining_minutes;

        self.cycles.insert(
            view.machine_id.clone(),
            CycleProgress {
                cycle_number: view.cycle_number,
                phase,
                progress_percent,
                time_remaining_minutes,
            },
        );
    }
}

/// `None` ranks below every phase so a machine that starts reporting a phase
/// mid-cycle is treated as moving forward.
fn phase_rank(phase: Option<Phase>) -> i8 {
    match phase {
        None => -1,
        Some(p) => p.index() as i8,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::reading::{RawReading, RawState};

    fn running_view(machine_id: &str, cycle: i64, phase: Option<Phase>) -> MachineView {
        let mut reading = RawReading::default();
        reading.data.machine_id = machine_id.to_string();
        reading.data.state = RawState::Running;
        reading.data.ml_phase = phase;
        reading.data.cycle_number = cycle;
        MachineView::from_reading(&reading)
    }

    fn idle_view(machine_id: &str) -> MachineView {
        let mut reading = RawReading::default();
        reading.data.machine_id = machine_id.to_string();
        reading.data.state = RawState::Idle;
        MachineView::from_reading(&reading)
    }

    #[test]
    fn test_progress_never_decreases_within_cycle() {
        let mut tracker = ProgressTracker::new();

        let mut first = running_view("WM-01", 7, Some(Phase::Rinse));
        tracker.apply_with_fraction(&mut first, 0.8);

        let mut second = running_view("WM-01", 7, Some(Phase::Rinse));
        tracker.apply_with_fraction(&mut second, 0.3);

        assert!(second.progress_percent >= first.progress_percent);
        assert_eq!(second.progress_percent, first.progress_percent);
        assert_eq!(
            second.time_remaining_minutes,
            first.time_remaining_minutes
        );
    }

    #[test]
    fn test_progress_advances_with_phase() {
        let mut tracker = ProgressTracker::new();

        let mut washing = running_view("WM-01", 7, Some(Phase::Washing));
        tracker.apply_with_fraction(&mut washing, 0.5);

        let mut spinning = running_view("WM-01", 7, Some(Phase::Spinning));
        tracker.apply_with_fraction(&mut spinning, 0.5);

        assert!(spinning.progress_percent > washing.progress_percent);
    }

    #[test]
    fn test_phase_never_moves_backward() {
        let mut tracker = ProgressTracker::new();

        let mut spinning = running_view("WM-01", 7, Some(Phase::Spinning));
        tracker.apply_with_fraction(&mut spinning, 0.5);

        let mut regressed = running_view("WM-01", 7, Some(Phase::Washing));
        tracker.apply_with_fraction(&mut regressed, 0.5);

        assert_eq!(regressed.phase, Some(Phase::Spinning));
        assert!(regressed.progress_percent >= spinning.progress_percent);
    }

    #[test]
    fn test_new_cycle_resets_progress() {
        let mut tracker = ProgressTracker::new();

        let mut old_cycle = running_view("WM-01", 7, Some(Phase::Spinning));
        tracker.apply_with_fraction(&mut old_cycle, 0.8);

        let mut new_cycle = running_view("WM-01", 8, Some(Phase::Washing));
        tracker.apply_with_fraction(&mut new_cycle, 0.3);

        assert_eq!(new_cycle.phase, Some(Phase::Washing));
        assert!(new_cycle.progress_percent < old_cycle.progress_percent);
    }

    #[test]
    fn test_leaving_in_use_clears_cache() {
        let mut tracker = ProgressTracker::new();

        let mut running = running_view("WM-01", 7, Some(Phase::Spinning));
        tracker.apply_with_fraction(&mut running, 0.8);

        let mut idle = idle_view("WM-01");
        tracker.apply_with_fraction(&mut idle, 0.5);
        assert_eq!(idle.progress_percent, 0.0);
        assert_eq!(idle.time_remaining_minutes, 0);

        // Same cycle number again counts as a fresh cycle after the gap.
        let mut restarted = running_view("WM-01", 7, Some(Phase::Washing));
        tracker.apply_with_fraction(&mut restarted, 0.3);
        assert_eq!(restarted.phase, Some(Phase::Washing));
        assert!(restarted.progress_percent < running.progress_percent);
    }

    #[test]
    fn test_machines_tracked_independently() {
        let mut tracker = ProgressTracker::new();

        let mut one = running_view("WM-01", 7, Some(Phase::Spinning));
        tracker.apply_with_fraction(&mut one, 0.8);

        let mut two = running_view("WM-02", 7, Some(Phase::Washing));
        tracker.apply_with_fraction(&mut two, 0.3);

        assert!(two.progress_percent < one.progress_percent);
    }
}
