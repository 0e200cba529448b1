// Wash progress estimation
use rand::Rng;

use super::reading::Phase;

/// Full cycle length in minutes (20 + 15 + 10).
pub const TOTAL_MINUTES: f64 = 45.0;

/// Fixed duration of each phase in minutes.
pub fn phase_minutes(phase: Phase) -> f64 {
    match phase {
        Phase::Washing => 20.0,
        Phase::Rinse => 15.0,
        Phase::Spinning => 10.0,
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressEstimate {
    pub progress_percent: f64,
    pub time_remaining_minutes: u32,
    pub total_minutes: u32,
}

impl ProgressEstimate {
    /// The empty estimate for a machine that isn't running.
    pub fn idle() -> Self {
        Self {
            progress_percent: 0.0,
            time_remaining_minutes: 0,
            total_minutes: TOTAL_MINUTES as u32,
        }
    }
}

/// Estimate progress for a running machine. The telemetry source does not
/// report intra-phase timestamps, so the position within the current phase is
/// drawn uniformly from 30%-80% of that phase's duration.
pub fn estimate(phase: Option<Phase>, is_running: bool) -> ProgressEstimate {
    let fraction = rand::thread_rng().gen_range(0.30..=0.80);
    estimate_with_fraction(phase, is_running, fraction)
}

/// Deterministic core of the estimator: `fraction` is how far into the
/// current phase the cycle is assumed to be.
pub fn estimate_with_fraction(
    phase: Option<Phase>,
    is_running: bool,
    fraction: f64,
) -> ProgressEstimate {
    let Some(phase) = phase else {
        return ProgressEstimate::idle();
    };
    if !is_running {
        return ProgressEstimate::idle();
    }

    let completed: f64 = Phase::ALL
        .iter()
        .filter(|p| p.index() < phase.index())
        .map(|p| phase_minutes(*p))
        .sum();
    let elapsed = completed + fraction.clamp(0.0, 1.0) * phase_minutes(phase);

    // Capped below 100 until the machine actually stops reporting RUNNING,
    // so the view never claims completion early.
    let progress_percent = (100.0 * elapsed / TOTAL_MINUTES).min(95.0);
    let time_remaining_minutes = (TOTAL_MINUTES - elapsed).ceil().max(0.0) as u32;

    ProgressEstimate {
        progress_percent,
        time_remaining_minutes,
        total_minutes: TOTAL_MINUTES as u32,
    }
}
