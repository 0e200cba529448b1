// Status service - the surface view consumers read from
use std::ops::RangeInclusive;
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use crate::application::normalizer::normalize;
use crate::application::poller::Poller;
use crate::application::progress_tracker::ProgressTracker;
use crate::domain::machine::MachineView;

/// What the card grid, floor-plan map, and detail panel consume.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusSnapshot {
    pub machines: Vec<MachineView>,
    pub is_loading: bool,
    pub last_error: Option<String>,
}

pub struct MachineStatusService {
    poller: Arc<Poller>,
    range: RangeInclusive<u32>,
    tracker: Mutex<ProgressTracker>,
}

impl MachineStatusService {
    pub fn new(poller: Arc<Poller>, range: RangeInclusive<u32>) -> Self {
        Self {
            poller,
            range,
            tracker: Mutex::new(ProgressTracker::new()),
        }
    }

    /// Build the current view model. Normalization and estimation run
    /// synchronously over one batch snapshot, so a snapshot is never torn
    /// across two polls.
    pub async fn snapshot(&self) -> StatusSnapshot {
        let state = self.poller.current().await;
        let mut machines = state
            .latest
            .as_ref()
            .map(|batch| normalize(batch, &self.range))
            .unwrap_or_default();

        let mut tracker = self.tracker.lock().await;
        for view in &mut machines {
            tracker.apply(view);
        }

        StatusSnapshot {
            machines,
            is_loading: state.is_loading,
            last_error: state.last_error.map(|e| e.to_string()),
        }
    }

    /// Look up one machine for the detail panel. Selection only; nothing is
    /// mutated.
    pub async fn machine(&self, machine_id: &str) -> Option<MachineView> {
        self.snapshot()
            .await
            .machines
            .into_iter()
            .find(|view| view.machine_id == machine_id)
    }

    /// Manual refresh action. Fire and forget; the next snapshot picks up
    /// whatever has landed by then.
    pub fn refresh_now(&self) -> JoinHandle<()> {
        self.poller.refresh_now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    use crate::application::telemetry_client::{TelemetryClient, TelemetryError};
    use crate::domain::machine::CanonicalStatus;
    use crate::domain::reading::{Phase, RawBatch, RawReading, RawState};

    struct FixedClient {
        batch: RawBatch,
    }

    #[async_trait]
    impl TelemetryClient for FixedClient {
        async fn fetch(&self) -> Result<RawBatch, TelemetryError> {
            Ok(self.batch.clone())
        }
    }

    fn reading(machine_id: &str, state: RawState, phase: Option<Phase>) -> RawReading {
        let mut r = RawReading::default();
        r.data.machine_id = machine_id.to_string();
        r.data.state = state;
        r.data.ml_phase = phase;
        r.data.cycle_number = 3;
        r
    }

    fn service_with(batch: RawBatch) -> MachineStatusService {
        let poller = Arc::new(Poller::new(Arc::new(FixedClient { batch })));
        MachineStatusService::new(poller, 1..=4)
    }

    #[tokio::test]
    async fn test_empty_before_first_poll() {
        let service = service_with(RawBatch::default());
        let snapshot = service.snapshot().await;
        assert!(snapshot.machines.is_empty());
        assert!(snapshot.last_error.is_none());
    }

    #[tokio::test]
    async fn test_snapshot_fills_progress_for_running_machines() {
        let service = service_with(RawBatch {
            success: true,
            count: 2,
            data: vec![
                reading("WM-01", RawState::Running, Some(Phase::Spinning)),
                reading("WM-02", RawState::Idle, None),
            ],
        });
        service.refresh_now().await.unwrap();

        let snapshot = service.snapshot().await;
        assert_eq!(snapshot.machines.len(), 2);

        let running = &snapshot.machines[0];
        assert_eq!(running.status, CanonicalStatus::InUse);
        assert!(running.progress_percent >= 77.7);
        assert!(running.progress_percent <= 95.0);

        let idle = &snapshot.machines[1];
        assert_eq!(idle.progress_percent, 0.0);
        assert_eq!(idle.time_remaining_minutes, 0);
    }

    #[tokio::test]
    async fn test_progress_monotone_across_snapshots() {
        let service = service_with(RawBatch {
            success: true,
            count: 1,
            data: vec![reading("WM-01", RawState::Running, Some(Phase::Washing))],
        });
        service.refresh_now().await.unwrap();

        let mut last = 0.0;
        for _ in 0..20 {
            let snapshot = service.snapshot().await;
            let progress = snapshot.machines[0].progress_percent;
            assert!(progress >= last, "{progress} < {last}");
            last = progress;
        }
    }

    #[tokio::test]
    async fn test_machine_lookup() {
        let service = service_with(RawBatch {
            success: true,
            count: 1,
            data: vec![reading("WM-02", RawState::Occupied, None)],
        });
        service.refresh_now().await.unwrap();

        let view = service.machine("WM-02").await.unwrap();
        assert_eq!(view.status, CanonicalStatus::Occupied);
        assert!(service.machine("WM-09").await.is_none());
    }
}
