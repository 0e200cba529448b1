// Poller service - drives the telemetry client on a fixed interval
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::task::JoinHandle;

use crate::application::telemetry_client::{TelemetryClient, TelemetryError};
use crate::domain::reading::RawBatch;

/// Latest poll result. `latest` is only ever replaced wholesale; on failure
/// the previous batch stays put so consumers keep rendering stale-but-valid
/// data next to the error.
#[derive(Debug, Clone, Default)]
pub struct PollState {
    pub latest: Option<RawBatch>,
    pub is_loading: bool,
    pub last_error: Option<TelemetryError>,
    // Fetches may overlap; the loading flag only clears when the last one
    // lands.
    in_flight: u32,
}

pub struct Poller {
    client: Arc<dyn TelemetryClient>,
    state: Arc<RwLock<PollState>>,
    timer: Mutex<Option<JoinHandle<()>>>,
}

impl Poller {
    pub fn new(client: Arc<dyn TelemetryClient>) -> Self {
        Self {
            client,
            state: Arc::new(RwLock::new(PollState::default())),
            timer: Mutex::new(None),
        }
    }

    /// Fetch immediately, then again every `every`. Idempotent: a second
    /// start while the timer runs is a no-op.
    pub fn start(&self, every: Duration) {
        let mut timer = self.timer.lock().unwrap_or_else(|e| e.into_inner());
        if timer.is_some() {
            tracing::debug!("poller already started, ignoring");
            return;
        }

        let client = self.client.clone();
        let state = self.state.clone();
        *timer = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            loop {
                // First tick completes immediately.
                ticker.tick().await;
                // Each fetch runs detached so a slow response never delays
                // the schedule; overlapping fetches race and the last
                // response to land wins the latest-batch slot.
                tokio::spawn(Self::run_fetch(client.clone(), state.clone()));
            }
        }));
    }

    /// Out-of-band fetch for the manual refresh action. Does not touch the
    /// timer's schedule. The returned handle may be dropped; the fetch keeps
    /// running either way.
    pub fn refresh_now(&self) -> JoinHandle<()> {
        tokio::spawn(Self::run_fetch(self.client.clone(), self.state.clone()))
    }

    /// Cancel the timer. An in-flight fetch is not cancelled and may still
    /// commit its result.
    pub fn stop(&self) {
        let mut timer = self.timer.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(handle) = timer.take() {
            handle.abort();
        }
    }

    /// Snapshot of the current poll state.
    pub async fn current(&self) -> PollState {
        self.state.read().await.clone()
    }

    async fn run_fetch(client: Arc<dyn TelemetryClient>, state: Arc<RwLock<PollState>>) {
        {
            let mut st = state.write().await;
            st.in_flight += 1;
            st.is_loading = true;
        }

        let result = client.fetch().await;

        let mut st = state.write().await;
        st.in_flight = st.in_flight.saturating_sub(1);
        st.is_loading = st.in_flight > 0;
        match result {
            Ok(batch) => {
                tracing::debug!(count = batch.data.len(), "poll succeeded");
                st.latest = Some(batch);
                st.last_error = None;
            }
            Err(e) => {
                tracing::warn!(error = %e, "poll failed, keeping last batch");
                st.last_error = Some(e);
            }
        }
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        self.stop();
    }
}
