// Drum animation lifecycle - one frame loop per running machine
use std::collections::HashMap;
use std::time::Duration;

use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;

use crate::domain::drum::DrumState;
use crate::domain::machine::{CanonicalStatus, MachineView};

/// A running drum simulation. The task advances the state once per frame and
/// publishes it on a watch channel; readers only ever see a snapshot.
pub struct DrumLoop {
    state: watch::Receiver<DrumState>,
    task: JoinHandle<()>,
}

impl DrumLoop {
    pub fn spawn(initial: DrumState, frame: Duration) -> Self {
        let (tx, rx) = watch::channel(initial);
        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(frame);
            let mut state = initial;
            loop {
                ticker.tick().await;
                state = state.step();
                if tx.send(state).is_err() {
                    break;
                }
            }
        });
        Self { state: rx, task }
    }

    pub fn snapshot(&self) -> DrumState {
        *self.state.borrow()
    }

    /// Cancel the frame task outright. Stopping is not pausing; a new loop
    /// starts from a fresh state.
    pub fn stop(&self) {
        self.task.abort();
    }
}

impl Drop for DrumLoop {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Keeps exactly one loop per machine that is currently IN_USE and cancels
/// the rest, so no frame task outlives its card.
pub struct DrumRegistry {
    frame: Duration,
    loops: Mutex<HashMap<String, DrumLoop>>,
}

impl DrumRegistry {
    pub fn new(frame: Duration) -> Self {
        Self {
            frame,
            loops: Mutex::new(HashMap::new()),
        }
    }

    /// Reconcile the running loops against a full snapshot: a loop exists
    /// afterwards exactly for the IN_USE machines in `views`. Machines that
    /// dropped out of the snapshot lose their loop too.
    pub async fn sync(&self, views: &[MachineView]) {
        let mut loops = self.loops.lock().await;
        loops.retain(|machine_id, _| {
            views
                .iter()
                .any(|v| v.machine_id == *machine_id && v.status == CanonicalStatus::InUse)
        });
        for view in views {
            if view.status == CanonicalStatus::InUse {
                loops.entry(view.machine_id.clone()).or_insert_with(|| {
                    DrumLoop::spawn(DrumState::spawn(&mut rand::thread_rng()), self.frame)
                });
            }
        }
    }

    /// Upsert a single machine's loop to match its status (detail page path)
    /// without touching the other machines.
    pub async fn ensure(&self, view: &MachineView) {
        let mut loops = self.loops.lock().await;
        if view.status == CanonicalStatus::InUse {
            loops.entry(view.machine_id.clone()).or_insert_with(|| {
                DrumLoop::spawn(DrumState::spawn(&mut rand::thread_rng()), self.frame)
            });
        } else {
            loops.remove(&view.machine_id);
        }
    }

    pub async fn snapshot(&self, machine_id: &str) -> Option<DrumState> {
        let loops = self.loops.lock().await;
        loops.get(machine_id).map(|l| l.snapshot())
    }
}
