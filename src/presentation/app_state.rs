// Application state for HTTP handlers
use crate::application::drum_loop::DrumRegistry;
use crate::application::status_service::MachineStatusService;

pub struct AppState {
    pub status_service: MachineStatusService,
    pub drums: DrumRegistry,
}
