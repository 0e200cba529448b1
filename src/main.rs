// Main entry point - Dependency injection and server setup
use std::{net::SocketAddr, sync::Arc, time::Duration};

use axum::{
    Router,
    routing::{get, post},
};

use washer_telemetry::application::drum_loop::DrumRegistry;
use washer_telemetry::application::poller::Poller;
use washer_telemetry::application::status_service::MachineStatusService;
use washer_telemetry::infrastructure::config::load_config;
use washer_telemetry::infrastructure::http_client::HttpTelemetryClient;
use washer_telemetry::presentation::app_state::AppState;
use washer_telemetry::presentation::handlers::{
    get_machine, health_check, list_machines, refresh,
};

/// Animation frame interval (~60 fps).
const FRAME_INTERVAL: Duration = Duration::from_millis(16);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    // Load configuration
    let config = load_config()?;

    // Create telemetry client (infrastructure layer)
    let client = Arc::new(HttpTelemetryClient::new(config.telemetry.endpoint.clone()));

    // Create services (application layer)
    let poller = Arc::new(Poller::new(client));
    poller.start(config.telemetry.poll_interval());
    let status_service = MachineStatusService::new(poller.clone(), config.machines.range());

    // Create application state
    let state = Arc::new(AppState {
        status_service,
        drums: DrumRegistry::new(FRAME_INTERVAL),
    });

    // Build router (presentation layer)
    let router = Router::new()
        .route("/healthz", get(health_check))
        .route("/machines", get(list_machines))
        .route("/machines/:id", get(get_machine))
        .route("/refresh", post(refresh))
        .with_state(state);

    // Start server
    let addr: SocketAddr = config.server.listen_addr.parse()?;
    tracing::info!("starting washer-telemetry service on {}", addr);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, router).await?;

    poller.stop();
    Ok(())
}
