// Application layer - Services and use cases
pub mod drum_loop;
pub mod normalizer;
pub mod poller;
pub mod progress_tracker;
pub mod status_service;
pub mod telemetry_client;
