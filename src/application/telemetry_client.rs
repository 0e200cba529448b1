// Client trait for the remote telemetry endpoint
use async_trait::async_trait;
use thiserror::Error;

use crate::domain::reading::RawBatch;

/// Failure taxonomy at the telemetry boundary. Cloneable so the poller can
/// keep the last failure around for the consumer surface.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TelemetryError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("telemetry endpoint returned status {0}")]
    Status(u16),
    #[error("malformed telemetry payload: {0}")]
    Parse(String),
}

/// One GET against the telemetry source. No retries here; the poller simply
/// tries again on its next tick.
#[async_trait]
pub trait TelemetryClient: Send + Sync {
    async fn fetch(&self) -> Result<RawBatch, TelemetryError>;
}
