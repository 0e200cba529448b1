// HTTP telemetry client implementation
use async_trait::async_trait;
use serde::Deserialize;

use crate::application::telemetry_client::{TelemetryClient, TelemetryError};
use crate::domain::reading::{RawBatch, RawReading};

#[derive(Debug, Clone)]
pub struct HttpTelemetryClient {
    endpoint: String,
    client: reqwest::Client,
}

impl HttpTelemetryClient {
    pub fn new(endpoint: String) -> Self {
        Self {
            endpoint,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl TelemetryClient for HttpTelemetryClient {
    async fn fetch(&self) -> Result<RawBatch, TelemetryError> {
        let response = self
            .client
            .get(&self.endpoint)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| TelemetryError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TelemetryError::Status(status.as_u16()));
        }

        let body = response
            .text()
            .await
            .map_err(|e| TelemetryError::Transport(e.to_string()))?;

        parse_batch(&body)
    }
}

/// Raw wire envelope. Readings are decoded element by element so one
/// malformed record never discards the rest of the batch.
#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    data: Vec<serde_json::Value>,
    #[serde(default)]
    count: i64,
}

pub(crate) fn parse_batch(body: &str) -> Result<RawBatch, TelemetryError> {
    let envelope: Envelope =
        serde_json::from_str(body).map_err(|e| TelemetryError::Parse(e.to_string()))?;

    let mut data = Vec::with_capacity(envelope.data.len());
    for value in envelope.data {
        match serde_json::from_value::<RawReading>(value) {
            Ok(reading) => data.push(reading),
            Err(e) => tracing::warn!(error = %e, "skipping malformed reading"),
        }
    }

    Ok(RawBatch {
        success: envelope.success,
        count: envelope.count,
        data,
    })
}
