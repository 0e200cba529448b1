// Application configuration
use std::ops::RangeInclusive;
use std::time::Duration;

use serde::Deserialize;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub telemetry: TelemetrySettings,
    #[serde(default)]
    pub machines: MachineSettings,
    #[serde(default)]
    pub server: ServerSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct TelemetrySettings {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

impl TelemetrySettings {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

impl Default for TelemetrySettings {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

/// Inclusive ordinal range of the washers this pipeline monitors. Devices
/// outside the range stay visible to other consumers but never reach the
/// grid or map.
#[derive(Debug, Deserialize, Clone)]
pub struct MachineSettings {
    #[serde(default = "default_range_lo")]
    pub range_lo: u32,
    #[serde(default = "default_range_hi")]
    pub range_hi: u32,
}

impl MachineSettings {
    pub fn range(&self) -> RangeInclusive<u32> {
        self.range_lo..=self.range_hi
    }
}

impl Default for MachineSettings {
    fn default() -> Self {
        Self {
            range_lo: default_range_lo(),
            range_hi: default_range_hi(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
        }
    }
}

fn default_endpoint() -> String {
    "https://iot-washer.duckdns.org/api/live".to_string()
}

fn default_poll_interval_ms() -> u64 {
    30_000
}

fn default_range_lo() -> u32 {
    1
}

fn default_range_hi() -> u32 {
    4
}

fn default_listen_addr() -> String {
    "0.0.0.0:8080".to_string()
}

/// Layered config: optional `config/default.toml`, then `WASHER__*`
/// environment overrides (e.g. `WASHER__TELEMETRY__ENDPOINT`).
pub fn load_config() -> anyhow::Result<AppConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/default").required(false))
        .add_source(config::Environment::with_prefix("WASHER").separator("__"))
        .build()?;

    Ok(settings.try_deserialize()?)
}
