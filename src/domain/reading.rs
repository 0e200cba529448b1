// Raw telemetry records as delivered by the device network
use serde::{Deserialize, Serialize};

/// One poll's worth of readings. Replaced wholesale on every successful fetch.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawBatch {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub data: Vec<RawReading>,
    #[serde(default)]
    pub count: i64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawReading {
    #[serde(default)]
    pub id: String,
    #[serde(default, alias = "created_at")]
    pub timestamp: String,
    #[serde(default)]
    pub data: RawSensorData,
}

/// Sensor payload of one reading. Every field is defaulted so a partially
/// missing record degrades to an AVAILABLE machine instead of failing the batch.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawSensorData {
    #[serde(rename = "MachineID", default)]
    pub machine_id: String,
    #[serde(default)]
    pub state: RawState,
    #[serde(default)]
    pub current: f64,
    #[serde(default, deserialize_with = "lenient_phase")]
    pub ml_phase: Option<Phase>,
    #[serde(default)]
    pub cycle_number: i64,
    #[serde(default)]
    pub door_opened: Option<bool>,
    #[serde(default)]
    pub ml_confidence: Option<f64>,
}

/// Device-reported state. `Unknown` only exists at the wire boundary and
/// normalizes to AVAILABLE.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RawState {
    Running,
    Idle,
    Occupied,
    Available,
    #[default]
    #[serde(other)]
    Unknown,
}

/// Sub-stage of an active wash cycle, ordered WASHING → RINSE → SPINNING.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Phase {
    Washing,
    Rinse,
    Spinning,
}

impl Phase {
    pub const ALL: [Phase; 3] = [Phase::Washing, Phase::Rinse, Phase::Spinning];

    /// Position in the forward cycle order.
    pub fn index(self) -> usize {
        match self {
            Phase::Washing => 0,
            Phase::Rinse => 1,
            Phase::Spinning => 2,
        }
    }
}

/// Accepts the three known phase names; anything else (or a non-string)
/// decodes to `None` rather than rejecting the reading.
fn lenient_phase<'de, D>(deserializer: D) -> Result<Option<Phase>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| serde_json::from_value::<Phase>(v).ok()))
}
