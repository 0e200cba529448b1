// Canonical machine-status view model
use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};

use super::reading::{Phase, RawReading, RawState};

/// Three-way status used for all rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CanonicalStatus {
    Available,
    InUse,
    Occupied,
}

impl CanonicalStatus {
    /// Fixed palette, one color per status (the UI colors).
    pub fn color(self) -> Rgb {
        match self {
            CanonicalStatus::Available => Rgb::new(0x9b, 0xc1, 0x4b),
            CanonicalStatus::InUse => Rgb::new(0x4a, 0x7c, 0x8c),
            CanonicalStatus::Occupied => Rgb::new(0xd4, 0xa0, 0x17),
        }
    }
}

impl RawState {
    /// Total mapping into the canonical status; unknown device states
    /// count as AVAILABLE.
    pub fn canonical(self) -> CanonicalStatus {
        match self {
            RawState::Running => CanonicalStatus::InUse,
            RawState::Occupied => CanonicalStatus::Occupied,
            RawState::Idle | RawState::Available | RawState::Unknown => {
                CanonicalStatus::Available
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl std::fmt::Display for Rgb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl Serialize for Rgb {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Parse the device ordinal from an identifier like "WM-01".
/// Identifiers that don't follow the scheme have no ordinal and fall
/// outside every monitored range.
pub fn device_ordinal(machine_id: &str) -> Option<u32> {
    machine_id.strip_prefix("WM-")?.parse().ok()
}

/// Derived per-machine view, rebuilt from scratch on every poll.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MachineView {
    pub machine_id: String,
    pub display_name: String,
    pub status: CanonicalStatus,
    pub color: Rgb,
    pub progress_percent: f64,
    pub time_remaining_minutes: u32,
    pub phase: Option<Phase>,
    pub cycle_number: i64,
    pub last_reported: Option<DateTime<Utc>>,
}

impl MachineView {
    /// Map one raw reading into the canonical view. Progress fields start at
    /// zero; the estimator fills them in for running machines.
    pub fn from_reading(reading: &RawReading) -> Self {
        let machine_id = reading.data.machine_id.clone();
        let status = reading.data.state.canonical();
        // A phase only means something while the machine runs; stale phase
        // tags on idle or finished machines are dropped.
        let phase = if status == CanonicalStatus::InUse {
            reading.data.ml_phase
        } else {
            None
        };
        let last_reported = DateTime::parse_from_rfc3339(&reading.timestamp)
            .ok()
            .map(|t| t.with_timezone(&Utc));

        Self {
            display_name: Self::format_name(&machine_id),
            status,
            color: status.color(),
            progress_percent: 0.0,
            time_remaining_minutes: 0,
            phase,
            cycle_number: reading.data.cycle_number,
            last_reported,
            machine_id,
        }
    }

    fn format_name(machine_id: &str) -> String {
        // Convert "WM-01" to "Washer 01"
        match machine_id.strip_prefix("WM-") {
            Some(suffix) => format!("Washer {}", suffix),
            None => machine_id.to_string(),
        }
    }
}
