//! Data structures for the telemetry feed.

use crate::error::{Result, TelemetryError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Severity band derived from a sensor's physical state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TireStatus {
    Normal,
    Warning,
    Critical,
}

impl std::fmt::Display for TireStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TireStatus::Normal => write!(f, "normal"),
            TireStatus::Warning => write!(f, "warning"),
            TireStatus::Critical => write!(f, "critical"),
        }
    }
}

/// One sensor's classified physical state at a point in time.
///
/// Readings are immutable once emitted; consumers replace their view of the
/// current batch wholesale instead of mutating individual readings. Field
/// names follow the wire format (`treadDepth`, `lastUpdate`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SensorReading {
    /// Stable identifier, assigned once at sensor creation
    pub id: String,
    /// Mount location, e.g. "Front Left"
    pub position: String,
    /// Tire pressure in PSI, within [20, 40]
    pub pressure: f64,
    /// Tire temperature in Celsius, within [15, 45]
    pub temperature: f64,
    /// Remaining tread depth in millimeters, within [1, 10]
    pub tread_depth: f64,
    /// Severity band for the current values
    pub status: TireStatus,
    /// Timestamp of the tick that produced this reading
    pub last_update: DateTime<Utc>,
}

/// Envelope for messages on the telemetry channel (server to client).
///
/// A newly opened channel receives exactly one `initial` message before any
/// `update`; every scheduler tick produces one `update` for every open
/// channel. Any other `type` tag fails to parse and is discarded by the
/// client without tearing down the connection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FeedMessage {
    Initial {
        data: Vec<SensorReading>,
        timestamp: DateTime<Utc>,
    },
    Update {
        data: Vec<SensorReading>,
        timestamp: DateTime<Utc>,
    },
}

impl FeedMessage {
    /// Build the first-contact message for a newly joined subscriber.
    pub fn initial(data: Vec<SensorReading>, timestamp: DateTime<Utc>) -> Self {
        FeedMessage::Initial { data, timestamp }
    }

    /// Build the per-tick broadcast message.
    pub fn update(data: Vec<SensorReading>, timestamp: DateTime<Utc>) -> Self {
        FeedMessage::Update { data, timestamp }
    }

    pub fn is_initial(&self) -> bool {
        matches!(self, FeedMessage::Initial { .. })
    }

    /// The snapshot batch carried by this message.
    pub fn data(&self) -> &[SensorReading] {
        match self {
            FeedMessage::Initial { data, .. } | FeedMessage::Update { data, .. } => data,
        }
    }

    /// Consume the envelope, keeping only the snapshot batch.
    pub fn into_data(self) -> Vec<SensorReading> {
        match self {
            FeedMessage::Initial { data, .. } | FeedMessage::Update { data, .. } => data,
        }
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| TelemetryError::parse_error(e.to_string()))
    }

    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| TelemetryError::parse_error(e.to_string()))
    }
}
