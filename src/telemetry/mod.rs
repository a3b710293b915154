//! Sensor simulation and the telemetry pipeline.
//!
//! This module owns everything server-side between the simulated sensors and
//! the wire: the per-sensor model, the fixed registry, the tick scheduler
//! and the broadcast hub that fans batches out to subscriber channels.

pub mod data;
pub mod hub;
pub mod registry;
pub mod scheduler;
pub mod sensor;

// Re-export commonly used items
pub use data::{FeedMessage, SensorReading, TireStatus};
pub use hub::BroadcastHub;
pub use registry::SensorRegistry;
pub use scheduler::SchedulerHandle;
pub use sensor::TireSensor;

use std::time::Duration;

/// Simulation configuration, fixed at process start.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// Tick period for the scheduler
    pub tick_interval: Duration,
    /// Mount positions, one sensor per entry
    pub positions: Vec<String>,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_millis(crate::DEFAULT_TICK_INTERVAL_MS),
            positions: crate::DEFAULT_SENSOR_POSITIONS
                .iter()
                .map(|p| p.to_string())
                .collect(),
        }
    }
}

impl TelemetryConfig {
    /// Set the scheduler tick period.
    pub fn with_tick_interval(mut self, interval: Duration) -> Self {
        self.tick_interval = interval;
        self
    }

    /// Replace the sensor positions.
    pub fn with_positions(mut self, positions: Vec<String>) -> Self {
        self.positions = positions;
        self
    }

    /// Positions for a fleet of `count` sensors: the four wheel names when
    /// `count` is four, generated labels otherwise.
    pub fn positions_for_count(count: usize) -> Vec<String> {
        if count == crate::DEFAULT_SENSOR_POSITIONS.len() {
            crate::DEFAULT_SENSOR_POSITIONS
                .iter()
                .map(|p| p.to_string())
                .collect()
        } else {
            (1..=count).map(|i| format!("Wheel {}", i)).collect()
        }
    }
}
