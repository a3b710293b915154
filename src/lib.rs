//! # tirewatch - Tire Sensor Telemetry Simulator
//!
//! A Rust crate that simulates a fleet of tire sensors and streams their
//! classified readings to any number of observers in near-real time.
//!
//! ## Features
//!
//! - **Sensor simulation**: bounded, physically plausible pressure,
//!   temperature and tread-depth evolution with severity classification
//! - **Live feed**: WebSocket broadcast of snapshot batches on a fixed tick
//! - **Polling API**: read-only REST endpoints for the same readings
//! - **Resilient client**: auto-reconnecting consumer with a fixed retry
//!   delay and an always-available last-known snapshot
//! - **Library + Binary**: use as a crate or standalone application
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use tirewatch::telemetry::{self, BroadcastHub, SensorRegistry, TelemetryConfig};
//! use tirewatch::web::{start_server, AppState, ServerConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = TelemetryConfig::default();
//!     let registry = SensorRegistry::new(config.positions.clone());
//!     let state = AppState::new(registry, BroadcastHub::default());
//!
//!     let _scheduler = telemetry::scheduler::start(
//!         state.registry.clone(),
//!         state.hub.clone(),
//!         config.tick_interval,
//!     );
//!
//!     // Serve the feed at ws://0.0.0.0:3001/ws
//!     start_server(ServerConfig::default(), state).await?;
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod error;
pub mod telemetry;
pub mod web;

// Re-export public API
pub use client::{ClientConfig, ConnectionState, TelemetryClient};
pub use error::{Result, TelemetryError};
pub use telemetry::{
    BroadcastHub, FeedMessage, SensorReading, SensorRegistry, TelemetryConfig, TireSensor,
    TireStatus,
};
pub use web::{start_server, AppState, ServerConfig};

/// The default scheduler tick period in milliseconds
pub const DEFAULT_TICK_INTERVAL_MS: u64 = 2000;

/// The default web server port
pub const DEFAULT_WEB_PORT: u16 = 3001;

/// The default client reconnection delay in milliseconds
pub const DEFAULT_RECONNECT_DELAY_MS: u64 = 3000;

/// Mount positions of the default four-sensor fleet
pub const DEFAULT_SENSOR_POSITIONS: [&str; 4] =
    ["Front Left", "Front Right", "Rear Left", "Rear Right"];
