//! Web server exposing the telemetry feed and the polling API.
//!
//! The feed is served at `/ws`; the read-only REST surface lives under
//! `/api`. All shared state is carried in an explicit [`AppState`] built at
//! startup and handed to the router, the scheduler and the hub by clone —
//! there are no process-wide singletons.

pub mod config;
pub mod handlers;
pub mod router;
pub mod websocket;

// Re-export commonly used items
pub use config::ServerConfig;
pub use router::create_app;

use crate::error::{Result, TelemetryError};
use crate::telemetry::{BroadcastHub, SensorRegistry};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

/// Shared state for the web layer: the sensor registry and the broadcast
/// hub, both owned here and accessed through handles.
#[derive(Debug, Clone)]
pub struct AppState {
    pub registry: Arc<RwLock<SensorRegistry>>,
    pub hub: BroadcastHub,
}

impl AppState {
    pub fn new(registry: SensorRegistry, hub: BroadcastHub) -> Self {
        Self {
            registry: Arc::new(RwLock::new(registry)),
            hub,
        }
    }
}

/// Start the web server and serve until the process shuts down.
pub async fn start_server(config: ServerConfig, state: AppState) -> Result<()> {
    let app = create_app(&config, state);

    let addr = config
        .bind_address()
        .parse::<SocketAddr>()
        .map_err(|e| TelemetryError::config_error(format!("Invalid bind address: {}", e)))?;

    info!("Starting tirewatch server on http://{}", addr);
    info!("Sensor API: http://{}/api/sensors", addr);
    info!("Telemetry feed: ws://{}/ws", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| TelemetryError::web_server_error(format!("Failed to bind to address: {}", e)))?;

    axum::serve(listener, app)
        .await
        .map_err(|e| TelemetryError::web_server_error(format!("Server error: {}", e)))?;

    Ok(())
}
