//! Web application router and middleware setup.

use crate::web::config::ServerConfig;
use crate::web::{handlers, websocket, AppState};
use axum::routing::get;
use axum::Router;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Create the axum application with all routes and middleware.
pub fn create_app(config: &ServerConfig, state: AppState) -> Router {
    let mut app = Router::new()
        // API routes
        .route("/api/sensors", get(handlers::list_sensors))
        .route("/api/sensors/:id", get(handlers::get_sensor))
        .route("/api/health", get(handlers::health_check))
        // WebSocket route
        .route("/ws", get(websocket::websocket_handler))
        .with_state(state);

    if config.enable_cors {
        app = app.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );
    }

    app.layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::telemetry::{BroadcastHub, SensorRegistry, TelemetryConfig};
    use std::sync::Arc;
    use tokio::sync::RwLock;

    #[tokio::test]
    async fn create_app_builds_with_and_without_cors() {
        let config = TelemetryConfig::default();
        let state = AppState {
            registry: Arc::new(RwLock::new(SensorRegistry::new(config.positions))),
            hub: BroadcastHub::default(),
        };

        let _with_cors = create_app(&ServerConfig::default(), state.clone());
        let _without_cors = create_app(&ServerConfig::default().with_cors(false), state);
    }
}
