//! Error handling for the tirewatch crate.

/// A specialized `Result` type for tirewatch operations.
pub type Result<T> = std::result::Result<T, TelemetryError>;

/// The main error type for tirewatch operations.
#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Web server error
    #[error("Web server error: {0}")]
    WebServer(String),

    /// Telemetry channel transport failure
    #[error("Transport error: {0}")]
    Transport(String),

    /// Inbound message could not be parsed
    #[error("Malformed message: {0}")]
    Parse(String),
}

impl TelemetryError {
    /// Create a new configuration error
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new web server error
    pub fn web_server_error(msg: impl Into<String>) -> Self {
        Self::WebServer(msg.into())
    }

    /// Create a new transport error
    pub fn transport_error(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    /// Create a new parse error
    pub fn parse_error(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }
}
