//! Configuration
//!
//! The settings document, credential files, and startup-time validation.

pub mod credentials;
pub mod settings;

pub use credentials::Credentials;
pub use settings::Settings;

/// Configuration problems. All fatal and reported at startup.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("malformed settings in {path}: {source}")]
    Parse {
        path: String,
        source: serde_json::Error,
    },
    #[error("bank PIN must be exactly 4 digits")]
    InvalidPin,
    #[error("unknown hotkey {name:?} bound to {panel}")]
    BadHotkey { panel: &'static str, name: String },
    #[error("unsupported activity: {0}")]
    UnknownActivity(String),
}
