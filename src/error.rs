//! Crate-level error taxonomy
//!
//! Soft "not found" conditions are ordinary values (`MatchResult::NotFound`)
//! and never appear here. These variants are the hard failures: an
//! interaction protocol that exhausted its retries, a client window that
//! cannot be located, or a bad configuration caught at startup.

use crate::config::ConfigError;
use crate::vision::VisionError;

/// Hard failures that abort the current action or the whole run.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An interaction protocol could not reach its target state within its
    /// bounded retries. Aborts the current high-level action.
    #[error("protocol failure in {operation}: {reason}")]
    Protocol {
        operation: &'static str,
        reason: String,
    },

    /// The client window anchor could not be found at all, even after
    /// launch-assist retries. Fatal: every coordinate depends on it.
    #[error("client window could not be located after {attempts} attempts")]
    Orientation { attempts: u32 },

    /// Invalid settings, unsupported activity selector, malformed
    /// credentials. Fatal, reported at startup.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The input device could not be opened. Fatal at startup.
    #[error("input device unavailable: {0}")]
    Input(String),

    /// Screen capture or needle decoding failed.
    #[error(transparent)]
    Vision(#[from] VisionError),
}

impl Error {
    /// Shorthand for a protocol failure.
    pub fn protocol(operation: &'static str, reason: impl Into<String>) -> Self {
        Error::Protocol {
            operation,
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
