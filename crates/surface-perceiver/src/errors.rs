//! Perceiver error types.

use driver_bridge::DriverError;
use thiserror::Error;

/// Failures while capturing or deriving a snapshot.
#[derive(Debug, Error, Clone)]
pub enum PerceiverError {
    /// The driver could not deliver the raw surface.
    #[error("surface capture failed: {0}")]
    CaptureFailed(String),
}

impl From<DriverError> for PerceiverError {
    fn from(err: DriverError) -> Self {
        Self::CaptureFailed(err.to_string())
    }
}
