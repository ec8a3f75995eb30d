//! Interaction error types.
//!
//! Message texts carry the keywords the recovery layer classifies on.

use driver_bridge::DriverError;
use thiserror::Error;

/// Failures while applying a value or activating a control.
#[derive(Debug, Error, Clone)]
pub enum ActionError {
    #[error("element not found: {0}")]
    NotFound(String),

    #[error("element not visible: {0}")]
    NotVisible(String),

    #[error("element not interactable: {0}")]
    NotInteractable(String),

    #[error("element detached: {0}")]
    Detached(String),

    /// The write appeared to succeed but reading the field back disagreed.
    #[error("value not persisted: {selector} expected '{expected}', observed '{observed}'")]
    NotPersisted {
        selector: String,
        expected: String,
        observed: String,
    },

    /// No option matched and no creation affordance was available.
    #[error("element not found: no option matching '{0}'")]
    OptionNotFound(String),

    #[error("selector ambiguous: {0}")]
    Ambiguous(String),

    #[error("timeout: {0}")]
    Timeout(String),

    #[error("navigation error: {0}")]
    Navigation(String),

    #[error("network error: {0}")]
    Network(String),

    /// Driver transport failure. Never retried by this crate.
    #[error("driver i/o error: {0}")]
    Io(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ActionError {
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::NotVisible(_)
                | Self::NotInteractable(_)
                | Self::Detached(_)
                | Self::NotPersisted { .. }
                | Self::Timeout(_)
                | Self::Network(_)
        )
    }

    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Io(_))
    }
}

impl From<DriverError> for ActionError {
    fn from(err: DriverError) -> Self {
        match err {
            DriverError::NotFound(s) => Self::NotFound(s),
            DriverError::NotVisible(s) => Self::NotVisible(s),
            DriverError::NotInteractable(s) => Self::NotInteractable(s),
            DriverError::Detached(s) => Self::Detached(s),
            DriverError::Ambiguous(s) => Self::Ambiguous(s),
            DriverError::Timeout(s) => Self::Timeout(s),
            DriverError::Navigation(s) => Self::Navigation(s),
            DriverError::Network(s) => Self::Network(s),
            DriverError::Io(s) => Self::Io(s),
        }
    }
}
