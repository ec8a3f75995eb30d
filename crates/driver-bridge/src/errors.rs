//! Driver failure taxonomy.
//!
//! Message texts are stable keywords: the recovery layer classifies
//! failures by matching against them.

use thiserror::Error;

/// Failures raised by a [`crate::PageDriver`] implementation.
#[derive(Debug, Error, Clone)]
pub enum DriverError {
    /// No element resolves for the selector.
    #[error("element not found: {0}")]
    NotFound(String),

    /// Element exists but is not visible.
    #[error("element not visible: {0}")]
    NotVisible(String),

    /// Element is visible but cannot receive the interaction
    /// (disabled, readonly, obscured).
    #[error("element not interactable: {0}")]
    NotInteractable(String),

    /// Element was removed from the tree mid-interaction.
    #[error("element detached: {0}")]
    Detached(String),

    /// Selector resolves to more than one element.
    #[error("selector ambiguous: {0}")]
    Ambiguous(String),

    /// Operation did not complete within its deadline.
    #[error("timeout: {0}")]
    Timeout(String),

    /// Page navigation failed or interrupted the operation.
    #[error("navigation error: {0}")]
    Navigation(String),

    /// Network-level failure observed by the driver.
    #[error("network error: {0}")]
    Network(String),

    /// Transport failure talking to the browser. Not retried by the core.
    #[error("driver i/o error: {0}")]
    Io(String),
}

impl DriverError {
    /// Connection-level failures must propagate; everything else is fair
    /// game for the recovery ladder.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Io(_))
    }
}
