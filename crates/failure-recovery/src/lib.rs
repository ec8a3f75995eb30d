//! Failure classification and recovery.
//!
//! Every raised failure is mapped onto a closed taxonomy before any
//! recovery decision. Each taxonomy entry carries a ranked ladder of
//! bounded corrective strategies; recovery reports success or failure and,
//! when a replacement selector was derived, hands it back for one retry.

mod classify;
mod recover;

pub use classify::{classify_failure, FailureKind};
pub use recover::{
    RecoveryContext, RecoveryError, RecoveryManager, RecoveryOutcome, RecoveryStrategy,
};
