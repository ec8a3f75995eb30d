//! State extraction: normalized, immutable snapshots of a page's
//! interactive surface.
//!
//! The perceiver is the leaf of the core dependency chain. It reads raw
//! element descriptors from the driver and produces `PageSnapshot`s:
//! zero-size elements excluded, duplicate controls collapsed, alerts and
//! open dialogs grouped, and a best-effort form view derived from label
//! keyword heuristics rather than DOM form boundaries.

mod describe;
mod errors;
mod extract;
mod form_view;

pub use describe::describe;
pub use errors::PerceiverError;
pub use extract::SurfacePerceiver;
pub use form_view::FormView;
