//! Boundary with the browser-automation driver.
//!
//! The autopilot core never talks to a real browser directly; it consumes
//! the [`PageDriver`] trait defined here. A production deployment wires in a
//! CDP- or WebDriver-backed implementation; the test suite and the demo
//! binary use the in-memory [`mock::MockDriver`] (feature `mock`).

mod driver;
mod errors;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use driver::{ElementNode, ElementState, Key, OptionEntry, OptionMatch, PageDriver};
pub use errors::DriverError;
