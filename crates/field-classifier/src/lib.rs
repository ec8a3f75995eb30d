//! Field classification: infer what a control is and what it is for.
//!
//! Given one `FieldInfo` and its surrounding context, the classifier
//! derives a `ClassifiedField`: a closed field type, a semantic purpose,
//! a confidence score, and a suggested default value. Classification is
//! purely derived and recomputed per snapshot; nothing here is cached
//! across navigations.

mod classify;
mod rules;
mod types;
mod values;

pub use classify::{ClassifyContext, FieldClassifier};
pub use rules::PurposeRule;
pub use types::{ClassifiedField, FieldPurpose, FieldType};
