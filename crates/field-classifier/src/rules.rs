//! Purpose inference rule table.
//!
//! An ordered list of (priority, pattern, purpose) entries evaluated
//! top-to-bottom. Specificity is an explicit, testable contract: business
//! entities carry lower priority numbers than generic patterns, so
//! "channel name" resolves to `Channel`, never `Name`.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::FieldPurpose;

/// One purpose rule. Lower `priority` is consulted first.
#[derive(Debug, Clone)]
pub struct PurposeRule {
    pub priority: u32,
    pub pattern: Regex,
    pub purpose: FieldPurpose,
}

impl PurposeRule {
    pub fn new(priority: u32, pattern: &str, purpose: FieldPurpose) -> Self {
        Self {
            priority,
            // Table patterns are compile-time constants; a bad one is a bug.
            pattern: Regex::new(pattern).unwrap(),
            purpose,
        }
    }
}

/// Built-in table. Instances copy this at construction and may extend it;
/// the static itself is never mutated.
pub(crate) static DEFAULT_RULES: Lazy<Vec<PurposeRule>> = Lazy::new(|| {
    vec![
        // Named business entities first.
        PurposeRule::new(10, r"(?i)\bchannels?\b", FieldPurpose::Channel),
        PurposeRule::new(10, r"(?i)\bcampaigns?\b", FieldPurpose::Campaign),
        PurposeRule::new(10, r"(?i)\bad ?-?groups?\b", FieldPurpose::AdGroup),
        PurposeRule::new(10, r"(?i)\bcreatives?\b", FieldPurpose::Creative),
        PurposeRule::new(10, r"(?i)\b(budget|daily spend)\b", FieldPurpose::Budget),
        // Specific generic fields.
        PurposeRule::new(40, r"(?i)\be-?mail\b", FieldPurpose::Email),
        PurposeRule::new(
            40,
            r"(?i)\b(url|website|web ?site|link|landing page)\b",
            FieldPurpose::Url,
        ),
        PurposeRule::new(40, r"(?i)\b(phone|mobile|telephone)\b", FieldPurpose::Phone),
        PurposeRule::new(40, r"(?i)\buser ?name\b", FieldPurpose::Username),
        PurposeRule::new(40, r"(?i)\bpass ?word\b", FieldPurpose::Password),
        PurposeRule::new(45, r"(?i)\b(company|organi[sz]ation)\b", FieldPurpose::Company),
        PurposeRule::new(45, r"(?i)\bsearch\b", FieldPurpose::Search),
        PurposeRule::new(
            50,
            r"(?i)\b(date|scheduled?|deadline)\b",
            FieldPurpose::Date,
        ),
        PurposeRule::new(
            50,
            r"(?i)\b(amount|price|cost|total)\b",
            FieldPurpose::Amount,
        ),
        PurposeRule::new(
            60,
            r"(?i)\b(description|notes?|comments?|message)\b",
            FieldPurpose::Description,
        ),
        // Most generic last.
        PurposeRule::new(80, r"(?i)\b(name|title)\b", FieldPurpose::Name),
    ]
});
