//! Conventional-commit scope inference.

mod content;
mod detector;
mod rules;

pub use content::ContentKeywords;
pub use detector::ScopeDetector;
pub use rules::{HIGH_PRIORITY_SCOPES, ScopeDetectionRule, default_rules};
