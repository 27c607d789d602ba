//! Higher-order signals about a change set: configuration values, function
//! declarations, performance-relevant edits and change patterns.

pub mod analyzer;
pub mod config_changes;
pub mod functions;
pub mod patterns;
pub mod performance;
pub mod types;

pub use analyzer::{ContextAnalyzer, DEFAULT_RECENT_COMMITS, DEFAULT_RELATED_COMMITS};
pub use config_changes::{ConfigChangeDetector, describe_value_change};
pub use functions::{FunctionChangeDetector, FunctionPatterns, function_impact};
pub use patterns::classify_changes;
pub use performance::{PerformanceCategory, PerformanceDetector};
pub use types::{ChangeContext, ConfigChange, FunctionChange, FunctionChangeType, ScalarValue, Signal};
