//! Semantic versions, bump rules and release planning.

pub mod analysis;
pub mod bump;
pub mod semantic;
pub mod service;

pub use analysis::{VersionAnalysis, build_version_prompt, parse_version_analysis};
pub use bump::{BumpType, apply_bump, next_version};
pub use semantic::{PreRelease, PreReleaseKind, SemanticVersion};
pub use service::{
    ReleasePlan, ReleasePlanner, TaggingOptions, default_tag_message, validate_repository_state,
};
