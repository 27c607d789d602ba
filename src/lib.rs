//! grapheus - A CLI tool that turns git diffs into commit messages and
//! semantic version tags.
//!
//! # Overview
//!
//! grapheus parses a unified diff, works out which files matter, which scope
//! the change belongs to and what kind of change it looks like, then asks a
//! generative model (any CLI that prints an answer, `claude -p` by default) to
//! phrase a commit message. The answer is formatted and validated against the
//! Conventional Commits rules.
//!
//! The same analysis drives releases: the changes since the latest tag are
//! summarized, the model recommends a bump, and the next version is tagged.

pub mod commit;
pub mod config;
pub mod context;
pub mod diff;
pub mod error;
pub mod git;
pub mod llm;
pub mod scope;
pub mod version;

// Re-export commonly used types
pub use commit::{CommitGenerator, CommitMessage, CommitType, MessageStyle, ValidationResult, Validator};
pub use config::Config;
pub use context::{ChangeContext, ContextAnalyzer};
pub use diff::{ChangeType, DiffParser, DiffProcessor, DiffSummary, FileChange, ProcessedDiff};
pub use error::{CommitError, ConfigError, DiffError, GitError, ModelError, ReleaseError, VersionError};
pub use scope::ScopeDetector;
pub use version::{BumpType, ReleasePlanner, SemanticVersion};
