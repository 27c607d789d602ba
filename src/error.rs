//! Error types for grapheus modules using thiserror.

use thiserror::Error;

/// Errors from diff parsing and processing.
///
/// Section-level parse failures never escape [`crate::diff::parse_diff`]; they
/// are logged and the section is skipped.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum DiffError {
    #[error("Diff section has no 'diff --git' header")]
    MissingHeader,

    #[error("Could not determine file path from header: {0}")]
    InvalidHeader(String),
}

/// Errors from git collaborator operations.
#[derive(Error, Debug)]
pub enum GitError {
    #[error("Failed to open repository: {0}")]
    OpenRepository(#[source] git2::Error),

    #[error("Failed to collect diff: {0}")]
    DiffFailed(#[source] git2::Error),

    #[error("Failed to read repository status: {0}")]
    StatusFailed(#[source] git2::Error),

    #[error("Failed to run git {operation}: {source}")]
    SpawnFailed {
        operation: String,
        #[source]
        source: std::io::Error,
    },

    #[error("git {operation} failed: {stderr}")]
    CommandFailed { operation: String, stderr: String },
}

/// Errors from the external model collaborator.
#[derive(Error, Debug)]
pub enum ModelError {
    #[error("Model command '{0}' not found in PATH")]
    NotInstalled(String),

    #[error("No model command configured")]
    NoCommand,

    #[error("Failed to spawn model process: {0}")]
    SpawnFailed(#[source] std::io::Error),

    #[error("Model process timed out after {0} seconds")]
    Timeout(u64),

    #[error("Model command exited with code {code}: {stderr}")]
    NonZeroExit { code: i32, stderr: String },

    #[error("Model returned an empty response")]
    EmptyResponse,

    #[error("Model returned invalid JSON: {0}")]
    InvalidJson(String),

    #[error("Model recommended an invalid bump type: {0}")]
    InvalidBump(String),
}

/// Errors from version operations.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum VersionError {
    #[error("Invalid semantic version format: {0}")]
    ParseFailed(String),

    #[error("Invalid bump type '{0}'. Use: major, minor, patch")]
    InvalidBump(String),

    #[error("Invalid pre-release type '{0}'. Use: alpha, beta, rc")]
    InvalidPreRelease(String),

    #[error("Unsupported version '{0}': only alpha, beta or rc pre-releases without build metadata can be tagged")]
    Unsupported(String),

    #[error(
        "Repository has uncommitted changes (staged: {staged}, unstaged: {unstaged}). Please commit or stash changes before tagging"
    )]
    DirtyWorkingTree { staged: bool, unstaged: bool },

    #[error("Requested version {requested} is not newer than the current version {current}")]
    NotNewer { current: String, requested: String },

    #[error("Cannot apply a {bump} bump to {version}: version component overflows")]
    Overflow { version: String, bump: String },
}

/// Errors from configuration loading.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Errors from commit message generation.
#[derive(Error, Debug)]
pub enum CommitError {
    #[error("No changes to describe (diff is empty)")]
    NoChanges,

    #[error("Failed to collect diff: {0}")]
    Git(#[from] GitError),

    #[error("Failed to generate commit message: {0}")]
    Model(#[from] ModelError),
}

/// Errors from the release (version analysis + tagging) pipeline.
#[derive(Error, Debug)]
pub enum ReleaseError {
    #[error("No changes detected in latest commit")]
    NoChanges,

    #[error("Failed to analyze changes: {0}")]
    Model(#[from] ModelError),

    #[error("Git operation failed: {0}")]
    Git(#[from] GitError),

    #[error(transparent)]
    Version(#[from] VersionError),
}
