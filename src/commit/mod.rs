//! Commit message generation: model answer parsing, prompt, formatting and
//! validation.

pub mod formatter;
pub mod generator;
pub mod message;
pub mod prompt;
pub mod validator;

pub use formatter::{FormatterConfig, MessageFormatter};
pub use generator::{CommitGenerator, GeneratedCommit, PreparedChanges};
pub use message::{CommitMessage, CommitType, MessageStyle, parse_model_response};
pub use prompt::build_commit_prompt;
pub use validator::{
    ErrorKind, SuggestionKind, ValidationConfig, ValidationError, ValidationResult, ValidationSuggestion,
    ValidationWarning, Validator, WarningKind,
};
