//! Diff ingestion: parsing raw diff text and shaping it for a prompt.

mod importance;
mod language;
mod numstat;
mod parser;
mod processor;
mod types;

pub use importance::{FileCategory, ImportanceRule, ImportanceRules, PathMatcher};
pub use language::LanguageMap;
pub use numstat::parse_numstat;
pub use parser::{DiffParser, parse_diff, split_sections};
pub use processor::{DEFAULT_MAX_CHUNK_SIZE, DEFAULT_MAX_FILES, DiffChunk, DiffProcessor, ProcessedDiff};
pub use types::{ChangeType, DiffSummary, FileChange, UNKNOWN_LANGUAGE};
