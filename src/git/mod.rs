//! Repository collaborators: record parsers, the `git` CLI adapter and the
//! git2-backed working tree reader.

pub mod cli;
pub mod history;
pub mod tags;
pub mod worktree;

pub use cli::GitCli;
pub use history::{COMMIT_LOG_FORMAT, CommitInfo, parse_commit_log};
pub use tags::{GitTag, TAG_LIST_FORMAT, latest_version, parse_tag_list};
pub use worktree::{DiffSource, WorkingTree};

use crate::error::GitError;

/// Commit history queries.
#[cfg_attr(test, mockall::automock)]
pub trait HistorySource {
    /// Most recent commits on the current branch, newest first.
    fn recent_commits(&self, limit: usize) -> Result<Vec<CommitInfo>, GitError>;

    /// Recent commits touching any of `paths`, newest first.
    fn file_history(&self, paths: &[String], limit: usize) -> Result<Vec<CommitInfo>, GitError>;
}

impl<T: HistorySource + ?Sized> HistorySource for &T {
    fn recent_commits(&self, limit: usize) -> Result<Vec<CommitInfo>, GitError> {
        (**self).recent_commits(limit)
    }

    fn file_history(&self, paths: &[String], limit: usize) -> Result<Vec<CommitInfo>, GitError> {
        (**self).file_history(paths, limit)
    }
}

/// Staged and unstaged change flags for the tagging precondition.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RepositoryState {
    pub has_staged_changes: bool,
    pub has_unstaged_changes: bool,
}

impl RepositoryState {
    pub fn is_clean(&self) -> bool {
        !self.has_staged_changes && !self.has_unstaged_changes
    }
}

/// Tag and release queries.
pub trait TagRepository {
    /// All tags, with annotation status filled in.
    fn list_tags(&self) -> Result<Vec<GitTag>, GitError>;

    /// `added<TAB>deleted<TAB>path` lines for the commits after `since`, or
    /// for `HEAD` alone when there is no previous tag.
    fn numstat_since(&self, since: Option<&str>) -> Result<String, GitError>;

    fn repository_state(&self) -> Result<RepositoryState, GitError>;

    /// Annotated when `message` is given, lightweight otherwise.
    fn create_tag(&self, name: &str, message: Option<&str>) -> Result<(), GitError>;
}

impl<T: TagRepository + ?Sized> TagRepository for &T {
    fn list_tags(&self) -> Result<Vec<GitTag>, GitError> {
        (**self).list_tags()
    }

    fn numstat_since(&self, since: Option<&str>) -> Result<String, GitError> {
        (**self).numstat_since(since)
    }

    fn repository_state(&self) -> Result<RepositoryState, GitError> {
        (**self).repository_state()
    }

    fn create_tag(&self, name: &str, message: Option<&str>) -> Result<(), GitError> {
        (**self).create_tag(name, message)
    }
}
