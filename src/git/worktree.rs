//! Working tree access through git2.

use std::path::Path;

use git2::{Diff, DiffFormat, DiffOptions, ErrorCode, Repository, Status, StatusOptions, Tree};
use tracing::debug;

use super::RepositoryState;
use crate::error::GitError;

/// Which side of the index a diff describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffSource {
    /// `HEAD` against the index.
    Staged,
    /// The index against the working directory, untracked files included.
    Unstaged,
}

pub struct WorkingTree {
    repo: Repository,
}

impl WorkingTree {
    /// Open the repository containing `path`.
    pub fn discover(path: impl AsRef<Path>) -> Result<Self, GitError> {
        let repo = Repository::discover(path).map_err(GitError::OpenRepository)?;
        Ok(Self { repo })
    }

    pub fn from_repository(repo: Repository) -> Self {
        Self { repo }
    }

    pub fn workdir(&self) -> Option<&Path> {
        self.repo.workdir()
    }

    /// Unified diff text in `git diff` layout.
    pub fn diff_text(&self, source: DiffSource) -> Result<String, GitError> {
        let diff = match source {
            DiffSource::Staged => {
                let head_tree = resolve_head_tree(&self.repo)?;
                self.repo
                    .diff_tree_to_index(head_tree.as_ref(), None, None)
                    .map_err(GitError::DiffFailed)?
            }
            DiffSource::Unstaged => {
                let mut opts = DiffOptions::new();
                opts.include_untracked(true)
                    .recurse_untracked_dirs(true)
                    .show_untracked_content(true);
                self.repo
                    .diff_index_to_workdir(None, Some(&mut opts))
                    .map_err(GitError::DiffFailed)?
            }
        };

        let text = render_patch(&diff)?;
        debug!(?source, files = diff.deltas().len(), bytes = text.len(), "Collected diff");
        Ok(text)
    }

    /// Staged and unstaged flags. Untracked files are ignored, as `git diff`
    /// ignores them.
    pub fn state(&self) -> Result<RepositoryState, GitError> {
        let mut opts = StatusOptions::new();
        opts.include_untracked(false).include_ignored(false);
        let statuses = self.repo.statuses(Some(&mut opts)).map_err(GitError::StatusFailed)?;

        let staged = Status::INDEX_NEW
            | Status::INDEX_MODIFIED
            | Status::INDEX_DELETED
            | Status::INDEX_RENAMED
            | Status::INDEX_TYPECHANGE;
        let unstaged =
            Status::WT_MODIFIED | Status::WT_DELETED | Status::WT_RENAMED | Status::WT_TYPECHANGE;

        let mut state = RepositoryState::default();
        for entry in statuses.iter() {
            let status = entry.status();
            state.has_staged_changes |= status.intersects(staged);
            state.has_unstaged_changes |= status.intersects(unstaged);
        }
        Ok(state)
    }
}

/// `None` for a repository without commits.
fn resolve_head_tree(repo: &Repository) -> Result<Option<Tree<'_>>, GitError> {
    let head_ref = match repo.head() {
        Ok(r) => r,
        Err(e) if e.code() == ErrorCode::UnbornBranch || e.code() == ErrorCode::NotFound => {
            return Ok(None);
        }
        Err(e) => return Err(GitError::DiffFailed(e)),
    };

    let tree = head_ref.peel_to_tree().map_err(GitError::DiffFailed)?;
    Ok(Some(tree))
}

fn render_patch(diff: &Diff<'_>) -> Result<String, GitError> {
    let mut text = String::new();
    diff.print(DiffFormat::Patch, |_delta, _hunk, line| {
        let origin = line.origin();
        if matches!(origin, '+' | '-' | ' ') {
            text.push(origin);
        }
        text.push_str(&String::from_utf8_lossy(line.content()));
        true
    })
    .map_err(GitError::DiffFailed)?;
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::{ChangeType, parse_diff};

    fn init_repo() -> (tempfile::TempDir, Repository) {
        let dir = tempfile::tempdir().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        {
            let sig = git2::Signature::now("Test", "test@test.com").unwrap();
            std::fs::write(dir.path().join("README.md"), "# demo\n").unwrap();
            let mut index = repo.index().unwrap();
            index.add_path(Path::new("README.md")).unwrap();
            index.write().unwrap();
            let tree_id = index.write_tree().unwrap();
            let tree = repo.find_tree(tree_id).unwrap();
            repo.commit(Some("HEAD"), &sig, &sig, "init", &tree, &[]).unwrap();
        }
        (dir, repo)
    }

    #[test]
    fn test_clean_repo() {
        let (_dir, repo) = init_repo();
        let tree = WorkingTree::from_repository(repo);

        assert!(tree.state().unwrap().is_clean());
        assert!(tree.diff_text(DiffSource::Staged).unwrap().is_empty());
    }

    #[test]
    fn test_staged_new_file_parses() {
        let (dir, repo) = init_repo();
        std::fs::write(dir.path().join("main.go"), "package main\n\nfunc main() {}\n").unwrap();
        let mut index = repo.index().unwrap();
        index.add_path(Path::new("main.go")).unwrap();
        index.write().unwrap();

        let tree = WorkingTree::from_repository(repo);
        let summary = parse_diff(&tree.diff_text(DiffSource::Staged).unwrap());

        assert_eq!(summary.total_files, 1);
        assert_eq!(summary.files[0].path, "main.go");
        assert_eq!(summary.files[0].change_type, ChangeType::Added);
        assert_eq!(summary.files[0].lines_added, 3);

        let state = tree.state().unwrap();
        assert!(state.has_staged_changes);
        assert!(!state.has_unstaged_changes);
    }

    #[test]
    fn test_unstaged_modification() {
        let (dir, repo) = init_repo();
        std::fs::write(dir.path().join("README.md"), "# demo\n\nMore text.\n").unwrap();

        let tree = WorkingTree::from_repository(repo);
        let summary = parse_diff(&tree.diff_text(DiffSource::Unstaged).unwrap());

        assert_eq!(summary.files[0].change_type, ChangeType::Modified);
        assert_eq!((summary.files[0].lines_added, summary.files[0].lines_deleted), (2, 0));
        assert!(tree.state().unwrap().has_unstaged_changes);
        assert!(tree.diff_text(DiffSource::Staged).unwrap().is_empty());
    }

    #[test]
    fn test_untracked_files_do_not_dirty_state() {
        let (dir, repo) = init_repo();
        std::fs::write(dir.path().join("scratch.txt"), "notes\n").unwrap();

        let tree = WorkingTree::from_repository(repo);
        assert!(tree.state().unwrap().is_clean());
        assert!(tree.diff_text(DiffSource::Unstaged).unwrap().contains("scratch.txt"));
    }
}
