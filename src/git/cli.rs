//! Repository queries through the system `git` binary.
//!
//! Shelling out inherits the user's git config, hooks and signing setup, which
//! matters for commit and tag creation.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use tracing::debug;

use super::history::{COMMIT_LOG_FORMAT, CommitInfo, parse_commit_log};
use super::tags::{GitTag, TAG_LIST_FORMAT, parse_tag_list};
use super::worktree::WorkingTree;
use super::{HistorySource, RepositoryState, TagRepository};
use crate::error::GitError;

#[derive(Debug, Clone)]
pub struct GitCli {
    repo_dir: PathBuf,
}

impl GitCli {
    pub fn new(repo_dir: impl Into<PathBuf>) -> Self {
        Self {
            repo_dir: repo_dir.into(),
        }
    }

    pub fn repo_dir(&self) -> &Path {
        &self.repo_dir
    }

    /// Run git and return stdout, or an error carrying stderr.
    fn run_git(&self, args: &[&str], operation: &str) -> Result<String, GitError> {
        debug!(?args, "Running git");
        let output = Command::new("git")
            .args(args)
            .current_dir(&self.repo_dir)
            .output()
            .map_err(|source| GitError::SpawnFailed {
                operation: operation.to_string(),
                source,
            })?;

        if !output.status.success() {
            return Err(GitError::CommandFailed {
                operation: operation.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    fn is_annotated(&self, tag: &str) -> bool {
        match self.run_git(&["cat-file", "-t", tag], "inspect tag") {
            Ok(kind) => kind.trim() == "tag",
            Err(e) => {
                debug!(tag, error = %e, "Could not inspect tag object");
                false
            }
        }
    }

    /// Commit with `message` read from stdin, as `git commit -F -`.
    pub fn commit(&self, message: &str) -> Result<(), GitError> {
        let spawn_err = |source| GitError::SpawnFailed {
            operation: "commit".to_string(),
            source,
        };

        let mut child = Command::new("git")
            .args(["commit", "-F", "-"])
            .current_dir(&self.repo_dir)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(spawn_err)?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(message.as_bytes()).map_err(spawn_err)?;
        }

        let output = child.wait_with_output().map_err(spawn_err)?;
        if !output.status.success() {
            return Err(GitError::CommandFailed {
                operation: "commit".to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(())
    }
}

impl HistorySource for GitCli {
    fn recent_commits(&self, limit: usize) -> Result<Vec<CommitInfo>, GitError> {
        let count = limit.to_string();
        let format = format!("--pretty=format:{COMMIT_LOG_FORMAT}");
        let output = self.run_git(&["log", "-n", &count, &format, "--date=iso"], "log")?;
        Ok(parse_commit_log(&output))
    }

    fn file_history(&self, paths: &[String], limit: usize) -> Result<Vec<CommitInfo>, GitError> {
        if paths.is_empty() {
            return Ok(Vec::new());
        }

        let count = limit.to_string();
        let format = format!("--pretty=format:{COMMIT_LOG_FORMAT}");
        let mut args = vec!["log", "-n", &count, &format, "--date=iso", "--"];
        args.extend(paths.iter().map(String::as_str));
        let output = self.run_git(&args, "log files")?;
        Ok(parse_commit_log(&output))
    }
}

impl TagRepository for GitCli {
    fn list_tags(&self) -> Result<Vec<GitTag>, GitError> {
        let format = format!("--format={TAG_LIST_FORMAT}");
        let output = self.run_git(&["tag", "-l", "--sort=-version:refname", &format], "list tags")?;

        let mut tags = parse_tag_list(&output);
        for tag in &mut tags {
            tag.is_annotated = self.is_annotated(&tag.name);
        }
        Ok(tags)
    }

    fn numstat_since(&self, since: Option<&str>) -> Result<String, GitError> {
        match since {
            Some(tag) => {
                let range = format!("{tag}..HEAD");
                self.run_git(&["diff", "--numstat", &range], "diff numstat")
            }
            None => self.run_git(&["show", "--numstat", "--format=", "HEAD"], "show numstat"),
        }
    }

    fn repository_state(&self) -> Result<RepositoryState, GitError> {
        WorkingTree::discover(&self.repo_dir)?.state()
    }

    fn create_tag(&self, name: &str, message: Option<&str>) -> Result<(), GitError> {
        match message {
            Some(message) => self.run_git(&["tag", "-a", name, "-m", message], "create tag")?,
            None => self.run_git(&["tag", name], "create tag")?,
        };
        Ok(())
    }
}
