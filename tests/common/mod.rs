//! Shared test utilities for integration tests.
//!
//! Not all functions are used by every test file, but they're shared across tests.
#![allow(dead_code)]

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::DateTime;
use git2::{Oid, Repository, Signature};

use grapheus::error::{GitError, ModelError};
use grapheus::git::{CommitInfo, GitTag, HistorySource, RepositoryState, TagRepository};
use grapheus::llm::ModelExecutor;
use grapheus::version::SemanticVersion;

/// Get the path to test fixtures directory.
pub fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

/// Get the path to a diff fixture.
pub fn diff_fixture(name: &str) -> PathBuf {
    fixtures_dir().join("diffs").join(name)
}

/// Get the path to a model response fixture.
pub fn response_fixture(name: &str) -> PathBuf {
    fixtures_dir().join("responses").join(name)
}

/// Read a fixture file as a string.
pub fn read_fixture(path: PathBuf) -> String {
    std::fs::read_to_string(&path).unwrap_or_else(|e| panic!("Failed to read fixture {:?}: {}", path, e))
}

// ── Diff text builders ──

fn hunk(removed: &[&str], added: &[&str]) -> String {
    let old_start = if removed.is_empty() { 0 } else { 1 };
    let new_start = if added.is_empty() { 0 } else { 1 };
    let mut text = format!(
        "@@ -{},{} +{},{} @@\n",
        old_start,
        removed.len(),
        new_start,
        added.len()
    );
    for line in removed {
        text.push_str(&format!("-{line}\n"));
    }
    for line in added {
        text.push_str(&format!("+{line}\n"));
    }
    text
}

/// A `diff --git` section for an edited file.
pub fn modified_file(path: &str, removed: &[&str], added: &[&str]) -> String {
    format!(
        "diff --git a/{path} b/{path}\nindex 1111111..2222222 100644\n--- a/{path}\n+++ b/{path}\n{}",
        hunk(removed, added)
    )
}

/// A `diff --git` section for a new file.
pub fn added_file(path: &str, lines: &[&str]) -> String {
    format!(
        "diff --git a/{path} b/{path}\nnew file mode 100644\nindex 0000000..2222222\n--- /dev/null\n+++ b/{path}\n{}",
        hunk(&[], lines)
    )
}

/// A `diff --git` section for a removed file.
pub fn deleted_file(path: &str, lines: &[&str]) -> String {
    format!(
        "diff --git a/{path} b/{path}\ndeleted file mode 100644\nindex 1111111..0000000\n--- a/{path}\n+++ /dev/null\n{}",
        hunk(lines, &[])
    )
}

/// A `diff --git` section for a moved file, optionally edited.
pub fn renamed_file(old: &str, new: &str, removed: &[&str], added: &[&str]) -> String {
    let mut text = format!(
        "diff --git a/{old} b/{new}\nsimilarity index 90%\nrename from {old}\nrename to {new}\n"
    );
    if !removed.is_empty() || !added.is_empty() {
        text.push_str(&format!(
            "index 1111111..2222222 100644\n--- a/{old}\n+++ b/{new}\n{}",
            hunk(removed, added)
        ));
    }
    text
}

/// `n` distinct added lines.
pub fn numbered_lines(prefix: &str, n: usize) -> Vec<String> {
    (1..=n).map(|i| format!("{prefix} line {i}")).collect()
}

pub fn as_strs(lines: &[String]) -> Vec<&str> {
    lines.iter().map(String::as_str).collect()
}

// ── Collaborator fakes ──

/// A model that replays canned answers in order and records every prompt.
pub struct StubModel {
    responses: Mutex<VecDeque<Result<String, ModelError>>>,
    prompts: Mutex<Vec<String>>,
}

impl StubModel {
    pub fn new(responses: impl IntoIterator<Item = &'static str>) -> Self {
        Self {
            responses: Mutex::new(responses.into_iter().map(|r| Ok(r.to_string())).collect()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(error: ModelError) -> Self {
        Self {
            responses: Mutex::new(VecDeque::from([Err(error)])),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl ModelExecutor for StubModel {
    async fn complete(&self, prompt: &str) -> Result<String, ModelError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(ModelError::EmptyResponse))
    }
}

pub fn commit_info(hash: &str, subject: &str) -> CommitInfo {
    CommitInfo {
        hash: hash.to_string(),
        subject: subject.to_string(),
        author: "Test User".to_string(),
        date: DateTime::parse_from_rfc3339("2024-05-01T12:00:00+00:00").unwrap(),
        slug: subject.replace(' ', "-"),
    }
}

/// History with fixed answers. `None` makes every query fail.
pub struct StaticHistory {
    pub commits: Option<Vec<CommitInfo>>,
}

impl StaticHistory {
    pub fn with_commits(subjects: &[&str]) -> Self {
        let commits = subjects
            .iter()
            .enumerate()
            .map(|(i, s)| commit_info(&format!("{:040x}", i + 1), s))
            .collect();
        Self { commits: Some(commits) }
    }

    pub fn broken() -> Self {
        Self { commits: None }
    }

    fn answer(&self, limit: usize) -> Result<Vec<CommitInfo>, GitError> {
        match &self.commits {
            Some(commits) => Ok(commits.iter().take(limit).cloned().collect()),
            None => Err(GitError::CommandFailed {
                operation: "log".to_string(),
                stderr: "fatal: your current branch does not have any commits yet".to_string(),
            }),
        }
    }
}

impl HistorySource for StaticHistory {
    fn recent_commits(&self, limit: usize) -> Result<Vec<CommitInfo>, GitError> {
        self.answer(limit)
    }

    fn file_history(&self, _paths: &[String], limit: usize) -> Result<Vec<CommitInfo>, GitError> {
        self.answer(limit)
    }
}

pub fn tag(name: &str) -> GitTag {
    GitTag {
        name: name.to_string(),
        version: SemanticVersion::from_tag(name),
        hash: "a".repeat(40),
        date: DateTime::parse_from_rfc3339("2024-05-01T12:00:00+00:00").unwrap(),
        message: String::new(),
        is_annotated: true,
    }
}

/// In-memory tags and numstat; records created tags.
pub struct FakeRepository {
    pub tags: Vec<GitTag>,
    pub numstat: String,
    pub state: RepositoryState,
    pub created: Mutex<Vec<(String, Option<String>)>>,
    pub numstat_requests: Mutex<Vec<Option<String>>>,
}

impl FakeRepository {
    pub fn new(tags: &[&str], numstat: &str) -> Self {
        Self {
            tags: tags.iter().map(|t| tag(t)).collect(),
            numstat: numstat.to_string(),
            state: RepositoryState::default(),
            created: Mutex::new(Vec::new()),
            numstat_requests: Mutex::new(Vec::new()),
        }
    }

    pub fn dirty(mut self) -> Self {
        self.state = RepositoryState {
            has_staged_changes: false,
            has_unstaged_changes: true,
        };
        self
    }

    pub fn created(&self) -> Vec<(String, Option<String>)> {
        self.created.lock().unwrap().clone()
    }
}

impl TagRepository for FakeRepository {
    fn list_tags(&self) -> Result<Vec<GitTag>, GitError> {
        Ok(self.tags.clone())
    }

    fn numstat_since(&self, since: Option<&str>) -> Result<String, GitError> {
        self.numstat_requests.lock().unwrap().push(since.map(str::to_string));
        Ok(self.numstat.clone())
    }

    fn repository_state(&self) -> Result<RepositoryState, GitError> {
        Ok(self.state)
    }

    fn create_tag(&self, name: &str, message: Option<&str>) -> Result<(), GitError> {
        self.created
            .lock()
            .unwrap()
            .push((name.to_string(), message.map(str::to_string)));
        Ok(())
    }
}

impl HistorySource for FakeRepository {
    fn recent_commits(&self, limit: usize) -> Result<Vec<CommitInfo>, GitError> {
        Ok(vec![commit_info(&"b".repeat(40), "feat: add export command")]
            .into_iter()
            .take(limit)
            .collect())
    }

    fn file_history(&self, _paths: &[String], _limit: usize) -> Result<Vec<CommitInfo>, GitError> {
        Ok(Vec::new())
    }
}

// ── Real repositories ──

/// A test git repository builder for integration tests.
pub struct TestRepo {
    pub dir: tempfile::TempDir,
    pub repo: Repository,
}

impl TestRepo {
    /// Create a new empty git repository in a temp directory.
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp directory");
        let repo = Repository::init(dir.path()).expect("Failed to init git repo");
        Self { dir, repo }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    fn signature(&self) -> Signature<'_> {
        Signature::now("Test User", "test@example.com").expect("Failed to create signature")
    }

    /// Write a file relative to the repository root.
    pub fn write(&self, path: &str, content: &str) {
        let full = self.dir.path().join(path);
        if let Some(parent) = full.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create directories");
        }
        std::fs::write(full, content).expect("Failed to write file");
    }

    /// Add a file to the index.
    pub fn stage(&self, path: &str) {
        let mut index = self.repo.index().expect("Failed to get index");
        index.add_path(Path::new(path)).expect("Failed to add file");
        index.write().expect("Failed to write index");
    }

    /// Commit the current index. Returns the commit OID.
    pub fn commit_index(&self, message: &str) -> Oid {
        let sig = self.signature();
        let mut index = self.repo.index().expect("Failed to get index");
        let tree_id = index.write_tree().expect("Failed to write tree");
        let tree = self.repo.find_tree(tree_id).expect("Failed to find tree");

        let parent = self.repo.head().ok().and_then(|h| h.peel_to_commit().ok());
        let parents: Vec<&git2::Commit> = parent.iter().collect();

        self.repo
            .commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
            .expect("Failed to create commit")
    }

    /// Write, stage and commit one file.
    pub fn commit_file(&self, path: &str, content: &str, message: &str) -> Oid {
        self.write(path, content);
        self.stage(path);
        self.commit_index(message)
    }
}
