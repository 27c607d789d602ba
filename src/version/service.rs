//! Release planning: latest tag, model analysis, next version and tagging.

use serde::Serialize;
use tracing::{debug, info, warn};

use super::analysis::{VersionAnalysis, build_version_prompt, parse_version_analysis};
use super::bump::{BumpType, next_version};
use super::semantic::{PreReleaseKind, SemanticVersion};
use crate::diff::{DiffProcessor, LanguageMap, parse_numstat};
use crate::error::{ReleaseError, VersionError};
use crate::git::{HistorySource, RepositoryState, TagRepository, latest_version};
use crate::llm::ModelExecutor;

/// Commits shown to the model alongside the numstat summary.
const RECENT_COMMIT_LIMIT: usize = 10;

/// Caller choices for one release.
#[derive(Debug, Clone)]
pub struct TaggingOptions {
    /// Replaces the model's recommendation outright.
    pub force_bump: Option<BumpType>,
    pub pre_release: Option<PreReleaseKind>,
    /// Annotation message; defaults to `Release X.Y.Z`.
    pub message: Option<String>,
    pub annotated: bool,
    pub dry_run: bool,
    /// Exact version to release. Skips the model entirely.
    pub version_override: Option<SemanticVersion>,
}

impl Default for TaggingOptions {
    fn default() -> Self {
        Self {
            force_bump: None,
            pre_release: None,
            message: None,
            annotated: true,
            dry_run: false,
            version_override: None,
        }
    }
}

/// Everything decided before a tag is written.
#[derive(Debug, Clone, Serialize)]
pub struct ReleasePlan {
    pub current: SemanticVersion,
    /// Tag the current version was read from, if any.
    pub previous_tag: Option<String>,
    pub next: SemanticVersion,
    pub tag_name: String,
    pub message: String,
    pub annotated: bool,
    pub analysis: Option<VersionAnalysis>,
}

impl ReleasePlan {
    fn new(
        current: SemanticVersion,
        previous_tag: Option<String>,
        next: SemanticVersion,
        analysis: Option<VersionAnalysis>,
        options: &TaggingOptions,
    ) -> Self {
        Self {
            current,
            previous_tag,
            tag_name: next.tag_name(),
            message: options
                .message
                .clone()
                .unwrap_or_else(|| default_tag_message(&next)),
            annotated: options.annotated,
            next,
            analysis,
        }
    }
}

pub fn default_tag_message(version: &SemanticVersion) -> String {
    format!("Release {version}")
}

/// Tagging requires a clean index and working tree.
pub fn validate_repository_state(state: RepositoryState) -> Result<(), VersionError> {
    if state.is_clean() {
        Ok(())
    } else {
        Err(VersionError::DirtyWorkingTree {
            staged: state.has_staged_changes,
            unstaged: state.has_unstaged_changes,
        })
    }
}

pub struct ReleasePlanner<R, M> {
    repository: R,
    model: M,
    processor: DiffProcessor,
    languages: LanguageMap,
}

impl<R, M> ReleasePlanner<R, M>
where
    R: TagRepository + HistorySource,
    M: ModelExecutor,
{
    pub fn new(repository: R, model: M) -> Self {
        Self {
            repository,
            model,
            processor: DiffProcessor::default(),
            languages: LanguageMap::default(),
        }
    }

    pub fn with_processor(mut self, processor: DiffProcessor) -> Self {
        self.processor = processor;
        self
    }

    pub fn with_languages(mut self, languages: LanguageMap) -> Self {
        self.languages = languages;
        self
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    /// Decide the next version from the changes since the latest version tag.
    pub async fn plan(&self, options: &TaggingOptions) -> Result<ReleasePlan, ReleaseError> {
        let tags = self.repository.list_tags()?;
        let current = latest_version(&tags);
        let previous_tag = tags
            .iter()
            .find(|t| t.version == Some(current))
            .map(|t| t.name.clone());
        debug!(%current, previous_tag = ?previous_tag, tags = tags.len(), "Resolved current version");

        if let Some(requested) = options.version_override {
            if requested <= current {
                return Err(VersionError::NotNewer {
                    current: current.to_string(),
                    requested: requested.to_string(),
                }
                .into());
            }
            return Ok(ReleasePlan::new(current, previous_tag, requested, None, options));
        }

        let numstat = self.repository.numstat_since(previous_tag.as_deref())?;
        let summary = parse_numstat(&numstat, &self.languages);
        if summary.is_empty() {
            return Err(ReleaseError::NoChanges);
        }

        let processed = self.processor.process(summary);
        let commits = self
            .repository
            .recent_commits(RECENT_COMMIT_LIMIT)
            .unwrap_or_else(|e| {
                warn!(error = %e, "Could not read recent commits; continuing without them");
                Vec::new()
            });

        let prompt = build_version_prompt(&processed, &commits, &current);
        let response = self.model.complete(&prompt).await?;
        let analysis = parse_version_analysis(&response)?;

        let next = next_version(
            &current,
            analysis.recommended_bump,
            options.force_bump,
            options.pre_release,
        )?;
        info!(%current, %next, bump = %analysis.recommended_bump, "Planned release");

        Ok(ReleasePlan::new(current, previous_tag, next, Some(analysis), options))
    }

    /// Write the planned tag. Returns `false` for a dry run.
    pub fn tag(&self, plan: &ReleasePlan, options: &TaggingOptions) -> Result<bool, ReleaseError> {
        if options.dry_run {
            info!(tag = %plan.tag_name, "Dry run; tag not created");
            return Ok(false);
        }

        validate_repository_state(self.repository.repository_state()?)?;

        let message = plan.annotated.then_some(plan.message.as_str());
        self.repository.create_tag(&plan.tag_name, message)?;
        info!(tag = %plan.tag_name, annotated = plan.annotated, "Created tag");
        Ok(true)
    }
}
