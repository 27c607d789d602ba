//! Version bump analysis requested from the model.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::bump::BumpType;
use super::semantic::SemanticVersion;
use crate::diff::ProcessedDiff;
use crate::error::ModelError;
use crate::git::CommitInfo;
use crate::llm::extract_json;

/// Diff lines shown per file in the version prompt.
const SAMPLE_LINES_PER_FILE: usize = 20;

/// The model's verdict on how far to bump.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VersionAnalysis {
    pub recommended_bump: BumpType,
    /// Always within `[0, 1]`.
    pub confidence: f64,
    pub reasoning: String,
    pub breaking_changes: Vec<String>,
    pub new_features: Vec<String>,
    pub bug_fixes: Vec<String>,
    pub documentation: Vec<String>,
    pub dependencies: Vec<String>,
}

/// Wire shape; the bump stays a string so an unknown value gets its own error.
#[derive(Deserialize)]
struct RawVersionAnalysis {
    recommended_bump: String,
    #[serde(default)]
    confidence: f64,
    #[serde(default)]
    reasoning: String,
    #[serde(default)]
    breaking_changes: Vec<String>,
    #[serde(default)]
    new_features: Vec<String>,
    #[serde(default)]
    bug_fixes: Vec<String>,
    #[serde(default)]
    documentation: Vec<String>,
    #[serde(default)]
    dependencies: Vec<String>,
}

/// Decode the JSON object embedded in a model response.
pub fn parse_version_analysis(response: &str) -> Result<VersionAnalysis, ModelError> {
    let json = extract_json(response)
        .ok_or_else(|| ModelError::InvalidJson(format!("no JSON object found in response: {}", response.trim())))?;

    let raw: RawVersionAnalysis = serde_json::from_str(json)
        .map_err(|e| ModelError::InvalidJson(format!("Failed to parse: {e}. Content: {json}")))?;

    let recommended_bump = raw
        .recommended_bump
        .parse::<BumpType>()
        .map_err(|_| ModelError::InvalidBump(raw.recommended_bump.clone()))?;

    debug!(bump = %recommended_bump, confidence = raw.confidence, "Parsed version analysis");
    Ok(VersionAnalysis {
        recommended_bump,
        confidence: raw.confidence.clamp(0.0, 1.0),
        reasoning: raw.reasoning,
        breaking_changes: raw.breaking_changes,
        new_features: raw.new_features,
        bug_fixes: raw.bug_fixes,
        documentation: raw.documentation,
        dependencies: raw.dependencies,
    })
}

/// Prompt asking the model to classify a change set as major, minor or patch.
pub fn build_version_prompt(
    processed: &ProcessedDiff,
    recent_commits: &[CommitInfo],
    current: &SemanticVersion,
) -> String {
    let mut prompt = String::new();

    prompt.push_str(
        "You are a release engineer applying semantic versioning. Decide whether the \
         changes below require a major, minor or patch release.\n\n",
    );
    prompt.push_str(&format!("CURRENT VERSION: {current}\n"));
    prompt.push_str(&format!("SUMMARY: {}\n", processed.summary));
    prompt.push_str(&format!(
        "Files changed: {}, lines added: {}, lines deleted: {}\n",
        processed.total_files, processed.total_added, processed.total_deleted
    ));

    if !recent_commits.is_empty() {
        prompt.push_str("\nRECENT COMMITS:\n");
        for commit in recent_commits {
            prompt.push_str(&format!("- {} {}\n", commit.short_hash(), commit.subject));
        }
    }

    prompt.push_str("\nFILE CHANGES:\n");
    for file in processed.files() {
        prompt.push_str(&format!(
            "- {} ({}): +{} -{} lines\n",
            file.path, file.change_type, file.lines_added, file.lines_deleted
        ));
        let sample: Vec<&str> = file
            .content
            .lines()
            .take(SAMPLE_LINES_PER_FILE)
            .filter(|l| l.starts_with('+') || l.starts_with('-'))
            .collect();
        if !sample.is_empty() {
            prompt.push_str("  Sample changes:\n");
            for line in sample {
                prompt.push_str(&format!("    {line}\n"));
            }
        }
    }

    prompt.push_str(
        "\nRespond with only a JSON object:\n\
         {\n  \"recommended_bump\": \"major|minor|patch\",\n  \"confidence\": 0.0-1.0,\n  \
         \"reasoning\": \"...\",\n  \"breaking_changes\": [],\n  \"new_features\": [],\n  \
         \"bug_fixes\": [],\n  \"documentation\": [],\n  \"dependencies\": []\n}\n",
    );
    prompt
}
