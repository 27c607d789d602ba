//! Detection of changed configuration parameters.

use regex_lite::Regex;
use tracing::debug;

use super::types::{ConfigChange, ScalarValue};
use crate::diff::FileChange;

const DEFAULT_CONFIG_FILE_PATTERNS: &[&str] = &[
    r"\.yaml$",
    r"\.yml$",
    r"\.json$",
    r"\.toml$",
    r"\.ini$",
    r"\.conf$",
    r"\.config$",
    r"config\.go$",
    r"settings\.go$",
    r"constants\.go$",
];

/// A `key: value` or `key = value` line from one side of a diff.
#[derive(Debug, Clone, PartialEq)]
struct ConfigEntry {
    parameter: String,
    value: ScalarValue,
}

/// Finds configuration files in a diff and reconciles their changed keys.
#[derive(Debug, Clone)]
pub struct ConfigChangeDetector {
    file_patterns: Vec<Regex>,
}

impl Default for ConfigChangeDetector {
    fn default() -> Self {
        Self {
            file_patterns: DEFAULT_CONFIG_FILE_PATTERNS
                .iter()
                .map(|p| Regex::new(p).expect("Invalid regex"))
                .collect(),
        }
    }
}

impl ConfigChangeDetector {
    pub fn new(file_patterns: Vec<Regex>) -> Self {
        Self { file_patterns }
    }

    pub fn is_config_file(&self, path: &str) -> bool {
        self.file_patterns.iter().any(|re| re.is_match(path))
    }

    pub fn detect(&self, files: &[FileChange]) -> Vec<ConfigChange> {
        files
            .iter()
            .filter(|f| self.is_config_file(&f.path))
            .flat_map(|f| extract_changes(f))
            .collect()
    }
}

/// Reconciled changes first, then removals, then additions; each group keeps
/// first-seen order.
fn extract_changes(file: &FileChange) -> Vec<ConfigChange> {
    let mut removed: Vec<ConfigEntry> = Vec::new();
    let mut added: Vec<ConfigEntry> = Vec::new();

    // The marker is the first byte of the raw line; an indented `- item`
    // is context, not a removal.
    for line in file.content.lines() {
        if line.starts_with("---") || line.starts_with("+++") {
            continue;
        }
        let (bucket, body) = if let Some(body) = line.strip_prefix('-') {
            (&mut removed, body)
        } else if let Some(body) = line.strip_prefix('+') {
            (&mut added, body)
        } else {
            continue;
        };

        if let Some(entry) = parse_config_line(body) {
            upsert(bucket, entry);
        }
    }

    let mut reconciled = Vec::new();
    let mut removals = Vec::new();
    for old in removed {
        match added.iter().position(|e| e.parameter == old.parameter) {
            Some(idx) => {
                let new = added.remove(idx);
                reconciled.push(ConfigChange {
                    file: file.path.clone(),
                    context: describe_value_change(&old.parameter, &old.value, &new.value),
                    parameter: old.parameter,
                    old_value: Some(old.value),
                    new_value: Some(new.value),
                });
            }
            None => removals.push(ConfigChange {
                file: file.path.clone(),
                context: format!("Configuration parameter removed: {}", old.parameter),
                parameter: old.parameter,
                old_value: Some(old.value),
                new_value: None,
            }),
        }
    }
    let additions = added.into_iter().map(|new| ConfigChange {
        file: file.path.clone(),
        context: format!("New configuration parameter added: {}", new.parameter),
        parameter: new.parameter,
        old_value: None,
        new_value: Some(new.value),
    });

    let changes: Vec<ConfigChange> = reconciled.into_iter().chain(removals).chain(additions).collect();
    if !changes.is_empty() {
        debug!(file = %file.path, changes = changes.len(), "Detected config changes");
    }
    changes
}

/// A repeated key keeps its first position and its latest value.
fn upsert(entries: &mut Vec<ConfigEntry>, entry: ConfigEntry) {
    match entries.iter_mut().find(|e| e.parameter == entry.parameter) {
        Some(existing) => existing.value = entry.value,
        None => entries.push(entry),
    }
}

/// Parse the text after the `+`/`-` marker. The earliest of `:` and `=`
/// separates key from value.
fn parse_config_line(body: &str) -> Option<ConfigEntry> {
    let body = body.trim();
    let body = body.strip_prefix("- ").unwrap_or(body).trim();
    if body.starts_with('#') || body.starts_with("//") || body.starts_with(';') {
        return None;
    }

    let sep = body.find([':', '='])?;
    let key = body[..sep].trim().trim_matches(|c| c == '"' || c == '\'');
    let value = body[sep + 1..].trim();

    if !is_key_path(key) {
        return None;
    }
    if value.is_empty() || matches!(value, "{" | "[" | "{}" | "[]") {
        return None;
    }

    let parameter = key.rsplit('.').next().unwrap_or(key).to_string();
    Some(ConfigEntry {
        parameter,
        value: ScalarValue::parse(value),
    })
}

fn is_key_path(key: &str) -> bool {
    !key.is_empty()
        && !key.starts_with('.')
        && !key.ends_with('.')
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
}

/// Explanation keyed off the parameter name, then the values.
pub fn describe_value_change(parameter: &str, old: &ScalarValue, new: &ScalarValue) -> String {
    let name = parameter.to_lowercase();
    let has = |words: &[&str]| words.iter().any(|w| name.contains(w));
    let (old_s, new_s) = (old.to_string(), new.to_string());
    let is_bool = |s: &str| s == "true" || s == "false";

    if has(&["timeout", "delay"]) {
        format!(
            "Timeout configuration '{parameter}' adjusted from {old_s} to {new_s} - likely for performance optimization or reliability improvement"
        )
    } else if has(&["port", "host", "url"]) {
        format!(
            "Network configuration '{parameter}' updated from {old_s} to {new_s} - may indicate environment change or service migration"
        )
    } else if has(&["size", "limit", "max", "min"]) {
        format!(
            "Limit configuration '{parameter}' changed from {old_s} to {new_s} - likely for capacity planning or performance tuning"
        )
    } else if has(&["enable", "disable"]) || is_bool(&old_s) || is_bool(&new_s) {
        match (old_s.as_str(), new_s.as_str()) {
            ("false", "true") => format!("Feature '{parameter}' enabled - functionality activation"),
            ("true", "false") => format!("Feature '{parameter}' disabled - functionality deactivation"),
            _ => format!("Boolean configuration '{parameter}' toggled from {old_s} to {new_s}"),
        }
    } else if has(&["version", "model"]) {
        format!(
            "Version configuration '{parameter}' updated from {old_s} to {new_s} - likely upgrade or compatibility change"
        )
    } else if has(&["level", "mode"]) {
        format!(
            "Mode configuration '{parameter}' changed from {old_s} to {new_s} - operational behavior modification"
        )
    } else {
        format!("Configuration value changed from '{old_s}' to '{new_s}'")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::ChangeType;

    fn config_file(path: &str, content: &str) -> FileChange {
        FileChange {
            path: path.to_string(),
            old_path: None,
            change_type: ChangeType::Modified,
            lines_added: 0,
            lines_deleted: 0,
            content: content.to_string(),
            language: "YAML".to_string(),
        }
    }

    #[test]
    fn test_reconciles_dotted_key() {
        let file = config_file(
            "config/app.yaml",
            "--- a/config/app.yaml\n+++ b/config/app.yaml\n@@ -1 +1 @@\n-config.Timeout = 30\n+config.Timeout = 60",
        );
        let changes = ConfigChangeDetector::default().detect(&[file]);

        assert_eq!(changes.len(), 1);
        let change = &changes[0];
        assert_eq!(change.parameter, "Timeout");
        assert_eq!(change.old_value.as_ref().map(ToString::to_string).as_deref(), Some("30"));
        assert_eq!(change.new_value.as_ref().map(ToString::to_string).as_deref(), Some("60"));
        assert!(change.context.starts_with("Timeout configuration 'Timeout' adjusted from 30 to 60"));
    }

    #[test]
    fn test_indented_list_context_is_not_a_change() {
        let file = config_file(
            "deploy/services.yaml",
            " services:\n   - name: api\n-timeout: 30\n+timeout: 60\n+  - name: worker",
        );
        let changes = ConfigChangeDetector::default().detect(&[file]);
        let summary: Vec<(&str, Option<String>, Option<String>)> = changes
            .iter()
            .map(|c| {
                (
                    c.parameter.as_str(),
                    c.old_value.as_ref().map(ToString::to_string),
                    c.new_value.as_ref().map(ToString::to_string),
                )
            })
            .collect();

        assert_eq!(
            summary,
            vec![
                ("timeout", Some("30".to_string()), Some("60".to_string())),
                ("name", None, Some("worker".to_string())),
            ]
        );
    }

    #[test]
    fn test_additions_and_removals_ordered() {
        let file = config_file(
            "settings.toml",
            "-legacy_flag = true\n-port = 8080\n+port = 9090\n+new_key = \"x\"",
        );
        let changes = ConfigChangeDetector::default().detect(&[file]);
        let summary: Vec<(&str, &str)> = changes
            .iter()
            .map(|c| (c.parameter.as_str(), c.context.as_str()))
            .collect();

        assert_eq!(summary[0].0, "port");
        assert!(summary[0].1.starts_with("Network configuration 'port'"));
        assert_eq!(summary[1], ("legacy_flag", "Configuration parameter removed: legacy_flag"));
        assert_eq!(summary[2], ("new_key", "New configuration parameter added: new_key"));
    }

    #[test]
    fn test_non_config_files_ignored() {
        let file = config_file("src/main.rs", "-timeout = 1\n+timeout = 2");
        assert!(ConfigChangeDetector::default().detect(&[file]).is_empty());
    }

    #[test]
    fn test_config_go_is_config() {
        let detector = ConfigChangeDetector::default();
        assert!(detector.is_config_file("internal/config/config.go"));
        assert!(!detector.is_config_file("internal/server.go"));
    }

    #[test]
    fn test_prose_and_comments_ignored() {
        assert_eq!(parse_config_line(" # retries: 3"), None);
        assert_eq!(parse_config_line(" See the notes below: they explain it"), None);
        assert_eq!(parse_config_line(" server:"), None);
    }

    #[test]
    fn test_earliest_separator_wins() {
        let entry = parse_config_line(" base_url = \"http://localhost:8080\"").unwrap();
        assert_eq!(entry.parameter, "base_url");
        assert_eq!(entry.value, ScalarValue::Text("http://localhost:8080".to_string()));
    }

    #[test]
    fn test_yaml_list_marker_and_json_key() {
        assert_eq!(parse_config_line(" - name: api").unwrap().parameter, "name");
        let entry = parse_config_line("   \"maxRetries\": 5,").unwrap();
        assert_eq!(entry.parameter, "maxRetries");
        assert_eq!(entry.value, ScalarValue::Integer(5));
    }

    #[test]
    fn test_describe_boolean_toggle() {
        let text = describe_value_change("cache", &ScalarValue::Bool(false), &ScalarValue::Bool(true));
        assert_eq!(text, "Feature 'cache' enabled - functionality activation");
    }

    #[test]
    fn test_describe_categories() {
        let v = |s: &str| ScalarValue::parse(s);
        assert!(describe_value_change("max_connections", &v("10"), &v("20")).starts_with("Limit configuration"));
        assert!(describe_value_change("model", &v("a"), &v("b")).starts_with("Version configuration"));
        assert!(describe_value_change("log_level", &v("info"), &v("debug")).starts_with("Mode configuration"));
        assert_eq!(
            describe_value_change("name", &v("a"), &v("b")),
            "Configuration value changed from 'a' to 'b'"
        );
    }
}
