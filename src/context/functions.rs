//! Function declaration changes found on added and removed lines.

use std::collections::HashMap;

use regex_lite::Regex;

use super::types::{FunctionChange, FunctionChangeType};
use crate::diff::FileChange;

/// Words the loose declaration patterns pick up from ordinary statements.
const NOT_FUNCTION_NAMES: &[&str] = &["if", "for", "while", "switch", "return", "new", "catch", "else"];

/// Lines opening with these words are statements, never declarations.
const STATEMENT_WORDS: &[&str] = &["return", "new", "throw", "else", "case", "yield", "await"];

const IMPACTS: &[(&[&str], &str)] = &[
    (
        &["public", "pub fn", "pub(", "pub async"],
        "Public API change - may affect external consumers and require version bump",
    ),
    (&["private", "internal"], "Internal implementation change - refactoring or optimization"),
    (&["protected"], "Protected method change - may affect inheritance hierarchy"),
    (&["test"], "Test function change - improving test coverage or fixing test issues"),
    (&["main"], "Entry point change - application startup or configuration modification"),
    (&["init"], "Initialization function change - setup or configuration modification"),
    (
        &["handler", "controller"],
        "Request handler change - API endpoint or business logic modification",
    ),
    (
        &["service", "manager"],
        "Service layer change - business logic or data processing modification",
    ),
    (&["util", "helper"], "Utility function change - shared functionality improvement"),
    (
        &["validate", "check"],
        "Validation logic change - input validation or business rule modification",
    ),
    (&["parse", "format"], "Data processing change - parsing or formatting logic modification"),
    (
        &["async", "await", "goroutine"],
        "Asynchronous function change - concurrency or performance optimization",
    ),
    (&["context"], "Context-aware function change - timeout or cancellation handling"),
    (&["error"], "Error handling function change - improved error management"),
];

const GENERIC_IMPACT: &str = "Function signature or implementation change - logic modification or enhancement";

/// Classify a declaration line by the first keyword group it contains.
pub fn function_impact(declaration: &str) -> &'static str {
    let lowered = declaration.to_lowercase();
    IMPACTS
        .iter()
        .find(|(words, _)| words.iter().any(|w| lowered.contains(w)))
        .map(|(_, impact)| *impact)
        .unwrap_or(GENERIC_IMPACT)
}

/// Declaration regexes per language. Each regex names the function in its
/// first capture group.
#[derive(Debug, Clone)]
pub struct FunctionPatterns {
    by_language: HashMap<String, Vec<Regex>>,
}

impl Default for FunctionPatterns {
    fn default() -> Self {
        let table: &[(&str, &[&str])] = &[
            ("go", &[r"func\s+(\w+)\s*\(", r"func\s+\(\w+\s+\*?\w+\)\s+(\w+)\s*\("]),
            (
                "javascript",
                &[r"function\s+(\w+)\s*\(", r"(\w+)\s*:\s*function\s*\(", r"(\w+)\s*=>\s*"],
            ),
            ("typescript", &[r"function\s+(\w+)\s*\(", r"(\w+)\s*:\s*\(.*\)\s*=>"]),
            ("python", &[r"def\s+(\w+)\s*\("]),
            (
                "java",
                &[
                    r"^(?:@\w+\s+)*(?:(?:public|private|protected|static|final|abstract|synchronized|native|default)\s+)*(?:<[^>]*>\s+)?[\w.\[\]?]+(?:<[^()]*>)?(?:\[\])*\s+(\w+)\s*\(",
                ],
            ),
            ("rust", &[r"fn\s+(\w+)\s*[<(]"]),
        ];

        let by_language = table
            .iter()
            .map(|(lang, patterns)| {
                let compiled = patterns.iter().map(|p| Regex::new(p).expect("Invalid regex")).collect();
                (lang.to_string(), compiled)
            })
            .collect();
        Self { by_language }
    }
}

impl FunctionPatterns {
    pub fn insert(&mut self, language: &str, patterns: Vec<Regex>) {
        self.by_language.insert(language.to_lowercase(), patterns);
    }

    fn for_language(&self, language: &str) -> Option<&[Regex]> {
        self.by_language.get(&language.to_lowercase()).map(Vec::as_slice)
    }
}

#[derive(Debug, Clone, Default)]
pub struct FunctionChangeDetector {
    patterns: FunctionPatterns,
}

impl FunctionChangeDetector {
    pub fn new(patterns: FunctionPatterns) -> Self {
        Self { patterns }
    }

    pub fn detect(&self, files: &[FileChange]) -> Vec<FunctionChange> {
        files.iter().flat_map(|f| self.detect_in_file(f)).collect()
    }

    /// A name declared on both a removed and an added line of the same file is
    /// reported once as modified, at the position of its first appearance.
    fn detect_in_file(&self, file: &FileChange) -> Vec<FunctionChange> {
        let Some(patterns) = self.patterns.for_language(&file.language) else {
            return Vec::new();
        };

        let mut changes: Vec<FunctionChange> = Vec::new();
        for line in file.content.lines() {
            if line.starts_with("+++") || line.starts_with("---") {
                continue;
            }
            let change_type = match line.chars().next() {
                Some('+') => FunctionChangeType::Added,
                Some('-') => FunctionChangeType::Removed,
                _ => continue,
            };
            let declaration = line[1..].trim();
            let Some(name) = find_function_name(patterns, declaration) else {
                continue;
            };

            match changes.iter_mut().find(|c| c.function_name == name) {
                Some(existing) if existing.change_type != change_type => {
                    existing.change_type = FunctionChangeType::Modified;
                }
                Some(_) => {}
                None => changes.push(FunctionChange {
                    file: file.path.clone(),
                    function_name: name,
                    change_type,
                    impact: function_impact(declaration).to_string(),
                }),
            }
        }
        changes
    }
}

fn find_function_name(patterns: &[Regex], declaration: &str) -> Option<String> {
    let first_word = declaration.split(|c: char| !c.is_alphanumeric() && c != '_').next()?;
    if STATEMENT_WORDS.contains(&first_word) {
        return None;
    }
    patterns.iter().find_map(|re| {
        let name = re.captures(declaration)?.get(1)?.as_str();
        (!name.is_empty() && !NOT_FUNCTION_NAMES.contains(&name)).then(|| name.to_string())
    })
}
