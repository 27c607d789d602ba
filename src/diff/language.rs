//! File extension to language lookup.

use std::collections::HashMap;
use std::path::Path;

use super::types::UNKNOWN_LANGUAGE;

const DEFAULT_LANGUAGES: &[(&str, &str)] = &[
    ("go", "Go"),
    ("js", "JavaScript"),
    ("ts", "TypeScript"),
    ("py", "Python"),
    ("java", "Java"),
    ("cpp", "C++"),
    ("c", "C"),
    ("cs", "C#"),
    ("php", "PHP"),
    ("rb", "Ruby"),
    ("rs", "Rust"),
    ("sh", "Shell"),
    ("sql", "SQL"),
    ("html", "HTML"),
    ("css", "CSS"),
    ("scss", "SCSS"),
    ("sass", "Sass"),
    ("json", "JSON"),
    ("xml", "XML"),
    ("yaml", "YAML"),
    ("yml", "YAML"),
    ("md", "Markdown"),
    ("txt", "Text"),
];

/// Immutable extension lookup shared by the parsers.
#[derive(Debug, Clone)]
pub struct LanguageMap {
    by_extension: HashMap<String, String>,
}

impl Default for LanguageMap {
    fn default() -> Self {
        Self::from_pairs(DEFAULT_LANGUAGES.iter().copied())
    }
}

impl LanguageMap {
    /// Build a map from `(extension, language)` pairs. Extensions are given
    /// without the leading dot and matched case-insensitively.
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let by_extension = pairs
            .into_iter()
            .map(|(ext, lang)| (ext.trim_start_matches('.').to_lowercase(), lang.to_string()))
            .collect();
        Self { by_extension }
    }

    pub fn detect(&self, path: &str) -> String {
        Path::new(path)
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| self.by_extension.get(&ext.to_lowercase()))
            .cloned()
            .unwrap_or_else(|| UNKNOWN_LANGUAGE.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_known_extensions() {
        let map = LanguageMap::default();
        assert_eq!(map.detect("main.go"), "Go");
        assert_eq!(map.detect("src/lib.rs"), "Rust");
        assert_eq!(map.detect("config/app.yml"), "YAML");
        assert_eq!(map.detect("config/app.yaml"), "YAML");
        assert_eq!(map.detect("include/foo.cpp"), "C++");
    }

    #[test]
    fn test_detect_is_case_insensitive() {
        let map = LanguageMap::default();
        assert_eq!(map.detect("README.MD"), "Markdown");
    }

    #[test]
    fn test_detect_unknown() {
        let map = LanguageMap::default();
        assert_eq!(map.detect("Makefile"), "Unknown");
        assert_eq!(map.detect("image.png"), "Unknown");
    }

    #[test]
    fn test_custom_pairs() {
        let map = LanguageMap::from_pairs([(".kt", "Kotlin")]);
        assert_eq!(map.detect("App.kt"), "Kotlin");
        assert_eq!(map.detect("main.go"), "Unknown");
    }
}
