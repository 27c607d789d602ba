//! Integration tests for diff prioritization and chunking.

mod common;

use common::*;
use grapheus::diff::{ChangeType, DiffProcessor, parse_diff};

fn mixed_diff(modified: usize) -> String {
    let mut sections: Vec<String> = (0..modified)
        .map(|i| modified_file(&format!("src/mod{i}.rs"), &["a"], &["b"]))
        .collect();
    sections.push(added_file("src/new.rs", &["fn new() {}"]));
    sections.push(deleted_file("src/gone.rs", &["fn gone() {}"]));
    sections.join("")
}

#[test]
fn test_file_cap_is_respected() {
    let processed = DiffProcessor::new(4000, 5).process(parse_diff(&mixed_diff(10)));

    assert_eq!(processed.total_files, 5);
    assert_eq!(processed.files().count(), 5);
    // Totals describe the whole diff, not the kept subset
    assert_eq!(processed.total_added, 11);
    assert_eq!(processed.diff_summary.total_files, 12);
}

#[test]
fn test_added_and_deleted_sort_before_modified() {
    let processed = DiffProcessor::default().process(parse_diff(&mixed_diff(3)));
    let types: Vec<ChangeType> = processed.files().map(|f| f.change_type).collect();

    assert_eq!(types[0], ChangeType::Added);
    assert_eq!(types[1], ChangeType::Deleted);
    assert!(types[2..].iter().all(|t| *t == ChangeType::Modified));
}

#[test]
fn test_truncation_keeps_highest_priority_files() {
    let processed = DiffProcessor::new(4000, 2).process(parse_diff(&mixed_diff(4)));
    let paths: Vec<&str> = processed.files().map(|f| f.path.as_str()).collect();
    assert_eq!(paths, vec!["src/new.rs", "src/gone.rs"]);
}

#[test]
fn test_chunks_stay_within_budget() {
    let max_chunk_size = 400;
    let processed = DiffProcessor::new(max_chunk_size, 50).process(parse_diff(&mixed_diff(12)));

    assert!(processed.chunks.len() > 1);
    for chunk in &processed.chunks {
        let size: usize = chunk.files.iter().map(|f| f.content.chars().count()).sum();
        assert_eq!(chunk.size, size);
        assert!(chunk.size <= max_chunk_size || chunk.files.len() == 1);
    }
}

#[test]
fn test_oversized_file_gets_own_chunk() {
    let big = numbered_lines("payload", 200);
    let diff = [
        modified_file("small_a.rs", &[], &["x"]),
        modified_file("big.rs", &[], &as_strs(&big)),
        modified_file("small_b.rs", &[], &["y"]),
    ]
    .join("");

    let processed = DiffProcessor::new(500, 20).process(parse_diff(&diff));
    let big_chunk = processed
        .chunks
        .iter()
        .find(|c| c.files.iter().any(|f| f.path == "big.rs"))
        .unwrap();

    assert_eq!(big_chunk.files.len(), 1);
    assert!(big_chunk.size > 500);
    assert_eq!(big_chunk.description, "modified: big.rs (200+, 0-)");
}

#[test]
fn test_summary_text() {
    let processed = DiffProcessor::default().process(parse_diff(&mixed_diff(1)));
    assert!(processed.summary.starts_with("Changes: "));
    assert!(processed.summary.contains("1 added"));
    assert!(processed.summary.contains("Rust (3)"));

    let empty = DiffProcessor::default().process(parse_diff(""));
    assert_eq!(empty.summary, "No changes detected");
    assert!(empty.chunks.is_empty());
}
