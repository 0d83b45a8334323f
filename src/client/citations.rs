//! Citation marker handling for answer text.

use once_cell::sync::Lazy;
use regex::Regex;

/// `[n]` followed by one or more empty link targets: `[1]()`, `[2]()()`.
static LINKED_MARKER_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[(\d+)\](\(\))+").expect("Invalid linked marker regex"));

/// Plain `[n]` marker.
static MARKER_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[(\d+)\]").expect("Invalid marker regex"));

/// Rewrite markdown-style markers `[n]()` and `[n]()()` to plain `[n]`.
pub fn clean_citation_markers(content: &str) -> String {
    LINKED_MARKER_REGEX.replace_all(content, "[$1]").into_owned()
}

/// Citation numbers referenced in `content` that point at an existing
/// retrieval.
///
/// Numbers are 1-based as they appear in the text, deduplicated, in order of
/// first appearance. Markers outside `1..=retrieval_count` are ignored.
pub fn citation_numbers(content: &str, retrieval_count: usize) -> Vec<usize> {
    let cleaned = clean_citation_markers(content);
    let mut numbers = Vec::new();
    for caps in MARKER_REGEX.captures_iter(&cleaned) {
        let Ok(number) = caps[1].parse::<usize>() else {
            continue;
        };
        if (1..=retrieval_count).contains(&number) && !numbers.contains(&number) {
            numbers.push(number);
        }
    }
    numbers
}
