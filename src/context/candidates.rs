// src/context/candidates.rs

use std::sync::LazyLock;

use regex::Regex;

/// Anything between separators that cannot appear in a class name.
static CANDIDATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"[^\s"'`<>=;{}(),]+"#).expect("candidate pattern is valid")
});

/// Split template text into class-name candidates.
///
/// This is deliberately permissive: most candidates will not be known
/// classes, and the design system discards those.
pub fn extract_candidates(text: &str) -> impl Iterator<Item = &str> {
    CANDIDATE
        .find_iter(text)
        .map(|m| m.as_str().trim_end_matches(['.', ':']))
        .filter(|s| !s.is_empty())
}
