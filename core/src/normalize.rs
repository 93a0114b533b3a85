use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref SKILL_DELIMITERS: Regex = Regex::new(r"[,;|]").expect("valid regex");
}

/// Canonical form used for every comparison: lowercase, surrounding whitespace removed.
pub fn normalize(s: &str) -> String {
    s.trim().to_lowercase()
}

/// Split a delimited skill string (`"React, Node; SQL|Git"`) into trimmed, non-empty parts.
pub fn split_skills(s: &str) -> Vec<String> {
    SKILL_DELIMITERS
        .split(s)
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect()
}
