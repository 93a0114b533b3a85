use crate::normalize::normalize;
use std::collections::BTreeSet;

/// Broaden one user-entered skill token into the vocabulary entries related to it.
///
/// An entry is related when its normalized form contains the token (which also
/// covers prefixes) or is itself contained in the token. The raw token is
/// always part of the result so skills absent from the vocabulary still count.
pub fn expand<S: AsRef<str>>(token: &str, vocabulary: &[S]) -> BTreeSet<String> {
    let mut out = BTreeSet::new();
    let needle = normalize(token);
    if !needle.is_empty() {
        for entry in vocabulary {
            let entry = entry.as_ref();
            let candidate = normalize(entry);
            if candidate.is_empty() { continue; }
            if candidate.contains(&needle) || needle.contains(&candidate) {
                out.insert(entry.to_string());
            }
        }
    }
    out.insert(token.to_string());
    out
}
