// Header resolution for press-clipping sheets.
//
// Headers and candidates are compared after normalization (trim, lowercase,
// diacritics removed). Exact match only; no partial or fuzzy matching.

use crate::domain::schema::LogicalField;
use std::collections::HashMap;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Trim, lowercase and strip combining marks ("  Média " -> "media").
pub fn normalize_header(s: &str) -> String {
    s.trim()
        .to_lowercase()
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect()
}

/// First header matching one of `candidates`, in candidate priority order.
///
/// When two headers normalize to the same key the later one wins.
pub fn resolve<'a, S: AsRef<str>>(headers: &'a [S], candidates: &[&str]) -> Option<&'a str> {
    let normalized: HashMap<String, &'a str> = headers
        .iter()
        .map(|h| (normalize_header(h.as_ref()), h.as_ref()))
        .collect();

    candidates
        .iter()
        .find_map(|cand| normalized.get(&normalize_header(cand)).copied())
}

/// Resolve a logical field against its declared candidate list.
pub fn resolve_field<S: AsRef<str>>(headers: &[S], field: LogicalField) -> Option<&str> {
    resolve(headers, field.candidates())
}
