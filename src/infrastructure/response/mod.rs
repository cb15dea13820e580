use once_cell::sync::Lazy;
use regex::Regex;

static THINK_TAG_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<think>[\s\S]*?</think>|<think\s*/>").unwrap());

static REASONING_TAG_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<reasoning>[\s\S]*?</reasoning>").unwrap());

// "Résumé :", "**Résumé** -", "Summary:" at the very start
static LEADING_LABEL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\**\s*(r[ée]sum[ée]|summary|synth[èe]se)\s*\**\s*[:\-–]\s*\**\s*").unwrap()
});

static WHITESPACE_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Reduce a raw model answer to one plain paragraph.
pub fn clean_llm_response(response: &str) -> String {
    let cleaned = THINK_TAG_PATTERN.replace_all(response, "");
    let cleaned = REASONING_TAG_PATTERN.replace_all(&cleaned, "");
    let cleaned = WHITESPACE_PATTERN.replace_all(cleaned.trim(), " ");
    let cleaned = LEADING_LABEL_PATTERN.replace(&cleaned, "");

    strip_wrapping_quotes(cleaned.trim()).trim().to_string()
}

fn strip_wrapping_quotes(s: &str) -> &str {
    for (open, close) in [('"', '"'), ('«', '»'), ('“', '”')] {
        if let Some(inner) = s.strip_prefix(open).and_then(|rest| rest.strip_suffix(close)) {
            if !inner.contains(open) && !inner.contains(close) {
                return inner;
            }
        }
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_think_tags() {
        let input = "<think>Some reasoning here</think>The actual response";
        assert_eq!(clean_llm_response(input), "The actual response");
    }

    #[test]
    fn test_clean_self_closing_think() {
        let input = "<think />The actual response";
        assert_eq!(clean_llm_response(input), "The actual response");
    }

    #[test]
    fn test_clean_reasoning_tags() {
        let input = "<reasoning>Internal reasoning</reasoning>Final answer";
        assert_eq!(clean_llm_response(input), "Final answer");
    }

    #[test]
    fn test_collapses_to_single_paragraph() {
        let input = "  Première phrase.\n\n\nDeuxième   phrase.\n";
        assert_eq!(
            clean_llm_response(input),
            "Première phrase. Deuxième phrase."
        );
    }

    #[test]
    fn test_strips_leading_label_and_quotes() {
        assert_eq!(
            clean_llm_response("**Résumé :** Le gouvernement annonce..."),
            "Le gouvernement annonce..."
        );
        assert_eq!(
            clean_llm_response("« Une synthèse courte. »"),
            "Une synthèse courte."
        );
    }

    #[test]
    fn test_clean_preserves_normal_text() {
        let input = "This is a normal response without any special tags.";
        assert_eq!(
            clean_llm_response(input),
            "This is a normal response without any special tags."
        );
    }

    #[test]
    fn test_empty_after_cleaning() {
        assert_eq!(clean_llm_response("<think>only thoughts</think>\n"), "");
    }
}
