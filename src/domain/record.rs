use serde::{Deserialize, Serialize};

/// One press-clipping row after normalization, ready for summarization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedRecord {
    pub publication: String,
    /// `DD/MM/YYYY` when the date parsed, otherwise the trimmed raw cell text.
    pub date: String,
    pub title: String,
    pub content: String,
    pub url: Option<String>,
}

/// Result of one summarization attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SummaryOutcome {
    Generated { text: String },
    /// The external call failed; `text` is the substituted fallback.
    Fallback { text: String, reason: String },
}

impl SummaryOutcome {
    pub fn text(&self) -> &str {
        match self {
            SummaryOutcome::Generated { text } | SummaryOutcome::Fallback { text, .. } => text,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, SummaryOutcome::Fallback { .. })
    }
}

/// A finalized press-review entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummarizedRecord {
    pub record: NormalizedRecord,
    pub summary: SummaryOutcome,
}

impl SummarizedRecord {
    pub fn new(record: NormalizedRecord, summary: SummaryOutcome) -> Self {
        Self { record, summary }
    }

    pub fn summary_text(&self) -> &str {
        self.summary.text()
    }
}
