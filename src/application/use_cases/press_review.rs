use crate::application::use_cases::report_renderer::{render, DEFAULT_REPORT_TITLE};
use crate::application::use_cases::row_transformer::transform;
use crate::application::use_cases::row_validator::validate;
use crate::application::use_cases::summarization::SummarizeUseCase;
use crate::domain::error::{AppError, Result};
use crate::domain::issue::Issue;
use crate::domain::record::SummarizedRecord;
use crate::domain::table::Table;
use serde::Serialize;
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct ReviewOptions {
    pub title: String,
    /// Only the first N rows are summarized; `None` or 0 means all rows.
    pub max_rows: Option<usize>,
}

impl Default for ReviewOptions {
    fn default() -> Self {
        Self {
            title: DEFAULT_REPORT_TITLE.to_string(),
            max_rows: None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PressReview {
    pub html: String,
    pub issues: Vec<Issue>,
    pub records: Vec<SummarizedRecord>,
}

impl PressReview {
    pub fn fallback_count(&self) -> usize {
        self.records
            .iter()
            .filter(|r| r.summary.is_fallback())
            .count()
    }
}

/// Validation, per-row normalization and summarization, rendering.
pub struct PressReviewUseCase {
    summarizer: SummarizeUseCase,
}

impl PressReviewUseCase {
    pub fn new(summarizer: SummarizeUseCase) -> Self {
        Self { summarizer }
    }

    /// Fails only when the mandatory columns cannot be resolved.
    pub async fn execute(&self, table: &Table, options: &ReviewOptions) -> Result<PressReview> {
        let report = validate(table);
        for issue in &report.issues {
            warn!(blocking = issue.is_blocking(), "{}", issue.message);
        }

        let Some(schema) = report.schema.as_ref() else {
            return Err(AppError::SchemaError(report.issue_messages()));
        };

        let limit = match options.max_rows {
            Some(n) if n > 0 => n.min(table.len()),
            _ => table.len(),
        };
        info!(rows = limit, total = table.len(), "Summarizing rows");

        let mut records = Vec::with_capacity(limit);
        for (idx, row) in table.rows().iter().take(limit).enumerate() {
            let record = transform(
                row,
                schema,
                report.content_header.as_deref(),
                report.title_header.as_deref(),
                report.dates.get(idx),
            );
            let summary = self.summarizer.summarize(&record).await;
            records.push(SummarizedRecord::new(record, summary));
        }

        let html = render(&records, &options.title);

        let review = PressReview {
            html,
            issues: report.issues,
            records,
        };
        info!(
            records = review.records.len(),
            fallbacks = review.fallback_count(),
            "Press review rendered"
        );

        Ok(review)
    }
}
