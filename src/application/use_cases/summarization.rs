use crate::domain::error::{AppError, Result};
use crate::domain::llm_config::LLMConfig;
use crate::domain::record::{NormalizedRecord, SummaryOutcome};
use crate::infrastructure::llm_clients::LLMClient;
use crate::infrastructure::response::clean_llm_response;
use std::sync::Arc;
use tracing::{debug, warn};

/// Context used when a record has no text at all.
pub const DEFAULT_CONTEXT: &str = "Article de presse";

/// Summary used when the call fails and the record has no title.
pub const SUMMARY_PLACEHOLDER: &str = "Résumé indisponible";

pub const DEFAULT_MAX_WORDS: usize = 60;

pub struct SummarizeUseCase {
    llm_client: Arc<dyn LLMClient + Send + Sync>,
    config: LLMConfig,
    max_words: usize,
}

impl SummarizeUseCase {
    pub fn new(
        llm_client: Arc<dyn LLMClient + Send + Sync>,
        config: LLMConfig,
        max_words: usize,
    ) -> Self {
        Self {
            llm_client,
            config,
            max_words,
        }
    }

    /// Summarize one record. Never fails: any error from the external call
    /// is replaced by the record's title (or the placeholder).
    pub async fn summarize(&self, record: &NormalizedRecord) -> SummaryOutcome {
        let prompt = build_prompt(build_context(record), self.max_words);

        match self.generate(&prompt).await {
            Ok(text) => {
                debug!(publication = %record.publication, words = text.split_whitespace().count(), "Summary generated");
                SummaryOutcome::Generated { text }
            }
            Err(e) => {
                warn!(publication = %record.publication, error = %e, "Summary failed, using fallback");
                SummaryOutcome::Fallback {
                    text: fallback_summary(record),
                    reason: e.to_string(),
                }
            }
        }
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        let raw = self.llm_client.generate(&self.config, prompt).await?;
        let text = clean_llm_response(&raw);
        if text.is_empty() {
            return Err(AppError::LLMError("Empty summary returned".to_string()));
        }
        Ok(text)
    }
}

/// First non-empty of content, title, publication, URL.
pub fn build_context(record: &NormalizedRecord) -> &str {
    [
        record.content.as_str(),
        record.title.as_str(),
        record.publication.as_str(),
        record.url.as_deref().unwrap_or_default(),
    ]
    .into_iter()
    .find(|s| !s.trim().is_empty())
    .unwrap_or(DEFAULT_CONTEXT)
}

pub fn build_prompt(context: &str, max_words: usize) -> String {
    format!(
        "Résume cet article de presse en français, de manière claire et concise (max ~{} mots).\n\n\
         CONTEXTE:\n{}\n\n\
         Attendu: un seul paragraphe, neutre et informatif.",
        max_words, context
    )
}

pub fn fallback_summary(record: &NormalizedRecord) -> String {
    if record.title.trim().is_empty() {
        SUMMARY_PLACEHOLDER.to_string()
    } else {
        record.title.clone()
    }
}
