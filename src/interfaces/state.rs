use crate::application::{PressReviewUseCase, SummarizeUseCase};
use crate::infrastructure::config::AppConfig;
use crate::infrastructure::llm_clients::{LLMClient, RouterClient};
use std::sync::Arc;

/// Configuration and collaborators shared by the adapters.
pub struct AppState {
    pub config: AppConfig,
    pub llm_client: Arc<dyn LLMClient + Send + Sync>,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        let llm_client = Arc::new(RouterClient::new(config.request_timeout()));
        Self::with_client(config, llm_client)
    }

    pub fn with_client(config: AppConfig, llm_client: Arc<dyn LLMClient + Send + Sync>) -> Self {
        Self { config, llm_client }
    }

    pub fn press_review_use_case(&self) -> PressReviewUseCase {
        PressReviewUseCase::new(SummarizeUseCase::new(
            self.llm_client.clone(),
            self.config.llm_config(),
            self.config.max_words,
        ))
    }
}
