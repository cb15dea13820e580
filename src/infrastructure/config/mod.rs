use crate::application::use_cases::report_renderer::DEFAULT_REPORT_TITLE;
use crate::application::use_cases::summarization::DEFAULT_MAX_WORDS;
use crate::domain::error::Result;
use crate::domain::llm_config::{LLMConfig, LLMProvider};
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const CONFIG_FILE: &str = "press_review.toml";
pub const ENV_PREFIX: &str = "PRESS_REVIEW_";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub provider: LLMProvider,
    /// Defaults to the provider's public endpoint.
    pub base_url: Option<String>,
    pub model: String,
    pub api_key: Option<String>,
    pub max_words: usize,
    pub request_timeout_secs: u64,
    pub sheet: String,
    pub report_title: String,
    pub data_dir: PathBuf,
    pub output_file: PathBuf,
    /// Sender of the mail draft written next to the report.
    pub mail_from: String,
    pub http_host: String,
    pub http_port: u16,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            provider: LLMProvider::OpenAI,
            base_url: None,
            model: "gpt-4o-mini".to_string(),
            api_key: None,
            max_words: DEFAULT_MAX_WORDS,
            request_timeout_secs: 120,
            sheet: "Articles".to_string(),
            report_title: DEFAULT_REPORT_TITLE.to_string(),
            data_dir: PathBuf::from("data"),
            output_file: PathBuf::from("rapport.html"),
            mail_from: "revue-de-presse@localhost".to_string(),
            http_host: "127.0.0.1".to_string(),
            http_port: 5000,
        }
    }
}

impl AppConfig {
    /// Defaults, then `press_review.toml`, then `PRESS_REVIEW_*`, then the
    /// conventional `OPENAI_API_KEY` / `OPENAI_MODEL` variables.
    pub fn load() -> Result<Self> {
        let _ = dotenvy::dotenv();
        Self::figment(Path::new(CONFIG_FILE)).extract().map_err(Into::into)
    }

    pub fn figment(config_file: &Path) -> Figment {
        Figment::from(Serialized::defaults(AppConfig::default()))
            .merge(Toml::file(config_file))
            .merge(Env::prefixed(ENV_PREFIX))
            .merge(Env::raw().filter_map(|key| {
                if key.as_str().eq_ignore_ascii_case("OPENAI_API_KEY") {
                    Some("api_key".into())
                } else if key.as_str().eq_ignore_ascii_case("OPENAI_MODEL") {
                    Some("model".into())
                } else {
                    None
                }
            }))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn llm_config(&self) -> LLMConfig {
        LLMConfig {
            provider: self.provider,
            base_url: self
                .base_url
                .clone()
                .unwrap_or_else(|| LLMConfig::default_base_url(self.provider).to_string()),
            model: self.model.clone(),
            api_key: self.api_key.clone().filter(|k| !k.trim().is_empty()),
            timeout_secs: self.request_timeout_secs,
            ..LLMConfig::default()
        }
    }
}
