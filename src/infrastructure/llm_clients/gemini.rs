use super::{build_http_client, LLMClient};
use crate::domain::error::{AppError, Result};
use crate::domain::llm_config::LLMConfig;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Serialize)]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(rename = "generationConfig", skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Serialize)]
struct GeminiContent {
    parts: Vec<GeminiPart>,
}

#[derive(Serialize)]
struct GeminiPart {
    text: String,
}

#[derive(Serialize)]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f64>,
    #[serde(rename = "maxOutputTokens", skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
}

#[derive(Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Deserialize)]
struct GeminiCandidate {
    content: GeminiCandidateContent,
}

#[derive(Deserialize)]
struct GeminiCandidateContent {
    #[serde(default)]
    parts: Vec<GeminiCandidatePart>,
}

#[derive(Deserialize)]
struct GeminiCandidatePart {
    #[serde(default)]
    text: String,
}

pub struct GeminiClient {
    client: reqwest::Client,
}

impl GeminiClient {
    pub fn new(timeout: Duration) -> Self {
        Self {
            client: build_http_client(timeout),
        }
    }

    fn api_key(config: &LLMConfig) -> Result<String> {
        config
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| AppError::LLMError("Missing API key for Google provider".to_string()))
    }
}

fn request_url(config: &LLMConfig, api_key: &str) -> String {
    format!(
        "{}/{}:generateContent?key={}",
        config.base_url.trim_end_matches('/'),
        config.model.trim(),
        api_key
    )
}

fn build_request(config: &LLMConfig, prompt: &str) -> GeminiRequest {
    GeminiRequest {
        contents: vec![GeminiContent {
            parts: vec![GeminiPart {
                text: prompt.to_string(),
            }],
        }],
        generation_config: Some(GenerationConfig {
            temperature: config.temperature.map(f64::from),
            max_output_tokens: config.max_tokens,
        }),
    }
}

fn extract_text(json: GeminiResponse) -> Option<String> {
    json.candidates
        .into_iter()
        .next()
        .and_then(|candidate| candidate.content.parts.into_iter().next())
        .map(|part| part.text)
}

#[async_trait]
impl LLMClient for GeminiClient {
    async fn generate(&self, config: &LLMConfig, prompt: &str) -> Result<String> {
        let api_key = Self::api_key(config)?;
        let url = request_url(config, &api_key);
        let body = build_request(config, prompt);

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::LLMError(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(AppError::LLMError(format!(
                "API error ({}): {}",
                status, text
            )));
        }

        let json: GeminiResponse = response
            .json()
            .await
            .map_err(|e| AppError::LLMError(format!("Failed to parse JSON: {}", e)))?;

        extract_text(json).ok_or_else(|| AppError::LLMError("Invalid response format".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::llm_config::LLMProvider;

    fn gemini_config() -> LLMConfig {
        LLMConfig {
            provider: LLMProvider::Gemini,
            base_url: format!("{}/", LLMConfig::default_base_url(LLMProvider::Gemini)),
            model: " gemini-1.5-flash ".to_string(),
            api_key: Some("k-123".to_string()),
            max_tokens: Some(400),
            temperature: Some(0.5),
            timeout_secs: 30,
        }
    }

    #[test]
    fn test_url_carries_model_and_key() {
        assert_eq!(
            request_url(&gemini_config(), "k-123"),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-1.5-flash:generateContent?key=k-123"
        );
    }

    #[test]
    fn test_request_body_shape() {
        let body = serde_json::to_value(build_request(&gemini_config(), "Résume.")).unwrap();

        assert_eq!(body["contents"][0]["parts"][0]["text"], "Résume.");
        assert_eq!(body["generationConfig"]["maxOutputTokens"], 400);
        assert_eq!(body["generationConfig"]["temperature"], 0.5);
    }

    #[test]
    fn test_unset_generation_options_are_omitted() {
        let mut config = gemini_config();
        config.max_tokens = None;
        config.temperature = None;
        let body = serde_json::to_value(build_request(&config, "x")).unwrap();

        assert_eq!(body["generationConfig"], serde_json::json!({}));
    }

    #[test]
    fn test_extracts_first_candidate_part() {
        let json: GeminiResponse = serde_json::from_str(
            r#"{
                "candidates": [
                    {"content": {"role": "model", "parts": [{"text": "Un résumé."}, {"text": "ignored"}]},
                     "finishReason": "STOP"}
                ],
                "usageMetadata": {"totalTokenCount": 12}
            }"#,
        )
        .unwrap();
        assert_eq!(extract_text(json).as_deref(), Some("Un résumé."));
    }

    #[test]
    fn test_empty_candidates_is_invalid() {
        let json: GeminiResponse = serde_json::from_str(r#"{"candidates": []}"#).unwrap();
        assert_eq!(extract_text(json), None);

        let json: GeminiResponse = serde_json::from_str(r#"{"promptFeedback": {}}"#).unwrap();
        assert_eq!(extract_text(json), None);
    }

    #[test]
    fn test_missing_key_is_an_error() {
        let mut config = gemini_config();
        config.api_key = Some("  ".to_string());
        assert!(matches!(
            GeminiClient::api_key(&config),
            Err(AppError::LLMError(_))
        ));
    }
}
