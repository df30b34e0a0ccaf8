use crate::config::InsightsConfig;
use crate::error::{InsightsError, Result};
use async_trait::async_trait;
use tracing::{debug, warn};

/// Text-completion oracle. The system prompt and the user's question are
/// always passed as separate inputs.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    async fn complete(&self, system_prompt: &str, question: &str) -> Result<String>;

    fn name(&self) -> &str;
}

/// Client for an OpenAI-compatible chat completions endpoint.
#[derive(Clone)]
pub struct LlmClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl LlmClient {
    pub fn new(api_key: String, model: String, base_url: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key,
            base_url,
            model,
        }
    }

    /// Build the process-wide client from configuration.
    pub fn from_config(config: &InsightsConfig) -> Result<Self> {
        let api_key = config.require_api_key()?.to_string();
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| InsightsError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
        })
    }

    fn request_body(&self, system_prompt: &str, question: &str) -> serde_json::Value {
        let mut body = serde_json::json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": system_prompt},
                {"role": "user", "content": question}
            ],
            "temperature": 0.0,
        });

        // Reasoning models spend completion tokens on hidden reasoning
        if self.model.starts_with("gpt-5") || self.model.starts_with("o1") || self.model.starts_with("o3") {
            body["max_completion_tokens"] = serde_json::json!(2000);
        } else {
            body["max_tokens"] = serde_json::json!(500);
        }
        body
    }
}

#[async_trait]
impl LanguageModel for LlmClient {
    async fn complete(&self, system_prompt: &str, question: &str) -> Result<String> {
        debug!(model = %self.model, prompt_len = system_prompt.len(), "Calling chat completions");

        let response = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&self.request_body(system_prompt, question))
            .send()
            .await
            .map_err(|e| InsightsError::Generation(format!("LLM API call failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());
            return Err(InsightsError::Generation(format!("LLM API error ({}): {}", status, error_text)));
        }

        let response_json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| InsightsError::Generation(format!("Failed to parse LLM response: {}", e)))?;

        extract_content(&response_json)
    }

    fn name(&self) -> &str {
        &self.model
    }
}

/// Pull the first choice's message content out of a chat completions payload.
fn extract_content(response_json: &serde_json::Value) -> Result<String> {
    if let Some(error) = response_json.get("error") {
        return Err(InsightsError::Generation(format!("LLM API error: {}", error)));
    }

    let choice = response_json
        .get("choices")
        .and_then(|c| c.as_array())
        .and_then(|c| c.first())
        .ok_or_else(|| InsightsError::Generation(format!("No choices in LLM response: {}", response_json)))?;

    match choice.get("finish_reason").and_then(|r| r.as_str()) {
        Some("length") => warn!("LLM response was truncated due to length limit"),
        Some("content_filter") => {
            return Err(InsightsError::Generation(
                "LLM response was filtered by content policy".to_string(),
            ))
        }
        _ => {}
    }

    let content = choice["message"]["content"]
        .as_str()
        .ok_or_else(|| InsightsError::Generation(format!("No content in LLM response: {}", response_json)))?;

    if content.trim().is_empty() {
        return Err(InsightsError::Generation("Empty content in LLM response".to_string()));
    }

    Ok(content.to_string())
}
