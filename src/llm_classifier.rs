use anyhow::Result;
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::Arc;

use crate::llm_config::LlmProviderConfig;
use crate::traits::CompletionBackend;

/// Category labels the prompt asks the model to choose between
pub const CATEGORY_WORKFLOW_ERROR: &str = "Workflow Error";
pub const CATEGORY_DEPRECATION_WARNING: &str = "Deprecation Warning";

/// Label returned when the completion carries no tagged category
pub const CATEGORY_UNCLASSIFIED: &str = "Unclassified";

// First <category>...</category> pair; content may span lines
static CATEGORY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<category>(.*?)</category>").unwrap());

/// Classifies individual log messages by prompting a text-generation
/// service and extracting the tagged category from the completion.
pub struct ClassifierClient {
    backend: Arc<dyn CompletionBackend>,
}

/// HTTP backend for a single provider
struct ProviderBackend {
    config: LlmProviderConfig,
    http_client: reqwest::Client,
}

#[async_trait]
impl CompletionBackend for ProviderBackend {
    async fn complete(&self, prompt: &str) -> Result<String> {
        match self.config.provider.as_str() {
            "gemini" => self.call_gemini(prompt).await,
            "openai" => self.call_openai(prompt).await,
            "ollama" => self.call_ollama(prompt).await,
            _ => anyhow::bail!("Unsupported provider: {}", self.config.provider),
        }
    }

    fn name(&self) -> &str {
        &self.config.provider
    }
}

impl ProviderBackend {
    async fn call_gemini(&self, prompt: &str) -> Result<String> {
        let api_key = self
            .config
            .api_key
            .as_ref()
            .ok_or_else(|| anyhow::anyhow!("Gemini API key not configured"))?;

        let request_body = serde_json::json!({
            "contents": [
                {
                    "parts": [
                        {
                            "text": prompt
                        }
                    ]
                }
            ]
        });

        let response = self
            .http_client
            .post(format!(
                "https://generativelanguage.googleapis.com/v1beta/models/{}:generateContent?key={}",
                self.config.model, api_key
            ))
            .header("Content-Type", "application/json")
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        let response_json: serde_json::Value = response.json().await?;

        if !status.is_success() {
            anyhow::bail!("Gemini API error: {}", response_json);
        }

        if let Some(generated_text) = response_json
            .get("candidates")
            .and_then(|c| c.get(0))
            .and_then(|c| c.get("content"))
            .and_then(|c| c.get("parts"))
            .and_then(|p| p.get(0))
            .and_then(|p| p.get("text"))
            .and_then(|v| v.as_str())
        {
            Ok(generated_text.to_string())
        } else {
            anyhow::bail!("No response from Gemini")
        }
    }

    async fn call_openai(&self, prompt: &str) -> Result<String> {
        let api_key = self
            .config
            .api_key
            .as_ref()
            .ok_or_else(|| anyhow::anyhow!("OpenAI API key not configured"))?;

        let request_body = serde_json::json!({
            "model": self.config.model,
            "messages": [
                {
                    "role": "user",
                    "content": prompt
                }
            ],
            "temperature": 0.1,
            "max_tokens": 100
        });

        let response = self
            .http_client
            .post("https://api.openai.com/v1/chat/completions")
            .header("Authorization", format!("Bearer {}", api_key))
            .header("Content-Type", "application/json")
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        let response_json: serde_json::Value = response.json().await?;

        if !status.is_success() {
            anyhow::bail!("OpenAI API error: {}", response_json);
        }

        if let Some(generated_text) = response_json
            .get("choices")
            .and_then(|c| c.get(0))
            .and_then(|c| c.get("message"))
            .and_then(|m| m.get("content"))
            .and_then(|v| v.as_str())
        {
            Ok(generated_text.to_string())
        } else {
            anyhow::bail!("No response from OpenAI")
        }
    }

    async fn call_ollama(&self, prompt: &str) -> Result<String> {
        let endpoint = self
            .config
            .endpoint
            .as_ref()
            .ok_or_else(|| anyhow::anyhow!("Ollama endpoint not configured"))?;

        let request_body = serde_json::json!({
            "model": self.config.model,
            "prompt": prompt,
            "stream": false,
            "options": {
                "temperature": 0.1,
                "top_p": 0.9,
            }
        });

        let response = self
            .http_client
            .post(format!("{}/api/generate", endpoint))
            .json(&request_body)
            .send()
            .await?;

        let response_json: serde_json::Value = response.json().await?;

        if let Some(generated_text) = response_json.get("response").and_then(|v| v.as_str()) {
            Ok(generated_text.to_string())
        } else {
            anyhow::bail!("No response from Ollama")
        }
    }
}

impl ClassifierClient {
    /// Create a classifier backed by the configured HTTP provider
    pub fn new(config: LlmProviderConfig) -> Result<Self> {
        config.validate()?;

        tracing::info!(
            "🤖 Classifier configured: {} ({})",
            config.provider,
            config.model
        );

        let timeout_secs = config.timeout_secs.unwrap_or(60);
        let http_client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Ok(Self {
            backend: Arc::new(ProviderBackend {
                config,
                http_client,
            }),
        })
    }

    /// Create a classifier on top of an existing backend
    pub fn with_backend(backend: Arc<dyn CompletionBackend>) -> Self {
        Self { backend }
    }

    /// Classify one log message into a category label
    ///
    /// Returns the trimmed content of the first tag pair in the
    /// completion, "Unclassified" when the completion carries no pair,
    /// or an error when the generation call itself fails.
    pub async fn classify(&self, log_message: &str) -> Result<String> {
        let prompt = build_prompt(log_message);

        tracing::debug!(
            "Requesting {} to classify: {}",
            self.backend.name(),
            log_message
        );

        let completion = self.backend.complete(&prompt).await?;
        let category = extract_category(&completion);

        tracing::debug!("Classified as '{}': {}", category, log_message);
        Ok(category)
    }

    /// Classify several messages in order
    ///
    /// Sequential; stops at the first generation failure.
    pub async fn classify_batch(&self, log_messages: &[&str]) -> Result<Vec<String>> {
        let mut categories = Vec::with_capacity(log_messages.len());
        for message in log_messages {
            categories.push(self.classify(message).await?);
        }
        Ok(categories)
    }
}

fn build_prompt(log_message: &str) -> String {
    format!(
        r#"Classify the log message into one of these categories:
(1) Workflow Error, (2) Deprecation Warning.
If you can't figure out a category, use "Unclassified".
Put the category inside <category> </category> tags.
Log message: {log_message}"#,
        log_message = log_message
    )
}

/// Trimmed content of the first tag pair, or the fallback label when no
/// pair appears anywhere in the completion
pub fn extract_category(completion: &str) -> String {
    match CATEGORY_RE.captures(completion) {
        Some(caps) => caps[1].trim().to_string(),
        None => CATEGORY_UNCLASSIFIED.to_string(),
    }
}
