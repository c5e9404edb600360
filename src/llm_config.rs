use serde::{Deserialize, Serialize};

/// Configuration for the text-generation provider behind the classifier
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmProviderConfig {
    pub provider: String, // "gemini", "openai", "ollama"
    pub model: String,
    pub api_key: Option<String>,
    pub endpoint: Option<String>, // For Ollama or custom endpoints
    pub timeout_secs: Option<u64>,
}

impl Default for LlmProviderConfig {
    fn default() -> Self {
        Self {
            provider: "ollama".to_string(),
            model: "llama3".to_string(),
            api_key: None,
            endpoint: Some("http://localhost:11434".to_string()),
            timeout_secs: Some(60),
        }
    }
}

impl LlmProviderConfig {
    /// Load from environment variables
    pub fn from_env() -> Self {
        let provider = std::env::var("LLM_PROVIDER").unwrap_or_else(|_| "gemini".to_string());

        let model = std::env::var("LLM_MODEL").unwrap_or_else(|_| {
            match provider.as_str() {
                "gemini" => "gemini-2.0-flash".to_string(),
                "openai" => "gpt-4o-mini".to_string(),
                "ollama" => "llama3".to_string(),
                _ => "gemini-2.0-flash".to_string(),
            }
        });

        let api_key = std::env::var("LLM_API_KEY")
            .ok()
            .or_else(|| std::env::var("GEMINI_API_KEY").ok());

        let endpoint = std::env::var("OLLAMA_ENDPOINT").ok();

        Self {
            provider,
            model,
            api_key,
            endpoint,
            timeout_secs: Some(60),
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        match self.provider.as_str() {
            "gemini" | "openai" => {
                if self.api_key.is_none() {
                    anyhow::bail!(
                        "{} provider requires an API key (set LLM_API_KEY)",
                        self.provider
                    );
                }
            }
            "ollama" => {
                if self.endpoint.is_none() {
                    anyhow::bail!("ollama provider requires an endpoint (set OLLAMA_ENDPOINT)");
                }
            }
            other => {
                anyhow::bail!("Unsupported provider: {}", other);
            }
        }

        Ok(())
    }
}
