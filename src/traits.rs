/// Dependency injection trait for the classifier's generation call
///
/// Implementations can use:
/// - Hosted LLM APIs (Gemini, OpenAI, Ollama, etc.)
/// - Mock/test backends returning canned completions
use anyhow::Result;
use async_trait::async_trait;

/// Trait for sending a single-turn prompt to a text-generation service
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Send the prompt and return the raw completion text
    ///
    /// # Arguments
    /// * `prompt` - The full instruction text for a single-turn request
    ///
    /// # Returns
    /// The free-text completion, or an error describing why the service
    /// call failed (auth, quota, network, unexpected response shape)
    async fn complete(&self, prompt: &str) -> Result<String>;

    /// Get the name/identifier of this backend (for logging)
    fn name(&self) -> &str;
}
