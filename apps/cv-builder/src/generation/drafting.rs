//! AI drafting: turns a prompt and a credential into text, with failures classified for
//! the user: fix the credential, or try again.

use std::sync::Arc;

use thiserror::Error;
use tracing::{info, warn};

use crate::llm_client::prompts::{SYSTEM_INSTRUCTION, TEMPERATURE};
use crate::llm_client::{ContentGenerator, ContentRequest, LlmError};

/// Substrings the provider uses when it rejects the key.
const INVALID_KEY_SIGNATURES: [&str; 2] = ["API key not valid", "API_KEY_INVALID"];

#[derive(Debug, Error)]
pub enum DraftError {
    #[error("Please set your Gemini API key in the settings before generating content.")]
    MissingCredential,

    #[error("The provided Gemini API key is not valid. Please check it in the settings.")]
    InvalidCredential,

    #[error("Failed to generate content from AI. Check your network connection or API key.")]
    TransientFailure(#[source] LlmError),
}

impl DraftError {
    /// Maps a provider failure onto the user-facing taxonomy.
    pub fn classify(err: LlmError) -> Self {
        let message = err.to_string();
        if INVALID_KEY_SIGNATURES.iter().any(|sig| message.contains(sig)) {
            DraftError::InvalidCredential
        } else {
            DraftError::TransientFailure(err)
        }
    }
}

#[derive(Clone)]
pub struct DraftingClient {
    generator: Arc<dyn ContentGenerator>,
}

impl DraftingClient {
    pub fn new(generator: Arc<dyn ContentGenerator>) -> Self {
        Self { generator }
    }

    /// One outbound request per call. An empty credential never reaches the generator.
    pub async fn generate(&self, prompt: &str, credential: &str) -> Result<String, DraftError> {
        if credential.trim().is_empty() {
            return Err(DraftError::MissingCredential);
        }

        let request = ContentRequest {
            prompt,
            credential,
            system_instruction: SYSTEM_INSTRUCTION,
            temperature: TEMPERATURE,
        };

        match self.generator.generate_content(request).await {
            Ok(text) => {
                info!("Drafted {} chars", text.len());
                Ok(text.trim().to_string())
            }
            Err(e) => {
                warn!("Gemini call failed: {e}");
                Err(DraftError::classify(e))
            }
        }
    }
}
