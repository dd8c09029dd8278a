use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::utils::{generate_with_retry, parse_structured, structured_prompt};
use crate::error::Result;
use crate::model::Instructor;

/// Per-call generation parameters.
///
/// `model` overrides the client's default model for this call only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionParams {
    pub model: Option<String>,
    pub temperature: f32,
    pub max_tokens: Option<u32>,
}

impl Default for CompletionParams {
    fn default() -> Self {
        Self {
            model: None,
            temperature: 0.0,
            max_tokens: None,
        }
    }
}

impl CompletionParams {
    /// Parameters for the consistency, summary and doctor-reply stages.
    pub fn chain_stage() -> Self {
        Self {
            model: None,
            temperature: 0.2,
            max_tokens: Some(256),
        }
    }

    /// Parameters for single-prompt answers.
    pub fn direct_answer() -> Self {
        Self {
            model: None,
            temperature: 0.3,
            max_tokens: Some(512),
        }
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// At least one token is always requested.
    pub fn max_tokens(mut self, max: u32) -> Self {
        self.max_tokens = Some(max.max(1));
        self
    }
}

/// Text-completion service the triage chain talks to.
///
/// Implementors only provide [`complete`](LLMClient::complete); structured
/// generation is layered on top by embedding the output type's JSON Schema in the
/// prompt and validating what comes back.
///
/// ```no_run
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// use symptom_advisor::{CompletionParams, HealthAnswer, LLMClient, OpenAICompatibleClient};
///
/// let client = OpenAICompatibleClient::from_env()?.build();
/// let answer: HealthAnswer = client
///     .generate_struct("Give general advice for a mild fever", &CompletionParams::direct_answer())
///     .await?;
/// println!("{}", answer.answer);
/// # Ok(())
/// # }
/// ```
#[async_trait]
pub trait LLMClient: Send + Sync {
    /// Raw completion: prompt in, text out.
    async fn complete(&self, prompt: &str, params: &CompletionParams) -> Result<String>;

    /// Generate a validated `T`.
    ///
    /// Unparseable output and failed [`Instructor::validate`] checks are reported as
    /// `AdvisorError::ValidationError`.
    async fn generate_struct<T>(&self, prompt: &str, params: &CompletionParams) -> Result<T>
    where
        T: Instructor + Send + 'static,
    {
        let prompt = structured_prompt::<T>(prompt);
        let raw = self.complete(&prompt, params).await?;
        parse_structured::<T>(&raw)
    }

    /// Like [`generate_struct`](LLMClient::generate_struct), retrying validation
    /// failures up to `max_retries` times. With `include_errors` (default true) the
    /// previous validation error is appended to the retry prompt.
    async fn generate_struct_with_retry<T>(
        &self,
        prompt: &str,
        params: &CompletionParams,
        max_retries: Option<usize>,
        include_errors: Option<bool>,
    ) -> Result<T>
    where
        T: Instructor + Send + 'static,
    {
        generate_with_retry(
            |prompt| async move { self.generate_struct::<T>(&prompt, params).await },
            prompt,
            max_retries,
            include_errors,
        )
        .await
    }
}
