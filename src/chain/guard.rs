use std::marker::PhantomData;

use serde::Serialize;
use tracing::{debug, instrument, warn};

use crate::backend::{CompletionParams, LLMClient};
use crate::error::{AdvisorError, Result};
use crate::model::Instructor;

/// Result of a guarded LLM call.
///
/// Callers match on all three cases instead of probing an untyped reply.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum GuardOutcome<T> {
    /// Parsed and passed validation.
    Validated(T),
    /// The service answered, but the answer didn't fit the schema or its rules.
    SchemaInvalid(String),
    /// The call itself failed: transport, timeout, API error.
    UpstreamError(String),
}

impl<T> GuardOutcome<T> {
    pub fn from_result(result: Result<T>) -> Self {
        match result {
            Ok(value) => Self::Validated(value),
            Err(e) if e.is_schema_failure() => Self::SchemaInvalid(e.to_string()),
            Err(e) => Self::UpstreamError(e.to_string()),
        }
    }

    pub fn is_validated(&self) -> bool {
        matches!(self, Self::Validated(_))
    }

    pub fn validated(self) -> Option<T> {
        match self {
            Self::Validated(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_validated(&self) -> Option<&T> {
        match self {
            Self::Validated(value) => Some(value),
            _ => None,
        }
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> GuardOutcome<U> {
        match self {
            Self::Validated(value) => GuardOutcome::Validated(f(value)),
            Self::SchemaInvalid(reason) => GuardOutcome::SchemaInvalid(reason),
            Self::UpstreamError(reason) => GuardOutcome::UpstreamError(reason),
        }
    }

    /// Back to a `Result`, for callers that want `?`.
    pub fn into_result(self) -> Result<T> {
        match self {
            Self::Validated(value) => Ok(value),
            Self::SchemaInvalid(reason) => Err(AdvisorError::ValidationError(reason)),
            Self::UpstreamError(reason) => Err(AdvisorError::ApiError(reason)),
        }
    }
}

/// Structured-output validator for one output type.
///
/// ```no_run
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// use symptom_advisor::{CompletionParams, Guard, GuardOutcome, HealthAnswer, OpenAICompatibleClient};
///
/// let client = OpenAICompatibleClient::from_env()?.build();
/// let guard = Guard::<HealthAnswer>::new().max_retries(1);
/// match guard.run(&client, "Advice for a sore throat", &CompletionParams::direct_answer()).await {
///     GuardOutcome::Validated(answer) => println!("{}", answer.answer),
///     GuardOutcome::SchemaInvalid(reason) => println!("unusable answer: {}", reason),
///     GuardOutcome::UpstreamError(reason) => println!("service failed: {}", reason),
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Guard<T> {
    max_retries: usize,
    include_error_feedback: bool,
    _output: PhantomData<fn() -> T>,
}

impl<T> Default for Guard<T> {
    fn default() -> Self {
        Self {
            max_retries: 0,
            include_error_feedback: true,
            _output: PhantomData,
        }
    }
}

impl<T: Instructor + Send + 'static> Guard<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Extra attempts after a schema-invalid answer.
    pub fn max_retries(mut self, max_retries: usize) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn include_error_feedback(mut self, include: bool) -> Self {
        self.include_error_feedback = include;
        self
    }

    #[instrument(
        name = "guard_run",
        skip_all,
        fields(output = std::any::type_name::<T>(), prompt_len = prompt.len())
    )]
    pub async fn run<C: LLMClient>(
        &self,
        client: &C,
        prompt: &str,
        params: &CompletionParams,
    ) -> GuardOutcome<T> {
        let result = client
            .generate_struct_with_retry::<T>(
                prompt,
                params,
                Some(self.max_retries),
                Some(self.include_error_feedback),
            )
            .await;

        let outcome = GuardOutcome::from_result(result);
        match &outcome {
            GuardOutcome::Validated(_) => debug!("Guarded call validated"),
            GuardOutcome::SchemaInvalid(reason) => warn!(reason = %reason, "Guarded call schema-invalid"),
            GuardOutcome::UpstreamError(reason) => warn!(reason = %reason, "Guarded call failed upstream"),
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_from_result_classification() {
        let ok: GuardOutcome<u8> = GuardOutcome::from_result(Ok(1));
        assert_eq!(ok, GuardOutcome::Validated(1));

        let invalid: GuardOutcome<u8> =
            GuardOutcome::from_result(Err(AdvisorError::ValidationError("bad".into())));
        assert_eq!(invalid, GuardOutcome::SchemaInvalid("Validation error: bad".into()));

        let json_err = serde_json::from_str::<u8>("x").unwrap_err();
        let invalid: GuardOutcome<u8> = GuardOutcome::from_result(Err(json_err.into()));
        assert!(matches!(invalid, GuardOutcome::SchemaInvalid(_)));

        let upstream: GuardOutcome<u8> = GuardOutcome::from_result(Err(AdvisorError::Timeout));
        assert_eq!(upstream, GuardOutcome::UpstreamError("Timeout error".into()));
    }

    #[test]
    fn test_outcome_accessors() {
        let outcome = GuardOutcome::Validated(2u8).map(|v| v * 2);
        assert_eq!(outcome.as_validated(), Some(&4));
        assert!(outcome.is_validated());
        assert_eq!(outcome.into_result(), Ok(4));

        let failed: GuardOutcome<u8> = GuardOutcome::UpstreamError("down".into());
        assert_eq!(failed.clone().validated(), None);
        assert_eq!(failed.into_result(), Err(AdvisorError::ApiError("down".into())));
    }
}
