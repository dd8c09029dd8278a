use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, error, info, trace, warn};

use crate::error::{AdvisorError, Result};
use crate::model::Instructor;

/// Pause between validation retries.
pub const RETRY_DELAY: Duration = Duration::from_millis(500);

/// Pull the JSON object out of an LLM reply.
///
/// Handles ```json fenced blocks and replies that wrap the object in prose; anything
/// else is returned trimmed.
pub fn extract_json_from_markdown(content: &str) -> String {
    let trimmed = content.trim();

    if trimmed.starts_with("```") {
        if let Some(start_idx) = trimmed.find('\n') {
            let after_start = &trimmed[start_idx + 1..];
            if let Some(end_idx) = after_start.rfind("```") {
                return after_start[..end_idx].trim().to_string();
            }
        }
    }

    if !trimmed.starts_with('{') {
        if let (Some(start), Some(end)) = (trimmed.find('{'), trimmed.rfind('}')) {
            if start < end {
                return trimmed[start..=end].to_string();
            }
        }
    }

    trimmed.to_string()
}

/// Append the schema of `T` and output instructions to a prompt.
pub(crate) fn structured_prompt<T: Instructor>(prompt: &str) -> String {
    format!(
        "{}\n\nRespond with a single JSON object that matches this JSON Schema. Include ALL required fields, use only the allowed values for enum fields, and write nothing outside the JSON object.\n{}",
        prompt,
        T::schema().to_pretty_string()
    )
}

/// Parse and validate a structured reply.
pub(crate) fn parse_structured<T: Instructor>(raw: &str) -> Result<T> {
    let json = extract_json_from_markdown(raw);
    let parsed: T = serde_json::from_str(&json).map_err(|e| {
        error!(error = %e, partial_json = %json, "JSON parsing error");
        AdvisorError::ValidationError(format!(
            "Failed to parse response: {}\nPartial JSON: {}",
            e, json
        ))
    })?;

    if let Err(e) = parsed.validate() {
        error!(error = ?e, "Custom validation failed");
        return Err(e);
    }

    trace!(type_name = std::any::type_name::<T>(), "Parsed structured reply");
    Ok(parsed)
}

/// Convert a reqwest error, keeping timeouts distinct.
#[cfg(feature = "openai")]
pub fn handle_http_error(e: reqwest::Error, provider_name: &str) -> AdvisorError {
    error!(error = %e, "HTTP request to {} failed", provider_name);
    if e.is_timeout() {
        AdvisorError::Timeout
    } else {
        AdvisorError::HttpError(e)
    }
}

/// Turn a non-2xx response into an `ApiError` carrying the response body.
#[cfg(feature = "openai")]
pub async fn check_response_status(
    response: reqwest::Response,
    provider_name: &str,
) -> Result<reqwest::Response> {
    if !response.status().is_success() {
        let status = response.status();
        let error_text = response.text().await?;
        error!(
            status = %status,
            error = %error_text,
            "{} API returned error response", provider_name
        );
        return Err(AdvisorError::ApiError(format!(
            "{} API error ({}): {}",
            provider_name, status, error_text
        )));
    }
    Ok(response)
}

/// Run `generate_fn`, retrying only on `ValidationError`.
///
/// `None` or `Some(0)` retries means a single attempt.
pub async fn generate_with_retry<F, Fut, T>(
    mut generate_fn: F,
    prompt: &str,
    max_retries: Option<usize>,
    include_error_feedback: Option<bool>,
) -> Result<T>
where
    F: FnMut(String) -> Fut,
    Fut: std::future::Future<Output = Result<T>>,
{
    let Some(max_retries) = max_retries.filter(|&n| n > 0) else {
        return generate_fn(prompt.to_string()).await;
    };

    let max_attempts = max_retries + 1;
    let include_error_feedback = include_error_feedback.unwrap_or(true);
    let mut last_validation_error: Option<String> = None;

    trace!(
        max_attempts,
        include_error_feedback, "Starting structured generation with retry"
    );

    for attempt in 0..max_attempts {
        let current_prompt = match last_validation_error.as_deref() {
            Some(error_msg) if include_error_feedback => {
                debug!(attempt, error = error_msg, "Retrying with validation error feedback");
                format!(
                    "{}\n\nYour previous response was rejected. Return a complete, valid JSON object that follows the schema exactly.\n\nError details:\n{}",
                    prompt, error_msg
                )
            }
            _ => prompt.to_string(),
        };

        info!(attempt = attempt + 1, total_attempts = max_attempts, "Generation attempt");

        match generate_fn(current_prompt).await {
            Ok(result) => {
                if attempt > 0 {
                    info!(attempts_used = attempt + 1, "Generated after {} retries", attempt);
                }
                return Ok(result);
            }
            Err(AdvisorError::ValidationError(msg)) if attempt + 1 < max_attempts => {
                warn!(attempt = attempt + 1, error = %msg, "Validation error in generation attempt");
                last_validation_error = Some(msg);
                sleep(RETRY_DELAY).await;
            }
            Err(err) => {
                error!(error = ?err, attempts = attempt + 1, "Generation failed");
                return Err(err);
            }
        }
    }

    unreachable!("the final attempt always returns")
}
