//! Schema-constrained extraction with bounded retries.
//!
//! A model response is untrusted input: it is stripped of markdown fences,
//! parsed as JSON, and deserialized into the target type. A response that
//! fails any of those steps is a schema violation and triggers a retry,
//! exactly like a remote failure; both draw from the same attempt budget.
//! There are no partial records: after the budget is spent the caller gets
//! `Error::ExtractionFailed` with the last cause.

use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use fleetlog_core::{defaults, ChatBackend, ChatOptions, Error, Result, UserPart};

/// Options for a structured extraction call.
#[derive(Debug, Clone, Copy)]
pub struct ExtractOptions {
    /// Total attempts (first call included).
    pub max_retries: u32,
    pub temperature: f32,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            max_retries: defaults::MAX_RETRIES,
            temperature: defaults::TEMPERATURE,
        }
    }
}

/// Strip a single markdown code fence wrapping, if present.
///
/// Models wrap JSON in ```json fences despite instructions; the payload
/// inside is still usable.
pub fn strip_code_fences(response: &str) -> &str {
    let trimmed = response.trim();
    let Some(inner) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let Some(inner) = inner.strip_suffix("```") else {
        return trimmed;
    };
    // Drop an optional language tag on the opening fence line.
    match inner.split_once('\n') {
        Some((first_line, rest)) if first_line.trim().chars().all(|c| c.is_ascii_alphanumeric()) => {
            rest.trim()
        }
        _ => inner.trim(),
    }
}

/// Run a schema-constrained extraction against the backend.
///
/// Issues up to `opts.max_retries` identical completion calls, parsing each
/// response into `T`. Returns the first successful value.
pub async fn extract_structured<T: DeserializeOwned>(
    backend: &dyn ChatBackend,
    system: &str,
    user_parts: &[UserPart],
    opts: ExtractOptions,
) -> Result<T> {
    let attempts = opts.max_retries.max(1);
    let chat_options = ChatOptions {
        temperature: opts.temperature,
    };
    let mut last_error = String::new();

    for attempt in 1..=attempts {
        debug!(
            subsystem = "extract",
            op = "extract_structured",
            attempt,
            max_attempts = attempts,
            model = backend.model_name(),
            "Extraction attempt"
        );

        let response = match backend.complete(system, user_parts, chat_options).await {
            Ok(response) => response,
            Err(e) => {
                warn!(
                    subsystem = "extract",
                    attempt,
                    reason = "remote",
                    error = %e,
                    "Extraction attempt failed"
                );
                last_error = e.to_string();
                continue;
            }
        };

        match parse_response::<T>(&response) {
            Ok(value) => {
                debug!(
                    subsystem = "extract",
                    attempt,
                    response_len = response.len(),
                    "Extraction succeeded"
                );
                return Ok(value);
            }
            Err(e) => {
                warn!(
                    subsystem = "extract",
                    attempt,
                    reason = "schema",
                    error = %e,
                    "Model output violated schema"
                );
                last_error = e.to_string();
            }
        }
    }

    Err(Error::ExtractionFailed {
        attempts,
        last_error,
    })
}

fn parse_response<T: DeserializeOwned>(response: &str) -> Result<T> {
    let payload = strip_code_fences(response);
    serde_json::from_str(payload)
        .map_err(|e| Error::SchemaViolation(format!("invalid model output: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Probe {
        msn: String,
    }

    #[test]
    fn test_strip_plain_json_untouched() {
        assert_eq!(strip_code_fences(r#"{"msn": "1"}"#), r#"{"msn": "1"}"#);
    }

    #[test]
    fn test_strip_fence_with_language_tag() {
        let fenced = "```json\n{\"msn\": \"1\"}\n```";
        assert_eq!(strip_code_fences(fenced), r#"{"msn": "1"}"#);
    }

    #[test]
    fn test_strip_fence_without_language_tag() {
        let fenced = "```\n{\"msn\": \"1\"}\n```";
        assert_eq!(strip_code_fences(fenced), r#"{"msn": "1"}"#);
    }

    #[test]
    fn test_unterminated_fence_left_alone() {
        let text = "```json\n{\"msn\": \"1\"}";
        assert_eq!(strip_code_fences(text), text);
    }

    #[test]
    fn test_parse_response_schema_violation() {
        let err = parse_response::<Probe>("the report shows MSN 4521").unwrap_err();
        assert!(matches!(err, Error::SchemaViolation(_)));
    }

    #[test]
    fn test_parse_response_through_fence() {
        let value: Probe = parse_response("```json\n{\"msn\": \"4521\"}\n```").unwrap();
        assert_eq!(value, Probe { msn: "4521".to_string() });
    }

    #[test]
    fn test_default_options() {
        let opts = ExtractOptions::default();
        assert_eq!(opts.max_retries, defaults::MAX_RETRIES);
        assert_eq!(opts.temperature, defaults::TEMPERATURE);
    }
}
