//! OpenRouter chat backend implementation.

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, info, warn};

use fleetlog_core::{defaults, ChatBackend, ChatOptions, Error, Result, UserPart};

use crate::types::*;

/// Configuration for the OpenRouter backend.
#[derive(Debug, Clone)]
pub struct OpenRouterConfig {
    /// Base URL for the API endpoint.
    pub base_url: String,
    /// API key for authentication.
    pub api_key: Option<String>,
    /// Model requests are issued against.
    pub model: String,
    /// Request timeout in seconds.
    pub timeout_seconds: u64,
    /// HTTP-Referer header for OpenRouter rankings (optional).
    pub http_referer: Option<String>,
    /// X-Title header for app name on OpenRouter (optional).
    pub x_title: Option<String>,
}

impl Default for OpenRouterConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::OPENROUTER_URL.to_string(),
            api_key: None,
            model: defaults::IMAGE_MODEL.to_string(),
            timeout_seconds: defaults::MODEL_TIMEOUT_SECS,
            http_referer: None,
            x_title: None,
        }
    }
}

/// Vision-capable chat backend speaking the OpenAI-compatible protocol
/// against OpenRouter (or any compatible gateway).
pub struct OpenRouterBackend {
    client: Client,
    config: OpenRouterConfig,
}

impl OpenRouterBackend {
    /// Create a new backend with the given configuration.
    pub fn new(config: OpenRouterConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| Error::Inference(format!("Failed to create HTTP client: {}", e)))?;

        info!(
            subsystem = "inference",
            url = %config.base_url,
            model = %config.model,
            "Initializing OpenRouter backend"
        );

        Ok(Self { client, config })
    }

    /// Create from environment variables.
    pub fn from_env() -> Result<Self> {
        let config = OpenRouterConfig {
            base_url: std::env::var(defaults::ENV_OPENROUTER_URL)
                .unwrap_or_else(|_| defaults::OPENROUTER_URL.to_string()),
            api_key: std::env::var(defaults::ENV_OPENROUTER_API_KEY).ok(),
            model: std::env::var(defaults::ENV_IMAGE_MODEL)
                .unwrap_or_else(|_| defaults::IMAGE_MODEL.to_string()),
            timeout_seconds: std::env::var("OPENROUTER_TIMEOUT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults::MODEL_TIMEOUT_SECS),
            http_referer: std::env::var("OPENROUTER_HTTP_REFERER").ok(),
            x_title: std::env::var("OPENROUTER_X_TITLE").ok(),
        };

        Self::new(config)
    }

    /// Get the current configuration.
    pub fn config(&self) -> &OpenRouterConfig {
        &self.config
    }

    /// Build a POST request with authentication if configured.
    fn build_request(&self, endpoint: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{}", self.config.base_url.trim_end_matches('/'), endpoint);
        let mut req = self.client.post(&url);

        if let Some(ref api_key) = self.config.api_key {
            req = req.header("Authorization", format!("Bearer {}", api_key));
        }

        // OpenRouter-specific attribution headers
        if let Some(ref referer) = self.config.http_referer {
            req = req.header("HTTP-Referer", referer);
        }
        if let Some(ref title) = self.config.x_title {
            req = req.header("X-Title", title);
        }

        req.header("Content-Type", "application/json")
    }

    /// Build a GET request with authentication.
    fn build_get_request(&self, endpoint: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{}", self.config.base_url.trim_end_matches('/'), endpoint);
        let mut req = self.client.get(&url);

        if let Some(ref api_key) = self.config.api_key {
            req = req.header("Authorization", format!("Bearer {}", api_key));
        }

        req
    }
}

#[async_trait]
impl ChatBackend for OpenRouterBackend {
    async fn complete(
        &self,
        system: &str,
        parts: &[UserPart],
        options: ChatOptions,
    ) -> Result<String> {
        let image_count = parts
            .iter()
            .filter(|p| matches!(p, UserPart::ImageUrl(_)))
            .count();
        debug!(
            subsystem = "inference",
            model = %self.config.model,
            parts = parts.len(),
            images = image_count,
            "Chat completion request"
        );

        let mut messages = Vec::new();
        if !system.is_empty() {
            messages.push(ChatMessage {
                role: "system".to_string(),
                content: MessageContent::Text(system.to_string()),
            });
        }

        let user_parts: Vec<ContentPart> = parts
            .iter()
            .map(|part| match part {
                UserPart::Text(text) => ContentPart::Text { text: text.clone() },
                UserPart::ImageUrl(url) => ContentPart::ImageUrl {
                    image_url: ImageUrl { url: url.clone() },
                },
            })
            .collect();
        messages.push(ChatMessage {
            role: "user".to_string(),
            content: MessageContent::Parts(user_parts),
        });

        let request = ChatCompletionRequest {
            model: self.config.model.clone(),
            messages,
            temperature: Some(options.temperature),
            max_tokens: None,
            stream: false,
        };

        let response = self
            .build_request("/chat/completions")
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Inference(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body: ApiErrorResponse = response.json().await.unwrap_or(ApiErrorResponse {
                error: ApiError {
                    message: "Unknown error".to_string(),
                    error_type: None,
                    code: None,
                },
            });
            return Err(Error::Inference(format!(
                "OpenRouter returned {}: {}",
                status, body.error.message
            )));
        }

        let result: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| Error::Inference(format!("Failed to parse response: {}", e)))?;

        // A well-formed but contentless response is a remote failure, not
        // model output to be parsed downstream.
        let content = result
            .choices
            .first()
            .ok_or_else(|| Error::Inference("Response contained no choices".to_string()))?
            .message
            .content
            .clone()
            .ok_or_else(|| Error::Inference("Response contained no content".to_string()))?;

        debug!(
            subsystem = "inference",
            response_len = content.len(),
            "Chat completion finished"
        );
        Ok(content)
    }

    async fn health_check(&self) -> Result<bool> {
        // Minimal models list request against the compatible API
        let response = self
            .build_get_request("/models")
            .timeout(Duration::from_secs(5))
            .send()
            .await;

        match response {
            Ok(resp) => {
                if resp.status().is_success() {
                    info!(subsystem = "inference", "OpenRouter health check passed");
                    Ok(true)
                } else {
                    warn!(
                        subsystem = "inference",
                        status = %resp.status(),
                        "OpenRouter health check failed"
                    );
                    Ok(false)
                }
            }
            Err(e) => {
                warn!(subsystem = "inference", error = %e, "OpenRouter health check error");
                Ok(false)
            }
        }
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}
