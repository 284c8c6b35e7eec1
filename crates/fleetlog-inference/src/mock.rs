//! Mock chat backend for deterministic testing.
//!
//! Responses are scripted in order: each `complete` call consumes the next
//! entry, so retry behavior (bad output first, valid output later) can be
//! exercised without a live endpoint. When the script runs out, the default
//! response is returned.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use fleetlog_inference::mock::MockChatBackend;
//!
//! let backend = MockChatBackend::new()
//!     .with_scripted_response("not json")
//!     .with_scripted_response(r#"{"msn": "4521"}"#);
//! ```

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use fleetlog_core::{ChatBackend, ChatOptions, Error, Result, UserPart};

/// One scripted reply.
#[derive(Debug, Clone)]
enum ScriptedReply {
    Response(String),
    Failure(String),
}

/// One recorded call, for assertions.
#[derive(Debug, Clone)]
pub struct MockCall {
    pub system: String,
    pub text_parts: Vec<String>,
    pub image_count: usize,
    pub temperature: f32,
}

/// Mock chat backend with scripted responses and a call log.
#[derive(Clone)]
pub struct MockChatBackend {
    script: Arc<Mutex<VecDeque<ScriptedReply>>>,
    default_response: String,
    call_log: Arc<Mutex<Vec<MockCall>>>,
    model: String,
    healthy: bool,
}

impl MockChatBackend {
    /// Create a new mock backend with an empty script.
    pub fn new() -> Self {
        Self {
            script: Arc::new(Mutex::new(VecDeque::new())),
            default_response: "{}".to_string(),
            call_log: Arc::new(Mutex::new(Vec::new())),
            model: "mock/extract-v1".to_string(),
            healthy: true,
        }
    }

    /// Queue a successful response.
    pub fn with_scripted_response(self, response: impl Into<String>) -> Self {
        self.script
            .lock()
            .unwrap()
            .push_back(ScriptedReply::Response(response.into()));
        self
    }

    /// Queue a remote failure.
    pub fn with_scripted_failure(self, message: impl Into<String>) -> Self {
        self.script
            .lock()
            .unwrap()
            .push_back(ScriptedReply::Failure(message.into()));
        self
    }

    /// Set the response returned once the script is exhausted.
    pub fn with_default_response(mut self, response: impl Into<String>) -> Self {
        self.default_response = response.into();
        self
    }

    /// Report the endpoint as unreachable from `health_check`.
    pub fn with_unhealthy(mut self) -> Self {
        self.healthy = false;
        self
    }

    /// Get all logged calls for assertion.
    pub fn calls(&self) -> Vec<MockCall> {
        self.call_log.lock().unwrap().clone()
    }

    /// Number of completion calls made so far.
    pub fn call_count(&self) -> usize {
        self.call_log.lock().unwrap().len()
    }
}

impl Default for MockChatBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChatBackend for MockChatBackend {
    async fn complete(
        &self,
        system: &str,
        parts: &[UserPart],
        options: ChatOptions,
    ) -> Result<String> {
        let mut text_parts = Vec::new();
        let mut image_count = 0;
        for part in parts {
            match part {
                UserPart::Text(text) => text_parts.push(text.clone()),
                UserPart::ImageUrl(_) => image_count += 1,
            }
        }

        self.call_log.lock().unwrap().push(MockCall {
            system: system.to_string(),
            text_parts,
            image_count,
            temperature: options.temperature,
        });

        match self.script.lock().unwrap().pop_front() {
            Some(ScriptedReply::Response(response)) => Ok(response),
            Some(ScriptedReply::Failure(message)) => Err(Error::Inference(message)),
            None => Ok(self.default_response.clone()),
        }
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(self.healthy)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
