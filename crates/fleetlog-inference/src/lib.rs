//! # fleetlog-inference
//!
//! Vision LLM backend abstraction for fleetlog.
//!
//! This crate provides:
//! - An OpenRouter client speaking the OpenAI-compatible chat protocol,
//!   with multimodal (text + inline image) user messages
//! - Wire types for requests and responses
//! - A scripted mock backend for deterministic tests
//!
//! The [`ChatBackend`] trait itself lives in `fleetlog-core` so the
//! extraction pipeline can depend on the seam without this crate.

pub mod backend;
pub mod mock;
pub mod types;

pub use backend::{OpenRouterBackend, OpenRouterConfig};
pub use mock::MockChatBackend;
pub use types::{
    ApiError, ApiErrorResponse, ChatCompletionRequest, ChatCompletionResponse, ChatMessage,
    ContentPart, ImageUrl, MessageContent,
};

// Re-export the trait and its argument types for convenience.
pub use fleetlog_core::{ChatBackend, ChatOptions, UserPart};
