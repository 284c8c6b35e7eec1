//! Centralized default constants for the fleetlog system.
//!
//! **This module is the single source of truth** for all shared default
//! values. Crates reference these constants instead of defining their own
//! magic numbers. When adding new constants, place them in the appropriate
//! section and document the rationale for the chosen value.

// =============================================================================
// RASTERIZATION
// =============================================================================

/// Default render resolution for the HTTP upload path.
///
/// 150 DPI keeps request payloads small while remaining readable for
/// table-layout reports.
pub const DEFAULT_EXTRACT_DPI: u32 = 150;

/// Render resolution for accuracy-sensitive extraction (small decimal
/// print, dense utilization tables). Trades payload size for fidelity.
pub const HIGH_DETAIL_DPI: u32 = 450;

/// Timeout for external render commands (pdftoppm), in seconds.
pub const RENDER_CMD_TIMEOUT_SECS: u64 = 120;

// =============================================================================
// EXTRACTION
// =============================================================================

/// Maximum attempts for a schema-constrained model call. Retries are the
/// correctness backstop against probabilistic output, not network resilience.
pub const MAX_RETRIES: u32 = 3;

/// Sampling temperature for structured extraction. Deterministic-leaning to
/// minimize run-to-run variance in structured output.
pub const TEMPERATURE: f32 = 0.0;

/// Default model for text-modality extraction.
pub const TEXT_MODEL: &str = "openai/gpt-4o";

/// Default model for image-modality extraction.
pub const IMAGE_MODEL: &str = "openai/gpt-4o";

/// Default OpenRouter API base URL.
pub const OPENROUTER_URL: &str = "https://openrouter.ai/api/v1";

/// Request timeout for a single model call, in seconds.
pub const MODEL_TIMEOUT_SECS: u64 = 300;

// =============================================================================
// ENVIRONMENT VARIABLES
// =============================================================================

pub const ENV_OPENROUTER_API_KEY: &str = "OPENROUTER_API_KEY";
pub const ENV_OPENROUTER_URL: &str = "OPENROUTER_URL";
pub const ENV_TEXT_MODEL: &str = "FLEETLOG_TEXT_MODEL";
pub const ENV_IMAGE_MODEL: &str = "FLEETLOG_IMAGE_MODEL";
pub const ENV_MAX_RETRIES: &str = "FLEETLOG_MAX_RETRIES";
pub const ENV_TEMPERATURE: &str = "FLEETLOG_TEMPERATURE";
pub const ENV_DATABASE_URL: &str = "DATABASE_URL";
