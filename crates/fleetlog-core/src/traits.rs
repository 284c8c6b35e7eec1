//! Core traits for fleetlog abstractions.
//!
//! These traits define the seams between the extraction pipeline and its
//! collaborators (persistent store, model endpoint), enabling pluggable
//! backends and testability.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;
use crate::models::*;

// =============================================================================
// AIRCRAFT REPOSITORY
// =============================================================================

/// Repository for single-record aircraft utilization reports.
///
/// `store` is idempotent over the natural key (registration, msn, month):
/// the existence check and the write are atomic with respect to that key,
/// so two concurrent stores of the same report produce exactly one parent
/// row and one of the callers observes `is_new = false`.
#[async_trait]
pub trait AircraftRepository: Send + Sync {
    /// Store a report unless a record with the same natural key exists.
    ///
    /// Returns the surviving record's identity. On a natural-key hit the
    /// existing record is returned untouched: no field updates, no child
    /// writes (duplication is a normal outcome, not an error).
    async fn store(&self, record: &AircraftUtilization) -> Result<StoreOutcome>;

    /// Point lookup by identity, with all child components.
    async fn fetch(&self, id: Uuid) -> Result<AircraftRecord>;

    /// Exact natural-key lookup (case-sensitive, as extracted).
    async fn find_by_natural_key(
        &self,
        registration: &str,
        msn: &str,
        month: &str,
    ) -> Result<Option<AircraftRecord>>;

    /// Most recent record for a registration, optionally filtered by month.
    /// Ties broken by creation timestamp descending.
    async fn find_by_registration(
        &self,
        registration: &str,
        month: Option<&str>,
    ) -> Result<Option<AircraftRecord>>;
}

// =============================================================================
// OPERATIONS REPOSITORY
// =============================================================================

/// Repository for multi-tenant operations batches (lessee → assets →
/// components), partitioned by month.
#[async_trait]
pub trait OperationsRepository: Send + Sync {
    /// True if any lessee row exists for the month partition. Used as a
    /// whole-batch pre-check before `save`.
    async fn month_exists(&self, month: &str) -> Result<bool>;

    /// Best-effort batch save. A failure on one entity is captured into the
    /// outcome's error list and does not abort sibling writes; parents are
    /// written before their children so generated ids can flow down.
    async fn save(&self, request: &SaveOperationsRequest) -> Result<SaveOperationsOutcome>;

    /// All lessees (with nested assets and components) for one month.
    async fn list_by_month(&self, month: &str) -> Result<Vec<LesseeRecord>>;

    /// Full scan of every lessee with nested children. Unbounded: viable
    /// only at operational-report volumes, not event-stream volumes.
    async fn list_all(&self) -> Result<Vec<LesseeRecord>>;

    /// Bulk partition delete. Returns whether any row was removed.
    async fn delete_by_month(&self, month: &str) -> Result<bool>;

    /// Case-insensitive name match against lessee name and asset name,
    /// first match wins. Linear scan over the full set; intentionally not
    /// indexed at target scale.
    async fn find_lessee_by_name(&self, name: &str) -> Result<Option<LesseeRecord>>;
}

// =============================================================================
// CHAT BACKEND
// =============================================================================

/// One user-message fragment sent to the model endpoint.
#[derive(Debug, Clone, PartialEq)]
pub enum UserPart {
    /// Plain instruction or document text.
    Text(String),
    /// Inline image as a base64 data-URI (`data:image/png;base64,...`).
    ImageUrl(String),
}

/// Options for a single chat completion call.
#[derive(Debug, Clone, Copy)]
pub struct ChatOptions {
    pub temperature: f32,
}

impl Default for ChatOptions {
    fn default() -> Self {
        Self {
            temperature: crate::defaults::TEMPERATURE,
        }
    }
}

/// Chat-style completion backend (vision-capable).
///
/// Implementations must be safe under concurrent use: one pooled HTTP
/// client shared across extraction requests, every call bounded by an
/// explicit timeout.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Run one completion: a system instruction plus a single user message
    /// assembled from `parts` (text first, then inline images). Returns the
    /// raw assistant text; callers re-validate it as untrusted input.
    async fn complete(
        &self,
        system: &str,
        parts: &[UserPart],
        options: ChatOptions,
    ) -> Result<String>;

    /// Check if the backend endpoint is reachable.
    async fn health_check(&self) -> Result<bool>;

    /// The model name requests are issued against.
    fn model_name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_options_default_temperature() {
        let options = ChatOptions::default();
        assert_eq!(options.temperature, 0.0);
    }

    #[test]
    fn test_user_part_variants() {
        let text = UserPart::Text("extract".to_string());
        let image = UserPart::ImageUrl("data:image/png;base64,AAAA".to_string());
        assert_ne!(text, image);
    }
}
