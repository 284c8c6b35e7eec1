//! Structured logging schema and field name constants for fleetlog.
//!
//! All crates use these constants for consistent structured logging fields,
//! so log aggregation tools can query by standardized field names across
//! every subsystem.
//!
//! ## Log Level Contract
//!
//! | Level | Usage |
//! |-------|-------|
//! | ERROR | Degraded service, requires operator attention |
//! | WARN  | Recoverable issue, automatic fallback applied |
//! | INFO  | Lifecycle events (startup, shutdown), operation completions |
//! | DEBUG | Decision points, intermediate values, config choices |
//! | TRACE | Per-item iteration, high-volume data (pages, rows) |

// ─── Identity fields ───────────────────────────────────────────────────────

/// Subsystem originating the log event.
/// Values: "api", "db", "inference", "extract"
pub const SUBSYSTEM: &str = "subsystem";

/// Component within a subsystem.
/// Examples: "raster", "extractor", "pool", "aircraft", "operations"
pub const COMPONENT: &str = "component";

/// Logical operation name.
/// Examples: "rasterize", "extract", "store", "save_batch"
pub const OPERATION: &str = "op";

// ─── Entity fields ─────────────────────────────────────────────────────────

/// Aircraft record UUID being operated on.
pub const RECORD_ID: &str = "record_id";

/// Aircraft registration number.
pub const REGISTRATION: &str = "registration";

/// Report month partition key.
pub const MONTH: &str = "month";

/// Uploaded source file name (provenance).
pub const FILE_NAME: &str = "file_name";

// ─── Measurement fields ────────────────────────────────────────────────────

/// Wall-clock duration in milliseconds.
pub const DURATION_MS: &str = "duration_ms";

/// Number of rendered pages.
pub const PAGE_COUNT: &str = "page_count";

/// Attempt number within a retry loop (1-based).
pub const ATTEMPT: &str = "attempt";

/// Retry trigger classification: "schema" or "remote".
pub const RETRY_REASON: &str = "reason";

/// Byte length of a model response.
pub const RESPONSE_LEN: &str = "response_len";

// ─── Database fields ───────────────────────────────────────────────────────

/// Number of active connections in the pool.
pub const POOL_SIZE: &str = "pool_size";

/// Number of idle connections in the pool.
pub const POOL_IDLE: &str = "pool_idle";

/// Database table or entity affected.
pub const DB_TABLE: &str = "db_table";
