//! # fleetlog-core
//!
//! Core types, traits, and abstractions for the fleetlog extraction system.
//!
//! This crate provides the foundational data structures and trait
//! definitions that the other fleetlog crates depend on: the extracted
//! record families (aircraft utilization, invoices, operations batches),
//! the advisory validators, the repository and chat-backend seams, and the
//! shared error type.

pub mod defaults;
pub mod error;
pub mod logging;
pub mod media;
pub mod models;
pub mod traits;
pub mod validate;

// Re-export commonly used types at crate root
pub use error::{Error, Result};
pub use media::{check_declared_type, is_image, is_pdf, media_type_for};
pub use models::*;
pub use traits::*;
pub use validate::{validate_aircraft_utilization, validate_invoice, ValidationReport};
