//! # fleetlog-extract
//!
//! Document rasterization and schema-constrained extraction for fleetlog.
//!
//! Pipeline: scanned PDF → `pdftoppm` render → per-page enhancement →
//! base64 PNG data-URIs → one vision completion per extraction, with
//! bounded retries against schema-invalid output → typed record.
//!
//! The crate is backend-agnostic: anything implementing
//! `fleetlog_core::ChatBackend` can serve as the model endpoint.

pub mod enhance;
pub mod extractor;
pub mod pipeline;
pub mod prompt;
pub mod raster;

pub use extractor::{extract_structured, strip_code_fences, ExtractOptions};
pub use pipeline::{data_uri, extract_aircraft_from_pdf, extract_invoice_from_image};
pub use prompt::{
    build_aircraft_prompt, build_invoice_prompt, AIRCRAFT_SYSTEM_PROMPT, INVOICE_SYSTEM_PROMPT,
};
pub use raster::{rasterize_pdf, RasterPage};
