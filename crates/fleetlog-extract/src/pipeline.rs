//! End-to-end extraction pipelines.
//!
//! Each pipeline assembles the modality-specific message (rendered pages or
//! a single image), runs the schema-constrained extractor, and returns the
//! typed record. Validation is the caller's concern and never blocks here.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use tracing::{info, warn};

use fleetlog_core::{AircraftUtilization, Error, InvoiceResponse, Result, UserPart};

use crate::extractor::{extract_structured, ExtractOptions};
use crate::prompt::{
    build_aircraft_prompt, build_invoice_prompt, AIRCRAFT_SYSTEM_PROMPT, INVOICE_SYSTEM_PROMPT,
};
use crate::raster::rasterize_pdf;

/// Extract an aircraft utilization report from a scanned PDF.
///
/// Rasterizes at the given DPI, fails before any remote call if no page
/// could be rendered, then runs one vision extraction over all pages.
pub async fn extract_aircraft_from_pdf(
    backend: &dyn fleetlog_core::ChatBackend,
    data: &[u8],
    dpi: u32,
    opts: ExtractOptions,
) -> Result<AircraftUtilization> {
    let pages = rasterize_pdf(data, dpi).await?;
    if pages.is_empty() {
        warn!(
            subsystem = "extract",
            op = "extract_aircraft",
            "No pages rendered, aborting before model call"
        );
        return Err(Error::Rasterize("could not rasterize document".to_string()));
    }

    info!(
        subsystem = "extract",
        op = "extract_aircraft",
        page_count = pages.len(),
        dpi,
        "Extracting aircraft utilization report"
    );

    let mut parts = Vec::with_capacity(pages.len() + 1);
    parts.push(UserPart::Text(build_aircraft_prompt()));
    for page in &pages {
        parts.push(UserPart::ImageUrl(png_data_uri(&page.png)));
    }

    extract_structured(backend, AIRCRAFT_SYSTEM_PROMPT, &parts, opts).await
}

/// Extract an invoice from a single document image.
pub async fn extract_invoice_from_image(
    backend: &dyn fleetlog_core::ChatBackend,
    data: &[u8],
    mime_type: &str,
    opts: ExtractOptions,
) -> Result<InvoiceResponse> {
    if data.is_empty() {
        return Err(Error::InvalidInput("empty image".to_string()));
    }

    info!(
        subsystem = "extract",
        op = "extract_invoice",
        mime_type,
        bytes = data.len(),
        "Extracting invoice"
    );

    let parts = vec![
        UserPart::Text(build_invoice_prompt()),
        UserPart::ImageUrl(data_uri(mime_type, data)),
    ];

    extract_structured(backend, INVOICE_SYSTEM_PROMPT, &parts, opts).await
}

/// Encode bytes as a base64 data-URI with the given MIME type.
pub fn data_uri(mime_type: &str, data: &[u8]) -> String {
    format!("data:{};base64,{}", mime_type, STANDARD.encode(data))
}

fn png_data_uri(png: &[u8]) -> String {
    data_uri("image/png", png)
}
