//! PDF rasterization via pdftoppm.
//!
//! Pipeline: PDF bytes → temp file → `pdftoppm -png -r <dpi>` → sorted page
//! PNGs → per-page enhancement → in-memory `RasterPage` list. An unreadable
//! document yields an empty page list with a warning; callers decide whether
//! that is fatal.

use std::fs;
use std::io::Write;

use tempfile::{NamedTempFile, TempDir};
use tokio::process::Command;
use tracing::{debug, warn};

use fleetlog_core::defaults::RENDER_CMD_TIMEOUT_SECS;
use fleetlog_core::{Error, Result};

use crate::enhance::enhance_page;

/// One rendered, enhanced page ready for model consumption.
#[derive(Debug, Clone)]
pub struct RasterPage {
    /// Zero-based page index in document order.
    pub index: usize,
    pub width: u32,
    pub height: u32,
    /// PNG-encoded RGB8 pixels.
    pub png: Vec<u8>,
}

/// Run a command that outputs to files rather than stdout.
async fn run_cmd_status(cmd: &mut Command, timeout_secs: u64) -> Result<()> {
    let output = tokio::time::timeout(std::time::Duration::from_secs(timeout_secs), cmd.output())
        .await
        .map_err(|_| {
            Error::Internal(format!(
                "External command timed out after {}s",
                timeout_secs
            ))
        })?
        .map_err(|e| Error::Internal(format!("Failed to execute command: {}", e)))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(Error::Internal(format!(
            "Command failed (exit {}): {}",
            output.status,
            stderr.trim()
        )));
    }

    Ok(())
}

/// Render every page of a PDF to enhanced PNG images at the given DPI.
///
/// Returns pages in document order. An unreadable or unparsable document
/// returns `Ok(vec![])` after a warning; the caller must treat an empty
/// result as failure if pages are required.
pub async fn rasterize_pdf(data: &[u8], dpi: u32) -> Result<Vec<RasterPage>> {
    if data.is_empty() {
        return Err(Error::Rasterize("empty document".to_string()));
    }

    // Validate PDF magic bytes
    if data.len() < 4 || &data[0..4] != b"%PDF" {
        return Err(Error::Rasterize(
            "not a valid PDF (missing %PDF header)".to_string(),
        ));
    }

    // Stage the PDF and an output dir; both are removed on drop.
    let mut tmpfile = NamedTempFile::new()
        .map_err(|e| Error::Internal(format!("Failed to create temp file: {}", e)))?;
    tmpfile
        .write_all(data)
        .map_err(|e| Error::Internal(format!("Failed to write temp file: {}", e)))?;
    let pdf_path = tmpfile.path().to_string_lossy().to_string();

    let img_dir = TempDir::new()
        .map_err(|e| Error::Internal(format!("Failed to create temp dir: {}", e)))?;
    let img_prefix = img_dir.path().join("page").to_string_lossy().to_string();

    debug!(subsystem = "extract", dpi, "Rendering PDF pages");

    let render = run_cmd_status(
        Command::new("pdftoppm")
            .arg("-png")
            .arg("-r")
            .arg(dpi.to_string())
            .arg(&pdf_path)
            .arg(&img_prefix),
        RENDER_CMD_TIMEOUT_SECS,
    )
    .await;

    if let Err(e) = render {
        // Corrupt or unrenderable input is a soft signal here.
        warn!(subsystem = "extract", error = %e, "PDF render failed, returning no pages");
        return Ok(Vec::new());
    }

    // Collect rendered pages; pdftoppm zero-pads page numbers, so a name
    // sort yields document order.
    let mut page_paths: Vec<std::path::PathBuf> = Vec::new();
    let entries = fs::read_dir(img_dir.path())
        .map_err(|e| Error::Internal(format!("Failed to read temp dir: {}", e)))?;
    for entry in entries {
        let entry =
            entry.map_err(|e| Error::Internal(format!("Failed to read dir entry: {}", e)))?;
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) == Some("png") {
            page_paths.push(path);
        }
    }
    page_paths.sort();

    if page_paths.is_empty() {
        warn!(subsystem = "extract", "No pages rendered from PDF");
        return Ok(Vec::new());
    }

    let mut pages = Vec::with_capacity(page_paths.len());
    for (index, path) in page_paths.iter().enumerate() {
        let img = image::open(path)
            .map_err(|e| Error::Rasterize(format!("failed to load rendered page: {}", e)))?;
        pages.push(enhance_page(index, &img)?);
    }

    debug!(
        subsystem = "extract",
        page_count = pages.len(),
        "PDF rendered and enhanced"
    );
    Ok(pages)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_empty_input_is_rasterize_error() {
        let err = rasterize_pdf(b"", 150).await.unwrap_err();
        assert!(matches!(err, Error::Rasterize(_)));
    }

    #[tokio::test]
    async fn test_missing_magic_is_rasterize_error() {
        let err = rasterize_pdf(b"not a pdf at all", 150).await.unwrap_err();
        assert!(err.to_string().contains("Could not read document"));
    }

    #[tokio::test]
    async fn test_corrupt_pdf_yields_no_pages() {
        // Has the magic header but no valid body: the renderer fails and
        // the result is an empty page list, not an error.
        let pages = rasterize_pdf(b"%PDF-1.4\ngarbage", 150).await.unwrap();
        assert!(pages.is_empty());
    }
}
