//! Inbound document type guard.
//!
//! Uploads are accepted only for the formats the extraction pipeline can
//! handle: common raster image formats and PDF. The check runs on the
//! declared filename before any processing; the magic-byte cross-check
//! catches mislabeled bytes once they are in hand.

use crate::error::{Error, Result};

/// Supported upload extensions (lowercase, no dot) with their canonical
/// MIME types.
pub const SUPPORTED_TYPES: &[(&str, &str)] = &[
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("png", "image/png"),
    ("gif", "image/gif"),
    ("webp", "image/webp"),
    ("pdf", "application/pdf"),
];

fn extension_of(filename: &str) -> Option<String> {
    std::path::Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
}

/// Resolve the canonical MIME type for a filename, rejecting unsupported
/// extensions before any processing happens.
pub fn media_type_for(filename: &str) -> Result<&'static str> {
    let ext = extension_of(filename)
        .ok_or_else(|| Error::InvalidInput(format!("File '{}' has no extension", filename)))?;

    SUPPORTED_TYPES
        .iter()
        .find(|(e, _)| *e == ext)
        .map(|(_, mime)| *mime)
        .ok_or_else(|| {
            let supported: Vec<&str> = SUPPORTED_TYPES.iter().map(|(e, _)| *e).collect();
            Error::InvalidInput(format!(
                "Unsupported file type: .{}. Supported: {}",
                ext,
                supported.join(", ")
            ))
        })
}

/// True if the filename carries a supported raster-image extension.
pub fn is_image(filename: &str) -> bool {
    matches!(
        extension_of(filename).as_deref(),
        Some("jpg" | "jpeg" | "png" | "gif" | "webp")
    )
}

/// True if the filename carries a PDF extension.
pub fn is_pdf(filename: &str) -> bool {
    extension_of(filename).as_deref() == Some("pdf")
}

/// Cross-check declared type against magic bytes.
///
/// The declared extension decides routing; this check only refuses bytes
/// that are detectably something else entirely (e.g. a ZIP uploaded as
/// report.pdf). Undetectable content passes, since truncated but valid
/// scans often defeat sniffing.
pub fn check_declared_type(filename: &str, data: &[u8]) -> Result<()> {
    let declared = media_type_for(filename)?;

    if let Some(kind) = infer::get(data) {
        let detected = kind.mime_type();
        let compatible = detected == declared
            || (declared.starts_with("image/") && detected.starts_with("image/"));
        if !compatible {
            return Err(Error::InvalidInput(format!(
                "File '{}' declares {} but contains {}",
                filename, declared, detected
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_media_type_for_supported() {
        assert_eq!(media_type_for("report.pdf").unwrap(), "application/pdf");
        assert_eq!(media_type_for("invoice.JPG").unwrap(), "image/jpeg");
        assert_eq!(media_type_for("scan.png").unwrap(), "image/png");
    }

    #[test]
    fn test_media_type_for_unsupported() {
        let err = media_type_for("report.docx").unwrap_err();
        assert!(err.to_string().contains("Unsupported file type: .docx"));

        assert!(media_type_for("noextension").is_err());
    }

    #[test]
    fn test_is_image_and_is_pdf() {
        assert!(is_image("a.webp"));
        assert!(!is_image("a.pdf"));
        assert!(is_pdf("report.PDF"));
        assert!(!is_pdf("a.jpeg"));
    }

    #[test]
    fn test_check_declared_type_accepts_matching_pdf() {
        assert!(check_declared_type("r.pdf", b"%PDF-1.7\n...").is_ok());
    }

    #[test]
    fn test_check_declared_type_rejects_mismatch() {
        // ZIP local file header uploaded as a PDF.
        let zip = [0x50, 0x4B, 0x03, 0x04, 0x00, 0x00, 0x00, 0x00];
        assert!(check_declared_type("r.pdf", &zip).is_err());
    }

    #[test]
    fn test_check_declared_type_allows_undetectable() {
        assert!(check_declared_type("r.pdf", b"garbage").is_ok());
    }
}
