//! Input validation: make sure the user-supplied path is a readable PDF.
//!
//! pdfium reports a missing file and a non-PDF file with the same opaque
//! error. Checking existence, permissions and the `%PDF` magic bytes up front
//! turns those into actionable [`Pdf2HtmlError`] variants.

use crate::error::Pdf2HtmlError;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Validate a local file path, checking existence, permissions and PDF magic bytes.
pub fn resolve_local(path: impl AsRef<Path>) -> Result<PathBuf, Pdf2HtmlError> {
    let path = path.as_ref().to_path_buf();

    if !path.exists() {
        return Err(Pdf2HtmlError::FileNotFound { path });
    }

    match std::fs::File::open(&path) {
        Ok(mut f) => {
            let mut magic = [0u8; 4];
            if f.read_exact(&mut magic).is_ok() && &magic != b"%PDF" {
                return Err(Pdf2HtmlError::NotAPdf { path, magic });
            }
        }
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            return Err(Pdf2HtmlError::PermissionDenied { path });
        }
        Err(_) => {
            return Err(Pdf2HtmlError::FileNotFound { path });
        }
    }

    debug!("Resolved local PDF: {}", path.display());
    Ok(path)
}

/// Default output location: `output.html` next to the input file.
pub fn default_output_path(input: &Path) -> PathBuf {
    input
        .parent()
        .unwrap_or_else(|| Path::new(""))
        .join("output.html")
}
