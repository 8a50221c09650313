//! Error types for the pdf2html library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`Pdf2HtmlError`]: **Fatal**: the conversion cannot proceed at all
//!   (bad input file, wrong password, no body text to scale against).
//!   Returned as `Err(Pdf2HtmlError)` from the top-level `convert*` functions
//!   and no output file is written.
//!
//! * [`NodeWarning`]: **Contained**: a single layout node could not be
//!   emitted (an image that fails to decode, a text box without any font
//!   size). The node is dropped, the warning is stored in
//!   [`crate::output::ConversionOutput::warnings`] and conversion continues.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the pdf2html library.
#[derive(Debug, Error)]
pub enum Pdf2HtmlError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("PDF file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The file exists and was read, but is not a PDF.
    #[error("File is not a valid PDF: '{path}'\nFirst bytes: {magic:?}")]
    NotAPdf { path: PathBuf, magic: [u8; 4] },

    // ── PDF errors ────────────────────────────────────────────────────────
    /// PDF header/trailer/xref is corrupt and cannot be parsed.
    #[error("PDF '{path}' is corrupt: {detail}\nTry repairing with: qpdf --decrypt input.pdf output.pdf")]
    CorruptPdf { path: PathBuf, detail: String },

    /// PDF requires a password but none was provided.
    #[error("PDF '{path}' is encrypted and requires a password.\nProvide it with --password <PASSWORD>.")]
    PasswordRequired { path: PathBuf },

    /// A password was provided but it is wrong.
    #[error("Wrong password for PDF '{path}'")]
    WrongPassword { path: PathBuf },

    /// Selected page numbers exceed the actual page count.
    #[error("Page {page} is out of range (document has {total} pages)")]
    PageOutOfRange { page: usize, total: usize },

    /// The layout source could not produce the node tree of a page.
    #[error("Layout analysis failed for page {page}: {detail}")]
    LayoutFailed { page: usize, detail: String },

    // ── Normalisation errors ──────────────────────────────────────────────
    /// Not a single text box carried a font size, so there is no baseline
    /// to scale against.
    #[error(
        "No font size detected in {pages} page(s); cannot choose a baseline.\n\
         Set a fallback with --fallback-baseline <POINTS>."
    )]
    NoFontSizeDetected { pages: usize },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write the output HTML file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Pdfium binding errors ─────────────────────────────────────────────
    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\n\
PDFium is normally downloaded automatically on first run.\n\
If the auto-download failed, you can:\n\
  • Check your internet connection and try again.\n\
  • Set PDFIUM_LIB_PATH=/path/to/libpdfium to use an existing copy.\n"
    )]
    PdfiumBindingFailed(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A contained failure for a single layout node.
///
/// The node is left out of the document; everything else is emitted.
#[derive(Debug, Clone, PartialEq, Error, serde::Serialize, serde::Deserialize)]
pub enum NodeWarning {
    /// An image could not be decoded or re-encoded.
    #[error("Page {page}: image skipped: {detail}")]
    ImageSkipped { page: usize, detail: String },

    /// A text box had no glyph with a usable font size.
    #[error("Page {page}: font size not detected for text {preview:?}")]
    FontSizeMissing { page: usize, preview: String },
}
