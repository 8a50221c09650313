//! # pdf2html
//!
//! Convert PDF documents into a single self-contained HTML file with a
//! client-side reader (font size, reading mode, font family).
//!
//! ## Why this crate?
//!
//! Reading a PDF on a phone means pinching and panning across fixed pages.
//! This crate keeps the text and images of the document in reading order and
//! drops the page geometry, so the browser can reflow it. Relative font sizes
//! survive: every paragraph remembers its original size and the reader scales
//! it against the document's dominant body-text size.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF
//!  │
//!  ├─ 1. Input    validate the local file (%PDF magic)
//!  ├─ 2. Layout   pdfium page objects → text boxes, images, groups
//!  ├─ 3. Walk     flatten groups, clean text, inline images as PNG
//!  ├─ 4. Fonts    character-weighted histogram → baseline size
//!  └─ 5. Emit     HTML + reader config + static reader script
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pdf2html::{convert_to_file, ConversionConfig};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConversionConfig::builder().base_font_size(16).build()?;
//!     let stats = convert_to_file("document.pdf", "document.html", &config)?;
//!     eprintln!(
//!         "{} paragraphs, {} images ({} skipped)",
//!         stats.paragraphs, stats.images, stats.skipped_images
//!     );
//!     Ok(())
//! }
//! ```
//!
//! Callers with their own layout analysis can skip pdfium entirely and hand
//! a [`MemoryLayout`] to [`convert_layout`].
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pdf2html` binary (clap + anyhow + indicatif + tracing-subscriber) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! pdf2html = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod error;
pub mod layout;
pub mod output;
pub mod pipeline;
pub mod progress;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{
    ConversionConfig, ConversionConfigBuilder, LayoutParams, PageSelection, UnsizedTextPolicy,
};
pub use convert::{convert, convert_from_bytes, convert_layout, convert_to_file, inspect};
pub use error::{NodeWarning, Pdf2HtmlError};
pub use layout::{GroupRun, ImageRun, LayoutNode, LayoutSource, MemoryLayout, TextRun};
pub use output::{ConversionOutput, ConversionStats, DocumentMetadata};
pub use pipeline::client::{ClientConfig, ReadingMode};
pub use progress::{ConversionProgressCallback, NoopProgressCallback, ProgressCallback};
