//! Progress-callback trait for per-page conversion events.
//!
//! Inject an [`Arc<dyn ConversionProgressCallback>`] via
//! [`crate::config::ConversionConfigBuilder::progress_callback`] to receive
//! events as the pipeline walks each page.
//!
//! # Example
//!
//! ```rust
//! use pdf2html::{ConversionProgressCallback, ConversionConfig};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     pages: AtomicUsize,
//! }
//!
//! impl ConversionProgressCallback for CountingCallback {
//!     fn on_page_complete(&self, page_num: usize, total_pages: usize, elements: usize) {
//!         self.pages.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("Page {}/{} done ({} elements)", page_num, total_pages, elements);
//!     }
//! }
//!
//! let counter = Arc::new(CountingCallback { pages: AtomicUsize::new(0) });
//!
//! let config = ConversionConfig::builder()
//!     .progress_callback(counter as Arc<dyn ConversionProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use std::sync::Arc;

/// Called by the conversion pipeline as it processes each page.
///
/// Conversion is single-threaded, but the trait is `Send + Sync` so one
/// callback can be shared with a UI thread. All methods have default no-op
/// implementations so callers only override what they care about.
pub trait ConversionProgressCallback: Send + Sync {
    /// Called once before the first page is walked.
    ///
    /// # Arguments
    /// * `total_pages`: number of pages that will be processed
    fn on_conversion_start(&self, total_pages: usize) {
        let _ = total_pages;
    }

    /// Called after a page's layout has been walked.
    ///
    /// # Arguments
    /// * `page_num`   : 1-indexed page number
    /// * `total_pages`: pages selected for conversion
    /// * `elements`   : paragraphs and images the page contributed
    fn on_page_complete(&self, page_num: usize, total_pages: usize, elements: usize) {
        let _ = (page_num, total_pages, elements);
    }

    /// Called when an image node is dropped because it could not be decoded.
    fn on_image_skipped(&self, page_num: usize, detail: &str) {
        let _ = (page_num, detail);
    }

    /// Called once after the document has been emitted.
    ///
    /// # Arguments
    /// * `total_pages`: pages processed
    /// * `elements`   : paragraphs and images in the final document
    fn on_conversion_complete(&self, total_pages: usize, elements: usize) {
        let _ = (total_pages, elements);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl ConversionProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ConversionConfig`].
pub type ProgressCallback = Arc<dyn ConversionProgressCallback>;
