//! Configuration types for PDF-to-HTML conversion.
//!
//! All conversion behaviour is controlled through [`ConversionConfig`], built
//! via its [`ConversionConfigBuilder`]. Every knob lives in one struct so a
//! run can be logged and two runs compared field by field.

use crate::error::Pdf2HtmlError;
use crate::progress::ProgressCallback;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Smallest entry of the client-side size selector, in CSS pixels.
pub const MIN_BASE_FONT_SIZE: u32 = 8;
/// Largest entry of the client-side size selector, in CSS pixels.
pub const MAX_BASE_FONT_SIZE: u32 = 24;
/// Size selected in the client when the document opens.
pub const DEFAULT_BASE_FONT_SIZE: u32 = 13;

/// Configuration for a PDF-to-HTML conversion.
///
/// Built via [`ConversionConfig::builder()`] or using
/// [`ConversionConfig::default()`].
///
/// # Example
/// ```rust
/// use pdf2html::{ConversionConfig, UnsizedTextPolicy};
///
/// let config = ConversionConfig::builder()
///     .base_font_size(16)
///     .unsized_text(UnsizedTextPolicy::Unscaled)
///     .build()
///     .unwrap();
/// assert_eq!(config.base_font_size, 16);
/// ```
#[derive(Clone)]
pub struct ConversionConfig {
    /// Display size preselected in the reader's size selector. Range: 8–24. Default: 13.
    ///
    /// Independent of the detected baseline: text at the baseline size is
    /// shown at exactly this many pixels, everything else proportionally.
    pub base_font_size: u32,

    /// Page selection. Default: All pages.
    pub pages: PageSelection,

    /// PDF user password for encrypted documents.
    pub password: Option<String>,

    /// What to do with text boxes that carry no font size. Default: [`UnsizedTextPolicy::Drop`].
    pub unsized_text: UnsizedTextPolicy,

    /// Baseline used when no text box in the document has a font size.
    ///
    /// `None` (the default) turns that situation into
    /// [`Pdf2HtmlError::NoFontSizeDetected`].
    pub fallback_baseline: Option<f32>,

    /// Parameters for assembling text boxes out of positioned text runs.
    pub layout: LayoutParams,

    /// Document title override. If None, the PDF's title metadata is used,
    /// then the input file stem.
    pub title: Option<String>,

    /// Optional per-page progress callback.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            base_font_size: DEFAULT_BASE_FONT_SIZE,
            pages: PageSelection::default(),
            password: None,
            unsized_text: UnsizedTextPolicy::default(),
            fallback_baseline: None,
            layout: LayoutParams::default(),
            title: None,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ConversionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionConfig")
            .field("base_font_size", &self.base_font_size)
            .field("pages", &self.pages)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("unsized_text", &self.unsized_text)
            .field("fallback_baseline", &self.fallback_baseline)
            .field("layout", &self.layout)
            .field("title", &self.title)
            .field(
                "progress_callback",
                &self
                    .progress_callback
                    .as_ref()
                    .map(|_| "<dyn ConversionProgressCallback>"),
            )
            .finish()
    }
}

impl ConversionConfig {
    /// Create a new builder for `ConversionConfig`.
    pub fn builder() -> ConversionConfigBuilder {
        ConversionConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`ConversionConfig`].
#[derive(Debug)]
pub struct ConversionConfigBuilder {
    config: ConversionConfig,
}

impl ConversionConfigBuilder {
    pub fn base_font_size(mut self, size: u32) -> Self {
        self.config.base_font_size = size.clamp(MIN_BASE_FONT_SIZE, MAX_BASE_FONT_SIZE);
        self
    }

    pub fn pages(mut self, selection: PageSelection) -> Self {
        self.config.pages = selection;
        self
    }

    pub fn password(mut self, pwd: impl Into<String>) -> Self {
        self.config.password = Some(pwd.into());
        self
    }

    pub fn unsized_text(mut self, policy: UnsizedTextPolicy) -> Self {
        self.config.unsized_text = policy;
        self
    }

    pub fn fallback_baseline(mut self, points: f32) -> Self {
        self.config.fallback_baseline = Some(points);
        self
    }

    pub fn line_margin(mut self, margin: f32) -> Self {
        self.config.layout.line_margin = margin;
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.config.title = Some(title.into());
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ConversionConfig, Pdf2HtmlError> {
        let c = &self.config;
        if !(MIN_BASE_FONT_SIZE..=MAX_BASE_FONT_SIZE).contains(&c.base_font_size) {
            return Err(Pdf2HtmlError::InvalidConfig(format!(
                "Base font size must be {MIN_BASE_FONT_SIZE}–{MAX_BASE_FONT_SIZE}, got {}",
                c.base_font_size
            )));
        }
        if let Some(fallback) = c.fallback_baseline {
            if !fallback.is_finite() || fallback <= 0.0 {
                return Err(Pdf2HtmlError::InvalidConfig(format!(
                    "Fallback baseline must be a positive number of points, got {fallback}"
                )));
            }
        }
        if !c.layout.line_margin.is_finite() || c.layout.line_margin < 0.0 {
            return Err(Pdf2HtmlError::InvalidConfig(format!(
                "Line margin must be ≥ 0, got {}",
                c.layout.line_margin
            )));
        }
        Ok(self.config)
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// Handling of text boxes whose glyphs carry no usable font size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum UnsizedTextPolicy {
    /// Leave the text box out of the document and record a warning. (default)
    #[default]
    Drop,
    /// Emit the text as a paragraph without `data-original-size`; the
    /// reader never rescales it. A warning is still recorded.
    Unscaled,
}

/// Tuning for text-box assembly in the pdfium layout source.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayoutParams {
    /// Two lines belong to the same text box when the vertical gap between
    /// them is at most `line_margin` times the taller line's height.
    /// Default: 0.5.
    pub line_margin: f32,
}

impl Default for LayoutParams {
    fn default() -> Self {
        Self { line_margin: 0.5 }
    }
}

/// Specifies which pages of the PDF to convert.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub enum PageSelection {
    /// Convert all pages (default).
    #[default]
    All,
    /// Convert a single page (1-indexed).
    Single(usize),
    /// Convert a contiguous range of pages (1-indexed, inclusive).
    Range(usize, usize),
    /// Convert specific pages (1-indexed, deduplicated).
    Set(Vec<usize>),
}

impl PageSelection {
    /// Expand the selection into a sorted, deduplicated list of 0-indexed page numbers.
    pub fn to_indices(&self, total_pages: usize) -> Vec<usize> {
        let mut indices: Vec<usize> = match self {
            PageSelection::All => (0..total_pages).collect(),
            PageSelection::Single(p) => {
                if *p >= 1 && *p <= total_pages {
                    vec![p - 1]
                } else {
                    vec![]
                }
            }
            PageSelection::Range(start, end) => {
                let s = (*start).max(1) - 1;
                let e = (*end).min(total_pages);
                (s..e).collect()
            }
            PageSelection::Set(pages) => pages
                .iter()
                .filter(|&&p| p >= 1 && p <= total_pages)
                .map(|p| p - 1)
                .collect(),
        };
        indices.sort_unstable();
        indices.dedup();
        indices
    }

    /// First requested page number, used to report an empty selection.
    pub fn first_requested(&self) -> usize {
        match self {
            PageSelection::All => 1,
            PageSelection::Single(p) => *p,
            PageSelection::Range(start, _) => *start,
            PageSelection::Set(pages) => pages.iter().copied().min().unwrap_or(0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let c = ConversionConfig::default();
        assert_eq!(c.base_font_size, 13);
        assert_eq!(c.unsized_text, UnsizedTextPolicy::Drop);
        assert!(c.fallback_baseline.is_none());
        assert_eq!(c.layout.line_margin, 0.5);
    }

    #[test]
    fn builder_clamps_base_size() {
        let c = ConversionConfig::builder().base_font_size(99).build().unwrap();
        assert_eq!(c.base_font_size, MAX_BASE_FONT_SIZE);
        let c = ConversionConfig::builder().base_font_size(1).build().unwrap();
        assert_eq!(c.base_font_size, MIN_BASE_FONT_SIZE);
    }

    #[test]
    fn builder_rejects_bad_fallback() {
        let err = ConversionConfig::builder()
            .fallback_baseline(-2.0)
            .build()
            .unwrap_err();
        assert!(matches!(err, Pdf2HtmlError::InvalidConfig(_)));
    }

    #[test]
    fn builder_rejects_negative_line_margin() {
        let err = ConversionConfig::builder()
            .line_margin(-0.1)
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("Line margin"));
    }

    #[test]
    fn debug_redacts_password() {
        let c = ConversionConfig::builder().password("hunter2").build().unwrap();
        let dbg = format!("{c:?}");
        assert!(!dbg.contains("hunter2"));
        assert!(dbg.contains("<redacted>"));
    }

    #[test]
    fn page_selection_to_indices() {
        assert_eq!(PageSelection::All.to_indices(5), vec![0, 1, 2, 3, 4]);
        assert_eq!(PageSelection::Single(3).to_indices(5), vec![2]);
        assert_eq!(PageSelection::Single(6).to_indices(5), Vec::<usize>::new());
        assert_eq!(PageSelection::Range(2, 4).to_indices(5), vec![1, 2, 3]);
        assert_eq!(
            PageSelection::Set(vec![5, 1, 3, 3]).to_indices(5),
            vec![0, 2, 4]
        );
    }

    #[test]
    fn first_requested_page() {
        assert_eq!(PageSelection::Set(vec![7, 4]).first_requested(), 4);
        assert_eq!(PageSelection::Range(9, 12).first_requested(), 9);
    }
}
