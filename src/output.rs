//! Result types returned by the conversion entry points.

use crate::error::NodeWarning;
use serde::{Deserialize, Serialize};

/// A converted document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionOutput {
    /// The complete, self-contained HTML document.
    pub html: String,
    /// Dominant font size (points) every paragraph is scaled against.
    pub baseline_size: f32,
    /// Metadata read from the source PDF.
    pub metadata: DocumentMetadata,
    /// Counters and timings for the run.
    pub stats: ConversionStats,
    /// Nodes that were dropped or degraded, in document order.
    pub warnings: Vec<NodeWarning>,
}

/// Counters collected while walking the layout.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionStats {
    /// Pages in the source document.
    pub total_pages: usize,
    /// Pages selected and walked.
    pub processed_pages: usize,
    /// Paragraph elements emitted.
    pub paragraphs: usize,
    /// Image elements emitted.
    pub images: usize,
    /// Image nodes dropped because they failed to decode.
    pub skipped_images: usize,
    /// Text boxes without a detectable font size (dropped or emitted
    /// unscaled depending on [`crate::UnsizedTextPolicy`]).
    pub unsized_text: usize,
    /// Characters accumulated into the font-size histogram.
    pub total_characters: usize,
    /// Wall-clock time of the conversion.
    pub duration_ms: u64,
}

impl ConversionStats {
    /// Paragraphs plus images.
    pub fn elements(&self) -> usize {
        self.paragraphs + self.images
    }
}

/// Document-level information read from the PDF's info dictionary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    pub title: Option<String>,
    pub author: Option<String>,
    pub subject: Option<String>,
    pub creator: Option<String>,
    pub producer: Option<String>,
    pub page_count: usize,
    pub pdf_version: String,
}
