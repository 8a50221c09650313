//! Layout model: the node tree a [`LayoutSource`] hands to the pipeline.
//!
//! A page is a sequence of [`LayoutNode`]s in reading order. Each node is
//! resolved into one of three variants as soon as it leaves the layout
//! engine, so the rest of the pipeline matches exhaustively instead of
//! probing node types:
//!
//! ```text
//! LayoutNode
//!  ├─ Text(TextRun)    glyphs with optional per-glyph font size
//!  ├─ Image(ImageRun)  encoded bytes, decoded bitmap, or an error
//!  └─ Group(GroupRun)  transparent container (form XObject / figure)
//! ```
//!
//! Nodes are owned by the page that produced them and dropped once the page
//! has been walked.

pub mod pdfium;
pub mod textbox;

use crate::error::Pdf2HtmlError;
use crate::output::DocumentMetadata;
use image::{DynamicImage, ImageFormat};

/// One structural unit of a laid-out page.
#[derive(Debug, Clone)]
pub enum LayoutNode {
    Text(TextRun),
    Image(ImageRun),
    Group(GroupRun),
}

/// A single character with the font size it was drawn at.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Glyph {
    pub ch: char,
    /// Font size in points; `None` when the layout engine had none (e.g.
    /// synthesised spaces and line breaks).
    pub size: Option<f32>,
}

impl Glyph {
    pub fn new(ch: char, size: Option<f32>) -> Self {
        Self { ch, size }
    }

    /// The glyph's size if it is a usable positive, finite value.
    pub fn usable_size(&self) -> Option<f32> {
        self.size.filter(|s| s.is_finite() && *s > 0.0)
    }
}

/// A text box: glyph runs belonging to one paragraph.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextRun {
    pub glyphs: Vec<Glyph>,
}

impl TextRun {
    pub fn new(glyphs: Vec<Glyph>) -> Self {
        Self { glyphs }
    }

    /// A run where every character carries the same size.
    pub fn uniform(text: &str, size: f32) -> Self {
        Self {
            glyphs: text.chars().map(|ch| Glyph::new(ch, Some(size))).collect(),
        }
    }

    /// A run without any size information.
    pub fn without_sizes(text: &str) -> Self {
        Self {
            glyphs: text.chars().map(|ch| Glyph::new(ch, None)).collect(),
        }
    }

    /// Append text drawn at `size`.
    pub fn push_str(&mut self, text: &str, size: Option<f32>) {
        self.glyphs
            .extend(text.chars().map(|ch| Glyph::new(ch, size)));
    }

    /// Raw concatenated text.
    pub fn text(&self) -> String {
        self.glyphs.iter().map(|g| g.ch).collect()
    }

    /// Size of the first glyph that has one, scanning in order.
    pub fn first_size(&self) -> Option<f32> {
        self.glyphs.iter().find_map(Glyph::usable_size)
    }
}

/// An image node.
#[derive(Debug, Clone)]
pub struct ImageRun {
    pub payload: ImagePayload,
}

impl ImageRun {
    /// Raw encoded bytes with an optional format hint.
    pub fn encoded(bytes: Vec<u8>, format: Option<ImageFormat>) -> Self {
        Self {
            payload: ImagePayload::Encoded { bytes, format },
        }
    }

    pub fn bitmap(image: DynamicImage) -> Self {
        Self {
            payload: ImagePayload::Bitmap(image),
        }
    }

    pub fn unreadable(reason: impl Into<String>) -> Self {
        Self {
            payload: ImagePayload::Unreadable(reason.into()),
        }
    }
}

/// Pixel data of an [`ImageRun`] as the layout engine delivered it.
#[derive(Debug, Clone)]
pub enum ImagePayload {
    /// Encoded bytes (PNG, JPEG, …) still to be decoded.
    Encoded {
        bytes: Vec<u8>,
        format: Option<ImageFormat>,
    },
    /// Pixels the layout engine already decoded.
    Bitmap(DynamicImage),
    /// The layout engine could not extract pixels; carries its reason.
    Unreadable(String),
}

/// A transparent grouping of child nodes.
#[derive(Debug, Clone, Default)]
pub struct GroupRun {
    pub children: Vec<LayoutNode>,
}

impl GroupRun {
    pub fn new(children: Vec<LayoutNode>) -> Self {
        Self { children }
    }
}

/// Anything that can lay out a document page by page.
///
/// [`pdfium::PdfiumLayoutSource`] is the production implementation;
/// [`MemoryLayout`] serves callers that bring their own layout analysis.
pub trait LayoutSource {
    /// Document-level metadata.
    fn metadata(&self) -> DocumentMetadata;

    /// Number of pages in the document.
    fn page_count(&self) -> usize;

    /// Lay out one page (0-indexed) into root nodes in reading order.
    fn page_layout(&mut self, index: usize) -> Result<Vec<LayoutNode>, Pdf2HtmlError>;
}

/// An in-memory layout: pages of nodes prepared elsewhere.
#[derive(Debug, Clone, Default)]
pub struct MemoryLayout {
    pages: Vec<Vec<LayoutNode>>,
    metadata: DocumentMetadata,
}

impl MemoryLayout {
    pub fn new(pages: Vec<Vec<LayoutNode>>) -> Self {
        let metadata = DocumentMetadata {
            page_count: pages.len(),
            ..DocumentMetadata::default()
        };
        Self { pages, metadata }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.metadata.title = Some(title.into());
        self
    }
}

impl LayoutSource for MemoryLayout {
    fn metadata(&self) -> DocumentMetadata {
        self.metadata.clone()
    }

    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn page_layout(&mut self, index: usize) -> Result<Vec<LayoutNode>, Pdf2HtmlError> {
        self.pages
            .get(index)
            .cloned()
            .ok_or(Pdf2HtmlError::PageOutOfRange {
                page: index + 1,
                total: self.pages.len(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_size_skips_missing_and_invalid() {
        let mut run = TextRun::without_sizes(" \n");
        run.glyphs.push(Glyph::new('x', Some(0.0)));
        run.glyphs.push(Glyph::new('y', Some(f32::NAN)));
        run.push_str("ab", Some(11.5));
        run.push_str("c", Some(20.0));
        assert_eq!(run.first_size(), Some(11.5));
        assert_eq!(run.text(), " \nxyabc");
    }

    #[test]
    fn first_size_none_without_sizes() {
        assert_eq!(TextRun::without_sizes("hello").first_size(), None);
    }

    #[test]
    fn memory_layout_pages() {
        let mut layout = MemoryLayout::new(vec![
            vec![LayoutNode::Text(TextRun::uniform("a", 10.0))],
            vec![],
        ])
        .with_title("Doc");
        assert_eq!(layout.page_count(), 2);
        assert_eq!(layout.metadata().page_count, 2);
        assert_eq!(layout.metadata().title.as_deref(), Some("Doc"));
        assert_eq!(layout.page_layout(0).unwrap().len(), 1);
        assert!(matches!(
            layout.page_layout(5),
            Err(Pdf2HtmlError::PageOutOfRange { page: 6, total: 2 })
        ));
    }
}
