//! Layout walker: flatten each page's node tree into document elements.
//!
//! Groups are transparent: their children are visited in order and land in
//! the group's position. Text boxes are cleaned and trimmed; empty ones
//! vanish without a trace. Images are decoded and re-encoded; a failure
//! drops that image only and is recorded as a [`NodeWarning`].
//!
//! All state lives in the [`LayoutWalker`] created for one conversion, so
//! nothing survives between runs.

use super::clean::clean_text;
use super::encode::{inline_payload, InlineImage};
use crate::config::UnsizedTextPolicy;
use crate::error::NodeWarning;
use crate::layout::{ImageRun, LayoutNode, TextRun};
use tracing::{debug, warn};

/// Characters of text shown in per-node diagnostics.
pub const PREVIEW_CHARS: usize = 30;

/// One element of the emitted document.
#[derive(Debug, Clone, PartialEq)]
pub enum Element {
    /// A text box. `font_size` is `None` only for unsized text kept under
    /// [`UnsizedTextPolicy::Unscaled`].
    Paragraph { text: String, font_size: Option<f32> },
    /// An inlined PNG.
    Image(InlineImage),
}

/// What a single page contributed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageSummary {
    pub elements: usize,
    pub warnings: Vec<NodeWarning>,
}

/// Everything collected over the whole document.
#[derive(Debug, Clone, Default)]
pub struct WalkResult {
    pub elements: Vec<Element>,
    pub warnings: Vec<NodeWarning>,
    pub skipped_images: usize,
    pub unsized_text: usize,
}

/// Accumulates elements across the pages of one conversion.
#[derive(Debug)]
pub struct LayoutWalker {
    policy: UnsizedTextPolicy,
    result: WalkResult,
}

impl LayoutWalker {
    pub fn new(policy: UnsizedTextPolicy) -> Self {
        Self {
            policy,
            result: WalkResult::default(),
        }
    }

    /// Walk one page's root nodes (`page_num` is 1-indexed).
    pub fn walk_page(&mut self, page_num: usize, nodes: &[LayoutNode]) -> PageSummary {
        let elements_before = self.result.elements.len();
        let warnings_before = self.result.warnings.len();

        for node in nodes {
            self.visit(page_num, node);
        }

        PageSummary {
            elements: self.result.elements.len() - elements_before,
            warnings: self.result.warnings[warnings_before..].to_vec(),
        }
    }

    pub fn finish(self) -> WalkResult {
        self.result
    }

    fn visit(&mut self, page_num: usize, node: &LayoutNode) {
        match node {
            LayoutNode::Text(run) => self.visit_text(page_num, run),
            LayoutNode::Image(run) => self.visit_image(page_num, run),
            LayoutNode::Group(group) => {
                for child in &group.children {
                    self.visit(page_num, child);
                }
            }
        }
    }

    fn visit_text(&mut self, page_num: usize, run: &TextRun) {
        let text = clean_text(&run.text());
        if text.is_empty() {
            return;
        }

        match run.first_size() {
            Some(size) => {
                debug!(page = page_num, "text {:?} size {:.2}", preview(&text), size);
                self.result.elements.push(Element::Paragraph {
                    text,
                    font_size: Some(size),
                });
            }
            None => {
                let preview = preview(&text);
                warn!(page = page_num, "text {:?} size not detected", preview);
                self.result.unsized_text += 1;
                self.result
                    .warnings
                    .push(NodeWarning::FontSizeMissing { page: page_num, preview });
                if self.policy == UnsizedTextPolicy::Unscaled {
                    self.result.elements.push(Element::Paragraph {
                        text,
                        font_size: None,
                    });
                }
            }
        }
    }

    fn visit_image(&mut self, page_num: usize, run: &ImageRun) {
        match inline_payload(&run.payload) {
            Ok(image) => {
                debug!(page = page_num, "image {}x{}", image.width, image.height);
                self.result.elements.push(Element::Image(image));
            }
            Err(detail) => {
                warn!(page = page_num, "image skipped: {}", detail);
                self.result.skipped_images += 1;
                self.result
                    .warnings
                    .push(NodeWarning::ImageSkipped { page: page_num, detail });
            }
        }
    }
}

/// First [`PREVIEW_CHARS`] characters of `text`.
pub fn preview(text: &str) -> String {
    text.chars().take(PREVIEW_CHARS).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{GroupRun, ImageRun};
    use image::{DynamicImage, RgbaImage};

    fn text(s: &str, size: f32) -> LayoutNode {
        LayoutNode::Text(TextRun::uniform(s, size))
    }

    fn paragraphs(result: &WalkResult) -> Vec<(&str, Option<f32>)> {
        result
            .elements
            .iter()
            .filter_map(|e| match e {
                Element::Paragraph { text, font_size } => Some((text.as_str(), *font_size)),
                Element::Image(_) => None,
            })
            .collect()
    }

    #[test]
    fn groups_are_flattened_in_place() {
        let nodes = vec![
            text("before", 10.0),
            LayoutNode::Group(GroupRun::new(vec![
                text("inner one", 9.0),
                LayoutNode::Group(GroupRun::new(vec![text("deep", 8.0)])),
            ])),
            text("after", 10.0),
        ];
        let mut walker = LayoutWalker::new(UnsizedTextPolicy::Drop);
        let summary = walker.walk_page(1, &nodes);
        assert_eq!(summary.elements, 4);
        let result = walker.finish();
        assert_eq!(
            paragraphs(&result),
            vec![
                ("before", Some(10.0)),
                ("inner one", Some(9.0)),
                ("deep", Some(8.0)),
                ("after", Some(10.0)),
            ]
        );
    }

    #[test]
    fn whitespace_text_is_dropped_silently() {
        let mut walker = LayoutWalker::new(UnsizedTextPolicy::Drop);
        walker.walk_page(1, &[text("   \n\t", 12.0)]);
        let result = walker.finish();
        assert!(result.elements.is_empty());
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn text_is_trimmed() {
        let mut walker = LayoutWalker::new(UnsizedTextPolicy::Drop);
        walker.walk_page(1, &[text("  padded \n", 12.0)]);
        assert_eq!(paragraphs(&walker.finish()), vec![("padded", Some(12.0))]);
    }

    #[test]
    fn first_sized_glyph_wins() {
        let mut run = TextRun::without_sizes("  ");
        run.push_str("Big", Some(18.0));
        run.push_str(" small", Some(9.0));
        let mut walker = LayoutWalker::new(UnsizedTextPolicy::Drop);
        walker.walk_page(1, &[LayoutNode::Text(run)]);
        assert_eq!(paragraphs(&walker.finish()), vec![("Big small", Some(18.0))]);
    }

    #[test]
    fn unsized_text_dropped_by_default() {
        let mut walker = LayoutWalker::new(UnsizedTextPolicy::Drop);
        let summary = walker.walk_page(
            3,
            &[LayoutNode::Text(TextRun::without_sizes("no size here"))],
        );
        assert_eq!(summary.elements, 0);
        assert_eq!(
            summary.warnings,
            vec![NodeWarning::FontSizeMissing {
                page: 3,
                preview: "no size here".into()
            }]
        );
        let result = walker.finish();
        assert!(result.elements.is_empty());
        assert_eq!(result.unsized_text, 1);
    }

    #[test]
    fn unsized_text_kept_when_unscaled() {
        let mut walker = LayoutWalker::new(UnsizedTextPolicy::Unscaled);
        walker.walk_page(1, &[LayoutNode::Text(TextRun::without_sizes("plain"))]);
        let result = walker.finish();
        assert_eq!(paragraphs(&result), vec![("plain", None)]);
        assert_eq!(result.warnings.len(), 1);
    }

    #[test]
    fn preview_is_truncated_to_thirty_chars() {
        let long = "é".repeat(50);
        assert_eq!(preview(&long).chars().count(), PREVIEW_CHARS);
        let mut walker = LayoutWalker::new(UnsizedTextPolicy::Drop);
        let summary =
            walker.walk_page(1, &[LayoutNode::Text(TextRun::without_sizes(&long))]);
        match &summary.warnings[0] {
            NodeWarning::FontSizeMissing { preview, .. } => {
                assert_eq!(preview.chars().count(), 30)
            }
            other => panic!("unexpected warning {other:?}"),
        }
    }

    #[test]
    fn corrupt_image_is_contained() {
        let nodes = vec![
            text("one", 12.0),
            LayoutNode::Image(ImageRun::encoded(b"garbage".to_vec(), None)),
            text("two", 12.0),
        ];
        let mut walker = LayoutWalker::new(UnsizedTextPolicy::Drop);
        let summary = walker.walk_page(2, &nodes);
        assert_eq!(summary.elements, 2);
        assert!(matches!(
            summary.warnings.as_slice(),
            [NodeWarning::ImageSkipped { page: 2, .. }]
        ));
        let result = walker.finish();
        assert_eq!(result.skipped_images, 1);
        assert_eq!(
            paragraphs(&result),
            vec![("one", Some(12.0)), ("two", Some(12.0))]
        );
    }

    #[test]
    fn decoded_bitmap_becomes_image_element() {
        let img = DynamicImage::ImageRgba8(RgbaImage::new(3, 2));
        let mut walker = LayoutWalker::new(UnsizedTextPolicy::Drop);
        walker.walk_page(1, &[LayoutNode::Image(ImageRun::bitmap(img))]);
        match walker.finish().elements.as_slice() {
            [Element::Image(inline)] => assert_eq!((inline.width, inline.height), (3, 2)),
            other => panic!("unexpected elements {other:?}"),
        }
    }
}
