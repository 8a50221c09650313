//! Text-box assembly: merge positioned text fragments into paragraphs.
//!
//! PDF content streams draw text in small pieces (a line, a word, sometimes
//! a single glyph). Fragments are merged into one text box while they
//! continue the current line or start the line directly below it. A
//! vertical gap larger than `line_margin` × line height, or a jump back up
//! the page, closes the box.
//!
//! Coordinates are PDF user space: y grows upwards, so the next line of a
//! paragraph has a *smaller* `top` than the current line's `bottom`.
//!
//! On one line, a space separates two fragments only when the horizontal
//! gap between them exceeds a fifth of the average character width. pdfium
//! splits words at font changes and kerning breaks, and those pieces touch.

use super::TextRun;

/// Fraction of the average character width above which a gap is a space.
const SPACE_GAP_RATIO: f32 = 0.2;

/// A piece of text with its bounding box on the page.
#[derive(Debug, Clone, PartialEq)]
pub struct TextFragment {
    pub text: String,
    pub size: Option<f32>,
    pub left: f32,
    pub bottom: f32,
    pub right: f32,
    pub top: f32,
}

impl TextFragment {
    pub fn new(
        text: impl Into<String>,
        size: Option<f32>,
        left: f32,
        bottom: f32,
        right: f32,
        top: f32,
    ) -> Self {
        Self {
            text: text.into(),
            size,
            left: left.min(right),
            bottom: bottom.min(top),
            right: right.max(left),
            top: top.max(bottom),
        }
    }

    fn height(&self) -> f32 {
        self.top - self.bottom
    }

    /// Average glyph advance; half the font size when the box has no width.
    fn char_width(&self) -> f32 {
        let count = self.text.chars().count();
        let width = self.right - self.left;
        if count > 0 && width > 0.0 {
            width / count as f32
        } else {
            self.size.unwrap_or_else(|| self.height()) * 0.5
        }
    }
}

#[derive(Debug)]
struct OpenBox {
    run: TextRun,
    line_bottom: f32,
    line_top: f32,
    /// Right edge of the last fragment on the current line.
    line_right: f32,
}

/// Streaming assembler: feed fragments in drawing order, collect boxes.
#[derive(Debug)]
pub struct TextBoxAssembler {
    line_margin: f32,
    open: Option<OpenBox>,
}

impl TextBoxAssembler {
    pub fn new(line_margin: f32) -> Self {
        Self {
            line_margin,
            open: None,
        }
    }

    /// Add a fragment. Returns the previous box when this fragment does not
    /// belong to it.
    pub fn push(&mut self, fragment: TextFragment) -> Option<TextRun> {
        if fragment.text.is_empty() {
            return None;
        }

        let Some(open) = self.open.as_mut() else {
            self.open = Some(Self::start(fragment));
            return None;
        };

        let line_height = (open.line_top - open.line_bottom)
            .max(fragment.height())
            .max(f32::EPSILON);
        let line_centre = (open.line_top + open.line_bottom) / 2.0;
        let fragment_centre = (fragment.top + fragment.bottom) / 2.0;

        if (line_centre - fragment_centre).abs() < line_height / 2.0 {
            let gap = fragment.left - open.line_right;
            if gap > SPACE_GAP_RATIO * fragment.char_width()
                && needs_space(&open.run, &fragment.text)
            {
                open.run.push_str(" ", None);
            }
            open.run.push_str(&fragment.text, fragment.size);
            open.line_bottom = open.line_bottom.min(fragment.bottom);
            open.line_top = open.line_top.max(fragment.top);
            open.line_right = open.line_right.max(fragment.right);
            return None;
        }

        let gap = open.line_bottom - fragment.top;
        if fragment_centre < line_centre && gap <= self.line_margin * line_height {
            open.run.push_str("\n", None);
            open.run.push_str(&fragment.text, fragment.size);
            open.line_bottom = fragment.bottom;
            open.line_top = fragment.top;
            open.line_right = fragment.right;
            return None;
        }

        let finished = self.open.replace(Self::start(fragment));
        finished.map(|b| b.run)
    }

    /// Close the current box, if any.
    pub fn flush(&mut self) -> Option<TextRun> {
        self.open.take().map(|b| b.run)
    }

    fn start(fragment: TextFragment) -> OpenBox {
        let mut run = TextRun::default();
        run.push_str(&fragment.text, fragment.size);
        OpenBox {
            run,
            line_bottom: fragment.bottom,
            line_top: fragment.top,
            line_right: fragment.right,
        }
    }
}

fn needs_space(run: &TextRun, next: &str) -> bool {
    let ends_blank = run.glyphs.last().is_none_or(|g| g.ch.is_whitespace());
    let starts_blank = next.chars().next().is_none_or(char::is_whitespace);
    !ends_blank && !starts_blank
}
