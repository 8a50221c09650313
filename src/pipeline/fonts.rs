//! Font normalisation: pick the document's body-text size.
//!
//! Every sized paragraph adds its character count to the bucket of its font
//! size. The heaviest bucket is the baseline the reader scales against, so a
//! few long paragraphs outweigh many short headings or captions.
//!
//! Buckets are keyed by the size rounded to 0.01 pt, the precision written
//! to `data-original-size`. Among equally heavy buckets the smaller size
//! wins, which keeps the choice independent of page order.

use super::walker::Element;
use std::collections::BTreeMap;

/// Character-weighted frequency table of font sizes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FontHistogram {
    /// Size in hundredths of a point → accumulated characters.
    buckets: BTreeMap<u32, usize>,
    total: usize,
}

impl FontHistogram {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from the sized paragraphs of a walked document.
    pub fn from_elements(elements: &[Element]) -> Self {
        let mut histogram = Self::new();
        for element in elements {
            if let Element::Paragraph {
                text,
                font_size: Some(size),
            } = element
            {
                histogram.add(text, *size);
            }
        }
        histogram
    }

    /// Add `text` drawn at `size` points, weighted by its character count.
    pub fn add(&mut self, text: &str, size: f32) {
        let weight = text.chars().count();
        *self.buckets.entry(bucket_key(size)).or_insert(0) += weight;
        self.total += weight;
    }

    /// Total characters accumulated.
    pub fn total(&self) -> usize {
        self.total
    }

    /// The size with the largest accumulated weight; the smaller size on ties.
    /// `None` when nothing has been added.
    pub fn baseline(&self) -> Option<f32> {
        let mut best: Option<(u32, usize)> = None;
        // Ascending keys + strict comparison keeps the smallest size on ties.
        for (&key, &weight) in &self.buckets {
            if best.is_none_or(|(_, w)| weight > w) {
                best = Some((key, weight));
            }
        }
        best.map(|(key, _)| key as f32 / 100.0)
    }
}

fn bucket_key(size: f32) -> u32 {
    (size * 100.0).round().max(0.0) as u32
}

/// `size` at two decimals, rounded exactly like the histogram buckets.
///
/// Both `data-original-size` and the baseline go through [`bucket_key`], so
/// text in the baseline bucket always renders at the selected size.
pub fn format_size(size: f32) -> String {
    let key = bucket_key(size);
    format!("{}.{:02}", key / 100, key % 100)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_has_no_baseline() {
        assert_eq!(FontHistogram::new().baseline(), None);
    }

    #[test]
    fn character_weight_beats_occurrence_count() {
        let mut h = FontHistogram::new();
        // Ten short headings at 18pt …
        for _ in 0..10 {
            h.add("Heading", 18.0);
        }
        // … lose against one long paragraph at 11pt.
        h.add(&"x".repeat(500), 11.0);
        assert_eq!(h.baseline(), Some(11.0));
        assert_eq!(h.total(), 570);
    }

    #[test]
    fn total_matches_sum_of_characters() {
        let mut h = FontHistogram::new();
        h.add("héllo", 12.0);
        h.add("abc", 9.0);
        assert_eq!(h.total(), 8);
    }

    #[test]
    fn sizes_bucket_at_hundredths() {
        let mut h = FontHistogram::new();
        h.add("aa", 11.996);
        h.add("bb", 12.004);
        h.add("ccc", 12.5);
        assert_eq!(h.baseline(), Some(12.0));
    }

    #[test]
    fn half_hundredth_sizes_round_like_the_attribute() {
        let mut h = FontHistogram::new();
        h.add("body text", 10.125);
        let baseline = h.baseline().expect("baseline");
        assert_eq!(format_size(10.125), "10.13");
        assert_eq!(format_size(baseline), format_size(10.125));
    }

    #[test]
    fn format_size_pads_hundredths() {
        assert_eq!(format_size(12.0), "12.00");
        assert_eq!(format_size(9.5), "9.50");
        assert_eq!(format_size(10.456), "10.46");
        assert_eq!(format_size(7.04), "7.04");
    }

    #[test]
    fn ties_pick_smaller_size() {
        let mut h = FontHistogram::new();
        h.add("abcd", 14.0);
        h.add("wxyz", 10.0);
        assert_eq!(h.baseline(), Some(10.0));

        let mut reversed = FontHistogram::new();
        reversed.add("wxyz", 10.0);
        reversed.add("abcd", 14.0);
        assert_eq!(reversed.baseline(), Some(10.0));
    }

    #[test]
    fn from_elements_ignores_unsized_and_images() {
        let elements = vec![
            Element::Paragraph {
                text: "sized".into(),
                font_size: Some(9.5),
            },
            Element::Paragraph {
                text: "unsized text that is long".into(),
                font_size: None,
            },
        ];
        let h = FontHistogram::from_elements(&elements);
        assert_eq!(h.total(), 5);
        assert_eq!(h.baseline(), Some(9.5));
    }
}
