//! Conversion entry points.
//!
//! Every entry point funnels into [`convert_layout`], which drives one
//! [`LayoutSource`] through the walker, the font normaliser and the emitter.
//! The file-based variants only add opening the PDF with pdfium and, for
//! [`convert_to_file`], the atomic write.

use crate::config::ConversionConfig;
use crate::error::{NodeWarning, Pdf2HtmlError};
use crate::layout::pdfium::{bind_pdfium, open_document, PdfiumLayoutSource};
use crate::layout::LayoutSource;
use crate::output::{ConversionOutput, ConversionStats, DocumentMetadata};
use crate::pipeline::emit::render_html;
use crate::pipeline::fonts::FontHistogram;
use crate::pipeline::input;
use crate::pipeline::walker::{Element, LayoutWalker};
use std::io::Write;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Title used when neither the config, the PDF nor the file name gives one.
pub const DEFAULT_TITLE: &str = "Document";

/// Convert a PDF file to a self-contained HTML document.
///
/// This is the primary entry point for the library.
///
/// # Errors
/// Only fatal conditions are errors: a missing or unreadable file, a PDF
/// pdfium cannot open, an empty page selection, or a document without any
/// sized text (unless [`ConversionConfig::fallback_baseline`] is set).
/// Undecodable images and unsized text are reported in
/// [`ConversionOutput::warnings`] instead.
pub fn convert(
    input: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<ConversionOutput, Pdf2HtmlError> {
    let pdf_path = input::resolve_local(input)?;
    let stem = pdf_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned());
    convert_pdf(&pdf_path, config, stem.as_deref())
}

/// Convert a PDF and write the HTML to `output_path`.
///
/// Uses atomic write (temp file + rename) so a failed run never leaves a
/// partial file behind.
pub fn convert_to_file(
    input: impl AsRef<Path>,
    output_path: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<ConversionStats, Pdf2HtmlError> {
    let output = convert(input, config)?;
    write_atomic(output_path.as_ref(), &output.html)?;
    Ok(output.stats)
}

/// Convert PDF bytes held in memory.
///
/// The bytes are spooled to a managed [`tempfile`] that is removed on
/// return. The document title falls back to [`DEFAULT_TITLE`] rather than
/// the temporary file's name.
///
/// # Example
/// ```rust,no_run
/// use pdf2html::{convert_from_bytes, ConversionConfig};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let bytes: Vec<u8> = std::fs::read("document.pdf")?;
/// let output = convert_from_bytes(&bytes, &ConversionConfig::default())?;
/// std::fs::write("document.html", output.html)?;
/// # Ok(())
/// # }
/// ```
pub fn convert_from_bytes(
    bytes: &[u8],
    config: &ConversionConfig,
) -> Result<ConversionOutput, Pdf2HtmlError> {
    let mut tmp = tempfile::Builder::new()
        .suffix(".pdf")
        .tempfile()
        .map_err(|e| Pdf2HtmlError::Internal(format!("tempfile: {e}")))?;
    tmp.write_all(bytes)
        .and_then(|_| tmp.flush())
        .map_err(|e| Pdf2HtmlError::Internal(format!("tempfile write: {e}")))?;
    let pdf_path = input::resolve_local(tmp.path())?;
    // `tmp` is dropped (and the file deleted) once conversion returns
    convert_pdf(&pdf_path, config, None)
}

/// Read PDF metadata without converting content.
pub fn inspect(input: impl AsRef<Path>) -> Result<DocumentMetadata, Pdf2HtmlError> {
    let pdf_path = input::resolve_local(input)?;
    let pdfium = bind_pdfium()?;
    let document = open_document(&pdfium, &pdf_path, None)?;
    let source = PdfiumLayoutSource::new(document, Default::default());
    Ok(source.metadata())
}

/// Convert an already-opened layout source.
///
/// `fallback_title` is used when neither the config nor the source's
/// metadata carries a title.
pub fn convert_layout(
    source: &mut dyn LayoutSource,
    config: &ConversionConfig,
    fallback_title: Option<&str>,
) -> Result<ConversionOutput, Pdf2HtmlError> {
    let start = Instant::now();
    let metadata = source.metadata();
    let total_pages = source.page_count();

    // ── Step 1: Compute page indices ─────────────────────────────────────
    let page_indices = config.pages.to_indices(total_pages);
    if page_indices.is_empty() {
        return Err(Pdf2HtmlError::PageOutOfRange {
            page: config.pages.first_requested(),
            total: total_pages,
        });
    }
    debug!("Selected {} of {} pages", page_indices.len(), total_pages);

    if let Some(ref cb) = config.progress_callback {
        cb.on_conversion_start(page_indices.len());
    }

    // ── Step 2: Walk the layout page by page ─────────────────────────────
    let mut walker = LayoutWalker::new(config.unsized_text);
    for &index in &page_indices {
        let page_num = index + 1;
        let nodes = source.page_layout(index)?;
        let summary = walker.walk_page(page_num, &nodes);
        debug!(
            "Page {}: {} elements, {} warnings",
            page_num,
            summary.elements,
            summary.warnings.len()
        );

        if let Some(ref cb) = config.progress_callback {
            for warning in &summary.warnings {
                if let NodeWarning::ImageSkipped { detail, .. } = warning {
                    cb.on_image_skipped(page_num, detail);
                }
            }
            cb.on_page_complete(page_num, page_indices.len(), summary.elements);
        }
    }
    let walked = walker.finish();

    // ── Step 3: Pick the baseline ────────────────────────────────────────
    let histogram = FontHistogram::from_elements(&walked.elements);
    let baseline = match (histogram.baseline(), config.fallback_baseline) {
        (Some(size), _) => size,
        (None, Some(fallback)) => {
            warn!(
                "No font size detected in {} page(s); using fallback baseline {:.2}",
                page_indices.len(),
                fallback
            );
            fallback
        }
        (None, None) => {
            return Err(Pdf2HtmlError::NoFontSizeDetected {
                pages: page_indices.len(),
            })
        }
    };
    info!(
        "Baseline font size {:.2}pt from {} characters",
        baseline,
        histogram.total()
    );

    // ── Step 4: Emit ─────────────────────────────────────────────────────
    let title = resolve_title(config, &metadata, fallback_title);
    let html = render_html(&title, &walked.elements, baseline, config.base_font_size)?;

    let paragraphs = walked
        .elements
        .iter()
        .filter(|e| matches!(e, Element::Paragraph { .. }))
        .count();
    let stats = ConversionStats {
        total_pages,
        processed_pages: page_indices.len(),
        paragraphs,
        images: walked.elements.len() - paragraphs,
        skipped_images: walked.skipped_images,
        unsized_text: walked.unsized_text,
        total_characters: histogram.total(),
        duration_ms: start.elapsed().as_millis() as u64,
    };

    info!(
        "Conversion complete: {} pages, {} paragraphs, {} images ({} skipped), {}ms",
        stats.processed_pages,
        stats.paragraphs,
        stats.images,
        stats.skipped_images,
        stats.duration_ms
    );

    if let Some(ref cb) = config.progress_callback {
        cb.on_conversion_complete(page_indices.len(), stats.elements());
    }

    Ok(ConversionOutput {
        html,
        baseline_size: baseline,
        metadata,
        stats,
        warnings: walked.warnings,
    })
}

// ── Internal helpers ─────────────────────────────────────────────────────

fn convert_pdf(
    pdf_path: &Path,
    config: &ConversionConfig,
    fallback_title: Option<&str>,
) -> Result<ConversionOutput, Pdf2HtmlError> {
    info!("Starting conversion: {}", pdf_path.display());
    let pdfium = bind_pdfium()?;
    let document = open_document(&pdfium, pdf_path, config.password.as_deref())?;
    let mut source = PdfiumLayoutSource::new(document, config.layout);
    convert_layout(&mut source, config, fallback_title)
}

/// Config override, then PDF title, then the caller's fallback.
fn resolve_title(
    config: &ConversionConfig,
    metadata: &DocumentMetadata,
    fallback_title: Option<&str>,
) -> String {
    [
        config.title.as_deref(),
        metadata.title.as_deref(),
        fallback_title,
    ]
    .into_iter()
    .flatten()
    .map(str::trim)
    .find(|t| !t.is_empty())
    .unwrap_or(DEFAULT_TITLE)
    .to_string()
}

fn write_atomic(path: &Path, contents: &str) -> Result<(), Pdf2HtmlError> {
    let write_err = |e: std::io::Error| Pdf2HtmlError::OutputWriteFailed {
        path: path.to_path_buf(),
        source: e,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(write_err)?;
    }

    let tmp_path = path.with_extension("html.tmp");
    std::fs::write(&tmp_path, contents).map_err(write_err)?;
    std::fs::rename(&tmp_path, path).map_err(|e| {
        let _ = std::fs::remove_file(&tmp_path);
        write_err(e)
    })?;
    debug!("Wrote {} bytes to {}", contents.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_prefers_config_then_metadata_then_fallback() {
        let mut metadata = DocumentMetadata::default();
        let config = ConversionConfig::default();
        assert_eq!(resolve_title(&config, &metadata, None), DEFAULT_TITLE);
        assert_eq!(resolve_title(&config, &metadata, Some("report")), "report");

        metadata.title = Some("From PDF".into());
        assert_eq!(resolve_title(&config, &metadata, Some("report")), "From PDF");

        let config = ConversionConfig::builder().title("Override").build().unwrap();
        assert_eq!(resolve_title(&config, &metadata, Some("report")), "Override");
    }

    #[test]
    fn blank_titles_are_skipped() {
        let metadata = DocumentMetadata {
            title: Some("   ".into()),
            ..Default::default()
        };
        let config = ConversionConfig::default();
        assert_eq!(resolve_title(&config, &metadata, Some("stem")), "stem");
    }

    #[test]
    fn atomic_write_creates_parents_and_leaves_no_temp() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/out/doc.html");
        write_atomic(&path, "<html></html>").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "<html></html>");
        assert!(!path.with_extension("html.tmp").exists());
    }
}
