//! pdfium-backed [`LayoutSource`].
//!
//! pdfium exposes a page as a flat list of page objects in drawing order.
//! This module turns that list into the [`LayoutNode`] tree:
//!
//! * text objects → positioned fragments, merged into text boxes by
//!   [`TextBoxAssembler`]
//! * image objects → [`ImageRun`] holding pdfium's decoded bitmap, or the
//!   reason pdfium could not decode it
//! * form XObjects → [`GroupRun`] laid out recursively
//! * paths, shadings and unsupported objects → ignored
//!
//! An open text box is always closed before an image or group is emitted so
//! the node order matches the drawing order.
//!
//! pdfium is not thread-safe and every call blocks; the source is used from
//! the single conversion thread only.

use super::textbox::{TextBoxAssembler, TextFragment};
use super::{GroupRun, ImageRun, LayoutNode, LayoutSource};
use crate::config::LayoutParams;
use crate::error::Pdf2HtmlError;
use crate::output::DocumentMetadata;
use pdfium_render::prelude::*;
use std::path::Path;
use tracing::{debug, info};

/// Bind to the pdfium shared library, downloading it on first use.
pub fn bind_pdfium() -> Result<Pdfium, Pdf2HtmlError> {
    pdfium_auto::bind_pdfium_silent().map_err(|e| Pdf2HtmlError::PdfiumBindingFailed(e.to_string()))
}

/// Open a PDF, mapping pdfium's load errors onto the fatal error taxonomy.
pub fn open_document<'a>(
    pdfium: &'a Pdfium,
    pdf_path: &Path,
    password: Option<&'a str>,
) -> Result<PdfDocument<'a>, Pdf2HtmlError> {
    pdfium.load_pdf_from_file(pdf_path, password).map_err(|e| {
        let err_str = format!("{:?}", e);
        if err_str.contains("Password") || err_str.contains("password") {
            if password.is_some() {
                Pdf2HtmlError::WrongPassword {
                    path: pdf_path.to_path_buf(),
                }
            } else {
                Pdf2HtmlError::PasswordRequired {
                    path: pdf_path.to_path_buf(),
                }
            }
        } else {
            Pdf2HtmlError::CorruptPdf {
                path: pdf_path.to_path_buf(),
                detail: err_str,
            }
        }
    })
}

/// Lays out pages of an open pdfium document.
pub struct PdfiumLayoutSource<'a> {
    document: PdfDocument<'a>,
    params: LayoutParams,
    metadata: DocumentMetadata,
}

impl<'a> PdfiumLayoutSource<'a> {
    pub fn new(document: PdfDocument<'a>, params: LayoutParams) -> Self {
        let metadata = read_metadata(&document);
        info!("PDF loaded: {} pages", metadata.page_count);
        Self {
            document,
            params,
            metadata,
        }
    }
}

impl LayoutSource for PdfiumLayoutSource<'_> {
    fn metadata(&self) -> DocumentMetadata {
        self.metadata.clone()
    }

    fn page_count(&self) -> usize {
        self.metadata.page_count
    }

    fn page_layout(&mut self, index: usize) -> Result<Vec<LayoutNode>, Pdf2HtmlError> {
        let pages = self.document.pages();
        let page = pages
            .get(index as u16)
            .map_err(|e| Pdf2HtmlError::LayoutFailed {
                page: index + 1,
                detail: format!("{:?}", e),
            })?;

        let nodes = layout_objects(page.objects().iter(), self.params.line_margin);
        debug!("Laid out page {} → {} root nodes", index + 1, nodes.len());
        Ok(nodes)
    }
}

/// Turn a sequence of page objects into layout nodes.
fn layout_objects<'b>(
    objects: impl IntoIterator<Item = PdfPageObject<'b>>,
    line_margin: f32,
) -> Vec<LayoutNode> {
    let mut nodes = Vec::new();
    let mut boxes = TextBoxAssembler::new(line_margin);

    for object in objects {
        match &object {
            PdfPageObject::Text(text) => {
                let content = text.text();
                let size = Some(text.scaled_font_size().value);
                match extent(&object) {
                    Some(rect) => {
                        let fragment = TextFragment::new(
                            content,
                            size,
                            rect.left().value,
                            rect.bottom().value,
                            rect.right().value,
                            rect.top().value,
                        );
                        if let Some(run) = boxes.push(fragment) {
                            nodes.push(LayoutNode::Text(run));
                        }
                    }
                    None => {
                        // Unplaceable text becomes a box of its own.
                        if let Some(run) = boxes.flush() {
                            nodes.push(LayoutNode::Text(run));
                        }
                        let mut standalone = TextBoxAssembler::new(line_margin);
                        standalone.push(TextFragment::new(content, size, 0.0, 0.0, 0.0, 0.0));
                        if let Some(run) = standalone.flush() {
                            nodes.push(LayoutNode::Text(run));
                        }
                    }
                }
            }
            PdfPageObject::Image(image) => {
                if let Some(run) = boxes.flush() {
                    nodes.push(LayoutNode::Text(run));
                }
                let run = match image.get_raw_image() {
                    Ok(bitmap) => ImageRun::bitmap(bitmap),
                    Err(e) => ImageRun::unreadable(format!("{:?}", e)),
                };
                nodes.push(LayoutNode::Image(run));
            }
            PdfPageObject::XObjectForm(form) => {
                if let Some(run) = boxes.flush() {
                    nodes.push(LayoutNode::Text(run));
                }
                let children = layout_objects(form.iter(), line_margin);
                nodes.push(LayoutNode::Group(GroupRun::new(children)));
            }
            _ => {}
        }
    }

    if let Some(run) = boxes.flush() {
        nodes.push(LayoutNode::Text(run));
    }
    nodes
}

/// Axis-aligned bounding box of an object in page space.
fn extent(object: &PdfPageObject<'_>) -> Option<PdfRect> {
    object.bounds().ok().map(|quad| quad.to_rect())
}

fn read_metadata(document: &PdfDocument<'_>) -> DocumentMetadata {
    let metadata = document.metadata();

    let get_meta = |tag: PdfDocumentMetadataTagType| -> Option<String> {
        metadata.get(tag).and_then(|t| {
            let v = t.value().trim().to_string();
            if v.is_empty() {
                None
            } else {
                Some(v)
            }
        })
    };

    DocumentMetadata {
        title: get_meta(PdfDocumentMetadataTagType::Title),
        author: get_meta(PdfDocumentMetadataTagType::Author),
        subject: get_meta(PdfDocumentMetadataTagType::Subject),
        creator: get_meta(PdfDocumentMetadataTagType::Creator),
        producer: get_meta(PdfDocumentMetadataTagType::Producer),
        page_count: document.pages().len() as usize,
        pdf_version: format!("{:?}", document.version()),
    }
}
