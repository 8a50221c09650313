//! Markup emitter: assemble the final HTML document.
//!
//! ```text
//! <html lang="en">
//!   <head>  meta, title, bootstrap css, reader css, web-font links
//!   <body>
//!     <script src=bootstrap>
//!     <div class="container">
//!       <button id="divet">            toggle
//!       <div id="controls" class="row mb-3">  size | mode | font selectors
//!       <p class="pdf-element" data-original-size="12.00">…
//!       <img class="pdf-image" src="data:image/png;base64,…">
//!     <script type="application/json" id="reader-config">
//!     <script>  static reader logic
//! ```
//!
//! Text sizes are attached as data, never as inline style; the reader
//! script applies them relative to the baseline.
//!
//! The tree is an html5ever [`RcDom`]; its serializer handles escaping,
//! void elements and the raw text of `<style>` and `<script>`.

use super::client::{
    ClientConfig, ReadingMode, BOOTSTRAP_CSS, BOOTSTRAP_JS, READER_CSS, READER_SCRIPT, WEB_FONTS,
};
use super::fonts::format_size;
use super::walker::Element;
use crate::error::Pdf2HtmlError;
use html5ever::{
    ns, serialize, serialize::SerializeOpts, serialize::TraversalScope, Attribute, LocalName,
    QualName,
};
use markup5ever_rcdom::{Handle, Node, NodeData, RcDom, SerializableHandle};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// Label of the floating toggle button.
pub const TOGGLE_LABEL: &str = "🕹️";

/// Render the complete document.
///
/// `baseline` is the detected body-text size; `base_font_size` is the size
/// preselected in the reader.
pub fn render_html(
    title: &str,
    elements: &[Element],
    baseline: f32,
    base_font_size: u32,
) -> Result<String, Pdf2HtmlError> {
    let client = ClientConfig::new(baseline, base_font_size);
    let config_json = client
        .to_script_json()
        .map_err(|e| Pdf2HtmlError::Internal(format!("reader config serialisation: {e}")))?;

    let dom = RcDom::default();
    let html = create_element("html", &[("lang", "en")]);
    append(&html, head(title));
    append(&html, body(&client, elements, &config_json));
    append(&dom.document, html);

    let markup = serialize_dom(&dom)?;
    Ok(format!("<!DOCTYPE html>\n{markup}\n"))
}

fn head(title: &str) -> Handle {
    let head = create_element("head", &[]);
    append(&head, create_element("meta", &[("charset", "utf-8")]));
    append(
        &head,
        create_element(
            "meta",
            &[
                ("name", "viewport"),
                ("content", "width=device-width, initial-scale=1"),
            ],
        ),
    );
    append(&head, text_element("title", &[], title));
    append(&head, stylesheet(BOOTSTRAP_CSS));
    append(&head, text_element("style", &[], READER_CSS));
    for (_, url) in WEB_FONTS {
        append(&head, stylesheet(url));
    }
    head
}

fn stylesheet(href: &str) -> Handle {
    create_element("link", &[("rel", "stylesheet"), ("href", href)])
}

fn body(client: &ClientConfig, elements: &[Element], config_json: &str) -> Handle {
    let container = create_element("div", &[("class", "container")]);
    append(
        &container,
        text_element("button", &[("id", "divet"), ("type", "button")], TOGGLE_LABEL),
    );
    append(&container, controls(client));
    for element in elements {
        append(&container, content_element(element));
    }

    let body = create_element("body", &[]);
    append(&body, create_element("script", &[("src", BOOTSTRAP_JS)]));
    append(&body, container);
    append(
        &body,
        text_element(
            "script",
            &[("type", "application/json"), ("id", "reader-config")],
            config_json,
        ),
    );
    append(&body, text_element("script", &[], READER_SCRIPT));
    body
}

fn controls(client: &ClientConfig) -> Handle {
    let sizes = selector("font-size-selector");
    for &size in &client.font_sizes {
        let value = size.to_string();
        let label = format!("{size}px");
        append(&sizes, option(&value, &label, size == client.base_font_size));
    }

    let modes = selector("reading-mode-selector");
    for mode in ReadingMode::ALL {
        append(
            &modes,
            option(mode.value(), mode.label(), mode == client.default_reading_mode),
        );
    }

    let fonts = selector("font-selector");
    for &font in &client.fonts {
        append(&fonts, option(font, font, false));
    }

    let controls = create_element("div", &[("id", "controls"), ("class", "row mb-3")]);
    append(&controls, column("font-size-selector", "Size:", sizes));
    append(&controls, column("reading-mode-selector", "Reading Mode:", modes));
    append(&controls, column("font-selector", "Font:", fonts));
    controls
}

fn selector(id: &str) -> Handle {
    create_element("select", &[("id", id), ("class", "form-control")])
}

fn option(value: &str, label: &str, selected: bool) -> Handle {
    if selected {
        text_element(
            "option",
            &[("value", value), ("selected", "selected")],
            label,
        )
    } else {
        text_element("option", &[("value", value)], label)
    }
}

fn column(target: &str, label: &str, select: Handle) -> Handle {
    let column = create_element("div", &[("class", "col-md-4")]);
    append(&column, text_element("label", &[("for", target)], label));
    append(&column, select);
    column
}

fn content_element(element: &Element) -> Handle {
    match element {
        Element::Paragraph {
            text,
            font_size: Some(size),
        } => {
            let size = format_size(*size);
            text_element(
                "p",
                &[("class", "pdf-element"), ("data-original-size", size.as_str())],
                text,
            )
        }
        Element::Paragraph {
            text,
            font_size: None,
        } => text_element("p", &[("class", "pdf-element")], text),
        Element::Image(image) => {
            let width = image.width.to_string();
            let height = image.height.to_string();
            create_element(
                "img",
                &[
                    ("class", "pdf-image"),
                    ("src", image.data_uri.as_str()),
                    ("width", width.as_str()),
                    ("height", height.as_str()),
                    ("alt", ""),
                ],
            )
        }
    }
}

// ── DOM helpers ──────────────────────────────────────────────────────────

/// Create an HTML element with attributes in the given order.
fn create_element(tag: &str, attrs: &[(&str, &str)]) -> Handle {
    let attributes = attrs
        .iter()
        .map(|&(name, value)| Attribute {
            name: QualName::new(None, ns!(), LocalName::from(name)),
            value: value.into(),
        })
        .collect();

    Rc::new(Node {
        parent: Cell::new(None),
        children: RefCell::new(Vec::new()),
        data: NodeData::Element {
            name: QualName::new(None, ns!(html), LocalName::from(tag)),
            attrs: RefCell::new(attributes),
            template_contents: Default::default(),
            mathml_annotation_xml_integration_point: false,
        },
    })
}

fn create_text(text: &str) -> Handle {
    Rc::new(Node {
        parent: Cell::new(None),
        children: RefCell::new(Vec::new()),
        data: NodeData::Text {
            contents: RefCell::new(text.into()),
        },
    })
}

/// An element holding a single text node.
fn text_element(tag: &str, attrs: &[(&str, &str)], text: &str) -> Handle {
    let element = create_element(tag, attrs);
    append(&element, create_text(text));
    element
}

fn append(parent: &Handle, child: Handle) {
    parent.children.borrow_mut().push(child);
}

/// Serialize the root element of `dom`, itself included.
fn serialize_dom(dom: &RcDom) -> Result<String, Pdf2HtmlError> {
    let root = dom
        .document
        .children
        .borrow()
        .first()
        .cloned()
        .ok_or_else(|| Pdf2HtmlError::Internal("HTML document has no root".into()))?;

    let opts = SerializeOpts {
        traversal_scope: TraversalScope::IncludeNode,
        ..Default::default()
    };
    let mut output = Vec::new();
    serialize(&mut output, &SerializableHandle::from(root), opts)
        .map_err(|e| Pdf2HtmlError::Internal(format!("HTML serialization failed: {e}")))?;

    String::from_utf8(output)
        .map_err(|e| Pdf2HtmlError::Internal(format!("HTML is not UTF-8: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::encode::InlineImage;
    use html5ever::tendril::TendrilSink;

    fn parse(html: &str) -> RcDom {
        html5ever::parse_document(RcDom::default(), Default::default()).one(html)
    }

    /// Values of `attr` on every `tag` element, in document order.
    fn attr_values(handle: &Handle, tag: &str, attr: &str, out: &mut Vec<String>) {
        if let NodeData::Element { name, attrs, .. } = &handle.data {
            if &*name.local == tag {
                for a in attrs.borrow().iter() {
                    if &*a.name.local == attr {
                        out.push(a.value.to_string());
                    }
                }
            }
        }
        for child in handle.children.borrow().iter() {
            attr_values(child, tag, attr, out);
        }
    }

    fn para(text: &str, size: f32) -> Element {
        Element::Paragraph {
            text: text.into(),
            font_size: Some(size),
        }
    }

    #[test]
    fn paragraphs_carry_two_decimal_sizes_in_order() {
        let html = render_html("T", &[para("a", 12.0), para("b", 9.0), para("c", 10.456)], 12.0, 13)
            .unwrap();
        let first = html.find(r#"data-original-size="12.00">a</p>"#).unwrap();
        let second = html.find(r#"data-original-size="9.00">b</p>"#).unwrap();
        let third = html.find(r#"data-original-size="10.46">c</p>"#).unwrap();
        assert!(first < second && second < third);
    }

    #[test]
    fn unsized_paragraph_has_no_size_attribute() {
        let elements = [Element::Paragraph {
            text: "plain".into(),
            font_size: None,
        }];
        let html = render_html("T", &elements, 12.0, 13).unwrap();
        assert!(html.contains(r#"<p class="pdf-element">plain</p>"#));
    }

    #[test]
    fn image_is_inlined_with_dimensions() {
        let elements = [Element::Image(InlineImage {
            data_uri: "data:image/png;base64,AAAA".into(),
            width: 4,
            height: 2,
        })];
        let html = render_html("T", &elements, 12.0, 13).unwrap();
        assert!(html.contains(
            r#"<img class="pdf-image" src="data:image/png;base64,AAAA" width="4" height="2" alt="">"#
        ));
    }

    #[test]
    fn size_selector_covers_range_with_default_selected() {
        let html = render_html("T", &[], 12.0, 13).unwrap();
        assert!(html.contains(r#"<option value="8">8px</option>"#));
        assert!(html.contains(r#"<option value="24">24px</option>"#));
        assert!(html.contains(r#"<option value="13" selected="selected">13px</option>"#));
        assert!(!html.contains(r#"<option value="25">"#));
    }

    #[test]
    fn scaffolding_is_present() {
        let html = render_html("T", &[], 12.0, 16).unwrap();
        assert!(html.starts_with("<!DOCTYPE html>\n<html lang=\"en\">"));
        assert!(html.contains(BOOTSTRAP_CSS));
        assert!(html.contains(BOOTSTRAP_JS));
        assert!(html.contains(r#"<div id="controls" class="row mb-3">"#));
        assert!(html.contains(r#"<option value="sepia">Sepia</option>"#));
        assert!(html.contains(r#"<option value="Bookerly">Bookerly</option>"#));
        assert!(html.contains(r#"<script type="application/json" id="reader-config">{"baseline_size":12.0"#));
        assert!(html.contains(TOGGLE_LABEL));
    }

    #[test]
    fn every_web_font_is_linked() {
        let html = render_html("T", &[], 12.0, 13).unwrap();
        let dom = parse(&html);
        let mut hrefs = Vec::new();
        attr_values(&dom.document, "link", "href", &mut hrefs);
        assert_eq!(hrefs[0], BOOTSTRAP_CSS);
        for (_, url) in WEB_FONTS {
            assert!(hrefs.iter().any(|h| h == url), "missing font link {url}");
        }
        // Ampersands in the query strings are escaped in the markup.
        assert!(html.contains("family=Arial&amp;display=swap"));
    }

    #[test]
    fn emitted_sizes_survive_parsing() {
        let elements = [para("a", 10.125), para("b", 12.0)];
        let html = render_html("T", &elements, 12.0, 13).unwrap();
        let mut sizes = Vec::new();
        attr_values(&parse(&html).document, "p", "data-original-size", &mut sizes);
        assert_eq!(sizes, vec!["10.13", "12.00"]);
    }

    #[test]
    fn script_bodies_are_not_escaped() {
        let html = render_html("T", &[], 12.0, 13).unwrap();
        assert!(html.contains(READER_SCRIPT));
        assert!(html.contains(READER_CSS));
    }

    #[test]
    fn text_and_title_are_escaped() {
        let html = render_html("<A & B>", &[para("x < y </script>", 12.0)], 12.0, 13).unwrap();
        assert!(html.contains("<title>&lt;A &amp; B&gt;</title>"));
        assert!(html.contains("x &lt; y &lt;/script&gt;"));
    }

    #[test]
    fn output_is_deterministic() {
        let elements = [para("same", 11.0)];
        assert_eq!(
            render_html("T", &elements, 11.0, 13).unwrap(),
            render_html("T", &elements, 11.0, 13).unwrap()
        );
    }
}
