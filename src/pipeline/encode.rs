//! Image encoding: layout bitmap → PNG → base64 `data:` URI.
//!
//! Every image is normalised to PNG regardless of how the PDF stored it, so
//! the emitted document only ever carries one raster format. PNG is lossless,
//! so re-encoding a JPEG adds no further artefacts.

use crate::layout::ImagePayload;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::DynamicImage;
use std::io::Cursor;
use tracing::debug;

/// MIME type of every inlined image.
pub const IMAGE_MIME: &str = "image/png";

/// An image ready to inline into the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineImage {
    pub data_uri: String,
    pub width: u32,
    pub height: u32,
}

/// Decode an image payload into pixels.
///
/// Encoded bytes are decoded with the format hint when one is given and
/// sniffed otherwise. An [`ImagePayload::Unreadable`] payload always fails
/// with the layout engine's reason.
pub fn decode_payload(payload: &ImagePayload) -> Result<DynamicImage, String> {
    match payload {
        ImagePayload::Encoded { bytes, format } => {
            let decoded = match format {
                Some(fmt) => image::load_from_memory_with_format(bytes, *fmt),
                None => image::load_from_memory(bytes),
            };
            decoded.map_err(|e| e.to_string())
        }
        ImagePayload::Bitmap(img) => Ok(img.clone()),
        ImagePayload::Unreadable(reason) => Err(reason.clone()),
    }
}

/// Encode pixels as a base64 PNG data URI.
pub fn encode_image(img: &DynamicImage) -> Result<InlineImage, image::ImageError> {
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)?;

    let b64 = STANDARD.encode(&buf);
    debug!("Encoded image {}x{} → {} bytes base64", img.width(), img.height(), b64.len());

    Ok(InlineImage {
        data_uri: format!("data:{IMAGE_MIME};base64,{b64}"),
        width: img.width(),
        height: img.height(),
    })
}

/// Decode then re-encode; the single fallible step the walker contains.
pub fn inline_payload(payload: &ImagePayload) -> Result<InlineImage, String> {
    let img = decode_payload(payload)?;
    encode_image(&img).map_err(|e| format!("PNG encoding failed: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgba, RgbaImage};

    fn red_square() -> DynamicImage {
        DynamicImage::ImageRgba8(RgbaImage::from_pixel(10, 10, Rgba([255, 0, 0, 255])))
    }

    #[test]
    fn encode_small_image() {
        let inline = encode_image(&red_square()).expect("encode should succeed");
        assert_eq!((inline.width, inline.height), (10, 10));
        let b64 = inline
            .data_uri
            .strip_prefix("data:image/png;base64,")
            .expect("png data uri");
        let decoded = STANDARD.decode(b64).expect("valid base64");
        assert_eq!(&decoded[1..4], b"PNG");
    }

    #[test]
    fn jpeg_is_normalised_to_png() {
        let mut jpeg = Vec::new();
        DynamicImage::ImageRgb8(red_square().to_rgb8())
            .write_to(&mut Cursor::new(&mut jpeg), ImageFormat::Jpeg)
            .unwrap();
        let inline = inline_payload(&ImagePayload::Encoded {
            bytes: jpeg,
            format: Some(ImageFormat::Jpeg),
        })
        .expect("jpeg decodes");
        assert!(inline.data_uri.starts_with("data:image/png;base64,"));
    }

    #[test]
    fn sniffs_format_without_hint() {
        let mut png = Vec::new();
        red_square()
            .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
            .unwrap();
        let img = decode_payload(&ImagePayload::Encoded {
            bytes: png,
            format: None,
        })
        .expect("png sniffed");
        assert_eq!(img.width(), 10);
    }

    #[test]
    fn corrupt_bytes_fail() {
        let err = decode_payload(&ImagePayload::Encoded {
            bytes: b"definitely not an image".to_vec(),
            format: None,
        });
        assert!(err.is_err());
    }

    #[test]
    fn unreadable_payload_reports_reason() {
        let err = inline_payload(&ImagePayload::Unreadable("no bitmap".into())).unwrap_err();
        assert_eq!(err, "no bitmap");
    }
}
