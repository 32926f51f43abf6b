//! Image encoding: `PageImage` → base64 PNG text.
//!
//! Every provider accepts images as base64 embedded in the JSON request body;
//! only the envelope differs. PNG is lossless, so small print in ingredient
//! lists survives the round trip intact.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::DynamicImage;
use std::io::Cursor;
use tracing::debug;

/// Media type of every [`EncodedImage`].
pub const PNG_MEDIA_TYPE: &str = "image/png";

/// One rasterised PDF page.
#[derive(Debug, Clone)]
pub struct PageImage {
    /// 1-indexed page number within the source document.
    pub page_num: usize,
    /// Resolution the page was rendered at.
    pub dpi: u32,
    pub image: DynamicImage,
}

impl PageImage {
    pub fn new(page_num: usize, dpi: u32, image: DynamicImage) -> Self {
        Self {
            page_num,
            dpi,
            image,
        }
    }
}

/// Base64 text of one page re-encoded as PNG.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    data: String,
}

impl EncodedImage {
    /// The bare base64 payload (no `data:` prefix).
    pub fn base64(&self) -> &str {
        &self.data
    }

    pub fn media_type(&self) -> &'static str {
        PNG_MEDIA_TYPE
    }

    /// `data:image/png;base64,…` form used by OpenAI-style `image_url` parts.
    pub fn data_uri(&self) -> String {
        format!("data:{};base64,{}", PNG_MEDIA_TYPE, self.data)
    }
}

/// Encode a rasterised page as base64 PNG ready for a provider request.
pub fn encode_page(page: &PageImage) -> Result<EncodedImage, image::ImageError> {
    let mut buf = Vec::new();
    page.image
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)?;

    let data = STANDARD.encode(&buf);
    debug!("Encoded page {} → {} bytes base64", page.page_num, data.len());

    Ok(EncodedImage { data })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    fn red_page() -> PageImage {
        PageImage::new(
            1,
            150,
            DynamicImage::ImageRgba8(RgbaImage::from_pixel(10, 10, Rgba([255, 0, 0, 255]))),
        )
    }

    #[test]
    fn encode_small_image() {
        let data = encode_page(&red_page()).expect("encode should succeed");
        assert_eq!(data.media_type(), "image/png");
        let decoded = STANDARD.decode(data.base64()).expect("valid base64");
        // PNG signature
        assert_eq!(&decoded[..8], b"\x89PNG\r\n\x1a\n");
    }

    #[test]
    fn decoded_png_matches_source_pixels() {
        let data = encode_page(&red_page()).unwrap();
        let bytes = STANDARD.decode(data.base64()).unwrap();
        let img = image::load_from_memory(&bytes).unwrap().to_rgba8();
        assert_eq!(img.dimensions(), (10, 10));
        assert_eq!(img.get_pixel(3, 7), &Rgba([255, 0, 0, 255]));
    }

    #[test]
    fn data_uri_prefix() {
        let data = encode_page(&red_page()).unwrap();
        let uri = data.data_uri();
        assert!(uri.starts_with("data:image/png;base64,"));
        assert!(uri.ends_with(data.base64()));
    }
}
