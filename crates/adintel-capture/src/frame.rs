//! Decoded still images

use image::ImageFormat;

use crate::error::CaptureError;

/// A captured still: the encoded bytes plus what decoding revealed about them
#[derive(Debug, Clone, PartialEq)]
pub struct CapturedImage {
    bytes: Vec<u8>,
    format: ImageFormat,
    width: u32,
    height: u32,
}

impl CapturedImage {
    /// Decode encoded image data, rejecting anything that is not an image
    pub fn decode(bytes: Vec<u8>) -> Result<Self, CaptureError> {
        let format = image::guess_format(&bytes)?;
        let decoded = image::load_from_memory_with_format(&bytes, format)?;

        Ok(Self {
            width: decoded.width(),
            height: decoded.height(),
            format,
            bytes,
        })
    }

    /// Synthesize a solid-color PNG frame
    pub fn solid_color(width: u32, height: u32, rgb: [u8; 3]) -> Result<Self, CaptureError> {
        let img = image::RgbImage::from_pixel(width, height, image::Rgb(rgb));
        let mut cursor = std::io::Cursor::new(Vec::new());
        image::DynamicImage::ImageRgb8(img).write_to(&mut cursor, ImageFormat::Png)?;

        Ok(Self {
            bytes: cursor.into_inner(),
            format: ImageFormat::Png,
            width,
            height,
        })
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn format(&self) -> ImageFormat {
        self.format
    }

    pub fn mime_type(&self) -> &'static str {
        self.format.to_mime_type()
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_png() {
        let png = CapturedImage::solid_color(4, 3, [255, 0, 0]).unwrap();
        let image = CapturedImage::decode(png.bytes().to_vec()).unwrap();
        assert_eq!(image.width(), 4);
        assert_eq!(image.height(), 3);
        assert_eq!(image.format(), ImageFormat::Png);
        assert_eq!(image.mime_type(), "image/png");
    }

    #[test]
    fn test_decode_garbage() {
        let result = CapturedImage::decode(b"not an image".to_vec());
        assert!(matches!(result, Err(CaptureError::Decode(_))));
    }
}
