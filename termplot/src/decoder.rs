// ABOUTME: Optional image decoding capability used when header sniffing fails
// ABOUTME: Resolved once at startup and injected into the sniffer, never probed per call

use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
#[error("{message}")]
pub struct DecodeError {
    message: String,
}

impl DecodeError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Reads pixel dimensions from an encoded image of any format it understands.
pub trait ImageDecoder: Send + Sync {
    /// Short name used in diagnostics
    fn name(&self) -> &'static str;

    /// Pixel (width, height) of the encoded image in `buf`
    fn dimensions(&self, buf: &[u8]) -> Result<(u32, u32), DecodeError>;
}

/// Decoder backed by the `image` crate.
///
/// Only the container headers are read, the pixels are never decoded.
#[cfg(feature = "decoder")]
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageCrateDecoder;

#[cfg(feature = "decoder")]
impl ImageDecoder for ImageCrateDecoder {
    fn name(&self) -> &'static str {
        "image"
    }

    fn dimensions(&self, buf: &[u8]) -> Result<(u32, u32), DecodeError> {
        let reader = image::ImageReader::new(std::io::Cursor::new(buf))
            .with_guessed_format()
            .map_err(|e| DecodeError::new(format!("Failed to create image reader: {}", e)))?;

        if reader.format().is_none() {
            return Err(DecodeError::new("Could not determine image format"));
        }

        reader
            .into_dimensions()
            .map_err(|e| DecodeError::new(format!("Failed to read image dimensions: {}", e)))
    }
}

/// The decoder compiled into this build, if any
pub fn default_decoder() -> Option<Arc<dyn ImageDecoder>> {
    #[cfg(feature = "decoder")]
    {
        Some(Arc::new(ImageCrateDecoder))
    }

    #[cfg(not(feature = "decoder"))]
    {
        None
    }
}

#[cfg(all(test, feature = "decoder"))]
mod tests {
    use super::*;
    use image::{DynamicImage, ImageFormat};
    use std::io::Cursor;

    fn encoded(width: u32, height: u32, format: ImageFormat) -> Vec<u8> {
        let mut buffer = Vec::new();
        DynamicImage::new_rgb8(width, height)
            .write_to(&mut Cursor::new(&mut buffer), format)
            .unwrap();
        buffer
    }

    #[test]
    fn test_reads_bmp_dimensions() {
        let decoder = ImageCrateDecoder;
        let bmp = encoded(7, 3, ImageFormat::Bmp);
        assert_eq!(decoder.dimensions(&bmp).unwrap(), (7, 3));
    }

    #[test]
    fn test_reads_jpeg_dimensions() {
        let decoder = ImageCrateDecoder;
        let jpeg = encoded(16, 9, ImageFormat::Jpeg);
        assert_eq!(decoder.dimensions(&jpeg).unwrap(), (16, 9));
    }

    #[test]
    fn test_rejects_non_image() {
        let decoder = ImageCrateDecoder;
        let err = decoder.dimensions(b"definitely not an image").unwrap_err();
        assert!(err.to_string().contains("Could not determine image format"));
    }

    #[test]
    fn test_default_decoder_present() {
        let decoder = default_decoder().expect("decoder feature is enabled");
        assert_eq!(decoder.name(), "image");
    }
}
