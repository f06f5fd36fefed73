// ABOUTME: Display hints passed alongside an image payload
// ABOUTME: Optional label, size overrides, aspect flag and the pixels-per-row ratio

use crate::constants::defaults;
use std::num::NonZeroU32;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayHints {
    /// Label shown by the terminal; any bytes, sent base64-encoded
    pub filename: Option<Vec<u8>>,
    /// Width in terminal columns
    pub width: Option<u32>,
    /// Height in terminal rows; estimated from the image when unset
    pub height: Option<u32>,
    pub preserve_aspect_ratio: bool,
    /// Only used when `height` is unset
    pub pixels_per_row: NonZeroU32,
}

impl Default for DisplayHints {
    fn default() -> Self {
        Self {
            filename: None,
            width: None,
            height: None,
            preserve_aspect_ratio: true,
            pixels_per_row: default_pixels_per_row(),
        }
    }
}

impl DisplayHints {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_filename(mut self, filename: impl Into<Vec<u8>>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    pub fn with_width(mut self, columns: u32) -> Self {
        self.width = Some(columns);
        self
    }

    pub fn with_height(mut self, rows: u32) -> Self {
        self.height = Some(rows);
        self
    }

    pub fn with_preserve_aspect_ratio(mut self, preserve: bool) -> Self {
        self.preserve_aspect_ratio = preserve;
        self
    }

    pub fn with_pixels_per_row(mut self, pixels: NonZeroU32) -> Self {
        self.pixels_per_row = pixels;
        self
    }

    /// Filename to transmit; an empty label is treated as absent
    pub fn label(&self) -> Option<&[u8]> {
        self.filename.as_deref().filter(|name| !name.is_empty())
    }

    /// Width to transmit; zero columns is treated as absent
    pub fn columns(&self) -> Option<u32> {
        self.width.filter(|columns| *columns > 0)
    }
}

pub fn default_pixels_per_row() -> NonZeroU32 {
    NonZeroU32::new(defaults::PIXELS_PER_ROW).unwrap_or(NonZeroU32::MIN)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let hints = DisplayHints::default();
        assert!(hints.filename.is_none());
        assert!(hints.width.is_none());
        assert!(hints.height.is_none());
        assert!(hints.preserve_aspect_ratio);
        assert_eq!(hints.pixels_per_row.get(), 24);
    }

    #[test]
    fn test_builder() {
        let hints = DisplayHints::new()
            .with_filename("plot.png")
            .with_width(80)
            .with_height(12)
            .with_preserve_aspect_ratio(false)
            .with_pixels_per_row(NonZeroU32::new(16).unwrap());

        assert_eq!(hints.label(), Some(&b"plot.png"[..]));
        assert_eq!(hints.columns(), Some(80));
        assert_eq!(hints.height, Some(12));
        assert!(!hints.preserve_aspect_ratio);
        assert_eq!(hints.pixels_per_row.get(), 16);
    }

    #[test]
    fn test_empty_values_are_absent() {
        let hints = DisplayHints::new().with_filename(Vec::new()).with_width(0);
        assert_eq!(hints.label(), None);
        assert_eq!(hints.columns(), None);
    }

    #[test]
    fn test_non_utf8_filename() {
        let hints = DisplayHints::new().with_filename(vec![0xFF, 0xFE, b'a']);
        assert_eq!(hints.label(), Some(&[0xFF, 0xFE, b'a'][..]));
    }
}
