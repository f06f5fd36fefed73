// ABOUTME: Header sniffing for image pixel dimensions without decoding the image
// ABOUTME: Reads GIF and PNG headers directly and defers other formats to an ImageDecoder

use crate::constants::signatures;
use crate::decoder::ImageDecoder;
use crate::error::{Degradation, Result, TransportError};
use std::fmt;

/// Containers whose headers are parsed directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerFormat {
    Gif,
    Png,
}

impl fmt::Display for ContainerFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContainerFormat::Gif => f.write_str("GIF"),
            ContainerFormat::Png => f.write_str("PNG"),
        }
    }
}

/// Pixel dimensions; `None` means the value could not be determined.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImageDimensions {
    pub width: Option<u32>,
    pub height: Option<u32>,
}

impl ImageDimensions {
    pub const UNKNOWN: Self = Self {
        width: None,
        height: None,
    };

    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width: Some(width),
            height: Some(height),
        }
    }

    pub fn is_known(&self) -> bool {
        self.width.is_some() && self.height.is_some()
    }
}

pub struct Sniffer<'a> {
    decoder: Option<&'a dyn ImageDecoder>,
}

impl<'a> Sniffer<'a> {
    pub fn new(decoder: Option<&'a dyn ImageDecoder>) -> Self {
        Self { decoder }
    }

    /// Sniffer that only understands GIF and PNG headers
    pub fn headers_only() -> Self {
        Self { decoder: None }
    }

    /// Determine the pixel dimensions of `buf`.
    ///
    /// Only a truncated fixed-size header is an error; anything the decoder
    /// cannot identify comes back as [`ImageDimensions::UNKNOWN`].
    pub fn sniff(&self, buf: &[u8]) -> Result<ImageDimensions> {
        if let Some(dimensions) = sniff_header(buf)? {
            return Ok(dimensions);
        }

        Ok(self.fallback(buf))
    }

    fn fallback(&self, buf: &[u8]) -> ImageDimensions {
        let Some(decoder) = self.decoder else {
            let degradation =
                Degradation::SniffUnavailable("no image decoder is available".to_string());
            log::warn!("{} ({})", degradation, degradation.help_text());
            return ImageDimensions::UNKNOWN;
        };

        match decoder.dimensions(buf) {
            Ok((width, height)) => {
                log::debug!("{} decoder reported {}x{}", decoder.name(), width, height);
                ImageDimensions::new(width, height)
            }
            Err(e) => {
                let degradation = Degradation::SniffUnavailable(format!(
                    "{} cannot identify image; this may not be an image file: {}",
                    decoder.name(),
                    e
                ));
                log::warn!("{}", degradation);
                ImageDimensions::UNKNOWN
            }
        }
    }
}

/// Sniff `buf`, falling back to `decoder` for formats without a fixed header.
pub fn sniff(buf: &[u8], decoder: Option<&dyn ImageDecoder>) -> Result<ImageDimensions> {
    Sniffer::new(decoder).sniff(buf)
}

/// Parse the fixed GIF/PNG headers. `Ok(None)` means no known signature matched.
pub fn sniff_header(buf: &[u8]) -> Result<Option<ImageDimensions>> {
    let len = buf.len();

    if len >= 10 && (buf.starts_with(signatures::GIF87A) || buf.starts_with(signatures::GIF89A)) {
        let (width, height) = unpack_le_u16_pair(&buf[6..10], ContainerFormat::Gif)?;
        log::debug!("GIF header: {}x{}", width, height);
        return Ok(Some(ImageDimensions::new(width.into(), height.into())));
    }

    if len >= 24 && buf.starts_with(signatures::PNG) && &buf[12..16] == signatures::IHDR {
        let (width, height) = unpack_be_u32_pair(&buf[16..24], ContainerFormat::Png)?;
        log::debug!("PNG IHDR: {}x{}", width, height);
        return Ok(Some(ImageDimensions::new(width, height)));
    }

    // Signature without a leading IHDR chunk
    if len >= 16 && buf.starts_with(signatures::PNG) {
        let (width, height) = unpack_be_u32_pair(&buf[8..16], ContainerFormat::Png)?;
        log::debug!("PNG without leading IHDR: {}x{}", width, height);
        return Ok(Some(ImageDimensions::new(width, height)));
    }

    Ok(None)
}

fn unpack_le_u16_pair(field: &[u8], format: ContainerFormat) -> Result<(u16, u16)> {
    let bytes: [u8; 4] = field
        .try_into()
        .map_err(|_| TransportError::MalformedHeader { format })?;

    Ok((
        u16::from_le_bytes([bytes[0], bytes[1]]),
        u16::from_le_bytes([bytes[2], bytes[3]]),
    ))
}

fn unpack_be_u32_pair(field: &[u8], format: ContainerFormat) -> Result<(u32, u32)> {
    let bytes: [u8; 8] = field
        .try_into()
        .map_err(|_| TransportError::MalformedHeader { format })?;

    Ok((
        u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]),
        u32::from_be_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]),
    ))
}
