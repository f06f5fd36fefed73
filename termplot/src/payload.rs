// ABOUTME: Normalizes caller-supplied image values into an encoded byte buffer
// ABOUTME: Closed set of payload variants, each with one conversion rule

use crate::error::{Result, TransportError};
use std::fmt;
use std::io::Read;

/// A third-party object that can render itself as an encoded image.
pub trait Figure: Send {
    /// Name used in diagnostics
    fn label(&self) -> &str;

    /// Encoded image bytes (PNG, JPEG, ...)
    fn render(&self) -> anyhow::Result<Vec<u8>>;
}

/// Samples of a [`PixelArray`]; floats are in `0.0..=1.0`
#[derive(Debug, Clone, PartialEq)]
pub enum Samples {
    U8(Vec<u8>),
    F32(Vec<f32>),
}

impl Samples {
    pub fn len(&self) -> usize {
        match self {
            Samples::U8(data) => data.len(),
            Samples::F32(data) => data.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn into_u8(self) -> Vec<u8> {
        match self {
            Samples::U8(data) => data,
            Samples::F32(data) => data
                .into_iter()
                .map(|v| (v * 255.0).clamp(0.0, 255.0) as u8)
                .collect(),
        }
    }
}

/// Row-major image samples with an explicit shape.
///
/// `[rows, cols]` is grayscale, `[rows, cols, 3]` RGB and `[rows, cols, 4]` RGBA.
#[derive(Debug, Clone, PartialEq)]
pub struct PixelArray {
    pub name: Option<String>,
    pub shape: Vec<usize>,
    pub samples: Samples,
}

impl PixelArray {
    pub fn new(shape: impl Into<Vec<usize>>, samples: Samples) -> Self {
        Self {
            name: None,
            shape: shape.into(),
            samples,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    fn describe_shape(&self) -> String {
        let dims: Vec<String> = self.shape.iter().map(|d| d.to_string()).collect();
        format!("pixel array of shape ({})", dims.join(", "))
    }

    /// (width, height, channels) when the shape is one the encoder accepts
    fn layout(&self) -> Option<(u32, u32, usize)> {
        let (rows, cols, channels) = match self.shape.as_slice() {
            [rows, cols] => (*rows, *cols, 1),
            [rows, cols, channels @ (3 | 4)] => (*rows, *cols, *channels),
            _ => return None,
        };

        let expected = rows.checked_mul(cols)?.checked_mul(channels)?;
        if expected == 0 || expected != self.samples.len() {
            return None;
        }

        Some((u32::try_from(cols).ok()?, u32::try_from(rows).ok()?, channels))
    }

    /// PNG encoding of the samples
    pub fn to_png(&self) -> Result<Vec<u8>> {
        let Some((width, height, channels)) = self.layout() else {
            return Err(TransportError::UnsupportedPayloadType(self.describe_shape()));
        };

        encode_png(self.samples.clone().into_u8(), width, height, channels)
            .map_err(|e| match e {
                PngError::Unavailable => {
                    TransportError::UnsupportedPayloadType(format!(
                        "{} (built without the `decoder` feature)",
                        self.describe_shape()
                    ))
                }
                PngError::Encode(message) => TransportError::Render(message),
            })
    }
}

enum PngError {
    #[cfg_attr(feature = "decoder", allow(dead_code))]
    Unavailable,
    #[cfg_attr(not(feature = "decoder"), allow(dead_code))]
    Encode(String),
}

#[cfg(feature = "decoder")]
fn encode_png(
    data: Vec<u8>,
    width: u32,
    height: u32,
    channels: usize,
) -> std::result::Result<Vec<u8>, PngError> {
    use image::codecs::png::PngEncoder;
    use image::{ExtendedColorType, ImageEncoder};

    let color = match channels {
        1 => ExtendedColorType::L8,
        3 => ExtendedColorType::Rgb8,
        _ => ExtendedColorType::Rgba8,
    };

    let mut png = Vec::new();
    PngEncoder::new(&mut png)
        .write_image(&data, width, height, color)
        .map_err(|e| PngError::Encode(format!("Failed to encode PNG: {}", e)))?;

    log::debug!("Encoded {}x{} pixel array as {} byte PNG", width, height, png.len());
    Ok(png)
}

#[cfg(not(feature = "decoder"))]
fn encode_png(
    _data: Vec<u8>,
    _width: u32,
    _height: u32,
    _channels: usize,
) -> std::result::Result<Vec<u8>, PngError> {
    Err(PngError::Unavailable)
}

/// Every value an image can be sent from
pub enum Payload {
    /// Already encoded image bytes
    Bytes(Vec<u8>),
    /// Stream holding encoded image bytes, read to the end
    Reader(Box<dyn Read + Send>),
    Pixels(PixelArray),
    Figure(Box<dyn Figure>),
    /// A value with no conversion rule
    Foreign { type_name: String },
}

impl fmt::Debug for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Payload::Bytes(data) => write!(f, "Bytes({} bytes)", data.len()),
            Payload::Reader(_) => f.write_str("Reader"),
            Payload::Pixels(array) => write!(f, "Pixels({:?})", array.shape),
            Payload::Figure(figure) => write!(f, "Figure({})", figure.label()),
            Payload::Foreign { type_name } => write!(f, "Foreign({})", type_name),
        }
    }
}

impl Payload {
    pub fn reader(reader: impl Read + Send + 'static) -> Self {
        Payload::Reader(Box::new(reader))
    }

    pub fn figure(figure: impl Figure + 'static) -> Self {
        Payload::Figure(Box::new(figure))
    }

    pub fn foreign(type_name: impl Into<String>) -> Self {
        Payload::Foreign {
            type_name: type_name.into(),
        }
    }

    /// Name carried by a pixel array or figure, if any
    pub fn label(&self) -> Option<&str> {
        match self {
            Payload::Pixels(array) => array.name.as_deref(),
            Payload::Figure(figure) => Some(figure.label()),
            _ => None,
        }
    }

    /// Encoded image bytes for this payload
    pub fn into_bytes(self) -> Result<Vec<u8>> {
        match self {
            Payload::Bytes(data) => Ok(data),
            Payload::Reader(mut reader) => {
                let mut data = Vec::new();
                reader.read_to_end(&mut data)?;
                Ok(data)
            }
            Payload::Pixels(array) => array.to_png(),
            Payload::Figure(figure) => figure
                .render()
                .map_err(|e| TransportError::Render(format!("{}: {:#}", figure.label(), e))),
            Payload::Foreign { type_name } => Err(TransportError::UnsupportedPayloadType(type_name)),
        }
    }
}

impl From<Vec<u8>> for Payload {
    fn from(data: Vec<u8>) -> Self {
        Payload::Bytes(data)
    }
}

impl From<&[u8]> for Payload {
    fn from(data: &[u8]) -> Self {
        Payload::Bytes(data.to_vec())
    }
}

impl From<PixelArray> for Payload {
    fn from(array: PixelArray) -> Self {
        Payload::Pixels(array)
    }
}
