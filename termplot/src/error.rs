// ABOUTME: Error types for the inline image transport
// ABOUTME: Separates fatal encode failures from degradations that are only logged

use crate::sniff::ContainerFormat;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, TransportError>;

/// Failures that abort a single encode call.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Empty buffer")]
    EmptyPayload,

    #[error("Invalid {format} file")]
    MalformedHeader { format: ContainerFormat },

    #[error("Unsupported payload type: {0}")]
    UnsupportedPayloadType(String),

    #[error("Failed to render payload: {0}")]
    Render(String),

    #[error("Failed to write image: {0}")]
    Io(#[from] std::io::Error),
}

impl TransportError {
    pub fn help_text(&self) -> Option<&'static str> {
        match self {
            TransportError::EmptyPayload => Some("The input contained no bytes"),
            TransportError::MalformedHeader { .. } => {
                Some("The file header is truncated; check that the download or file is complete")
            }
            TransportError::UnsupportedPayloadType(_) => Some(
                "Pass raw image bytes, a reader, a grayscale/RGB/RGBA pixel array or a figure",
            ),
            _ => None,
        }
    }
}

/// Conditions the encoder absorbs; they are logged and never returned from `encode`.
#[derive(Debug, Error)]
pub enum Degradation {
    #[error("cannot determine the image size; {0}")]
    SniffUnavailable(String),

    #[error("terminal size unavailable: {0}")]
    GeometryUnavailable(String),
}

impl Degradation {
    pub fn help_text(&self) -> &'static str {
        match self {
            Degradation::SniffUnavailable(_) => {
                "Pass an explicit height, or build with the `decoder` feature for more formats"
            }
            Degradation::GeometryUnavailable(_) => {
                "Output is probably not a terminal; the image height is not clamped"
            }
        }
    }
}
