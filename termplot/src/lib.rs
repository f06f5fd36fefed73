// ABOUTME: Inline image transport for terminals that speak the iTerm2 OSC 1337 protocol
// ABOUTME: Sniffs image headers, sizes the image in rows and frames it for tmux when needed

pub mod constants;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod hints;
pub mod payload;
pub mod sniff;
pub mod terminal;

pub use decoder::{default_decoder, DecodeError, ImageDecoder};
pub use encoder::{encode, encode_payload, Encoder};
pub use error::{Degradation, Result, TransportError};
pub use hints::DisplayHints;
pub use payload::{Figure, Payload, PixelArray, Samples};
pub use sniff::{sniff, ContainerFormat, ImageDimensions, Sniffer};
pub use terminal::{is_multiplexed, Passthrough, TerminalGeometry, TerminalProbe};
