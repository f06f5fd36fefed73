// ABOUTME: iTerm2 inline image transport with tmux passthrough framing
// ABOUTME: Resolves the display height in rows and writes the OSC 1337 frame to a stream

use crate::constants::{defaults, escape};
use crate::decoder::{default_decoder, ImageDecoder};
use crate::error::{Degradation, Result, TransportError};
use crate::hints::DisplayHints;
use crate::payload::Payload;
use crate::sniff::Sniffer;
use crate::terminal::{CrosstermProbe, TerminalProbe};
use base64::{engine::general_purpose::STANDARD, Engine};
use once_cell::sync::Lazy;
use std::io::Write;
use std::sync::Arc;

static SHARED: Lazy<Encoder> = Lazy::new(Encoder::new);

/// Encoder holding the capabilities resolved at startup.
///
/// Owns no per-call state; one instance can serve any number of streams.
/// Calls that target the same stream must be serialized by the caller.
pub struct Encoder {
    decoder: Option<Arc<dyn ImageDecoder>>,
    terminal: Arc<dyn TerminalProbe>,
    row_margin: u16,
}

impl Default for Encoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Encoder {
    pub fn new() -> Self {
        Self {
            decoder: default_decoder(),
            terminal: Arc::new(CrosstermProbe),
            row_margin: defaults::ROW_MARGIN,
        }
    }

    pub fn with_decoder(mut self, decoder: Option<Arc<dyn ImageDecoder>>) -> Self {
        self.decoder = decoder;
        self
    }

    pub fn with_terminal(mut self, terminal: Arc<dyn TerminalProbe>) -> Self {
        self.terminal = terminal;
        self
    }

    /// Rows kept free below the image when clamping to the terminal height
    pub fn with_row_margin(mut self, rows: u16) -> Self {
        self.row_margin = rows;
        self
    }

    pub fn row_margin(&self) -> u16 {
        self.row_margin
    }

    pub fn has_decoder(&self) -> bool {
        self.decoder.is_some()
    }

    /// Write `buf` to `out` as an inline image and flush.
    ///
    /// Nothing is written when the payload is empty or its header is malformed.
    pub fn encode<W: Write + ?Sized>(
        &self,
        buf: &[u8],
        hints: &DisplayHints,
        out: &mut W,
        multiplexed: bool,
    ) -> Result<()> {
        let height = self.resolve_height(buf, hints)?;
        write_frame(buf, hints, height, out, multiplexed)
    }

    /// Normalize `payload` to bytes, then [`Encoder::encode`] it
    pub fn encode_payload<W: Write + ?Sized>(
        &self,
        payload: Payload,
        hints: &DisplayHints,
        out: &mut W,
        multiplexed: bool,
    ) -> Result<()> {
        let buf = payload.into_bytes()?;
        self.encode(&buf, hints, out, multiplexed)
    }

    /// The exact bytes [`Encoder::encode`] would write
    pub fn render_frame(
        &self,
        buf: &[u8],
        hints: &DisplayHints,
        multiplexed: bool,
    ) -> Result<Vec<u8>> {
        let mut frame = Vec::with_capacity(buf.len() * 4 / 3 + 128);
        self.encode(buf, hints, &mut frame, multiplexed)?;
        Ok(frame)
    }

    /// Display height in terminal rows.
    ///
    /// An explicit height wins. Otherwise the sniffed pixel height is divided
    /// by the pixels-per-row ratio (rounding up) and clamped to the terminal,
    /// or [`defaults::FALLBACK_ROWS`] when the pixel height is unknown.
    pub fn resolve_height(&self, buf: &[u8], hints: &DisplayHints) -> Result<u32> {
        if buf.is_empty() {
            return Err(TransportError::EmptyPayload);
        }

        if let Some(rows) = hints.height {
            return Ok(rows);
        }

        let dimensions = Sniffer::new(self.decoder.as_deref()).sniff(buf)?;
        let Some(pixel_height) = dimensions.height.filter(|h| *h > 0) else {
            log::debug!(
                "Image height unavailable, using {} rows",
                defaults::FALLBACK_ROWS
            );
            return Ok(defaults::FALLBACK_ROWS);
        };

        let rows = pixel_height.div_ceil(hints.pixels_per_row.get());

        match self.terminal.geometry() {
            Ok(geometry) => {
                let clamped = clamp_rows(rows, geometry.rows, self.row_margin);
                log::debug!(
                    "{}px tall image -> {} rows ({} after clamping to {} terminal rows)",
                    pixel_height,
                    rows,
                    clamped,
                    geometry.rows
                );
                Ok(clamped)
            }
            Err(e) => {
                log::debug!("{}", Degradation::GeometryUnavailable(e.to_string()));
                Ok(rows)
            }
        }
    }
}

/// The process-wide encoder with the default capabilities
pub fn shared() -> &'static Encoder {
    &SHARED
}

/// Encode with the default capabilities
pub fn encode<W: Write + ?Sized>(
    buf: &[u8],
    hints: &DisplayHints,
    out: &mut W,
    multiplexed: bool,
) -> Result<()> {
    shared().encode(buf, hints, out, multiplexed)
}

/// Normalize and encode with the default capabilities
pub fn encode_payload<W: Write + ?Sized>(
    payload: Payload,
    hints: &DisplayHints,
    out: &mut W,
    multiplexed: bool,
) -> Result<()> {
    shared().encode_payload(payload, hints, out, multiplexed)
}

/// Keep `margin` rows of the terminal free, never going below one row
pub fn clamp_rows(rows: u32, terminal_rows: u16, margin: u16) -> u32 {
    let available = u32::from(terminal_rows.saturating_sub(margin));
    rows.min(available).max(1)
}

/// Protocol header up to and including the `:` separator
pub fn frame_header(size: usize, hints: &DisplayHints, height: u32) -> String {
    let mut header = format!("{}{};size={}", escape::OSC, escape::INLINE_FILE, size);

    if let Some(name) = hints.label() {
        header.push_str(";name=");
        header.push_str(&STANDARD.encode(name));
    }

    header.push_str(&format!(";height={}", height));

    if let Some(columns) = hints.columns() {
        header.push_str(&format!(";width={}", columns));
    }

    if !hints.preserve_aspect_ratio {
        header.push_str(";preserveAspectRatio=0");
    }

    header.push(':');
    header
}

const NEWLINE_CHUNK: [u8; 256] = [b'\n'; 256];

fn write_newlines<W: Write + ?Sized>(out: &mut W, count: u32) -> std::io::Result<()> {
    let mut remaining = count as usize;
    while remaining > 0 {
        let n = remaining.min(NEWLINE_CHUNK.len());
        out.write_all(&NEWLINE_CHUNK[..n])?;
        remaining -= n;
    }
    Ok(())
}

/// Write a complete frame for an already resolved `height`, then flush.
pub fn write_frame<W: Write + ?Sized>(
    buf: &[u8],
    hints: &DisplayHints,
    height: u32,
    out: &mut W,
    multiplexed: bool,
) -> Result<()> {
    if buf.is_empty() {
        return Err(TransportError::EmptyPayload);
    }

    if multiplexed {
        // Scroll room for the image into view, then return to its top line
        write_newlines(out, height)?;
        out.write_all(escape::HIDE_CURSOR.as_bytes())?;
        write!(out, "{}{}F", escape::CSI, height)?;
        out.write_all(escape::TMUX_PASSTHROUGH_START.as_bytes())?;
        out.write_all(escape::ESC.as_bytes())?;
    }

    out.write_all(frame_header(buf.len(), hints, height).as_bytes())?;
    out.write_all(STANDARD.encode(buf).as_bytes())?;
    out.write_all(escape::BEL.as_bytes())?;

    if multiplexed {
        out.write_all(escape::TMUX_PASSTHROUGH_END.as_bytes())?;
        write!(out, "{}{}E", escape::CSI, height)?;
        out.write_all(escape::SHOW_CURSOR.as_bytes())?;
    } else {
        out.write_all(b"\n")?;
    }

    out.flush()?;
    Ok(())
}
