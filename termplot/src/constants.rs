// ABOUTME: Centralized constants for the inline image transport
// ABOUTME: Contains escape sequences, container signatures and sizing defaults

/// Terminal escape sequences used when framing an inline image
pub mod escape {
    /// Escape character
    pub const ESC: &str = "\x1b";

    /// Operating System Command introducer
    pub const OSC: &str = "\x1b]";

    /// Control Sequence Introducer
    pub const CSI: &str = "\x1b[";

    /// Bell, terminates the OSC 1337 sequence
    pub const BEL: &str = "\x07";

    /// Protocol marker and mandatory inline flag
    pub const INLINE_FILE: &str = "1337;File=inline=1";

    /// tmux DCS passthrough opener
    pub const TMUX_PASSTHROUGH_START: &str = "\x1bPtmux;";

    /// String terminator closing the tmux passthrough
    pub const TMUX_PASSTHROUGH_END: &str = "\x1b\\";

    pub const HIDE_CURSOR: &str = "\x1b[?25l";
    pub const SHOW_CURSOR: &str = "\x1b[?25h";
}

/// Magic bytes of the containers the sniffer reads directly
pub mod signatures {
    pub const GIF87A: &[u8] = b"GIF87a";
    pub const GIF89A: &[u8] = b"GIF89a";

    /// PNG signature: 89 50 4E 47 0D 0A 1A 0A
    pub const PNG: &[u8] = &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

    /// Type of the PNG header chunk
    pub const IHDR: &[u8] = b"IHDR";
}

/// Sizing defaults
pub mod defaults {
    /// Image pixels per terminal row when estimating the display height
    pub const PIXELS_PER_ROW: u32 = 24;

    /// Rows kept free below the image for the prompt and status lines
    pub const ROW_MARGIN: u16 = 9;

    /// Display height used when the pixel height cannot be determined
    pub const FALLBACK_ROWS: u32 = 10;
}

/// Environment variables consulted by the transport
pub mod env {
    /// Set by tmux inside its sessions
    pub const MULTIPLEXER_SESSION: &str = "TMUX";
}
