// ABOUTME: CLI argument definitions for the imgcat binary
// ABOUTME: Defines the command-line interface structure using clap derive macros

use clap::Parser;
use std::path::PathBuf;
use termplot::Passthrough;

#[derive(Parser, Debug)]
#[command(name = "imgcat")]
#[command(about = "Display images inline in iTerm2-compatible terminals", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Image files, http(s) URLs, or - for stdin
    #[arg(value_name = "IMAGE")]
    pub inputs: Vec<String>,

    /// Display height in terminal rows (estimated from the image by default)
    #[arg(long, value_name = "ROWS", value_parser = clap::value_parser!(u32).range(1..))]
    pub height: Option<u32>,

    /// Display width in terminal columns
    #[arg(long, value_name = "COLS", value_parser = clap::value_parser!(u32).range(1..))]
    pub width: Option<u32>,

    /// Let the terminal stretch the image to the requested size
    #[arg(long)]
    pub no_preserve_aspect_ratio: bool,

    /// Image pixels per terminal row when estimating the height
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u32).range(1..))]
    pub pixels_per_row: Option<u32>,

    /// Wrap output for tmux: auto, always or never
    #[arg(long, value_name = "MODE")]
    pub passthrough: Option<Passthrough>,

    /// Read configuration from this file as well
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Suppress download progress
    #[arg(long, short)]
    pub quiet: bool,

    /// Enable verbose output for debugging
    #[arg(long, short)]
    pub verbose: bool,
}

impl Cli {
    /// Log filter used when RUST_LOG is unset
    pub fn default_log_filter(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else {
            "warn"
        }
    }
}
