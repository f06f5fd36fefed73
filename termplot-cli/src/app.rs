// ABOUTME: Drives imgcat: resolves settings, reads each input and encodes it to stdout
// ABOUTME: Read failures are reported and remembered while the remaining inputs still run

use crate::cli::Cli;
use crate::cli_output::CliOutput;
use crate::config::Config;
use crate::downloader::ImageDownloader;
use crate::input::{exit_code_for, read_all, read_file, Input};
use anyhow::{anyhow, Context, Result};
use std::io::{Read, Write};
use std::num::NonZeroU32;
use termplot::constants::defaults;
use termplot::hints::default_pixels_per_row;
use termplot::{DisplayHints, Encoder, Passthrough, TransportError};

/// Everything that applies to every input of one invocation
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub hints: DisplayHints,
    pub passthrough: Passthrough,
    pub row_margin: u16,
    pub max_download_bytes: u64,
    pub quiet: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self::resolve(&Config::default(), None)
    }
}

impl Settings {
    /// Config values, overridden by command-line flags
    pub fn resolve(config: &Config, cli: Option<&Cli>) -> Self {
        let pixels_per_row = cli
            .and_then(|cli| cli.pixels_per_row)
            .or(config.pixels_per_row)
            .and_then(NonZeroU32::new)
            .unwrap_or_else(default_pixels_per_row);

        let preserve_aspect_ratio = match cli {
            Some(cli) if cli.no_preserve_aspect_ratio => false,
            _ => config.preserve_aspect_ratio.unwrap_or(true),
        };

        let mut hints = DisplayHints::new()
            .with_preserve_aspect_ratio(preserve_aspect_ratio)
            .with_pixels_per_row(pixels_per_row);
        hints.height = cli.and_then(|cli| cli.height);
        hints.width = cli.and_then(|cli| cli.width);

        Self {
            hints,
            passthrough: cli
                .and_then(|cli| cli.passthrough)
                .or(config.passthrough)
                .unwrap_or_default(),
            row_margin: config.row_margin.unwrap_or(defaults::ROW_MARGIN),
            max_download_bytes: config.max_download_bytes(),
            quiet: cli.is_some_and(|cli| cli.quiet) || config.quiet.unwrap_or(false),
        }
    }
}

/// What an invocation should do before any input is touched
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Plan {
    Help,
    Show(Vec<Input>),
}

impl Plan {
    /// Stdin is read implicitly only when it is not a terminal.
    ///
    /// Arguments that cannot be classified stay in the plan as
    /// [`Input::Invalid`] so the inputs around them still run.
    pub fn from_args(args: &[String], stdin_is_terminal: bool) -> Self {
        if args.is_empty() {
            if stdin_is_terminal {
                return Plan::Help;
            }
            return Plan::Show(vec![Input::Stdin]);
        }

        Plan::Show(args.iter().map(|arg| Input::classify(arg)).collect())
    }
}

pub struct App {
    settings: Settings,
    encoder: Encoder,
    multiplexed: bool,
    downloader: Option<ImageDownloader>,
    output: CliOutput,
}

impl App {
    pub fn new(settings: Settings) -> Self {
        let encoder = Encoder::new().with_row_margin(settings.row_margin);
        let multiplexed = settings.passthrough.resolve();

        Self {
            settings,
            encoder,
            multiplexed,
            downloader: None,
            output: CliOutput::new(),
        }
    }

    /// Swap in another encoder; the row margin from the settings still applies
    pub fn with_encoder(mut self, encoder: Encoder) -> Self {
        self.encoder = encoder.with_row_margin(self.settings.row_margin);
        self
    }

    pub fn encoder(&self) -> &Encoder {
        &self.encoder
    }

    pub fn with_output(mut self, output: CliOutput) -> Self {
        self.output = output;
        self
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn multiplexed(&self) -> bool {
        self.multiplexed
    }

    /// Show every input in order and return the process exit code.
    ///
    /// The code is 0 when all inputs succeed; otherwise it is the OS error
    /// number of the last failed read, or 1.
    pub async fn run<R: Read, W: Write>(
        &mut self,
        inputs: &[Input],
        stdin: &mut R,
        out: &mut W,
    ) -> i32 {
        let mut status = 0;

        for input in inputs {
            let data = match self.read(input, stdin).await {
                Ok(data) => data,
                Err(e) => {
                    self.output.error(&format!("{:#}", e));
                    status = exit_code_for(&e);
                    continue;
                }
            };

            if let Err(e) = self.show(input, &data, out) {
                self.output.error_with_help(
                    &format!("{}: {}", input.describe(), e),
                    e.help_text(),
                );
                status = 1;
            }
        }

        status
    }

    /// Encode one already read input
    pub fn show<W: Write>(
        &self,
        input: &Input,
        data: &[u8],
        out: &mut W,
    ) -> std::result::Result<(), TransportError> {
        let mut hints = self.settings.hints.clone();
        hints.filename = input.display_name();

        log::debug!("Showing {} ({} bytes)", input.describe(), data.len());
        self.encoder.encode(data, &hints, out, self.multiplexed)
    }

    async fn read<R: Read>(&mut self, input: &Input, stdin: &mut R) -> Result<Vec<u8>> {
        match input {
            Input::Stdin => read_all(stdin).context("<stdin>"),
            Input::File(path) => read_file(path),
            Input::Url(url) => self.downloader()?.download(url).await,
            Input::Invalid { reason, .. } => Err(anyhow!("{}", reason)),
        }
    }

    fn downloader(&mut self) -> Result<&ImageDownloader> {
        if self.downloader.is_none() {
            let downloader = ImageDownloader::new()?
                .with_max_bytes(self.settings.max_download_bytes)
                .with_progress(!self.settings.quiet);
            self.downloader = Some(downloader);
        }

        self.downloader
            .as_ref()
            .context("HTTP client unavailable")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::io::Cursor;
    use std::path::PathBuf;

    fn settings() -> Settings {
        Settings {
            passthrough: Passthrough::Never,
            ..Settings::default()
        }
    }

    #[test]
    fn test_settings_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.hints.pixels_per_row.get(), 24);
        assert!(settings.hints.preserve_aspect_ratio);
        assert_eq!(settings.row_margin, 9);
        assert_eq!(settings.passthrough, Passthrough::Auto);
        assert_eq!(settings.max_download_bytes, 32 * 1024 * 1024);
        assert!(!settings.quiet);
    }

    #[test]
    fn test_flags_override_config() {
        let config = Config {
            pixels_per_row: Some(30),
            preserve_aspect_ratio: Some(true),
            passthrough: Some(Passthrough::Always),
            row_margin: Some(2),
            ..Default::default()
        };
        let cli = Cli::parse_from([
            "imgcat",
            "--pixels-per-row",
            "12",
            "--no-preserve-aspect-ratio",
            "--passthrough",
            "never",
            "--height",
            "5",
        ]);

        let settings = Settings::resolve(&config, Some(&cli));
        assert_eq!(settings.hints.pixels_per_row.get(), 12);
        assert!(!settings.hints.preserve_aspect_ratio);
        assert_eq!(settings.hints.height, Some(5));
        assert_eq!(settings.passthrough, Passthrough::Never);
        assert_eq!(settings.row_margin, 2);
    }

    #[test]
    fn test_config_used_without_flags() {
        let config = Config {
            pixels_per_row: Some(30),
            preserve_aspect_ratio: Some(false),
            quiet: Some(true),
            ..Default::default()
        };
        let cli = Cli::parse_from(["imgcat"]);

        let settings = Settings::resolve(&config, Some(&cli));
        assert_eq!(settings.hints.pixels_per_row.get(), 30);
        assert!(!settings.hints.preserve_aspect_ratio);
        assert!(settings.quiet);
    }

    #[test]
    fn test_plan() {
        assert_eq!(Plan::from_args(&[], true), Plan::Help);
        assert_eq!(Plan::from_args(&[], false), Plan::Show(vec![Input::Stdin]));
        assert_eq!(
            Plan::from_args(&["-".to_string()], true),
            Plan::Show(vec![Input::Stdin])
        );
        assert_eq!(
            Plan::from_args(&["a.gif".to_string()], false),
            Plan::Show(vec![Input::File(PathBuf::from("a.gif"))])
        );
    }

    #[test]
    fn test_plan_keeps_inputs_around_malformed_url() {
        let args = ["a.gif", "http://", "b.gif"].map(String::from);
        let Plan::Show(inputs) = Plan::from_args(&args, true) else {
            panic!("expected inputs to show");
        };

        assert_eq!(inputs.len(), 3);
        assert_eq!(inputs[0], Input::File(PathBuf::from("a.gif")));
        assert!(matches!(&inputs[1], Input::Invalid { arg, .. } if arg == "http://"));
        assert_eq!(inputs[2], Input::File(PathBuf::from("b.gif")));
    }

    #[test]
    fn test_replaced_encoder_keeps_row_margin() {
        let settings = Settings {
            row_margin: 3,
            ..settings()
        };
        let app = App::new(settings).with_encoder(Encoder::new().with_row_margin(20));
        assert_eq!(app.encoder().row_margin(), 3);
    }

    #[tokio::test]
    async fn test_stdin_has_no_name() {
        let mut app = App::new(settings()).with_output(CliOutput::with_color(false));
        let mut stdin = Cursor::new(b"GIF89a\x30\x00\x30\x00\x00\x00\x00".to_vec());
        let mut out = Vec::new();

        let status = app.run(&[Input::Stdin], &mut stdin, &mut out).await;

        assert_eq!(status, 0);
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("\x1b]1337;File=inline=1;size=13;height="));
        assert!(!text.contains("name="));
    }

    #[tokio::test]
    async fn test_empty_stdin_fails() {
        let mut app = App::new(settings()).with_output(CliOutput::with_color(false));
        let mut out = Vec::new();

        let status = app
            .run(&[Input::Stdin], &mut Cursor::new(Vec::new()), &mut out)
            .await;

        assert_eq!(status, 1);
        assert!(out.is_empty());
    }
}
