// ABOUTME: Main entry point for the imgcat binary
// ABOUTME: Displays images inline in iTerm2-compatible terminals, through tmux when needed

use clap::{CommandFactory, Parser};
use std::io::{IsTerminal, Write};
use std::process::ExitCode;
use termplot_cli::app::{App, Plan, Settings};
use termplot_cli::cli::Cli;
use termplot_cli::cli_output::CliOutput;
use termplot_cli::config::Config;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(cli.default_log_filter()),
    )
    .init();

    let output = CliOutput::new();

    let config = match Config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            output.error(&format!("{:#}", e));
            return ExitCode::FAILURE;
        }
    };

    let inputs = match Plan::from_args(&cli.inputs, std::io::stdin().is_terminal()) {
        Plan::Help => {
            let mut stdout = std::io::stdout();
            let _ = Cli::command().write_help(&mut stdout);
            let _ = stdout.flush();
            return ExitCode::SUCCESS;
        }
        Plan::Show(inputs) => inputs,
    };

    let settings = Settings::resolve(&config, Some(&cli));
    log::debug!("Resolved settings: {:?}", settings);

    let mut app = App::new(settings).with_output(output);
    let mut stdin = std::io::stdin().lock();
    let mut stdout = std::io::stdout().lock();

    let status = app.run(&inputs, &mut stdin, &mut stdout).await;
    ExitCode::from(u8::try_from(status).unwrap_or(1))
}
