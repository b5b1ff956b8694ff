use std::env;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::Cli;

fn init_tracing() {
    let filter = EnvFilter::try_from_env("LIBDRAGON_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    if let Some(mode) = cli.color {
        libdragon::set_color_mode(mode);
    }
    init_tracing();

    let use_err = libdragon::color_enabled_stderr();
    if let Some(dir) = &cli.chdir {
        if let Err(e) = env::set_current_dir(dir) {
            libdragon::log_error_stderr(use_err, &format!("{}: {e}", dir.display()));
            return ExitCode::from(1);
        }
        if cli.verbose {
            println!("chdir to: {}", dir.display());
        }
    }

    let runner = libdragon::ProcessRunner::new(cli.verbose);
    match commands::dispatch(&cli, &runner) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            libdragon::log_error_stderr(use_err, &e.to_string());
            if let Some(stderr) = e.child_stderr() {
                libdragon::log_error_stderr(use_err, stderr);
            }
            ExitCode::from(libdragon::exit_code_for_error(&e))
        }
    }
}
