//! Log setup for vorta runs
//!
//! Logs always go to stderr so stdout carries only task output and reports.
//! With `--output json` the stderr logs are JSON lines as well.

use crate::cli::OutputMode;
use anyhow::Context;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Environment variable holding a filter directive that replaces the default
pub const LOG_ENV: &str = "VORTA_LOG";

/// Default filter directive. `--debug` wins over quiet output.
fn default_directive(debug: bool, mode: OutputMode) -> &'static str {
    if debug {
        "vorta=debug"
    } else if mode == OutputMode::Quiet {
        "vorta=error"
    } else {
        "vorta=info"
    }
}

fn log_filter(debug: bool, mode: OutputMode) -> EnvFilter {
    if debug {
        return EnvFilter::new(default_directive(debug, mode));
    }
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default_directive(debug, mode)))
}

/// Open `path` for appending, creating missing parent directories
fn open_log_file(path: &Path) -> anyhow::Result<File> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating log directory {}", parent.display()))?;
    }

    std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("opening log file {}", path.display()))
}

/// Install the global subscriber for this run
pub fn init_logging(debug: bool, mode: OutputMode, log_file: Option<&Path>) -> anyhow::Result<()> {
    let json = mode == OutputMode::Json;

    let text_layer = (!json).then(|| {
        fmt::layer()
            .with_target(false)
            .with_line_number(debug)
            .with_file(debug)
            .with_writer(std::io::stderr)
    });

    let json_layer = json.then(|| {
        fmt::layer()
            .json()
            .with_current_span(false)
            .with_writer(std::io::stderr)
    });

    let file_layer = match log_file {
        Some(path) => Some(
            fmt::layer()
                .with_ansi(false)
                .with_writer(open_log_file(path)?)
                .with_target(true)
                .with_line_number(true)
                .with_file(true),
        ),
        None => None,
    };

    tracing_subscriber::registry()
        .with(log_filter(debug, mode))
        .with(text_layer)
        .with(json_layer)
        .with(file_layer)
        .try_init()
        .context("installing log subscriber")?;

    Ok(())
}

/// Timestamped log file for a run, under `<config dir>/vorta/logs`
pub fn default_log_path(label: &str) -> anyhow::Result<PathBuf> {
    let log_dir = dirs::config_dir()
        .context("could not determine config directory")?
        .join("vorta")
        .join("logs");

    let timestamp = chrono::Local::now().format("%Y%m%d-%H%M%S");
    Ok(log_dir.join(format!("{}-{}.log", sanitize(label), timestamp)))
}

/// Keep flow names usable as file names
fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect()
}
