//! Logging and tracing configuration
//!
//! Reports go to stdout, so all logging goes to stderr and, optionally, to a
//! log file written through a non-blocking appender.

use std::path::{Path, PathBuf};

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use super::paths;

/// Default filter when `RUST_LOG` is unset, by verbosity level
fn default_filter(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "ui_validation=warn,warn",
        1 => "ui_validation=info,warn",
        2 => "ui_validation=debug,info",
        _ => "ui_validation=trace,info",
    }
}

/// Initialize tracing for the CLI
///
/// Logs are controlled by the `RUST_LOG` environment variable, falling back
/// to a filter derived from the `-v` count. When `log_file` is given the
/// same events are appended to it without ANSI colors; keep the returned
/// guard alive until exit so buffered lines are flushed.
pub fn init_cli(verbosity: u8, log_file: Option<&Path>) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(verbosity)));

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact();

    let Some(log_file) = log_file else {
        tracing_subscriber::registry()
            .with(filter)
            .with(stderr_layer)
            .init();
        return None;
    };

    let directory = log_file.parent().unwrap_or(Path::new("."));
    let file_name = log_file
        .file_name()
        .map(|n| n.to_owned())
        .unwrap_or_else(|| "ui-validation.log".into());

    if let Err(e) = std::fs::create_dir_all(directory) {
        eprintln!("Warning: Could not create log directory: {}", e);
    }

    let appender = tracing_appender::rolling::never(directory, file_name);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let file_layer = fmt::layer()
        .with_writer(writer)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .boxed();

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .init();

    Some(guard)
}

/// Default log file location when `--log-file` is given without a path
pub fn default_log_path() -> Option<PathBuf> {
    paths::log_dir().map(|d| d.join("ui-validation.log"))
}
