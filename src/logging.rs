//! Tracing configuration and log routing.
//!
//! Logs go to stdout through a compact formatter and to a file. `TOPICSORT_LOG_FILE` selects the
//! file; otherwise logs are appended to `logs/topicsort.log`. The file layer uses a non‑blocking
//! writer whose guard is handed back to the caller, so the caller owns the logging lifecycle.
//!
//! Components never reach for global logging state: each one receives a [`tracing::Span`] at
//! construction and instruments its work with it. [`component_span`] builds those spans.
use tracing::Span;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Configure tracing subscribers for stdout and file logging.
///
/// - Respects `RUST_LOG` for filtering (defaults to `info`).
/// - Installs a compact stdout layer and, when available, a file layer.
/// - Returns the writer guard; dropping it flushes and closes the file layer.
pub fn init_tracing() -> Option<WorkerGuard> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let stdout_layer = fmt::layer().with_target(false).compact();

    let registry = tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer);

    match configure_file_writer() {
        Some((writer, guard)) => {
            let file_layer = fmt::layer()
                .with_writer(writer)
                .with_target(true)
                .with_ansi(false)
                .compact();

            registry.with(file_layer).init();
            Some(guard)
        }
        None => {
            registry.init();
            None
        }
    }
}

/// Span handed to a pipeline component so its events carry the run and component names.
pub fn component_span(run_id: &str, component: &'static str) -> Span {
    tracing::info_span!("component", run = %run_id, name = component)
}

/// Build a non‑blocking writer for file logging.
///
/// Returns `None` when the logs directory cannot be created or the target file cannot be opened.
fn configure_file_writer() -> Option<(NonBlocking, WorkerGuard)> {
    if let Ok(path) = std::env::var("TOPICSORT_LOG_FILE") {
        match std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
        {
            Ok(file) => Some(tracing_appender::non_blocking(file)),
            Err(err) => {
                eprintln!("Failed to open log file {path}: {err}");
                None
            }
        }
    } else {
        if let Err(err) = std::fs::create_dir_all("logs") {
            eprintln!("Failed to create logs directory: {err}");
            return None;
        }
        let file_appender = tracing_appender::rolling::never("logs", "topicsort.log");
        Some(tracing_appender::non_blocking(file_appender))
    }
}
