//! Logger initialization using tracing-subscriber.
//!
//! Grounded on the teacher's `infrastructure::logging::logger::LoggerImpl`:
//! an `EnvFilter` seeded from the configured level, a stdout layer in either
//! `json` or `pretty` format, and an optional daily-rotating file layer when
//! a log directory is configured. Returns a `WorkerGuard` the caller must
//! keep alive for the process lifetime.

use anyhow::Result;
use std::io;
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use crate::domain::models::LoggingConfig;

/// Owns the non-blocking file-writer guard, if file logging was configured.
/// Dropping it flushes the remaining buffered log lines.
pub struct LoggerGuard {
    _guard: Option<WorkerGuard>,
}

/// Initialize the global tracing subscriber from a `LoggingConfig`.
pub fn init(config: &LoggingConfig) -> Result<LoggerGuard> {
    let default_level = parse_log_level(&config.level)?;
    let env_filter = EnvFilter::builder().with_default_directive(default_level.into()).from_env_lossy();

    let stdout_json = config.format == "json";

    let guard = if let Some(ref log_dir) = config.directory {
        let file_appender = rolling::daily(log_dir, "ouroboros.log");
        let (non_blocking_file, guard) = tracing_appender::non_blocking(file_appender);

        let file_layer = tracing_subscriber::fmt::layer()
            .json()
            .with_writer(non_blocking_file)
            .with_ansi(false)
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .with_filter(env_filter.clone());

        if stdout_json {
            let stdout_layer = tracing_subscriber::fmt::layer()
                .json()
                .with_writer(io::stdout)
                .with_target(true)
                .with_filter(env_filter);
            tracing_subscriber::registry().with(file_layer).with(stdout_layer).init();
        } else {
            let stdout_layer = tracing_subscriber::fmt::layer()
                .pretty()
                .with_writer(io::stdout)
                .with_target(true)
                .with_span_events(FmtSpan::CLOSE)
                .with_filter(env_filter);
            tracing_subscriber::registry().with(file_layer).with(stdout_layer).init();
        }

        Some(guard)
    } else if stdout_json {
        let stdout_layer = tracing_subscriber::fmt::layer().json().with_writer(io::stdout).with_target(true).with_filter(env_filter);
        tracing_subscriber::registry().with(stdout_layer).init();
        None
    } else {
        let stdout_layer = tracing_subscriber::fmt::layer()
            .pretty()
            .with_writer(io::stdout)
            .with_target(true)
            .with_span_events(FmtSpan::CLOSE)
            .with_filter(env_filter);
        tracing_subscriber::registry().with(stdout_layer).init();
        None
    };

    tracing::info!(level = %config.level, format = %config.format, file_output = config.directory.is_some(), "logger initialized");

    Ok(LoggerGuard { _guard: guard })
}

fn parse_log_level(level: &str) -> Result<Level> {
    match level.to_lowercase().as_str() {
        "trace" => Ok(Level::TRACE),
        "debug" => Ok(Level::DEBUG),
        "info" => Ok(Level::INFO),
        "warn" => Ok(Level::WARN),
        "error" => Ok(Level::ERROR),
        _ => anyhow::bail!("invalid log level: {level}"),
    }
}
