//! Structured logging
//!
//! Installs the global `tracing` subscriber: JSON or text output, to stdout
//! or to a size-rotated file, filtered by the configured level unless
//! `RUST_LOG` says otherwise.

use crate::core::config::LoggingConfig;
use anyhow::{Context, Result};
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use tracing::Level;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Layer,
};

/// Keeps the non-blocking writer alive; drop it last so buffered lines are flushed
pub struct Logger {
    _guard: WorkerGuard,
}

impl Logger {
    /// Initialize the logging system based on configuration
    pub fn init(config: &LoggingConfig) -> Result<Self> {
        let level = parse_log_level(&config.level)?;

        let env_filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(level.as_str()));

        let (writer, guard) = make_writer(config)?;

        let fmt_layer = match config.format.as_str() {
            "json" => fmt::layer()
                .json()
                .with_writer(writer)
                .with_span_events(FmtSpan::CLOSE)
                .with_current_span(true)
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .boxed(),
            "text" => fmt::layer()
                .with_writer(writer)
                .with_span_events(FmtSpan::CLOSE)
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .boxed(),
            other => anyhow::bail!("Invalid format configuration: {}", other),
        };

        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .try_init()
            .context("Failed to initialize tracing subscriber")?;

        tracing::info!(
            level = %config.level,
            format = %config.format,
            output = %config.output,
            "Logging system initialized"
        );

        Ok(Logger { _guard: guard })
    }
}

fn make_writer(config: &LoggingConfig) -> Result<(NonBlocking, WorkerGuard)> {
    match config.output.as_str() {
        "stdout" => Ok(tracing_appender::non_blocking(io::stdout())),
        "file" => {
            let log_file = config
                .log_file
                .as_ref()
                .context("log_file must be specified when output is 'file'")?;

            if let Some(parent) = log_file.parent() {
                fs::create_dir_all(parent).context("Failed to create log directory")?;
            }

            let appender = RollingFileAppender::for_path(
                log_file,
                config.max_file_size,
                config.max_backups,
            )?;
            Ok(tracing_appender::non_blocking(appender))
        }
        other => anyhow::bail!("Invalid output configuration: {}", other),
    }
}

/// Parse log level string to tracing Level
fn parse_log_level(level: &str) -> Result<Level> {
    match level.to_lowercase().as_str() {
        "debug" => Ok(Level::DEBUG),
        "info" => Ok(Level::INFO),
        "warn" => Ok(Level::WARN),
        "error" => Ok(Level::ERROR),
        _ => anyhow::bail!("Invalid log level: {}", level),
    }
}

/// File writer that rotates `name` -> `name.1` -> ... -> `name.N` once
/// `max_file_size` would be exceeded.
pub struct RollingFileAppender {
    directory: PathBuf,
    filename: String,
    max_file_size: usize,
    max_backups: usize,
    current: Mutex<Option<(File, usize)>>,
}

impl RollingFileAppender {
    pub fn new(directory: PathBuf, filename: String, max_file_size: usize, max_backups: usize) -> Self {
        Self {
            directory,
            filename,
            max_file_size,
            max_backups,
            current: Mutex::new(None),
        }
    }

    fn for_path(log_file: &Path, max_file_size: usize, max_backups: usize) -> Result<Self> {
        let directory = log_file
            .parent()
            .context("Log file must have a parent directory")?;

        let filename = log_file
            .file_name()
            .context("Log file must have a filename")?
            .to_str()
            .context("Log filename must be valid UTF-8")?;

        Ok(Self::new(
            directory.to_path_buf(),
            filename.to_string(),
            max_file_size,
            max_backups,
        ))
    }

    fn current_path(&self) -> PathBuf {
        self.directory.join(&self.filename)
    }

    fn backup_path(&self, index: usize) -> PathBuf {
        self.directory.join(format!("{}.{}", self.filename, index))
    }

    fn lock(&self) -> io::Result<MutexGuard<'_, Option<(File, usize)>>> {
        self.current
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "log file lock poisoned"))
    }

    /// Shift backups up by one; the oldest falls off the end
    fn rotate(&self) -> io::Result<()> {
        for i in (1..self.max_backups).rev() {
            let from = self.backup_path(i);
            if from.exists() {
                fs::rename(&from, self.backup_path(i + 1))?;
            }
        }

        let current = self.current_path();
        if current.exists() {
            fs::rename(&current, self.backup_path(1))?;
        }

        Ok(())
    }

    fn open(&self) -> io::Result<(File, usize)> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.current_path())?;
        let size = file.metadata()?.len() as usize;
        Ok((file, size))
    }
}

impl Write for RollingFileAppender {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut guard = self.lock()?;

        if guard.is_none() {
            *guard = Some(self.open()?);
        }

        let needs_rotation = matches!(
            guard.as_ref(),
            Some((_, size)) if *size > 0 && size + buf.len() > self.max_file_size
        );
        if needs_rotation {
            *guard = None;
            self.rotate()?;
            *guard = Some(self.open()?);
        }

        match guard.as_mut() {
            Some((file, size)) => {
                let written = file.write(buf)?;
                *size += written;
                Ok(written)
            }
            None => Err(io::Error::new(io::ErrorKind::Other, "log file not open")),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        let mut guard = self.lock()?;
        if let Some((file, _)) = guard.as_mut() {
            file.flush()?;
        }
        Ok(())
    }
}
