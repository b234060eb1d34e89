//! # Logger
//!
//! Starts `tracing` output for flagkit processes from the `[logging]` config section.
//!
//! Console output always goes to stderr, so `flagctl` keeps stdout for command results.
//! With `logging.dir` set, events are also written to daily rolling files named after the
//! process (`flagctl.2026-10-19.log`), as JSON lines when `logging.json` is set.
//!
//! `logging.level` is an env-filter directive (`"debug"`, `"flagkit_toggles=trace,info"`).
//! A `RUST_LOG` variable, when present and valid, replaces it for one-off debugging.
//!
//! ## Example
//!
//! ```rust
//! use flagkit_domain::config::LoggingConfig;
//! use flagkit_logger::Logger;
//!
//! let config = LoggingConfig { level: "flagkit_toggles=debug,warn".to_owned(), ..LoggingConfig::default() };
//! let logger = Logger::from_config("flagctl", &config).unwrap();
//! assert!(!logger.writes_files());
//! ```

mod error;

pub use crate::error::{LoggerError, LoggerErrorExt};

use flagkit_domain::config::LoggingConfig;
use private::Sealed;
use std::fs;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::layer;
use tracing_subscriber::layer::{Layered, SubscriberExt};
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

const DEFAULT_FILTER: &str = "info";
/// Daily files kept per process name.
const MAX_LOG_FILES: usize = 7;
const LOG_FILE_SUFFIX: &str = "log";

/// Line format of the file output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct FileOutput {
    dir: PathBuf,
    format: LogFormat,
}

#[derive(Debug)]
pub struct NoName;
#[derive(Debug)]
pub struct WithName(String);

mod private {
    pub trait Sealed {}
}
impl Sealed for NoName {}
impl Sealed for WithName {}

/// Collects the subscriber settings; only a named builder can be initialized.
#[derive(Debug)]
pub struct LoggerBuilder<N: Sealed = NoName> {
    name: N,
    filter: String,
    file: Option<FileOutput>,
}

impl LoggerBuilder<NoName> {
    /// Names the process. The name prefixes rolling log files.
    pub fn name(self, name: impl Into<String>) -> LoggerBuilder<WithName> {
        LoggerBuilder { name: WithName(name.into()), filter: self.filter, file: self.file }
    }
}

impl<N: Sealed> LoggerBuilder<N> {
    /// Sets the env-filter directive used when `RUST_LOG` is absent.
    #[must_use = "The builder must be configured before it can be used to initialize the logger."]
    pub fn filter(mut self, directive: impl Into<String>) -> Self {
        self.filter = directive.into();
        self
    }

    /// Also writes events to rolling files under `dir`.
    #[must_use = "The builder must be configured before it can be used to initialize the logger."]
    pub fn file(mut self, dir: impl Into<PathBuf>, format: LogFormat) -> Self {
        self.file = Some(FileOutput { dir: dir.into(), format });
        self
    }

    /// Applies a `[logging]` config section.
    #[must_use = "The builder must be configured before it can be used to initialize the logger."]
    pub fn configure(self, config: &LoggingConfig) -> Self {
        let builder = self.filter(config.level.as_str());
        match &config.dir {
            Some(dir) => {
                let format = if config.json { LogFormat::Json } else { LogFormat::Text };
                builder.file(dir, format)
            },
            None => builder,
        }
    }
}

impl LoggerBuilder<WithName> {
    /// Installs the global subscriber.
    ///
    /// Keep the returned [`Logger`] alive until shutdown; dropping it flushes and stops the
    /// file writer thread.
    ///
    /// # Errors
    /// - [`LoggerError::InvalidConfiguration`] for a blank name or a malformed filter.
    /// - [`LoggerError::Io`] or [`LoggerError::Appender`] if the log directory is unusable.
    /// - [`LoggerError::Subscriber`] if a global subscriber is already installed.
    pub fn init(self) -> Result<Logger, LoggerError> {
        let name = self.name.0;
        if name.trim().is_empty() {
            return Err(LoggerError::InvalidConfiguration {
                message: "Logger name cannot be empty".into(),
                context: None,
            });
        }

        let filter = build_filter(&self.filter)?;

        let console = layer()
            .compact()
            .with_ansi(std::io::stderr().is_terminal())
            .with_writer(std::io::stderr)
            .boxed();
        let mut layers = vec![console];

        let guard = match &self.file {
            Some(output) => {
                let (file_layer, guard) = file_layer(&name, output)?;
                layers.push(file_layer);
                Some(guard)
            },
            None => None,
        };

        tracing_subscriber::registry().with(filter).with(layers).try_init()?;

        Ok(Logger { guard, log_dir: self.file.map(|output| output.dir) })
    }
}

/// Keeps logging alive. Dropping it flushes pending file output.
#[must_use = "Dropping this handle will stop background logging threads."]
#[derive(Debug)]
pub struct Logger {
    guard: Option<WorkerGuard>,
    log_dir: Option<PathBuf>,
}

impl Logger {
    #[must_use = "The builder must be configured before it can be used to initialize the logger."]
    pub fn builder() -> LoggerBuilder {
        LoggerBuilder { name: NoName, filter: DEFAULT_FILTER.to_owned(), file: None }
    }

    /// Initializes logging from the `[logging]` config section.
    ///
    /// # Errors
    /// Same as [`LoggerBuilder::init`].
    pub fn from_config(name: &str, config: &LoggingConfig) -> Result<Self, LoggerError> {
        Self::builder().name(name).configure(config).init()
    }

    #[must_use]
    pub const fn writes_files(&self) -> bool {
        self.guard.is_some()
    }

    #[must_use]
    pub fn log_dir(&self) -> Option<&Path> {
        self.log_dir.as_deref()
    }
}

impl Drop for Logger {
    fn drop(&mut self) {
        if self.guard.is_some() {
            tracing::debug!("Flushing log files");
        }
    }
}

fn build_filter(directive: &str) -> Result<EnvFilter, LoggerError> {
    let configured =
        EnvFilter::builder().parse(directive).map_err(|e| LoggerError::InvalidConfiguration {
            message: format!("Invalid log filter '{directive}': {e}").into(),
            context: None,
        })?;
    Ok(EnvFilter::try_from_default_env().unwrap_or(configured))
}

type BoxedLayer = Box<dyn Layer<Layered<EnvFilter, Registry>> + Send + Sync>;

fn file_layer(name: &str, output: &FileOutput) -> Result<(BoxedLayer, WorkerGuard), LoggerError> {
    fs::create_dir_all(&output.dir)
        .context(format!("Failed to create log directory: {}", output.dir.display()))?;

    let appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(name)
        .filename_suffix(LOG_FILE_SUFFIX)
        .max_log_files(MAX_LOG_FILES)
        .build(&output.dir)?;

    let (writer, guard) = tracing_appender::non_blocking(appender);
    let plain = layer().with_writer(writer).with_ansi(false);
    let boxed = match output.format {
        LogFormat::Text => plain.boxed(),
        LogFormat::Json => plain.json().boxed(),
    };
    Ok((boxed, guard))
}
