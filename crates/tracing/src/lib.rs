//! Tracing management for ferret.
//!
//! This crate builds the `tracing` subscriber stack used by the `ferret` binary: a stdout layer in
//! one of several [`LogFormat`]s and an optional size-rotated file layer. Library crates never
//! install a subscriber themselves; they only emit events through the `tracing` facade.
//!
//! ```no_run
//! use ferret_tracing::{FerretTracer, LayerInfo, LogFormat, Tracer};
//!
//! let tracer = FerretTracer::new().with_stdout(LayerInfo::new(
//!     LogFormat::Terminal,
//!     "info".to_string(),
//!     String::new(),
//!     Some("always".to_string()),
//! ));
//! let _guard = tracer.init().expect("failed to install tracer");
//! ```

use std::{
    fmt::{self, Display},
    path::PathBuf,
};

use clap::ValueEnum;
use rolling_file::{BasicRollingFileAppender, RollingConditionBasic};
use tracing::Subscriber;
use tracing_appender::non_blocking::NonBlocking;
use tracing_subscriber::{
    filter::Directive, layer::SubscriberExt, registry::LookupSpan, util::SubscriberInitExt,
    EnvFilter, Layer, Registry,
};

pub use tracing_subscriber;

/// A worker guard returned by the file layer. When this guard is dropped, buffered logs are
/// flushed to the file, so it must be kept alive for the lifetime of the program.
pub type FileWorkerGuard = tracing_appender::non_blocking::WorkerGuard;

/// A boxed tracing [Layer].
pub type BoxedLayer<S> = Box<dyn Layer<S> + Send + Sync>;

/// Directives that are always applied, regardless of user filters.
const DEFAULT_ENV_FILTER_DIRECTIVES: [&str; 0] = [];

/// The output format of a logging layer.
#[derive(Debug, Copy, Clone, ValueEnum, Eq, PartialEq)]
pub enum LogFormat {
    /// Structured JSON, one object per event.
    Json,

    /// `key=value` logfmt lines.
    LogFmt,

    /// Human readable terminal output.
    Terminal,
}

impl LogFormat {
    /// Builds a boxed layer in this format with the given filter, color mode and writer.
    ///
    /// Logs go to stdout unless a `file_writer` is given.
    pub fn apply<S>(
        &self,
        filter: EnvFilter,
        color: Option<String>,
        file_writer: Option<NonBlocking>,
    ) -> BoxedLayer<S>
    where
        S: Subscriber,
        for<'a> S: LookupSpan<'a>,
    {
        let ansi = color.as_deref().is_some_and(|color| color != "never");
        let target = std::env::var("RUST_LOG_TARGET").map(|val| val != "0").unwrap_or(true);

        match self {
            LogFormat::Json => {
                let layer =
                    tracing_subscriber::fmt::layer().json().with_ansi(ansi).with_target(target);

                if let Some(writer) = file_writer {
                    layer.with_writer(writer).with_filter(filter).boxed()
                } else {
                    layer.with_filter(filter).boxed()
                }
            }
            LogFormat::LogFmt => tracing_logfmt::layer().with_filter(filter).boxed(),
            LogFormat::Terminal => {
                let layer = tracing_subscriber::fmt::layer().with_ansi(ansi).with_target(target);

                if let Some(writer) = file_writer {
                    layer.with_writer(writer).with_filter(filter).boxed()
                } else {
                    layer.with_filter(filter).boxed()
                }
            }
        }
    }
}

impl Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogFormat::Json => write!(f, "json"),
            LogFormat::LogFmt => write!(f, "logfmt"),
            LogFormat::Terminal => write!(f, "terminal"),
        }
    }
}

/// Configuration of a single logging layer.
#[derive(Debug, Clone)]
pub struct LayerInfo {
    format: LogFormat,
    default_directive: String,
    filters: String,
    color: Option<String>,
}

impl LayerInfo {
    /// Creates a new [`LayerInfo`].
    ///
    /// `default_directive` is used when `RUST_LOG` is unset; `filters` is a comma separated list of
    /// additional directives; `color` is one of `always`, `auto` or `never`.
    pub fn new(
        format: LogFormat,
        default_directive: String,
        filters: String,
        color: Option<String>,
    ) -> Self {
        Self { format, default_directive, filters, color }
    }
}

impl Default for LayerInfo {
    fn default() -> Self {
        Self {
            format: LogFormat::Terminal,
            default_directive: "info".to_string(),
            filters: String::new(),
            color: Some("always".to_string()),
        }
    }
}

/// Where and how file logs are written.
#[derive(Debug, Clone)]
pub struct FileInfo {
    dir: PathBuf,
    file_name: String,
    max_size_bytes: u64,
    max_files: usize,
}

impl FileInfo {
    /// Creates a new [`FileInfo`]. Files are rotated after `max_size_bytes`, keeping at most
    /// `max_files` of them.
    pub fn new(dir: PathBuf, file_name: String, max_size_bytes: u64, max_files: usize) -> Self {
        Self { dir, file_name, max_size_bytes, max_files }
    }

    fn create_writer(&self) -> eyre::Result<(NonBlocking, FileWorkerGuard)> {
        std::fs::create_dir_all(&self.dir)?;
        let appender = BasicRollingFileAppender::new(
            self.dir.join(&self.file_name),
            RollingConditionBasic::new().max_size(self.max_size_bytes),
            self.max_files,
        )?;

        Ok(tracing_appender::non_blocking(appender))
    }
}

/// A type that can install itself as the global `tracing` subscriber.
pub trait Tracer {
    /// Installs the subscriber. Returns a guard that must be held for the file layer, if any.
    fn init(self) -> eyre::Result<Option<FileWorkerGuard>>;
}

/// The ferret tracer: a stdout layer and an optional file layer.
#[derive(Debug, Clone, Default)]
pub struct FerretTracer {
    stdout: LayerInfo,
    file: Option<(LayerInfo, FileInfo)>,
}

impl FerretTracer {
    /// Creates a tracer with the default terminal stdout layer and no file layer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the stdout layer configuration.
    pub fn with_stdout(mut self, config: LayerInfo) -> Self {
        self.stdout = config;
        self
    }

    /// Adds a file layer.
    pub fn with_file(mut self, config: LayerInfo, file: FileInfo) -> Self {
        self.file = Some((config, file));
        self
    }
}

impl Tracer for FerretTracer {
    fn init(self) -> eyre::Result<Option<FileWorkerGuard>> {
        let mut layers: Vec<BoxedLayer<Registry>> = Vec::new();

        let stdout_filter = build_env_filter(
            Some(self.stdout.default_directive.parse::<Directive>()?),
            &self.stdout.filters,
        )?;
        layers.push(self.stdout.format.apply(stdout_filter, self.stdout.color, None));

        let mut guard = None;
        if let Some((config, file)) = self.file {
            let (writer, file_guard) = file.create_writer()?;
            let file_filter = build_env_filter(
                Some(config.default_directive.parse::<Directive>()?),
                &config.filters,
            )?;
            layers.push(config.format.apply(file_filter, None, Some(writer)));
            guard = Some(file_guard);
        }

        tracing_subscriber::registry().with(layers).try_init()?;
        Ok(guard)
    }
}

/// Builds an [`EnvFilter`] from `RUST_LOG`, a default directive and a comma separated list of
/// extra directives.
pub fn build_env_filter(
    default_directive: Option<Directive>,
    directives: &str,
) -> eyre::Result<EnvFilter> {
    let env_filter = if let Some(default_directive) = default_directive {
        EnvFilter::builder().with_default_directive(default_directive).from_env_lossy()
    } else {
        EnvFilter::builder().from_env_lossy()
    };

    DEFAULT_ENV_FILTER_DIRECTIVES
        .into_iter()
        .chain(directives.split(',').map(str::trim).filter(|directive| !directive.is_empty()))
        .try_fold(env_filter, |env_filter, directive| {
            Ok(env_filter.add_directive(directive.parse()?))
        })
}

/// Installs a plain stderr subscriber filtered by `RUST_LOG`, for use in tests.
///
/// Safe to call more than once; only the first call installs a subscriber.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_format_display() {
        assert_eq!(LogFormat::Json.to_string(), "json");
        assert_eq!(LogFormat::LogFmt.to_string(), "logfmt");
        assert_eq!(LogFormat::Terminal.to_string(), "terminal");
    }

    #[test]
    fn test_build_env_filter_accepts_directives() {
        let filter = build_env_filter(
            Some("warn".parse().expect("valid directive")),
            "ferret_exec=trace, ferret_vm=debug",
        );
        assert!(filter.is_ok());
    }

    #[test]
    fn test_build_env_filter_rejects_garbage() {
        let filter = build_env_filter(None, "ferret_exec=notalevel");
        assert!(filter.is_err());
    }

    #[test]
    fn test_init_test_tracing_is_idempotent() {
        init_test_tracing();
        init_test_tracing();
    }
}
