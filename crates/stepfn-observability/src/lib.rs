// Copyright 2025 DataStax Inc.
//
// Licensed under the Apache License, Version 2.0 (the "License"); you may not use this file except
// in compliance with the License. You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software distributed under the License
// is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express
// or implied. See the License for the specific language governing permissions and limitations under
// the License.

//! Observability infrastructure for stepfn
//!
//! - Logging via the `log` crate, dispatched through `logforth`
//! - Tracing via `fastrace`, reported to the console
//!
//! Log records carry the `trace_id`/`span_id` of the current span and the
//! execution id and branch index of the parallel state being run.

pub use fastrace;
pub use log;

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

mod branch_diagnostic_context;
pub use branch_diagnostic_context::{
    BranchDiagnostic, BranchGuard, ExecutionIdGuard, get_branch, get_execution_id,
};

/// Configuration for observability (logging + tracing)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ObservabilityConfig {
    /// Log level filter for stepfn crates.
    pub log_level: log::LevelFilter,

    /// Log level filter for non-stepfn crates (e.g., dependencies).
    /// When None, uses the same level as log_level.
    pub other_log_level: Option<log::LevelFilter>,

    /// Log output destination.
    pub log_destination: LogDestinationType,

    /// Log output format.
    pub log_format: LogFormat,

    /// Directory for log files (only applies when log_destination is file).
    pub log_directory: Option<PathBuf>,

    /// Report fastrace spans to the console.
    pub trace_enabled: bool,

    /// Attach execution id and branch index to every log record.
    pub include_branch_diagnostic: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: log::LevelFilter::Info,
            other_log_level: None,
            log_destination: LogDestinationType::Stdout,
            log_format: LogFormat::Text,
            log_directory: None,
            trace_enabled: false,
            include_branch_diagnostic: true,
        }
    }
}

impl ObservabilityConfig {
    /// Validate the configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        match self.log_destination {
            LogDestinationType::File => {
                if self.log_directory.is_none() {
                    return Err(
                        error_stack::report!(ObservabilityError::ConfigValidationError)
                            .attach_printable("logDestination is 'file' but logDirectory is not set"),
                    );
                }
            }
            LogDestinationType::Stdout => {
                if self.log_directory.is_some() {
                    return Err(
                        error_stack::report!(ObservabilityError::ConfigValidationError)
                            .attach_printable("logDestination is 'stdout' but logDirectory is set"),
                    );
                }
            }
        }
        Ok(())
    }

    fn log_destination(&self) -> Result<LogDestination<'_>> {
        match (self.log_destination, &self.log_directory) {
            (LogDestinationType::Stdout, _) => Ok(LogDestination::Stdout),
            (LogDestinationType::File, Some(directory)) => Ok(LogDestination::File(directory)),
            (LogDestinationType::File, None) => {
                Err(error_stack::report!(ObservabilityError::ConfigValidationError))
            }
        }
    }
}

/// Log output format
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Structured JSON logs
    Json,
    /// Human-readable text logs
    Text,
}

/// Log destination type (configuration value)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogDestinationType {
    /// Log to stdout
    Stdout,
    /// Log to files in a directory
    File,
}

#[derive(Debug, PartialEq, Eq, Copy, Clone)]
enum LogDestination<'a> {
    Stdout,
    File(&'a Path),
}

/// Initialize observability (logging + tracing)
///
/// Returns a guard that must be closed before it is dropped.
///
/// # Example
///
/// ```no_run
/// use stepfn_observability::{ObservabilityConfig, LogFormat, init_observability};
///
/// # async fn run() {
/// let config = ObservabilityConfig {
///     log_format: LogFormat::Json,
///     other_log_level: Some(log::LevelFilter::Warn),
///     ..ObservabilityConfig::default()
/// };
///
/// let guard = init_observability(&config).unwrap();
/// log::info!("Engine started");
/// guard.close().await.unwrap();
/// # }
/// ```
pub fn init_observability(config: &ObservabilityConfig) -> Result<ObservabilityGuard> {
    config.validate()?;

    // Tracing first so the logger can pick up span context.
    let trace_guard = if config.trace_enabled {
        fastrace::set_reporter(
            fastrace::collector::ConsoleReporter,
            fastrace::collector::Config::default(),
        );
        Some(TraceGuard)
    } else {
        None
    };

    init_logging(config)?;

    Ok(ObservabilityGuard {
        trace_guard,
        closed: false,
    })
}

fn level_to_str(level: log::LevelFilter) -> &'static str {
    match level {
        log::LevelFilter::Off => "off",
        log::LevelFilter::Error => "error",
        log::LevelFilter::Warn => "warn",
        log::LevelFilter::Info => "info",
        log::LevelFilter::Debug => "debug",
        log::LevelFilter::Trace => "trace",
    }
}

/// Env-filter specs for the dispatch chains: one chain when other_log_level
/// is unset, otherwise one for stepfn crates and one for everything else.
fn filter_specs(config: &ObservabilityConfig) -> Vec<String> {
    match config.other_log_level {
        Some(other_level) => vec![
            format!("stepfn_={}", level_to_str(config.log_level)),
            format!("{},stepfn_=off", level_to_str(other_level)),
        ],
        None => vec![level_to_str(config.log_level).to_string()],
    }
}

fn init_logging(config: &ObservabilityConfig) -> Result<()> {
    let destination = config.log_destination()?;

    // /dev/null discards logs (used in tests).
    if let LogDestination::File(path) = destination
        && path == Path::new("/dev/null")
    {
        return Ok(());
    }

    let mut builder = logforth::starter_log::builder();
    for spec in filter_specs(config) {
        let appender = create_appender(destination, config.log_format)?;
        builder = add_dispatch(&spec, config.include_branch_diagnostic, appender, builder);
    }
    builder.apply();

    Ok(())
}

#[must_use]
fn add_dispatch(
    filter_spec: &str,
    include_branch_diagnostic: bool,
    appender: Box<dyn logforth::Append>,
    builder: logforth::starter_log::LogStarterBuilder,
) -> logforth::starter_log::LogStarterBuilder {
    use logforth::diagnostic::FastraceDiagnostic;
    use logforth::filter::env_filter::EnvFilterBuilder;

    let filter = EnvFilterBuilder::from_spec(filter_spec).build();

    builder.dispatch(move |d| {
        let mut d = d.filter(filter).diagnostic(FastraceDiagnostic::default());
        if include_branch_diagnostic {
            d = d.diagnostic(BranchDiagnostic);
        }
        d.append(appender)
    })
}

fn create_appender(
    destination: LogDestination<'_>,
    format: LogFormat,
) -> Result<Box<dyn logforth::Append>> {
    use logforth::append;
    use logforth::layout::{JsonLayout, TextLayout};

    let appender: Box<dyn logforth::Append> = match (destination, format) {
        (LogDestination::Stdout, LogFormat::Json) => {
            Box::new(append::Stdout::default().with_layout(JsonLayout::default()))
        }
        (LogDestination::Stdout, LogFormat::Text) => {
            Box::new(append::Stdout::default().with_layout(TextLayout::default()))
        }
        (LogDestination::File(directory), LogFormat::Json) => Box::new(
            append::file::FileBuilder::new(directory.to_path_buf(), "stepfn")
                .layout(JsonLayout::default())
                .build()
                .map_err(|e| {
                    error_stack::report!(ObservabilityError::LogInitError)
                        .attach_printable(format!("Failed to create file appender: {e}"))
                })?,
        ),
        (LogDestination::File(directory), LogFormat::Text) => Box::new(
            append::file::FileBuilder::new(directory.to_path_buf(), "stepfn")
                .layout(TextLayout::default())
                .build()
                .map_err(|e| {
                    error_stack::report!(ObservabilityError::LogInitError)
                        .attach_printable(format!("Failed to create file appender: {e}"))
                })?,
        ),
    };
    Ok(appender)
}

/// Guard that ensures logs and spans are flushed.
///
/// # Important
///
/// You must call [`ObservabilityGuard::close()`] before dropping this guard.
/// Dropping it unclosed panics.
pub struct ObservabilityGuard {
    trace_guard: Option<TraceGuard>,
    closed: bool,
}

impl ObservabilityGuard {
    /// Flush pending logs and spans.
    pub async fn close(mut self) -> Result<()> {
        self.closed = true;

        log::logger().flush();

        if self.trace_guard.is_some() {
            fastrace::flush();
            // Let the reporter drain before the runtime goes away.
            tokio::task::yield_now().await;
        }

        Ok(())
    }

    /// Leak the guard without flushing.
    ///
    /// Intended for tests that don't care about flushing.
    #[doc(hidden)]
    pub fn leak(mut self) {
        self.closed = true;
        std::mem::forget(self);
    }
}

impl Drop for ObservabilityGuard {
    fn drop(&mut self) {
        if !self.closed {
            panic!(
                "ObservabilityGuard must be explicitly closed by calling .close() before dropping."
            );
        }
    }
}

struct TraceGuard;

/// Errors that can occur during observability initialization
#[derive(Debug, thiserror::Error)]
pub enum ObservabilityError {
    #[error("Failed to initialize logging")]
    LogInitError,
    #[error("Invalid observability configuration")]
    ConfigValidationError,
}

pub type Result<T> = std::result::Result<T, error_stack::Report<ObservabilityError>>;
