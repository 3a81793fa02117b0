//! Structured logging.
//!
//! # Responsibilities
//! - Open the append-only log file
//! - Fan every record out to stdout and the log file
//! - Attach the current request's correlation ID to each record
//!
//! # Design Decisions
//! - Uses tracing crate for structured logging
//! - JSON format for production, text format for development
//! - Log level configurable via config and `RUST_LOG`
//! - The request ID lives on the per-request span; the JSON formatter
//!   includes the current span and lifts its `request_id` to the top level
//!   of the record, so call sites never pass it explicitly

use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{Event, Subscriber};
use tracing_subscriber::fmt::format::{Format, Json, JsonFields, Writer};
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::fmt::{self, FmtContext, FormatEvent, FormatFields, MakeWriter};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::EnvFilter;

use crate::config::{LogFormat, LoggingConfig};

/// Errors raised while setting up logging.
#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("failed to open log file {path}: {source}")]
    OpenFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to install log subscriber: {0}")]
    Install(#[from] TryInitError),
}

/// Open `path` for appending, creating it (and its directory) if absent.
pub fn open_log_file(path: &Path) -> Result<File, LoggingError> {
    let open_error = |source| LoggingError::OpenFile {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(open_error)?;
    }

    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(open_error)
}

/// Field carrying the correlation ID on the request span.
pub const REQUEST_ID_FIELD: &str = "request_id";

/// JSON event format that copies the current span's `request_id` into the
/// top level of each record.
#[derive(Debug)]
pub struct CorrelatedJson {
    inner: Format<Json>,
}

impl Default for CorrelatedJson {
    fn default() -> Self {
        Self {
            inner: fmt::format()
                .json()
                .flatten_event(true)
                .with_current_span(true)
                .with_span_list(false),
        }
    }
}

impl<S, N> FormatEvent<S, N> for CorrelatedJson
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'w> FormatFields<'w> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> std::fmt::Result {
        let mut line = String::new();
        self.inner.format_event(ctx, Writer::new(&mut line), event)?;

        let Ok(mut record) = serde_json::from_str::<Map<String, Value>>(&line) else {
            return writer.write_str(&line);
        };
        let request_id = record
            .get("span")
            .and_then(|span| span.get(REQUEST_ID_FIELD))
            .cloned();
        match request_id {
            Some(id) if !record.contains_key(REQUEST_ID_FIELD) => {
                record.insert(REQUEST_ID_FIELD.to_owned(), id);
                let line = serde_json::to_string(&record).map_err(|_| std::fmt::Error)?;
                writeln!(writer, "{line}")
            }
            _ => writer.write_str(&line),
        }
    }
}

/// The JSON record layer used in production.
///
/// Event fields are flattened into the record, the current span is attached
/// under `span`, and its `request_id` (set while a request is in flight) is
/// repeated at the top level.
pub fn json_layer<S, W>(make_writer: W) -> fmt::Layer<S, JsonFields, CorrelatedJson, W>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    W: for<'w> MakeWriter<'w> + 'static,
{
    fmt::layer()
        .fmt_fields(JsonFields::new())
        .event_format(CorrelatedJson::default())
        .with_writer(make_writer)
}

/// Install the global subscriber writing to stdout and the configured file.
pub fn init(config: &LoggingConfig) -> Result<(), LoggingError> {
    let file = open_log_file(&config.file)?;
    let writer = io::stdout.and(Arc::new(file));

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.level));
    let registry = tracing_subscriber::registry().with(filter);

    match config.format {
        LogFormat::Json => registry.with(json_layer(writer)).try_init()?,
        LogFormat::Text => registry
            .with(fmt::layer().with_ansi(false).with_writer(writer))
            .try_init()?,
    }

    Ok(())
}

/// Best-effort subscriber on stderr, used to report startup failures when
/// [`init`] could not run.
pub fn init_stderr() {
    let _ = tracing_subscriber::registry()
        .with(EnvFilter::new("info"))
        .with(fmt::layer().with_writer(io::stderr))
        .try_init();
}
