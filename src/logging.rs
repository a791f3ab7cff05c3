//! Logging integration that prints each record as a one-row table.
//!
//! Columns are time, level, message and source location. A multi-line
//! message stays in its column, so continuation lines keep the hanging
//! indent of the first one.
//!
//! Optional tracing integration is available via `TableTracingLayer` when
//! the `tracing` feature is enabled.

use std::cell::Cell;
use std::io::{self, Write};
use std::sync::Mutex;

use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use time::{OffsetDateTime, format_description::OwnedFormatItem};

use crate::r#box::BorderStyle;
use crate::grid::Table;
use crate::sync::lock_recover;

const DEFAULT_TIME_FORMAT: &str = "[hour]:[minute]:[second]";

thread_local! {
    /// Set while this thread formats or writes a record.
    static FORMATTING: Cell<bool> = const { Cell::new(false) };
}

/// Table-formatted logger for the `log` crate.
///
/// # Thread Safety
///
/// The output sink sits behind a mutex with poison recovery, so records from
/// concurrent threads are written whole and never interleave.
pub struct TableLogger {
    sink: Mutex<Box<dyn Write + Send>>,
    level: LevelFilter,
    show_time: bool,
    show_level: bool,
    show_path: bool,
    separator: BorderStyle,
    time_format: OwnedFormatItem,
}

impl Default for TableLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl TableLogger {
    /// Create a logger writing to stderr.
    #[must_use]
    pub fn new() -> Self {
        Self::with_writer(io::stderr())
    }

    /// Create a logger writing to `writer`.
    #[must_use]
    pub fn with_writer(writer: impl Write + Send + 'static) -> Self {
        let time_format = time::format_description::parse_owned::<2>(DEFAULT_TIME_FORMAT)
            .unwrap_or_else(|_| OwnedFormatItem::StringLiteral(String::new().into_boxed_str()));
        Self {
            sink: Mutex::new(Box::new(writer)),
            level: LevelFilter::Info,
            show_time: true,
            show_level: true,
            show_path: true,
            separator: BorderStyle::Single,
            time_format,
        }
    }

    /// Set the minimum log level.
    #[must_use]
    pub fn level(mut self, level: LevelFilter) -> Self {
        self.level = level;
        self
    }

    /// Enable or disable the time column.
    #[must_use]
    pub fn show_time(mut self, show: bool) -> Self {
        self.show_time = show;
        self
    }

    /// Enable or disable the level column.
    #[must_use]
    pub fn show_level(mut self, show: bool) -> Self {
        self.show_level = show;
        self
    }

    /// Enable or disable the `file:line` column.
    #[must_use]
    pub fn show_path(mut self, show: bool) -> Self {
        self.show_path = show;
        self
    }

    /// Border drawn between columns. With [`BorderStyle::None`] columns are
    /// separated by a space.
    #[must_use]
    pub fn separator(mut self, style: BorderStyle) -> Self {
        self.separator = style;
        self
    }

    /// Override the time format (`time` crate format description).
    ///
    /// An invalid description keeps the current format.
    #[must_use]
    pub fn time_format(mut self, format: &str) -> Self {
        if let Ok(parsed) = time::format_description::parse_owned::<2>(format) {
            self.time_format = parsed;
        }
        self
    }

    /// Install as the global logger.
    ///
    /// # Errors
    ///
    /// Fails if a global logger is already installed.
    pub fn init(self) -> Result<(), SetLoggerError> {
        log::set_max_level(self.level);
        log::set_boxed_logger(Box::new(self))
    }

    fn format_time(&self) -> String {
        let now = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
        now.format(&self.time_format)
            .unwrap_or_else(|_| now.to_string())
    }

    fn format_record(&self, record: &Record<'_>) -> String {
        let mut columns = Vec::with_capacity(4);
        if self.show_time {
            columns.push(self.format_time());
        }
        if self.show_level {
            columns.push(format!("{:<5}", record.level()));
        }
        columns.push(record.args().to_string());
        if self.show_path
            && let Some(file) = record.file()
        {
            columns.push(match record.line() {
                Some(line) => format!("{file}:{line}"),
                None => file.to_string(),
            });
        }

        let gap = if self.separator.is_drawn() { "" } else { " " };
        let last = columns.len() - 1;
        let mut table = Table::new();
        for (index, column) in columns.into_iter().enumerate() {
            if index == last {
                table.add_cell_owned(column);
            } else {
                table.add_cell_owned(column + gap);
            }
        }
        table.set_all_vlines(self.separator);
        table.render_to_string()
    }

    fn emit(&self, record: &Record<'_>) {
        // Records raised while emitting, e.g. bridged back from tracing,
        // are dropped
        if FORMATTING.replace(true) {
            return;
        }
        let rendered = self.format_record(record);
        {
            let mut sink = lock_recover(&self.sink);
            // A logger has nowhere to report its own write failures
            let _ = sink.write_all(rendered.as_bytes());
        }
        FORMATTING.set(false);
    }

    fn level_enabled(&self, level: Level) -> bool {
        level <= self.level
    }

    /// Whether a record from `target` at `level` is printed.
    ///
    /// Records from this crate are dropped: rendering a record logs through
    /// the solver and renderer, which would feed back into the logger.
    fn accepts(&self, level: Level, target: &str) -> bool {
        self.level_enabled(level) && !is_own_target(target)
    }
}

fn is_own_target(target: &str) -> bool {
    let crate_name = env!("CARGO_CRATE_NAME");
    target
        .strip_prefix(crate_name)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with("::"))
}

impl Log for TableLogger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        self.accepts(metadata.level(), metadata.target())
    }

    fn log(&self, record: &Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }
        self.emit(record);
    }

    fn flush(&self) {
        let _ = lock_recover(&self.sink).flush();
    }
}

#[cfg(feature = "tracing")]
mod tracing_integration {
    use super::TableLogger;
    use log::Level;
    use std::fmt::Debug;

    use tracing::field::{Field, Visit};
    use tracing::{Event, Level as TracingLevel, Subscriber};
    use tracing_subscriber::{Layer, layer::Context};

    /// Tracing layer that prints events through a [`TableLogger`].
    pub struct TableTracingLayer {
        logger: TableLogger,
    }

    impl Default for TableTracingLayer {
        fn default() -> Self {
            Self::new()
        }
    }

    impl TableTracingLayer {
        /// Create a tracing layer backed by a default `TableLogger`.
        #[must_use]
        pub fn new() -> Self {
            Self {
                logger: TableLogger::new(),
            }
        }

        /// Use an existing logger configuration.
        #[must_use]
        pub fn with_logger(logger: TableLogger) -> Self {
            Self { logger }
        }

        /// Install as the global tracing subscriber.
        ///
        /// # Errors
        ///
        /// Fails if a global subscriber is already installed.
        pub fn init(self) -> Result<(), tracing::subscriber::SetGlobalDefaultError> {
            use tracing_subscriber::prelude::*;

            let subscriber = tracing_subscriber::registry().with(self);
            tracing::subscriber::set_global_default(subscriber)
        }
    }

    #[derive(Default)]
    struct EventVisitor {
        message: Option<String>,
        fields: Vec<(String, String)>,
    }

    impl EventVisitor {
        /// Message followed by `key=value` pairs.
        fn into_message(self) -> String {
            let extra = self
                .fields
                .iter()
                .map(|(k, v)| format!("{k}={v}"))
                .collect::<Vec<_>>()
                .join(" ");
            match self.message {
                Some(message) if extra.is_empty() => message,
                Some(message) => format!("{message} {extra}"),
                None => extra,
            }
        }
    }

    impl Visit for EventVisitor {
        fn record_debug(&mut self, field: &Field, value: &dyn Debug) {
            let rendered = format!("{value:?}");
            let rendered = strip_quotes(&rendered).to_string();
            if field.name() == "message" {
                self.message = Some(rendered);
            } else {
                self.fields.push((field.name().to_string(), rendered));
            }
        }
    }

    impl<S> Layer<S> for TableTracingLayer
    where
        S: Subscriber,
    {
        fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
            let metadata = event.metadata();
            let level = map_tracing_level(*metadata.level());
            if !self.logger.accepts(level, metadata.target()) {
                return;
            }

            let mut visitor = EventVisitor::default();
            event.record(&mut visitor);
            let message = visitor.into_message();

            self.logger.emit(
                &log::Record::builder()
                    .args(format_args!("{message}"))
                    .level(level)
                    .target(metadata.target())
                    .file(metadata.file())
                    .line(metadata.line())
                    .module_path(metadata.module_path())
                    .build(),
            );
        }
    }

    fn map_tracing_level(level: TracingLevel) -> Level {
        match level {
            TracingLevel::TRACE => Level::Trace,
            TracingLevel::DEBUG => Level::Debug,
            TracingLevel::INFO => Level::Info,
            TracingLevel::WARN => Level::Warn,
            TracingLevel::ERROR => Level::Error,
        }
    }

    fn strip_quotes(value: &str) -> &str {
        if value.len() >= 2 && value.starts_with('"') && value.ends_with('"') {
            &value[1..value.len() - 1]
        } else {
            value
        }
    }

}

#[cfg(feature = "tracing")]
pub use tracing_integration::TableTracingLayer;
