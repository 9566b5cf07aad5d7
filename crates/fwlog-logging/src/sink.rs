//! JSON-lines sink
//!
//! A [`Logger`] renders one JSON object per record and writes it, newline
//! terminated, through a `tracing_subscriber` [`MakeWriter`]. Records below
//! the configured level are dropped before any work is done.
//!
//! Record layout, in key order: `level` (number) or `severity` (label),
//! `time`, `pid`, `name`, then child bindings and call fields after
//! redaction, then `msg`. Key order relies on serde_json's
//! `preserve_order` feature.

use std::fmt;
use std::io::Write;
use std::sync::Arc;

use chrono::{SecondsFormat, Utc};
use fwlog_core_types::schema::{
    FIELD_LEVEL, FIELD_MSG, FIELD_NAME, FIELD_PID, FIELD_SEVERITY, FIELD_TIME,
};
use fwlog_errors::{invalid_config, Result};
use serde_json::{Map, Value};
use tracing::Level;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::fmt::MakeWriter;

use crate::config::LoggerConfig;
use crate::redact::RedactionRules;

/// How the `time` field is rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimestampFormat {
    EpochMillis,
    Iso8601,
}

/// How the record level is rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelFormat {
    /// `"level": 30`
    Numeric,
    /// `"severity": "info"`
    Label,
}

/// Numeric level encoding
pub fn level_number(level: Level) -> u64 {
    match level {
        Level::TRACE => 10,
        Level::DEBUG => 20,
        Level::INFO => 30,
        Level::WARN => 40,
        _ => 50,
    }
}

/// Lowercase level label
pub fn level_label(level: Level) -> &'static str {
    match level {
        Level::TRACE => "trace",
        Level::DEBUG => "debug",
        Level::INFO => "info",
        Level::WARN => "warn",
        _ => "error",
    }
}

/// Parse a configured level name
///
/// Accepts tracing's names plus `silent` (off) and `fatal` (error).
///
/// # Errors
///
/// Returns `FwError::InvalidConfig` for an unknown level.
pub fn parse_level(level: &str) -> Result<LevelFilter> {
    match level.trim().to_ascii_lowercase().as_str() {
        "silent" => Ok(LevelFilter::OFF),
        "fatal" => Ok(LevelFilter::ERROR),
        other => other
            .parse::<LevelFilter>()
            .map_err(|e| invalid_config("level", format!("unknown level '{}': {}", level, e))),
    }
}

/// Builds a [`Logger`] from a configuration
pub struct LoggerBuilder {
    config: LoggerConfig,
    writer: Option<BoxMakeWriter>,
    redaction: Option<RedactionRules>,
}

impl LoggerBuilder {
    /// Write records through `writer` instead of stdout
    pub fn writer<W>(mut self, writer: W) -> Self
    where
        W: for<'a> MakeWriter<'a> + Send + Sync + 'static,
    {
        self.writer = Some(BoxMakeWriter::new(writer));
        self
    }

    /// Replace the rules derived from the configuration
    pub fn redaction(mut self, rules: RedactionRules) -> Self {
        self.redaction = Some(rules);
        self
    }

    /// # Errors
    ///
    /// Returns `FwError::InvalidConfig` for an unknown level or a malformed
    /// redaction path.
    pub fn build(self) -> Result<Logger> {
        let max_level = parse_level(&self.config.level)?;
        let redaction = match self.redaction {
            Some(rules) => rules,
            None => RedactionRules::standard().with_paths(&self.config.redact_paths)?,
        };
        let writer = self
            .writer
            .unwrap_or_else(|| BoxMakeWriter::new(std::io::stdout));
        Ok(Logger::assemble(&self.config, max_level, redaction, writer))
    }
}

struct SinkCore {
    name: String,
    max_level: LevelFilter,
    timestamp: TimestampFormat,
    level_format: LevelFormat,
    redaction: RedactionRules,
    writer: BoxMakeWriter,
}

struct LoggerInner {
    core: Arc<SinkCore>,
    bindings: Map<String, Value>,
}

/// Handle to a structured logger
///
/// Cheap to clone; clones refer to the same instance (see
/// [`Logger::ptr_eq`]).
#[derive(Clone)]
pub struct Logger {
    inner: Arc<LoggerInner>,
}

impl Logger {
    /// Build a logger writing to stdout
    ///
    /// # Errors
    ///
    /// See [`LoggerBuilder::build`].
    pub fn new(config: &LoggerConfig) -> Result<Self> {
        Self::builder(config.clone()).build()
    }

    pub fn builder(config: LoggerConfig) -> LoggerBuilder {
        LoggerBuilder {
            config,
            writer: None,
            redaction: None,
        }
    }

    fn assemble(
        config: &LoggerConfig,
        max_level: LevelFilter,
        redaction: RedactionRules,
        writer: BoxMakeWriter,
    ) -> Self {
        let core = SinkCore {
            name: config.name.clone(),
            max_level,
            timestamp: if config.iso_timestamp {
                TimestampFormat::Iso8601
            } else {
                TimestampFormat::EpochMillis
            },
            level_format: if config.use_severity_string {
                LevelFormat::Label
            } else {
                LevelFormat::Numeric
            },
            redaction,
            writer,
        };
        Self {
            inner: Arc::new(LoggerInner {
                core: Arc::new(core),
                bindings: Map::new(),
            }),
        }
    }

    /// Derive a logger that stamps `bindings` on every record
    ///
    /// The child shares this logger's sink, level and redaction rules.
    /// Non-object bindings are stored under `value`.
    pub fn child(&self, bindings: Value) -> Logger {
        let mut merged = self.inner.bindings.clone();
        merged.extend(into_fields(bindings));
        Logger {
            inner: Arc::new(LoggerInner {
                core: Arc::clone(&self.inner.core),
                bindings: merged,
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.inner.core.name
    }

    pub fn max_level(&self) -> LevelFilter {
        self.inner.core.max_level
    }

    pub fn timestamp_format(&self) -> TimestampFormat {
        self.inner.core.timestamp
    }

    pub fn level_format(&self) -> LevelFormat {
        self.inner.core.level_format
    }

    pub fn bindings(&self) -> &Map<String, Value> {
        &self.inner.bindings
    }

    pub fn enabled(&self, level: Level) -> bool {
        level <= self.inner.core.max_level
    }

    /// Whether two handles refer to the same logger instance
    pub fn ptr_eq(a: &Logger, b: &Logger) -> bool {
        Arc::ptr_eq(&a.inner, &b.inner)
    }

    /// Emit one record
    ///
    /// Object `fields` are merged into the record; `null` adds nothing;
    /// any other value is stored under `value`.
    ///
    /// # Errors
    ///
    /// Returns `FwError::Serialization` or `FwError::Io` when the record
    /// cannot be rendered or written.
    pub fn log(&self, level: Level, fields: Value, msg: &str) -> Result<()> {
        if !self.enabled(level) {
            return Ok(());
        }

        let record = self.render(level, fields, msg);
        let mut line = serde_json::to_vec(&record)?;
        line.push(b'\n');

        let mut writer = self.inner.core.writer.make_writer();
        writer.write_all(&line)?;
        Ok(())
    }

    fn render(&self, level: Level, fields: Value, msg: &str) -> Map<String, Value> {
        let core = &self.inner.core;

        let mut record = Map::new();
        match core.level_format {
            LevelFormat::Numeric => {
                record.insert(FIELD_LEVEL.to_string(), Value::from(level_number(level)));
            }
            LevelFormat::Label => {
                record.insert(FIELD_SEVERITY.to_string(), Value::from(level_label(level)));
            }
        }
        let time = match core.timestamp {
            TimestampFormat::EpochMillis => Value::from(Utc::now().timestamp_millis()),
            TimestampFormat::Iso8601 => {
                Value::from(Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true))
            }
        };
        record.insert(FIELD_TIME.to_string(), time);
        record.insert(FIELD_PID.to_string(), Value::from(std::process::id()));
        record.insert(FIELD_NAME.to_string(), Value::from(core.name.clone()));

        let mut body = self.inner.bindings.clone();
        body.extend(into_fields(fields));
        core.redaction.apply(&mut body);
        for (key, value) in body {
            // envelope fields win over caller fields of the same name
            if key != FIELD_MSG {
                record.entry(key).or_insert(value);
            }
        }

        record.insert(FIELD_MSG.to_string(), Value::from(msg));
        record
    }

    /// Emit a record, reporting sink failures as diagnostics
    fn emit(&self, level: Level, fields: Value, msg: &str) {
        if let Err(err) = self.log(level, fields, msg) {
            tracing::warn!(
                logger = %self.name(),
                code = err.code(),
                error = %err,
                "failed to write log record"
            );
        }
    }
}

macro_rules! level_methods {
    ($($level:ident => $plain:ident, $with:ident;)*) => {
        impl Logger {
            $(
                pub fn $plain(&self, msg: &str) {
                    self.emit(Level::$level, Value::Null, msg);
                }

                pub fn $with(&self, fields: Value, msg: &str) {
                    self.emit(Level::$level, fields, msg);
                }
            )*
        }
    };
}

level_methods! {
    TRACE => trace, trace_with;
    DEBUG => debug, debug_with;
    INFO => info, info_with;
    WARN => warn, warn_with;
    ERROR => error, error_with;
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("name", &self.inner.core.name)
            .field("max_level", &self.inner.core.max_level)
            .field("bindings", &self.inner.bindings)
            .finish()
    }
}

fn into_fields(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        Value::Null => Map::new(),
        other => {
            let mut map = Map::new();
            map.insert("value".to_string(), other);
            map
        }
    }
}
