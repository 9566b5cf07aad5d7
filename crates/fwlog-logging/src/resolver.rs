//! Context-scoped logger resolution
//!
//! [`get_logger`] returns the logger bound under [`ContextKey::Logger`] in
//! the active context when there is one, and otherwise the process-wide
//! default logger.
//!
//! The default logger is built lazily, at most once per process, by the
//! first caller that needs it. Its configuration comes from
//! [`configure_default`] when that was called beforehand, or from the
//! `LOGGER_*` environment otherwise. Once built it is never replaced.
//! A rejected configuration leaves it unbuilt; the sink error reaches the
//! caller and the next call tries again.

use std::future::Future;
use std::io;
use std::sync::{Arc, OnceLock};

use fwlog_core_types::schema::MSG_LOGGER_INITIALIZED;
use fwlog_errors::{already_initialized, Result};
use parking_lot::{const_mutex, Mutex};
use tokio::task::futures::TaskLocalFuture;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::fmt::MakeWriter;

use crate::config::LoggerConfig;
use crate::context::{self, Context, ContextKey};
use crate::sink::Logger;

static DEFAULT_LOGGER: OnceLock<Logger> = OnceLock::new();

/// Pending setup for the default logger; its lock also serializes
/// construction.
static DEFAULT_SETUP: Mutex<DefaultSetup> = const_mutex(DefaultSetup::empty());

struct DefaultSetup {
    config: Option<LoggerConfig>,
    writer: Option<SharedWriter>,
}

impl DefaultSetup {
    const fn empty() -> Self {
        Self {
            config: None,
            writer: None,
        }
    }
}

#[derive(Clone)]
struct SharedWriter(Arc<BoxMakeWriter>);

impl<'a> MakeWriter<'a> for SharedWriter {
    type Writer = Box<dyn io::Write + 'a>;

    fn make_writer(&'a self) -> Self::Writer {
        self.0.make_writer()
    }
}

/// The logger to use right now
///
/// # Panics
///
/// Panics when no override is bound and the default logger has to be
/// built from a configuration the sink rejects. Call [`try_get_logger`]
/// (or validate with it at startup) to handle that error instead.
pub fn get_logger() -> Logger {
    match try_get_logger() {
        Ok(logger) => logger,
        Err(err) => panic!("default logger could not be built: {}", err),
    }
}

/// Like [`get_logger`], but returns sink construction errors unmodified
///
/// # Errors
///
/// Returns `FwError::InvalidConfig` when the default logger has to be
/// built and its configuration is rejected.
pub fn try_get_logger() -> Result<Logger> {
    if let Some(logger) = context::get::<Logger>(ContextKey::Logger) {
        return Ok(logger);
    }
    default_logger()
}

/// Whether the default logger has been built
pub fn default_initialized() -> bool {
    DEFAULT_LOGGER.get().is_some()
}

/// Pin the configuration the default logger will be built from
///
/// # Errors
///
/// Returns `FwError::AlreadyInitialized` once the default logger exists.
pub fn configure_default(config: LoggerConfig) -> Result<()> {
    let mut setup = DEFAULT_SETUP.lock();
    if default_initialized() {
        return Err(already_initialized("default logger"));
    }
    setup.config = Some(config);
    Ok(())
}

/// Pin both configuration and output of the default logger
///
/// # Errors
///
/// Returns `FwError::AlreadyInitialized` once the default logger exists.
pub fn configure_default_with_writer<W>(config: LoggerConfig, writer: W) -> Result<()>
where
    W: for<'a> MakeWriter<'a> + Send + Sync + 'static,
{
    let mut setup = DEFAULT_SETUP.lock();
    if default_initialized() {
        return Err(already_initialized("default logger"));
    }
    setup.config = Some(config);
    setup.writer = Some(SharedWriter(Arc::new(BoxMakeWriter::new(writer))));
    Ok(())
}

fn default_logger() -> Result<Logger> {
    if let Some(logger) = DEFAULT_LOGGER.get() {
        return Ok(logger.clone());
    }

    let setup = DEFAULT_SETUP.lock();
    if let Some(logger) = DEFAULT_LOGGER.get() {
        return Ok(logger.clone());
    }

    let config = match &setup.config {
        Some(config) => config.clone(),
        None => LoggerConfig::from_env()?,
    };
    let mut builder = Logger::builder(config);
    if let Some(writer) = &setup.writer {
        builder = builder.writer(writer.clone());
    }
    let logger = builder.build().map_err(|err| {
        tracing::error!(code = err.code(), error = %err, "default logger configuration rejected");
        err
    })?;
    let logger = DEFAULT_LOGGER.get_or_init(|| logger).clone();

    tracing::debug!(
        logger = %logger.name(),
        max_level = %logger.max_level(),
        "default logger constructed"
    );
    logger.debug(MSG_LOGGER_INITIALIZED);
    Ok(logger)
}

/// Bind `logger` as the override for the active context
///
/// # Errors
///
/// Returns `FwError::NoActiveContext` when called outside any context.
pub fn set_logger_override(logger: Logger) -> Result<()> {
    context::set(ContextKey::Logger, logger)
}

/// Run `f` in a new context whose override is `logger`
pub fn with_logger<F, R>(logger: Logger, f: F) -> R
where
    F: FnOnce() -> R,
{
    let context = Context::child_of_current();
    context.insert(ContextKey::Logger, logger);
    context.sync_scope(f)
}

/// Run `fut` in a new context whose override is `logger`
pub fn with_logger_async<F: Future>(logger: Logger, fut: F) -> TaskLocalFuture<Context, F> {
    let context = Context::child_of_current();
    context.insert(ContextKey::Logger, logger);
    context.scope(fut)
}
