//! Context-scoped structured logging for fwlog
//!
//! This crate provides:
//! - A context store binding typed values to the logical unit of work
//!   (request, job) currently executing, across `.await` points and into
//!   spawned continuations
//! - A process-wide default logger built lazily, exactly once
//! - Per-context logger overrides resolved by [`get_logger`]
//! - A JSON-lines sink with credential redaction
//! - Test capture for deterministic assertions on emitted records
//!
//! # Usage
//!
//! ```rust
//! use fwlog_logging::{get_logger, with_logger};
//! use serde_json::json;
//!
//! // Outside any context the default logger is used.
//! get_logger().info("service starting");
//!
//! // Inside a request, bind a child logger as the override.
//! let request_logger = get_logger().child(json!({ "request_id": "r-1" }));
//! with_logger(request_logger, || {
//!     get_logger().info_with(json!({ "url": "/orders?access_token=abc" }), "handled");
//! });
//! ```

pub mod capture;
pub mod config;
pub mod context;
pub mod diagnostics;
#[doc(hidden)]
pub mod macros;
pub mod redact;
pub mod resolver;
pub mod sink;

pub use capture::TestCapture;
pub use config::LoggerConfig;
pub use context::{
    current_context, run_in_new_context, run_in_new_context_async, Context, ContextKey,
};
pub use fwlog_core_types::schema;
pub use redact::RedactionRules;
pub use resolver::{
    configure_default, configure_default_with_writer, default_initialized, get_logger,
    set_logger_override, try_get_logger, with_logger, with_logger_async,
};
pub use sink::{Logger, LoggerBuilder};
pub use tracing::Level;
pub use tracing_subscriber::filter::LevelFilter;

#[doc(hidden)]
pub use serde_json;
