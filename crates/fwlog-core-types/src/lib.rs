//! Core types shared across fwlog crates
//!
//! This crate provides foundational types used by both error handling
//! and the logging facility:
//!
//! - **Correlation types**: RequestId, ContextId
//! - **Sensitive data**: Sensitive<T> marker that always renders censored
//! - **Schema constants**: Canonical record field keys, event names and
//!   redaction paths

pub mod correlation;
pub mod schema;
pub mod sensitive;

pub use correlation::{ContextId, RequestId};
pub use sensitive::Sensitive;
