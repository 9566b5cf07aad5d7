//! Error facility for fwlog
//!
//! A single `FwError` type covers every failure the logging facility can
//! surface. Each variant maps to a stable `FwErrorKind` and `ERR_*` code
//! that callers and tests can match on without parsing messages.

use thiserror::Error;

/// Result type alias using FwError
pub type Result<T> = std::result::Result<T, FwError>;

/// Canonical error kind taxonomy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FwErrorKind {
    // Context store
    NoActiveContext,
    BindingType,

    // Configuration
    InvalidConfig,
    AlreadyInitialized,

    // Emission
    Io,
    Serialization,
}

impl FwErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            FwErrorKind::NoActiveContext => "ERR_NO_ACTIVE_CONTEXT",
            FwErrorKind::BindingType => "ERR_BINDING_TYPE",
            FwErrorKind::InvalidConfig => "ERR_INVALID_CONFIG",
            FwErrorKind::AlreadyInitialized => "ERR_ALREADY_INITIALIZED",
            FwErrorKind::Io => "ERR_IO",
            FwErrorKind::Serialization => "ERR_SERIALIZATION",
        }
    }
}

/// Errors surfaced by the context store, configuration loading and the sink
#[derive(Error, Debug)]
pub enum FwError {
    /// A binding was written while no logical execution context was active
    #[error("could not set {key}: no active context")]
    NoActiveContext { key: String },

    /// A binding was written with a value of the wrong type for its key
    #[error("could not set {key}: expected {expected}, got {found}")]
    BindingType {
        key: String,
        expected: String,
        found: String,
    },

    /// Logger configuration could not be loaded or was rejected by the sink
    #[error("invalid logger configuration for '{field}': {reason}")]
    InvalidConfig { field: String, reason: String },

    /// A process-wide value was configured after it had been built
    #[error("{what} is already initialized")]
    AlreadyInitialized { what: String },

    /// Writing a record to the sink failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A record could not be serialized
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl FwError {
    /// Get the error kind
    pub fn kind(&self) -> FwErrorKind {
        match self {
            FwError::NoActiveContext { .. } => FwErrorKind::NoActiveContext,
            FwError::BindingType { .. } => FwErrorKind::BindingType,
            FwError::InvalidConfig { .. } => FwErrorKind::InvalidConfig,
            FwError::AlreadyInitialized { .. } => FwErrorKind::AlreadyInitialized,
            FwError::Io(_) => FwErrorKind::Io,
            FwError::Serialization(_) => FwErrorKind::Serialization,
        }
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind().code()
    }
}

/// Create a no-active-context error for the given binding key
pub fn no_active_context(key: impl std::fmt::Display) -> FwError {
    FwError::NoActiveContext {
        key: key.to_string(),
    }
}

/// Create a binding-type error for the given key
pub fn binding_type(key: impl std::fmt::Display, expected: &str, found: &str) -> FwError {
    FwError::BindingType {
        key: key.to_string(),
        expected: expected.to_string(),
        found: found.to_string(),
    }
}

/// Create a configuration error
pub fn invalid_config(field: &str, reason: impl Into<String>) -> FwError {
    FwError::InvalidConfig {
        field: field.to_string(),
        reason: reason.into(),
    }
}

/// Create an already-initialized error
pub fn already_initialized(what: &str) -> FwError {
    FwError::AlreadyInitialized {
        what: what.to_string(),
    }
}
