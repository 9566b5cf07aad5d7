//! Canonical schema constants for emitted log records
//!
//! These constants keep record field names, event names and redaction
//! paths consistent across the logging facility and its callers.

// Record envelope fields
pub const FIELD_LEVEL: &str = "level";
pub const FIELD_SEVERITY: &str = "severity";
pub const FIELD_TIME: &str = "time";
pub const FIELD_PID: &str = "pid";
pub const FIELD_NAME: &str = "name";
pub const FIELD_MSG: &str = "msg";

// Operation fields
pub const FIELD_COMPONENT: &str = "component";
pub const FIELD_OP: &str = "op";
pub const FIELD_EVENT: &str = "event";
pub const FIELD_DURATION_MS: &str = "duration_ms";
pub const FIELD_REQUEST_ID: &str = "request_id";

// Error fields
pub const FIELD_ERR_KIND: &str = "err_kind";
pub const FIELD_ERR_CODE: &str = "err_code";
pub const FIELD_ERR: &str = "err";

// Canonical event names
pub const EVENT_START: &str = "start";
pub const EVENT_END: &str = "end";
pub const EVENT_END_ERROR: &str = "end_error";

/// Message of the record emitted once by a freshly built default logger
pub const MSG_LOGGER_INITIALIZED: &str = "Logger initialized";

/// Replacement text written over censored values
pub const CENSOR: &str = "***";

// Redaction paths installed on every default logger
pub const PATH_URL: &str = "url";
pub const PATH_REQ_AUTHORIZATION: &str = "req.authorization";
