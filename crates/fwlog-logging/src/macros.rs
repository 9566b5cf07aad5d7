//! Canonical operation logging macros
//!
//! These macros emit operation boundary records through [`get_logger`],
//! so they honour the active context's logger override.
//!
//! [`get_logger`]: crate::get_logger

use fwlog_core_types::schema::{
    FIELD_COMPONENT, FIELD_DURATION_MS, FIELD_ERR, FIELD_ERR_CODE, FIELD_ERR_KIND, FIELD_EVENT,
    FIELD_OP,
};
use fwlog_errors::FwError;
use serde_json::{Map, Value};

#[doc(hidden)]
pub fn op_fields(component: &str, op: &str, event: &str, extra: Value) -> Value {
    let mut fields = match extra {
        Value::Object(map) => map,
        _ => Map::new(),
    };
    fields.insert(FIELD_COMPONENT.to_string(), Value::from(component));
    fields.insert(FIELD_OP.to_string(), Value::from(op));
    fields.insert(FIELD_EVENT.to_string(), Value::from(event));
    Value::Object(fields)
}

#[doc(hidden)]
pub fn with_duration(fields: Value, duration_ms: u64) -> Value {
    let mut fields = fields;
    if let Value::Object(map) = &mut fields {
        map.insert(FIELD_DURATION_MS.to_string(), Value::from(duration_ms));
    }
    fields
}

#[doc(hidden)]
pub fn with_error(fields: Value, err: &FwError) -> Value {
    let mut fields = fields;
    if let Value::Object(map) = &mut fields {
        map.insert(
            FIELD_ERR_KIND.to_string(),
            Value::from(format!("{:?}", err.kind())),
        );
        map.insert(FIELD_ERR_CODE.to_string(), Value::from(err.code()));
        map.insert(FIELD_ERR.to_string(), Value::from(err.to_string()));
    }
    fields
}

/// Log the start of an operation
///
/// # Example
///
/// ```
/// # use fwlog_logging::log_op_start;
/// log_op_start!("charge_card");
/// log_op_start!("charge_card", { "order_id": "o-1" });
/// ```
#[macro_export]
macro_rules! log_op_start {
    ($op:expr) => {
        $crate::log_op_start!($op, {})
    };
    ($op:expr, { $($extra:tt)* }) => {
        $crate::get_logger().info_with(
            $crate::macros::op_fields(
                module_path!(),
                $op,
                $crate::schema::EVENT_START,
                $crate::serde_json::json!({ $($extra)* }),
            ),
            $op,
        )
    };
}

/// Log the successful end of an operation
///
/// # Example
///
/// ```
/// # use fwlog_logging::log_op_end;
/// log_op_end!("charge_card", duration_ms = 42);
/// ```
#[macro_export]
macro_rules! log_op_end {
    ($op:expr, duration_ms = $duration:expr) => {
        $crate::log_op_end!($op, duration_ms = $duration, {})
    };
    ($op:expr, duration_ms = $duration:expr, { $($extra:tt)* }) => {
        $crate::get_logger().info_with(
            $crate::macros::with_duration(
                $crate::macros::op_fields(
                    module_path!(),
                    $op,
                    $crate::schema::EVENT_END,
                    $crate::serde_json::json!({ $($extra)* }),
                ),
                $duration,
            ),
            $op,
        )
    };
}

/// Log an operation error
///
/// # Example
///
/// ```
/// # use fwlog_logging::log_op_error;
/// let err = fwlog_errors::no_active_context("fw.logger");
/// log_op_error!("bind_logger", &err, duration_ms = 3);
/// ```
#[macro_export]
macro_rules! log_op_error {
    ($op:expr, $err:expr, duration_ms = $duration:expr) => {
        $crate::log_op_error!($op, $err, duration_ms = $duration, {})
    };
    ($op:expr, $err:expr, duration_ms = $duration:expr, { $($extra:tt)* }) => {
        $crate::get_logger().error_with(
            $crate::macros::with_error(
                $crate::macros::with_duration(
                    $crate::macros::op_fields(
                        module_path!(),
                        $op,
                        $crate::schema::EVENT_END_ERROR,
                        $crate::serde_json::json!({ $($extra)* }),
                    ),
                    $duration,
                ),
                $err,
            ),
            $op,
        )
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_op_fields_merge_extra() {
        let fields = op_fields("svc::orders", "create", "start", json!({ "order_id": "o-1" }));
        assert_eq!(fields["component"], "svc::orders");
        assert_eq!(fields["op"], "create");
        assert_eq!(fields["event"], "start");
        assert_eq!(fields["order_id"], "o-1");
    }

    #[test]
    fn test_error_fields() {
        let err = fwlog_errors::no_active_context("fw.logger");
        let fields = with_error(with_duration(op_fields("c", "o", "end_error", json!({})), 7), &err);
        assert_eq!(fields["duration_ms"], 7);
        assert_eq!(fields["err_kind"], "NoActiveContext");
        assert_eq!(fields["err_code"], "ERR_NO_ACTIVE_CONTEXT");
    }
}
