//! Emit command

use clap::Args;
use fwlog_core_types::RequestId;
use fwlog_errors::FwError;
use fwlog_logging::context::{self, ContextKey};
use fwlog_logging::schema::FIELD_REQUEST_ID;
use fwlog_logging::{
    get_logger, run_in_new_context, set_logger_override, try_get_logger, Level,
};
use serde_json::{json, Map, Value};

#[derive(Debug, Args)]
pub struct EmitArgs {
    #[arg(long, default_value = "info")]
    pub level: Level,

    #[arg(long)]
    pub message: String,

    /// Extra record field as key=value; values that parse as JSON keep their type
    #[arg(long = "field", value_parser = parse_field)]
    pub fields: Vec<(String, Value)>,

    /// Request id to bind; generated when absent
    #[arg(long)]
    pub request_id: Option<String>,
}

pub fn parse_field(raw: &str) -> Result<(String, Value), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{}'", raw))?;
    if key.is_empty() {
        return Err(format!("empty field name in '{}'", raw));
    }
    let value = serde_json::from_str(value).unwrap_or_else(|_| Value::from(value));
    Ok((key.to_string(), value))
}

pub fn execute(args: EmitArgs) -> Result<(), Box<dyn std::error::Error>> {
    let request_id = args
        .request_id
        .map(RequestId::from_string)
        .unwrap_or_default();
    let fields: Map<String, Value> = args.fields.into_iter().collect();

    run_in_new_context(|| -> Result<(), FwError> {
        context::set(ContextKey::RequestId, request_id.clone())?;
        let logger = try_get_logger()?.child(json!({ FIELD_REQUEST_ID: request_id.as_str() }));
        set_logger_override(logger)?;

        get_logger().log(args.level, Value::Object(fields), &args.message)
    })?;

    Ok(())
}
