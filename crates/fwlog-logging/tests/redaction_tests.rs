// Integration tests for credential redaction in emitted records
// Records are emitted through a logger resolved by get_logger() inside a
// context, so the default logger is never built in this binary.

use fwlog_core_types::Sensitive;
use fwlog_logging::{get_logger, with_logger, Logger, LoggerConfig, TestCapture};
use serde_json::{json, Value};

fn emit_through_resolver(config: LoggerConfig, fields: Value) -> Value {
    let capture = TestCapture::new();
    let logger = Logger::builder(config)
        .writer(capture.clone())
        .build()
        .unwrap();

    with_logger(logger, || get_logger().info_with(fields, "redaction"));

    let mut records = capture.records();
    assert_eq!(records.len(), 1);
    records.remove(0)
}

#[test]
fn test_url_access_token_is_masked_in_place() {
    let record = emit_through_resolver(
        LoggerConfig::default(),
        json!({ "url": "https://x/y?access_token=AbC123-_&other=1" }),
    );

    assert_eq!(record["url"], "https://x/y?access_token=***&other=1");
}

#[test]
fn test_request_authorization_keeps_scheme() {
    let record = emit_through_resolver(
        LoggerConfig::default(),
        json!({ "req": { "authorization": "Bearer sekrit-token-value", "method": "POST" } }),
    );

    assert_eq!(record["req"]["authorization"], "Bearer ***");
    assert_eq!(record["req"]["method"], "POST");
}

#[test]
fn test_generic_paths_are_replaced_wholesale() {
    let config = LoggerConfig::default()
        .with_redact_path("password")
        .with_redact_path("req.headers.cookie");
    let record = emit_through_resolver(
        config,
        json!({
            "password": "correct horse battery staple",
            "req": { "headers": { "cookie": "session=abc", "accept": "*/*" } },
        }),
    );

    assert_eq!(record["password"], "***");
    assert_eq!(record["req"]["headers"]["cookie"], "***");
    assert_eq!(record["req"]["headers"]["accept"], "*/*");
}

#[test]
fn test_child_bindings_are_redacted_too() {
    let capture = TestCapture::new();
    let logger = Logger::builder(LoggerConfig::default())
        .writer(capture.clone())
        .build()
        .unwrap()
        .child(json!({ "url": "/callback?access_token=zzz" }));

    with_logger(logger, || get_logger().info("bound"));

    assert_eq!(capture.records()[0]["url"], "/callback?access_token=***");
}

#[test]
fn test_redaction_paths_from_environment() {
    let vars = [
        ("LOGGER_REDACT_PATHS".to_string(), "secret,*.token".to_string()),
        ("LOGGER_USE_SEVERITY_STRING".to_string(), "true".to_string()),
    ]
    .into_iter()
    .collect();
    let config = LoggerConfig::from_env_map(vars).unwrap();

    let record = emit_through_resolver(
        config,
        json!({ "secret": 1234, "upstream": { "token": "t" }, "public": "p" }),
    );

    assert_eq!(record["secret"], "***");
    assert_eq!(record["upstream"]["token"], "***");
    assert_eq!(record["public"], "p");
    assert_eq!(record["severity"], "info");
}

#[test]
fn test_sensitive_values_never_reach_the_record() {
    let api_key = Sensitive::new("sk-live-123".to_string());
    let record = emit_through_resolver(
        LoggerConfig::default().with_redact_path("password"),
        json!({ "api_key": api_key, "user": "ann" }),
    );

    assert_eq!(record["api_key"], "***");
    assert_eq!(record["user"], "ann");
    assert_eq!(api_key.expose(), "sk-live-123");
}
