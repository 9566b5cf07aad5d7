//! Simulate command
//!
//! Each simulated request runs in its own context with a child logger
//! bound as override, then hands work to a spawned continuation that
//! must still resolve that logger.

use std::time::Instant;

use clap::Args;
use fwlog_core_types::RequestId;
use fwlog_logging::context::{self, ContextKey};
use fwlog_logging::schema::FIELD_REQUEST_ID;
use fwlog_logging::{
    get_logger, log_op_end, log_op_start, run_in_new_context_async, set_logger_override,
    try_get_logger,
};
use serde_json::json;

#[derive(Debug, Args)]
pub struct SimulateArgs {
    /// Number of concurrent requests
    #[arg(long, default_value_t = 4)]
    pub requests: usize,

    #[arg(long, default_value_t = 2)]
    pub worker_threads: usize,
}

pub fn execute(args: SimulateArgs) -> Result<(), Box<dyn std::error::Error>> {
    // Build the default up front so a rejected configuration is reported
    // here rather than from inside a request task.
    try_get_logger()?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(args.worker_threads.max(1))
        .enable_all()
        .build()?;

    tracing::debug!(requests = args.requests, "starting simulated requests");
    runtime.block_on(async {
        let handles: Vec<_> = (0..args.requests)
            .map(|n| tokio::spawn(run_in_new_context_async(handle_request(n))))
            .collect();

        for handle in handles {
            handle
                .await?
                .map_err(|e| -> Box<dyn std::error::Error> { e })?;
        }
        Ok::<(), Box<dyn std::error::Error>>(())
    })
}

async fn handle_request(n: usize) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let started = Instant::now();
    let request_id = RequestId::new();
    context::set(ContextKey::RequestId, request_id.clone())?;
    set_logger_override(get_logger().child(json!({ FIELD_REQUEST_ID: request_id.as_str() })))?;

    log_op_start!("handle_request", { "n": n });
    get_logger().info_with(
        json!({
            "url": format!("/orders/{}?access_token=tok-{}", n, n),
            "req": { "authorization": format!("Bearer secret-{}", n), "method": "GET" },
        }),
        "request received",
    );

    let continuation = context::spawn(async move {
        tokio::task::yield_now().await;
        let bound = context::get::<RequestId>(ContextKey::RequestId);
        get_logger().info_with(
            json!({ "bound_request_id": bound.as_ref().map(RequestId::as_str) }),
            "continuation finished",
        );
    });
    continuation.await?;

    log_op_end!(
        "handle_request",
        duration_ms = started.elapsed().as_millis() as u64
    );
    Ok(())
}
