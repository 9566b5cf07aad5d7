// Integration tests for the process-wide default logger
// Every test in this binary shares one default logger; the capture helper
// pins its configuration before any test can build it.

use std::sync::{Arc, Barrier, OnceLock};

use fwlog_errors::FwErrorKind;
use fwlog_logging::schema::MSG_LOGGER_INITIALIZED;
use fwlog_logging::{
    configure_default, configure_default_with_writer, current_context, default_initialized,
    get_logger, Logger, LoggerConfig, TestCapture,
};

fn default_capture() -> &'static TestCapture {
    static CAPTURE: OnceLock<TestCapture> = OnceLock::new();
    CAPTURE.get_or_init(|| {
        let capture = TestCapture::new();
        configure_default_with_writer(
            LoggerConfig::default()
                .with_name("default-tests")
                .with_level("debug"),
            capture.clone(),
        )
        .expect("default logger must not be built before configuration");
        capture
    })
}

#[test]
fn test_concurrent_first_access_builds_one_instance() {
    // Given: Many threads released at the same moment
    let capture = default_capture();
    let threads = 16;
    let barrier = Arc::new(Barrier::new(threads));

    // When: They all resolve the logger with no context override
    let handles: Vec<_> = (0..threads)
        .map(|_| {
            let barrier = Arc::clone(&barrier);
            std::thread::spawn(move || {
                barrier.wait();
                get_logger()
            })
        })
        .collect();
    let loggers: Vec<Logger> = handles
        .into_iter()
        .map(|handle| handle.join().unwrap())
        .collect();

    // Then: Every thread got the same instance
    for logger in &loggers[1..] {
        assert!(Logger::ptr_eq(&loggers[0], logger));
    }
    assert!(default_initialized());

    // And: Exactly one initialization record was written
    assert_eq!(capture.count_messages(MSG_LOGGER_INITIALIZED), 1);
}

#[test]
fn test_initialization_record_shape() {
    let capture = default_capture();
    let logger = get_logger();
    assert_eq!(logger.name(), "default-tests");

    let init: Vec<_> = capture
        .records()
        .into_iter()
        .filter(|r| r["msg"] == MSG_LOGGER_INITIALIZED)
        .collect();
    assert_eq!(init.len(), 1);
    assert_eq!(init[0]["level"], 20);
    assert_eq!(init[0]["name"], "default-tests");
}

#[test]
fn test_configuration_is_frozen_after_construction() {
    default_capture();
    let _ = get_logger();

    let err = configure_default(LoggerConfig::default()).unwrap_err();
    assert_eq!(err.kind(), FwErrorKind::AlreadyInitialized);

    let err = configure_default_with_writer(LoggerConfig::default(), TestCapture::new())
        .unwrap_err();
    assert_eq!(err.kind(), FwErrorKind::AlreadyInitialized);
}

#[test]
fn test_default_is_used_outside_any_context() {
    let capture = default_capture();
    assert!(current_context().is_none());

    get_logger().info("outside");
    capture.assert_record_exists("outside");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_tasks_without_override_share_default() {
    default_capture();
    let expected = get_logger();

    let handles: Vec<_> = (0..32).map(|_| tokio::spawn(async { get_logger() })).collect();
    for handle in handles {
        let logger = handle.await.unwrap();
        assert!(Logger::ptr_eq(&logger, &expected));
    }
}
