//! Integration tests for the logging setup.

use core_runtime::logging::{init_logging, LogFormat, LogLevel, LoggingConfig};

#[test]
fn init_succeeds_once_then_fails() {
    // The global subscriber can only be installed once per process, so
    // both halves of the behavior live in one test.
    let config = LoggingConfig::default()
        .with_format(LogFormat::Compact)
        .with_level(LogLevel::Debug);
    init_logging(config.clone()).expect("first init should succeed");

    // Emitting through the installed subscriber must not panic.
    tracing::info!(target: "core_runtime", "logging initialized for tests");

    let err = init_logging(config).expect_err("second init should fail");
    assert!(err.to_string().contains("Failed to initialize logging"));
}

#[test]
fn format_defaults_follow_build_profile() {
    #[cfg(debug_assertions)]
    assert_eq!(LoggingConfig::default().format, LogFormat::Pretty);

    #[cfg(not(debug_assertions))]
    assert_eq!(LoggingConfig::default().format, LogFormat::Json);
}

#[test]
fn filter_string_is_kept_verbatim() {
    let config = LoggingConfig::default().with_filter("core_bridge=debug,core_shm=trace");
    assert_eq!(
        config.filter,
        Some("core_bridge=debug,core_shm=trace".to_string())
    );
}
