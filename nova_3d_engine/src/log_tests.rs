//! Unit tests for log.rs
//!
//! Tests LogSeverity ordering/labels, LogEntry, and entry formatting.

use crate::log::{format_entry, DefaultLogger, LogEntry, LogSeverity, Logger};
use std::time::SystemTime;

fn entry(severity: LogSeverity, file: Option<&'static str>, line: Option<u32>) -> LogEntry {
    LogEntry {
        severity,
        timestamp: SystemTime::now(),
        source: "nova3d::Scene".to_string(),
        message: "node attached".to_string(),
        file,
        line,
    }
}

// ============================================================================
// LOG SEVERITY TESTS
// ============================================================================

#[test]
fn test_log_severity_ordering() {
    assert!(LogSeverity::Trace < LogSeverity::Debug);
    assert!(LogSeverity::Debug < LogSeverity::Info);
    assert!(LogSeverity::Info < LogSeverity::Warn);
    assert!(LogSeverity::Warn < LogSeverity::Error);
}

#[test]
fn test_log_severity_labels_are_fixed_width() {
    for severity in [
        LogSeverity::Trace,
        LogSeverity::Debug,
        LogSeverity::Info,
        LogSeverity::Warn,
        LogSeverity::Error,
    ] {
        assert_eq!(severity.label().len(), 5);
    }
    assert_eq!(LogSeverity::Info.label(), "INFO ");
}

// ============================================================================
// FORMATTING TESTS
// ============================================================================

#[test]
fn test_format_entry_without_location() {
    let line = format_entry(&entry(LogSeverity::Info, None, None));
    assert!(line.contains("[INFO ] [nova3d::Scene] node attached"));
    assert!(!line.ends_with(')'));
}

#[test]
fn test_format_entry_with_location() {
    let line = format_entry(&entry(LogSeverity::Error, Some("scene.rs"), Some(42)));
    assert!(line.contains("[ERROR]"));
    assert!(line.ends_with("node attached (scene.rs:42)"));
}

#[test]
fn test_format_entry_partial_location_is_ignored() {
    let line = format_entry(&entry(LogSeverity::Warn, Some("scene.rs"), None));
    assert!(!line.contains("scene.rs"));
}

// ============================================================================
// DEFAULT LOGGER
// ============================================================================

#[test]
fn test_default_logger_does_not_panic() {
    let logger = DefaultLogger;
    logger.log(&entry(LogSeverity::Trace, None, None));
    logger.log(&entry(LogSeverity::Error, Some("log_tests.rs"), Some(1)));
}

#[test]
fn test_logger_is_object_safe() {
    let logger: Box<dyn Logger> = Box::new(DefaultLogger);
    logger.log(&entry(LogSeverity::Debug, None, None));
}
