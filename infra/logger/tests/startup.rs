use flagkit_domain::config::LoggingConfig;
use flagkit_logger::{Logger, LoggerError};

#[test]
fn default_section_logs_to_console_once_per_process() {
    let logger = Logger::from_config("flagctl", &LoggingConfig::default()).expect("first init");
    assert!(!logger.writes_files());
    assert!(logger.log_dir().is_none());

    tracing::info!(flags = 15, "Flag store ready");

    let err = Logger::from_config("flagctl", &LoggingConfig::default())
        .expect_err("a second subscriber must be refused");
    assert!(matches!(err, LoggerError::Subscriber { .. }));
}
