use flagkit_domain::config::LoggingConfig;
use flagkit_logger::Logger;
use std::fs;
use std::time::Duration;
use tempfile::tempdir;

#[test]
fn json_file_logging_from_config() -> Result<(), Box<dyn std::error::Error>> {
    let tmp_dir = tempdir()?;
    let log_dir = tmp_dir.path().join("logs");
    let config =
        LoggingConfig { level: "debug".to_owned(), json: true, dir: Some(log_dir.clone()) };

    let logger = Logger::from_config("flagkit-json", &config)?;
    assert!(logger.writes_files());
    assert_eq!(logger.log_dir(), Some(log_dir.as_path()));

    tracing::info!(flag = "DASHBOARD", enabled = false, "flag changed");

    std::thread::sleep(Duration::from_millis(30));
    drop(logger);

    let log_file = fs::read_dir(&log_dir)?
        .flatten()
        .map(|entry| entry.path())
        .find(|path| path.extension().and_then(|ext| ext.to_str()) == Some("log"))
        .expect("log file should be created");

    let contents = fs::read_to_string(log_file)?;
    let line = contents.lines().find(|l| l.contains("flag changed")).expect("event logged");
    assert!(line.trim_start().starts_with('{'), "expected a JSON line, got {line}");
    assert!(line.contains("DASHBOARD"));

    Ok(())
}
