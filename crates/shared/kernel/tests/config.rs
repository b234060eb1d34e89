use flagkit_kernel::config::{ConfigError, load_config};
use flagkit_kernel::domain::config::{FlagkitConfig, StorageBackend};
use std::fs;
use tempfile::tempdir;

#[test]
fn missing_file_yields_defaults() -> Result<(), ConfigError> {
    let dir = tempdir().expect("tempdir");
    let cfg: FlagkitConfig = load_config(Some(dir.path().join("absent.toml")))?;
    assert_eq!(cfg.storage.backend, StorageBackend::File);
    assert_eq!(cfg.storage.key, "featureFlags");
    Ok(())
}

#[test]
fn toml_file_is_applied() -> Result<(), ConfigError> {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("flagkit.toml");
    fs::write(
        &path,
        r#"
[storage]
backend = "memory"
key = "shell_flags"

[logging]
level = "debug"
"#,
    )
    .expect("write config");

    let cfg: FlagkitConfig = load_config(Some(&path))?;
    assert_eq!(cfg.storage.backend, StorageBackend::Memory);
    assert_eq!(cfg.storage.key, "shell_flags");
    assert_eq!(cfg.logging.level, "debug");
    assert!(!cfg.storage.write_behind);
    Ok(())
}

#[test]
fn malformed_file_is_an_error() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("broken.toml");
    fs::write(&path, "[storage\nkey = ").expect("write config");

    let result: Result<FlagkitConfig, ConfigError> = load_config(Some(&path));
    assert!(matches!(result, Err(ConfigError::Config { .. })));
}
