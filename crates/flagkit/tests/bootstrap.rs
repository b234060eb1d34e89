use flagkit::domain::config::{FlagkitConfig, StorageBackend};
use flagkit::kernel::catalog::{BuiltinFlag, builtin};
use flagkit::{FlagDescriptor, FlagCatalog, FlagkitError};
use std::fs;
use tempfile::TempDir;

fn file_config(dir: &TempDir) -> FlagkitConfig {
    let mut config = FlagkitConfig::default();
    config.storage.data_dir = dir.path().to_path_buf();
    config
}

#[test]
fn file_backend_persists_between_bootstraps() {
    let dir = TempDir::new().unwrap();
    let config = file_config(&dir);

    let flags = flagkit::bootstrap(&config).unwrap();
    assert!(flags.is_persistent());
    assert_eq!(flags.get_all(), builtin().defaults());
    flags.enable(BuiltinFlag::ReportsModule);
    drop(flags);

    let flags = flagkit::bootstrap(&config).unwrap();
    assert!(flags.is_enabled(BuiltinFlag::ReportsModule.as_ref()));
    assert!(dir.path().join("featureFlags.json").is_file());
}

#[test]
fn memory_backend_forgets_on_restart() {
    let mut config = FlagkitConfig::default();
    config.storage.backend = StorageBackend::Memory;

    flagkit::bootstrap(&config).unwrap().enable(BuiltinFlag::ReportsModule);
    let flags = flagkit::bootstrap(&config).unwrap();
    assert!(!flags.is_enabled(BuiltinFlag::ReportsModule.as_ref()));
}

#[test]
fn custom_catalog_and_key() {
    let dir = TempDir::new().unwrap();
    let mut config = file_config(&dir);
    config.storage.key = "shell-flags".to_owned();

    let catalog = FlagCatalog::new(vec![FlagDescriptor::new("BETA", "Beta").enabled(true)]);
    let flags = flagkit::bootstrap_with(catalog, &config).unwrap();
    assert!(flags.is_enabled("BETA"));

    let raw = fs::read_to_string(dir.path().join("shell-flags.json")).unwrap();
    assert_eq!(raw, r#"{"BETA":true}"#);
}

#[test]
fn invalid_key_is_a_storage_error() {
    let dir = TempDir::new().unwrap();
    let mut config = file_config(&dir);
    config.storage.key = "../escape".to_owned();

    let err = flagkit::bootstrap(&config).unwrap_err();
    assert!(matches!(err, FlagkitError::Storage { .. }));
    assert!(err.to_string().contains("backend File"));
}

#[test]
fn write_behind_requires_a_runtime() {
    let dir = TempDir::new().unwrap();
    let mut config = file_config(&dir);
    config.storage.write_behind = true;

    assert!(matches!(flagkit::bootstrap(&config), Err(FlagkitError::Storage { .. })));
}

#[tokio::test]
async fn write_behind_inside_a_runtime() {
    let dir = TempDir::new().unwrap();
    let mut config = file_config(&dir);
    config.storage.write_behind = true;

    let flags = flagkit::bootstrap(&config).unwrap();
    assert!(flags.is_persistent());
    assert!(flags.enable(BuiltinFlag::ReportsModule));
}

#[test]
fn config_file_is_layered_in() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("flagkit.toml");
    fs::write(&path, "[storage]\nbackend = \"memory\"\nkey = \"alt\"\n").unwrap();

    let config = flagkit::load_config(Some(&path)).unwrap();
    assert_eq!(config.storage.backend, StorageBackend::Memory);
    assert_eq!(config.storage.key, "alt");
    assert_eq!(config.logging.level, "info");
}
