use config::{Config, Environment, File};
use serde::de::DeserializeOwned;
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Prefix for environment overrides, e.g. `FLAGKIT__STORAGE__DATA_DIR`.
pub const ENV_PREFIX: &str = "FLAGKIT";
/// Config file looked up (any supported extension) when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "flagkit";

/// Custom error type for config loading.
#[flagkit_derive::flagkit_error]
pub enum ConfigError {
    #[error("Config error{}: {source}", format_context(.context))]
    Config { source: config::ConfigError, context: Option<Cow<'static, str>> },
}

/// Loads configuration from an optional file layered under environment overrides.
///
/// 1. **Base File**: `path`, or `flagkit.{toml,json,yaml}` in the working directory. A missing
///    file is not an error; every field of the flag config has a default.
/// 2. **Environment Overrides**: variables prefixed with `FLAGKIT__`, nested with double
///    underscores (`FLAGKIT__STORAGE__KEY` maps to `storage.key`).
///
/// # Errors
/// Returns [`ConfigError::Config`] if the file exists but cannot be parsed, or if the merged
/// values do not match `T`.
///
/// # Example
/// ```rust
/// use flagkit_kernel::config::load_config;
/// use flagkit_kernel::domain::config::FlagkitConfig;
///
/// let cfg: FlagkitConfig = load_config(Some("does/not/exist")).unwrap_or_default();
/// assert_eq!(cfg.storage.key, "featureFlags");
/// ```
pub fn load_config<T>(path: Option<impl AsRef<Path>>) -> Result<T, ConfigError>
where
    T: DeserializeOwned,
{
    let explicit = path.is_some();
    let effective_path =
        path.map_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE), |p| p.as_ref().to_path_buf());

    let builder = Config::builder()
        .add_source(File::from(effective_path.as_path()).required(false))
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .convert_case(config::Case::Snake),
        );

    if explicit {
        info!("Loading config from {}", effective_path.display());
    } else {
        debug!("Looking for optional config at {}", effective_path.display());
    }

    let config = builder
        .build()
        .context("Failed to build config")?
        .try_deserialize::<T>()
        .context("Failed to deserialize config")?;

    Ok(config)
}
