//! # Configuration
//!
//! Centralizes all settings with a clear override hierarchy:
//! defaults → config file → env vars → CLI flags.
//!
//! Config lives at `~/.mathscare/config.toml`. If missing on first run, a
//! commented-out default is generated so users can discover all options.

use log::{LevelFilter, debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use crate::backend::DEFAULT_BACKEND_URL;

// ============================================================================
// Config Structs (all fields Option<T> for sparse TOML)
// ============================================================================

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct MathsCareConfig {
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub ui: UiConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct BackendConfig {
    pub url: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct UiConfig {
    pub reveal_interval_ms: Option<u64>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct LoggingConfig {
    pub level: Option<String>,
    pub file: Option<String>,
}

// ============================================================================
// Defaults
// ============================================================================

pub const DEFAULT_REVEAL_INTERVAL_MS: u64 = 10;
pub const DEFAULT_LOG_FILE: &str = "mathscare.log";
pub const DEFAULT_LOG_LEVEL: LevelFilter = LevelFilter::Debug;

pub const ENV_BACKEND_URL: &str = "MATHSCARE_BACKEND_URL";
pub const ENV_REVEAL_INTERVAL_MS: &str = "MATHSCARE_REVEAL_INTERVAL_MS";
pub const ENV_LOG_LEVEL: &str = "MATHSCARE_LOG_LEVEL";

// ============================================================================
// Resolved Config (concrete values, no Options)
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfig {
    pub backend_url: String,
    pub reveal_interval: Duration,
    pub log_level: LevelFilter,
    pub log_file: PathBuf,
}

/// Values given on the command line. `None` = flag not passed.
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    pub backend_url: Option<String>,
    pub reveal_interval_ms: Option<u64>,
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "config I/O error: {e}"),
            ConfigError::Parse(e) => write!(f, "config parse error: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Loading
// ============================================================================

/// Returns the path to `~/.mathscare/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".mathscare").join("config.toml"))
}

/// Load config from `~/.mathscare/config.toml`.
///
/// If the file doesn't exist, generates a commented-out default and
/// returns `MathsCareConfig::default()`. If it exists but is malformed,
/// returns `ConfigError::Parse`.
pub fn load_config() -> Result<MathsCareConfig, ConfigError> {
    let path = match config_path() {
        Some(p) => p,
        None => {
            warn!("Could not determine home directory, using default config");
            return Ok(MathsCareConfig::default());
        }
    };

    if !path.exists() {
        info!("No config file found, generating default at {}", path.display());
        generate_default_config(&path);
        return Ok(MathsCareConfig::default());
    }

    load_config_from(&path)
}

pub fn load_config_from(path: &Path) -> Result<MathsCareConfig, ConfigError> {
    let contents = fs::read_to_string(path).map_err(ConfigError::Io)?;
    let config: MathsCareConfig = toml::from_str(&contents).map_err(ConfigError::Parse)?;
    info!("Loaded config from {}", path.display());
    debug!("Config: {:?}", config);
    Ok(config)
}

/// Generates a commented-out default config file at the given path.
fn generate_default_config(path: &Path) {
    let default_content = r#"# MathsCare Configuration
# All settings are optional. Defaults are used for anything not specified.
# Override hierarchy: defaults -> this file -> env vars -> CLI flags.

# [backend]
# url = "http://192.168.0.134:5500"   # Or set MATHSCARE_BACKEND_URL

# [ui]
# reveal_interval_ms = 10              # Delay between revealed answer characters

# [logging]
# level = "debug"                      # "off", "error", "warn", "info", "debug", "trace"
# file = "mathscare.log"
"#;

    if let Some(parent) = path.parent()
        && let Err(e) = fs::create_dir_all(parent)
    {
        warn!("Failed to create config directory: {}", e);
        return;
    }
    if let Err(e) = fs::write(path, default_content) {
        warn!("Failed to write default config: {}", e);
    }
}

// ============================================================================
// Resolution
// ============================================================================

/// Resolve the final config from the process environment.
pub fn resolve(config: &MathsCareConfig, cli: &CliOverrides) -> ResolvedConfig {
    resolve_with_env(config, cli, |key| std::env::var(key).ok())
}

/// Collapse defaults → config file → env vars → CLI into concrete values.
///
/// `env` looks up an environment variable; tests pass a closure instead of
/// touching the real process environment.
pub fn resolve_with_env(
    config: &MathsCareConfig,
    cli: &CliOverrides,
    env: impl Fn(&str) -> Option<String>,
) -> ResolvedConfig {
    let backend_url = cli
        .backend_url
        .clone()
        .or_else(|| env(ENV_BACKEND_URL))
        .or_else(|| config.backend.url.clone())
        .unwrap_or_else(|| DEFAULT_BACKEND_URL.to_string());

    let reveal_interval_ms = cli
        .reveal_interval_ms
        .or_else(|| env(ENV_REVEAL_INTERVAL_MS).and_then(|v| v.parse().ok()))
        .or(config.ui.reveal_interval_ms)
        .unwrap_or(DEFAULT_REVEAL_INTERVAL_MS);

    // Unknown level names fall back to the default rather than failing startup.
    let log_level = env(ENV_LOG_LEVEL)
        .or_else(|| config.logging.level.clone())
        .and_then(|name| LevelFilter::from_str(&name).ok())
        .unwrap_or(DEFAULT_LOG_LEVEL);

    let log_file = config
        .logging
        .file
        .clone()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_FILE));

    ResolvedConfig {
        backend_url,
        reveal_interval: Duration::from_millis(reveal_interval_ms),
        log_level,
        log_file,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_resolve_uses_defaults_when_empty() {
        let resolved = resolve_with_env(&MathsCareConfig::default(), &CliOverrides::default(), no_env);
        assert_eq!(resolved.backend_url, DEFAULT_BACKEND_URL);
        assert_eq!(resolved.reveal_interval, Duration::from_millis(10));
        assert_eq!(resolved.log_level, LevelFilter::Debug);
        assert_eq!(resolved.log_file, PathBuf::from("mathscare.log"));
    }

    #[test]
    fn test_config_file_overrides_defaults() {
        let config = MathsCareConfig {
            backend: BackendConfig {
                url: Some("http://tutor.local:8000".to_string()),
            },
            ui: UiConfig {
                reveal_interval_ms: Some(25),
            },
            logging: LoggingConfig {
                level: Some("warn".to_string()),
                file: Some("/tmp/mc.log".to_string()),
            },
        };
        let resolved = resolve_with_env(&config, &CliOverrides::default(), no_env);
        assert_eq!(resolved.backend_url, "http://tutor.local:8000");
        assert_eq!(resolved.reveal_interval, Duration::from_millis(25));
        assert_eq!(resolved.log_level, LevelFilter::Warn);
        assert_eq!(resolved.log_file, PathBuf::from("/tmp/mc.log"));
    }

    #[test]
    fn test_env_beats_file_and_cli_beats_env() {
        let config = MathsCareConfig {
            backend: BackendConfig {
                url: Some("http://from-file".to_string()),
            },
            ..Default::default()
        };
        let env = |key: &str| match key {
            ENV_BACKEND_URL => Some("http://from-env".to_string()),
            ENV_REVEAL_INTERVAL_MS => Some("5".to_string()),
            _ => None,
        };

        let resolved = resolve_with_env(&config, &CliOverrides::default(), env);
        assert_eq!(resolved.backend_url, "http://from-env");
        assert_eq!(resolved.reveal_interval, Duration::from_millis(5));

        let cli = CliOverrides {
            backend_url: Some("http://from-cli".to_string()),
            reveal_interval_ms: Some(1),
        };
        let resolved = resolve_with_env(&config, &cli, env);
        assert_eq!(resolved.backend_url, "http://from-cli");
        assert_eq!(resolved.reveal_interval, Duration::from_millis(1));
    }

    #[test]
    fn test_bad_values_fall_back() {
        let config = MathsCareConfig {
            logging: LoggingConfig {
                level: Some("loud".to_string()),
                file: None,
            },
            ..Default::default()
        };
        let env = |key: &str| (key == ENV_REVEAL_INTERVAL_MS).then(|| "soon".to_string());
        let resolved = resolve_with_env(&config, &CliOverrides::default(), env);
        assert_eq!(resolved.log_level, DEFAULT_LOG_LEVEL);
        assert_eq!(resolved.reveal_interval, Duration::from_millis(DEFAULT_REVEAL_INTERVAL_MS));
    }

    #[test]
    fn test_sparse_toml_parses() {
        let toml_str = r#"
[ui]
reveal_interval_ms = 3
"#;
        let config: MathsCareConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.ui.reveal_interval_ms, Some(3));
        assert!(config.backend.url.is_none());
        assert!(config.logging.level.is_none());
    }

    #[test]
    fn test_load_config_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[backend]\nurl = \"http://127.0.0.1:5500\"\n").unwrap();
        let config = load_config_from(&path).unwrap();
        assert_eq!(config.backend.url.as_deref(), Some("http://127.0.0.1:5500"));
    }

    #[test]
    fn test_malformed_file_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[backend\nurl = 3").unwrap();
        assert!(matches!(load_config_from(&path), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_generated_default_is_valid_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        generate_default_config(&path);
        let config = load_config_from(&path).unwrap();
        assert!(config.backend.url.is_none());
    }
}
