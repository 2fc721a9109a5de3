//! Configuration management for `zed_prompts`.
//!
//! The store location is resolved, first match wins, from:
//! - `--db` on the command line (or the `ZED_PROMPTS_DB` environment variable)
//! - `db_path` in the YAML config file (~/.config/zed-prompts/config.yaml)
//! - The platform's default Zed prompt library location
//!
//! Resolution itself is a pure function of those inputs, so pipelines get
//! an explicit [`StoreConfig`] and never look anything up on their own.

use std::fs;
use std::path::{Path, PathBuf};

use prompts_lib::{PromptError, Result};
use serde::Deserialize;

use crate::storage::{DEFAULT_MAP_SIZE, StoreConfig};

/// Environment variable consulted when `--db` is not given.
pub const DB_ENV_VAR: &str = "ZED_PROMPTS_DB";

const APP_DIR: &str = "zed-prompts";
const CONFIG_FILE_NAME: &str = "config.yaml";
const BYTES_PER_MB: usize = 1024 * 1024;

/// Contents of the optional YAML config file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFile {
    /// Store location; a leading `~/` is expanded to the home directory.
    pub db_path: Option<PathBuf>,
    /// LMDB map size ceiling in MiB.
    pub map_size_mb: Option<usize>,
}

/// Values taken from the command line.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub db: Option<PathBuf>,
    pub config: Option<PathBuf>,
}

/// Location of the per-user config file, if the platform has one.
#[must_use]
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR).join(CONFIG_FILE_NAME))
}

/// Default store location for the running platform, relative to `home`.
#[must_use]
pub fn default_db_path_in(home: &Path) -> Option<PathBuf> {
    if cfg!(target_os = "linux") {
        Some(home.join(".local/share/zed/prompts/prompts-library-db.0.mdb"))
    } else if cfg!(target_os = "macos") {
        Some(home.join(".config/zed/prompts"))
    } else {
        None
    }
}

/// Load the config file.
///
/// An explicitly requested file must exist; the per-user file is optional.
///
/// # Errors
///
/// Returns `FileNotFound` for a missing explicit file, `Io` if it cannot be
/// read, or `Config` if it is not valid YAML for [`ConfigFile`].
pub fn load_config_file(explicit: Option<&Path>) -> Result<Option<ConfigFile>> {
    let path = match explicit {
        Some(path) => {
            if !path.exists() {
                return Err(PromptError::FileNotFound(path.to_path_buf()));
            }
            path.to_path_buf()
        }
        None => match user_config_path() {
            Some(path) if path.exists() => path,
            _ => return Ok(None),
        },
    };

    let contents = fs::read_to_string(&path)?;
    let file: ConfigFile = serde_yaml::from_str(&contents)
        .map_err(|e| PromptError::Config(format!("{}: {e}", path.display())))?;
    tracing::debug!(path = %path.display(), "Loaded config file");
    Ok(Some(file))
}

fn expand_home(path: &Path, home: Option<&Path>) -> PathBuf {
    match (path.strip_prefix("~"), home) {
        (Ok(rest), Some(home)) => home.join(rest),
        _ => path.to_path_buf(),
    }
}

/// Resolve the store configuration from its inputs.
///
/// # Errors
///
/// Returns `Config` if no store path can be determined or the map size is
/// zero or too large.
pub fn resolve(
    overrides: &CliOverrides,
    file: Option<&ConfigFile>,
    home: Option<&Path>,
) -> Result<StoreConfig> {
    let from_file = file
        .and_then(|f| f.db_path.as_deref())
        .map(|path| expand_home(path, home));

    let path = overrides
        .db
        .clone()
        .or(from_file)
        .or_else(|| home.and_then(default_db_path_in))
        .ok_or_else(|| {
            PromptError::Config(
                "no default prompt database location on this platform; pass --db".to_string(),
            )
        })?;

    let map_size = match file.and_then(|f| f.map_size_mb) {
        None => DEFAULT_MAP_SIZE,
        Some(0) => {
            return Err(PromptError::Config(
                "map_size_mb must be greater than zero".to_string(),
            ));
        }
        Some(mb) => mb.checked_mul(BYTES_PER_MB).ok_or_else(|| {
            PromptError::Config(format!("map_size_mb {mb} is too large"))
        })?,
    };

    Ok(StoreConfig::new(path).with_map_size(map_size))
}

/// Load the config file and resolve the store configuration.
///
/// # Errors
///
/// Returns an error if the config file is invalid or no store path can be
/// determined.
pub fn load(overrides: &CliOverrides) -> Result<StoreConfig> {
    let file = load_config_file(overrides.config.as_deref())?;
    let home = dirs::home_dir();
    let config = resolve(overrides, file.as_ref(), home.as_deref())?;
    tracing::debug!(
        path = %config.path.display(),
        map_size = config.map_size,
        "Resolved store configuration"
    );
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn home() -> PathBuf {
        PathBuf::from("/home/tester")
    }

    #[test]
    fn test_cli_override_wins() {
        let overrides = CliOverrides {
            db: Some(PathBuf::from("/explicit/db")),
            config: None,
        };
        let file = ConfigFile {
            db_path: Some(PathBuf::from("/from/file")),
            map_size_mb: None,
        };
        let config = resolve(&overrides, Some(&file), Some(&home())).unwrap();
        assert_eq!(config.path, PathBuf::from("/explicit/db"));
        assert_eq!(config.map_size, DEFAULT_MAP_SIZE);
    }

    #[test]
    fn test_config_file_beats_platform_default() {
        let file = ConfigFile {
            db_path: Some(PathBuf::from("~/prompts/db")),
            map_size_mb: Some(64),
        };
        let config = resolve(&CliOverrides::default(), Some(&file), Some(&home())).unwrap();
        assert_eq!(config.path, home().join("prompts/db"));
        assert_eq!(config.map_size, 64 * BYTES_PER_MB);
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_linux_default_path() {
        let config = resolve(&CliOverrides::default(), None, Some(&home())).unwrap();
        assert_eq!(
            config.path,
            home().join(".local/share/zed/prompts/prompts-library-db.0.mdb")
        );
    }

    #[cfg(target_os = "macos")]
    #[test]
    fn test_macos_default_path() {
        let config = resolve(&CliOverrides::default(), None, Some(&home())).unwrap();
        assert_eq!(config.path, home().join(".config/zed/prompts"));
    }

    #[test]
    fn test_no_home_and_no_override_is_config_error() {
        let err = resolve(&CliOverrides::default(), None, None).unwrap_err();
        assert!(matches!(err, PromptError::Config(_)));
    }

    #[test]
    fn test_zero_map_size_rejected() {
        let overrides = CliOverrides {
            db: Some(PathBuf::from("/db")),
            config: None,
        };
        let file = ConfigFile {
            db_path: None,
            map_size_mb: Some(0),
        };
        assert!(resolve(&overrides, Some(&file), None).is_err());
    }

    #[test]
    fn test_load_explicit_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(&path, "db_path: /data/prompts\nmap_size_mb: 256\n").unwrap();

        let file = load_config_file(Some(&path)).unwrap().unwrap();
        assert_eq!(file.db_path, Some(PathBuf::from("/data/prompts")));
        assert_eq!(file.map_size_mb, Some(256));
    }

    #[test]
    fn test_load_explicit_config_file_missing() {
        let err = load_config_file(Some(Path::new("/nonexistent/config.yaml"))).unwrap_err();
        assert!(matches!(err, PromptError::FileNotFound(_)));
    }

    #[test]
    fn test_load_config_file_rejects_unknown_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(&path, "database: /typo\n").unwrap();

        let err = load_config_file(Some(&path)).unwrap_err();
        assert!(matches!(err, PromptError::Config(_)));
    }
}
