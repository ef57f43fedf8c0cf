//! Application configuration files and environment lookup.
//!
//! This module loads the application-wide configuration from TOML files and
//! reads the collection environment variables. Neither is consulted
//! implicitly: both are handed to [`crate::ConfigResolver`] as explicit
//! context.

use crate::error::CollectionError;
use crate::types::{validate_url_base, StatusOrigin};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable holding the collection API token.
pub const ENV_API_TOKEN: &str = "PYFUNCEBLE_COLLECTION_API_TOKEN";

/// Environment variable holding the collection API URL base.
pub const ENV_API_URL: &str = "PYFUNCEBLE_COLLECTION_API_URL";

/// Application configuration loaded from TOML files.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct FileConfig {
    /// Collection API settings
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collection: Option<CollectionSection>,

    /// Lookup settings shared with the checkers
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lookup: Option<LookupSection>,
}

/// The `[collection]` section.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct CollectionSection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url_base: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub preferred_status_origin: Option<String>,
}

/// The `[lookup]` section.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct LookupSection {
    /// Global lookup timeout in seconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<f64>,
}

impl FileConfig {
    /// `collection.url_base`, if set.
    pub fn collection_url_base(&self) -> Option<&str> {
        self.collection.as_ref()?.url_base.as_deref()
    }

    /// `collection.preferred_status_origin`, if set.
    pub fn collection_preferred_status_origin(&self) -> Option<&str> {
        self.collection.as_ref()?.preferred_status_origin.as_deref()
    }

    /// `lookup.timeout`, if set.
    pub fn lookup_timeout(&self) -> Option<f64> {
        self.lookup.as_ref()?.timeout
    }
}

/// Configuration discovery and loading functionality.
pub struct ConfigManager {
    /// Whether to report which files were picked up
    pub verbose: bool,
}

impl ConfigManager {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }

    /// Load configuration from a specific file.
    ///
    /// # Errors
    ///
    /// Returns `FileError` when the file is missing or unreadable, and
    /// `ConfigError` when it is not valid TOML or holds invalid values.
    pub fn load_file<P: AsRef<Path>>(&self, path: P) -> Result<FileConfig, CollectionError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(CollectionError::file_error(
                path.to_string_lossy(),
                "Configuration file not found",
            ));
        }

        let content = fs::read_to_string(path).map_err(|e| {
            CollectionError::file_error(
                path.to_string_lossy(),
                format!("Failed to read configuration file: {}", e),
            )
        })?;

        let config: FileConfig = toml::from_str(&content).map_err(|e| {
            CollectionError::config(format!("Failed to parse TOML configuration: {}", e))
        })?;

        self.validate_config(&config)?;

        Ok(config)
    }

    /// Discover and load configuration files in precedence order.
    ///
    /// Returns `None` when no configuration file was found, which the
    /// resolver treats as "no application configuration loaded".
    pub fn discover_and_load(&self) -> Result<Option<FileConfig>, CollectionError> {
        let mut merged: Option<FileConfig> = None;
        let mut loaded_files = Vec::new();

        // XDG first (lowest precedence), then home, then local.
        let candidates = [
            self.get_xdg_config_path(),
            self.get_global_config_path(),
            self.get_local_config_path(),
        ];

        for path in candidates.into_iter().flatten() {
            let config = self.load_file(&path)?;
            merged = Some(match merged {
                Some(lower) => self.merge_configs(lower, config),
                None => config,
            });
            loaded_files.push(path);
        }

        if self.verbose && loaded_files.len() > 1 {
            for (i, path) in loaded_files.iter().enumerate() {
                let status = if i == loaded_files.len() - 1 {
                    "highest precedence"
                } else {
                    "overridden"
                };
                tracing::info!(
                    path = %path.display(),
                    precedence = status,
                    "Configuration file loaded"
                );
            }
        }

        Ok(merged)
    }

    fn get_local_config_path(&self) -> Option<PathBuf> {
        let candidates = ["./collection-client.toml", "./.collection-client.toml"];

        for candidate in &candidates {
            let path = Path::new(candidate);
            if path.exists() {
                return Some(path.to_path_buf());
            }
        }

        None
    }

    fn get_global_config_path(&self) -> Option<PathBuf> {
        let home = env::var_os("HOME")?;
        let candidates = [".collection-client.toml", "collection-client.toml"];

        candidates
            .iter()
            .map(|candidate| Path::new(&home).join(candidate))
            .find(|path| path.exists())
    }

    /// Follows the XDG Base Directory Specification.
    fn get_xdg_config_path(&self) -> Option<PathBuf> {
        let config_dir = env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| env::var_os("HOME").map(|home| Path::new(&home).join(".config")))?;

        let path = config_dir.join("collection-client").join("config.toml");
        if path.exists() {
            Some(path)
        } else {
            None
        }
    }

    /// Merge two configurations. Values from `higher` win field by field.
    fn merge_configs(&self, lower: FileConfig, higher: FileConfig) -> FileConfig {
        FileConfig {
            collection: match (lower.collection, higher.collection) {
                (Some(mut lower_collection), Some(higher_collection)) => {
                    if higher_collection.url_base.is_some() {
                        lower_collection.url_base = higher_collection.url_base;
                    }
                    if higher_collection.preferred_status_origin.is_some() {
                        lower_collection.preferred_status_origin =
                            higher_collection.preferred_status_origin;
                    }
                    Some(lower_collection)
                }
                (lower, higher) => higher.or(lower),
            },
            lookup: match (lower.lookup, higher.lookup) {
                (Some(mut lower_lookup), Some(higher_lookup)) => {
                    if higher_lookup.timeout.is_some() {
                        lower_lookup.timeout = higher_lookup.timeout;
                    }
                    Some(lower_lookup)
                }
                (lower, higher) => higher.or(lower),
            },
        }
    }

    fn validate_config(&self, config: &FileConfig) -> Result<(), CollectionError> {
        if let Some(url_base) = config.collection_url_base() {
            validate_url_base(url_base)
                .map_err(|e| CollectionError::config(format!("[collection] {}", e)))?;
        }

        if let Some(origin) = config.collection_preferred_status_origin() {
            origin
                .parse::<StatusOrigin>()
                .map_err(|e| CollectionError::config(format!("[collection] {}", e)))?;
        }

        if let Some(timeout) = config.lookup_timeout() {
            if !timeout.is_finite() {
                return Err(CollectionError::config(
                    "[lookup] timeout must be a finite number",
                ));
            }
        }

        Ok(())
    }
}

/// Source of environment variables.
///
/// The process environment is the usual implementation; a plain map lets
/// tests describe an environment without touching global state.
pub trait EnvLookup {
    fn get(&self, key: &str) -> Option<String>;
}

/// Reads from the real process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvLookup for ProcessEnv {
    fn get(&self, key: &str) -> Option<String> {
        env::var(key).ok()
    }
}

impl EnvLookup for HashMap<String, String> {
    fn get(&self, key: &str) -> Option<String> {
        HashMap::get(self, key).cloned()
    }
}

impl EnvLookup for HashMap<&str, &str> {
    fn get(&self, key: &str) -> Option<String> {
        HashMap::get(self, key).map(|value| value.to_string())
    }
}

/// Collection settings read from the environment.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnvConfig {
    pub token: Option<String>,
    pub url_base: Option<String>,
}

impl EnvConfig {
    /// Read the collection variables from `env`.
    ///
    /// A variable that is set but empty still counts as set.
    pub fn from_lookup(env: &dyn EnvLookup) -> Self {
        let token = env.get(ENV_API_TOKEN);
        let url_base = env.get(ENV_API_URL);

        if token.is_some() {
            tracing::debug!(variable = ENV_API_TOKEN, "Using token from the environment");
        }
        if let Some(url) = &url_base {
            tracing::debug!(
                variable = ENV_API_URL,
                url = %url,
                "Using URL base from the environment"
            );
        }

        Self { token, url_base }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(content: &str) -> NamedTempFile {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(content.as_bytes()).unwrap();
        temp_file.flush().unwrap();
        temp_file
    }

    #[test]
    fn test_load_valid_config() {
        let temp_file = write_config(
            r#"
[collection]
url_base = "https://collection.example.org/"
preferred_status_origin = "recommended"

[lookup]
timeout = 7
"#,
        );

        let manager = ConfigManager::new(false);
        let config = manager.load_file(temp_file.path()).unwrap();

        assert_eq!(
            config.collection_url_base(),
            Some("https://collection.example.org/")
        );
        assert_eq!(
            config.collection_preferred_status_origin(),
            Some("recommended")
        );
        assert_eq!(config.lookup_timeout(), Some(7.0));
    }

    #[test]
    fn test_missing_file_is_file_error() {
        let manager = ConfigManager::new(false);
        let result = manager.load_file("/nonexistent/collection-client.toml");
        assert!(matches!(result, Err(CollectionError::FileError { .. })));
    }

    #[test]
    fn test_invalid_url_base_is_rejected() {
        let temp_file = write_config(
            r#"
[collection]
url_base = "collection.example.org"
"#,
        );

        let manager = ConfigManager::new(false);
        let result = manager.load_file(temp_file.path());
        assert!(matches!(result, Err(CollectionError::ConfigError { .. })));
    }

    #[test]
    fn test_invalid_status_origin_is_rejected() {
        let temp_file = write_config(
            r#"
[collection]
preferred_status_origin = "oldest"
"#,
        );

        let manager = ConfigManager::new(false);
        assert!(manager.load_file(temp_file.path()).is_err());
    }

    #[test]
    fn test_non_numeric_timeout_is_rejected() {
        let temp_file = write_config(
            r#"
[lookup]
timeout = "soon"
"#,
        );

        let manager = ConfigManager::new(false);
        let result = manager.load_file(temp_file.path());
        assert!(matches!(result, Err(CollectionError::ConfigError { .. })));
    }

    #[test]
    fn test_merge_configs() {
        let manager = ConfigManager::new(false);

        let lower = FileConfig {
            collection: Some(CollectionSection {
                url_base: Some("http://lower.example".to_string()),
                preferred_status_origin: Some("latest".to_string()),
            }),
            lookup: Some(LookupSection { timeout: Some(3.0) }),
        };

        let higher = FileConfig {
            collection: Some(CollectionSection {
                url_base: Some("http://higher.example".to_string()),
                preferred_status_origin: None,
            }),
            lookup: None,
        };

        let merged = manager.merge_configs(lower, higher);

        assert_eq!(merged.collection_url_base(), Some("http://higher.example"));
        assert_eq!(merged.collection_preferred_status_origin(), Some("latest"));
        assert_eq!(merged.lookup_timeout(), Some(3.0));
    }

    #[test]
    fn test_env_config_from_map() {
        let env: HashMap<&str, &str> =
            HashMap::from([(ENV_API_TOKEN, ""), (ENV_API_URL, "https://env.example")]);

        let env_config = EnvConfig::from_lookup(&env);
        assert_eq!(env_config.token.as_deref(), Some(""));
        assert_eq!(env_config.url_base.as_deref(), Some("https://env.example"));

        let empty: HashMap<&str, &str> = HashMap::new();
        assert_eq!(EnvConfig::from_lookup(&empty), EnvConfig::default());
    }
}
