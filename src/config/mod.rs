//! Configuration management for sonar-query
//!
//! Settings are read from a TOML file, then overridden from the environment
//! (`SONAR_SECTION__KEY=value`) and validated as a whole.

use crate::error::{Result, SonarError};
use crate::query::{Ordering, Pagination, ReferenceScope};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

mod validator;

pub use validator::ConfigValidator;

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(rename = "_meta")]
    pub meta: MetaConfig,
    pub client: ClientConfig,
    pub query: QueryConfig,
    #[serde(default)]
    pub scope: ScopeConfig,
    #[serde(default)]
    pub profiles: HashMap<String, ProfileOverrides>,
}

/// Metadata about the configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetaConfig {
    pub schema_version: String,
    #[serde(default = "current_timestamp")]
    pub created_at: String,
    #[serde(default = "current_timestamp")]
    pub last_modified: String,
}

fn current_timestamp() -> String {
    chrono::Utc::now().to_rfc3339()
}

/// Backend connection settings, handed to the transport once per process
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Root of the REST API, e.g. `https://sonar.example.org/api/`
    pub base_address: String,
    pub timeout_ms: u64,
    /// Sent as `Accept: application/json; version=<api_version>`
    pub api_version: String,
    /// Name of the environment variable holding the API token
    pub token_env: String,
}

impl ClientConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Token from the configured environment variable, if set and non-empty
    pub fn token(&self) -> Option<String> {
        std::env::var(&self.token_env)
            .ok()
            .filter(|t| !t.trim().is_empty())
    }
}

/// Defaults for sample list queries
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryConfig {
    pub default_limit: u64,
    pub default_ordering: String,
    /// Property of the initial property filter in a fresh filter group
    pub default_property: String,
}

impl QueryConfig {
    pub fn pagination(&self) -> Pagination {
        Pagination::new(self.default_limit, 0)
    }

    /// Configured ordering, falling back to the built-in default when unparsable
    pub fn ordering(&self) -> Ordering {
        self.default_ordering.parse().unwrap_or_else(|e| {
            tracing::warn!("Invalid default ordering: {}", e);
            Ordering::default()
        })
    }
}

/// Dataset and reference scoping applied to every request
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ScopeConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_accession: Option<String>,
    #[serde(default)]
    pub data_sets: Vec<String>,
    #[serde(default)]
    pub reference_mode: ReferenceScope,
}

/// Named overrides, e.g. a staging backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference_accession: Option<String>,
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(SonarError::ConfigNotFound {
                path: path.to_path_buf(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| SonarError::Io {
            source: e,
            context: format!("Failed to read config file: {:?}", path),
        })?;
        let mut config: Config = toml::from_str(&content)?;

        config.apply_env_overrides();
        ConfigValidator::validate(&config)?;

        Ok(config)
    }

    /// Save configuration to a file, creating parent directories
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| SonarError::Io {
                source: e,
                context: format!("Failed to create config directory: {:?}", parent),
            })?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(|e| SonarError::Io {
            source: e,
            context: format!("Failed to write config file: {:?}", path),
        })?;
        Ok(())
    }

    /// Load configuration with a named profile applied
    pub fn load_with_profile(path: &Path, profile: &str) -> Result<Self> {
        let mut config = Self::load(path)?;
        config.apply_profile(profile)?;
        ConfigValidator::validate(&config)?;
        Ok(config)
    }

    /// Apply a profile's overrides; unknown profiles are an error
    pub fn apply_profile(&mut self, profile: &str) -> Result<()> {
        let overrides = self
            .profiles
            .get(profile)
            .cloned()
            .ok_or_else(|| SonarError::Config(format!("Unknown profile '{}'", profile)))?;

        if let Some(address) = overrides.base_address {
            self.client.base_address = address;
        }
        if let Some(version) = overrides.api_version {
            self.client.api_version = version;
        }
        if let Some(accession) = overrides.reference_accession {
            self.scope.reference_accession = Some(accession);
        }
        Ok(())
    }

    /// Apply environment variable overrides
    /// Environment variables in format: SONAR_SECTION__KEY=value
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(std::env::vars());
    }

    fn apply_overrides(&mut self, vars: impl IntoIterator<Item = (String, String)>) {
        for (key, value) in vars {
            if let Some(config_key) = key.strip_prefix("SONAR_") {
                if let Err(e) = self.set_value_from_env(config_key, &value) {
                    tracing::warn!("Failed to apply env override {}: {}", key, e);
                }
            }
        }
    }

    fn set_value_from_env(&mut self, path: &str, value: &str) -> Result<()> {
        match path {
            "CLIENT__BASE_ADDRESS" => self.client.base_address = value.to_string(),
            "CLIENT__TIMEOUT_MS" => {
                self.client.timeout_ms = parse_number(path, value)?;
            }
            "CLIENT__API_VERSION" => self.client.api_version = value.to_string(),
            "CLIENT__TOKEN_ENV" => self.client.token_env = value.to_string(),
            "QUERY__DEFAULT_LIMIT" => {
                self.query.default_limit = parse_number(path, value)?;
            }
            "QUERY__DEFAULT_ORDERING" => self.query.default_ordering = value.to_string(),
            "QUERY__DEFAULT_PROPERTY" => self.query.default_property = value.to_string(),
            "SCOPE__REFERENCE_ACCESSION" => {
                self.scope.reference_accession =
                    Some(value.to_string()).filter(|v| !v.is_empty());
            }
            "SCOPE__DATA_SETS" => {
                self.scope.data_sets = value
                    .split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(String::from)
                    .collect();
            }
            _ => {
                tracing::debug!("Unknown env config key: {}", path);
            }
        }
        Ok(())
    }

    /// Get the default configuration file path
    pub fn default_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| SonarError::Config("Cannot determine config directory".to_string()))?;

        Ok(config_dir.join("sonar-query").join("config.toml"))
    }
}

fn parse_number(path: &str, value: &str) -> Result<u64> {
    value
        .trim()
        .parse()
        .map_err(|_| SonarError::InvalidConfigValue {
            path: path.to_string(),
            message: format!("Cannot parse '{}' as a number", value),
        })
}

impl Default for Config {
    fn default() -> Self {
        Self {
            meta: MetaConfig {
                schema_version: "1.0.0".to_string(),
                created_at: current_timestamp(),
                last_modified: current_timestamp(),
            },
            client: ClientConfig {
                base_address: "http://localhost:8000/api/".to_string(),
                timeout_ms: 50_000,
                api_version: "1.0.1".to_string(),
                token_env: "SONAR_TOKEN".to_string(),
            },
            query: QueryConfig {
                default_limit: 10,
                default_ordering: "-collection_date".to_string(),
                default_property: "collection_date".to_string(),
            },
            scope: ScopeConfig::default(),
            profiles: HashMap::new(),
        }
    }
}
