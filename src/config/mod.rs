// Configuration management
mod client;

pub use client::{
    ClientConfig, Credentials, RetryConfig, TransportConfig, DEFAULT_TIMEOUT, DEFAULT_USER_AGENT,
};

use crate::error::{RdsError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

const APP_DIR: &str = "nhncloud-rds";

/// Settings read by the command line tool from `config.toml` and the environment
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Config {
    #[serde(default)]
    pub credentials: CredentialsConfig,
    #[serde(default)]
    pub transport: TransportFileConfig,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AuthMode {
    /// Access key / secret key headers on every request
    Oauth2,
    /// Fixed bearer token
    Bearer,
    /// Bearer token minted from the access key / secret key and cached
    #[default]
    Refreshing,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct CredentialsConfig {
    pub region: Option<String>,
    pub app_key: Option<String>,
    #[serde(default)]
    pub auth: AuthMode,
    pub access_key: Option<String>,
    pub secret_key: Option<String>,
    pub token: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TransportFileConfig {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    pub base_url: Option<String>,
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT.as_secs()
}

impl Default for TransportFileConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            base_url: None,
        }
    }
}

impl Config {
    /// Get the config directory path
    ///
    /// Priority:
    /// 1. XDG_CONFIG_HOME/nhncloud-rds (if env var is set)
    /// 2. ~/.config/nhncloud-rds (if ~/.config exists)
    /// 3. ~/.nhncloud-rds (fallback on Unix, doesn't create ~/.config)
    /// 4. Platform default on Windows
    pub fn config_dir() -> Result<PathBuf> {
        if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME") {
            if !xdg_config.is_empty() {
                return Ok(PathBuf::from(xdg_config).join(APP_DIR));
            }
        }

        #[cfg(unix)]
        {
            if let Some(home_dir) = dirs::home_dir() {
                let xdg_config = home_dir.join(".config");
                if xdg_config.exists() {
                    return Ok(xdg_config.join(APP_DIR));
                }
                return Ok(home_dir.join(format!(".{}", APP_DIR)));
            }
        }

        #[cfg(not(unix))]
        {
            if let Some(config_dir) = dirs::config_dir() {
                return Ok(config_dir.join(APP_DIR));
            }
        }

        Err(RdsError::Config(
            "Could not determine config directory".to_string(),
        ))
    }

    pub fn config_file_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Load configuration from file, then apply environment overrides
    pub fn load() -> Result<Self> {
        let config_path = Self::config_file_path()?;

        let mut config = if config_path.exists() {
            tracing::debug!("Loading config from: {}", config_path.display());
            let contents = fs::read_to_string(&config_path)
                .map_err(|e| RdsError::Config(format!("Failed to read config file: {}", e)))?;
            Self::parse(&contents)?
        } else {
            tracing::debug!(
                "Config file not found at {}, using defaults",
                config_path.display()
            );
            Config::default()
        };

        config.apply_env(|name| std::env::var(name).ok());
        Ok(config)
    }

    pub fn parse(contents: &str) -> Result<Self> {
        toml::from_str(contents)
            .map_err(|e| RdsError::Config(format!("Failed to parse config file: {}", e)))
    }

    /// Override file values with `NHN_RDS_*` variables as returned by `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let creds = &mut self.credentials;
        let overrides: [(&str, &mut Option<String>); 5] = [
            ("NHN_RDS_REGION", &mut creds.region),
            ("NHN_RDS_APP_KEY", &mut creds.app_key),
            ("NHN_RDS_ACCESS_KEY", &mut creds.access_key),
            ("NHN_RDS_SECRET_KEY", &mut creds.secret_key),
            ("NHN_RDS_TOKEN", &mut creds.token),
        ];

        for (name, slot) in overrides {
            if let Some(value) = lookup(name).filter(|v| !v.is_empty()) {
                tracing::debug!("Using {} from environment", name);
                *slot = Some(value);
            }
        }
    }

    /// Build the library configuration; fields that are missing come through
    /// as empty strings and are reported by [`ClientConfig::validate`].
    pub fn client_config(&self) -> Result<ClientConfig> {
        let creds = &self.credentials;
        let value = |field: &Option<String>| field.clone().unwrap_or_default();

        let credentials = match creds.auth {
            AuthMode::Oauth2 => Credentials::OAuth2 {
                access_key: value(&creds.access_key),
                secret_key: value(&creds.secret_key),
            },
            AuthMode::Bearer => Credentials::Bearer {
                token: value(&creds.token),
            },
            AuthMode::Refreshing => Credentials::RefreshingBearer {
                access_key: value(&creds.access_key),
                secret_key: value(&creds.secret_key),
            },
        };

        let config = ClientConfig::new(value(&creds.region), value(&creds.app_key), credentials);
        config.validate()?;
        Ok(config)
    }

    pub fn transport_config(&self) -> TransportConfig {
        let mut transport =
            TransportConfig::default().with_timeout(Duration::from_secs(self.transport.timeout_secs));
        if let Some(base_url) = &self.transport.base_url {
            transport = transport.with_base_url(base_url.clone());
        }
        transport
    }

    /// Write a commented sample config file; never overwrites an existing one
    pub fn create_sample() -> Result<PathBuf> {
        let config_dir = Self::config_dir()?;
        let config_path = Self::config_file_path()?;

        if !config_dir.exists() {
            fs::create_dir_all(&config_dir).map_err(|e| {
                RdsError::Config(format!("Failed to create config directory: {}", e))
            })?;
        }

        if config_path.exists() {
            return Err(RdsError::Config(format!(
                "Config file already exists at: {}",
                config_path.display()
            )));
        }

        fs::write(&config_path, SAMPLE_CONFIG)
            .map_err(|e| RdsError::Config(format!("Failed to write sample config: {}", e)))?;

        tracing::info!("Created sample config at: {}", config_path.display());
        Ok(config_path)
    }
}

const SAMPLE_CONFIG: &str = r#"# nhncloud-rds configuration
# Location priority:
#   1. $XDG_CONFIG_HOME/nhncloud-rds/config.toml (if XDG_CONFIG_HOME is set)
#   2. ~/.config/nhncloud-rds/config.toml (if ~/.config exists)
#   3. ~/.nhncloud-rds/config.toml (fallback)
#
# Every credential can also be set via environment variables:
#   NHN_RDS_REGION, NHN_RDS_APP_KEY, NHN_RDS_ACCESS_KEY,
#   NHN_RDS_SECRET_KEY, NHN_RDS_TOKEN

[credentials]
# Region (kr1, kr2, jp1)
region = "kr1"

# App key of the RDS service
app_key = ""

# Authentication mode: oauth2, bearer or refreshing (default)
auth = "refreshing"

# User access key ID and secret access key (oauth2, refreshing)
access_key = ""
secret_key = ""

# Pre-issued bearer token (bearer)
# token = ""

[transport]
# Request timeout in seconds
timeout_secs = 30
"#;
