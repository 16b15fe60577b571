use crate::error::{RdsError, Result};
use std::time::Duration;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_USER_AGENT: &str = concat!("nhncloud-rds/", env!("CARGO_PKG_VERSION"));

/// Credential material; which variant is used decides the authenticator.
#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    /// Access key / secret key sent as headers on every request
    OAuth2 {
        access_key: String,
        secret_key: String,
    },
    /// Pre-issued bearer token
    Bearer { token: String },
    /// Access key / secret key exchanged for bearer tokens, refreshed and cached on disk
    RefreshingBearer {
        access_key: String,
        secret_key: String,
    },
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OAuth2 { access_key, .. } => f
                .debug_struct("OAuth2")
                .field("access_key", access_key)
                .finish_non_exhaustive(),
            Self::Bearer { .. } => f.debug_struct("Bearer").finish_non_exhaustive(),
            Self::RefreshingBearer { access_key, .. } => f
                .debug_struct("RefreshingBearer")
                .field("access_key", access_key)
                .finish_non_exhaustive(),
        }
    }
}

/// Region, app key and credentials shared by every resource client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub region: String,
    pub app_key: String,
    pub credentials: Credentials,
}

impl ClientConfig {
    pub fn new(
        region: impl Into<String>,
        app_key: impl Into<String>,
        credentials: Credentials,
    ) -> Self {
        Self {
            region: region.into(),
            app_key: app_key.into(),
            credentials,
        }
    }

    /// Every string field must be non-empty.
    pub fn validate(&self) -> Result<()> {
        require("region", &self.region)?;
        require("app_key", &self.app_key)?;

        match &self.credentials {
            Credentials::OAuth2 {
                access_key,
                secret_key,
            }
            | Credentials::RefreshingBearer {
                access_key,
                secret_key,
            } => {
                require("access_key", access_key)?;
                require("secret_key", secret_key)
            }
            Credentials::Bearer { token } => require("token", token),
        }
    }
}

fn require(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(RdsError::validation(field, "must not be empty"));
    }
    Ok(())
}

/// Retry settings accepted for configuration compatibility.
///
/// The transport never consults them: every call is attempted exactly once and
/// failures are returned to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryConfig {
    pub max_retries: u32,
    pub min_wait: Duration,
    pub max_wait: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 0,
            min_wait: Duration::from_secs(1),
            max_wait: Duration::from_secs(30),
        }
    }
}

/// HTTP settings for resource API calls
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportConfig {
    pub timeout: Duration,
    pub user_agent: String,
    /// Replaces `https://{region}-{service}.api.nhncloudservice.com`
    pub base_url: Option<String>,
    pub retry: RetryConfig,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            base_url: None,
            retry: RetryConfig::default(),
        }
    }
}

impl TransportConfig {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }
}
