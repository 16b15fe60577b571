// Request authentication strategies
mod refreshing;
mod static_auth;
mod token_cache;

pub use refreshing::{RefreshingTokenAuthenticator, DEFAULT_TOKEN_ENDPOINT, TOKEN_MINT_TIMEOUT};
pub use static_auth::{BearerAuthenticator, OAuth2HeaderAuthenticator};
pub use token_cache::{FileTokenStore, MemoryTokenStore, TokenStore};

use crate::error::{RdsError, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

// Lowercase so they can be used with `HeaderName::from_static`.
pub const APP_KEY_HEADER: &str = "x-tc-app-key";
pub const AUTH_ID_HEADER: &str = "x-tc-authentication-id";
pub const AUTH_SECRET_HEADER: &str = "x-tc-authentication-secret";
pub const BEARER_HEADER: &str = "x-nhn-authorization";

/// Decorates outgoing request headers with credentials
#[async_trait]
pub trait Authenticator: Send + Sync {
    async fn authenticate(&self, headers: &mut HeaderMap) -> Result<()>;
}

/// Insert a credential header, marking everything but the app key as sensitive
/// so it is redacted from `Debug` output.
pub(crate) fn insert_credential(
    headers: &mut HeaderMap,
    name: &'static str,
    value: &str,
) -> Result<()> {
    let mut header_value = HeaderValue::from_str(value).map_err(|_| {
        RdsError::validation(name, "contains characters not allowed in an HTTP header")
    })?;
    header_value.set_sensitive(name != APP_KEY_HEADER);
    headers.insert(HeaderName::from_static(name), header_value);
    Ok(())
}

pub(crate) fn bearer_value(token: &str) -> String {
    format!("Bearer {}", token)
}
