use super::{
    bearer_value, insert_credential, Authenticator, APP_KEY_HEADER, AUTH_ID_HEADER,
    AUTH_SECRET_HEADER, BEARER_HEADER,
};
use crate::error::Result;
use async_trait::async_trait;
use reqwest::header::HeaderMap;

/// Sends the app key with a fixed access key / secret key pair
#[derive(Clone)]
pub struct OAuth2HeaderAuthenticator {
    app_key: String,
    access_key: String,
    secret_key: String,
}

impl OAuth2HeaderAuthenticator {
    pub fn new(
        app_key: impl Into<String>,
        access_key: impl Into<String>,
        secret_key: impl Into<String>,
    ) -> Self {
        Self {
            app_key: app_key.into(),
            access_key: access_key.into(),
            secret_key: secret_key.into(),
        }
    }
}

#[async_trait]
impl Authenticator for OAuth2HeaderAuthenticator {
    async fn authenticate(&self, headers: &mut HeaderMap) -> Result<()> {
        insert_credential(headers, APP_KEY_HEADER, &self.app_key)?;
        insert_credential(headers, AUTH_ID_HEADER, &self.access_key)?;
        insert_credential(headers, AUTH_SECRET_HEADER, &self.secret_key)
    }
}

impl std::fmt::Debug for OAuth2HeaderAuthenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OAuth2HeaderAuthenticator")
            .field("app_key", &self.app_key)
            .field("access_key", &self.access_key)
            .finish_non_exhaustive()
    }
}

/// Sends the app key with a bearer token supplied up front
#[derive(Clone)]
pub struct BearerAuthenticator {
    app_key: String,
    token: String,
}

impl BearerAuthenticator {
    pub fn new(app_key: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            app_key: app_key.into(),
            token: token.into(),
        }
    }
}

#[async_trait]
impl Authenticator for BearerAuthenticator {
    async fn authenticate(&self, headers: &mut HeaderMap) -> Result<()> {
        insert_credential(headers, APP_KEY_HEADER, &self.app_key)?;
        insert_credential(headers, BEARER_HEADER, &bearer_value(&self.token))
    }
}

impl std::fmt::Debug for BearerAuthenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BearerAuthenticator")
            .field("app_key", &self.app_key)
            .finish_non_exhaustive()
    }
}
