use super::{bearer_value, insert_credential, Authenticator, TokenStore, APP_KEY_HEADER, BEARER_HEADER};
use crate::error::{RdsError, Result, TokenError};
use crate::models::CachedToken;
use async_trait::async_trait;
use base64::prelude::{Engine as _, BASE64_STANDARD};
use chrono::Utc;
use reqwest::header::{HeaderMap, AUTHORIZATION, CONTENT_TYPE};
use reqwest::StatusCode;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};

pub const DEFAULT_TOKEN_ENDPOINT: &str = "https://oauth.api.nhncloudservice.com/oauth2/token/create";

/// Fixed timeout for the mint call. It does not follow the deadline of the
/// API call that triggered the refresh.
pub const TOKEN_MINT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    token_type: Option<String>,
    expires_in: i64,
}

/// Bearer authenticator that mints tokens from an access key / secret key pair
/// and refreshes them shortly before they expire.
///
/// The token lives behind a read-write lock; refreshes are serialized by a
/// separate mutex and re-check freshness after acquiring it, so N callers
/// racing the same stale token trigger a single mint. A caller that read the
/// token just before a refresh may still send the old one; the expiry skew
/// keeps that token valid for the request.
pub struct RefreshingTokenAuthenticator {
    app_key: String,
    access_key: String,
    secret_key: String,
    token_endpoint: String,
    http: reqwest::Client,
    store: Arc<dyn TokenStore>,
    token: RwLock<Option<CachedToken>>,
    refresh: Mutex<()>,
}

impl RefreshingTokenAuthenticator {
    /// Build the authenticator, warming it from `store` when the stored token is
    /// still fresh. Store failures only cost a mint and are not reported.
    pub fn new(
        app_key: impl Into<String>,
        access_key: impl Into<String>,
        secret_key: impl Into<String>,
        store: Arc<dyn TokenStore>,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(TOKEN_MINT_TIMEOUT)
            .build()
            .map_err(RdsError::Transport)?;

        let cached = match store.load() {
            Ok(Some(token)) if token.is_fresh() => {
                tracing::debug!("Using cached token, expires in {}", token.expiration_display());
                Some(token)
            }
            Ok(Some(_)) => {
                tracing::debug!("Cached token is expired or about to expire, ignoring it");
                None
            }
            Ok(None) => None,
            Err(e) => {
                tracing::debug!("Could not load cached token: {}", e);
                None
            }
        };

        Ok(Self {
            app_key: app_key.into(),
            access_key: access_key.into(),
            secret_key: secret_key.into(),
            token_endpoint: DEFAULT_TOKEN_ENDPOINT.to_string(),
            http,
            store,
            token: RwLock::new(cached),
            refresh: Mutex::new(()),
        })
    }

    /// Mint tokens from a different OAuth2 endpoint
    pub fn with_token_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.token_endpoint = endpoint.into();
        self
    }

    /// Snapshot of the current token, fresh or not
    pub async fn cached_token(&self) -> Option<CachedToken> {
        self.token.read().await.clone()
    }

    /// Return a token valid for at least the expiry skew, minting one if needed.
    pub async fn valid_token(&self) -> Result<String> {
        if let Some(token) = self.fresh_token().await {
            return Ok(token);
        }

        let _refresh = self.refresh.lock().await;

        // Another caller may have refreshed while we waited for the lock.
        if let Some(token) = self.fresh_token().await {
            tracing::debug!("Token was refreshed by a concurrent caller");
            return Ok(token);
        }

        let minted = self.mint().await?;
        let value = minted.token.clone();

        if let Err(e) = self.store.save(&minted) {
            tracing::debug!("Could not persist token cache: {}", e);
        }
        *self.token.write().await = Some(minted);

        Ok(value)
    }

    async fn fresh_token(&self) -> Option<String> {
        self.token
            .read()
            .await
            .as_ref()
            .filter(|token| token.is_fresh())
            .map(|token| token.token.clone())
    }

    async fn mint(&self) -> std::result::Result<CachedToken, TokenError> {
        tracing::debug!("Requesting access token from {}", self.token_endpoint);

        let credentials =
            BASE64_STANDARD.encode(format!("{}:{}", self.access_key, self.secret_key));
        let request = self
            .http
            .post(&self.token_endpoint)
            .header(AUTHORIZATION, format!("Basic {}", credentials))
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body("grant_type=client_credentials")
            .build()
            .map_err(TokenError::Request)?;

        let response = self
            .http
            .execute(request)
            .await
            .map_err(TokenError::Transport)?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            return Err(TokenError::Status { status, body });
        }

        let body = response.bytes().await.map_err(TokenError::BodyRead)?;
        let parsed: TokenResponse = serde_json::from_slice(&body).map_err(TokenError::Decode)?;

        tracing::debug!(
            "Access token received ({}), expires in {} seconds",
            parsed.token_type.as_deref().unwrap_or("bearer"),
            parsed.expires_in
        );

        CachedToken::new(parsed.access_token, Utc::now(), parsed.expires_in)
            .ok_or(TokenError::InvalidExpiry(parsed.expires_in))
    }
}

#[async_trait]
impl Authenticator for RefreshingTokenAuthenticator {
    async fn authenticate(&self, headers: &mut HeaderMap) -> Result<()> {
        let token = self.valid_token().await?;
        insert_credential(headers, APP_KEY_HEADER, &self.app_key)?;
        insert_credential(headers, BEARER_HEADER, &bearer_value(&token))
    }
}

impl std::fmt::Debug for RefreshingTokenAuthenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RefreshingTokenAuthenticator")
            .field("app_key", &self.app_key)
            .field("access_key", &self.access_key)
            .field("token_endpoint", &self.token_endpoint)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::token_cache::MockTokenStore;
    use crate::auth::{FileTokenStore, MemoryTokenStore};
    use chrono::Duration as ChronoDuration;
    use wiremock::matchers::{body_string, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const TOKEN_PATH: &str = "/oauth2/token/create";

    fn token_body(token: &str) -> serde_json::Value {
        serde_json::json!({
            "access_token": token,
            "token_type": "Bearer",
            "expires_in": 86400
        })
    }

    fn authenticator(server: &MockServer, store: Arc<dyn TokenStore>) -> RefreshingTokenAuthenticator {
        RefreshingTokenAuthenticator::new("app", "access", "secret", store)
            .unwrap()
            .with_token_endpoint(format!("{}{}", server.uri(), TOKEN_PATH))
    }

    fn stale_token() -> CachedToken {
        // Still valid for 2 minutes, inside the 5 minute skew.
        CachedToken::new("old-token", Utc::now() - ChronoDuration::hours(1), 3600 + 120).unwrap()
    }

    #[tokio::test]
    async fn test_mint_request_shape() {
        let server = MockServer::start().await;
        let expected_basic = format!("Basic {}", BASE64_STANDARD.encode("access:secret"));
        Mock::given(method("POST"))
            .and(path(TOKEN_PATH))
            .and(header("authorization", expected_basic.as_str()))
            .and(header("content-type", "application/x-www-form-urlencoded"))
            .and(body_string("grant_type=client_credentials"))
            .respond_with(ResponseTemplate::new(200).set_body_json(token_body("minted")))
            .expect(1)
            .mount(&server)
            .await;

        let auth = authenticator(&server, Arc::new(MemoryTokenStore::new()));
        let mut headers = HeaderMap::new();
        auth.authenticate(&mut headers).await.unwrap();

        assert_eq!(headers[APP_KEY_HEADER], "app");
        assert_eq!(headers[BEARER_HEADER], "Bearer minted");
    }

    #[tokio::test]
    async fn test_fresh_token_is_reused_without_network() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(TOKEN_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(token_body("minted")))
            .expect(1)
            .mount(&server)
            .await;

        let auth = authenticator(&server, Arc::new(MemoryTokenStore::new()));
        for _ in 0..5 {
            assert_eq!(auth.valid_token().await.unwrap(), "minted");
        }
    }

    #[tokio::test]
    async fn test_fresh_stored_token_skips_mint() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(token_body("minted")))
            .expect(0)
            .mount(&server)
            .await;

        let stored = CachedToken::new("stored", Utc::now(), 3600).unwrap();
        let auth = authenticator(&server, Arc::new(MemoryTokenStore::with_token(stored)));
        assert_eq!(auth.valid_token().await.unwrap(), "stored");
    }

    #[tokio::test]
    async fn test_stale_stored_token_is_replaced_and_persisted() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(token_body("minted")))
            .expect(1)
            .mount(&server)
            .await;

        let store = Arc::new(MemoryTokenStore::with_token(stale_token()));
        let auth = authenticator(&server, store.clone());

        assert_eq!(auth.valid_token().await.unwrap(), "minted");
        let persisted = store.load().unwrap().unwrap();
        assert_eq!(persisted.token, "minted");
        assert_eq!(persisted.expires_at - persisted.issued_at, ChronoDuration::seconds(86400));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_callers_share_one_mint() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(token_body("minted"))
                    .set_delay(Duration::from_millis(200)),
            )
            .expect(1)
            .mount(&server)
            .await;

        let store = Arc::new(MemoryTokenStore::with_token(stale_token()));
        let auth = Arc::new(authenticator(&server, store));

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let auth = auth.clone();
                tokio::spawn(async move { auth.valid_token().await })
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.await.unwrap().unwrap(), "minted");
        }
    }

    #[tokio::test]
    async fn test_non_200_is_a_token_error_and_next_call_retries() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_string("invalid client"))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(token_body("second")))
            .mount(&server)
            .await;

        let auth = authenticator(&server, Arc::new(MemoryTokenStore::new()));

        let err = auth.valid_token().await.unwrap_err();
        match err {
            RdsError::Token(TokenError::Status { status, body }) => {
                assert_eq!(status, StatusCode::UNAUTHORIZED);
                assert_eq!(body, "invalid client");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(auth.cached_token().await.is_none());

        assert_eq!(auth.valid_token().await.unwrap(), "second");
    }

    #[tokio::test]
    async fn test_malformed_token_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{\"access_token\":"))
            .mount(&server)
            .await;

        let auth = authenticator(&server, Arc::new(MemoryTokenStore::new()));
        let err = auth.valid_token().await.unwrap_err();
        assert!(matches!(err, RdsError::Token(TokenError::Decode(_))));
    }

    #[tokio::test]
    async fn test_out_of_range_expiry_is_a_token_error() {
        for expires_in in [i64::MAX, 0, -60] {
            let server = MockServer::start().await;
            Mock::given(method("POST"))
                .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                    "access_token": "t",
                    "token_type": "Bearer",
                    "expires_in": expires_in
                })))
                .mount(&server)
                .await;

            let auth = authenticator(&server, Arc::new(MemoryTokenStore::new()));
            let err = auth.valid_token().await.unwrap_err();
            assert!(
                matches!(err, RdsError::Token(TokenError::InvalidExpiry(v)) if v == expires_in),
                "{expires_in}: {err:?}"
            );
            assert!(auth.cached_token().await.is_none());
        }
    }

    #[tokio::test]
    async fn test_unreachable_token_endpoint() {
        let auth = RefreshingTokenAuthenticator::new(
            "app",
            "access",
            "secret",
            Arc::new(MemoryTokenStore::new()),
        )
        .unwrap()
        .with_token_endpoint("http://127.0.0.1:1/oauth2/token/create");

        let err = auth.valid_token().await.unwrap_err();
        assert!(matches!(err, RdsError::Token(TokenError::Transport(_))));
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_store_failures_are_swallowed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(token_body("minted")))
            .expect(1)
            .mount(&server)
            .await;

        let mut store = MockTokenStore::new();
        store
            .expect_load()
            .times(1)
            .returning(|| Err(RdsError::Config("unreadable".to_string())));
        store
            .expect_save()
            .times(1)
            .returning(|_| Err(RdsError::Config("disk full".to_string())));

        let auth = authenticator(&server, Arc::new(store));
        assert_eq!(auth.valid_token().await.unwrap(), "minted");
        assert_eq!(auth.valid_token().await.unwrap(), "minted");
    }

    #[tokio::test]
    async fn test_file_cache_is_shared_across_instances() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(token_body("minted")))
            .expect(1)
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let cache_path = dir.path().join("token-cache").join("mysql.json");

        let first = authenticator(&server, Arc::new(FileTokenStore::new(&cache_path)));
        assert_eq!(first.valid_token().await.unwrap(), "minted");

        let second = authenticator(&server, Arc::new(FileTokenStore::new(&cache_path)));
        assert_eq!(second.valid_token().await.unwrap(), "minted");
    }

    #[tokio::test]
    async fn test_expired_file_cache_triggers_mint() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(token_body("fresh")))
            .expect(1)
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let store = FileTokenStore::new(dir.path().join("mysql.json"));
        store.save(&stale_token()).unwrap();

        let auth = authenticator(&server, Arc::new(store.clone()));
        assert!(auth.cached_token().await.is_none());
        assert_eq!(auth.valid_token().await.unwrap(), "fresh");
        assert_eq!(store.load().unwrap().unwrap().token, "fresh");
    }

    #[test]
    fn test_debug_hides_secret_key() {
        let auth = RefreshingTokenAuthenticator::new(
            "app",
            "access",
            "very-secret",
            Arc::new(MemoryTokenStore::new()),
        )
        .unwrap();
        assert!(!format!("{:?}", auth).contains("very-secret"));
    }
}
