use crate::auth::Authenticator;
use crate::config::{RetryConfig, TransportConfig};
use crate::error::{RdsError, Result};
use crate::models::ResponseEnvelope;
use crate::response::parse_response;
use reqwest::header::{HeaderValue, CONTENT_TYPE, USER_AGENT};
use reqwest::{Method, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;

pub const API_DOMAIN: &str = "api.nhncloudservice.com";

/// Default HTTPS base URL for a service, e.g. `https://kr1-rds-mysql.api.nhncloudservice.com`
pub fn service_base_url(region: &str, service_suffix: &str) -> String {
    format!("https://{}-{}.{}", region, service_suffix, API_DOMAIN)
}

/// Authenticated HTTP client bound to one service host
pub struct Transport {
    http: reqwest::Client,
    base_url: Url,
    authenticator: Arc<dyn Authenticator>,
    user_agent: HeaderValue,
    retry: RetryConfig,
}

impl Transport {
    pub fn new(
        base_url: &str,
        authenticator: Arc<dyn Authenticator>,
        config: &TransportConfig,
    ) -> Result<Self> {
        let mut base_url = Url::parse(base_url)
            .map_err(|e| RdsError::Config(format!("Invalid base URL '{}': {}", base_url, e)))?;
        // Trailing slash so request paths land under any prefix, e.g. `http://proxy/rds/`
        if !base_url.path().ends_with('/') {
            let prefixed = format!("{}/", base_url.path());
            base_url.set_path(&prefixed);
        }
        let user_agent = HeaderValue::from_str(&config.user_agent)
            .map_err(|_| RdsError::validation("user_agent", "not a valid header value"))?;

        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(RdsError::Transport)?;

        Ok(Self {
            http,
            base_url,
            authenticator,
            user_agent,
            retry: config.retry.clone(),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Declared retry settings. Not applied: each call is sent once.
    pub fn retry_config(&self) -> &RetryConfig {
        &self.retry
    }

    /// Start a request for `path` (e.g. `/v3.0/db-instances`), resolved below
    /// the base URL's path.
    pub fn request(&self, method: Method, path: &str) -> Result<RequestBuilder> {
        let url = self
            .base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| RdsError::Config(format!("Invalid request path '{}': {}", path, e)))?;
        Ok(self.http.request(method, url))
    }

    /// Authenticate and send the request. Transport failures are returned as
    /// they come; the status code is not inspected here.
    pub async fn execute(&self, builder: RequestBuilder) -> Result<Response> {
        let mut request = builder.build().map_err(RdsError::Transport)?;

        self.authenticator
            .authenticate(request.headers_mut())
            .await?;

        let headers = request.headers_mut();
        if !headers.contains_key(CONTENT_TYPE) {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        }
        headers.insert(USER_AGENT, self.user_agent.clone());

        tracing::debug!("{} {}", request.method(), request.url());
        let response = self
            .http
            .execute(request)
            .await
            .map_err(RdsError::Transport)?;
        tracing::debug!("Received HTTP {}", response.status());

        Ok(response)
    }

    /// Send the request and run the response through the parser.
    pub async fn call<T>(&self, builder: RequestBuilder) -> Result<T>
    where
        T: DeserializeOwned + ResponseEnvelope,
    {
        let response = self.execute(builder).await?;
        parse_response(response).await
    }

    pub async fn get<T>(&self, path: &str) -> Result<T>
    where
        T: DeserializeOwned + ResponseEnvelope,
    {
        self.call(self.request(Method::GET, path)?).await
    }

    pub async fn get_with_query<T>(&self, path: &str, query: &[(&str, String)]) -> Result<T>
    where
        T: DeserializeOwned + ResponseEnvelope,
    {
        let path = with_query(path, query);
        self.call(self.request(Method::GET, &path)?).await
    }

    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned + ResponseEnvelope,
    {
        self.call(self.request(Method::POST, path)?.json(body)).await
    }

    /// POST without a body, for actions such as start / stop.
    pub async fn post_empty<T>(&self, path: &str) -> Result<T>
    where
        T: DeserializeOwned + ResponseEnvelope,
    {
        self.call(self.request(Method::POST, path)?).await
    }

    pub async fn put<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned + ResponseEnvelope,
    {
        self.call(self.request(Method::PUT, path)?.json(body)).await
    }

    pub async fn delete<T>(&self, path: &str) -> Result<T>
    where
        T: DeserializeOwned + ResponseEnvelope,
    {
        self.call(self.request(Method::DELETE, path)?).await
    }
}

impl std::fmt::Debug for Transport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transport")
            .field("base_url", &self.base_url.as_str())
            .field("user_agent", &self.user_agent)
            .finish_non_exhaustive()
    }
}

/// Append url-encoded query parameters to `path`.
pub fn with_query(path: &str, query: &[(&str, String)]) -> String {
    if query.is_empty() {
        return path.to_string();
    }

    let params: Vec<String> = query
        .iter()
        .map(|(key, value)| format!("{}={}", key, urlencoding::encode(value)))
        .collect();
    format!("{}?{}", path, params.join("&"))
}
