//! Access tokens for the statement API.

use crate::error::{check_status, DispatchError, Result};
use crate::settings::ApiSettings;
use crate::TokenProvider;
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use serde::Deserialize;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Where fresh tokens come from.
#[async_trait]
pub trait TokenSource: Send + Sync {
    async fn fetch_token(&self) -> Result<String>;
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
}

/// Client-credentials grant against the configured token endpoint.
pub struct HttpTokenSource {
    http: Client,
    settings: ApiSettings,
}

impl HttpTokenSource {
    pub fn new(settings: ApiSettings) -> Result<Self> {
        let http = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self::with_client(http, settings))
    }

    pub fn with_client(http: Client, settings: ApiSettings) -> Self {
        Self { http, settings }
    }
}

#[async_trait]
impl TokenSource for HttpTokenSource {
    async fn fetch_token(&self) -> Result<String> {
        let endpoint = self.settings.token_endpoint()?;
        let response = self
            .http
            .post(endpoint)
            .header(CONTENT_TYPE, &self.settings.token_content_type)
            .send()
            .await?;
        let body: TokenResponse = check_status(response).await?.json().await?;

        body.access_token
            .filter(|token| !token.is_empty())
            .ok_or_else(|| DispatchError::Token("response carried no access_token".into()))
    }
}

struct CachedToken {
    value: String,
    /// `None` when the lifetime reaches past what `Instant` can represent.
    expires_at: Option<Instant>,
}

impl CachedToken {
    fn is_fresh(&self) -> bool {
        self.expires_at.map_or(true, |at| at > Instant::now())
    }
}

/// Reuses a token until its configured lifetime has passed.
///
/// Concurrent callers wait on one refresh instead of each requesting a new
/// token.
pub struct CachedTokenProvider<S> {
    source: S,
    lifetime: Duration,
    cached: Mutex<Option<CachedToken>>,
}

impl<S: TokenSource> CachedTokenProvider<S> {
    pub fn new(source: S, lifetime: Duration) -> Self {
        Self {
            source,
            lifetime,
            cached: Mutex::new(None),
        }
    }

    /// Drops the cached token; the next call fetches a new one.
    pub async fn invalidate(&self) {
        *self.cached.lock().await = None;
    }
}

impl CachedTokenProvider<HttpTokenSource> {
    pub fn from_settings(settings: &ApiSettings) -> Result<Self> {
        let lifetime = settings.token_expiration;
        Ok(Self::new(HttpTokenSource::new(settings.clone())?, lifetime))
    }
}

#[async_trait]
impl<S: TokenSource> TokenProvider for CachedTokenProvider<S> {
    async fn token(&self) -> Result<String> {
        let mut cached = self.cached.lock().await;
        if let Some(token) = cached.as_ref().filter(|t| t.is_fresh()) {
            return Ok(token.value.clone());
        }

        let value = self.source.fetch_token().await?;
        tracing::debug!(lifetime_secs = self.lifetime.as_secs(), "refreshed API token");
        *cached = Some(CachedToken {
            value: value.clone(),
            expires_at: Instant::now().checked_add(self.lifetime),
        });
        Ok(value)
    }
}
