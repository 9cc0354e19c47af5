use crate::error::Result;
use moebridge_core::{ConfigError, ConfigProvider};
use std::time::Duration;
use url::Url;

pub const MAPPING_CACHE_EXPIRATION: &str = "MAPPING_CACHE_EXPIRATION";
pub const MAPPING_CACHE_BLOCK_PREFIX: &str = "MAPPING_CACHE_BLOCK_PREFIX";
pub const MAPPING_CACHE_INSTRUCTOR_PREFIX: &str = "MAPPING_CACHE_INSTRUCTOR_PREFIX";

pub const API_HOST_NAME: &str = "API_HOST_NAME";
pub const API_HOST_TOKEN_URL: &str = "API_HOST_TOKEN_URL";
pub const API_HOST_STATEMENTS_URL: &str = "API_HOST_STATEMENTS_URL";
pub const API_HOST_CLIENT_ID: &str = "API_HOST_CLIENT_ID";
pub const API_HOST_CLIENT_SECRET: &str = "API_HOST_CLIENT_SECRET";
pub const API_HOST_TOKEN_TYPE: &str = "API_HOST_TOKEN_TYPE";
pub const API_HOST_GRANT_TYPE: &str = "API_HOST_GRANT_TYPE";
pub const API_HOST_SCOPE: &str = "API_HOST_SCOPE";
pub const API_HOST_TOKEN_CONTENT_TYPE: &str = "API_HOST_TOKEN_CONTENT_TYPE";
pub const API_HOST_STATEMENTS_CONTENT_TYPE: &str = "API_HOST_STATEMENTS_CONTENT_TYPE";
pub const API_HOST_TOKEN_EXPIRATION: &str = "API_HOST_TOKEN_EXPIRATION";

pub const EVENT_ROUTING_BACKEND_MAX_RETRIES: &str = "EVENT_ROUTING_BACKEND_MAX_RETRIES";
pub const EVENT_ROUTING_BACKEND_COUNTDOWN: &str = "EVENT_ROUTING_BACKEND_COUNTDOWN";

const DEFAULT_CACHE_EXPIRATION_SECS: u64 = 3600;
const DEFAULT_BLOCK_PREFIX: &str = "moe_block";
const DEFAULT_INSTRUCTOR_PREFIX: &str = "moe_instructor";
const DEFAULT_MAX_RETRIES: u32 = 3;
const DEFAULT_COUNTDOWN_SECS: u64 = 30;

// Cache and token lifetimes are capped at one year.
const MAX_CACHE_EXPIRATION_SECS: u64 = 365 * 24 * 60 * 60;
const MAX_TOKEN_EXPIRATION_MINUTES: u64 = 365 * 24 * 60;

fn at_most(key: &str, value: u64, max: u64) -> std::result::Result<u64, ConfigError> {
    if value > max {
        return Err(ConfigError::Invalid {
            key: key.to_string(),
            value: value.to_string(),
        });
    }
    Ok(value)
}

/// Lifetime and key prefixes of the lookup caches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheSettings {
    pub expiration: Duration,
    pub block_prefix: String,
    pub instructor_prefix: String,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            expiration: Duration::from_secs(DEFAULT_CACHE_EXPIRATION_SECS),
            block_prefix: DEFAULT_BLOCK_PREFIX.to_string(),
            instructor_prefix: DEFAULT_INSTRUCTOR_PREFIX.to_string(),
        }
    }
}

impl CacheSettings {
    pub fn from_provider(config: &impl ConfigProvider) -> std::result::Result<Self, ConfigError> {
        let defaults = Self::default();
        let seconds = at_most(
            MAPPING_CACHE_EXPIRATION,
            config.parse_or(MAPPING_CACHE_EXPIRATION, DEFAULT_CACHE_EXPIRATION_SECS)?,
            MAX_CACHE_EXPIRATION_SECS,
        )?;
        Ok(Self {
            expiration: Duration::from_secs(seconds),
            block_prefix: config
                .get(MAPPING_CACHE_BLOCK_PREFIX)
                .unwrap_or(defaults.block_prefix),
            instructor_prefix: config
                .get(MAPPING_CACHE_INSTRUCTOR_PREFIX)
                .unwrap_or(defaults.instructor_prefix),
        })
    }
}

/// Connection parameters of the MOE statement API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiSettings {
    /// Host name, optionally with a scheme; `https` is assumed otherwise.
    pub host_name: String,
    pub token_url: String,
    pub statements_url: String,
    pub client_id: String,
    pub client_secret: String,
    pub token_type: String,
    pub grant_type: String,
    pub scope: String,
    pub token_content_type: String,
    pub statements_content_type: String,
    /// How long an issued token is reused.
    pub token_expiration: Duration,
}

impl ApiSettings {
    pub fn from_provider(config: &impl ConfigProvider) -> std::result::Result<Self, ConfigError> {
        let minutes = at_most(
            API_HOST_TOKEN_EXPIRATION,
            config.parse_required(API_HOST_TOKEN_EXPIRATION)?,
            MAX_TOKEN_EXPIRATION_MINUTES,
        )?;
        Ok(Self {
            host_name: config.require(API_HOST_NAME)?,
            token_url: config.require(API_HOST_TOKEN_URL)?,
            statements_url: config.require(API_HOST_STATEMENTS_URL)?,
            client_id: config.require(API_HOST_CLIENT_ID)?,
            client_secret: config.require(API_HOST_CLIENT_SECRET)?,
            token_type: config.require(API_HOST_TOKEN_TYPE)?,
            grant_type: config.require(API_HOST_GRANT_TYPE)?,
            scope: config.require(API_HOST_SCOPE)?,
            token_content_type: config.require(API_HOST_TOKEN_CONTENT_TYPE)?,
            statements_content_type: config.require(API_HOST_STATEMENTS_CONTENT_TYPE)?,
            token_expiration: Duration::from_secs(minutes * 60),
        })
    }

    fn base_url(&self) -> Result<Url> {
        let mut base = if self.host_name.contains("://") {
            self.host_name.clone()
        } else {
            format!("https://{}", self.host_name)
        };
        if !base.ends_with('/') {
            base.push('/');
        }
        Ok(Url::parse(&base)?)
    }

    /// Client-credentials endpoint with its query parameters.
    pub fn token_endpoint(&self) -> Result<Url> {
        let mut url = self
            .base_url()?
            .join(self.token_url.trim_start_matches('/'))?;
        url.query_pairs_mut()
            .append_pair("grant_type", &self.grant_type)
            .append_pair("client_id", &self.client_id)
            .append_pair("client_secret", &self.client_secret)
            .append_pair("scope", &self.scope)
            .append_pair("token_type", &self.token_type);
        Ok(url)
    }

    pub fn statements_endpoint(&self) -> Result<Url> {
        Ok(self
            .base_url()?
            .join(self.statements_url.trim_start_matches('/'))?)
    }
}

/// Bounded retry with a fixed pause between attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetrySettings {
    /// Attempts after the first one.
    pub max_retries: u32,
    pub countdown: Duration,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            countdown: Duration::from_secs(DEFAULT_COUNTDOWN_SECS),
        }
    }
}

impl RetrySettings {
    pub fn from_provider(config: &impl ConfigProvider) -> std::result::Result<Self, ConfigError> {
        Ok(Self {
            max_retries: config.parse_or(EVENT_ROUTING_BACKEND_MAX_RETRIES, DEFAULT_MAX_RETRIES)?,
            countdown: Duration::from_secs(
                config.parse_or(EVENT_ROUTING_BACKEND_COUNTDOWN, DEFAULT_COUNTDOWN_SECS)?,
            ),
        })
    }
}
