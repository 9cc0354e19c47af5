use crate::error::{check_status, Result};
use crate::settings::ApiSettings;
use crate::{StatementSender, TokenProvider};
use async_trait::async_trait;
use moebridge_core::MappedEvent;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::Client;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Posts mapped statements to the MOE statement API.
pub struct StatementClient {
    http: Client,
    endpoint: Url,
    token_type: String,
    content_type: String,
    tokens: Arc<dyn TokenProvider>,
}

impl StatementClient {
    pub fn new(settings: &ApiSettings, tokens: Arc<dyn TokenProvider>) -> Result<Self> {
        let http = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            http,
            endpoint: settings.statements_endpoint()?,
            token_type: settings.token_type.clone(),
            content_type: settings.statements_content_type.clone(),
            tokens,
        })
    }
}

#[async_trait]
impl StatementSender for StatementClient {
    async fn send(&self, event: &MappedEvent, event_name: &str) -> Result<Option<Value>> {
        let token = self.tokens.token().await?;
        let body = serde_json::to_vec(event)?;

        let response = self
            .http
            .post(self.endpoint.clone())
            .header(AUTHORIZATION, format!("{} {}", self.token_type, token))
            .header(CONTENT_TYPE, &self.content_type)
            .body(body)
            .send()
            .await?;
        let response = check_status(response).await?;
        let status = response.status();
        let text = response.text().await?;

        tracing::info!(event_name, status = status.as_u16(), "statement delivered");
        if text.trim().is_empty() {
            return Ok(None);
        }
        Ok(Some(serde_json::from_str(&text)?))
    }
}
