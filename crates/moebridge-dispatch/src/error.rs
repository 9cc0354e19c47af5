use moebridge_core::ConfigError;
use thiserror::Error;

/// Longest response body kept in a [`DispatchError::Rejected`].
const MAX_BODY_CHARS: usize = 200;

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("Token request failed: {0}")]
    Token(String),
    #[error("HTTP transport failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Remote endpoint rejected the request with status {status}: {body}")]
    Rejected { status: u16, body: String },
    #[error("No {0} configured")]
    NotConfigured(&'static str),
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("Invalid endpoint URL: {0}")]
    Url(#[from] url::ParseError),
    #[error("I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON encoding failed: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl DispatchError {
    /// Whether another attempt may succeed.
    ///
    /// Transport failures, token failures, server errors and throttling are
    /// transient; everything else fails the same way on every attempt.
    pub fn is_retryable(&self) -> bool {
        match self {
            DispatchError::Token(_) | DispatchError::Transport(_) => true,
            DispatchError::Rejected { status, .. } => *status >= 500 || *status == 429,
            DispatchError::NotConfigured(_)
            | DispatchError::Config(_)
            | DispatchError::Url(_)
            | DispatchError::Io(_)
            | DispatchError::Json(_)
            | DispatchError::Task(_) => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, DispatchError>;

/// Passes successful responses through and turns the rest into
/// [`DispatchError::Rejected`].
pub(crate) async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(DispatchError::Rejected {
        status: status.as_u16(),
        body: body.chars().take(MAX_BODY_CHARS).collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rejected(status: u16) -> DispatchError {
        DispatchError::Rejected {
            status,
            body: String::new(),
        }
    }

    #[test]
    fn server_errors_and_throttling_are_retryable() {
        assert!(rejected(500).is_retryable());
        assert!(rejected(503).is_retryable());
        assert!(rejected(429).is_retryable());
        assert!(DispatchError::Token("no access_token".into()).is_retryable());
    }

    #[test]
    fn client_errors_are_final() {
        assert!(!rejected(400).is_retryable());
        assert!(!rejected(401).is_retryable());
        assert!(!DispatchError::NotConfigured("queue URL").is_retryable());
        assert!(!DispatchError::Config(ConfigError::Missing("API_HOST_NAME".into())).is_retryable());
    }
}
