use std::time::Duration;

use serde_json::Value;
use thiserror::Error;

use crate::retry::{retry_with_backoff, RetryAction, RetryConfig};

/// Transport-level failure, before it is mapped to a [`PickerError`].
///
/// [`PickerError`]: crate::error::PickerError
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    #[error("HTTP error {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid response body: {0}")]
    Decode(String),
}

impl TransportError {
    /// Server errors, rate limiting and connection failures are transient.
    pub fn is_retryable(&self) -> bool {
        match self {
            TransportError::Status { status, .. } => *status == 429 || *status >= 500,
            TransportError::Network(_) => true,
            TransportError::Decode(_) => false,
        }
    }

    /// Raw response body, when the server sent one.
    pub fn body(&self) -> Option<&str> {
        match self {
            TransportError::Status { body, .. } => Some(body),
            _ => None,
        }
    }
}

/// A decoded provider response plus any refreshed credential the
/// session picked up while making the request.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionResponse {
    pub body: Value,
    pub renewed_token: Option<String>,
}

impl SessionResponse {
    pub fn new(body: Value) -> Self {
        Self {
            body,
            renewed_token: None,
        }
    }
}

/// Minimal async HTTP session used by the remote providers.
///
/// Auth, token refresh and retry policy live behind this trait so that
/// album code only deals with page parsing.
#[async_trait::async_trait]
pub trait ProviderSession: Send + Sync {
    async fn get_json(&self, url: &str) -> Result<SessionResponse, TransportError>;

    /// Clone this session into a new boxed trait object.
    fn clone_box(&self) -> Box<dyn ProviderSession>;
}

/// [`ProviderSession`] over a shared `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct HttpSession {
    client: reqwest::Client,
    retry: RetryConfig,
}

impl HttpSession {
    pub fn new(timeout: Duration, retry: RetryConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client, retry })
    }

    pub fn with_client(client: reqwest::Client, retry: RetryConfig) -> Self {
        Self { client, retry }
    }

    async fn get_once(&self, url: &str) -> Result<Value, TransportError> {
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| TransportError::Network(e.without_url().to_string()))?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(TransportError::Status {
                status: status.as_u16(),
                body,
            });
        }
        resp.json::<Value>()
            .await
            .map_err(|e| TransportError::Decode(e.without_url().to_string()))
    }
}

#[async_trait::async_trait]
impl ProviderSession for HttpSession {
    async fn get_json(&self, url: &str) -> Result<SessionResponse, TransportError> {
        let body = retry_with_backoff(
            &self.retry,
            |e: &TransportError| {
                if e.is_retryable() {
                    RetryAction::Retry
                } else {
                    RetryAction::Abort
                }
            },
            || self.get_once(url),
        )
        .await?;
        Ok(SessionResponse::new(body))
    }

    fn clone_box(&self) -> Box<dyn ProviderSession> {
        Box::new(self.clone())
    }
}
