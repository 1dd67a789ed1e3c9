//! REST client for the platform backend.
//!
//! [`HttpGateway`] wraps the backend's HTTP API using [`reqwest`]:
//! unauthenticated and bearer-authenticated reads, JSON and multipart
//! writes. Transport failures (no usable response) and application
//! failures (error status with a payload) surface as distinct error
//! variants; nothing is retried automatically -- retry is the user
//! re-triggering the action.

use std::future::Future;
use std::sync::Arc;

use serde::Deserialize;
use tokio_util::sync::CancellationToken;

use crate::credentials::CredentialStore;
use crate::{RemoteGateway, WritePayload};

/// Gateway configuration.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Base HTTP URL of the backend, e.g. `https://api.example.com`.
    pub base_url: String,
}

/// HTTP client for the platform backend.
pub struct HttpGateway {
    client: reqwest::Client,
    base_url: String,
    credentials: Arc<dyn CredentialStore>,
}

/// One message from an application-error payload, optionally tied to a
/// named field so the UI can render it inline.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ApiMessage {
    pub field: Option<String>,
    pub message: String,
}

/// Parsed body of an error response.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ApiErrorBody {
    pub messages: Vec<ApiMessage>,
}

impl ApiErrorBody {
    /// Parse an error body, tolerating the backend's shapes:
    /// `{"message": "..."}`, `{"errors": [{"field": ..., "message":
    /// ...}, ...]}`, `{"errors": ["...", ...]}`, or raw text.
    pub fn parse(body: &str) -> Self {
        let mut messages = Vec::new();

        if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
            if let Some(message) = value.get("message").and_then(|m| m.as_str()) {
                messages.push(ApiMessage {
                    field: None,
                    message: message.to_string(),
                });
            }
            if let Some(errors) = value.get("errors").and_then(|e| e.as_array()) {
                for entry in errors {
                    if let Ok(parsed) = serde_json::from_value::<ApiMessage>(entry.clone()) {
                        messages.push(parsed);
                    } else if let Some(text) = entry.as_str() {
                        messages.push(ApiMessage {
                            field: None,
                            message: text.to_string(),
                        });
                    }
                }
            }
        }

        if messages.is_empty() && !body.trim().is_empty() {
            messages.push(ApiMessage {
                field: None,
                message: body.trim().to_string(),
            });
        }

        Self { messages }
    }
}

/// Errors from the gateway layer.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// No usable response was received (connect, DNS, TLS, body read).
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The backend responded with an error status.
    #[error("API error ({status})")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Parsed error payload.
        errors: ApiErrorBody,
    },

    /// The call's cancellation token fired before settlement.
    #[error("Request cancelled")]
    Cancelled,
}

impl HttpGateway {
    /// Create a gateway for the configured backend.
    pub fn new(config: GatewayConfig, credentials: Arc<dyn CredentialStore>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            credentials,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Attach the stored bearer credential, if any. Reads the store on
    /// every call so a mid-session rotation is picked up immediately.
    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.credentials.bearer_token() {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Attach a write payload, switching the encoding to multipart when
    /// the caller built a form.
    fn encode(
        request: reqwest::RequestBuilder,
        payload: WritePayload,
    ) -> Result<reqwest::RequestBuilder, GatewayError> {
        Ok(match payload {
            WritePayload::Json(body) => request.json(&body),
            WritePayload::Form(form) => request.multipart(form.into_multipart()?),
        })
    }

    /// Race a round-trip against the caller's cancellation token.
    async fn run<F>(cancel: &CancellationToken, fut: F) -> Result<serde_json::Value, GatewayError>
    where
        F: Future<Output = Result<serde_json::Value, GatewayError>>,
    {
        tokio::select! {
            _ = cancel.cancelled() => Err(GatewayError::Cancelled),
            result = fut => result,
        }
    }

    /// Parse a response: success statuses yield the JSON body, error
    /// statuses yield [`GatewayError::Api`] with the parsed payload.
    async fn parse_response(response: reqwest::Response) -> Result<serde_json::Value, GatewayError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::Api {
                status: status.as_u16(),
                errors: ApiErrorBody::parse(&body),
            });
        }
        Ok(response.json().await?)
    }
}

#[async_trait::async_trait]
impl RemoteGateway for HttpGateway {
    async fn fetch_public(
        &self,
        path: &str,
        cancel: &CancellationToken,
    ) -> Result<serde_json::Value, GatewayError> {
        let request = self.client.get(self.url(path));
        Self::run(cancel, async {
            let response = request.send().await?;
            Self::parse_response(response).await
        })
        .await
    }

    async fn fetch_authenticated(
        &self,
        path: &str,
        cancel: &CancellationToken,
    ) -> Result<serde_json::Value, GatewayError> {
        let request = self.authorize(self.client.get(self.url(path)));
        Self::run(cancel, async {
            let response = request.send().await?;
            Self::parse_response(response).await
        })
        .await
    }

    async fn create(
        &self,
        path: &str,
        payload: WritePayload,
        cancel: &CancellationToken,
    ) -> Result<serde_json::Value, GatewayError> {
        tracing::debug!(path, "gateway create");
        let request = Self::encode(self.authorize(self.client.post(self.url(path))), payload)?;
        Self::run(cancel, async {
            let response = request.send().await?;
            Self::parse_response(response).await
        })
        .await
    }

    async fn update(
        &self,
        path: &str,
        payload: WritePayload,
        cancel: &CancellationToken,
    ) -> Result<serde_json::Value, GatewayError> {
        tracing::debug!(path, "gateway update");
        let request = Self::encode(self.authorize(self.client.patch(self.url(path))), payload)?;
        Self::run(cancel, async {
            let response = request.send().await?;
            Self::parse_response(response).await
        })
        .await
    }
}
