//! Remote Data Gateway: authenticated REST access for the dashboard.
//!
//! Wraps read/write calls against the platform backend using
//! [`reqwest`], attaching the stored bearer credential on
//! authenticated calls and switching between JSON and multipart
//! encodings per payload. Every call races the round-trip against a
//! [`CancellationToken`](tokio_util::sync::CancellationToken) so a
//! closed view can discard late completions.

pub mod api;
pub mod credentials;
pub mod form;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

pub use api::{ApiErrorBody, ApiMessage, GatewayConfig, GatewayError, HttpGateway};
pub use credentials::{CredentialStore, MemoryCredentialStore};
pub use form::{FormData, FormEntry, FormValue};

/// A write body: JSON unless the caller built a multipart form.
#[derive(Debug, Clone)]
pub enum WritePayload {
    Json(serde_json::Value),
    Form(FormData),
}

/// The gateway seam the controller depends on.
///
/// [`HttpGateway`] is the production implementation; tests script an
/// in-memory one.
#[async_trait]
pub trait RemoteGateway: Send + Sync {
    /// Unauthenticated read of a resource path.
    async fn fetch_public(
        &self,
        path: &str,
        cancel: &CancellationToken,
    ) -> Result<serde_json::Value, GatewayError>;

    /// Authenticated read; the bearer credential is re-read from the
    /// store on every call.
    async fn fetch_authenticated(
        &self,
        path: &str,
        cancel: &CancellationToken,
    ) -> Result<serde_json::Value, GatewayError>;

    /// Authenticated create (POST).
    async fn create(
        &self,
        path: &str,
        payload: WritePayload,
        cancel: &CancellationToken,
    ) -> Result<serde_json::Value, GatewayError>;

    /// Authenticated partial update (PATCH). The client sends only the
    /// fields it wants to change; merge semantics are server-defined.
    async fn update(
        &self,
        path: &str,
        payload: WritePayload,
        cancel: &CancellationToken,
    ) -> Result<serde_json::Value, GatewayError>;
}
