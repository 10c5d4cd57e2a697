//! Thin reqwest clients for the three HTTP collaborators.
//!
//! Clients speak the wire format and nothing else; classification into domain
//! errors happens in the service implementations.

pub mod auth;
pub mod generate;
pub mod subscriptions;

use anyhow::Result;
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use std::time::Duration;

pub use auth::AuthClient;
pub use generate::GenerateClient;
pub use subscriptions::SubscriptionsClient;

/// Build a shared HTTP client with reasonable defaults for API calls.
/// Reuse it across all clients so they share one connection pool.
pub fn build_http_client(timeout: Duration, user_agent: &str) -> Result<Client> {
    Client::builder()
        .timeout(timeout)
        .user_agent(user_agent)
        .pool_max_idle_per_host(10)
        .build()
        .map_err(|e| anyhow::anyhow!("Failed to build shared HTTP client: {e}"))
}

/// A non-success answer from one of the backends.
#[derive(Debug, thiserror::Error)]
#[error("{service} returned {status}: {message}")]
pub struct ServiceError {
    pub service: &'static str,
    pub status: StatusCode,
    pub message: String,
}

impl ServiceError {
    /// Finds a `ServiceError` anywhere in an `anyhow` chain.
    #[must_use]
    pub fn find(err: &anyhow::Error) -> Option<&Self> {
        err.chain().find_map(|cause| cause.downcast_ref::<Self>())
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

/// Passes successful responses through and turns everything else into a
/// [`ServiceError`], using the backend's `{"error": ...}` body when present.
pub(crate) async fn ensure_success(service: &'static str, response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&body)
        .map(|b| b.error)
        .unwrap_or_else(|_| {
            if body.trim().is_empty() {
                status
                    .canonical_reason()
                    .unwrap_or("unknown error")
                    .to_string()
            } else {
                body
            }
        });

    Err(ServiceError {
        service,
        status,
        message,
    }
    .into())
}
