use anyhow::{Context, Result};
use reqwest::Client;
use serde::Serialize;
use tracing::debug;
use url::Url;

use super::ensure_success;
use crate::models::User;

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    name: &'a str,
}

#[derive(Debug, Clone)]
pub struct AuthClient {
    client: Client,
    url: Url,
}

impl AuthClient {
    pub fn new(client: Client, url: &str) -> Result<Self> {
        Ok(Self {
            client,
            url: Url::parse(url).with_context(|| format!("Invalid auth URL: {url}"))?,
        })
    }

    /// Exchanges an email and display name for the user record.
    pub async fn login(&self, email: &str, name: &str) -> Result<User> {
        debug!(email, "Logging in");

        let response = self
            .client
            .post(self.url.clone())
            .json(&LoginRequest { email, name })
            .send()
            .await
            .context("Failed to reach the auth service")?;

        let user = ensure_success("auth", response)
            .await?
            .json::<User>()
            .await
            .context("Malformed user record from the auth service")?;

        Ok(user)
    }
}
