use anyhow::{Context, Result};
use reqwest::Client;
use serde::Serialize;
use tracing::debug;
use url::Url;

use super::ensure_success;
use crate::domain::UserId;
use crate::models::{SubscriptionRecord, User};

#[derive(Debug, Serialize)]
struct GrantRequest {
    user_id: UserId,
}

#[derive(Debug, Serialize)]
struct UpdateRequest {
    user_id: UserId,
    is_active: bool,
}

#[derive(Debug, Clone)]
pub struct SubscriptionsClient {
    client: Client,
    url: Url,
}

impl SubscriptionsClient {
    pub fn new(client: Client, url: &str) -> Result<Self> {
        Ok(Self {
            client,
            url: Url::parse(url).with_context(|| format!("Invalid subscriptions URL: {url}"))?,
        })
    }

    pub async fn list_users(&self) -> Result<Vec<User>> {
        let response = self
            .client
            .get(self.url.clone())
            .send()
            .await
            .context("Failed to reach the subscriptions service")?;

        let users: Vec<User> = ensure_success("subscriptions", response)
            .await?
            .json()
            .await
            .context("Malformed user list from the subscriptions service")?;

        debug!("Fetched {} users", users.len());
        Ok(users)
    }

    pub async fn grant(&self, user_id: UserId) -> Result<SubscriptionRecord> {
        debug!(%user_id, "Granting subscription");

        let response = self
            .client
            .post(self.url.clone())
            .json(&GrantRequest { user_id })
            .send()
            .await
            .context("Failed to reach the subscriptions service")?;

        ensure_success("subscriptions", response)
            .await?
            .json()
            .await
            .context("Malformed subscription record")
    }

    pub async fn set_active(&self, user_id: UserId, is_active: bool) -> Result<SubscriptionRecord> {
        debug!(%user_id, is_active, "Updating subscription");

        let response = self
            .client
            .put(self.url.clone())
            .json(&UpdateRequest { user_id, is_active })
            .send()
            .await
            .context("Failed to reach the subscriptions service")?;

        ensure_success("subscriptions", response)
            .await?
            .json()
            .await
            .context("Malformed subscription record")
    }
}
