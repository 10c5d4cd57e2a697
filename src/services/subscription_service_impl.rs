//! HTTP and in-memory implementations of the `SubscriptionRegistry` trait.

use async_trait::async_trait;

use crate::clients::SubscriptionsClient;
use crate::constants::subscriptions;
use crate::domain::UserId;
use crate::models::{SubscriptionRecord, User};
use crate::services::subscription_service::{SubscriptionOpError, SubscriptionRegistry};
use crate::store::{Store, StoreError};

pub struct HttpSubscriptionRegistry {
    client: SubscriptionsClient,
}

impl HttpSubscriptionRegistry {
    #[must_use]
    pub const fn new(client: SubscriptionsClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SubscriptionRegistry for HttpSubscriptionRegistry {
    async fn list_users(&self) -> Result<Vec<User>, SubscriptionOpError> {
        Ok(self.client.list_users().await?)
    }

    async fn grant(&self, user_id: UserId) -> Result<SubscriptionRecord, SubscriptionOpError> {
        self.client
            .grant(user_id)
            .await
            .map_err(|e| SubscriptionOpError::from_client(&e, Some(user_id)))
    }

    async fn revoke(&self, user_id: UserId) -> Result<SubscriptionRecord, SubscriptionOpError> {
        self.client
            .set_active(user_id, false)
            .await
            .map_err(|e| SubscriptionOpError::from_client(&e, Some(user_id)))
    }
}

pub struct LocalSubscriptionRegistry {
    store: Store,
    duration_days: i64,
}

impl LocalSubscriptionRegistry {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self {
            store,
            duration_days: subscriptions::DEFAULT_DURATION_DAYS,
        }
    }

    #[must_use]
    pub fn with_duration_days(mut self, days: i64) -> Self {
        self.duration_days = days;
        self
    }
}

impl From<StoreError> for SubscriptionOpError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::UnknownUser(id) => Self::UserNotFound(id),
            StoreError::NoSubscription(id) => Self::SubscriptionNotFound(id),
            StoreError::MissingEmail | StoreError::InvalidDuration(_) => {
                Self::Rejected(err.to_string())
            }
        }
    }
}

#[async_trait]
impl SubscriptionRegistry for LocalSubscriptionRegistry {
    async fn list_users(&self) -> Result<Vec<User>, SubscriptionOpError> {
        Ok(self.store.list_users().await)
    }

    async fn grant(&self, user_id: UserId) -> Result<SubscriptionRecord, SubscriptionOpError> {
        Ok(self.store.grant(user_id, self.duration_days).await?)
    }

    async fn revoke(&self, user_id: UserId) -> Result<SubscriptionRecord, SubscriptionOpError> {
        Ok(self.store.set_active(user_id, false).await?)
    }
}
