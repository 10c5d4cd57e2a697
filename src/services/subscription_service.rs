//! Subscription registry collaborator: lists users and flips entitlements.

use thiserror::Error;

use crate::domain::UserId;
use crate::models::{SubscriptionRecord, User};

/// Errors from grant, revoke and directory operations.
#[derive(Debug, Error)]
pub enum SubscriptionOpError {
    #[error("Not logged in")]
    NotLoggedIn,

    #[error("Administrator rights required")]
    Forbidden,

    #[error("User {0} not found")]
    UserNotFound(UserId),

    #[error("User {0} has no subscription")]
    SubscriptionNotFound(UserId),

    #[error("Request rejected: {0}")]
    Rejected(String),

    #[error("Subscription service unavailable: {0}")]
    Unavailable(String),
}

impl SubscriptionOpError {
    /// Classifies a client failure for an operation on `user_id`.
    #[must_use]
    pub fn from_client(err: &anyhow::Error, user_id: Option<UserId>) -> Self {
        let Some(service) = crate::clients::ServiceError::find(err) else {
            return Self::Unavailable(format!("{err:#}"));
        };

        match (service.status.as_u16(), user_id) {
            (404, Some(id)) if service.message.contains("Subscription") => {
                Self::SubscriptionNotFound(id)
            }
            (404, Some(id)) => Self::UserNotFound(id),
            (400..=499, _) => Self::Rejected(service.message.clone()),
            _ => Self::Unavailable(service.to_string()),
        }
    }
}

impl From<anyhow::Error> for SubscriptionOpError {
    fn from(err: anyhow::Error) -> Self {
        Self::from_client(&err, None)
    }
}

/// Domain service trait for the subscription registry.
#[async_trait::async_trait]
pub trait SubscriptionRegistry: Send + Sync {
    /// Every known user with their latest subscription, ordered by id.
    async fn list_users(&self) -> Result<Vec<User>, SubscriptionOpError>;

    /// Starts a new active subscription for the user.
    async fn grant(&self, user_id: UserId) -> Result<SubscriptionRecord, SubscriptionOpError>;

    /// Deactivates the user's subscription.
    ///
    /// # Errors
    ///
    /// Returns [`SubscriptionOpError::SubscriptionNotFound`] when the user
    /// never had one.
    async fn revoke(&self, user_id: UserId) -> Result<SubscriptionRecord, SubscriptionOpError>;
}
