use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::UserId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub name: String,
    #[serde(default)]
    pub is_admin: bool,
    #[serde(default)]
    pub subscription: Subscription,
}

impl User {
    /// Whether the user's subscription is currently marked active.
    #[must_use]
    pub const fn is_entitled(&self) -> bool {
        self.subscription.is_active
    }
}

/// Latest subscription state of a user as reported by the registry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    #[serde(default)]
    pub is_active: bool,
    #[serde(default, with = "super::timestamp")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl Subscription {
    /// Whole days left until expiry, or `None` when no expiry is recorded.
    #[must_use]
    pub fn days_remaining(&self, now: DateTime<Utc>) -> Option<i64> {
        self.expires_at
            .map(|expires_at| (expires_at - now).num_days().max(0))
    }
}

/// Row returned by grant and revoke calls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionRecord {
    pub id: i64,
    pub is_active: bool,
    #[serde(default, with = "super::timestamp")]
    pub expires_at: Option<DateTime<Utc>>,
}
