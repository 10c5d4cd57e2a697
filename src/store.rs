//! In-memory user and subscription directory.
//!
//! Backs the mock backend and the local session mode. Nothing is persisted;
//! the directory lives as long as the process.

use chrono::{DateTime, TimeDelta, Utc};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::constants::defaults;
use crate::domain::UserId;
use crate::models::{Subscription, SubscriptionRecord, User};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("Email is required")]
    MissingEmail,

    #[error("User {0} not found")]
    UnknownUser(UserId),

    #[error("Subscription not found")]
    NoSubscription(UserId),

    #[error("Invalid subscription duration: {0} days")]
    InvalidDuration(i64),
}

#[derive(Debug, Clone)]
struct UserRow {
    id: UserId,
    email: String,
    name: String,
    is_admin: bool,
}

#[derive(Debug, Clone)]
struct SubscriptionRow {
    id: i64,
    user_id: UserId,
    is_active: bool,
    expires_at: Option<DateTime<Utc>>,
}

impl SubscriptionRow {
    fn record(&self) -> SubscriptionRecord {
        SubscriptionRecord {
            id: self.id,
            is_active: self.is_active,
            expires_at: self.expires_at,
        }
    }
}

#[derive(Debug, Default)]
struct Inner {
    users: BTreeMap<UserId, UserRow>,
    by_email: HashMap<String, UserId>,
    // Insertion order doubles as creation order.
    subscriptions: Vec<SubscriptionRow>,
    admin_emails: HashSet<String>,
    next_user_id: i64,
    next_subscription_id: i64,
}

impl Inner {
    fn latest_subscription(&self, user_id: UserId) -> Subscription {
        self.subscriptions
            .iter()
            .rev()
            .find(|s| s.user_id == user_id)
            .map(|s| Subscription {
                is_active: s.is_active,
                expires_at: s.expires_at,
            })
            .unwrap_or_default()
    }

    fn to_user(&self, row: &UserRow) -> User {
        User {
            id: row.id,
            email: row.email.clone(),
            name: row.name.clone(),
            is_admin: row.is_admin,
            subscription: self.latest_subscription(row.id),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Store {
    inner: Arc<RwLock<Inner>>,
}

fn normalize_email(email: &str) -> String {
    email.trim().to_ascii_lowercase()
}

impl Store {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store whose listed emails are flagged as administrators.
    #[must_use]
    pub fn with_admins<I, S>(admin_emails: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let inner = Inner {
            admin_emails: admin_emails
                .into_iter()
                .map(|e| normalize_email(e.as_ref()))
                .collect(),
            ..Inner::default()
        };

        Self {
            inner: Arc::new(RwLock::new(inner)),
        }
    }

    /// Inserts a user, or updates the display name of an existing one.
    pub async fn upsert_user(&self, email: &str, name: &str) -> Result<User, StoreError> {
        let email = normalize_email(email);
        if email.is_empty() {
            return Err(StoreError::MissingEmail);
        }

        let name = match name.trim() {
            "" => defaults::DISPLAY_NAME.to_string(),
            n => n.to_string(),
        };

        let mut inner = self.inner.write().await;

        let id = if let Some(&id) = inner.by_email.get(&email) {
            if let Some(row) = inner.users.get_mut(&id) {
                row.name = name;
            }
            id
        } else {
            inner.next_user_id += 1;
            let id = UserId::new(inner.next_user_id);
            let is_admin = inner.admin_emails.contains(&email);
            inner.users.insert(
                id,
                UserRow {
                    id,
                    email: email.clone(),
                    name,
                    is_admin,
                },
            );
            inner.by_email.insert(email.clone(), id);
            info!(%id, email = %email, is_admin, "Registered user");
            id
        };

        let row = inner.users.get(&id).ok_or(StoreError::UnknownUser(id))?;
        Ok(inner.to_user(row))
    }

    #[cfg(test)]
    pub async fn get_user(&self, user_id: UserId) -> Option<User> {
        let inner = self.inner.read().await;
        inner.users.get(&user_id).map(|row| inner.to_user(row))
    }

    /// All users ordered by id, each with their latest subscription.
    pub async fn list_users(&self) -> Vec<User> {
        let inner = self.inner.read().await;
        inner.users.values().map(|row| inner.to_user(row)).collect()
    }

    /// Records a new active subscription lasting `days` from now.
    pub async fn grant(&self, user_id: UserId, days: i64) -> Result<SubscriptionRecord, StoreError> {
        let expires_at = TimeDelta::try_days(days)
            .filter(|d| *d > TimeDelta::zero())
            .and_then(|d| Utc::now().checked_add_signed(d))
            .ok_or(StoreError::InvalidDuration(days))?;

        let mut inner = self.inner.write().await;
        if !inner.users.contains_key(&user_id) {
            return Err(StoreError::UnknownUser(user_id));
        }

        inner.next_subscription_id += 1;
        let row = SubscriptionRow {
            id: inner.next_subscription_id,
            user_id,
            is_active: true,
            expires_at: Some(expires_at),
        };
        let record = row.record();
        inner.subscriptions.push(row);

        debug!(%user_id, subscription_id = record.id, "Subscription granted");
        Ok(record)
    }

    /// Flips every subscription row of the user and returns the newest one.
    pub async fn set_active(
        &self,
        user_id: UserId,
        is_active: bool,
    ) -> Result<SubscriptionRecord, StoreError> {
        let mut inner = self.inner.write().await;

        let mut latest = None;
        for row in inner
            .subscriptions
            .iter_mut()
            .filter(|s| s.user_id == user_id)
        {
            row.is_active = is_active;
            latest = Some(row.record());
        }

        let record = latest.ok_or(StoreError::NoSubscription(user_id))?;
        debug!(%user_id, is_active, "Subscription updated");
        Ok(record)
    }
}
