//! HTTP and in-memory implementations of the `AuthService` trait.

use async_trait::async_trait;

use crate::clients::AuthClient;
use crate::models::User;
use crate::services::auth_service::{AuthError, AuthService};
use crate::store::{Store, StoreError};

pub struct HttpAuthService {
    client: AuthClient,
}

impl HttpAuthService {
    #[must_use]
    pub const fn new(client: AuthClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl AuthService for HttpAuthService {
    async fn login(&self, email: &str, name: &str) -> Result<User, AuthError> {
        if email.trim().is_empty() {
            return Err(AuthError::MissingEmail);
        }

        Ok(self.client.login(email.trim(), name.trim()).await?)
    }
}

pub struct LocalAuthService {
    store: Store,
}

impl LocalAuthService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }
}

#[async_trait]
impl AuthService for LocalAuthService {
    async fn login(&self, email: &str, name: &str) -> Result<User, AuthError> {
        self.store
            .upsert_user(email, name)
            .await
            .map_err(|err| match err {
                StoreError::MissingEmail => AuthError::MissingEmail,
                other => AuthError::Rejected(other.to_string()),
            })
    }
}
