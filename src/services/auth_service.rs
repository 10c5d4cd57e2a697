//! Identity collaborator: exchanges an email and display name for a user record.

use thiserror::Error;

use crate::models::User;

/// Errors specific to login.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Email is required")]
    MissingEmail,

    #[error("Login rejected: {0}")]
    Rejected(String),

    #[error("Identity service unavailable: {0}")]
    Unavailable(String),
}

impl From<anyhow::Error> for AuthError {
    fn from(err: anyhow::Error) -> Self {
        match crate::clients::ServiceError::find(&err) {
            Some(service) if service.status.is_client_error() => {
                Self::Rejected(service.message.clone())
            }
            _ => Self::Unavailable(format!("{err:#}")),
        }
    }
}

/// Domain service trait for logging a user in.
#[async_trait::async_trait]
pub trait AuthService: Send + Sync {
    /// Returns the user record for `email`, creating it on first login.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::MissingEmail`] for a blank email, and
    /// [`AuthError::Unavailable`] when the backend cannot be reached.
    async fn login(&self, email: &str, name: &str) -> Result<User, AuthError>;
}
