//! Session events and user-facing notices.
//!
//! The gate publishes these on a broadcast bus; a renderer subscribes and
//! draws them. Nothing in the session depends on anyone listening.

use serde::Serialize;
use std::fmt;

use crate::constants::notices;
use crate::domain::{Language, UserId};
use crate::models::{Message, User};

/// Something the user has to be told about.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum Notice {
    LoginRequired,
    SubscriptionRequired,
    RequestInFlight,
    AdminOnly,
    LoginFailed(String),
    SubscriptionOpFailed(String),
    SubscriptionUpdated { user_id: UserId, is_active: bool },
}

impl Notice {
    /// Blocking notices are rendered as alerts the user must acknowledge.
    #[must_use]
    pub const fn is_blocking(&self) -> bool {
        !matches!(self, Self::SubscriptionUpdated { .. })
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LoginRequired => f.write_str(notices::LOGIN_REQUIRED),
            Self::SubscriptionRequired => f.write_str(notices::SUBSCRIPTION_REQUIRED),
            Self::RequestInFlight => f.write_str(notices::REQUEST_IN_FLIGHT),
            Self::AdminOnly => f.write_str(notices::ADMIN_ONLY),
            Self::LoginFailed(reason) => write!(f, "Login failed: {reason}"),
            Self::SubscriptionOpFailed(reason) => {
                write!(f, "Subscription update failed: {reason}")
            }
            Self::SubscriptionUpdated {
                user_id,
                is_active: true,
            } => write!(f, "Subscription granted to user {user_id}"),
            Self::SubscriptionUpdated {
                user_id,
                is_active: false,
            } => write!(f, "Subscription revoked for user {user_id}"),
        }
    }
}

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type", content = "payload")]
pub enum SessionEvent {
    UserChanged {
        user: Option<User>,
    },
    LanguageChanged {
        language: Language,
    },
    MessageAppended {
        index: usize,
        message: Message,
    },
    PendingChanged {
        pending: bool,
    },
    DirectoryRefreshed {
        users: Vec<User>,
    },
    AdminPanelToggled {
        open: bool,
    },
    Notice(Notice),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notice_text_matches_constants() {
        assert_eq!(
            Notice::SubscriptionRequired.to_string(),
            notices::SUBSCRIPTION_REQUIRED
        );
        assert_eq!(
            Notice::SubscriptionUpdated {
                user_id: UserId::new(2),
                is_active: false
            }
            .to_string(),
            "Subscription revoked for user 2"
        );
    }

    #[test]
    fn only_confirmations_are_non_blocking() {
        assert!(Notice::LoginFailed("boom".into()).is_blocking());
        assert!(
            !Notice::SubscriptionUpdated {
                user_id: UserId::new(1),
                is_active: true
            }
            .is_blocking()
        );
    }

    #[test]
    fn events_serialize_with_type_tag() {
        let json = serde_json::to_value(SessionEvent::PendingChanged { pending: true }).unwrap();
        assert_eq!(json["type"], "PendingChanged");
        assert_eq!(json["payload"]["pending"], true);
    }
}
