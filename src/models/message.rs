use serde::{Deserialize, Serialize};

use crate::domain::{Language, Role};

/// One entry of the chat transcript. Never mutated once appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<Language>,
}

impl Message {
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            language: None,
        }
    }

    #[must_use]
    pub fn assistant(content: impl Into<String>, language: Language) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            language: Some(language),
        }
    }

    #[must_use]
    pub const fn is_user(&self) -> bool {
        matches!(self.role, Role::User)
    }
}
