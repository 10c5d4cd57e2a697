//! Client-side session state and the gate that drives it.
//!
//! [`Session`] is plain data; [`reducer`] holds the pure transitions over it;
//! [`SessionGate`] performs the collaborator calls and applies the results.

pub mod gate;
pub mod reducer;

use serde::Serialize;

use crate::domain::Language;
use crate::models::{Message, User};

pub use gate::{SendOutcome, SessionGate};
pub use reducer::{SendDecision, can_send};

#[derive(Debug, Clone, Serialize)]
pub struct Session {
    pub user: Option<User>,
    pub language: Language,
    pub pending: bool,
    pub input: String,
    pub messages: Vec<Message>,
    pub login_prompt_open: bool,
    pub admin_panel_open: bool,
    /// Last user list fetched for the admin panel.
    pub directory: Vec<User>,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            user: None,
            language: Language::default(),
            pending: false,
            input: String::new(),
            messages: Vec::new(),
            login_prompt_open: true,
            admin_panel_open: false,
            directory: Vec::new(),
        }
    }
}

impl Session {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.user.as_ref().is_some_and(|u| u.is_admin)
    }

    #[must_use]
    pub fn can_send(&self) -> bool {
        can_send(self.user.as_ref())
    }
}
