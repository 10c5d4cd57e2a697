//! Pure state transitions over [`Session`].
//!
//! Nothing here performs I/O, so every rule of the gate can be exercised
//! without a runtime or a renderer.

use crate::constants::notices;
use crate::domain::events::Notice;
use crate::domain::{Language, UserId};
use crate::models::{GeneratedCode, GenerationRequest, Message, SubscriptionRecord, User};
use crate::services::GenerationError;

use super::Session;

/// True iff a user is present and their subscription is active.
#[must_use]
pub fn can_send(user: Option<&User>) -> bool {
    user.is_some_and(User::is_entitled)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendDecision {
    /// Blank input; nothing to do and nothing to report.
    Ignored,
    /// Refused; the session is untouched.
    Blocked(Notice),
    /// The user message was appended and the request must be dispatched.
    Dispatch(GenerationRequest),
}

/// Decides whether `text` may be sent and, if so, records the user message
/// and marks the session pending.
pub fn begin_send(session: &mut Session, text: &str, language: Language) -> SendDecision {
    let prompt = text.trim();
    if prompt.is_empty() {
        return SendDecision::Ignored;
    }

    if session.user.is_none() {
        return SendDecision::Blocked(Notice::LoginRequired);
    }

    if !session.can_send() {
        return SendDecision::Blocked(Notice::SubscriptionRequired);
    }

    if session.pending {
        return SendDecision::Blocked(Notice::RequestInFlight);
    }

    session.messages.push(Message::user(prompt));
    session.input.clear();
    session.pending = true;

    SendDecision::Dispatch(GenerationRequest::new(prompt, language))
}

/// Appends the assistant reply for a finished request and clears pending.
/// Failures become an assistant message carrying the fixed error notice.
pub fn complete_send(
    session: &mut Session,
    result: Result<GeneratedCode, GenerationError>,
    language: Language,
) -> Message {
    let content = match result {
        Ok(generated) => generated.code,
        Err(_) => notices::GENERATION_FAILED.to_string(),
    };

    let message = Message::assistant(content, language);
    session.messages.push(message.clone());
    session.pending = false;
    message
}

/// Replaces the current user after a successful login.
pub fn apply_login(session: &mut Session, user: User) {
    if !user.is_admin {
        session.admin_panel_open = false;
    }
    session.user = Some(user);
    session.login_prompt_open = false;
}

/// Stores a freshly fetched directory and, when it contains the current user,
/// replaces the current user record with it. Returns whether it did.
pub fn apply_directory(session: &mut Session, users: Vec<User>) -> bool {
    let refreshed = session
        .user
        .as_ref()
        .and_then(|current| users.iter().find(|u| u.id == current.id))
        .cloned();

    session.directory = users;

    match refreshed {
        Some(user) => {
            session.user = Some(user);
            true
        }
        None => false,
    }
}

/// Mirrors a grant/revoke result onto the current user when it was the
/// target, so entitlement is right even before the directory is re-fetched.
pub fn apply_subscription_record(
    session: &mut Session,
    user_id: UserId,
    record: &SubscriptionRecord,
) -> bool {
    match session.user.as_mut() {
        Some(user) if user.id == user_id => {
            user.subscription.is_active = record.is_active;
            user.subscription.expires_at = record.expires_at;
            true
        }
        _ => false,
    }
}

pub fn select_language(session: &mut Session, language: Language) {
    session.language = language;
}

pub fn set_input(session: &mut Session, text: &str) {
    session.input.clear();
    session.input.push_str(text);
}

/// Opens or closes the admin panel; only administrators may open it.
pub fn toggle_admin_panel(session: &mut Session) -> Result<bool, Notice> {
    if !session.admin_panel_open && !session.is_admin() {
        return Err(Notice::AdminOnly);
    }
    session.admin_panel_open = !session.admin_panel_open;
    Ok(session.admin_panel_open)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Subscription;

    fn user(id: i64, active: bool, admin: bool) -> User {
        User {
            id: UserId::new(id),
            email: format!("u{id}@x.com"),
            name: format!("U{id}"),
            is_admin: admin,
            subscription: Subscription {
                is_active: active,
                expires_at: None,
            },
        }
    }

    fn session_with(user: Option<User>) -> Session {
        Session {
            user,
            ..Session::default()
        }
    }

    #[test]
    fn can_send_requires_active_subscription() {
        assert!(!can_send(None));
        assert!(!can_send(Some(&user(1, false, false))));
        assert!(can_send(Some(&user(1, true, false))));
    }

    #[test]
    fn blank_input_is_ignored() {
        let mut session = session_with(Some(user(1, true, false)));
        assert_eq!(
            begin_send(&mut session, "  \n", Language::Python),
            SendDecision::Ignored
        );
        assert!(session.messages.is_empty());
        assert!(!session.pending);
    }

    #[test]
    fn inactive_user_is_blocked_without_state_change() {
        let mut session = session_with(Some(user(1, false, false)));
        session.input = "print hi".to_string();

        let decision = begin_send(&mut session, "print hi", Language::Python);
        assert_eq!(decision, SendDecision::Blocked(Notice::SubscriptionRequired));
        assert!(session.messages.is_empty());
        assert!(!session.pending);
        assert_eq!(session.input, "print hi");
    }

    #[test]
    fn logged_out_user_is_asked_to_log_in() {
        let mut session = session_with(None);
        assert_eq!(
            begin_send(&mut session, "print hi", Language::Lua),
            SendDecision::Blocked(Notice::LoginRequired)
        );
    }

    #[test]
    fn dispatch_appends_user_message_and_sets_pending() {
        let mut session = session_with(Some(user(1, true, false)));
        session.input = " sort a list ".to_string();

        let decision = begin_send(&mut session, " sort a list ", Language::Python);
        assert_eq!(
            decision,
            SendDecision::Dispatch(GenerationRequest::new("sort a list", Language::Python))
        );
        assert_eq!(session.messages, vec![Message::user("sort a list")]);
        assert!(session.input.is_empty());
        assert!(session.pending);
    }

    #[test]
    fn overlapping_send_is_rejected() {
        let mut session = session_with(Some(user(1, true, false)));
        begin_send(&mut session, "first", Language::Python);

        let second = begin_send(&mut session, "second", Language::Python);
        assert_eq!(second, SendDecision::Blocked(Notice::RequestInFlight));
        assert_eq!(session.messages.len(), 1);
    }

    #[test]
    fn completion_appends_code_or_error_notice() {
        let mut session = session_with(Some(user(1, true, false)));
        begin_send(&mut session, "a", Language::Lua);
        let ok = complete_send(
            &mut session,
            Ok(GeneratedCode {
                code: "print(1)".to_string(),
                language: None,
            }),
            Language::Lua,
        );
        assert_eq!(ok, Message::assistant("print(1)", Language::Lua));
        assert!(!session.pending);

        begin_send(&mut session, "b", Language::Lua);
        let failed = complete_send(
            &mut session,
            Err(GenerationError::Unavailable("down".to_string())),
            Language::Lua,
        );
        assert_eq!(failed.content, notices::GENERATION_FAILED);
        assert!(!session.pending);
        assert_eq!(session.messages.len(), 4);
    }

    #[test]
    fn login_closes_prompt_and_admin_panel_for_non_admins() {
        let mut session = session_with(Some(user(1, true, true)));
        session.admin_panel_open = true;

        apply_login(&mut session, user(2, false, false));
        assert!(!session.login_prompt_open);
        assert!(!session.admin_panel_open);
        assert_eq!(session.user.as_ref().map(|u| u.id), Some(UserId::new(2)));
    }

    #[test]
    fn directory_refresh_replaces_current_user() {
        let mut session = session_with(Some(user(2, false, false)));
        let replaced = apply_directory(
            &mut session,
            vec![user(1, false, true), user(2, true, false)],
        );
        assert!(replaced);
        assert!(session.can_send());
        assert_eq!(session.directory.len(), 2);

        let untouched = apply_directory(&mut session, vec![user(1, false, true)]);
        assert!(!untouched);
        assert!(session.can_send());
    }

    #[test]
    fn admin_panel_is_admin_only() {
        let mut session = session_with(Some(user(1, true, false)));
        assert_eq!(toggle_admin_panel(&mut session), Err(Notice::AdminOnly));

        let mut admin = session_with(Some(user(2, false, true)));
        assert_eq!(toggle_admin_panel(&mut admin), Ok(true));
        assert_eq!(toggle_admin_panel(&mut admin), Ok(false));
    }

    #[test]
    fn subscription_record_patches_only_the_target() {
        let mut session = session_with(Some(user(3, false, true)));
        let record = SubscriptionRecord {
            id: 1,
            is_active: true,
            expires_at: None,
        };

        assert!(!apply_subscription_record(&mut session, UserId::new(4), &record));
        assert!(!session.can_send());

        assert!(apply_subscription_record(&mut session, UserId::new(3), &record));
        assert!(session.can_send());
    }
}
