//! The session gate: owns identity and entitlement state, decides whether a
//! message may be sent, and drives the collaborator calls.
//!
//! Every collaborator failure is caught here and turned into a [`Notice`] or
//! an assistant message. Nothing propagates far enough to end the session.

use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use super::{Session, reducer};
use crate::constants::{defaults, limits, subscriptions};
use crate::domain::events::{Notice, SessionEvent};
use crate::domain::{Language, UserId};
use crate::models::{Message, SubscriptionRecord, User};
use crate::services::{
    AuthError, AuthService, CodeGenerator, GenerationError, SubscriptionOpError,
    SubscriptionRegistry,
};

/// Result of a send attempt, as seen by the renderer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    /// Blank input.
    Ignored,
    /// Refused before anything was appended.
    Blocked(Notice),
    /// The generator answered; carries the appended assistant message.
    Answered(Message),
    /// The generator failed; carries the appended error message.
    Failed(Message),
}

pub struct SessionGate {
    state: Session,
    auth: Arc<dyn AuthService>,
    registry: Arc<dyn SubscriptionRegistry>,
    generator: Arc<dyn CodeGenerator>,
    events: broadcast::Sender<SessionEvent>,
}

impl SessionGate {
    #[must_use]
    pub fn new(
        auth: Arc<dyn AuthService>,
        registry: Arc<dyn SubscriptionRegistry>,
        generator: Arc<dyn CodeGenerator>,
    ) -> Self {
        let (events, _) = broadcast::channel(limits::EVENT_BUS_BUFFER);
        Self::with_event_bus(auth, registry, generator, events)
    }

    #[must_use]
    pub fn with_event_bus(
        auth: Arc<dyn AuthService>,
        registry: Arc<dyn SubscriptionRegistry>,
        generator: Arc<dyn CodeGenerator>,
        events: broadcast::Sender<SessionEvent>,
    ) -> Self {
        Self {
            state: Session::new(),
            auth,
            registry,
            generator,
            events,
        }
    }

    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    #[must_use]
    pub const fn state(&self) -> &Session {
        &self.state
    }

    #[must_use]
    pub const fn current_user(&self) -> Option<&User> {
        self.state.user.as_ref()
    }

    #[must_use]
    pub fn can_send(&self) -> bool {
        self.state.can_send()
    }

    fn emit(&self, event: SessionEvent) {
        // No subscribers is fine; the session works headless.
        let _ = self.events.send(event);
    }

    fn notify(&self, notice: Notice) {
        if notice.is_blocking() {
            debug!(%notice, "Blocking notice");
        } else {
            info!(%notice, "Notice");
        }
        self.emit(SessionEvent::Notice(notice));
    }

    fn emit_last_message(&self) {
        if let Some(message) = self.state.messages.last() {
            self.emit(SessionEvent::MessageAppended {
                index: self.state.messages.len() - 1,
                message: message.clone(),
            });
        }
    }

    fn emit_user(&self) {
        self.emit(SessionEvent::UserChanged {
            user: self.state.user.clone(),
        });
    }

    /// Logs in through the identity collaborator. On success the current user
    /// is replaced and the login prompt closes; on failure a notice is raised
    /// and the session is left as it was.
    pub async fn login(&mut self, email: &str, name: &str) -> Result<User, AuthError> {
        let name = match name.trim() {
            "" => defaults::DISPLAY_NAME,
            n => n,
        };

        let result = if email.trim().is_empty() {
            Err(AuthError::MissingEmail)
        } else {
            self.auth.login(email.trim(), name).await
        };

        match result {
            Ok(user) => {
                info!(
                    user_id = %user.id,
                    is_admin = user.is_admin,
                    entitled = user.is_entitled(),
                    "Logged in"
                );
                reducer::apply_login(&mut self.state, user.clone());
                self.emit_user();
                Ok(user)
            }
            Err(err) => {
                warn!(error = %err, "Login failed");
                self.notify(Notice::LoginFailed(err.to_string()));
                Err(err)
            }
        }
    }

    pub fn open_login_prompt(&mut self) {
        self.state.login_prompt_open = true;
    }

    pub fn select_language(&mut self, language: Language) {
        reducer::select_language(&mut self.state, language);
        self.emit(SessionEvent::LanguageChanged { language });
    }

    pub fn set_input(&mut self, text: &str) {
        reducer::set_input(&mut self.state, text);
    }

    /// Sends the input buffer in the selected language.
    pub async fn submit_input(&mut self) -> SendOutcome {
        let text = self.state.input.clone();
        let language = self.state.language;
        self.send(&text, language).await
    }

    /// Sends `text` to the generator if the current user is entitled.
    ///
    /// A successful send appends exactly one user message followed by exactly
    /// one assistant message. The pending flag is cleared on every path out,
    /// including a panicking generator.
    pub async fn send(&mut self, text: &str, language: Language) -> SendOutcome {
        let request = match reducer::begin_send(&mut self.state, text, language) {
            reducer::SendDecision::Ignored => return SendOutcome::Ignored,
            reducer::SendDecision::Blocked(notice) => {
                self.notify(notice.clone());
                return SendOutcome::Blocked(notice);
            }
            reducer::SendDecision::Dispatch(request) => request,
        };

        self.emit_last_message();
        self.emit(SessionEvent::PendingChanged { pending: true });
        debug!(language = %request.language, "Dispatching generation request");

        let result = AssertUnwindSafe(self.generator.generate(&request))
            .catch_unwind()
            .await
            .unwrap_or_else(|panic| Err(GenerationError::Internal(panic_message(&*panic))));

        let failed = match &result {
            Ok(_) => false,
            Err(err) => {
                warn!(error = %err, "Code generation failed");
                true
            }
        };

        let message = reducer::complete_send(&mut self.state, result, request.language);
        self.emit_last_message();
        self.emit(SessionEvent::PendingChanged { pending: false });

        if failed {
            SendOutcome::Failed(message)
        } else {
            SendOutcome::Answered(message)
        }
    }

    /// Opens or closes the admin panel, fetching the user list when opening.
    pub async fn toggle_admin_panel(&mut self) -> Result<bool, SubscriptionOpError> {
        match reducer::toggle_admin_panel(&mut self.state) {
            Ok(open) => {
                self.emit(SessionEvent::AdminPanelToggled { open });
                if open {
                    self.refresh_directory().await?;
                }
                Ok(open)
            }
            Err(notice) => {
                self.notify(notice);
                Err(SubscriptionOpError::Forbidden)
            }
        }
    }

    /// Fetches the user list for the admin panel.
    pub async fn refresh_directory(&mut self) -> Result<&[User], SubscriptionOpError> {
        let result = match self.require_admin() {
            Ok(()) => self.reload_directory().await,
            Err(err) => Err(err),
        };

        if let Err(err) = result {
            self.report_subscription_error(&err);
            return Err(err);
        }

        Ok(&self.state.directory)
    }

    pub async fn grant_subscription(
        &mut self,
        user_id: UserId,
    ) -> Result<SubscriptionRecord, SubscriptionOpError> {
        self.change_subscription(user_id, true).await
    }

    pub async fn revoke_subscription(
        &mut self,
        user_id: UserId,
    ) -> Result<SubscriptionRecord, SubscriptionOpError> {
        self.change_subscription(user_id, false).await
    }

    /// Subscribes the logged-in user themselves at the listed price.
    /// Unlike grant, this needs no administrator rights.
    pub async fn purchase_subscription(&mut self) -> Result<SubscriptionRecord, SubscriptionOpError> {
        let Some(user_id) = self.state.user.as_ref().map(|u| u.id) else {
            let err = SubscriptionOpError::NotLoggedIn;
            self.report_subscription_error(&err);
            return Err(err);
        };

        let record = self.registry.grant(user_id).await.inspect_err(|err| {
            warn!(%user_id, error = %err, "Subscription purchase failed");
            self.report_subscription_error(err);
        })?;

        info!(
            %user_id,
            price_rub = subscriptions::PRICE_RUB,
            "Subscription purchased"
        );

        reducer::apply_subscription_record(&mut self.state, user_id, &record);
        self.notify(Notice::SubscriptionUpdated {
            user_id,
            is_active: record.is_active,
        });
        self.emit_user();

        Ok(record)
    }

    async fn change_subscription(
        &mut self,
        user_id: UserId,
        activate: bool,
    ) -> Result<SubscriptionRecord, SubscriptionOpError> {
        self.require_admin()
            .inspect_err(|err| self.report_subscription_error(err))?;

        let result = if activate {
            self.registry.grant(user_id).await
        } else {
            self.registry.revoke(user_id).await
        };

        let record = result.inspect_err(|err| {
            warn!(%user_id, activate, error = %err, "Subscription update failed");
            self.report_subscription_error(err);
        })?;

        info!(%user_id, is_active = record.is_active, "Subscription updated");

        let touched_current = reducer::apply_subscription_record(&mut self.state, user_id, &record);
        self.notify(Notice::SubscriptionUpdated {
            user_id,
            is_active: record.is_active,
        });

        // The mutation already happened; a failed re-fetch only leaves the
        // directory stale.
        if let Err(err) = self.reload_directory().await {
            warn!(error = %err, "Failed to refresh users after subscription update");
            self.report_subscription_error(&err);
        }

        if touched_current {
            self.emit_user();
        }

        Ok(record)
    }

    async fn reload_directory(&mut self) -> Result<(), SubscriptionOpError> {
        let users = self.registry.list_users().await?;
        debug!("Directory refreshed with {} users", users.len());

        let replaced = reducer::apply_directory(&mut self.state, users);
        self.emit(SessionEvent::DirectoryRefreshed {
            users: self.state.directory.clone(),
        });
        if replaced {
            self.emit_user();
        }
        Ok(())
    }

    fn require_admin(&self) -> Result<(), SubscriptionOpError> {
        match &self.state.user {
            None => Err(SubscriptionOpError::NotLoggedIn),
            Some(user) if !user.is_admin => Err(SubscriptionOpError::Forbidden),
            Some(_) => Ok(()),
        }
    }

    fn report_subscription_error(&self, err: &SubscriptionOpError) {
        let notice = match err {
            SubscriptionOpError::NotLoggedIn => Notice::LoginRequired,
            SubscriptionOpError::Forbidden => Notice::AdminOnly,
            other => Notice::SubscriptionOpFailed(other.to_string()),
        };
        self.notify(notice);
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    panic
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| panic.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "generator panicked".to_string())
}
