//! Terminal rendering of session events.

use chrono::Utc;
use std::future::Future;
use tokio::sync::broadcast::{self, error::RecvError};

use crate::domain::events::{Notice, SessionEvent};
use crate::models::User;

/// Runs `fut` to completion while drawing every event it publishes.
pub async fn drive<F: Future>(fut: F, events: &mut broadcast::Receiver<SessionEvent>) -> F::Output {
    tokio::pin!(fut);

    let output = loop {
        tokio::select! {
            output = &mut fut => break output,
            event = events.recv() => match event {
                Ok(event) => render_event(&event),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Renderer fell behind the event bus");
                }
                Err(RecvError::Closed) => break (&mut fut).await,
            },
        }
    };

    while let Ok(event) = events.try_recv() {
        render_event(&event);
    }

    output
}

pub fn render_event(event: &SessionEvent) {
    match event {
        SessionEvent::UserChanged { user: Some(user) } => {
            println!("Logged in as {}", describe_user(user));
        }
        SessionEvent::UserChanged { user: None } => println!("Logged out"),
        SessionEvent::LanguageChanged { language } => {
            println!("Target language: {}", language.display_name());
        }
        SessionEvent::MessageAppended { message, .. } => {
            if !message.is_user() {
                println!();
                println!("{}", message.content);
                println!();
            }
        }
        SessionEvent::PendingChanged { pending: true } => println!("… generating"),
        SessionEvent::PendingChanged { pending: false } => {}
        SessionEvent::DirectoryRefreshed { users } => print_users(users),
        SessionEvent::AdminPanelToggled { open } => {
            println!("Admin panel {}", if *open { "opened" } else { "closed" });
        }
        SessionEvent::Notice(notice) => print_notice(notice),
    }
}

pub fn print_notice(notice: &Notice) {
    if notice.is_blocking() {
        println!("⚠ {notice}");
    } else {
        println!("✓ {notice}");
    }
}

fn subscription_label(user: &User) -> String {
    if !user.subscription.is_active {
        return "inactive".to_string();
    }
    match user.subscription.days_remaining(Utc::now()) {
        Some(days) => format!("active, {days} days left"),
        None => "active".to_string(),
    }
}

#[must_use]
pub fn describe_user(user: &User) -> String {
    let admin = if user.is_admin { " [admin]" } else { "" };
    format!(
        "{} <{}>{} (subscription {})",
        user.name,
        user.email,
        admin,
        subscription_label(user)
    )
}

pub fn print_users(users: &[User]) {
    if users.is_empty() {
        println!("No users yet.");
        return;
    }

    println!("Users ({} total)", users.len());
    println!("{:-<70}", "");

    for user in users {
        let status = if user.subscription.is_active {
            "🟢"
        } else {
            "•"
        };
        println!("{} [{}] {}", status, user.id, describe_user(user));
    }

    println!();
    println!("Legend: 🟢 Subscribed | • Not subscribed");
}
