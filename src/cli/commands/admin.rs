//! Admin command handlers: list users, grant and revoke subscriptions

use crate::cli::AdminLogin;
use crate::cli::render::{drive, print_users};
use crate::config::{BackendMode, Config};
use crate::constants::defaults;
use crate::domain::UserId;
use crate::session::SessionGate;
use crate::state::build_session_gate;
use tracing::warn;

async fn admin_gate(config: &Config, login: &AdminLogin) -> anyhow::Result<SessionGate> {
    let email = login
        .email
        .clone()
        .or_else(|| config.server.admin_emails.first().cloned())
        .unwrap_or_else(|| defaults::ADMIN_EMAIL.to_string());

    if config.backend.mode == BackendMode::Local {
        if !config.is_admin_email(&email) {
            anyhow::bail!("{email} is not listed in server.admin_emails");
        }
        warn!("Local backend keeps users in memory; only this process's users are visible");
    }

    let mut gate = build_session_gate(config)?;
    let user = gate.login(&email, &login.name).await?;
    if !user.is_admin {
        anyhow::bail!("{email} is not an administrator");
    }

    Ok(gate)
}

pub async fn cmd_users(config: &Config, login: &AdminLogin) -> anyhow::Result<()> {
    let mut gate = admin_gate(config, login).await?;
    let users = gate.refresh_directory().await?;
    print_users(users);
    Ok(())
}

pub async fn cmd_grant(config: &Config, login: &AdminLogin, user_id: UserId) -> anyhow::Result<()> {
    let mut gate = admin_gate(config, login).await?;
    let mut events = gate.subscribe();

    let record = drive(gate.grant_subscription(user_id), &mut events).await?;
    if let Some(expires_at) = record.expires_at {
        println!("Expires: {}", expires_at.format("%Y-%m-%d %H:%M UTC"));
    }
    Ok(())
}

pub async fn cmd_revoke(config: &Config, login: &AdminLogin, user_id: UserId) -> anyhow::Result<()> {
    let mut gate = admin_gate(config, login).await?;
    let mut events = gate.subscribe();

    drive(gate.revoke_subscription(user_id), &mut events).await?;
    Ok(())
}
