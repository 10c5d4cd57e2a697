//! One-shot request command handler

use crate::cli::render::drive;
use crate::config::Config;
use crate::domain::Language;
use crate::session::SendOutcome;
use crate::state::build_session_gate;

pub async fn cmd_ask(
    config: &Config,
    email: &str,
    name: &str,
    language: Language,
    subscribe: bool,
    prompt: &str,
) -> anyhow::Result<()> {
    let mut gate = build_session_gate(config)?;
    let mut events = gate.subscribe();

    drive(gate.login(email, name), &mut events).await?;

    if subscribe && !gate.can_send() {
        drive(gate.purchase_subscription(), &mut events).await?;
    }

    match drive(gate.send(prompt, language), &mut events).await {
        SendOutcome::Answered(_) => Ok(()),
        SendOutcome::Ignored => anyhow::bail!("Nothing to send: the prompt is empty"),
        SendOutcome::Blocked(notice) => anyhow::bail!("{notice}"),
        SendOutcome::Failed(message) => anyhow::bail!("{}", message.content),
    }
}
