//! Interactive chat command handler

use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::cli::render::{describe_user, drive};
use crate::config::Config;
use crate::constants::subscriptions;
use crate::domain::{Language, UserId};
use crate::session::SessionGate;
use crate::state::build_session_gate;

#[derive(Debug, PartialEq, Eq)]
enum ChatInput {
    Message(String),
    Login { email: String, name: String },
    LoginPrompt,
    Language(Language),
    Subscribe,
    Admin,
    Users,
    Grant(UserId),
    Revoke(UserId),
    Status,
    Help,
    Quit,
    Invalid(String),
}

fn parse_user_id(arg: Option<&str>, usage: &str) -> Result<UserId, String> {
    arg.ok_or_else(|| usage.to_string())?
        .parse::<UserId>()
        .map_err(|_| usage.to_string())
}

fn parse_line(line: &str) -> ChatInput {
    let trimmed = line.trim();
    let Some(command) = trimmed.strip_prefix('/') else {
        return ChatInput::Message(line.to_string());
    };

    let mut parts = command.split_whitespace();
    let name = parts.next().unwrap_or_default().to_ascii_lowercase();
    let arg = parts.next();

    match name.as_str() {
        "login" => match arg {
            Some(email) => ChatInput::Login {
                email: email.to_string(),
                name: parts.collect::<Vec<_>>().join(" "),
            },
            None => ChatInput::LoginPrompt,
        },
        "lang" | "language" => match arg.map(str::parse::<Language>) {
            Some(Ok(language)) => ChatInput::Language(language),
            Some(Err(e)) => ChatInput::Invalid(e.to_string()),
            None => ChatInput::Invalid("Usage: /lang <python|lua>".to_string()),
        },
        "subscribe" | "pay" => ChatInput::Subscribe,
        "admin" => ChatInput::Admin,
        "users" => ChatInput::Users,
        "grant" => parse_user_id(arg, "Usage: /grant <user_id>")
            .map_or_else(ChatInput::Invalid, ChatInput::Grant),
        "revoke" => parse_user_id(arg, "Usage: /revoke <user_id>")
            .map_or_else(ChatInput::Invalid, ChatInput::Revoke),
        "status" | "whoami" => ChatInput::Status,
        "help" | "?" => ChatInput::Help,
        "quit" | "exit" | "q" => ChatInput::Quit,
        other => ChatInput::Invalid(format!("Unknown command '/{other}'. Type /help")),
    }
}

fn print_help() {
    println!("Type a description of the code you need and press Enter.");
    println!();
    println!("COMMANDS:");
    println!("  /login <email> [name]  Log in (creates the account on first use)");
    println!("  /lang <python|lua>     Switch the target language");
    println!("  /status                Show the current user and subscription");
    println!(
        "  /subscribe             Buy a subscription ({}₽)",
        subscriptions::PRICE_RUB
    );
    println!("  /admin                 Toggle the admin panel (admins only)");
    println!("  /users                 Refresh the user list (admins only)");
    println!("  /grant <user_id>       Grant a subscription (admins only)");
    println!("  /revoke <user_id>      Revoke a subscription (admins only)");
    println!("  /quit                  Leave the chat");
}

fn print_status(gate: &SessionGate) {
    let state = gate.state();
    match &state.user {
        Some(user) => println!("{}", describe_user(user)),
        None => println!("Not logged in. Use /login <email> [name]"),
    }
    println!(
        "Language: {} | Messages: {}",
        state.language.display_name(),
        state.messages.len()
    );
    if state.user.is_some() && !state.can_send() {
        println!(
            "Subscribe for {}₽ with /subscribe to unlock unlimited generation.",
            subscriptions::PRICE_RUB
        );
    }
}

fn print_prompt(gate: &SessionGate) {
    print!("{}> ", gate.state().language);
    let _ = std::io::stdout().flush();
}

pub async fn cmd_chat(
    config: &Config,
    email: Option<&str>,
    name: &str,
    language: Option<Language>,
) -> anyhow::Result<()> {
    let mut gate = build_session_gate(config)?;
    let mut events = gate.subscribe();

    println!("codegen-gate v{}", env!("CARGO_PKG_VERSION"));
    println!("Generate Python and Lua code. Type /help for commands.");
    println!();

    if let Some(language) = language {
        gate.select_language(language);
    }

    if let Some(email) = email {
        // Failures are already shown as notices.
        let _ = drive(gate.login(email, name), &mut events).await;
    } else {
        println!("Log in with /login <email> [name] to get started.");
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    print_prompt(&gate);

    while let Some(line) = lines.next_line().await? {
        match parse_line(&line) {
            ChatInput::Message(text) => {
                gate.set_input(&text);
                drive(gate.submit_input(), &mut events).await;
            }
            ChatInput::Login { email, name } => {
                let _ = drive(gate.login(&email, &name), &mut events).await;
            }
            ChatInput::LoginPrompt => {
                gate.open_login_prompt();
                println!("Usage: /login <email> [name]");
            }
            ChatInput::Language(language) => {
                gate.select_language(language);
                drive(async {}, &mut events).await;
            }
            ChatInput::Subscribe => {
                let _ = drive(gate.purchase_subscription(), &mut events).await;
            }
            ChatInput::Admin => {
                let _ = drive(gate.toggle_admin_panel(), &mut events).await;
            }
            ChatInput::Users => {
                let _ = drive(gate.refresh_directory(), &mut events).await;
            }
            ChatInput::Grant(user_id) => {
                let _ = drive(gate.grant_subscription(user_id), &mut events).await;
            }
            ChatInput::Revoke(user_id) => {
                let _ = drive(gate.revoke_subscription(user_id), &mut events).await;
            }
            ChatInput::Status => print_status(&gate),
            ChatInput::Help => print_help(),
            ChatInput::Quit => break,
            ChatInput::Invalid(reason) => println!("{reason}"),
        }

        print_prompt(&gate);
    }

    println!();
    println!("Bye!");
    Ok(())
}
