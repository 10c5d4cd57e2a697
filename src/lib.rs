pub mod api;
pub mod cli;
pub mod clients;
pub mod config;
pub mod constants;
pub mod domain;
pub mod models;
pub mod services;
pub mod session;
pub mod state;
pub mod store;

use clap::CommandFactory;
pub use config::Config;
use tracing::info;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};

/// Installs the global tracing subscriber.
///
/// `RUST_LOG` wins over `general.log_level`. Logs go to stderr so they never
/// interleave with generated code on stdout.
pub fn init_tracing(config: &Config) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let mut log_level = config.general.log_level.clone();
    if config.general.suppress_connection_errors {
        log_level.push_str(",reqwest=off,hyper_util=off");
    }

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log_level));

    let registry = tracing_subscriber::registry().with(env_filter);

    if config.general.json_logs {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

pub async fn run(cli: Cli, mut config: Config) -> anyhow::Result<()> {
    if let Some(mode) = cli.backend {
        config.backend.mode = mode;
    }
    config.validate()?;

    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        println!();
        return Ok(());
    };

    match command {
        Commands::Chat {
            email,
            name,
            language,
        } => cli::cmd_chat(&config, email.as_deref(), &name, language).await,

        Commands::Ask {
            email,
            name,
            language,
            subscribe,
            prompt,
        } => {
            cli::cmd_ask(
                &config,
                &email,
                &name,
                language,
                subscribe,
                &prompt.join(" "),
            )
            .await
        }

        Commands::Users { admin } => cli::cmd_users(&config, &admin).await,

        Commands::Grant { user_id, admin } => cli::cmd_grant(&config, &admin, user_id).await,

        Commands::Revoke { user_id, admin } => cli::cmd_revoke(&config, &admin, user_id).await,

        Commands::Serve { port } => cli::cmd_serve(&config, port).await,

        Commands::Init => {
            if Config::create_default_if_missing()? {
                println!("Created config.toml with default settings");
            } else {
                info!("config.toml already exists, leaving it untouched");
                println!("config.toml already exists");
            }
            Ok(())
        }
    }
}
