use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::info;

use crate::clients::{AuthClient, GenerateClient, SubscriptionsClient, build_http_client};
use crate::config::{BackendMode, Config};
use crate::constants::limits;
use crate::domain::events::SessionEvent;
use crate::services::{
    AuthService, CodeGenerator, HttpAuthService, HttpCodeGenerator, HttpSubscriptionRegistry,
    LocalAuthService, LocalSubscriptionRegistry, MockCodeGenerator, SubscriptionRegistry,
};
use crate::session::SessionGate;
use crate::store::Store;

/// The three collaborators a session talks to.
#[derive(Clone)]
pub struct Collaborators {
    pub auth: Arc<dyn AuthService>,

    pub registry: Arc<dyn SubscriptionRegistry>,

    pub generator: Arc<dyn CodeGenerator>,
}

impl Collaborators {
    /// In-process collaborators over a shared store.
    #[must_use]
    pub fn local(config: &Config, store: Store) -> Self {
        Self {
            auth: Arc::new(LocalAuthService::new(store.clone())),
            registry: Arc::new(
                LocalSubscriptionRegistry::new(store)
                    .with_duration_days(config.server.subscription_days),
            ),
            generator: Arc::new(MockCodeGenerator::new(config.generation.mock_delay())),
        }
    }

    /// HTTP collaborators sharing one connection pool.
    pub fn remote(config: &Config) -> anyhow::Result<Self> {
        let backend = &config.backend;
        let http_client = build_http_client(backend.request_timeout(), &backend.user_agent)?;

        Ok(Self {
            auth: Arc::new(HttpAuthService::new(AuthClient::new(
                http_client.clone(),
                &backend.auth_url,
            )?)),
            registry: Arc::new(HttpSubscriptionRegistry::new(SubscriptionsClient::new(
                http_client.clone(),
                &backend.subscriptions_url,
            )?)),
            generator: Arc::new(HttpCodeGenerator::new(GenerateClient::new(
                http_client,
                &backend.generate_url,
            )?)),
        })
    }

    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        match config.backend.mode {
            BackendMode::Local => {
                info!("Using in-process backend with mock generator");
                Ok(Self::local(
                    config,
                    Store::with_admins(&config.server.admin_emails),
                ))
            }
            BackendMode::Remote => {
                info!(
                    auth = %config.backend.auth_url,
                    subscriptions = %config.backend.subscriptions_url,
                    generate = %config.backend.generate_url,
                    "Using remote backend"
                );
                Self::remote(config)
            }
        }
    }

    #[must_use]
    pub fn into_gate(self, events: broadcast::Sender<SessionEvent>) -> SessionGate {
        SessionGate::with_event_bus(self.auth, self.registry, self.generator, events)
    }
}

/// Builds a session gate wired to the collaborators the config selects.
pub fn build_session_gate(config: &Config) -> anyhow::Result<SessionGate> {
    let (events, _) = broadcast::channel(limits::EVENT_BUS_BUFFER);
    Ok(Collaborators::from_config(config)?.into_gate(events))
}
