use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;
use url::Url;

use crate::constants::{defaults, intervals, subscriptions};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,

    pub backend: BackendConfig,

    pub generation: GenerationConfig,

    pub server: ServerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub log_level: String,

    #[serde(default)]
    pub suppress_connection_errors: bool,

    /// Emit logs as JSON lines instead of human-readable text
    pub json_logs: bool,

    /// Number of tokio worker threads (default: 2)
    /// Set to 0 to use the number of CPU cores
    pub worker_threads: usize,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            suppress_connection_errors: false,
            json_logs: false,
            worker_threads: 2,
        }
    }
}

/// Where the session's collaborators live.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendMode {
    /// In-process store and mock generator; nothing leaves the process.
    #[default]
    Local,
    /// JSON over HTTP to the configured endpoints.
    Remote,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    pub mode: BackendMode,

    pub auth_url: String,

    pub subscriptions_url: String,

    pub generate_url: String,

    /// Request timeout in seconds (default: 60)
    pub request_timeout_seconds: u64,

    pub user_agent: String,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            mode: BackendMode::Local,
            auth_url: "http://localhost:6790/auth".to_string(),
            subscriptions_url: "http://localhost:6790/subscriptions".to_string(),
            generate_url: "http://localhost:6790/generate".to_string(),
            request_timeout_seconds: intervals::REQUEST_TIMEOUT.as_secs(),
            user_agent: defaults::USER_AGENT.to_string(),
        }
    }
}

impl BackendConfig {
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Simulated latency of the mock generator in milliseconds (default: 1000)
    pub mock_delay_ms: u64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            mock_delay_ms: u64::try_from(intervals::MOCK_GENERATION_DELAY.as_millis())
                .unwrap_or(1000),
        }
    }
}

impl GenerationConfig {
    #[must_use]
    pub const fn mock_delay(&self) -> Duration {
        Duration::from_millis(self.mock_delay_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,

    pub cors_allowed_origins: Vec<String>,

    /// Emails that are flagged as administrators on login.
    pub admin_emails: Vec<String>,

    /// Lifetime of a granted subscription (default: 30)
    pub subscription_days: i64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 6790,
            cors_allowed_origins: vec!["*".to_string()],
            admin_emails: vec![defaults::ADMIN_EMAIL.to_string()],
            subscription_days: subscriptions::DEFAULT_DURATION_DAYS,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let paths = Self::config_paths();

        for path in &paths {
            if path.exists() {
                info!("Loading config from: {}", path.display());
                return Self::load_from_path(path);
            }
        }

        info!("No config file found, using defaults");
        Ok(Self::default())
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        info!("Config saved to: {}", path.display());
        Ok(())
    }

    fn config_paths() -> Vec<PathBuf> {
        let mut paths = vec![];

        paths.push(PathBuf::from("config.toml"));

        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("codegen-gate").join("config.toml"));
        }

        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".codegen-gate").join("config.toml"));
        }

        paths
    }

    fn default_config_path() -> PathBuf {
        PathBuf::from("config.toml")
    }

    pub fn create_default_if_missing() -> Result<bool> {
        let path = Self::default_config_path();
        if path.exists() {
            Ok(false)
        } else {
            let config = Self::default();
            config.save_to_path(&path)?;
            info!("Created default config file: {}", path.display());
            Ok(true)
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.backend.mode == BackendMode::Remote {
            for (name, raw) in [
                ("auth_url", &self.backend.auth_url),
                ("subscriptions_url", &self.backend.subscriptions_url),
                ("generate_url", &self.backend.generate_url),
            ] {
                Url::parse(raw).with_context(|| format!("Invalid backend.{name}: {raw}"))?;
            }

            if self.backend.request_timeout_seconds == 0 {
                anyhow::bail!("backend.request_timeout_seconds must be > 0 in remote mode");
            }
        }

        if !(1..=subscriptions::MAX_DURATION_DAYS).contains(&self.server.subscription_days) {
            anyhow::bail!(
                "server.subscription_days must be between 1 and {}",
                subscriptions::MAX_DURATION_DAYS
            );
        }

        Ok(())
    }

    #[must_use]
    pub fn is_admin_email(&self, email: &str) -> bool {
        self.server
            .admin_emails
            .iter()
            .any(|admin| admin.eq_ignore_ascii_case(email.trim()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.backend.mode, BackendMode::Local);
        assert_eq!(config.generation.mock_delay_ms, 1000);
        assert_eq!(config.server.subscription_days, 30);
        assert!(config.is_admin_email("Admin@Codegen.ai"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("[general]"));
        assert!(toml_str.contains("[backend]"));
        assert!(toml_str.contains("mode = \"local\""));
        assert!(toml_str.contains("[server]"));
    }

    #[test]
    fn test_config_deserialization() {
        let toml_str = r#"
            [general]
            log_level = "debug"

            [backend]
            mode = "remote"
            generate_url = "https://example.com/generate"
        "#;

        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.general.log_level, "debug");
        assert_eq!(config.backend.mode, BackendMode::Remote);
        assert_eq!(config.backend.generate_url, "https://example.com/generate");

        assert_eq!(config.backend.auth_url, "http://localhost:6790/auth");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_remote_url() {
        let mut config = Config::default();
        config.backend.mode = BackendMode::Remote;
        config.backend.auth_url = "not a url".to_string();
        assert!(config.validate().is_err());

        config.backend.mode = BackendMode::Local;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_subscription_days() {
        let mut config = Config::default();
        config.server.subscription_days = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_overlong_subscription_days() {
        let mut config = Config::default();
        config.server.subscription_days = 1_000_000_000;
        assert!(config.validate().is_err());

        config.server.subscription_days = subscriptions::MAX_DURATION_DAYS;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let path = std::env::temp_dir().join(format!(
            "codegen-gate-config-{}.toml",
            std::process::id()
        ));
        let mut config = Config::default();
        config.server.port = 7001;
        config.save_to_path(&path).unwrap();

        let loaded = Config::load_from_path(&path).unwrap();
        assert_eq!(loaded.server.port, 7001);
        let _ = std::fs::remove_file(&path);
    }
}
