use anyhow::{Context, Result};
use reqwest::Client;
use tracing::debug;
use url::Url;

use super::ensure_success;
use crate::models::{GeneratedCode, GenerationRequest};

#[derive(Debug, Clone)]
pub struct GenerateClient {
    client: Client,
    url: Url,
}

impl GenerateClient {
    pub fn new(client: Client, url: &str) -> Result<Self> {
        Ok(Self {
            client,
            url: Url::parse(url).with_context(|| format!("Invalid generate URL: {url}"))?,
        })
    }

    pub async fn generate(&self, request: &GenerationRequest) -> Result<GeneratedCode> {
        debug!(language = %request.language, "Requesting code generation");

        let response = self
            .client
            .post(self.url.clone())
            .json(request)
            .send()
            .await
            .context("Failed to reach the generate service")?;

        ensure_success("generate", response)
            .await?
            .json()
            .await
            .context("Malformed response from the generate service")
    }
}
