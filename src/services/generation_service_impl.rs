//! Remote and simulated implementations of the `CodeGenerator` trait.

use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

use crate::clients::GenerateClient;
use crate::constants::intervals;
use crate::domain::Language;
use crate::models::{GeneratedCode, GenerationRequest};
use crate::services::generation_service::{CodeGenerator, GenerationError};

pub struct HttpCodeGenerator {
    client: GenerateClient,
}

impl HttpCodeGenerator {
    #[must_use]
    pub const fn new(client: GenerateClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl CodeGenerator for HttpCodeGenerator {
    async fn generate(&self, request: &GenerationRequest) -> Result<GeneratedCode, GenerationError> {
        Ok(self.client.generate(request).await?)
    }
}

/// Answers every request with a canned snippet after a fixed delay.
#[derive(Debug, Clone)]
pub struct MockCodeGenerator {
    delay: Duration,
}

impl Default for MockCodeGenerator {
    fn default() -> Self {
        Self::new(intervals::MOCK_GENERATION_DELAY)
    }
}

impl MockCodeGenerator {
    #[must_use]
    pub const fn new(delay: Duration) -> Self {
        Self { delay }
    }

    #[must_use]
    pub const fn instant() -> Self {
        Self::new(Duration::ZERO)
    }
}

fn sample_snippet(language: Language) -> &'static str {
    match language {
        Language::Python => {
            "def hello_world():\n    print(\"Hello, World!\")\n    return True\n\nhello_world()"
        }
        Language::Lua => {
            "function helloWorld()\n    print(\"Hello, World!\")\n    return true\nend\n\nhelloWorld()"
        }
    }
}

/// Wraps the canned snippet in a fenced block headed by the request summary.
#[must_use]
pub fn render_mock_snippet(request: &GenerationRequest) -> String {
    let summary = request.prompt.lines().next().unwrap_or_default().trim();
    format!(
        "```{lang}\n{comment} Request: {summary}\n{body}\n```",
        lang = request.language,
        comment = request.language.comment_prefix(),
        body = sample_snippet(request.language),
    )
}

#[async_trait]
impl CodeGenerator for MockCodeGenerator {
    async fn generate(&self, request: &GenerationRequest) -> Result<GeneratedCode, GenerationError> {
        if request.prompt.trim().is_empty() {
            return Err(GenerationError::EmptyPrompt);
        }

        if !self.delay.is_zero() {
            debug!(delay = ?self.delay, "Simulating generation latency");
            tokio::time::sleep(self.delay).await;
        }

        Ok(GeneratedCode {
            code: render_mock_snippet(request),
            language: Some(request.language),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn mock_returns_fenced_snippet_in_requested_language() {
        let generator = MockCodeGenerator::instant();

        let lua = generator
            .generate(&GenerationRequest::new("greet the world", Language::Lua))
            .await
            .unwrap();
        assert!(lua.code.starts_with("```lua\n-- Request: greet the world\n"));
        assert!(lua.code.contains("function helloWorld()"));
        assert!(lua.code.ends_with("```"));
        assert_eq!(lua.language, Some(Language::Lua));

        let python = generator
            .generate(&GenerationRequest::new("sort a list\nplease", Language::Python))
            .await
            .unwrap();
        assert!(python.code.starts_with("```python\n# Request: sort a list\n"));
        assert!(python.code.contains("def hello_world():"));
    }

    #[tokio::test]
    async fn mock_rejects_blank_prompt() {
        let err = MockCodeGenerator::instant()
            .generate(&GenerationRequest::new("   ", Language::Python))
            .await
            .unwrap_err();
        assert!(matches!(err, GenerationError::EmptyPrompt));
    }

    #[tokio::test]
    async fn mock_waits_for_configured_delay() {
        let delay = Duration::from_millis(20);
        let generator = MockCodeGenerator::new(delay);
        let started = std::time::Instant::now();
        generator
            .generate(&GenerationRequest::new("x", Language::Python))
            .await
            .unwrap();
        assert!(started.elapsed() >= delay);
    }
}
