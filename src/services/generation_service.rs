//! Generation collaborator: turns a prompt and target language into code.

use thiserror::Error;

use crate::models::{GeneratedCode, GenerationRequest};

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("Prompt is required")]
    EmptyPrompt,

    #[error("Generation rejected: {0}")]
    Rejected(String),

    #[error("Generation service unavailable: {0}")]
    Unavailable(String),

    #[error("Generator crashed: {0}")]
    Internal(String),
}

impl From<anyhow::Error> for GenerationError {
    fn from(err: anyhow::Error) -> Self {
        match crate::clients::ServiceError::find(&err) {
            Some(service) if service.status.is_client_error() => {
                Self::Rejected(service.message.clone())
            }
            _ => Self::Unavailable(format!("{err:#}")),
        }
    }
}

/// Domain service trait for code generation.
#[async_trait::async_trait]
pub trait CodeGenerator: Send + Sync {
    async fn generate(&self, request: &GenerationRequest) -> Result<GeneratedCode, GenerationError>;
}
