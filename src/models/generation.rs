use serde::{Deserialize, Serialize};

use crate::domain::Language;

/// Body of a generate call: the natural-language prompt and target language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub prompt: String,
    pub language: Language,
}

impl GenerationRequest {
    #[must_use]
    pub fn new(prompt: impl Into<String>, language: Language) -> Self {
        Self {
            prompt: prompt.into(),
            language,
        }
    }
}

/// Generated source text. Older backends omit the echoed language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedCode {
    pub code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<Language>,
}
