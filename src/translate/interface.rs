/// Translate interface - detection and translation run in the backend service

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

/// One entry of a language list endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageOption {
    pub code: String,
    pub name: String,
}

impl LanguageOption {
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectionRequest {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectionResult {
    pub detected_language: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationRequest {
    pub text: String,
    /// Passed through verbatim; an empty code asks the backend to auto-detect
    pub source_language: String,
    pub target_language: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationResult {
    #[serde(default)]
    pub detected_language: Option<String>,
    pub translation: String,
}

impl TranslationResult {
    /// The detected language, if the backend reported a non-empty one
    pub fn reported_language(&self) -> Option<&str> {
        self.detected_language
            .as_deref()
            .filter(|code| !code.is_empty())
    }
}

/// Backend surface consumed by the view controller
#[async_trait]
pub trait TranslateApi: Send + Sync {
    /// GET /translate/source-languages
    async fn source_languages(&self) -> Result<Vec<LanguageOption>, ApiError>;

    /// GET /translate/target-languages
    async fn target_languages(&self) -> Result<Vec<LanguageOption>, ApiError>;

    /// POST /detect
    async fn detect(&self, request: &DetectionRequest) -> Result<DetectionResult, ApiError>;

    /// POST /translate
    async fn translate(&self, request: &TranslationRequest)
        -> Result<TranslationResult, ApiError>;
}
