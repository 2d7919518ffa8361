use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, error};

use super::interface::{
    DetectionRequest, DetectionResult, LanguageOption, TranslateApi, TranslationRequest,
    TranslationResult,
};
use crate::config::ApiConfig;
use crate::error::ApiError;

pub const SOURCE_LANGUAGES_PATH: &str = "/translate/source-languages";
pub const TARGET_LANGUAGES_PATH: &str = "/translate/target-languages";
pub const DETECT_PATH: &str = "/detect";
pub const TRANSLATE_PATH: &str = "/translate";

/// JSON-over-HTTP client for the translation backend
#[derive(Debug, Clone)]
pub struct HttpTranslateClient {
    client: Client,
    base_url: String,
}

impl HttpTranslateClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: normalize_base_url(base_url.into()),
        }
    }

    /// Build a client with an overall per-request timeout
    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> anyhow::Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: normalize_base_url(base_url.into()),
        })
    }

    pub fn from_config(config: &ApiConfig) -> anyhow::Result<Self> {
        match config.request_timeout_secs {
            Some(secs) => Self::with_timeout(&config.base_url, Duration::from_secs(secs)),
            None => Ok(Self::new(&config.base_url)),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Returns true when the backend root answers with a success status
    pub async fn health_check(&self) -> Result<bool, ApiError> {
        let url = self.url("/");
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| transport(&url, e))?;
        Ok(response.status().is_success())
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let url = self.url(path);
        debug!("GET {}", url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| transport(&url, e))?;
        read_json(&url, response).await
    }

    async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        let url = self.url(path);
        debug!("POST {}", url);
        // .json() sets Content-Type: application/json
        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| transport(&url, e))?;
        read_json(&url, response).await
    }
}

fn normalize_base_url(base_url: String) -> String {
    base_url.trim_end_matches('/').to_string()
}

fn transport(url: &str, err: reqwest::Error) -> ApiError {
    error!("Request to {} failed: {}", url, err);
    ApiError::Transport {
        url: url.to_string(),
        reason: err.to_string(),
    }
}

async fn read_json<T: DeserializeOwned>(url: &str, response: Response) -> Result<T, ApiError> {
    let status = response.status();
    let body = response.text().await.map_err(|e| transport(url, e))?;

    if !status.is_success() {
        error!("{} returned {}", url, status);
        return Err(ApiError::Status {
            url: url.to_string(),
            status: status.as_u16(),
            body,
        });
    }

    serde_json::from_str(&body).map_err(|e| {
        error!("Malformed response from {}: {}", url, e);
        ApiError::Decode {
            url: url.to_string(),
            reason: e.to_string(),
        }
    })
}

#[async_trait]
impl TranslateApi for HttpTranslateClient {
    async fn source_languages(&self) -> Result<Vec<LanguageOption>, ApiError> {
        self.get_json(SOURCE_LANGUAGES_PATH).await
    }

    async fn target_languages(&self) -> Result<Vec<LanguageOption>, ApiError> {
        self.get_json(TARGET_LANGUAGES_PATH).await
    }

    async fn detect(&self, request: &DetectionRequest) -> Result<DetectionResult, ApiError> {
        self.post_json(DETECT_PATH, request).await
    }

    async fn translate(
        &self,
        request: &TranslationRequest,
    ) -> Result<TranslationResult, ApiError> {
        self.post_json(TRANSLATE_PATH, request).await
    }
}
