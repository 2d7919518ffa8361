use anyhow::Result;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::debug;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub view: ViewConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Unset means the HTTP transport default
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewConfig {
    /// Drop responses that arrive after a newer submission of the same form
    #[serde(default = "default_discard_stale")]
    pub discard_stale_responses: bool,
    /// Panel opened on attach instead of the first trigger's
    #[serde(default)]
    pub default_tab: Option<String>,
}

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_discard_stale() -> bool {
    true
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_secs: None,
        }
    }
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            discard_stale_responses: default_discard_stale(),
            default_tab: None,
        }
    }
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        if !Path::new(path).exists() {
            anyhow::bail!("Configuration file not found: {}", path);
        }

        let content = substitute_env(&read_text_file(path)?)?;

        let path_lower = path.to_lowercase();
        if path_lower.ends_with(".jsonld") || path_lower.ends_with(".json") {
            let mut json_value: serde_json::Value = serde_json::from_str(&content)?;
            // JSON-LD context carries no settings
            if let serde_json::Value::Object(ref mut obj) = json_value {
                obj.remove("@context");
            }
            Ok(serde_json::from_value(json_value)?)
        } else {
            Ok(serde_yaml::from_str(&content)?)
        }
    }

    /// Apply `TRANSLATE_API_URL` on top of whatever was loaded
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(url) = std::env::var("TRANSLATE_API_URL") {
            if !url.is_empty() {
                debug!("api.base_url overridden from TRANSLATE_API_URL");
                self.api.base_url = url;
            }
        }
        self
    }
}

/// Replace `${VAR_NAME}` with the environment value; unknown variables are left as-is
pub fn substitute_env(content: &str) -> Result<String> {
    let pattern = Regex::new(r"\$\{(\w+)\}")?;
    Ok(pattern
        .replace_all(content, |caps: &Captures| {
            std::env::var(&caps[1]).unwrap_or_else(|_| caps[0].to_string())
        })
        .into_owned())
}

/// Read a text file, stripping a UTF-8 BOM and falling back to legacy decoding
pub fn read_text_file(path: &str) -> Result<String> {
    let mut bytes = fs::read(path)?;
    if bytes.starts_with(&[0xEF, 0xBB, 0xBF]) {
        bytes.drain(0..3);
    }

    match String::from_utf8(bytes) {
        Ok(content) => Ok(content),
        Err(err) => {
            debug!("{} is not UTF-8, decoding as GBK", path);
            let (cow, _, _) = encoding_rs::GBK.decode(err.as_bytes());
            Ok(cow.into_owned())
        }
    }
}
