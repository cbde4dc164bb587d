//! Configuration for the email agent
//!
//! Supports YAML configuration files with sensible defaults, so a minimal
//! (or absent) file still yields a working setup. Secrets are never stored in
//! the file: they resolve from environment variables at load time. The loaded
//! configuration is an explicitly constructed, immutable value passed into
//! the pipeline at startup; there is no ambient global state.

use crate::errors::PipelineError;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct MailcraftConfig {
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub template: TemplateConfig,
    #[serde(default)]
    pub images: ImageSearchConfig,
    #[serde(default)]
    pub audit: AuditConfig,
    #[serde(default)]
    pub artifacts: ArtifactConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Inline API key. Prefer `api_key_env` so secrets stay out of config
    /// files.
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    #[serde(default)]
    pub api_base: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateConfig {
    #[serde(default = "default_template_path")]
    pub path: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageSearchConfig {
    #[serde(default)]
    pub access_key: Option<String>,
    #[serde(default = "default_access_key_env")]
    pub access_key_env: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default = "default_audit_log")]
    pub log_file: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default = "default_artifact_dir")]
    pub dir: PathBuf,
}

fn default_model() -> String {
    "gpt-4o".to_string()
}

fn default_temperature() -> f32 {
    0.5
}

fn default_max_output_tokens() -> u32 {
    4000
}

fn default_request_timeout_secs() -> u64 {
    120
}

fn default_api_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}

fn default_template_path() -> PathBuf {
    PathBuf::from("templates/base-email.html")
}

fn default_access_key_env() -> String {
    "UNSPLASH_ACCESS_KEY".to_string()
}

fn default_enabled() -> bool {
    true
}

fn default_audit_log() -> PathBuf {
    PathBuf::from("mailcraft_audit.log")
}

fn default_artifact_dir() -> PathBuf {
    PathBuf::from("public/emails")
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            temperature: default_temperature(),
            max_output_tokens: default_max_output_tokens(),
            request_timeout_secs: default_request_timeout_secs(),
            api_key: None,
            api_key_env: default_api_key_env(),
            api_base: None,
        }
    }
}

impl Default for TemplateConfig {
    fn default() -> Self {
        Self {
            path: default_template_path(),
        }
    }
}

impl Default for ImageSearchConfig {
    fn default() -> Self {
        Self {
            access_key: None,
            access_key_env: default_access_key_env(),
        }
    }
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            log_file: default_audit_log(),
        }
    }
}

impl Default for ArtifactConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            dir: default_artifact_dir(),
        }
    }
}

impl MailcraftConfig {
    /// Loads configuration from a YAML file and applies environment
    /// overrides.
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, PipelineError> {
        let path = path.as_ref();
        let contents = tokio::fs::read_to_string(path).await.map_err(|e| {
            PipelineError::ConfigError(format!(
                "failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;
        let mut config: MailcraftConfig = serde_yaml::from_str(&contents).map_err(|e| {
            PipelineError::ConfigError(format!(
                "failed to parse config file {}: {}",
                path.display(),
                e
            ))
        })?;
        config.resolve_environment();
        Ok(config)
    }

    /// Loads from the given file when it exists, otherwise falls back to
    /// defaults plus environment overrides.
    pub async fn from_file_or_default(path: impl AsRef<Path>) -> Result<Self, PipelineError> {
        let path = path.as_ref();
        if path.exists() {
            Self::from_file(path).await
        } else {
            log::info!(
                "config file {} not found, using defaults",
                path.display()
            );
            let mut config = MailcraftConfig::default();
            config.resolve_environment();
            Ok(config)
        }
    }

    /// Applies environment variable overrides for the knobs the deployment
    /// environment controls.
    pub fn resolve_environment(&mut self) {
        if let Ok(model) = env::var("OPENAI_MODEL_NAME") {
            if !model.is_empty() {
                self.llm.model = model;
            }
        }
        if let Ok(temperature) = env::var("OPENAI_TEMPERATURE") {
            if let Ok(parsed) = temperature.parse::<f32>() {
                self.llm.temperature = parsed;
            }
        }
    }

    /// Checks invariants that would otherwise surface mid-request. Missing
    /// credentials are fatal: no model call may be attempted without them.
    pub fn validate(&self) -> Result<(), PipelineError> {
        self.llm.resolved_api_key()?;
        if self.llm.max_output_tokens == 0 {
            return Err(PipelineError::ConfigError(
                "llm.max_output_tokens must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

impl LlmConfig {
    /// The API key, from config or the configured environment variable.
    pub fn resolved_api_key(&self) -> Result<String, PipelineError> {
        if let Some(key) = &self.api_key {
            if !key.is_empty() {
                return Ok(key.clone());
            }
        }
        match env::var(&self.api_key_env) {
            Ok(key) if !key.is_empty() => Ok(key),
            _ => Err(PipelineError::ConfigError(format!(
                "Missing OpenAI API key: set llm.api_key or the {} environment variable",
                self.api_key_env
            ))),
        }
    }
}

impl ImageSearchConfig {
    /// The access key when configured, inline or via environment. `None`
    /// disables image search.
    pub fn resolved_access_key(&self) -> Option<String> {
        if let Some(key) = &self.access_key {
            if !key.is_empty() {
                return Some(key.clone());
            }
        }
        env::var(&self.access_key_env).ok().filter(|k| !k.is_empty())
    }
}

impl TemplateConfig {
    /// Reads the base template. It is loaded once at process start and stays
    /// immutable for the process lifetime.
    pub async fn load_base_template(&self) -> Result<String, PipelineError> {
        tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            PipelineError::ConfigError(format!(
                "failed to read base template {}: {}",
                self.path.display(),
                e
            ))
        })
    }
}
