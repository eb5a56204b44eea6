//! Configuration loading, validation, and management for Deskmate.
//!
//! Loads configuration from `~/.deskmate/config.toml` with environment
//! variable overrides for secrets. Validates all settings at startup.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.deskmate/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Persona / system instructions override
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub persona: Option<String>,

    /// LLM backend configuration
    #[serde(default)]
    pub llm: LlmConfig,

    /// Learning-management-system configuration
    #[serde(default)]
    pub lms: LmsConfig,

    /// Calendar configuration
    #[serde(default)]
    pub calendar: CalendarConfig,

    /// Search + scrape configuration
    #[serde(default)]
    pub search: SearchConfig,

    /// Weather configuration
    #[serde(default)]
    pub weather: WeatherConfig,

    /// Proactive briefing thresholds
    #[serde(default)]
    pub briefing: BriefingConfig,

    /// Context assembly configuration
    #[serde(default)]
    pub context: ContextConfig,

    /// Extra routing triggers: category name → additional trigger terms
    #[serde(default)]
    pub extra_triggers: HashMap<String, Vec<String>>,
}

/// Redact a secret string for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("persona", &self.persona.as_deref().map(|_| "<set>"))
            .field("llm", &self.llm)
            .field("lms", &self.lms)
            .field("calendar", &self.calendar)
            .field("search", &self.search)
            .field("weather", &self.weather)
            .field("briefing", &self.briefing)
            .field("context", &self.context)
            .field("extra_triggers", &self.extra_triggers)
            .finish()
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// API key. Prefer the environment (DESKMATE_API_KEY, OPENROUTER_API_KEY,
    /// OPENAI_API_KEY) over writing it here.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// OpenAI-compatible endpoint base URL
    #[serde(default = "default_llm_url")]
    pub api_url: String,

    /// Model identifiers in fallback priority order. The first is the
    /// primary; later entries are tried on rate/quota errors only.
    #[serde(default = "default_models")]
    pub models: Vec<String>,

    /// Maximum tokens per generated reply
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

fn default_llm_url() -> String {
    "https://openrouter.ai/api/v1".into()
}
fn default_models() -> Vec<String> {
    vec![
        "google/gemini-2.0-flash-001".into(),
        "google/gemini-flash-1.5".into(),
        "meta-llama/llama-3.1-8b-instruct".into(),
    ]
}
fn default_max_tokens() -> u32 {
    1024
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_url: default_llm_url(),
            models: default_models(),
            max_tokens: default_max_tokens(),
        }
    }
}

impl std::fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmConfig")
            .field("api_key", &redact(&self.api_key))
            .field("api_url", &self.api_url)
            .field("models", &self.models)
            .field("max_tokens", &self.max_tokens)
            .finish()
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct LmsConfig {
    /// LMS REST base URL (Canvas-style API)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    /// Bearer token (env override: DESKMATE_LMS_TOKEN)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

impl Default for LmsConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            token: None,
        }
    }
}

impl std::fmt::Debug for LmsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LmsConfig")
            .field("base_url", &self.base_url)
            .field("token", &redact(&self.token))
            .finish()
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct CalendarConfig {
    /// Calendar gateway base URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    /// Bearer token (env override: DESKMATE_CALENDAR_TOKEN)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            token: None,
        }
    }
}

impl std::fmt::Debug for CalendarConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CalendarConfig")
            .field("base_url", &self.base_url)
            .field("token", &redact(&self.token))
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Hard cap on scraped page text, in characters
    #[serde(default = "default_fetch_chars")]
    pub max_fetch_chars: usize,

    /// Whether to fetch and extract the top result page (vs. index snippet only)
    #[serde(default = "default_true")]
    pub fetch_top_result: bool,
}

fn default_fetch_chars() -> usize {
    4000
}
fn default_true() -> bool {
    true
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_fetch_chars: default_fetch_chars(),
            fetch_top_result: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherConfig {
    /// Default location for weather pulls
    #[serde(default = "default_location")]
    pub location: String,

    /// Cache TTL in seconds
    #[serde(default = "default_weather_ttl")]
    pub cache_ttl_secs: u64,
}

fn default_location() -> String {
    "New York".into()
}
fn default_weather_ttl() -> u64 {
    600
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            location: default_location(),
            cache_ttl_secs: default_weather_ttl(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BriefingConfig {
    /// Whether the session-start briefing runs at all
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Brief when any course score falls below this percent
    #[serde(default = "default_score_cutoff")]
    pub score_cutoff: f64,

    /// Brief when coursework is due within this many days
    #[serde(default = "default_due_soon_days")]
    pub due_soon_days: i64,

    /// Brief when today holds at least this many events
    #[serde(default = "default_density_cutoff")]
    pub density_cutoff: usize,
}

fn default_score_cutoff() -> f64 {
    80.0
}
fn default_due_soon_days() -> i64 {
    3
}
fn default_density_cutoff() -> usize {
    4
}

impl Default for BriefingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            score_cutoff: default_score_cutoff(),
            due_soon_days: default_due_soon_days(),
            density_cutoff: default_density_cutoff(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextConfig {
    /// Per-section character cap in assembled context blocks
    #[serde(default = "default_section_chars")]
    pub max_section_chars: usize,
}

fn default_section_chars() -> usize {
    4000
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            max_section_chars: default_section_chars(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the default path (~/.deskmate/config.toml).
    ///
    /// Environment overrides (highest priority):
    /// - `DESKMATE_API_KEY` / `OPENROUTER_API_KEY` / `OPENAI_API_KEY`
    /// - `DESKMATE_LMS_TOKEN`
    /// - `DESKMATE_CALENDAR_TOKEN`
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        let mut config = Self::load_from(&config_path)?;

        if config.llm.api_key.is_none() {
            config.llm.api_key = std::env::var("DESKMATE_API_KEY")
                .ok()
                .or_else(|| std::env::var("OPENROUTER_API_KEY").ok())
                .or_else(|| std::env::var("OPENAI_API_KEY").ok());
        }
        if config.lms.token.is_none() {
            config.lms.token = std::env::var("DESKMATE_LMS_TOKEN").ok();
        }
        if config.calendar.token.is_none() {
            config.calendar.token = std::env::var("DESKMATE_CALENDAR_TOKEN").ok();
        }

        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".deskmate")
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=100.0).contains(&self.briefing.score_cutoff) {
            return Err(ConfigError::ValidationError(
                "briefing.score_cutoff must be between 0 and 100".into(),
            ));
        }
        if self.briefing.due_soon_days < 0 {
            return Err(ConfigError::ValidationError(
                "briefing.due_soon_days must not be negative".into(),
            ));
        }
        if self.weather.cache_ttl_secs == 0 {
            return Err(ConfigError::ValidationError(
                "weather.cache_ttl_secs must be positive".into(),
            ));
        }
        if self.context.max_section_chars == 0 {
            return Err(ConfigError::ValidationError(
                "context.max_section_chars must be positive".into(),
            ));
        }
        if self.llm.models.is_empty() {
            return Err(ConfigError::ValidationError(
                "llm.models must list at least one model identifier".into(),
            ));
        }
        Ok(())
    }

    /// Fail fast when a required credential is absent. Called once at
    /// startup, not per-turn.
    pub fn ensure_credentials(&self) -> Result<(), ConfigError> {
        if self.llm.api_key.as_deref().unwrap_or("").is_empty() {
            return Err(ConfigError::MissingCredential("llm.api_key".into()));
        }
        Ok(())
    }

    /// Generate a default config TOML string (for `config init`).
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            persona: None,
            llm: LlmConfig::default(),
            lms: LmsConfig::default(),
            calendar: CalendarConfig::default(),
            search: SearchConfig::default(),
            weather: WeatherConfig::default(),
            briefing: BriefingConfig::default(),
            context: ContextConfig::default(),
            extra_triggers: HashMap::new(),
        }
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),

    #[error("Required credential missing: {0}")]
    MissingCredential(String),
}
