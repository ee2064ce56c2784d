//! Configuration management and settings
//!
//! Sectioned configuration with documented defaults, loadable from a
//! `config.toml` file. The secret API token is additionally resolvable from
//! the environment (a local `.env` file is read at startup) or a CLI
//! override: the CLI flag wins over `TRENDLENS_API_TOKEN`, which wins over
//! the config file.

use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Environment variable holding the hosted-API secret token.
pub const API_TOKEN_ENV: &str = "TRENDLENS_API_TOKEN";

/// Placeholder value shipped in `.env.example`; treated as absent.
const TOKEN_PLACEHOLDER: &str = "YOUR_API_TOKEN_HERE";

/// Inclusive calendar date range, naive dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// Full calendar year, January 1 through December 31.
    pub fn calendar_year(year: i32) -> Self {
        Self {
            start: NaiveDate::from_ymd_opt(year, 1, 1).expect("valid calendar date"),
            end: NaiveDate::from_ymd_opt(year, 12, 31).expect("valid calendar date"),
        }
    }
}

impl std::fmt::Display for DateRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.start, self.end)
    }
}

/// Application-level settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub title: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            title: "Keyword Trend Explorer".to_string(),
        }
    }
}

/// Trends data source settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrendsConfig {
    /// Base URL of the trends query endpoint.
    pub base_url: String,
    /// Two-letter region code.
    pub region: String,
    pub timeframe: DateRange,
    /// Courtesy delay bounds (seconds) applied once before each upstream call.
    pub delay_min_secs: f64,
    pub delay_max_secs: f64,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for TrendsConfig {
    fn default() -> Self {
        Self {
            base_url: "https://trends-api.example.com".to_string(),
            region: "US".to_string(),
            timeframe: DateRange::calendar_year(2023),
            delay_min_secs: 1.0,
            delay_max_secs: 3.0,
            timeout_secs: 30,
        }
    }
}

/// Anomaly detector settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnomalyConfig {
    /// Minimum absolute week-over-week fraction flagged as anomalous.
    pub change_threshold: f64,
}

impl Default for AnomalyConfig {
    fn default() -> Self {
        Self {
            change_threshold: crate::anomaly::DEFAULT_CHANGE_THRESHOLD,
        }
    }
}

/// Text-completion backend selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    /// Hosted chat-completion API (needs a token).
    OpenAi,
    /// Locally hosted model server.
    Ollama,
    /// Always use the canned fallback.
    None,
}

impl LlmProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OpenAi => "openai",
            Self::Ollama => "ollama",
            Self::None => "none",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "openai" => Some(Self::OpenAi),
            "ollama" => Some(Self::Ollama),
            "none" => Some(Self::None),
            _ => None,
        }
    }
}

/// Explanation backend settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub provider: LlmProvider,
    /// Hosted chat-completion model identifier.
    pub openai_model: String,
    pub openai_base_url: String,
    /// Local model server model identifier.
    pub ollama_model: String,
    pub ollama_base_url: String,
    pub max_tokens: u32,
    pub temperature: f32,
    /// Secret token; usually left out of the file and supplied via the
    /// environment or the CLI override.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_token: Option<String>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: LlmProvider::OpenAi,
            openai_model: "gpt-4o-mini".to_string(),
            openai_base_url: "https://api.openai.com".to_string(),
            ollama_model: "llama3.2".to_string(),
            ollama_base_url: "http://localhost:11434".to_string(),
            max_tokens: 100,
            temperature: 0.7,
            api_token: None,
        }
    }
}

impl LlmConfig {
    /// Resolve the secret token: CLI override, then environment, then the
    /// config file. Placeholder and blank values count as absent, which
    /// silently selects the canned-explanation fallback.
    pub fn resolve_token(&self, cli_override: Option<&str>) -> Option<String> {
        fn usable(token: &str) -> bool {
            !token.trim().is_empty() && token.trim() != TOKEN_PLACEHOLDER
        }

        cli_override
            .filter(|t| usable(t))
            .map(str::to_string)
            .or_else(|| std::env::var(API_TOKEN_ENV).ok().filter(|t| usable(t)))
            .or_else(|| self.api_token.clone().filter(|t| usable(t)))
    }
}

/// Logging settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log format: "text" or "json".
    pub format: String,
    pub verbose: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: "text".to_string(),
            verbose: false,
        }
    }
}

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub app: AppConfig,
    pub trends: TrendsConfig,
    pub anomaly: AnomalyConfig,
    pub llm: LlmConfig,
    pub logging: LoggingConfig,
}

impl Config {
    /// Parse from TOML text.
    pub fn from_toml(text: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(text).map_err(|e| Error::config(format!("invalid TOML: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml(&text)
    }

    /// Load from an optional file path, falling back to `config.toml` in the
    /// working directory when present, otherwise defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::from_file(p),
            None => {
                let default_path = Path::new("config.toml");
                if default_path.exists() {
                    Self::from_file(default_path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.anomaly.change_threshold <= 0.0 {
            return Err(Error::config("anomaly.change_threshold must be positive"));
        }
        if self.trends.delay_min_secs < 0.0
            || self.trends.delay_max_secs < self.trends.delay_min_secs
        {
            return Err(Error::config(
                "trends.delay_min_secs/delay_max_secs must form a non-negative range",
            ));
        }
        if self.trends.timeframe.start > self.trends.timeframe.end {
            return Err(Error::config("trends.timeframe start is after end"));
        }
        if self.trends.region.len() != 2
            || !self.trends.region.chars().all(|c| c.is_ascii_uppercase())
        {
            return Err(Error::config(
                "trends.region must be a two-letter uppercase code",
            ));
        }
        if !matches!(self.logging.format.as_str(), "text" | "json") {
            return Err(Error::config("logging.format must be \"text\" or \"json\""));
        }
        Ok(())
    }
}

/// Display name for a two-letter region code; falls back to the code itself.
pub fn region_display_name(code: &str) -> &str {
    match code {
        "US" => "the United States",
        "GB" => "the United Kingdom",
        "CA" => "Canada",
        "AU" => "Australia",
        "DE" => "Germany",
        "FR" => "France",
        "JP" => "Japan",
        "KR" => "South Korea",
        "IN" => "India",
        "BR" => "Brazil",
        _ => code,
    }
}
