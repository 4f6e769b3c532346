//! Environment-driven settings, read once at process start

use serde::Serialize;
use thiserror::Error;

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash-exp";
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_LANGFUSE_HOST: &str = "https://api.langfuse.com";
pub const DEFAULT_APP_NAME: &str = "PDF_Validator_Agent";
pub const DEFAULT_COMPANY_EMAIL_DOMAIN: &str = "infomedia.co.id";

/// Largest accepted `MAX_FILE_SIZE_MB`
pub const MAX_FILE_SIZE_MB_LIMIT: u64 = 1024;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("GOOGLE_API_KEY is not set; the Gemini judge cannot be created")]
    MissingApiKey,

    #[error("Invalid value for {key}: '{value}' ({reason})")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub google_api_key: String,
    pub gemini_model: String,
    pub gemini_base_url: String,
    pub langfuse_public_key: String,
    pub langfuse_secret_key: String,
    pub langfuse_host: String,
    pub app_name: String,
    pub log_level: String,
    pub min_signatures: u32,
    pub max_file_size_mb: u64,
    pub company_email_domain: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            google_api_key: String::new(),
            gemini_model: DEFAULT_GEMINI_MODEL.to_string(),
            gemini_base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
            langfuse_public_key: String::new(),
            langfuse_secret_key: String::new(),
            langfuse_host: DEFAULT_LANGFUSE_HOST.to_string(),
            app_name: DEFAULT_APP_NAME.to_string(),
            log_level: "INFO".to_string(),
            min_signatures: 3,
            max_file_size_mb: 10,
            company_email_domain: DEFAULT_COMPANY_EMAIL_DOMAIN.to_string(),
        }
    }
}

impl Settings {
    /// Load `.env` (if present) and read settings from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read settings through an arbitrary lookup; unset or blank keys take defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Settings::default();
        let get = |key: &str, default: String| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or(default)
        };

        Ok(Self {
            google_api_key: get("GOOGLE_API_KEY", defaults.google_api_key),
            gemini_model: get("GEMINI_MODEL", defaults.gemini_model),
            gemini_base_url: get("GEMINI_BASE_URL", defaults.gemini_base_url)
                .trim_end_matches('/')
                .to_string(),
            langfuse_public_key: get("LF_PUBLIC_KEY", defaults.langfuse_public_key),
            langfuse_secret_key: get("LF_SECRET_KEY", defaults.langfuse_secret_key),
            langfuse_host: get("LF_HOST", defaults.langfuse_host)
                .trim_end_matches('/')
                .to_string(),
            app_name: get("APP_NAME", defaults.app_name),
            log_level: get("LOG_LEVEL", defaults.log_level),
            min_signatures: parse_number(
                "MIN_SIGNATURES",
                lookup("MIN_SIGNATURES"),
                defaults.min_signatures,
            )?,
            max_file_size_mb: parse_file_size(
                lookup("MAX_FILE_SIZE_MB"),
                defaults.max_file_size_mb,
            )?,
            company_email_domain: get("COMPANY_EMAIL_DOMAIN", defaults.company_email_domain)
                .trim_start_matches('@')
                .to_string(),
        })
    }

    pub fn gemini_enabled(&self) -> bool {
        !self.google_api_key.is_empty()
    }

    pub fn langfuse_enabled(&self) -> bool {
        !self.langfuse_public_key.is_empty() && !self.langfuse_secret_key.is_empty()
    }

    pub fn max_file_size_bytes(&self) -> u64 {
        self.max_file_size_mb.saturating_mul(1024 * 1024)
    }

    /// Settings without secrets, for `/config` and `--config`
    pub fn public_view(&self) -> PublicSettings {
        PublicSettings {
            app_name: self.app_name.clone(),
            gemini_model: self.gemini_model.clone(),
            langfuse_host: self.langfuse_host.clone(),
            log_level: self.log_level.clone(),
            min_signatures: self.min_signatures,
            max_file_size_mb: self.max_file_size_mb,
            company_email_domain: self.company_email_domain.clone(),
            gemini_enabled: self.gemini_enabled(),
            langfuse_enabled: self.langfuse_enabled(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PublicSettings {
    pub app_name: String,
    pub gemini_model: String,
    pub langfuse_host: String,
    pub log_level: String,
    pub min_signatures: u32,
    pub max_file_size_mb: u64,
    pub company_email_domain: String,
    pub gemini_enabled: bool,
    pub langfuse_enabled: bool,
}

fn parse_file_size(raw: Option<String>, default: u64) -> Result<u64, ConfigError> {
    let key = "MAX_FILE_SIZE_MB";
    let value = parse_number(key, raw, default)?;
    if !(1..=MAX_FILE_SIZE_MB_LIMIT).contains(&value) {
        return Err(ConfigError::InvalidValue {
            key,
            value: value.to_string(),
            reason: format!("must be between 1 and {}", MAX_FILE_SIZE_MB_LIMIT),
        });
    }
    Ok(value)
}

fn parse_number<T>(key: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(default),
        Some(value) => value.parse().map_err(|e: T::Err| ConfigError::InvalidValue {
            key,
            value: value.to_string(),
            reason: e.to_string(),
        }),
    }
}
