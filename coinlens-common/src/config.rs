//! Configuration loading
//!
//! Values come from command-line arguments or the process environment, with an
//! optional `.env` file in the working directory providing local overrides for
//! variables that are not already set.

use crate::{Error, Result};
use std::fmt;
use std::path::PathBuf;

/// Default HTTP listen port
pub const DEFAULT_PORT: u16 = 8080;

/// Default database location (created on first start)
pub const DEFAULT_DATABASE_URL: &str = "sqlite://coinlens.db?mode=rwc";

/// Default image storage root
pub const DEFAULT_UPLOAD_DIR: &str = "uploads";

/// Default recognition model
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-3-flash-preview";

/// Default recognition service endpoint
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Recognition service settings
#[derive(Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
}

impl fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish()
    }
}

/// Resolved service configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub database_url: String,
    pub upload_dir: PathBuf,
    pub gemini: GeminiConfig,
}

impl AppConfig {
    /// Check that every required value is present and usable
    pub fn validate(self) -> Result<Self> {
        if !is_valid_key(&self.gemini.api_key) {
            return Err(Error::Config(
                "Gemini API key not configured. Set GEMINI_API_KEY in the environment, \
                 in a local .env file, or pass --gemini-api-key"
                    .to_string(),
            ));
        }
        if self.database_url.trim().is_empty() {
            return Err(Error::Config("DATABASE_URL must not be empty".to_string()));
        }
        if self.gemini.model.trim().is_empty() {
            return Err(Error::Config("Gemini model name must not be empty".to_string()));
        }
        if self.upload_dir.as_os_str().is_empty() {
            return Err(Error::Config("Upload directory must not be empty".to_string()));
        }
        Ok(self)
    }
}

/// Validate API key (non-empty, non-whitespace)
pub fn is_valid_key(key: &str) -> bool {
    !key.trim().is_empty()
}

/// Load the optional `.env` override file
///
/// Variables already present in the environment win. Returns the path of the
/// file that was loaded, if any. Runs before logging is set up, so reporting
/// the outcome is left to the caller.
pub fn load_env_file() -> Option<PathBuf> {
    dotenvy::dotenv().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with_key(key: &str) -> AppConfig {
        AppConfig {
            port: DEFAULT_PORT,
            database_url: DEFAULT_DATABASE_URL.to_string(),
            upload_dir: PathBuf::from(DEFAULT_UPLOAD_DIR),
            gemini: GeminiConfig {
                api_key: key.to_string(),
                model: DEFAULT_GEMINI_MODEL.to_string(),
                base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
            },
        }
    }

    #[test]
    fn test_is_valid_key() {
        assert!(is_valid_key("abc123"));
        assert!(!is_valid_key(""));
        assert!(!is_valid_key("   "));
    }

    #[test]
    fn test_validate_accepts_defaults_with_key() {
        let config = config_with_key("secret").validate().unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.upload_dir, PathBuf::from("uploads"));
    }

    #[test]
    fn test_validate_rejects_blank_key() {
        let err = config_with_key("  ").validate().unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_validate_rejects_empty_database_url() {
        let mut config = config_with_key("secret");
        config.database_url = String::new();
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let rendered = format!("{:?}", config_with_key("super-secret"));
        assert!(!rendered.contains("super-secret"));
        assert!(rendered.contains("<redacted>"));
    }
}
