use crate::i18n::LanguageCode;
use anyhow::{Context, Result};
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Config {
    // Telegram
    pub telegram_bot_token: String,
    pub telegram_api_base: String,
    pub webhook_secret: Option<String>,

    // Database
    pub database_url: String,

    // Localization
    pub locales_dir: PathBuf,
    pub default_language: LanguageCode,

    // Server
    pub port: u16,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            // Telegram
            telegram_bot_token: std::env::var("TELEGRAM_BOT_TOKEN")
                .context("TELEGRAM_BOT_TOKEN not set")?,
            telegram_api_base: std::env::var("TELEGRAM_API_BASE")
                .unwrap_or_else(|_| "https://api.telegram.org".to_string()),
            webhook_secret: std::env::var("WEBHOOK_SECRET")
                .ok()
                .filter(|s| !s.is_empty()),

            // Database
            database_url: std::env::var("DATABASE_URL").context("DATABASE_URL not set")?,

            // Localization
            locales_dir: std::env::var("LOCALES_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("locales")),
            default_language: std::env::var("DEFAULT_LANGUAGE")
                .map(LanguageCode::from)
                .unwrap_or_else(|_| LanguageCode::from("en")),

            // Server
            port: std::env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(8080),
        })
    }
}
