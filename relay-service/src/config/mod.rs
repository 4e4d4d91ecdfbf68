use secrecy::{ExposeSecret, Secret};
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;

/// Public Bot API host; the bot token is part of the path.
pub const TELEGRAM_API_URL: &str = "https://api.telegram.org";

#[derive(Debug, Clone)]
pub struct RelayConfig {
    pub common: core_config::Config,
    pub telegram: TelegramConfig,
    pub auth: AuthConfig,
}

#[derive(Debug, Clone)]
pub struct TelegramConfig {
    pub chat_id: String,
    pub bot_token: Secret<String>,
    /// Overrides the `https://api.telegram.org/bot<token>/` base, e.g. for a
    /// self-hosted Bot API server.
    pub api_base_url: Option<String>,
}

impl TelegramConfig {
    pub fn api_base_url(&self) -> String {
        match &self.api_base_url {
            Some(url) => url.clone(),
            None => format!(
                "{}/bot{}/",
                TELEGRAM_API_URL,
                self.bot_token.expose_secret()
            ),
        }
    }

    /// Whether a send can possibly succeed: a chat to deliver to and a way to
    /// address the bot.
    pub fn is_configured(&self) -> bool {
        !self.chat_id.is_empty()
            && (!self.bot_token.expose_secret().is_empty() || self.api_base_url.is_some())
    }
}

#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Shared secret expected in the `token` header.
    pub token: Secret<String>,
}

impl RelayConfig {
    pub fn load() -> Result<Self, AppError> {
        let common_config = core_config::Config::load()?;
        let is_prod = env::var("ENVIRONMENT").unwrap_or_else(|_| "dev".to_string()) == "prod";

        Ok(RelayConfig {
            common: common_config,
            telegram: TelegramConfig {
                chat_id: get_env("TG_CHAT_ID", Some(""), is_prod)?,
                bot_token: Secret::new(get_env("TG_BOT_TOKEN", Some(""), is_prod)?),
                api_base_url: env::var("TG_API_BOT_BASE_URL")
                    .ok()
                    .filter(|url| !url.is_empty()),
            },
            auth: AuthConfig {
                token: Secret::new(get_env("TOKEN", Some(""), is_prod)?),
            },
        })
    }
}

fn get_env(key: &str, default: Option<&str>, is_prod: bool) -> Result<String, AppError> {
    match env::var(key) {
        Ok(val) => Ok(val),
        Err(_) => {
            if is_prod {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required in production but not set",
                    key
                )))
            } else if let Some(def) = default {
                Ok(def.to_string())
            } else {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required but not set",
                    key
                )))
            }
        }
    }
}
