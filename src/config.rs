use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub discord_token: String,
    pub openai_api_key: String,
    pub openai_model: String,
    pub database_path: String,
    pub log_level: String,
    /// The bot's owner, mentioned when the AI talks about its creator.
    pub creator_id: Option<u64>,
    pub use_short_response: bool,
    /// Register commands to this guild only, which shows them instantly.
    pub dev_guild_id: Option<u64>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Config::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup, which keeps tests off the process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let required = |key: &str| {
            lookup(key).ok_or_else(|| anyhow::anyhow!("{} environment variable not set", key))
        };
        let optional_id = |key: &str| -> Result<Option<u64>> {
            match lookup(key).filter(|value| !value.trim().is_empty()) {
                Some(value) => value
                    .trim()
                    .parse::<u64>()
                    .map(Some)
                    .map_err(|_| anyhow::anyhow!("{} must be a numeric Discord ID", key)),
                None => Ok(None),
            }
        };

        Ok(Config {
            discord_token: required("BOT_TOKEN")?,
            openai_api_key: required("OPENAI_API_KEY")?,
            openai_model: lookup("OPENAI_MODEL").unwrap_or_else(|| "gpt-3.5-turbo".to_string()),
            database_path: lookup("DATABASE_PATH").unwrap_or_else(|| "cutie.db".to_string()),
            log_level: lookup("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
            creator_id: optional_id("CREATOR_ID")?,
            use_short_response: lookup("USE_SHORT_RESPONSE")
                .map(|value| value.trim().eq_ignore_ascii_case("true"))
                .unwrap_or(false),
            dev_guild_id: optional_id("DEV_GUILD_ID")?,
        })
    }
}
