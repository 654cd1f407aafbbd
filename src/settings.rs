use anyhow::{Context, Result};
use config::{Config, ConfigError, Environment, File};
use linked_hash_set::LinkedHashSet;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

const FILENAME: &str = "settings.yaml";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Discord's bot token
    pub token: String,
    /// Discord account id which owns the bot
    pub owner: u64,
    /// Prefix for text commands (`help` and the owner-only ones)
    pub prefix: String,
    /// Seconds between presence changes
    pub activity_interval_secs: u64,
    pub moderation: ModerationSettings,
    pub keep_alive: KeepAliveSettings,
}

/// Where warnings live between restarts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PersistenceMode {
    /// Whole store is rewritten to `warnings_path` after every violation.
    File,
    /// Warnings are lost on restart.
    Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModerationSettings {
    pub persistence: PersistenceMode,
    pub warnings_path: PathBuf,
    /// Words which get a message deleted. Matched case-insensitively as substrings.
    pub banned_words: LinkedHashSet<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KeepAliveSettings {
    /// Address the health server listens on.
    pub bind: String,
    /// Public url of this process. Enables the self ping when set.
    pub external_url: Option<String>,
    /// Hosting platform shown in `/health` and the http endpoints.
    pub host: String,
    /// Plan of the hosting platform, reported by `/info`.
    pub tier: String,
    pub ping_interval_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            token: String::new(),
            owner: 0,
            prefix: String::from("!"),
            activity_interval_secs: 30 * 60,
            moderation: ModerationSettings::default(),
            keep_alive: KeepAliveSettings::default(),
        }
    }
}

impl Default for ModerationSettings {
    fn default() -> Self {
        Self {
            persistence: PersistenceMode::File,
            warnings_path: PathBuf::from("warnings.json"),
            banned_words: ["badword1", "badword2", "badword3"]
                .iter()
                .map(|w| w.to_string())
                .collect(),
        }
    }
}

impl Default for KeepAliveSettings {
    fn default() -> Self {
        Self {
            bind: String::from("0.0.0.0:8080"),
            external_url: None,
            host: String::from("Render.com"),
            tier: String::from("Free"),
            ping_interval_secs: 8 * 60,
        }
    }
}

impl Settings {
    pub fn path() -> PathBuf {
        PathBuf::from(std::env::var("BOT_SETTINGS").unwrap_or_else(|_| FILENAME.to_string()))
    }

    pub fn new() -> Result<Self, ConfigError> {
        Self::from_sources(
            File::from(Self::path()).required(false),
            Environment::with_prefix("BOT")
                .prefix_separator("_")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("moderation.banned_words")
                .try_parsing(true),
        )
    }

    fn from_sources<F, E>(file: F, env: E) -> Result<Self, ConfigError>
    where
        F: config::Source + Send + Sync + 'static,
        E: config::Source + Send + Sync + 'static,
    {
        // Start off by merging in the "default" configuration file
        // then add in settings from the environment (with a prefix of BOT)
        // Eg.. `BOT_MODERATION__PERSISTENCE=memory` would set `moderation.persistence`
        let mut settings: Settings = Config::builder()
            .add_source(file)
            .add_source(env)
            .build()?
            .try_deserialize()?;

        if settings.token.is_empty() {
            if let Ok(token) = std::env::var("DISCORD_TOKEN") {
                settings.token = token;
            }
        }
        settings.moderation.banned_words = settings
            .moderation
            .banned_words
            .iter()
            .map(|w| w.trim().to_lowercase())
            .filter(|w| !w.is_empty())
            .collect();

        Ok(settings)
    }

    pub async fn save(&self) -> Result<()> {
        use tokio::io::AsyncWriteExt;

        let settings_path = Self::path();

        if let Some(parent) = settings_path.parent() {
            let _ = tokio::fs::create_dir_all(parent).await;
        }
        let mut file = tokio::fs::File::create(&settings_path).await?;
        file.write_all(
            serde_yaml::to_string(&self)
                .context("Failed to serialize settings")?
                .as_bytes(),
        )
        .await?;
        file.sync_all().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::FileFormat;

    fn parse(yaml: &str) -> Settings {
        Settings::from_sources(
            File::from_str(yaml, FileFormat::Yaml),
            Environment::with_prefix("MODERATION_BOT_TEST_UNSET"),
        )
        .unwrap()
    }

    #[test]
    fn defaults_fill_missing_keys() {
        let settings = parse("token: abc");

        assert_eq!(settings.token, "abc");
        assert_eq!(settings.prefix, "!");
        assert_eq!(settings.moderation.persistence, PersistenceMode::File);
        assert_eq!(settings.keep_alive.bind, "0.0.0.0:8080");
        assert_eq!(settings.moderation.banned_words.len(), 3);
    }

    #[test]
    fn memory_mode_and_words_are_normalized() {
        let settings = parse(
            r#"
token: abc
moderation:
  persistence: memory
  banned_words: ["  Spam ", "EGGS", ""]
"#,
        );

        assert_eq!(settings.moderation.persistence, PersistenceMode::Memory);
        let words: Vec<&str> = settings
            .moderation
            .banned_words
            .iter()
            .map(String::as_str)
            .collect();
        assert_eq!(words, vec!["spam", "eggs"]);
    }

    #[test]
    fn unknown_persistence_mode_is_rejected() {
        let result = Settings::from_sources(
            File::from_str("moderation:\n  persistence: redis", FileFormat::Yaml),
            Environment::with_prefix("MODERATION_BOT_TEST_UNSET"),
        );

        assert!(result.is_err());
    }
}
