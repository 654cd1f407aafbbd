mod scan;
mod store;

pub use scan::BannedWords;
pub use store::WarningStore;

use crate::discord::Data;
use crate::settings::{ModerationSettings, PersistenceMode};
use anyhow::Result;
use poise::serenity_prelude::{self as serenity, Mentionable};
use std::collections::{BTreeMap, BTreeSet};

/// Outcome of a message which contained banned words.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub words: Vec<String>,
    /// Warnings of the author after this message.
    pub count: u64,
}

/// Finds banned words in messages and counts warnings per guild member.
#[derive(Debug)]
pub struct ModerationTracker {
    words: BannedWords,
    store: WarningStore,
}

impl ModerationTracker {
    pub fn new(words: BannedWords, store: WarningStore) -> Self {
        Self { words, store }
    }

    pub async fn from_settings(settings: &ModerationSettings) -> Self {
        let store = match settings.persistence {
            PersistenceMode::File => WarningStore::open(&settings.warnings_path).await,
            PersistenceMode::Memory => {
                log::warn!("Warnings are kept in memory and will be lost on restart.");
                WarningStore::in_memory()
            }
        };

        let words = BannedWords::new(&settings.banned_words);
        if words.is_empty() {
            log::warn!("No banned words configured, messages will not be moderated.");
        }

        Self::new(words, store)
    }

    pub fn banned_words(&self) -> &BannedWords {
        &self.words
    }

    pub fn scan_text<'a>(&'a self, text: &str) -> BTreeSet<&'a str> {
        self.words.scan_text(text)
    }

    /// Counts one warning for a violating message, no matter how many words matched.
    ///
    /// Without matched words nothing is recorded and the current count is returned.
    pub async fn record_violation(
        &self,
        guild_id: &str,
        user_id: &str,
        matched_words: &BTreeSet<&str>,
    ) -> u64 {
        if matched_words.is_empty() {
            return self.store.get_count(guild_id, user_id).await;
        }

        self.store.record_violation(guild_id, user_id).await
    }

    pub async fn get_count(&self, guild_id: &str, user_id: &str) -> u64 {
        self.store.get_count(guild_id, user_id).await
    }

    pub async fn dump_guild(&self, guild_id: &str) -> BTreeMap<String, u64> {
        self.store.dump_guild(guild_id).await
    }

    pub async fn flush(&self) -> Result<()> {
        self.store.flush().await
    }

    /// Scans a message and records a warning when it contains banned words.
    ///
    /// Bot authors and messages outside of a guild are ignored.
    pub async fn check_message(
        &self,
        guild_id: Option<&str>,
        user_id: &str,
        text: &str,
        is_bot: bool,
    ) -> Option<Violation> {
        if is_bot {
            return None;
        }
        let guild_id = guild_id?;

        let matched = self.scan_text(text);
        if matched.is_empty() {
            return None;
        }

        let count = self.record_violation(guild_id, user_id, &matched).await;
        Some(Violation {
            words: matched.into_iter().map(str::to_string).collect(),
            count,
        })
    }
}

/// Deletes messages containing banned words and tells the author about it.
///
/// The warning is kept even if the message could not be deleted.
pub async fn handle_message(ctx: &serenity::Context, data: &Data, message: &serenity::Message) {
    let guild_id = message.guild_id.map(|id| id.to_string());
    let Some(violation) = data
        .tracker
        .check_message(
            guild_id.as_deref(),
            &message.author.id.to_string(),
            &message.content,
            message.author.bot,
        )
        .await
    else {
        return;
    };

    log::info!(
        "Deleting message by '{}' containing {:?} (warning #{})",
        message.author.tag(),
        violation.words,
        violation.count
    );

    if let Err(e) = message.delete(&ctx.http).await {
        if is_missing_permissions(&e) {
            log::warn!("Missing permissions to delete message in {}", message.channel_id);
        } else {
            log::error!("Failed to delete message: {:?}", e);
        }
    }

    let notice = format!(
        "⚠️ {}, your message contained a banned word and was removed. Warnings: {}",
        message.author.mention(),
        violation.count
    );
    if let Err(e) = message.channel_id.say(&ctx.http, notice).await {
        log::error!("Failed to send warning notice: {:?}", e);
    }
}

fn is_missing_permissions(error: &serenity::Error) -> bool {
    // 50013: Missing Permissions
    matches!(
        error,
        serenity::Error::Http(serenity::HttpError::UnsuccessfulRequest(response))
            if response.status_code.as_u16() == 403 || response.error.code == 50013
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tracker() -> ModerationTracker {
        ModerationTracker::new(
            BannedWords::new(["badword1", "badword2", "badword3"]),
            WarningStore::in_memory(),
        )
    }

    #[tokio::test]
    async fn clean_message_records_nothing() {
        let tracker = tracker();

        let violation = tracker
            .check_message(Some("g1"), "u1", "hello everyone", false)
            .await;

        assert_eq!(violation, None);
        assert!(tracker.dump_guild("g1").await.is_empty());
    }

    #[tokio::test]
    async fn one_warning_per_message() {
        let tracker = tracker();

        let violation = tracker
            .check_message(Some("g1"), "u1", "BADWORD1 and badword2", false)
            .await
            .unwrap();

        assert_eq!(violation.count, 1);
        assert_eq!(violation.words, vec!["badword1", "badword2"]);
        assert_eq!(tracker.get_count("g1", "u1").await, 1);
    }

    #[tokio::test]
    async fn bots_and_direct_messages_are_ignored() {
        let tracker = tracker();

        assert!(tracker
            .check_message(Some("g1"), "u1", "badword1", true)
            .await
            .is_none());
        assert!(tracker
            .check_message(None, "u1", "badword1", false)
            .await
            .is_none());
        assert_eq!(tracker.get_count("g1", "u1").await, 0);
    }

    #[tokio::test]
    async fn empty_match_does_not_count() {
        let tracker = tracker();

        assert_eq!(tracker.record_violation("g1", "u1", &BTreeSet::new()).await, 0);
        assert!(tracker.dump_guild("g1").await.is_empty());
    }

    #[tokio::test]
    async fn two_users_in_dump() {
        let tracker = tracker();

        tracker.check_message(Some("g1"), "u1", "badword3", false).await;
        tracker.check_message(Some("g1"), "u1", "badword3", false).await;
        tracker.check_message(Some("g1"), "u2", "badword1", false).await;

        let dump = tracker.dump_guild("g1").await;
        assert_eq!(dump.len(), 2);
        assert_eq!(dump["u1"], 2);
        assert_eq!(dump["u2"], 1);
    }
}
