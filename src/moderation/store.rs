use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeMap,
    io::ErrorKind,
    path::{Path, PathBuf},
};
use tokio::{io::AsyncWriteExt, sync::Mutex};

/// Warnings of a single user within a guild.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WarningRecord {
    pub warnings: u64,
}

/// `guild id -> user id -> record`, identifiers kept as strings like in the file.
pub type Warnings = BTreeMap<String, BTreeMap<String, WarningRecord>>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Backend {
    /// Nothing survives a restart.
    Memory,
    /// Whole store is rewritten after every mutation.
    File(PathBuf),
}

#[derive(Debug, Default)]
struct Inner {
    warnings: Warnings,
    /// Last write to the backing file failed.
    dirty: bool,
}

/// Per guild, per user warning counters.
///
/// All mutations and the following write to disk happen under one lock,
/// so concurrent violations never lose an update and the file always holds
/// a complete snapshot.
#[derive(Debug)]
pub struct WarningStore {
    backend: Backend,
    inner: Mutex<Inner>,
}

impl WarningStore {
    pub fn in_memory() -> Self {
        Self {
            backend: Backend::Memory,
            inner: Mutex::new(Inner::default()),
        }
    }

    /// Opens the store backed by `path`. A missing or unreadable file starts empty.
    pub async fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let warnings = load(&path).await;

        Self {
            backend: Backend::File(path),
            inner: Mutex::new(Inner {
                warnings,
                dirty: false,
            }),
        }
    }

    /// Adds one warning and returns the new count.
    ///
    /// A failed write is logged and retried with the next mutation, the
    /// in-memory count is kept either way.
    pub async fn record_violation(&self, guild_id: &str, user_id: &str) -> u64 {
        let mut inner = self.inner.lock().await;

        let record = inner
            .warnings
            .entry(guild_id.to_string())
            .or_default()
            .entry(user_id.to_string())
            .or_default();
        record.warnings += 1;
        let count = record.warnings;

        if let Backend::File(path) = &self.backend {
            let saved = save(path, &inner.warnings).await;
            match saved {
                Ok(()) => inner.dirty = false,
                Err(e) => {
                    log::error!("Failed to persist warnings to {}: {:?}", path.display(), e);
                    inner.dirty = true;
                }
            }
        }

        count
    }

    pub async fn get_count(&self, guild_id: &str, user_id: &str) -> u64 {
        self.inner
            .lock()
            .await
            .warnings
            .get(guild_id)
            .and_then(|users| users.get(user_id))
            .map(|record| record.warnings)
            .unwrap_or(0)
    }

    /// Copy of all counts within a guild.
    pub async fn dump_guild(&self, guild_id: &str) -> BTreeMap<String, u64> {
        self.inner
            .lock()
            .await
            .warnings
            .get(guild_id)
            .map(|users| {
                users
                    .iter()
                    .map(|(user, record)| (user.clone(), record.warnings))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Writes the store if an earlier write failed.
    pub async fn flush(&self) -> Result<()> {
        let mut inner = self.inner.lock().await;

        if let Backend::File(path) = &self.backend {
            if inner.dirty {
                save(path, &inner.warnings).await?;
                inner.dirty = false;
            }
        }

        Ok(())
    }

    #[cfg(test)]
    pub async fn is_dirty(&self) -> bool {
        self.inner.lock().await.dirty
    }
}

/// Reads the warnings file, falling back to an empty store.
pub async fn load(path: &Path) -> Warnings {
    let content = match tokio::fs::read_to_string(path).await {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            log::info!("No warnings file at {}, starting empty.", path.display());
            return Warnings::new();
        }
        Err(e) => {
            log::warn!("Failed to read {}, starting empty: {}", path.display(), e);
            return Warnings::new();
        }
    };

    match serde_json::from_str(&content) {
        Ok(warnings) => warnings,
        Err(e) => {
            log::warn!("Malformed warnings file {}, starting empty: {}", path.display(), e);
            Warnings::new()
        }
    }
}

/// Overwrites `path` with the whole store.
///
/// The data is written to a sibling file first and renamed over `path`, so
/// readers see either the old or the new snapshot.
pub async fn save(path: &Path, warnings: &Warnings) -> Result<()> {
    let json = serde_json::to_string_pretty(warnings).context("Failed to serialize warnings")?;

    let mut tmp_path = path.as_os_str().to_owned();
    tmp_path.push(".tmp");
    let tmp_path = PathBuf::from(tmp_path);

    let written = write_and_replace(&tmp_path, path, json.as_bytes()).await;
    if written.is_err() {
        let _ = tokio::fs::remove_file(&tmp_path).await;
    }
    written
}

async fn write_and_replace(tmp_path: &Path, path: &Path, content: &[u8]) -> Result<()> {
    let mut file = tokio::fs::File::create(tmp_path)
        .await
        .with_context(|| format!("Failed to create {}", tmp_path.display()))?;
    file.write_all(content).await?;
    file.sync_all().await?;
    drop(file);

    tokio::fs::rename(tmp_path, path)
        .await
        .with_context(|| format!("Failed to replace {}", path.display()))?;
    Ok(())
}
