//! Durable artifact storage for generated documents
//!
//! Every successfully created document is persisted under a timestamp-derived
//! key as a write-once audit artifact. This is not the authoritative document
//! state (that lives in the caller's session), so saves are fire-and-forget:
//! failures are logged, never propagated.

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use std::path::PathBuf;

/// Fire-and-forget artifact store. Implementations must never propagate
/// failure.
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    async fn save(&self, key: &str, content: &str);
}

/// Derives the storage key for a generated document from its creation time,
/// e.g. `email-2025-07-14T09-30-12-483Z`.
pub fn timestamp_key(now: DateTime<Utc>) -> String {
    let stamp = now
        .to_rfc3339_opts(SecondsFormat::Millis, true)
        .replace([':', '.'], "-");
    format!("email-{}", stamp)
}

/// Writes artifacts as `<dir>/<key>.html`, creating the directory as needed.
pub struct FileArtifactStore {
    dir: PathBuf,
}

impl FileArtifactStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    async fn write(&self, key: &str, content: &str) -> std::io::Result<()> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self.dir.join(format!("{}.html", key));
        tokio::fs::write(path, content).await
    }
}

#[async_trait]
impl ArtifactStore for FileArtifactStore {
    async fn save(&self, key: &str, content: &str) {
        if let Err(e) = self.write(key, content).await {
            log::warn!("failed to save artifact '{}' under {}: {}", key, self.dir.display(), e);
        }
    }
}

/// Discards every artifact. Used when persistence is disabled.
pub struct NullArtifactStore;

#[async_trait]
impl ArtifactStore for NullArtifactStore {
    async fn save(&self, _key: &str, _content: &str) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_timestamp_key_has_no_colons_or_dots() {
        let at = Utc.with_ymd_and_hms(2025, 7, 14, 9, 30, 12).unwrap();
        let key = timestamp_key(at);
        assert_eq!(key, "email-2025-07-14T09-30-12-000Z");
        assert!(!key.contains(':') && !key.contains('.'));
    }

    #[tokio::test]
    async fn test_file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("emails");
        let store = FileArtifactStore::new(&nested);
        store.save("email-test", "<html></html>").await;

        let contents = std::fs::read_to_string(nested.join("email-test.html")).unwrap();
        assert_eq!(contents, "<html></html>");
    }

    #[tokio::test]
    async fn test_file_store_swallows_unwritable_dir() {
        let store = FileArtifactStore::new("/proc/no-such-dir");
        store.save("key", "content").await;
    }
}
