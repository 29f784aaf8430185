//! Canonical-keyed entry storage with hook notification.
//!
//! [`ArchiveStore`] holds the in-memory archive and brackets every mutation
//! with the lifecycle hooks of the owning package. Keys passed to the store
//! are already canonical; reference resolution happens in
//! [`MddocPackage`](crate::MddocPackage).

use crate::package::codec::{ArchiveCodec, Entries};
use crate::package::error::Result;
use crate::package::hooks::{HookEvent, HookName, HookPipeline};
use crate::package::options::{DecodeOptions, EncodeOptions};
use bytes::Bytes;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

/// In-memory archive: canonical path to entry content.
///
/// Writes, removals and decodes are serialized by a mutation lock held across
/// their hook firings, so two mutations never interleave. The entry map itself
/// is only locked for the duration of a lookup or update, which lets listeners
/// read the store back, e.g. an `after:setData` listener fetching the entry it
/// was notified of. A listener of `before:setData`, `setData`, `after:setData`
/// or `delData` must not start another mutation of the same store.
pub struct ArchiveStore {
    entries: RwLock<Entries>,
    mutation: Mutex<()>,
    hooks: Arc<HookPipeline>,
    codec: Arc<dyn ArchiveCodec>,
}

impl ArchiveStore {
    /// Create an empty store.
    pub fn new(hooks: Arc<HookPipeline>, codec: Arc<dyn ArchiveCodec>) -> Self {
        Self::with_entries(Entries::new(), hooks, codec)
    }

    /// Create a store holding `entries`, without firing any hook.
    pub fn with_entries(
        entries: Entries,
        hooks: Arc<HookPipeline>,
        codec: Arc<dyn ArchiveCodec>,
    ) -> Self {
        Self {
            entries: RwLock::new(entries),
            mutation: Mutex::new(()),
            hooks,
            codec,
        }
    }

    /// Read an entry.
    ///
    /// Fires `getData` first. The hook is informational: a failing listener is
    /// logged and does not prevent the read. A missing key yields `None`.
    pub async fn read(&self, path: &str) -> Option<Bytes> {
        if let Err(err) = self
            .hooks
            .fire(
                HookName::GetData,
                HookEvent::GetData {
                    path: path.to_string(),
                },
            )
            .await
        {
            log::warn!("ignoring failed getData listener for '{}': {}", path, err);
        }

        self.entries.read().await.get(path).cloned()
    }

    /// Insert or replace an entry.
    ///
    /// Fires `before:setData` and `setData` before the entry is stored and
    /// `after:setData` afterwards. A failure in the first two leaves the
    /// archive untouched; a failure in `after:setData` is reported with the
    /// entry already stored.
    pub async fn write(&self, path: &str, data: Bytes) -> Result<()> {
        let _mutation = self.mutation.lock().await;
        let event = HookEvent::SetData {
            path: path.to_string(),
            data: data.clone(),
        };

        self.hooks.fire(HookName::BeforeSetData, event.clone()).await?;
        self.hooks.fire(HookName::SetData, event.clone()).await?;
        self.entries.write().await.insert(path.to_string(), data);
        log::debug!("stored '{}'", path);
        self.hooks.fire(HookName::AfterSetData, event).await
    }

    /// Remove an entry. Removing a missing key is a no-op.
    ///
    /// Fires `delData` first; a failing listener leaves the entry in place.
    pub async fn remove(&self, path: &str) -> Result<()> {
        let _mutation = self.mutation.lock().await;
        self.hooks
            .fire(
                HookName::DelData,
                HookEvent::DelData {
                    path: path.to_string(),
                },
            )
            .await?;

        if self.entries.write().await.remove(path).is_some() {
            log::debug!("removed '{}'", path);
        }
        Ok(())
    }

    /// Encode the whole archive.
    ///
    /// Fires `saveZip` first. The archive is captured after the hook returns,
    /// so entries a listener writes (a refreshed `modified` timestamp, say) are
    /// part of the output.
    pub async fn serialize(&self, options: &EncodeOptions) -> Result<Vec<u8>> {
        self.hooks.fire(HookName::SaveZip, HookEvent::SaveZip).await?;

        let entries = self.snapshot().await;
        let bytes = self.codec.compress(&entries, options)?;
        log::debug!("serialized {} entries into {} bytes", entries.len(), bytes.len());
        Ok(bytes)
    }

    /// Replace the archive with the decoded content of `data`.
    ///
    /// On error the current content is kept.
    pub async fn deserialize(&self, data: &[u8], options: &DecodeOptions) -> Result<()> {
        let _mutation = self.mutation.lock().await;
        let decoded = self.codec.decompress(data, options)?;
        log::debug!("decoded {} entries from {} bytes", decoded.len(), data.len());
        *self.entries.write().await = decoded;
        Ok(())
    }

    pub async fn contains(&self, path: &str) -> bool {
        self.entries.read().await.contains_key(path)
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Canonical paths of all entries, sorted.
    pub async fn paths(&self) -> Vec<String> {
        let mut paths: Vec<String> = self.entries.read().await.keys().cloned().collect();
        paths.sort();
        paths
    }

    /// Copy of the current archive. Entry content is shared, not copied.
    pub async fn snapshot(&self) -> Entries {
        self.entries.read().await.clone()
    }
}

impl std::fmt::Debug for ArchiveStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut s = f.debug_struct("ArchiveStore");
        match self.entries.try_read() {
            Ok(entries) => s.field("entries", &entries.len()),
            Err(_) => s.field("entries", &"<locked>"),
        };
        s.field("hooks", &self.hooks).finish()
    }
}
