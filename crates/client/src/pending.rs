//! Pending upload state tracking.
//!
//! Every in-flight upload is a [`PendingItem`] moving through a fixed stage
//! machine. Observers receive immutable snapshots over a watch channel, so a
//! UI can render the queue without locking it.

use basecamp_core::variant::AssetKind;
use bytes::Bytes;
use std::sync::Arc;
use tokio::sync::watch;

/// Stage of one pending upload.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UploadStage {
    /// Enqueued, not started.
    Idle,
    /// Requesting presigned credentials.
    RequestingCredentials,
    /// Deriving renditions locally.
    Processing,
    /// Transferring renditions to storage.
    Uploading,
    /// Committing metadata.
    Finalizing,
    /// Committed; the item leaves the queue.
    Committed,
    /// Failed; retained for retry or dismissal.
    Failed,
}

impl UploadStage {
    /// Whether this stage may move to `next`.
    ///
    /// Retrying a failed upload re-enters credential issuance; a committed
    /// upload is terminal.
    pub fn can_transition_to(self, next: UploadStage) -> bool {
        use UploadStage::*;
        matches!(
            (self, next),
            (Idle, RequestingCredentials)
                | (RequestingCredentials, Processing)
                | (Processing, Uploading)
                | (Uploading, Finalizing)
                | (Finalizing, Committed)
                | (RequestingCredentials, Failed)
                | (Processing, Failed)
                | (Uploading, Failed)
                | (Finalizing, Failed)
                | (Failed, RequestingCredentials)
        )
    }

    /// Whether the item can be started (or restarted) from this stage.
    pub fn is_startable(self) -> bool {
        matches!(self, UploadStage::Idle | UploadStage::Failed)
    }
}

/// One pending upload.
///
/// The source bytes are retained for the whole lifetime of the item so a
/// failed upload can be retried without re-reading the file.
#[derive(Clone, Debug)]
pub struct PendingItem {
    pub id: u64,
    pub kind: AssetKind,
    pub rec_resource_id: String,
    pub file_name: String,
    pub source: Bytes,
    pub stage: UploadStage,
    pub progress: u8,
    pub stage_label: String,
    pub error: Option<String>,
}

/// Observable queue of pending uploads.
///
/// Mutations replace the published snapshot wholesale; receivers never see a
/// half-applied update.
#[derive(Clone)]
pub struct PendingQueue {
    tx: Arc<watch::Sender<Arc<Vec<PendingItem>>>>,
}

impl Default for PendingQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl PendingQueue {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(Arc::new(Vec::new()));
        Self { tx: Arc::new(tx) }
    }

    /// Current snapshot.
    pub fn snapshot(&self) -> Arc<Vec<PendingItem>> {
        self.tx.borrow().clone()
    }

    /// Subscribe to snapshot updates.
    pub fn subscribe(&self) -> watch::Receiver<Arc<Vec<PendingItem>>> {
        self.tx.subscribe()
    }

    /// Apply a mutation and publish the new snapshot.
    pub fn update(&self, f: impl FnOnce(&mut Vec<PendingItem>)) {
        self.tx.send_modify(|snapshot| {
            let mut items = (**snapshot).clone();
            f(&mut items);
            *snapshot = Arc::new(items);
        });
    }

    /// Find an item by id in the current snapshot.
    pub fn get(&self, id: u64) -> Option<PendingItem> {
        self.snapshot().iter().find(|i| i.id == id).cloned()
    }

    pub fn push(&self, item: PendingItem) {
        self.update(|items| items.push(item));
    }

    pub fn remove(&self, id: u64) {
        self.update(|items| items.retain(|i| i.id != id));
    }

    /// Mutate one item in place.
    pub fn update_item(&self, id: u64, f: impl FnOnce(&mut PendingItem)) {
        self.update(|items| {
            if let Some(item) = items.iter_mut().find(|i| i.id == id) {
                f(item);
            }
        });
    }
}
