//! Upload coordination: the stage machine around the executor.

use crate::api::{AssetApi, AssetSummary};
use crate::error::UploadError;
use crate::executor::UploadExecutor;
use crate::pending::{PendingItem, PendingQueue, UploadStage};
use crate::processor::{ProgressFn, VariantProcessor};
use crate::transfer::VariantTransfer;
use basecamp_core::variant::AssetKind;
use bytes::Bytes;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::mpsc;

/// User-facing event emitted when an upload or deletion settles.
#[derive(Clone, Debug, PartialEq)]
pub enum Notification {
    UploadComplete {
        kind: AssetKind,
        file_name: String,
    },
    UploadFailed {
        kind: AssetKind,
        file_name: String,
        message: String,
    },
    DeleteComplete {
        kind: AssetKind,
        asset_id: String,
    },
    DeleteFailed {
        kind: AssetKind,
        asset_id: String,
        message: String,
    },
}

/// One entry in the merged display list.
#[derive(Clone, Debug)]
pub enum DisplayEntry {
    /// An upload still in flight (or failed, awaiting retry/dismissal).
    Pending(PendingItem),
    /// A committed asset as reported by the server.
    Committed(AssetSummary),
}

/// Drives pending uploads through their stage machine.
pub struct UploadCoordinator {
    api: Arc<dyn AssetApi>,
    executor: UploadExecutor,
    queue: PendingQueue,
    notifications: mpsc::UnboundedSender<Notification>,
    next_id: AtomicU64,
}

impl UploadCoordinator {
    /// Create a coordinator and the receiving end of its notification stream.
    pub fn new(
        api: Arc<dyn AssetApi>,
        transfer: Arc<dyn VariantTransfer>,
        processor: Arc<dyn VariantProcessor>,
    ) -> (Self, mpsc::UnboundedReceiver<Notification>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let executor = UploadExecutor::new(api.clone(), transfer, processor);
        (
            Self {
                api,
                executor,
                queue: PendingQueue::new(),
                notifications: tx,
                next_id: AtomicU64::new(1),
            },
            rx,
        )
    }

    /// The observable pending queue.
    pub fn queue(&self) -> &PendingQueue {
        &self.queue
    }

    /// Add an upload to the queue without starting it.
    pub fn enqueue(
        &self,
        kind: AssetKind,
        rec_resource_id: &str,
        file_name: &str,
        source: Bytes,
    ) -> u64 {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.queue.push(PendingItem {
            id,
            kind,
            rec_resource_id: rec_resource_id.to_string(),
            file_name: file_name.to_string(),
            source,
            stage: UploadStage::Idle,
            progress: 0,
            stage_label: String::new(),
            error: None,
        });
        id
    }

    /// Run an enqueued or failed upload through the full pipeline.
    ///
    /// On success the item leaves the queue; on failure it stays in the
    /// `Failed` stage with its source bytes intact so it can be retried.
    #[tracing::instrument(skip(self))]
    pub async fn start(&self, id: u64) -> Result<AssetSummary, UploadError> {
        let item = self
            .queue
            .get(id)
            .ok_or_else(|| UploadError::State(format!("no pending upload with id {id}")))?;
        if !item.stage.is_startable() {
            return Err(UploadError::State(format!(
                "upload {id} is already in progress"
            )));
        }

        match self.run_pipeline(&item).await {
            Ok(summary) => {
                self.set_stage(id, UploadStage::Committed);
                self.queue.remove(id);
                let _ = self.notifications.send(Notification::UploadComplete {
                    kind: item.kind,
                    file_name: item.file_name,
                });
                Ok(summary)
            }
            Err(e) => {
                let message = e.to_string();
                self.queue.update_item(id, |i| {
                    i.stage = UploadStage::Failed;
                    i.error = Some(message.clone());
                });
                let _ = self.notifications.send(Notification::UploadFailed {
                    kind: item.kind,
                    file_name: item.file_name,
                    message,
                });
                Err(e)
            }
        }
    }

    /// Retry a failed upload, reusing the retained source bytes.
    pub async fn retry(&self, id: u64) -> Result<AssetSummary, UploadError> {
        let item = self
            .queue
            .get(id)
            .ok_or_else(|| UploadError::State(format!("no pending upload with id {id}")))?;
        if item.stage != UploadStage::Failed {
            return Err(UploadError::State(format!("upload {id} has not failed")));
        }
        self.start(id).await
    }

    /// Remove an idle or failed upload from the queue.
    ///
    /// Purely local: nothing is sent to the server, and any objects already
    /// written under a previous attempt's credentials are left to expire
    /// uncommitted.
    pub fn dismiss(&self, id: u64) -> Result<(), UploadError> {
        let item = self
            .queue
            .get(id)
            .ok_or_else(|| UploadError::State(format!("no pending upload with id {id}")))?;
        if !item.stage.is_startable() {
            return Err(UploadError::State(format!(
                "upload {id} is in progress and cannot be dismissed"
            )));
        }
        self.queue.remove(id);
        Ok(())
    }

    /// Delete a committed asset on the server.
    #[tracing::instrument(skip(self))]
    pub async fn delete(
        &self,
        kind: AssetKind,
        rec_resource_id: &str,
        asset_id: &str,
    ) -> Result<(), UploadError> {
        match self.api.delete_asset(kind, rec_resource_id, asset_id).await {
            Ok(()) => {
                let _ = self.notifications.send(Notification::DeleteComplete {
                    kind,
                    asset_id: asset_id.to_string(),
                });
                Ok(())
            }
            Err(e) => {
                let _ = self.notifications.send(Notification::DeleteFailed {
                    kind,
                    asset_id: asset_id.to_string(),
                    message: e.to_string(),
                });
                Err(e)
            }
        }
    }

    /// Build the merged display list for a resource: pending uploads first,
    /// then the server-confirmed assets, concatenated without deduplication.
    pub fn display(
        &self,
        kind: AssetKind,
        rec_resource_id: &str,
        server_assets: &[AssetSummary],
    ) -> Vec<DisplayEntry> {
        let snapshot = self.queue.snapshot();
        snapshot
            .iter()
            .filter(|i| i.kind == kind && i.rec_resource_id == rec_resource_id)
            .cloned()
            .map(DisplayEntry::Pending)
            .chain(server_assets.iter().cloned().map(DisplayEntry::Committed))
            .collect()
    }

    fn set_stage(&self, id: u64, stage: UploadStage) {
        self.queue.update_item(id, |item| {
            if item.stage.can_transition_to(stage) {
                item.stage = stage;
            }
        });
    }

    async fn run_pipeline(&self, item: &PendingItem) -> Result<AssetSummary, UploadError> {
        let id = item.id;
        self.queue.update_item(id, |i| {
            i.stage = UploadStage::RequestingCredentials;
            i.progress = 0;
            i.error = None;
        });

        let grants = self
            .executor
            .request_credentials(item.kind, &item.rec_resource_id, &item.file_name)
            .await?;

        self.set_stage(id, UploadStage::Processing);
        let queue = self.queue.clone();
        let progress: ProgressFn = Arc::new(move |pct, label| {
            queue.update_item(id, |i| {
                i.progress = pct;
                i.stage_label = label.to_string();
            });
        });
        let variants = self
            .executor
            .derive_variants(item.kind, item.source.clone(), progress)
            .await?;

        self.set_stage(id, UploadStage::Uploading);
        let sizes = self
            .executor
            .transfer_variants(item.kind, &grants, &variants)
            .await?;

        self.set_stage(id, UploadStage::Finalizing);
        self.executor
            .finalize(
                item.kind,
                &item.rec_resource_id,
                &grants.asset_id,
                &item.file_name,
                &sizes,
            )
            .await
    }
}
