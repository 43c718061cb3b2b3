//! Client-side upload pipeline for basecamp.
//!
//! Uploads go straight from the client to object storage: the server only
//! issues presigned credentials and commits metadata once every rendition
//! has been transferred. This crate derives image renditions locally,
//! performs the transfers, and tracks in-flight uploads so they can be
//! displayed alongside committed assets.

pub mod api;
pub mod coordinator;
pub mod error;
pub mod executor;
pub mod pending;
pub mod processor;
pub mod transfer;

pub use api::{AssetApi, AssetSummary, HttpAssetApi, PresignGrant, PresignedUpload};
pub use coordinator::{DisplayEntry, Notification, UploadCoordinator};
pub use error::UploadError;
pub use executor::UploadExecutor;
pub use pending::{PendingItem, PendingQueue, UploadStage};
pub use processor::{
    DocumentProcessor, ImageProcessor, ProcessedVariant, ProgressFn, VariantProcessor,
};
pub use transfer::{HttpTransfer, VariantTransfer};
