//! HTTP request handlers.

pub mod assets;
pub mod documents;
pub mod health;
pub mod images;

pub use documents::{delete_document, finalize_document, list_documents, presign_document};
pub use health::health_check;
pub use images::{delete_image, finalize_image, list_images, presign_image};
