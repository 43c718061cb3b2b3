//! HTTP server for basecamp asset management.
//!
//! Exposes presign, finalize, list and delete endpoints for resource assets.
//! Uploads themselves go straight from clients to object storage with
//! presigned credentials; the server only issues credentials and commits
//! metadata afterwards.

pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;

pub use error::{ApiError, ApiResult, ErrorResponse};
pub use routes::create_router;
pub use state::AppState;
