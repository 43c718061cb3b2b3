//! Upload pipeline errors.

/// Errors surfaced by the upload pipeline.
///
/// The variants mirror the pipeline phases so callers can tell a local
/// processing failure apart from a network transfer failure or a server-side
/// commit failure.
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    /// Credential issuance failed.
    #[error("failed to obtain upload credentials: {0}")]
    Signing(String),

    /// Local rendition derivation failed.
    #[error("failed to process source file: {0}")]
    Processing(String),

    /// Transferring bytes to storage failed.
    #[error("failed to upload: {0}")]
    Transfer(String),

    /// The server rejected or failed the commit.
    #[error("failed to finalize upload: {0}")]
    Commit(String),

    /// Deleting a committed asset failed.
    #[error("failed to delete asset: {0}")]
    Delete(String),

    /// The server returned a structured error.
    #[error("server error ({code}): {message}")]
    Api { code: String, message: String },

    /// An operation was attempted in a state that does not allow it.
    #[error("invalid upload state: {0}")]
    State(String),
}
