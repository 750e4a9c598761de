//! Error types for the SpaceSync engine.

use crate::{ContainerId, RecordId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors reported by a remote record store.
///
/// These are opaque to the sync service: they travel back to the caller
/// unchanged, including across the HTTP transport.
#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "camelCase")]
pub enum StoreError {
    #[error("server record changed: {record_id}")]
    #[serde(rename_all = "camelCase")]
    Conflict { record_id: RecordId },

    #[error("unknown item: {0}")]
    UnknownItem(RecordId),

    #[error("unknown container: {0}")]
    UnknownContainer(ContainerId),

    #[error("permission denied: {0}")]
    PermissionDenied(String),

    #[error("invalid arguments: {0}")]
    InvalidArguments(String),

    #[error("quota exceeded")]
    QuotaExceeded,

    #[error("network failure: {0}")]
    Network(String),

    #[error("operation ended without reporting completion")]
    Interrupted,
}

/// All possible errors from the SpaceSync engine.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    // Domain errors
    #[error("no space available for record: {0}")]
    NoSpaceAvailable(RecordId),

    #[error("no share found: {0}")]
    NoShareFound(RecordId),

    #[error("record {record_id} is not a valid {record_type}")]
    UnexpectedRecord {
        record_id: RecordId,
        record_type: String,
    },

    #[error("{0} completed without returning a record")]
    EmptyResponse(&'static str),

    // Remote errors
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, Error>;
