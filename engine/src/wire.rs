//! JSON bodies exchanged between the HTTP record store client and server.

use crate::{FetchedRecord, QualityOfService, Record, RecordId, ShareMetadata, StoreError, UserId};
use serde::{Deserialize, Serialize};

/// Body of `POST .../records/fetch`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchRecordsRequest {
    pub ids: Vec<RecordId>,
    /// Restricts a shared-database fetch to one owner's records
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zone_owner: Option<UserId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchRecordsResponse {
    pub records: Vec<FetchedRecord>,
}

/// Body of `POST .../records/save`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveRecordsRequest {
    pub records: Vec<Record>,
    #[serde(default)]
    pub quality_of_service: QualityOfService,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zone_owner: Option<UserId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveRecordsResponse {
    pub records: Vec<Record>,
}

/// Body of `POST .../records/delete`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteRecordsRequest {
    pub ids: Vec<RecordId>,
    #[serde(default)]
    pub quality_of_service: QualityOfService,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zone_owner: Option<UserId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteRecordsResponse {
    pub deleted: Vec<RecordId>,
}

/// Body of `POST /containers/{container}/shares/accept`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AcceptSharesRequest {
    pub metadata: Vec<ShareMetadata>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AcceptSharesResponse {
    pub metadata: Vec<ShareMetadata>,
}

/// Body of every non-2xx response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    /// Human-readable description
    pub message: String,
    /// The store error, passed back to the client unchanged
    pub error: StoreError,
}

impl From<StoreError> for ErrorBody {
    fn from(error: StoreError) -> Self {
        Self {
            message: error.to_string(),
            error,
        }
    }
}
