//! Record handlers - fetch, save and delete records in one database.

use std::sync::Arc;

use spacesync_engine::wire::{
    DeleteRecordsRequest, DeleteRecordsResponse, FetchRecordsRequest, FetchRecordsResponse,
    SaveRecordsRequest, SaveRecordsResponse,
};
use spacesync_engine::{
    ContainerId, Database, MemoryBackend, OperationConfiguration, RemoteRecordStore, UserId,
};

use crate::auth::AuthUser;
use crate::error::{AppError, Result};

/// Resolve the database named by a request path.
pub fn resolve_database(
    container: ContainerId,
    scope: &str,
    zone_owner: Option<UserId>,
) -> Result<Database> {
    match scope {
        "private" => Ok(Database::private(container)),
        "shared" => Ok(Database::shared(container, zone_owner)),
        other => Err(AppError::BadRequest(format!(
            "Unknown database scope: {other}"
        ))),
    }
}

/// Process a fetch request.
pub async fn handle_fetch(
    backend: &Arc<MemoryBackend>,
    user: &AuthUser,
    database: Database,
    request: FetchRecordsRequest,
) -> Result<FetchRecordsResponse> {
    tracing::debug!(
        user = %user.user_id,
        ?database,
        count = request.ids.len(),
        "Fetching records"
    );

    let records = backend
        .session(user.user_id.clone())
        .fetch_records(request.ids, &database)
        .completion()
        .await?;

    Ok(FetchRecordsResponse { records })
}

/// Process a save request. The batch is applied atomically.
pub async fn handle_save(
    backend: &Arc<MemoryBackend>,
    user: &AuthUser,
    database: Database,
    request: SaveRecordsRequest,
) -> Result<SaveRecordsResponse> {
    tracing::debug!(
        user = %user.user_id,
        ?database,
        count = request.records.len(),
        qos = ?request.quality_of_service,
        "Saving records"
    );

    let configuration =
        OperationConfiguration::with_quality_of_service(request.quality_of_service);
    let records = backend
        .session(user.user_id.clone())
        .save_records(request.records, &database, configuration)
        .completion()
        .await?;

    tracing::info!(user = %user.user_id, saved = records.len(), "Records saved");

    Ok(SaveRecordsResponse { records })
}

/// Process a delete request.
pub async fn handle_delete(
    backend: &Arc<MemoryBackend>,
    user: &AuthUser,
    database: Database,
    request: DeleteRecordsRequest,
) -> Result<DeleteRecordsResponse> {
    tracing::debug!(
        user = %user.user_id,
        ?database,
        ids = ?request.ids,
        "Deleting records"
    );

    let configuration =
        OperationConfiguration::with_quality_of_service(request.quality_of_service);
    let deleted = backend
        .session(user.user_id.clone())
        .delete_records(request.ids, &database, configuration)
        .completion()
        .await?;

    Ok(DeleteRecordsResponse { deleted })
}
