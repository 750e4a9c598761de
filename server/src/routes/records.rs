//! Record endpoint routes.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    routing::post,
    Json, Router,
};
use spacesync_engine::wire::{
    DeleteRecordsRequest, DeleteRecordsResponse, FetchRecordsRequest, FetchRecordsResponse,
    SaveRecordsRequest, SaveRecordsResponse,
};

use crate::auth::AuthUser;
use crate::error::Result;
use crate::handlers::{handle_delete, handle_fetch, handle_save, resolve_database};
use crate::AppState;

/// Create record routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/containers/{container}/databases/{scope}/records/fetch",
            post(fetch_handler),
        )
        .route(
            "/containers/{container}/databases/{scope}/records/save",
            post(save_handler),
        )
        .route(
            "/containers/{container}/databases/{scope}/records/delete",
            post(delete_handler),
        )
}

/// POST .../records/fetch - Fetch records by id.
async fn fetch_handler(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((container, scope)): Path<(String, String)>,
    payload: std::result::Result<Json<FetchRecordsRequest>, JsonRejection>,
) -> Result<Json<FetchRecordsResponse>> {
    let Json(request) = payload?;
    let database = resolve_database(container, &scope, request.zone_owner.clone())?;
    let response = handle_fetch(&state.backend, &auth, database, request).await?;
    Ok(Json(response))
}

/// POST .../records/save - Save a batch of records.
async fn save_handler(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((container, scope)): Path<(String, String)>,
    payload: std::result::Result<Json<SaveRecordsRequest>, JsonRejection>,
) -> Result<Json<SaveRecordsResponse>> {
    let Json(request) = payload?;
    let database = resolve_database(container, &scope, request.zone_owner.clone())?;
    let response = handle_save(&state.backend, &auth, database, request).await?;
    Ok(Json(response))
}

/// POST .../records/delete - Delete records by id.
async fn delete_handler(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((container, scope)): Path<(String, String)>,
    payload: std::result::Result<Json<DeleteRecordsRequest>, JsonRejection>,
) -> Result<Json<DeleteRecordsResponse>> {
    let Json(request) = payload?;
    let database = resolve_database(container, &scope, request.zone_owner.clone())?;
    let response = handle_delete(&state.backend, &auth, database, request).await?;
    Ok(Json(response))
}
