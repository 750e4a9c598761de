//! Share endpoint routes.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    routing::{get, post},
    Json, Router,
};
use spacesync_engine::wire::{AcceptSharesRequest, AcceptSharesResponse};
use spacesync_engine::ShareMetadata;

use crate::auth::AuthUser;
use crate::error::Result;
use crate::handlers::{handle_accept, handle_share_metadata};
use crate::AppState;

/// Create share routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/containers/{container}/shares/accept", post(accept_handler))
        .route(
            "/containers/{container}/shares/{share_id}/metadata",
            get(metadata_handler),
        )
}

/// POST /containers/{container}/shares/accept - Accept invitations.
async fn accept_handler(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(container): Path<String>,
    payload: std::result::Result<Json<AcceptSharesRequest>, JsonRejection>,
) -> Result<Json<AcceptSharesResponse>> {
    let Json(request) = payload?;
    let response = handle_accept(&state.backend, &auth, container, request).await?;
    Ok(Json(response))
}

/// GET /containers/{container}/shares/{share_id}/metadata - Open an invitation.
async fn metadata_handler(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path((container, share_id)): Path<(String, String)>,
) -> Result<Json<ShareMetadata>> {
    let metadata = handle_share_metadata(&state.backend, &container, &share_id)?;
    Ok(Json(metadata))
}
