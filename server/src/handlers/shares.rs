//! Share handlers - invitation metadata and acceptance.

use std::sync::Arc;

use spacesync_engine::wire::{AcceptSharesRequest, AcceptSharesResponse};
use spacesync_engine::{
    ContainerId, MemoryBackend, RecordId, RemoteRecordStore, ShareMetadata, StoreError,
};

use crate::auth::AuthUser;
use crate::error::Result;

/// Look up the invitation metadata of a share.
pub fn handle_share_metadata(
    backend: &MemoryBackend,
    container: &ContainerId,
    share_id: &RecordId,
) -> Result<ShareMetadata> {
    if !backend.has_container(container) {
        return Err(StoreError::UnknownContainer(container.clone()).into());
    }

    backend
        .share_metadata(container, share_id)
        .ok_or_else(|| StoreError::UnknownItem(share_id.clone()).into())
}

/// Accept share invitations on behalf of the caller.
pub async fn handle_accept(
    backend: &Arc<MemoryBackend>,
    user: &AuthUser,
    container: ContainerId,
    request: AcceptSharesRequest,
) -> Result<AcceptSharesResponse> {
    tracing::debug!(
        user = %user.user_id,
        container = %container,
        count = request.metadata.len(),
        "Accepting shares"
    );

    let metadata = backend
        .session(user.user_id.clone())
        .accept_shares(request.metadata, &container)
        .completion()
        .await?;

    for accepted in &metadata {
        tracing::info!(
            user = %user.user_id,
            share_id = %accepted.share.id,
            owner = ?accepted.owner_id(),
            "Share accepted"
        );
    }

    Ok(AcceptSharesResponse { metadata })
}
