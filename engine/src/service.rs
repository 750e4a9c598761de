//! The Space sync service.
//!
//! Every operation turns one domain intent into one or more calls on the
//! [`RemoteRecordStore`], targeting the database selected by the container's
//! current mode, and maps the records that come back into domain values.

use std::future::Future;
use std::sync::Arc;

use futures::future::{FutureExt, Shared};
use futures::StreamExt;

use crate::{
    error::Result, CloudContainer, ContainerMode, Error, OperationConfiguration, QualityOfService,
    RecordId, RemoteRecordStore, Share, ShareMetadata, Space, SubscriptionRegistry,
};

/// Background priority used for writes unless overridden.
pub const DEFAULT_WRITE_QOS: QualityOfService = QualityOfService::Utility;

type AcceptFuture = futures::future::BoxFuture<'static, Result<ShareMetadata>>;

/// Create, fetch, share, join and delete a Space against a remote store.
pub struct SpaceService {
    container: Arc<CloudContainer>,
    store: Arc<dyn RemoteRecordStore>,
    subscriptions: Arc<SubscriptionRegistry>,
    write_configuration: OperationConfiguration,
}

impl SpaceService {
    /// Create a service with its own subscription registry.
    pub fn new(container: Arc<CloudContainer>, store: Arc<dyn RemoteRecordStore>) -> Self {
        Self::with_registry(container, store, SubscriptionRegistry::new_shared())
    }

    /// Create a service that registers background work in a shared registry.
    pub fn with_registry(
        container: Arc<CloudContainer>,
        store: Arc<dyn RemoteRecordStore>,
        subscriptions: Arc<SubscriptionRegistry>,
    ) -> Self {
        Self {
            container,
            store,
            subscriptions,
            write_configuration: OperationConfiguration::with_quality_of_service(
                DEFAULT_WRITE_QOS,
            ),
        }
    }

    /// Override the priority class used for saves and deletes.
    pub fn with_quality_of_service(mut self, quality_of_service: QualityOfService) -> Self {
        self.write_configuration = OperationConfiguration::with_quality_of_service(quality_of_service);
        self
    }

    pub fn container(&self) -> &Arc<CloudContainer> {
        &self.container
    }

    pub fn subscriptions(&self) -> &Arc<SubscriptionRegistry> {
        &self.subscriptions
    }

    /// Fetch a Space from the shared database.
    pub async fn fetch_shared(&self, id: &RecordId) -> Result<Space> {
        let database = self.container.shared_database();
        tracing::debug!(record_id = %id, ?database, "Fetching shared space");

        let mut outcomes = self
            .store
            .fetch_records(vec![id.clone()], &database)
            .per_item();

        match outcomes.next().await {
            Some(Ok(fetched)) => match fetched.record {
                Some(record) => Space::from_record(record),
                None => Err(Error::NoSpaceAvailable(fetched.id)),
            },
            Some(Err(error)) => Err(error.into()),
            None => Err(Error::NoSpaceAvailable(id.clone())),
        }
    }

    /// Save a Space to the current database and return the stored version.
    pub async fn save(&self, space: &Space) -> Result<Space> {
        let database = self.container.current_database();
        tracing::debug!(record_id = %space.id(), ?database, "Saving space");

        let mut saved = self
            .store
            .save_records(
                vec![space.record().clone()],
                &database,
                self.write_configuration,
            )
            .per_item();

        match saved.next().await {
            Some(Ok(record)) => Space::from_record(record),
            Some(Err(error)) => Err(error.into()),
            None => Err(Error::EmptyResponse("save")),
        }
    }

    /// Fetch the share a Space is the root of.
    ///
    /// # Panics
    ///
    /// Panics if the Space carries no share reference. Callers must check
    /// [`Space::share_reference`] first.
    pub async fn get_share(&self, space: &Space) -> Result<Share> {
        let share_id = match space.share_reference() {
            Some(reference) => reference.record_id.clone(),
            None => panic!(
                "get_share called for space {} which has no share reference",
                space.id()
            ),
        };

        let database = self.container.current_database();
        let fetched = self
            .store
            .fetch_records(vec![share_id.clone()], &database)
            .completion()
            .await?;

        fetched
            .into_iter()
            .filter(|outcome| outcome.id == share_id)
            .find_map(|outcome| outcome.record)
            .and_then(|record| Share::from_record(&record))
            .ok_or(Error::NoShareFound(share_id))
    }

    /// Share a Space: save its record together with a new share in one
    /// atomic write, and return the share once the write has completed.
    pub async fn save_and_share(&self, space: &Space) -> Result<Share> {
        let share = Share::new(space);

        let mut root = space.record().clone();
        root.share = Some(crate::Reference::new(share.id.clone()));

        let database = self.container.current_database();
        tracing::debug!(
            record_id = %space.id(),
            share_id = %share.id,
            ?database,
            "Saving space with new share"
        );

        self.store
            .save_records(vec![root, share.to_record()], &database, self.write_configuration)
            .completion()
            .await?;

        Ok(share)
    }

    /// Delete a Space.
    ///
    /// Owners delete the Space's record. Guests cannot delete the owner's
    /// record; they leave the collaboration by deleting the share instead.
    pub async fn delete(&self, space: &Space) -> Result<()> {
        let target = self.deletion_target(space)?;
        let database = self.container.current_database();
        tracing::debug!(record_id = %target, ?database, "Deleting space");

        self.store
            .delete_records(vec![target], &database, self.write_configuration)
            .completion()
            .await?;

        Ok(())
    }

    /// The record a delete of `space` removes under the current mode.
    pub fn deletion_target(&self, space: &Space) -> Result<RecordId> {
        match self.container.mode() {
            ContainerMode::Owner => Ok(space.id().clone()),
            ContainerMode::Shared { .. } => match space.share_reference() {
                Some(reference) => Ok(reference.record_id.clone()),
                None => {
                    tracing::error!(
                        record_id = %space.id(),
                        "Shared space has no share reference, cannot leave it"
                    );
                    Err(Error::NoShareFound(space.id().clone()))
                }
            },
        }
    }

    /// Accept a share invitation.
    ///
    /// The accept is dispatched immediately to the container named by the
    /// metadata. The returned future yields the updated metadata; a second,
    /// registered observer of the same outcome switches the container into
    /// shared mode once the accept succeeds. That switch happens whether or
    /// not the returned future is polled.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn accept_share(
        &self,
        metadata: ShareMetadata,
    ) -> impl Future<Output = Result<ShareMetadata>> + Send + 'static {
        let remote_container = metadata.container_id.clone();
        tracing::debug!(
            container = %remote_container,
            share_id = %metadata.share.id,
            "Accepting share"
        );

        let accepted = self
            .store
            .accept_shares(vec![metadata], &remote_container)
            .per_item();

        let outcome: Shared<AcceptFuture> = async move {
            let mut accepted = accepted;
            match accepted.next().await {
                Some(Ok(updated)) => Ok(updated),
                Some(Err(error)) => Err(Error::from(error)),
                None => Err(Error::EmptyResponse("accept share")),
            }
        }
        .boxed()
        .shared();

        let container = Arc::clone(&self.container);
        let observed = outcome.clone();
        self.subscriptions.spawn("accept-share mode switch", async move {
            match observed.await {
                Ok(updated) => match updated.owner_id() {
                    Some(owner) => container.enter_shared(owner.clone()),
                    None => tracing::error!(
                        share_id = %updated.share.id,
                        "Accepted share has no owner identity"
                    ),
                },
                Err(error) => {
                    tracing::debug!(%error, "Share accept failed, mode unchanged");
                }
            }
        });

        outcome
    }
}

impl std::fmt::Debug for SpaceService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpaceService")
            .field("container", &self.container)
            .field("subscriptions", &self.subscriptions.len())
            .field("write_configuration", &self.write_configuration)
            .finish()
    }
}
