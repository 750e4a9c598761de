//! In-memory remote record store.
//!
//! [`MemoryBackend`] keeps every container's records in memory, one zone per
//! owning user. [`MemoryBackend::session`] binds it to a user and yields a
//! [`RemoteRecordStore`]. It backs the test suite and the reference server.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use crate::operation::{self, OperationConfiguration, PendingOperation};
use crate::share::SHARE_RECORD_TYPE;
use crate::{
    AcceptanceStatus, ContainerId, Database, DatabaseScope, FetchedRecord, Record, RecordId,
    Reference, RemoteRecordStore, Share, ShareMetadata, StoreError, SystemFields, Timestamp,
    UserId, UserIdentity,
};

type StoreResult<T> = std::result::Result<T, StoreError>;

/// Count of operations dispatched against a backend, by kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OperationStats {
    pub fetches: usize,
    pub saves: usize,
    pub deletes: usize,
    pub accepts: usize,
}

#[derive(Debug, Default)]
struct Zone {
    records: HashMap<RecordId, Record>,
}

impl Zone {
    fn shares(&self) -> impl Iterator<Item = Share> + '_ {
        self.records.values().filter_map(Share::from_record)
    }

    /// Whether `user` has accepted a share covering record `id`.
    fn grants_access(&self, user: &str, id: &str) -> bool {
        self.shares()
            .any(|share| share.has_accepted(user) && (share.id == id || share.root_record_id == id))
    }
}

#[derive(Debug, Default)]
struct ContainerState {
    /// Zones keyed by owning user
    zones: HashMap<UserId, Zone>,
}

impl ContainerState {
    /// Find a record visible to `user` in `database`, with its zone owner.
    fn locate(&self, user: &str, database: &Database, id: &str) -> Option<(UserId, &Record)> {
        match database.scope {
            DatabaseScope::Private => self
                .zones
                .get(user)
                .and_then(|zone| zone.records.get(id))
                .map(|record| (user.to_string(), record)),
            DatabaseScope::Shared => self
                .zones
                .iter()
                .filter(|(owner, _)| owner.as_str() != user)
                .filter(|(owner, _)| {
                    database
                        .zone_owner
                        .as_ref()
                        .map_or(true, |wanted| wanted == *owner)
                })
                .find_map(|(owner, zone)| {
                    let record = zone.records.get(id)?;
                    zone.grants_access(user, id)
                        .then(|| (owner.clone(), record))
                }),
        }
    }

    fn find_share(&self, share_id: &str) -> Option<(UserId, Share)> {
        self.zones.iter().find_map(|(owner, zone)| {
            zone.records
                .get(share_id)
                .and_then(Share::from_record)
                .map(|share| (owner.clone(), share))
        })
    }
}

#[derive(Debug, Default)]
struct BackendState {
    containers: HashMap<ContainerId, ContainerState>,
    stats: OperationStats,
}

impl BackendState {
    fn container(&self, id: &ContainerId) -> StoreResult<&ContainerState> {
        self.containers
            .get(id)
            .ok_or_else(|| StoreError::UnknownContainer(id.clone()))
    }

    fn container_mut(&mut self, id: &ContainerId) -> StoreResult<&mut ContainerState> {
        self.containers
            .get_mut(id)
            .ok_or_else(|| StoreError::UnknownContainer(id.clone()))
    }
}

/// Shared in-memory state of a record store.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    state: Mutex<BackendState>,
    latency: Option<Duration>,
}

impl MemoryBackend {
    /// Create a backend with no containers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`MemoryBackend::add_container`].
    pub fn with_container(self, id: impl Into<ContainerId>) -> Self {
        self.add_container(id);
        self
    }

    /// Defer every operation by `latency` on a spawned task.
    ///
    /// With a latency set, operations must be dispatched from within a Tokio
    /// runtime.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Host a container. Adding an existing container is a no-op.
    pub fn add_container(&self, id: impl Into<ContainerId>) {
        self.state.lock().containers.entry(id.into()).or_default();
    }

    pub fn has_container(&self, id: &str) -> bool {
        self.state.lock().containers.contains_key(id)
    }

    /// A store bound to `user`.
    pub fn session(self: &Arc<Self>, user: impl Into<UserId>) -> MemoryRecordStore {
        MemoryRecordStore {
            backend: Arc::clone(self),
            user: user.into(),
        }
    }

    pub fn stats(&self) -> OperationStats {
        self.state.lock().stats
    }

    /// A record as stored in `owner`'s zone.
    pub fn get_record(&self, container: &str, owner: &str, id: &str) -> Option<Record> {
        self.state
            .lock()
            .containers
            .get(container)?
            .zones
            .get(owner)?
            .records
            .get(id)
            .cloned()
    }

    /// Invitation metadata for a share, as a recipient would receive it.
    pub fn share_metadata(&self, container: &str, share_id: &str) -> Option<ShareMetadata> {
        let state = self.state.lock();
        let (owner, share) = state.containers.get(container)?.find_share(share_id)?;

        Some(ShareMetadata {
            container_id: container.to_string(),
            root_record_id: share.root_record_id.clone(),
            owner_identity: share
                .owner
                .clone()
                .unwrap_or_else(|| UserIdentity::resolved(owner)),
            participant_status: AcceptanceStatus::Pending,
            share,
        })
    }

    fn fetch(
        &self,
        user: &str,
        ids: &[RecordId],
        database: &Database,
    ) -> StoreResult<Vec<FetchedRecord>> {
        let mut state = self.state.lock();
        state.stats.fetches += 1;
        let container = state.container(&database.container)?;

        Ok(ids
            .iter()
            .map(|id| match container.locate(user, database, id) {
                Some((_, record)) => FetchedRecord::found(record.clone()),
                None => FetchedRecord::missing(id.clone()),
            })
            .collect())
    }

    fn save(
        &self,
        user: &str,
        records: Vec<Record>,
        database: &Database,
    ) -> StoreResult<Vec<Record>> {
        let mut state = self.state.lock();
        state.stats.saves += 1;
        let container = state.container_mut(&database.container)?;
        let batch_ids: HashSet<RecordId> = records.iter().map(|r| r.id.clone()).collect();

        // Validate the whole batch before touching anything.
        let mut planned = Vec::with_capacity(records.len());
        let mut shared_roots = HashSet::new();
        for record in records {
            let owner = match database.scope {
                DatabaseScope::Private => user.to_string(),
                DatabaseScope::Shared => match container.locate(user, database, &record.id) {
                    Some((_, _)) if record.record_type == SHARE_RECORD_TYPE => {
                        return Err(StoreError::PermissionDenied(format!(
                            "only the owner can modify share {}",
                            record.id
                        )))
                    }
                    Some((_, stored)) if stored.share != record.share => {
                        return Err(StoreError::PermissionDenied(format!(
                            "only the owner can change the share of record {}",
                            record.id
                        )))
                    }
                    Some((owner, _)) => owner,
                    None => {
                        return Err(StoreError::PermissionDenied(format!(
                            "record {} is not shared with {}",
                            record.id, user
                        )))
                    }
                },
            };

            let stored = container
                .zones
                .get(&owner)
                .and_then(|zone| zone.records.get(&record.id));
            match (stored, record.change_tag()) {
                (Some(stored), Some(tag)) if stored.change_tag() == Some(tag) => {}
                (Some(_), _) => {
                    return Err(StoreError::Conflict {
                        record_id: record.id.clone(),
                    })
                }
                (None, Some(_)) => return Err(StoreError::UnknownItem(record.id.clone())),
                (None, None) => {}
            }

            if record.record_type == SHARE_RECORD_TYPE {
                let share = Share::from_record(&record).ok_or_else(|| {
                    StoreError::InvalidArguments(format!("malformed share record {}", record.id))
                })?;
                let root_known = batch_ids.contains(&share.root_record_id)
                    || container
                        .zones
                        .get(&owner)
                        .is_some_and(|zone| zone.records.contains_key(&share.root_record_id));
                if !root_known {
                    return Err(StoreError::InvalidArguments(format!(
                        "share {} references unknown root {}",
                        share.id, share.root_record_id
                    )));
                }
                let already_shared = container.zones.get(&owner).is_some_and(|zone| {
                    zone.shares().any(|existing| {
                        existing.root_record_id == share.root_record_id && existing.id != share.id
                    })
                });
                if already_shared || !shared_roots.insert(share.root_record_id.clone()) {
                    return Err(StoreError::InvalidArguments(format!(
                        "record {} is already shared",
                        share.root_record_id
                    )));
                }
            }

            planned.push((owner, record));
        }

        // Point roots saved in this batch at their new shares.
        let links: Vec<(RecordId, RecordId)> = planned
            .iter()
            .filter_map(|(_, record)| Share::from_record(record))
            .map(|share| (share.root_record_id, share.id))
            .collect();
        for (root_id, share_id) in &links {
            if let Some((_, root)) = planned.iter_mut().find(|(_, r)| &r.id == root_id) {
                root.share = Some(Reference::new(share_id.clone()));
            }
        }

        let now = now_millis();
        let mut saved = Vec::with_capacity(planned.len());
        for (owner, mut record) in planned {
            let zone = container.zones.entry(owner.clone()).or_default();
            let (created_at, creator) = zone
                .records
                .get(&record.id)
                .and_then(|existing| existing.system_fields.as_ref())
                .map(|fields| (fields.created_at, fields.creator.clone()))
                .unwrap_or_else(|| (now, user.to_string()));

            if let Some(mut share) = Share::from_record(&record) {
                if share.owner.is_none() {
                    share.owner = Some(UserIdentity::resolved(owner.clone()));
                }
                record = share.to_record();
                if let Some(root) = zone.records.get_mut(&share.root_record_id) {
                    root.share = Some(Reference::new(share.id.clone()));
                }
            }

            record.system_fields = Some(SystemFields {
                created_at,
                modified_at: now,
                change_tag: uuid::Uuid::new_v4().to_string(),
                creator,
            });
            zone.records.insert(record.id.clone(), record.clone());
            saved.push(record);
        }

        Ok(saved)
    }

    fn delete(
        &self,
        user: &str,
        ids: &[RecordId],
        database: &Database,
    ) -> StoreResult<Vec<RecordId>> {
        let mut state = self.state.lock();
        state.stats.deletes += 1;
        let container = state.container_mut(&database.container)?;

        match database.scope {
            DatabaseScope::Private => {
                let zone = container.zones.entry(user.to_string()).or_default();
                if let Some(missing) = ids.iter().find(|id| !zone.records.contains_key(*id)) {
                    return Err(StoreError::UnknownItem(missing.clone()));
                }

                for id in ids {
                    let Some(record) = zone.records.remove(id) else {
                        continue;
                    };
                    let shares: Vec<RecordId> = zone
                        .shares()
                        .filter(|share| share.root_record_id == record.id)
                        .map(|share| share.id)
                        .chain(record.share.iter().map(|r| r.record_id.clone()))
                        .collect();
                    for share_id in shares {
                        zone.records.remove(&share_id);
                    }
                    if let Some(share) = Share::from_record(&record) {
                        if let Some(root) = zone.records.get_mut(&share.root_record_id) {
                            root.share = None;
                        }
                    }
                }
            }
            DatabaseScope::Shared => {
                // Guests may only delete shares, which removes them from it.
                let mut leaving = Vec::with_capacity(ids.len());
                for id in ids {
                    let (owner, record) = container
                        .locate(user, database, id)
                        .ok_or_else(|| StoreError::UnknownItem(id.clone()))?;
                    let share = Share::from_record(record).ok_or_else(|| {
                        StoreError::PermissionDenied(format!(
                            "only the owner can delete record {id}"
                        ))
                    })?;
                    leaving.push((owner, share));
                }

                for (owner, mut share) in leaving {
                    share.set_participant_status(user, AcceptanceStatus::Removed);
                    if let Some(record) = container
                        .zones
                        .get_mut(&owner)
                        .and_then(|zone| zone.records.get_mut(&share.id))
                    {
                        rewrite_share(record, &share);
                    }
                }
            }
        }

        Ok(ids.to_vec())
    }

    fn accept(
        &self,
        user: &str,
        metadata: Vec<ShareMetadata>,
        container_id: &ContainerId,
    ) -> StoreResult<Vec<ShareMetadata>> {
        let mut state = self.state.lock();
        state.stats.accepts += 1;
        let container = state.container_mut(container_id)?;

        let mut accepted = Vec::with_capacity(metadata.len());
        for invitation in &metadata {
            let (owner, mut share) = container
                .find_share(&invitation.share.id)
                .ok_or_else(|| StoreError::UnknownItem(invitation.share.id.clone()))?;
            if owner != user {
                share.set_participant_status(user, AcceptanceStatus::Accepted);
            }
            accepted.push((owner, share));
        }

        let mut updated = Vec::with_capacity(accepted.len());
        for (owner, share) in accepted {
            if let Some(record) = container
                .zones
                .get_mut(&owner)
                .and_then(|zone| zone.records.get_mut(&share.id))
            {
                rewrite_share(record, &share);
            }

            updated.push(ShareMetadata {
                container_id: container_id.clone(),
                root_record_id: share.root_record_id.clone(),
                owner_identity: share
                    .owner
                    .clone()
                    .unwrap_or_else(|| UserIdentity::resolved(owner)),
                participant_status: AcceptanceStatus::Accepted,
                share,
            });
        }

        Ok(updated)
    }
}

/// Replace a stored share record's fields, keeping its system fields.
fn rewrite_share(record: &mut Record, share: &Share) {
    let system_fields = record.system_fields.take();
    *record = share.to_record();
    record.system_fields = system_fields;
}

fn now_millis() -> Timestamp {
    chrono::Utc::now().timestamp_millis().max(0) as Timestamp
}

/// A [`MemoryBackend`] seen by one user.
#[derive(Debug, Clone)]
pub struct MemoryRecordStore {
    backend: Arc<MemoryBackend>,
    user: UserId,
}

impl MemoryRecordStore {
    pub fn user(&self) -> &UserId {
        &self.user
    }

    pub fn backend(&self) -> &Arc<MemoryBackend> {
        &self.backend
    }

    fn dispatch<T, F>(&self, operation: &'static str, run: F) -> PendingOperation<T>
    where
        T: Send + 'static,
        F: FnOnce(&MemoryBackend, &str) -> StoreResult<Vec<T>> + Send + 'static,
    {
        let (reporter, pending) = operation::channel();
        let backend = Arc::clone(&self.backend);
        let user = self.user.clone();
        tracing::trace!(operation, user = %user, "Dispatching memory store operation");

        match backend.latency {
            None => reporter.complete(run(&backend, user.as_str())),
            Some(latency) => {
                tokio::spawn(async move {
                    tokio::time::sleep(latency).await;
                    reporter.complete(run(&backend, user.as_str()));
                });
            }
        }

        pending
    }
}

impl RemoteRecordStore for MemoryRecordStore {
    fn fetch_records(
        &self,
        ids: Vec<RecordId>,
        database: &Database,
    ) -> PendingOperation<FetchedRecord> {
        let database = database.clone();
        self.dispatch("fetch", move |backend, user| {
            backend.fetch(user, &ids, &database)
        })
    }

    fn save_records(
        &self,
        records: Vec<Record>,
        database: &Database,
        _configuration: OperationConfiguration,
    ) -> PendingOperation<Record> {
        let database = database.clone();
        self.dispatch("save", move |backend, user| {
            backend.save(user, records, &database)
        })
    }

    fn delete_records(
        &self,
        ids: Vec<RecordId>,
        database: &Database,
        _configuration: OperationConfiguration,
    ) -> PendingOperation<RecordId> {
        let database = database.clone();
        self.dispatch("delete", move |backend, user| {
            backend.delete(user, &ids, &database)
        })
    }

    fn accept_shares(
        &self,
        metadata: Vec<ShareMetadata>,
        container: &ContainerId,
    ) -> PendingOperation<ShareMetadata> {
        let container = container.clone();
        self.dispatch("accept", move |backend, user| {
            backend.accept(user, metadata, &container)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{create_local_space, Space};

    const CONTAINER: &str = "iCloud.test";

    fn backend() -> Arc<MemoryBackend> {
        Arc::new(MemoryBackend::new().with_container(CONTAINER))
    }

    fn private() -> Database {
        Database::private(CONTAINER)
    }

    fn shared() -> Database {
        Database::shared(CONTAINER, None)
    }

    /// Save a space and a share for it as `owner`; returns (root, share).
    fn shared_space(backend: &MemoryBackend, owner: &str, name: &str) -> (Record, Record) {
        let space = create_local_space(name);
        let share = Share::new(&space).to_record();
        let saved = backend
            .save(owner, vec![space.into_record(), share], &private())
            .unwrap();
        (saved[0].clone(), saved[1].clone())
    }

    #[test]
    fn save_stamps_system_fields() {
        let backend = backend();
        let record = create_local_space("Ops").into_record();

        let saved = backend.save("alice", vec![record.clone()], &private()).unwrap();
        let fields = saved[0].system_fields.as_ref().unwrap();

        assert_eq!(saved[0].id, record.id);
        assert_eq!(fields.creator, "alice");
        assert_eq!(fields.created_at, fields.modified_at);
        assert!(!fields.change_tag.is_empty());
    }

    #[test]
    fn stale_save_conflicts() {
        let backend = backend();
        let record = create_local_space("Ops").into_record();
        let first = backend.save("alice", vec![record], &private()).unwrap();

        // Saving the echoed copy succeeds and changes the tag.
        let second = backend
            .save("alice", vec![first[0].clone()], &private())
            .unwrap();
        assert_ne!(first[0].change_tag(), second[0].change_tag());

        // Saving the stale copy again conflicts.
        let stale = backend.save("alice", vec![first[0].clone()], &private());
        assert_eq!(
            stale,
            Err(StoreError::Conflict {
                record_id: first[0].id.clone()
            })
        );
    }

    #[test]
    fn unknown_container_is_rejected() {
        let backend = backend();
        let result = backend.fetch("alice", &["x".into()], &Database::private("iCloud.other"));
        assert_eq!(
            result,
            Err(StoreError::UnknownContainer("iCloud.other".into()))
        );
    }

    #[test]
    fn share_save_links_root_and_owner() {
        let backend = backend();
        let (root, share_record) = shared_space(&backend, "alice", "Ops");

        let share = Share::from_record(&share_record).unwrap();
        assert_eq!(root.share, Some(Reference::new(share.id.clone())));
        assert_eq!(
            share.owner.and_then(|o| o.user_record_id).as_deref(),
            Some("alice")
        );
    }

    #[test]
    fn share_without_root_is_invalid() {
        let backend = backend();
        let space = create_local_space("Ops");
        let share = Share::new(&space).to_record();

        let result = backend.save("alice", vec![share], &private());
        assert!(matches!(result, Err(StoreError::InvalidArguments(_))));
    }

    #[test]
    fn shared_database_requires_acceptance() {
        let backend = backend();
        let (root, share_record) = shared_space(&backend, "alice", "Ops");

        let before = backend.fetch("bob", &[root.id.clone()], &shared()).unwrap();
        assert!(before[0].record.is_none());

        let metadata = backend.share_metadata(CONTAINER, &share_record.id).unwrap();
        assert_eq!(metadata.participant_status, AcceptanceStatus::Pending);
        backend
            .accept("bob", vec![metadata], &CONTAINER.to_string())
            .unwrap();

        let after = backend.fetch("bob", &[root.id.clone()], &shared()).unwrap();
        let space = Space::from_record(after[0].record.clone().unwrap()).unwrap();
        assert_eq!(space.name(), "Ops");

        // Narrowing to another owner hides it again.
        let elsewhere = Database::shared(CONTAINER, Some("carol".into()));
        let hidden = backend.fetch("bob", &[root.id], &elsewhere).unwrap();
        assert!(hidden[0].record.is_none());
    }

    #[test]
    fn accept_resolves_owner() {
        let backend = backend();
        let (_, share_record) = shared_space(&backend, "owner-123", "Ops");
        let metadata = backend.share_metadata(CONTAINER, &share_record.id).unwrap();

        let updated = backend
            .accept("bob", vec![metadata], &CONTAINER.to_string())
            .unwrap();

        assert_eq!(updated[0].owner_id().map(String::as_str), Some("owner-123"));
        assert_eq!(updated[0].participant_status, AcceptanceStatus::Accepted);
        assert!(updated[0].share.has_accepted("bob"));
    }

    #[test]
    fn accept_unknown_share_fails() {
        let backend = backend();
        let (_, share_record) = shared_space(&backend, "alice", "Ops");
        let mut metadata = backend.share_metadata(CONTAINER, &share_record.id).unwrap();
        metadata.share.id = "missing".into();

        let result = backend.accept("bob", vec![metadata], &CONTAINER.to_string());
        assert_eq!(result, Err(StoreError::UnknownItem("missing".into())));
    }

    #[test]
    fn guest_save_of_unshared_record_is_denied() {
        let backend = backend();
        let record = create_local_space("Mine").into_record();

        let result = backend.save("bob", vec![record], &shared());
        assert!(matches!(result, Err(StoreError::PermissionDenied(_))));
    }

    #[test]
    fn guest_cannot_rewrite_share() {
        let backend = backend();
        let (root, share_record) = shared_space(&backend, "alice", "Ops");
        let metadata = backend.share_metadata(CONTAINER, &share_record.id).unwrap();
        backend
            .accept("bob", vec![metadata], &CONTAINER.to_string())
            .unwrap();

        let owned_by_alice = Database::shared(CONTAINER, Some("alice".into()));
        let fetched = backend
            .fetch("bob", &[share_record.id.clone()], &owned_by_alice)
            .unwrap();
        let stored = fetched[0].record.clone().unwrap();
        let mut share = Share::from_record(&stored).unwrap();
        share.set_participant_status("carol", AcceptanceStatus::Accepted);
        let mut forged = share.to_record();
        forged.system_fields = stored.system_fields.clone();

        let result = backend.save("bob", vec![forged], &owned_by_alice);
        assert!(matches!(result, Err(StoreError::PermissionDenied(_))));

        let carol = backend.fetch("carol", &[root.id], &shared()).unwrap();
        assert!(carol[0].record.is_none());
    }

    #[test]
    fn guest_cannot_detach_root_from_share() {
        let backend = backend();
        let (root, share_record) = shared_space(&backend, "alice", "Ops");
        let metadata = backend.share_metadata(CONTAINER, &share_record.id).unwrap();
        backend
            .accept("bob", vec![metadata], &CONTAINER.to_string())
            .unwrap();

        let mut detached = backend
            .fetch("bob", &[root.id.clone()], &shared())
            .unwrap()[0]
            .record
            .clone()
            .unwrap();
        detached.share = None;

        let result = backend.save("bob", vec![detached], &shared());
        assert!(matches!(result, Err(StoreError::PermissionDenied(_))));
        assert_eq!(
            backend.get_record(CONTAINER, "alice", &root.id).unwrap().share,
            Some(Reference::new(share_record.id))
        );
    }

    #[test]
    fn second_share_for_root_is_rejected() {
        let backend = backend();
        let (root, first) = shared_space(&backend, "alice", "Ops");
        let space = Space::from_record(root.clone()).unwrap();
        let second = Share::new(&space);
        let mut relinked = root.clone();
        relinked.share = Some(Reference::new(second.id.clone()));

        let result = backend.save("alice", vec![relinked, second.to_record()], &private());
        assert!(matches!(result, Err(StoreError::InvalidArguments(_))));

        // Two new shares for one root in a single batch are rejected too.
        let fresh = create_local_space("Fresh");
        let batch = vec![
            fresh.record().clone(),
            Share::new(&fresh).to_record(),
            Share::new(&fresh).to_record(),
        ];
        let result = backend.save("alice", batch, &private());
        assert!(matches!(result, Err(StoreError::InvalidArguments(_))));

        assert!(backend.get_record(CONTAINER, "alice", &second.id).is_none());
        assert_eq!(
            backend.get_record(CONTAINER, "alice", &root.id).unwrap().share,
            Some(Reference::new(first.id))
        );
    }

    #[test]
    fn owner_delete_removes_shares_rooted_at_record() {
        let backend = backend();
        let (root, share_record) = shared_space(&backend, "alice", "Ops");

        // Drop the root's reference; the share still names it as root.
        backend
            .state
            .lock()
            .containers
            .get_mut(CONTAINER)
            .unwrap()
            .zones
            .get_mut("alice")
            .unwrap()
            .records
            .get_mut(&root.id)
            .unwrap()
            .share = None;

        backend
            .delete("alice", &[root.id.clone()], &private())
            .unwrap();

        assert!(backend
            .get_record(CONTAINER, "alice", &share_record.id)
            .is_none());
        assert!(backend.share_metadata(CONTAINER, &share_record.id).is_none());
    }

    #[test]
    fn owner_delete_removes_share_too() {
        let backend = backend();
        let (root, share_record) = shared_space(&backend, "alice", "Ops");

        let deleted = backend
            .delete("alice", &[root.id.clone()], &private())
            .unwrap();
        assert_eq!(deleted, vec![root.id.clone()]);
        assert!(backend.get_record(CONTAINER, "alice", &root.id).is_none());
        assert!(backend
            .get_record(CONTAINER, "alice", &share_record.id)
            .is_none());
    }

    #[test]
    fn delete_missing_record_fails() {
        let backend = backend();
        let result = backend.delete("alice", &["nope".into()], &private());
        assert_eq!(result, Err(StoreError::UnknownItem("nope".into())));
    }

    #[test]
    fn guest_delete_of_share_leaves_it() {
        let backend = backend();
        let (root, share_record) = shared_space(&backend, "alice", "Ops");
        let metadata = backend.share_metadata(CONTAINER, &share_record.id).unwrap();
        backend
            .accept("bob", vec![metadata], &CONTAINER.to_string())
            .unwrap();

        // Guests cannot delete the root record.
        let denied = backend.delete("bob", &[root.id.clone()], &shared());
        assert!(matches!(denied, Err(StoreError::PermissionDenied(_))));

        backend
            .delete("bob", &[share_record.id.clone()], &shared())
            .unwrap();

        // The owner still has both records; bob lost access.
        assert!(backend.get_record(CONTAINER, "alice", &root.id).is_some());
        let stored = backend
            .get_record(CONTAINER, "alice", &share_record.id)
            .unwrap();
        let share = Share::from_record(&stored).unwrap();
        assert_eq!(
            share.participant("bob").map(|p| p.status),
            Some(AcceptanceStatus::Removed)
        );
        let after = backend.fetch("bob", &[root.id], &shared()).unwrap();
        assert!(after[0].record.is_none());
    }

    #[tokio::test]
    async fn session_reports_through_pending_operation() {
        let backend = backend();
        let store = backend.session("alice");
        let record = create_local_space("Ops").into_record();

        let saved = store
            .save_records(vec![record.clone()], &private(), OperationConfiguration::default())
            .completion()
            .await
            .unwrap();
        assert_eq!(saved.len(), 1);

        let fetched = store
            .fetch_records(vec![record.id.clone(), "missing".into()], &private())
            .completion()
            .await
            .unwrap();
        assert!(fetched[0].record.is_some());
        assert_eq!(fetched[1], FetchedRecord::missing("missing"));

        assert_eq!(
            backend.stats(),
            OperationStats {
                fetches: 1,
                saves: 1,
                ..Default::default()
            }
        );
    }

    #[tokio::test]
    async fn latency_defers_completion() {
        let backend = Arc::new(
            MemoryBackend::new()
                .with_container(CONTAINER)
                .with_latency(Duration::from_millis(20)),
        );
        let store = backend.session("alice");

        let pending = store.fetch_records(vec!["x".into()], &private());
        assert_eq!(backend.stats().fetches, 0);

        let fetched = pending.completion().await.unwrap();
        assert_eq!(fetched, vec![FetchedRecord::missing("x")]);
        assert_eq!(backend.stats().fetches, 1);
    }
}
