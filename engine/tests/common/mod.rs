//! Shared helpers for integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use spacesync_engine::operation::{self, OperationReporter};
use spacesync_engine::{
    AcceptanceStatus, ContainerId, Database, FetchedRecord, OperationConfiguration,
    PendingOperation, QualityOfService, Record, RecordId, RemoteRecordStore, Share,
    ShareMetadata, Space, StoreError, UserIdentity,
};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

pub const CONTAINER: &str = "iCloud.spacesync.test";

/// A remote call as seen by the scripted store.
#[derive(Debug, Clone, PartialEq)]
pub enum Dispatch {
    Fetch {
        ids: Vec<RecordId>,
        database: Database,
    },
    Save {
        records: Vec<Record>,
        database: Database,
        quality_of_service: QualityOfService,
    },
    Delete {
        ids: Vec<RecordId>,
        database: Database,
        quality_of_service: QualityOfService,
    },
    Accept {
        share_ids: Vec<RecordId>,
        container: ContainerId,
    },
}

/// A store that records every dispatch and answers from a script.
///
/// By default fetches miss, saves echo the records back with system fields,
/// deletes succeed and accepts fail with `Interrupted`.
#[derive(Default)]
pub struct ScriptedStore {
    dispatches: Mutex<Vec<Dispatch>>,
    fetch_result: Mutex<Option<Result<Vec<FetchedRecord>, StoreError>>>,
    save_result: Mutex<Option<Result<Vec<Record>, StoreError>>>,
    delete_error: Mutex<Option<StoreError>>,
    accept_result: Mutex<Option<Result<Vec<ShareMetadata>, StoreError>>>,
    hold_accepts: Mutex<bool>,
    held_accepts: Mutex<Vec<OperationReporter<ShareMetadata>>>,
}

impl ScriptedStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn dispatches(&self) -> Vec<Dispatch> {
        self.dispatches.lock().clone()
    }

    pub fn dispatch_count(&self) -> usize {
        self.dispatches.lock().len()
    }

    pub fn accept_count(&self) -> usize {
        self.dispatches
            .lock()
            .iter()
            .filter(|d| matches!(d, Dispatch::Accept { .. }))
            .count()
    }

    pub fn respond_to_fetch(&self, result: Result<Vec<FetchedRecord>, StoreError>) {
        *self.fetch_result.lock() = Some(result);
    }

    pub fn respond_to_save(&self, result: Result<Vec<Record>, StoreError>) {
        *self.save_result.lock() = Some(result);
    }

    pub fn fail_deletes(&self, error: StoreError) {
        *self.delete_error.lock() = Some(error);
    }

    pub fn respond_to_accept(&self, result: Result<Vec<ShareMetadata>, StoreError>) {
        *self.accept_result.lock() = Some(result);
    }

    /// Keep accepts in flight until [`ScriptedStore::release_accepts`].
    pub fn hold_accepts(&self) {
        *self.hold_accepts.lock() = true;
    }

    /// Complete every held accept with the scripted result.
    pub fn release_accepts(&self) {
        let held: Vec<_> = self.held_accepts.lock().drain(..).collect();
        for reporter in held {
            reporter.complete(self.accept_outcome());
        }
    }

    fn accept_outcome(&self) -> Result<Vec<ShareMetadata>, StoreError> {
        self.accept_result
            .lock()
            .clone()
            .unwrap_or(Err(StoreError::Interrupted))
    }

    fn record(&self, dispatch: Dispatch) {
        self.dispatches.lock().push(dispatch);
    }
}

impl RemoteRecordStore for ScriptedStore {
    fn fetch_records(
        &self,
        ids: Vec<RecordId>,
        database: &Database,
    ) -> PendingOperation<FetchedRecord> {
        self.record(Dispatch::Fetch {
            ids: ids.clone(),
            database: database.clone(),
        });

        let result = self
            .fetch_result
            .lock()
            .clone()
            .unwrap_or_else(|| Ok(ids.into_iter().map(FetchedRecord::missing).collect()));
        let (reporter, pending) = operation::channel();
        reporter.complete(result);
        pending
    }

    fn save_records(
        &self,
        records: Vec<Record>,
        database: &Database,
        configuration: OperationConfiguration,
    ) -> PendingOperation<Record> {
        self.record(Dispatch::Save {
            records: records.clone(),
            database: database.clone(),
            quality_of_service: configuration.quality_of_service,
        });

        let result = self
            .save_result
            .lock()
            .clone()
            .unwrap_or_else(|| Ok(records.into_iter().map(stamped).collect()));
        let (reporter, pending) = operation::channel();
        reporter.complete(result);
        pending
    }

    fn delete_records(
        &self,
        ids: Vec<RecordId>,
        database: &Database,
        configuration: OperationConfiguration,
    ) -> PendingOperation<RecordId> {
        self.record(Dispatch::Delete {
            ids: ids.clone(),
            database: database.clone(),
            quality_of_service: configuration.quality_of_service,
        });

        match self.delete_error.lock().clone() {
            Some(error) => PendingOperation::failed(error),
            None => PendingOperation::ready(ids),
        }
    }

    fn accept_shares(
        &self,
        metadata: Vec<ShareMetadata>,
        container: &ContainerId,
    ) -> PendingOperation<ShareMetadata> {
        self.record(Dispatch::Accept {
            share_ids: metadata.iter().map(|m| m.share.id.clone()).collect(),
            container: container.clone(),
        });

        let (reporter, pending) = operation::channel();
        if *self.hold_accepts.lock() {
            self.held_accepts.lock().push(reporter);
        } else {
            reporter.complete(self.accept_outcome());
        }
        pending
    }
}

/// A copy of `record` as the store would echo it after a save.
pub fn stamped(mut record: Record) -> Record {
    record.system_fields = Some(spacesync_engine::SystemFields {
        created_at: 1_706_745_600_000,
        modified_at: 1_706_745_600_000,
        change_tag: "tag-1".into(),
        creator: "owner-123".into(),
    });
    record
}

/// A saved Space, optionally carrying a share reference.
pub fn saved_space(name: &str, share_id: Option<&str>) -> Space {
    let mut record = spacesync_engine::create_local_space(name).into_record();
    record.share = share_id.map(spacesync_engine::Reference::new);
    Space::from_record(stamped(record)).unwrap()
}

/// Invitation metadata for a share hosted in `container`.
pub fn invitation(container: &str, owner: Option<&str>) -> ShareMetadata {
    let space = saved_space("Release Train", None);
    let share = Share::new(&space);
    ShareMetadata {
        container_id: container.to_string(),
        root_record_id: space.id().clone(),
        share,
        owner_identity: match owner {
            Some(owner) => UserIdentity::resolved(owner),
            None => UserIdentity::unresolved(),
        },
        participant_status: AcceptanceStatus::Pending,
    }
}

/// Layer counting ERROR-level events.
struct ErrorCounter(Arc<AtomicUsize>);

impl<S: tracing::Subscriber> Layer<S> for ErrorCounter {
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        if *event.metadata().level() == tracing::Level::ERROR {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }
}

/// Count error events emitted on this thread while the guard is held.
pub fn capture_errors() -> (tracing::subscriber::DefaultGuard, Arc<AtomicUsize>) {
    let count = Arc::new(AtomicUsize::new(0));
    let subscriber = tracing_subscriber::registry().with(ErrorCounter(Arc::clone(&count)));
    (tracing::subscriber::set_default(subscriber), count)
}
