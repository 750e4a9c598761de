//! The remote record store protocol.
//!
//! The sync service only ever talks to the store through this trait. Every
//! method dispatches immediately and hands back a [`PendingOperation`] for
//! the eventual outcome; transport, retries and auth are the implementor's
//! business.

use crate::{
    ContainerId, Database, FetchedRecord, OperationConfiguration, PendingOperation, Record,
    RecordId, ShareMetadata,
};

/// A remote record store with sharing primitives.
pub trait RemoteRecordStore: Send + Sync {
    /// Fetch records by id. Reports one [`FetchedRecord`] per requested id.
    fn fetch_records(
        &self,
        ids: Vec<RecordId>,
        database: &Database,
    ) -> PendingOperation<FetchedRecord>;

    /// Save records atomically. Reports each saved record with fresh system
    /// fields.
    fn save_records(
        &self,
        records: Vec<Record>,
        database: &Database,
        configuration: OperationConfiguration,
    ) -> PendingOperation<Record>;

    /// Delete records by id. Reports each deleted id.
    fn delete_records(
        &self,
        ids: Vec<RecordId>,
        database: &Database,
        configuration: OperationConfiguration,
    ) -> PendingOperation<RecordId>;

    /// Accept share invitations on behalf of the current user, in the
    /// container that hosts them. Reports updated metadata per share.
    fn accept_shares(
        &self,
        metadata: Vec<ShareMetadata>,
        container: &ContainerId,
    ) -> PendingOperation<ShareMetadata>;
}

impl<S: RemoteRecordStore + ?Sized> RemoteRecordStore for std::sync::Arc<S> {
    fn fetch_records(
        &self,
        ids: Vec<RecordId>,
        database: &Database,
    ) -> PendingOperation<FetchedRecord> {
        (**self).fetch_records(ids, database)
    }

    fn save_records(
        &self,
        records: Vec<Record>,
        database: &Database,
        configuration: OperationConfiguration,
    ) -> PendingOperation<Record> {
        (**self).save_records(records, database, configuration)
    }

    fn delete_records(
        &self,
        ids: Vec<RecordId>,
        database: &Database,
        configuration: OperationConfiguration,
    ) -> PendingOperation<RecordId> {
        (**self).delete_records(ids, database, configuration)
    }

    fn accept_shares(
        &self,
        metadata: Vec<ShareMetadata>,
        container: &ContainerId,
    ) -> PendingOperation<ShareMetadata> {
        (**self).accept_shares(metadata, container)
    }
}
