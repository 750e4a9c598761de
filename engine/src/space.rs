//! The Space domain entity.

use crate::{error::Result, Error, Record, RecordId, Reference};

/// Record type used for Space records.
pub const SPACE_RECORD_TYPE: &str = "Space";

const NAME_KEY: &str = "name";

/// A named workspace, backed by a remote record.
///
/// Spaces are values: the sync service never edits one in place, it replaces
/// it with whatever the store hands back.
#[derive(Debug, Clone, PartialEq)]
pub struct Space {
    name: String,
    record: Record,
}

/// Create a Space locally. It has no remote identity until saved.
///
/// No constraint is placed on `name`; see [`Space::is_valid_name`] for the
/// check a user-facing form is expected to apply first.
pub fn create_local_space(name: impl Into<String>) -> Space {
    Space::new(name)
}

impl Space {
    /// Create a Space locally with a fresh record id.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let record = Record::new(SPACE_RECORD_TYPE).with_field(NAME_KEY, name.clone());
        Self { name, record }
    }

    /// Wrap a record fetched from or echoed by the store.
    pub fn from_record(record: Record) -> Result<Self> {
        if record.record_type != SPACE_RECORD_TYPE {
            return Err(Error::UnexpectedRecord {
                record_id: record.id,
                record_type: SPACE_RECORD_TYPE.to_string(),
            });
        }

        let name = match record.get_str(NAME_KEY) {
            Some(name) => name.to_string(),
            None => {
                return Err(Error::UnexpectedRecord {
                    record_id: record.id,
                    record_type: SPACE_RECORD_TYPE.to_string(),
                })
            }
        };

        Ok(Self { name, record })
    }

    /// Whether a user-entered name may be used to create a Space.
    pub fn is_valid_name(name: &str) -> bool {
        !name.trim().is_empty()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn id(&self) -> &RecordId {
        &self.record.id
    }

    /// The underlying remote record.
    pub fn record(&self) -> &Record {
        &self.record
    }

    pub fn into_record(self) -> Record {
        self.record
    }

    /// The share this Space is the root of, if any.
    pub fn share_reference(&self) -> Option<&Reference> {
        self.record.share.as_ref()
    }

    /// Whether the store has saved this Space.
    pub fn has_remote_identity(&self) -> bool {
        self.record.has_remote_identity()
    }

    /// A copy of this Space under a new name, keeping its record identity.
    pub fn renamed(&self, name: impl Into<String>) -> Self {
        let name = name.into();
        let mut record = self.record.clone();
        record.set(NAME_KEY, name.clone());
        Self { name, record }
    }
}
