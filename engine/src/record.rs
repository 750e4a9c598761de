//! Record types exchanged with the remote record store.

use crate::{RecordId, Timestamp, UserId};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A reference from one record to another.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reference {
    /// The referenced record
    pub record_id: RecordId,
}

impl Reference {
    /// Create a reference to a record.
    pub fn new(record_id: impl Into<RecordId>) -> Self {
        Self {
            record_id: record_id.into(),
        }
    }
}

/// Fields stamped by the store on every successful save.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemFields {
    /// When the record was first saved (milliseconds since epoch)
    pub created_at: Timestamp,
    /// When the record was last saved (milliseconds since epoch)
    pub modified_at: Timestamp,
    /// Opaque tag that changes on every save
    pub change_tag: String,
    /// User whose save created the record
    pub creator: UserId,
}

/// A record as stored remotely.
///
/// The id is assigned client-side when the record is created. The record only
/// gains a remote identity (its [`SystemFields`]) once the store has saved it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    /// Unique identifier for this record
    pub id: RecordId,
    /// Kind of record ("Space", "share", ...)
    pub record_type: String,
    /// User-visible fields
    #[serde(default)]
    pub fields: Map<String, Value>,
    /// Share this record is the root of, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub share: Option<Reference>,
    /// Store-assigned metadata, absent until the first save
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_fields: Option<SystemFields>,
}

impl Record {
    /// Create a new unsaved record with a fresh id.
    pub fn new(record_type: impl Into<String>) -> Self {
        Self::with_id(uuid::Uuid::new_v4().to_string(), record_type)
    }

    /// Create a new unsaved record with a given id.
    pub fn with_id(id: impl Into<RecordId>, record_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            record_type: record_type.into(),
            fields: Map::new(),
            share: None,
            system_fields: None,
        }
    }

    /// Get a field value.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Get a string field.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    /// Set a field value.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(key.into(), value.into());
    }

    /// Builder form of [`Record::set`].
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(key, value);
        self
    }

    /// Whether the store has saved this record at least once.
    pub fn has_remote_identity(&self) -> bool {
        self.system_fields.is_some()
    }

    /// Change tag of the last save seen by this copy.
    pub fn change_tag(&self) -> Option<&str> {
        self.system_fields.as_ref().map(|s| s.change_tag.as_str())
    }
}

/// Per-record outcome of a fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchedRecord {
    /// The requested id
    pub id: RecordId,
    /// The record, or `None` if the store has nothing under that id
    pub record: Option<Record>,
}

impl FetchedRecord {
    /// A fetch hit.
    pub fn found(record: Record) -> Self {
        Self {
            id: record.id.clone(),
            record: Some(record),
        }
    }

    /// A fetch miss.
    pub fn missing(id: impl Into<RecordId>) -> Self {
        Self {
            id: id.into(),
            record: None,
        }
    }
}
