//! Shares: collaboration grants rooted at a Space's record.

use crate::{ContainerId, Record, RecordId, Space, UserId};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Record type used for share records.
pub const SHARE_RECORD_TYPE: &str = "share";

const TITLE_KEY: &str = "title";
const ROOT_RECORD_KEY: &str = "rootRecord";
const OWNER_KEY: &str = "owner";
const PARTICIPANTS_KEY: &str = "participants";

/// Identity of a user as known to the store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserIdentity {
    /// Record name of the user, when the store could resolve it
    pub user_record_id: Option<UserId>,
    /// Human-readable name, if known
    pub display_name: Option<String>,
}

impl UserIdentity {
    /// An identity resolved to a user id.
    pub fn resolved(user_id: impl Into<UserId>) -> Self {
        Self {
            user_record_id: Some(user_id.into()),
            display_name: None,
        }
    }

    /// An identity the store could not resolve.
    pub fn unresolved() -> Self {
        Self::default()
    }
}

/// Where a participant stands on an invitation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AcceptanceStatus {
    Pending,
    Accepted,
    Removed,
}

/// A recipient of a share.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareParticipant {
    pub user_id: UserId,
    pub status: AcceptanceStatus,
}

/// A collaboration grant on exactly one root record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Share {
    /// Id of the share record itself
    pub id: RecordId,
    /// Title shown to recipients (the Space name)
    pub title: String,
    /// The record being shared
    pub root_record_id: RecordId,
    /// Owner of the root record, once the store has resolved it
    pub owner: Option<UserIdentity>,
    /// Recipients and their acceptance state
    pub participants: Vec<ShareParticipant>,
}

impl Share {
    /// Create an unsaved share for a Space, titled with the Space's name.
    pub fn new(space: &Space) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            title: space.name().to_string(),
            root_record_id: space.id().clone(),
            owner: None,
            participants: Vec::new(),
        }
    }

    /// Read a share out of a record. Returns `None` for non-share records.
    pub fn from_record(record: &Record) -> Option<Self> {
        if record.record_type != SHARE_RECORD_TYPE {
            return None;
        }

        let title = record.get_str(TITLE_KEY)?.to_string();
        let root_record_id = record.get_str(ROOT_RECORD_KEY)?.to_string();
        let owner = match record.get(OWNER_KEY) {
            Some(Value::Null) | None => None,
            Some(value) => Some(serde_json::from_value(value.clone()).ok()?),
        };
        let participants = match record.get(PARTICIPANTS_KEY) {
            Some(value) => serde_json::from_value(value.clone()).ok()?,
            None => Vec::new(),
        };

        Some(Self {
            id: record.id.clone(),
            title,
            root_record_id,
            owner,
            participants,
        })
    }

    /// Convert into a fresh share record (without system fields).
    pub fn to_record(&self) -> Record {
        let mut record = Record::with_id(self.id.clone(), SHARE_RECORD_TYPE)
            .with_field(TITLE_KEY, self.title.clone())
            .with_field(ROOT_RECORD_KEY, self.root_record_id.clone())
            .with_field(
                PARTICIPANTS_KEY,
                serde_json::to_value(&self.participants).unwrap_or(Value::Null),
            );
        if let Some(owner) = &self.owner {
            record.set(
                OWNER_KEY,
                serde_json::to_value(owner).unwrap_or(Value::Null),
            );
        }
        record
    }

    /// Look up a participant by user id.
    pub fn participant(&self, user_id: &str) -> Option<&ShareParticipant> {
        self.participants.iter().find(|p| p.user_id == user_id)
    }

    /// Whether the user has accepted this share.
    pub fn has_accepted(&self, user_id: &str) -> bool {
        self.participant(user_id)
            .is_some_and(|p| p.status == AcceptanceStatus::Accepted)
    }

    /// Set a participant's status, adding them if needed.
    pub fn set_participant_status(&mut self, user_id: &str, status: AcceptanceStatus) {
        match self.participants.iter_mut().find(|p| p.user_id == user_id) {
            Some(participant) => participant.status = status,
            None => self.participants.push(ShareParticipant {
                user_id: user_id.to_string(),
                status,
            }),
        }
    }
}

/// Invitation metadata for a share, as handed to a recipient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareMetadata {
    /// Container hosting the share (may differ from the local container)
    pub container_id: ContainerId,
    /// The share being offered
    pub share: Share,
    /// The shared root record
    pub root_record_id: RecordId,
    /// Owner of the shared record
    pub owner_identity: UserIdentity,
    /// The recipient's status on this share
    pub participant_status: AcceptanceStatus,
}

impl ShareMetadata {
    /// The owner's user id, if the store resolved one.
    pub fn owner_id(&self) -> Option<&UserId> {
        self.owner_identity.user_record_id.as_ref()
    }
}
