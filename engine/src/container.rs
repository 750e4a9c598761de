//! Container mode: whether the local participant owns the Space or joined it
//! through a share, and which remote database that implies.

use crate::{ContainerId, UserId};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

/// Role of the local participant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ContainerMode {
    /// The local user owns the Space
    #[default]
    Owner,
    /// The local user joined a Space owned by `owner_name`
    #[serde(rename_all = "camelCase")]
    Shared { owner_name: UserId },
}

impl ContainerMode {
    pub fn is_owner(&self) -> bool {
        matches!(self, ContainerMode::Owner)
    }

    /// Owner of the joined Space, in shared mode.
    pub fn owner_name(&self) -> Option<&UserId> {
        match self {
            ContainerMode::Owner => None,
            ContainerMode::Shared { owner_name } => Some(owner_name),
        }
    }
}

/// Which of a container's databases a request targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseScope {
    /// The caller's own records
    Private,
    /// Records other users shared with the caller
    Shared,
}

impl DatabaseScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            DatabaseScope::Private => "private",
            DatabaseScope::Shared => "shared",
        }
    }
}

/// A target database for remote calls.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Database {
    pub container: ContainerId,
    pub scope: DatabaseScope,
    /// For the shared scope, restricts access to one owner's records
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zone_owner: Option<UserId>,
}

impl Database {
    pub fn private(container: impl Into<ContainerId>) -> Self {
        Self {
            container: container.into(),
            scope: DatabaseScope::Private,
            zone_owner: None,
        }
    }

    pub fn shared(container: impl Into<ContainerId>, zone_owner: Option<UserId>) -> Self {
        Self {
            container: container.into(),
            scope: DatabaseScope::Shared,
            zone_owner,
        }
    }
}

/// The locally configured container and its current mode.
///
/// The mode has a single writer: a successful share acceptance. Everything
/// else reads snapshots.
#[derive(Debug)]
pub struct CloudContainer {
    identifier: ContainerId,
    mode: RwLock<ContainerMode>,
}

impl CloudContainer {
    /// Create a container in owner mode.
    pub fn new(identifier: impl Into<ContainerId>) -> Self {
        Self::with_mode(identifier, ContainerMode::Owner)
    }

    /// Create a container with a known mode, e.g. restored by the host app.
    pub fn with_mode(identifier: impl Into<ContainerId>, mode: ContainerMode) -> Self {
        Self {
            identifier: identifier.into(),
            mode: RwLock::new(mode),
        }
    }

    pub fn identifier(&self) -> &ContainerId {
        &self.identifier
    }

    /// Snapshot of the current mode.
    pub fn mode(&self) -> ContainerMode {
        self.mode.read().clone()
    }

    pub fn is_owner(&self) -> bool {
        self.mode.read().is_owner()
    }

    /// The local user's own database.
    pub fn private_database(&self) -> Database {
        Database::private(self.identifier.clone())
    }

    /// The database of records shared with the local user.
    pub fn shared_database(&self) -> Database {
        let owner = self.mode.read().owner_name().cloned();
        Database::shared(self.identifier.clone(), owner)
    }

    /// The database implied by the current mode.
    pub fn current_database(&self) -> Database {
        match &*self.mode.read() {
            ContainerMode::Owner => self.private_database(),
            ContainerMode::Shared { owner_name } => {
                Database::shared(self.identifier.clone(), Some(owner_name.clone()))
            }
        }
    }

    pub(crate) fn enter_shared(&self, owner_name: UserId) {
        let mut mode = self.mode.write();
        tracing::info!(
            container = %self.identifier,
            owner = %owner_name,
            previous = ?*mode,
            "Container switched to shared mode"
        );
        *mode = ContainerMode::Shared { owner_name };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_as_owner() {
        let container = CloudContainer::new("iCloud.test");

        assert!(container.is_owner());
        assert_eq!(container.mode(), ContainerMode::Owner);
        assert_eq!(
            container.current_database(),
            Database::private("iCloud.test")
        );
        assert_eq!(
            container.shared_database(),
            Database::shared("iCloud.test", None)
        );
    }

    #[test]
    fn shared_mode_targets_owner_zone() {
        let container = CloudContainer::new("iCloud.test");
        container.enter_shared("owner-123".into());

        assert!(!container.is_owner());
        assert_eq!(
            container.mode(),
            ContainerMode::Shared {
                owner_name: "owner-123".into()
            }
        );

        let current = container.current_database();
        assert_eq!(current.scope, DatabaseScope::Shared);
        assert_eq!(current.zone_owner.as_deref(), Some("owner-123"));
        assert_eq!(container.shared_database(), current);
        assert_eq!(container.private_database().scope, DatabaseScope::Private);
    }

    #[test]
    fn mode_serialization_format() {
        let mode = ContainerMode::Shared {
            owner_name: "owner-1".into(),
        };
        let json = serde_json::to_value(&mode).unwrap();
        assert_eq!(json["type"], "shared");
        assert_eq!(json["ownerName"], "owner-1");

        let owner: ContainerMode = serde_json::from_str(r#"{"type":"owner"}"#).unwrap();
        assert!(owner.is_owner());
    }
}
