//! # SpaceSync Engine
//!
//! Client-side synchronization of a single shared workspace (a "Space")
//! against a remote record store with built-in sharing.
//!
//! The engine owns the Space lifecycle: create locally, save, fetch (including
//! a Space someone else shared), share with collaborators, accept an incoming
//! share, and delete. It tracks whether the local user owns the Space or
//! joined it as a guest, because that decides which remote database every
//! later call targets.
//!
//! ## Core Concepts
//!
//! ### Records and Spaces
//!
//! The store deals in [`Record`]s. A [`Space`] wraps a record of type
//! `"Space"`; a [`Share`] is a record of type `"share"` rooted at a Space's
//! record. Records get their remote identity ([`SystemFields`]) on first save.
//!
//! ### Container Mode
//!
//! [`CloudContainer`] holds the [`ContainerMode`]: [`ContainerMode::Owner`]
//! targets the private database, [`ContainerMode::Shared`] the shared database
//! of the owner whose Space was joined. The mode only changes when a share is
//! accepted.
//!
//! ### Remote Record Store
//!
//! [`RemoteRecordStore`] is the store protocol. Each call returns a
//! [`PendingOperation`], observable item by item or as one overall outcome.
//! [`MemoryBackend`] is an in-memory implementation; with the `http` feature,
//! `HttpRecordStore` talks to `spacesync-server`.
//!
//! ### Space Service
//!
//! [`SpaceService`] composes store calls into domain operations. Background
//! follow-ups (the mode switch after accepting a share) live in the
//! [`SubscriptionRegistry`] until they fire.
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use spacesync_engine::{create_local_space, CloudContainer, MemoryBackend, SpaceService};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> spacesync_engine::Result<()> {
//! // 1. A store and a container
//! let backend = Arc::new(MemoryBackend::new().with_container("iCloud.example"));
//! let container = Arc::new(CloudContainer::new("iCloud.example"));
//! let service = SpaceService::new(container, Arc::new(backend.session("alice")));
//!
//! // 2. Create and save a Space
//! let space = create_local_space("Release Train");
//! let saved = service.save(&space).await?;
//! assert!(saved.has_remote_identity());
//!
//! // 3. Share it
//! let share = service.save_and_share(&saved).await?;
//! assert_eq!(share.title, "Release Train");
//! # Ok(())
//! # }
//! ```

pub mod container;
pub mod current;
pub mod error;
#[cfg(feature = "http")]
pub mod http;
pub mod memory;
pub mod operation;
pub mod record;
pub mod registry;
pub mod service;
pub mod share;
pub mod space;
pub mod store;
pub mod wire;

// Re-export main types at crate root
pub use container::{CloudContainer, ContainerMode, Database, DatabaseScope};
pub use current::CurrentSpace;
pub use error::{Error, Result, StoreError};
#[cfg(feature = "http")]
pub use http::HttpRecordStore;
pub use memory::{MemoryBackend, MemoryRecordStore, OperationStats};
pub use operation::{
    OperationConfiguration, OperationReporter, PendingOperation, QualityOfService,
};
pub use record::{FetchedRecord, Record, Reference, SystemFields};
pub use registry::{SubscriptionId, SubscriptionRegistry};
pub use service::SpaceService;
pub use share::{AcceptanceStatus, Share, ShareMetadata, ShareParticipant, UserIdentity};
pub use space::{create_local_space, Space};
pub use store::RemoteRecordStore;

/// Type aliases for clarity
pub type RecordId = String;
pub type ContainerId = String;
pub type UserId = String;
pub type Timestamp = u64;
