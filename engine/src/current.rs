//! The observed current Space.

use tokio::sync::watch;

use crate::Space;

/// Holds the Space the user is working in, if any, and lets observers follow
/// every replacement.
#[derive(Debug)]
pub struct CurrentSpace {
    tx: watch::Sender<Option<Space>>,
}

impl CurrentSpace {
    /// Start with no Space.
    pub fn new() -> Self {
        Self::with_space(None)
    }

    pub fn with_space(space: Option<Space>) -> Self {
        let (tx, _rx) = watch::channel(space);
        Self { tx }
    }

    /// A copy of the current value.
    pub fn get(&self) -> Option<Space> {
        self.tx.borrow().clone()
    }

    pub fn set(&self, space: Space) {
        self.tx.send_replace(Some(space));
    }

    /// Set a new value, returning the previous one.
    pub fn replace(&self, space: Option<Space>) -> Option<Space> {
        self.tx.send_replace(space)
    }

    pub fn clear(&self) -> Option<Space> {
        self.tx.send_replace(None)
    }

    /// Follow changes to the current Space.
    pub fn subscribe(&self) -> watch::Receiver<Option<Space>> {
        self.tx.subscribe()
    }
}

impl Default for CurrentSpace {
    fn default() -> Self {
        Self::new()
    }
}
