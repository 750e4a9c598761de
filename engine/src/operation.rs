//! Handles for remote operations in flight.
//!
//! A store reports an operation through an [`OperationReporter`]; the caller
//! consumes it through the matching [`PendingOperation`], either item by item
//! ([`PendingOperation::per_item`]) or as one overall outcome
//! ([`PendingOperation::completion`]).

use crate::StoreError;
use futures::stream::{self, BoxStream, StreamExt};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

/// Scheduling hint telling the store how urgent an operation is.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum QualityOfService {
    UserInteractive,
    UserInitiated,
    Utility,
    Background,
    #[default]
    Default,
}

impl QualityOfService {
    /// Whether the work may be deferred behind user-facing requests.
    pub fn is_background_class(&self) -> bool {
        matches!(self, QualityOfService::Utility | QualityOfService::Background)
    }
}

/// Per-operation settings passed to the store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationConfiguration {
    pub quality_of_service: QualityOfService,
}

impl OperationConfiguration {
    pub fn with_quality_of_service(quality_of_service: QualityOfService) -> Self {
        Self { quality_of_service }
    }
}

#[derive(Debug)]
enum Event<T> {
    Item(T),
    Finished,
    Failed(StoreError),
}

/// Create a connected reporter/handle pair.
pub fn channel<T>() -> (OperationReporter<T>, PendingOperation<T>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (OperationReporter { tx }, PendingOperation { rx })
}

/// Producer side of an operation, held by the store.
///
/// Dropping a reporter without calling [`finish`](Self::finish) or
/// [`fail`](Self::fail) surfaces as [`StoreError::Interrupted`].
#[derive(Debug)]
pub struct OperationReporter<T> {
    tx: mpsc::UnboundedSender<Event<T>>,
}

impl<T> OperationReporter<T> {
    /// Report one item. Returns false if nobody is listening any more.
    pub fn item(&self, item: T) -> bool {
        self.tx.send(Event::Item(item)).is_ok()
    }

    /// Report successful completion.
    pub fn finish(self) {
        let _ = self.tx.send(Event::Finished);
    }

    /// Report failure of the whole operation.
    pub fn fail(self, error: StoreError) {
        let _ = self.tx.send(Event::Failed(error));
    }

    /// Report a batch outcome in one go.
    pub fn complete(self, result: Result<Vec<T>, StoreError>) {
        match result {
            Ok(items) => {
                for item in items {
                    self.item(item);
                }
                self.finish();
            }
            Err(error) => self.fail(error),
        }
    }
}

/// Consumer side of an operation: its eventual per-item outcomes and overall
/// completion.
#[derive(Debug)]
pub struct PendingOperation<T> {
    rx: mpsc::UnboundedReceiver<Event<T>>,
}

impl<T: Send + 'static> PendingOperation<T> {
    /// An operation that has already failed.
    pub fn failed(error: StoreError) -> Self {
        let (reporter, pending) = channel();
        reporter.fail(error);
        pending
    }

    /// An operation that has already succeeded with the given items.
    pub fn ready(items: Vec<T>) -> Self {
        let (reporter, pending) = channel();
        reporter.complete(Ok(items));
        pending
    }

    /// Items as the store reports them. A failure is the last element.
    pub fn per_item(self) -> BoxStream<'static, Result<T, StoreError>> {
        stream::unfold(Some(self.rx), |rx| async move {
            let mut rx = rx?;
            match rx.recv().await {
                Some(Event::Item(item)) => Some((Ok(item), Some(rx))),
                Some(Event::Finished) => None,
                Some(Event::Failed(error)) => Some((Err(error), None)),
                None => Some((Err(StoreError::Interrupted), None)),
            }
        })
        .boxed()
    }

    /// Overall outcome, with every item reported along the way.
    pub async fn completion(mut self) -> Result<Vec<T>, StoreError> {
        let mut items = Vec::new();
        loop {
            match self.rx.recv().await {
                Some(Event::Item(item)) => items.push(item),
                Some(Event::Finished) => return Ok(items),
                Some(Event::Failed(error)) => return Err(error),
                None => return Err(StoreError::Interrupted),
            }
        }
    }
}
