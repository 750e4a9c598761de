//! HTTP client for a `spacesync-server` record store.
//!
//! Each dispatch spawns a Tokio task that performs the request and reports
//! the result through the operation's reporter, so every method must be
//! called from within a Tokio runtime.

use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::operation::{self, OperationConfiguration, OperationReporter, PendingOperation};
use crate::wire::{
    AcceptSharesRequest, AcceptSharesResponse, DeleteRecordsRequest, DeleteRecordsResponse,
    ErrorBody, FetchRecordsRequest, FetchRecordsResponse, SaveRecordsRequest,
    SaveRecordsResponse,
};
use crate::{
    ContainerId, Database, FetchedRecord, Record, RecordId, RemoteRecordStore, ShareMetadata,
    StoreError,
};

type StoreResult<T> = std::result::Result<T, StoreError>;

/// A [`RemoteRecordStore`] reached over HTTP.
#[derive(Debug, Clone)]
pub struct HttpRecordStore {
    client: Client,
    base_url: String,
    user_token: String,
}

impl HttpRecordStore {
    /// Create a client for the server at `base_url`, authenticating as the
    /// user identified by `user_token`.
    pub fn new(base_url: impl Into<String>, user_token: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url, user_token)
    }

    pub fn with_client(
        client: Client,
        base_url: impl Into<String>,
        user_token: impl Into<String>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            user_token: user_token.into(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch the invitation metadata of a share, as opened from a share link.
    pub async fn fetch_share_metadata(
        &self,
        container: &str,
        share_id: &str,
    ) -> StoreResult<ShareMetadata> {
        let url = format!(
            "{}/containers/{}/shares/{}/metadata",
            self.base_url, container, share_id
        );
        let response = self
            .client
            .get(url)
            .bearer_auth(&self.user_token)
            .send()
            .await
            .map_err(network_error)?;
        decode(response).await
    }

    fn records_url(&self, database: &Database, action: &str) -> String {
        format!(
            "{}/containers/{}/databases/{}/records/{}",
            self.base_url,
            database.container,
            database.scope.as_str(),
            action
        )
    }

    fn spawn_post<B, R, T, F>(&self, url: String, body: B, unpack: F) -> PendingOperation<T>
    where
        B: Serialize,
        R: DeserializeOwned + Send + 'static,
        T: Send + 'static,
        F: FnOnce(R) -> Vec<T> + Send + 'static,
    {
        let (reporter, pending) = operation::channel();
        let request = self
            .client
            .post(url)
            .bearer_auth(&self.user_token)
            .json(&body);

        tokio::spawn(async move {
            let result = match request.send().await {
                Ok(response) => decode::<R>(response).await.map(unpack),
                Err(error) => Err(network_error(error)),
            };
            report(reporter, result);
        });

        pending
    }
}

fn report<T>(reporter: OperationReporter<T>, result: StoreResult<Vec<T>>) {
    if let Err(error) = &result {
        tracing::debug!(%error, "Record store request failed");
    }
    reporter.complete(result);
}

fn network_error(error: reqwest::Error) -> StoreError {
    StoreError::Network(error.to_string())
}

/// Decode a success body, or the store error carried by a failure body.
async fn decode<R: DeserializeOwned>(response: Response) -> StoreResult<R> {
    let status = response.status();
    if status.is_success() {
        return response.json::<R>().await.map_err(network_error);
    }

    match response.json::<ErrorBody>().await {
        Ok(body) => Err(body.error),
        Err(_) => Err(StoreError::Network(format!(
            "server responded with {status}"
        ))),
    }
}

impl RemoteRecordStore for HttpRecordStore {
    fn fetch_records(
        &self,
        ids: Vec<RecordId>,
        database: &Database,
    ) -> PendingOperation<FetchedRecord> {
        let body = FetchRecordsRequest {
            ids,
            zone_owner: database.zone_owner.clone(),
        };
        self.spawn_post(
            self.records_url(database, "fetch"),
            body,
            |response: FetchRecordsResponse| response.records,
        )
    }

    fn save_records(
        &self,
        records: Vec<Record>,
        database: &Database,
        configuration: OperationConfiguration,
    ) -> PendingOperation<Record> {
        let body = SaveRecordsRequest {
            records,
            quality_of_service: configuration.quality_of_service,
            zone_owner: database.zone_owner.clone(),
        };
        self.spawn_post(
            self.records_url(database, "save"),
            body,
            |response: SaveRecordsResponse| response.records,
        )
    }

    fn delete_records(
        &self,
        ids: Vec<RecordId>,
        database: &Database,
        configuration: OperationConfiguration,
    ) -> PendingOperation<RecordId> {
        let body = DeleteRecordsRequest {
            ids,
            quality_of_service: configuration.quality_of_service,
            zone_owner: database.zone_owner.clone(),
        };
        self.spawn_post(
            self.records_url(database, "delete"),
            body,
            |response: DeleteRecordsResponse| response.deleted,
        )
    }

    fn accept_shares(
        &self,
        metadata: Vec<ShareMetadata>,
        container: &ContainerId,
    ) -> PendingOperation<ShareMetadata> {
        let url = format!("{}/containers/{}/shares/accept", self.base_url, container);
        self.spawn_post(
            url,
            AcceptSharesRequest { metadata },
            |response: AcceptSharesResponse| response.metadata,
        )
    }
}
