//! Document server client
//!
//! Lists the documents available to an identity and downloads single
//! documents into the preview cache or the documents directory.
//!
//! Every call is a single attempt with a bounded timeout. There are no
//! retries and no caching; each call to [`DocumentSyncClient::list_documents`]
//! goes to the server. Dropping a returned future aborts the transfer and
//! discards any partially written file.

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use url::Url;

use crate::config::Config;
use crate::endpoint::Endpoint;
use crate::error::{SyncError, SyncResult};
use crate::identity::Identity;
use crate::storage::{DownloadMode, LocalStore, StorageError};

/// Upper bound for establishing a connection
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

const USER_AGENT: &str = concat!("docsync/", env!("CARGO_PKG_VERSION"));

/// Body of `GET /documents/{identity}`
#[derive(Debug, Deserialize)]
struct ListingResponse {
    documents: Vec<String>,
}

/// A document written to local storage
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DownloadedFile {
    /// Document name as listed by the server
    pub name: String,
    /// Scope the file was written to
    pub mode: DownloadMode,
    /// Local path, owned by the caller from now on
    pub path: PathBuf,
    /// Size in bytes
    pub bytes: u64,
}

/// Client for one identity on one document server
///
/// Cheap to clone; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct DocumentSyncClient {
    http: reqwest::Client,
    endpoint: Endpoint,
    identity: Identity,
    store: LocalStore,
}

impl DocumentSyncClient {
    /// Create a client
    ///
    /// `timeout` bounds each request from connect to the last body byte.
    pub fn new(
        endpoint: Endpoint,
        identity: Identity,
        store: LocalStore,
        timeout: Duration,
    ) -> SyncResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout.min(CONNECT_TIMEOUT))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|source| SyncError::Network {
                url: endpoint.base().to_string(),
                source,
            })?;

        Ok(Self {
            http,
            endpoint,
            identity,
            store,
        })
    }

    /// Create a client from configuration
    pub fn from_config(config: &Config, identity: Identity) -> SyncResult<Self> {
        let endpoint = Endpoint::parse(&config.server_url)?;
        Self::new(
            endpoint,
            identity,
            LocalStore::from_config(config),
            config.timeout(),
        )
    }

    /// Identity this client acts for
    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    /// Server this client talks to
    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// Local destinations for downloads
    pub fn store(&self) -> &LocalStore {
        &self.store
    }

    /// Fetch the names of the documents available to this identity
    ///
    /// Order is the server's.
    pub async fn list_documents(&self) -> SyncResult<Vec<String>> {
        let url = self.endpoint.listing_url(&self.identity)?;
        debug!("Listing documents at {}", url);

        let result = self.fetch_listing(&url).await;
        match &result {
            Ok(names) => info!("Listed {} documents for {}", names.len(), self.identity),
            Err(e) => warn!("Listing documents failed: {}", e),
        }
        result
    }

    /// Download one document
    ///
    /// In [`DownloadMode::Save`] any file with the same name in the
    /// documents directory is replaced. On failure nothing is left at the
    /// destination that was not there before.
    pub async fn download_document(
        &self,
        name: &str,
        mode: DownloadMode,
    ) -> SyncResult<DownloadedFile> {
        let url = self.endpoint.document_url(&self.identity, name)?;
        // Fail on unstorable names before any network traffic
        self.store.local_path(name, mode)?;
        debug!("Downloading {} ({})", url, mode);

        let result = self.fetch_document(&url, name, mode).await;
        match &result {
            Ok(file) => info!(
                "Downloaded {:?} ({} bytes) to {:?}",
                file.name, file.bytes, file.path
            ),
            Err(e) => warn!("Download of {:?} failed: {}", name, e),
        }
        result
    }

    async fn fetch_listing(&self, url: &Url) -> SyncResult<Vec<String>> {
        let response = self.get(url).await?;
        let body = response
            .bytes()
            .await
            .map_err(|source| network_error(url, source))?;
        parse_listing(url, &body)
    }

    async fn fetch_document(
        &self,
        url: &Url,
        name: &str,
        mode: DownloadMode,
    ) -> SyncResult<DownloadedFile> {
        let mut response = self.get(url).await?;
        let mut pending = self.store.begin(name, mode)?;

        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|source| network_error(url, source))?
        {
            pending.write_chunk(&chunk)?;
        }

        let bytes = pending.bytes_written();
        let target = pending.target().to_path_buf();
        // fsync and rename block; keep them off the async workers
        let path = tokio::task::spawn_blocking(move || pending.commit())
            .await
            .map_err(|e| StorageError::from_io(io::Error::new(io::ErrorKind::Other, e), target))??;

        Ok(DownloadedFile {
            name: name.to_string(),
            mode,
            path,
            bytes,
        })
    }

    /// Send a GET and require `200 OK`
    ///
    /// Other 2xx codes are rejected too; a `204` must never replace a saved
    /// document with an empty file.
    async fn get(&self, url: &Url) -> SyncResult<reqwest::Response> {
        let response = self
            .http
            .get(url.clone())
            .send()
            .await
            .map_err(|source| network_error(url, source))?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(SyncError::UnexpectedStatus {
                url: url.to_string(),
                status,
            });
        }
        Ok(response)
    }
}

fn network_error(url: &Url, source: reqwest::Error) -> SyncError {
    SyncError::Network {
        url: url.to_string(),
        source,
    }
}

/// Parse a `{"documents": [...]}` body
fn parse_listing(url: &Url, body: &[u8]) -> SyncResult<Vec<String>> {
    serde_json::from_slice::<ListingResponse>(body)
        .map(|listing| listing.documents)
        .map_err(|e| SyncError::InvalidResponse {
            url: url.to_string(),
            details: e.to_string(),
        })
}
