//! Request URL construction
//!
//! Wire layout:
//! - `GET {base}/documents/{identity}` lists documents
//! - `GET {base}/documents/{identity}/{name}` fetches one document
//!
//! Identity and name are each pushed as a single path segment, so they are
//! percent-encoded (space, `#`, `?`, `/`, `%`, ...) and the server sees the
//! original strings after decoding.

use url::Url;

use crate::error::{SyncError, SyncResult};
use crate::identity::Identity;

/// Path segment under which documents live
const DOCUMENTS_SEGMENT: &str = "documents";

/// Base URL of a document server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    base: Url,
}

impl Endpoint {
    /// Parse a server base URL such as `http://192.168.1.100:3000`
    ///
    /// A path prefix is kept: `http://host/api` serves `/api/documents/...`.
    pub fn parse(server_url: &str) -> SyncResult<Self> {
        let base = Url::parse(server_url).map_err(|e| {
            SyncError::invalid_request(format!("invalid server URL {:?}: {}", server_url, e))
        })?;

        if !matches!(base.scheme(), "http" | "https") {
            return Err(SyncError::invalid_request(format!(
                "server URL {:?} must use http or https",
                server_url
            )));
        }
        if base.cannot_be_a_base() || base.host_str().is_none() {
            return Err(SyncError::invalid_request(format!(
                "server URL {:?} has no host",
                server_url
            )));
        }

        Ok(Self { base })
    }

    /// Base URL as configured
    pub fn base(&self) -> &Url {
        &self.base
    }

    /// URL listing the documents of `identity`
    pub fn listing_url(&self, identity: &Identity) -> SyncResult<Url> {
        self.with_segments(&[identity.as_str()])
    }

    /// URL of document `name` belonging to `identity`
    pub fn document_url(&self, identity: &Identity, name: &str) -> SyncResult<Url> {
        self.with_segments(&[identity.as_str(), name])
    }

    fn with_segments(&self, tail: &[&str]) -> SyncResult<Url> {
        for segment in tail {
            // The url crate silently drops "." and ".." segments
            if matches!(*segment, "" | "." | "..") {
                return Err(SyncError::invalid_request(format!(
                    "{:?} is not a valid path segment",
                    segment
                )));
            }
        }

        let mut url = self.base.clone();
        url.set_query(None);
        url.set_fragment(None);
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| SyncError::invalid_request("server URL cannot take a path"))?;
            segments.pop_if_empty().push(DOCUMENTS_SEGMENT);
            for segment in tail {
                segments.push(segment);
            }
        }
        Ok(url)
    }
}
