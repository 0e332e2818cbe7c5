//! Error taxonomy for document server operations
//!
//! Every failure is a typed [`SyncError`]; callers branch on
//! [`SyncError::kind`] and show the `Display` message to the user.

use reqwest::StatusCode;
use thiserror::Error;

use crate::identity::IdentityError;
use crate::storage::StorageError;

/// Broad category of a [`SyncError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncErrorKind {
    /// Connection, DNS, timeout or body transfer failure
    Network,
    /// Unexpected status or malformed body
    InvalidResponse,
    /// Request URL could not be built
    InvalidRequest,
    /// Local file write failed
    Storage,
    /// No usable identity
    Identity,
}

/// Errors returned by the document sync client
#[derive(Error, Debug)]
pub enum SyncError {
    /// Transport-level failure
    #[error("Network error contacting {url}: {}", describe_transport(.source))]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Server answered with something other than `200 OK`
    #[error("Server returned {status} for {url}")]
    UnexpectedStatus { url: String, status: StatusCode },

    /// Body could not be parsed or had the wrong shape
    #[error("Invalid response from {url}: {details}")]
    InvalidResponse { url: String, details: String },

    /// URL could not be constructed
    #[error("Invalid request: {details}")]
    InvalidRequest { details: String },

    /// Local storage failure
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Identity could not be resolved
    #[error(transparent)]
    Identity(#[from] IdentityError),
}

impl SyncError {
    /// Category of this error
    pub fn kind(&self) -> SyncErrorKind {
        match self {
            SyncError::Network { .. } => SyncErrorKind::Network,
            SyncError::UnexpectedStatus { .. } | SyncError::InvalidResponse { .. } => {
                SyncErrorKind::InvalidResponse
            }
            SyncError::InvalidRequest { .. } => SyncErrorKind::InvalidRequest,
            SyncError::Storage(_) => SyncErrorKind::Storage,
            SyncError::Identity(_) => SyncErrorKind::Identity,
        }
    }

    pub(crate) fn invalid_request(details: impl Into<String>) -> Self {
        SyncError::InvalidRequest {
            details: details.into(),
        }
    }

    /// Get a recovery suggestion for this error
    pub fn recovery_suggestion(&self) -> Option<&'static str> {
        match self {
            SyncError::Network { source, .. } if source.is_timeout() => {
                Some("The server did not answer in time. Check it is running or raise timeout_secs.")
            }
            SyncError::Network { .. } => {
                Some("Check the server is running and server_url points to it.")
            }
            SyncError::UnexpectedStatus { status, .. } if *status == StatusCode::NOT_FOUND => {
                Some("The document or user does not exist on the server.")
            }
            SyncError::Storage(e) => e.recovery_suggestion(),
            SyncError::Identity(_) => Some("Pass --user <name> or run `docsync login`."),
            _ => None,
        }
    }
}

fn describe_transport(error: &reqwest::Error) -> String {
    if error.is_timeout() {
        "request timed out".to_string()
    } else if error.is_connect() {
        "could not connect".to_string()
    } else {
        error.to_string()
    }
}

/// Result type for sync operations
pub type SyncResult<T> = Result<T, SyncError>;
