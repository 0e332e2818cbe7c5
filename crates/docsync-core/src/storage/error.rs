//! Local storage errors
//!
//! Failures while placing a downloaded document on disk. I/O errors are
//! sorted into the cases a user can act on.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors from writing a downloaded document
#[derive(Error, Debug)]
pub enum StorageError {
    /// Document name cannot be used as a single file name
    #[error("Cannot store document '{name}' locally: {reason}")]
    InvalidName { name: String, reason: &'static str },

    /// Destination directory could not be created
    #[error("Cannot create download directory '{path}': {source}")]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Not allowed to write at the destination
    #[error("No write access to '{path}'")]
    PermissionDenied {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Ran out of space mid-download
    #[error("Out of disk space writing '{path}'")]
    DiskFull {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Any other write failure
    #[error("Cannot write '{path}': {source}")]
    WriteError {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Previous copy at the destination could not be removed
    #[error("Cannot replace existing file '{path}': {source}")]
    RemoveFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Finished download could not be moved into place
    #[error("Cannot move '{from}' into place at '{to}': {source}")]
    AtomicWriteFailed {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl StorageError {
    /// Wrap an I/O error raised while writing `path`
    pub fn from_io(error: io::Error, path: PathBuf) -> Self {
        if error.kind() == io::ErrorKind::PermissionDenied {
            StorageError::PermissionDenied {
                path,
                source: error,
            }
        } else if looks_like_out_of_space(&error) {
            StorageError::DiskFull {
                path,
                source: error,
            }
        } else {
            StorageError::WriteError {
                path,
                source: error,
            }
        }
    }

    /// Hint shown next to the error, if there is one
    pub fn recovery_suggestion(&self) -> Option<&'static str> {
        match self {
            StorageError::InvalidName { .. } => {
                Some("Ask the server owner to rename the document.")
            }
            StorageError::CreateDirectory { .. } => {
                Some("Point documents_dir or preview_dir at a writable location.")
            }
            StorageError::PermissionDenied { .. } | StorageError::RemoveFailed { .. } => {
                Some("Check permissions on the download directory.")
            }
            StorageError::DiskFull { .. } => Some("Free some disk space and retry."),
            StorageError::WriteError { .. } | StorageError::AtomicWriteFailed { .. } => None,
        }
    }
}

// StorageFull is not stable on every supported toolchain; match the OS message.
fn looks_like_out_of_space(error: &io::Error) -> bool {
    let text = error.to_string().to_lowercase();
    ["no space left", "disk full", "quota exceeded", "not enough space"]
        .iter()
        .any(|needle| text.contains(needle))
}

/// Result alias for local storage
pub type StorageResult<T> = Result<T, StorageError>;
