//! Storage layer
//!
//! Places downloaded documents on the local file system.
//!
//! ## Scopes
//!
//! - **Preview**: scratch directory the OS may reclaim at any time
//! - **Save**: the user's documents directory, durable and user-visible
//!
//! Downloads are streamed into a temp file next to the destination and
//! renamed into place on commit, so the destination never holds a partial
//! document.

mod error;
mod local;

pub use error::{StorageError, StorageResult};
pub use local::{DownloadMode, LocalStore, PendingFile};
