//! docsync Core Library
//!
//! This crate provides the core functionality for docsync, a client for a
//! per-user document server reachable over HTTP.
//!
//! # Architecture
//!
//! - **Identity**: who is asking, resolved once per session
//! - **Client**: lists and downloads documents for that identity
//! - **Storage**: places downloads in a preview cache or the documents directory
//!
//! # Quick Start
//!
//! ```text
//! let config = Config::load()?;
//! let identity = resolve_identity(config.username.as_deref(), "iPad de Marta")?;
//! let client = DocumentSyncClient::from_config(&config, identity)?;
//!
//! let names = client.list_documents().await?;
//! let file = client.download_document(&names[0], DownloadMode::Save).await?;
//! ```
//!
//! # Modules
//!
//! - `client`: HTTP client for the document server (main entry point)
//! - `identity`: Identity resolution and sanitization
//! - `endpoint`: Request URL construction
//! - `storage`: Local placement of downloaded files
//! - `error`: Error taxonomy
//! - `config`: Application configuration

pub mod client;
pub mod config;
pub mod endpoint;
pub mod error;
pub mod identity;
pub mod storage;

pub use client::{DocumentSyncClient, DownloadedFile};
pub use config::Config;
pub use endpoint::Endpoint;
pub use error::{SyncError, SyncErrorKind, SyncResult};
pub use identity::{resolve_identity, sanitize_username, Identity, IdentityError};
pub use storage::{DownloadMode, LocalStore, PendingFile, StorageError};
