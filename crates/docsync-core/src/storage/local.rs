//! Local placement of downloaded documents

use std::fmt;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, warn};

use super::error::{StorageError, StorageResult};
use crate::config::Config;

/// Where a download should end up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DownloadMode {
    /// Transient copy for immediate viewing
    Preview,
    /// Durable copy in the documents directory, replacing any previous one
    Save,
}

impl fmt::Display for DownloadMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DownloadMode::Preview => f.write_str("preview"),
            DownloadMode::Save => f.write_str("save"),
        }
    }
}

/// Destination directories for downloaded documents
#[derive(Debug, Clone)]
pub struct LocalStore {
    preview_dir: PathBuf,
    documents_dir: PathBuf,
}

impl LocalStore {
    /// Create a store with explicit preview and documents directories
    pub fn new(preview_dir: impl Into<PathBuf>, documents_dir: impl Into<PathBuf>) -> Self {
        Self {
            preview_dir: preview_dir.into(),
            documents_dir: documents_dir.into(),
        }
    }

    /// Create a store from the configured directories
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.preview_dir.clone(), config.documents_dir.clone())
    }

    /// Directory used for the given mode
    pub fn dir_for(&self, mode: DownloadMode) -> &Path {
        match mode {
            DownloadMode::Preview => &self.preview_dir,
            DownloadMode::Save => &self.documents_dir,
        }
    }

    /// Path a document would be placed at
    ///
    /// Fails if `name` cannot be used as a single file name.
    pub fn local_path(&self, name: &str, mode: DownloadMode) -> StorageResult<PathBuf> {
        validate_file_name(name)?;
        Ok(self.dir_for(mode).join(name))
    }

    /// Start writing a document
    ///
    /// Creates the destination directory if needed and opens a temp file
    /// beside the destination. Nothing is visible at the destination until
    /// [`PendingFile::commit`] succeeds.
    pub fn begin(&self, name: &str, mode: DownloadMode) -> StorageResult<PendingFile> {
        let target = self.local_path(name, mode)?;
        let dir = self.dir_for(mode);

        fs::create_dir_all(dir).map_err(|source| StorageError::CreateDirectory {
            path: dir.to_path_buf(),
            source,
        })?;

        let temp_path = dir.join(format!(".docsync-{}.part", uuid::Uuid::new_v4()));
        let file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&temp_path)
            .map_err(|e| StorageError::from_io(e, temp_path.clone()))?;

        debug!("Writing {:?} via {:?}", target, temp_path);

        Ok(PendingFile {
            file: Some(file),
            temp_path,
            target,
            bytes_written: 0,
            committed: false,
        })
    }

    /// Write a complete document in one go
    pub fn write(&self, name: &str, mode: DownloadMode, data: &[u8]) -> StorageResult<PathBuf> {
        let mut pending = self.begin(name, mode)?;
        pending.write_chunk(data)?;
        pending.commit()
    }
}

/// A document being written to a temp file
///
/// Dropping it without calling [`commit`](PendingFile::commit) removes the
/// temp file and leaves the destination untouched.
#[derive(Debug)]
pub struct PendingFile {
    file: Option<File>,
    temp_path: PathBuf,
    target: PathBuf,
    bytes_written: u64,
    committed: bool,
}

impl PendingFile {
    /// Append a chunk of the document
    pub fn write_chunk(&mut self, chunk: &[u8]) -> StorageResult<()> {
        let Some(file) = self.file.as_mut() else {
            return Ok(());
        };
        file.write_all(chunk)
            .map_err(|e| StorageError::from_io(e, self.temp_path.clone()))?;
        self.bytes_written += chunk.len() as u64;
        Ok(())
    }

    /// Number of bytes written so far
    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    /// Final destination of the document
    pub fn target(&self) -> &Path {
        &self.target
    }

    /// Sync the temp file and move it over the destination
    ///
    /// Any existing file at the destination is replaced.
    pub fn commit(mut self) -> StorageResult<PathBuf> {
        if let Some(file) = self.file.take() {
            file.sync_all()
                .map_err(|e| StorageError::from_io(e, self.temp_path.clone()))?;
        }

        replace_file(&self.temp_path, &self.target)?;
        self.committed = true;

        debug!("Committed {} bytes to {:?}", self.bytes_written, self.target);
        Ok(self.target.clone())
    }
}

impl Drop for PendingFile {
    fn drop(&mut self) {
        if self.committed {
            return;
        }
        // Close before removing; required on Windows
        self.file.take();
        if let Err(e) = fs::remove_file(&self.temp_path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!("Failed to remove temp file {:?}: {}", self.temp_path, e);
            }
        }
    }
}

/// Rename `from` over `to`
///
/// Some platforms refuse to rename onto an existing file; only for that
/// refusal is the old file removed and the rename retried. Any other
/// failure leaves `to` as it was.
fn replace_file(from: &Path, to: &Path) -> StorageResult<()> {
    match fs::rename(from, to) {
        Ok(()) => Ok(()),
        Err(e) if refused_existing_target(&e) && to.is_file() => {
            fs::remove_file(to).map_err(|source| StorageError::RemoveFailed {
                path: to.to_path_buf(),
                source,
            })?;
            fs::rename(from, to).map_err(|source| StorageError::AtomicWriteFailed {
                from: from.to_path_buf(),
                to: to.to_path_buf(),
                source,
            })
        }
        Err(source) => Err(StorageError::AtomicWriteFailed {
            from: from.to_path_buf(),
            to: to.to_path_buf(),
            source,
        }),
    }
}

fn refused_existing_target(error: &std::io::Error) -> bool {
    match error.kind() {
        std::io::ErrorKind::AlreadyExists => true,
        std::io::ErrorKind::PermissionDenied => cfg!(windows),
        _ => false,
    }
}

/// Check that a document name is usable as a single file name
fn validate_file_name(name: &str) -> StorageResult<()> {
    let reason = if name.is_empty() {
        "name is empty"
    } else if name == "." || name == ".." {
        "name refers to a directory"
    } else if name.contains('/') || name.contains('\\') {
        "name contains a path separator"
    } else if name.contains('\0') {
        "name contains a NUL byte"
    } else {
        return Ok(());
    };

    Err(StorageError::InvalidName {
        name: name.to_string(),
        reason,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn test_store(temp_dir: &TempDir) -> LocalStore {
        LocalStore::new(
            temp_dir.path().join("preview"),
            temp_dir.path().join("documents"),
        )
    }

    fn entries(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn test_modes_use_separate_directories() {
        let temp_dir = TempDir::new().unwrap();
        let store = test_store(&temp_dir);

        let preview = store.write("a.pdf", DownloadMode::Preview, b"p").unwrap();
        let saved = store.write("a.pdf", DownloadMode::Save, b"s").unwrap();

        assert_eq!(preview, temp_dir.path().join("preview").join("a.pdf"));
        assert_eq!(saved, temp_dir.path().join("documents").join("a.pdf"));
        assert_eq!(fs::read(&preview).unwrap(), b"p");
        assert_eq!(fs::read(&saved).unwrap(), b"s");
    }

    #[test]
    fn test_save_replaces_existing_file() {
        let temp_dir = TempDir::new().unwrap();
        let store = test_store(&temp_dir);

        store
            .write("report.txt", DownloadMode::Save, b"first version, longer")
            .unwrap();
        let path = store
            .write("report.txt", DownloadMode::Save, b"second")
            .unwrap();

        assert_eq!(fs::read(&path).unwrap(), b"second");
        assert_eq!(
            entries(&temp_dir.path().join("documents")),
            vec!["report.txt".to_string()]
        );
    }

    #[test]
    fn test_chunked_write() {
        let temp_dir = TempDir::new().unwrap();
        let store = test_store(&temp_dir);

        let mut pending = store.begin("big.bin", DownloadMode::Save).unwrap();
        pending.write_chunk(b"hello ").unwrap();
        pending.write_chunk(b"world").unwrap();
        assert_eq!(pending.bytes_written(), 11);

        // Nothing visible until commit
        assert!(!pending.target().exists());

        let path = pending.commit().unwrap();
        assert_eq!(fs::read(path).unwrap(), b"hello world");
    }

    #[test]
    fn test_dropped_pending_file_leaves_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let store = test_store(&temp_dir);

        store
            .write("keep.txt", DownloadMode::Save, b"original")
            .unwrap();

        {
            let mut pending = store.begin("keep.txt", DownloadMode::Save).unwrap();
            pending.write_chunk(b"partial").unwrap();
        }

        let docs = temp_dir.path().join("documents");
        assert_eq!(entries(&docs), vec!["keep.txt".to_string()]);
        assert_eq!(fs::read(docs.join("keep.txt")).unwrap(), b"original");
    }

    #[test]
    fn test_invalid_names_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let store = test_store(&temp_dir);

        for name in ["", ".", "..", "../escape.txt", "a/b.txt", "a\\b.txt", "nul\0.txt"] {
            let result = store.begin(name, DownloadMode::Save);
            assert!(
                matches!(result, Err(StorageError::InvalidName { .. })),
                "{name:?}"
            );
        }

        // Rejected before any directory is created
        assert!(!temp_dir.path().join("documents").exists());
    }

    #[test]
    fn test_names_with_spaces_and_symbols_allowed() {
        let temp_dir = TempDir::new().unwrap();
        let store = test_store(&temp_dir);

        let path = store
            .write("Q3 report #1?.pdf", DownloadMode::Preview, b"x")
            .unwrap();
        assert!(path.ends_with("Q3 report #1?.pdf"));
    }

    #[test]
    fn test_unwritable_directory() {
        let temp_dir = TempDir::new().unwrap();
        // A regular file where the documents directory should be
        let blocker = temp_dir.path().join("documents");
        fs::write(&blocker, b"not a dir").unwrap();
        let store = test_store(&temp_dir);

        let result = store.write("a.txt", DownloadMode::Save, b"x");
        assert!(matches!(result, Err(StorageError::CreateDirectory { .. })));
    }

    #[test]
    fn test_failed_rename_keeps_existing_file() {
        let temp_dir = TempDir::new().unwrap();
        let target = temp_dir.path().join("report.txt");
        fs::write(&target, b"previous").unwrap();

        // Source vanished, so the rename fails with NotFound
        let missing = temp_dir.path().join(".docsync-gone.part");
        let result = replace_file(&missing, &target);

        assert!(matches!(
            result,
            Err(StorageError::AtomicWriteFailed { .. })
        ));
        assert_eq!(fs::read(&target).unwrap(), b"previous");
    }

    #[test]
    fn test_only_existing_target_refusals_retry() {
        use std::io::{Error, ErrorKind};

        assert!(refused_existing_target(&Error::from(ErrorKind::AlreadyExists)));
        assert!(!refused_existing_target(&Error::from(ErrorKind::NotFound)));
        assert_eq!(
            refused_existing_target(&Error::from(ErrorKind::PermissionDenied)),
            cfg!(windows)
        );
    }

    #[test]
    fn test_mode_display() {
        assert_eq!(DownloadMode::Preview.to_string(), "preview");
        assert_eq!(DownloadMode::Save.to_string(), "save");
    }
}
