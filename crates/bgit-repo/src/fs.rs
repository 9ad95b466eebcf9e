//! Whole-file replacement for persisted repository files.
//!
//! Objects, the staging index and references are never edited in place. A
//! writer stages the full contents in a temporary file next to the target,
//! flushes it, then renames it onto the final name, so a concurrent reader
//! sees either the old file or the new one and never a torn write.

use std::io::{self, Write};
use std::path::Path;

use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::{RepoError, RepoResult};

/// Atomically replace `path` with `data`.
///
/// The parent directory must already exist.
pub fn write_atomic(path: &Path, data: &[u8]) -> RepoResult<()> {
    let tmp = stage(path, data)?;
    tmp.persist(path).map_err(|e| RepoError::Io(e.error))?;
    debug!(path = %path.display(), len = data.len(), "replaced file");
    Ok(())
}

/// Atomically create `path` with `data` unless it already exists.
///
/// Returns `Ok(false)` when a file was already present (including one that
/// another writer renamed into place first); its contents are left alone.
pub fn write_new_atomic(path: &Path, data: &[u8]) -> RepoResult<bool> {
    if path.exists() {
        return Ok(false);
    }
    let tmp = stage(path, data)?;
    match tmp.persist_noclobber(path) {
        Ok(_) => Ok(true),
        Err(e) if e.error.kind() == io::ErrorKind::AlreadyExists => Ok(false),
        Err(e) => Err(RepoError::Io(e.error)),
    }
}

fn stage(path: &Path, data: &[u8]) -> RepoResult<NamedTempFile> {
    let parent = path
        .parent()
        .ok_or_else(|| RepoError::DirectoryConflict(path.to_path_buf()))?;
    let mut tmp = NamedTempFile::new_in(parent)?;
    tmp.write_all(data)?;
    tmp.as_file().sync_all()?;
    Ok(tmp)
}
