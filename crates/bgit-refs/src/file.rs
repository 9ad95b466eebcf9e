//! On-disk reference store.
//!
//! Each ref is a file at `<git_dir>/<name>`; its content is `<hex>\n` or
//! `ref: <name>\n`. Writes replace the file atomically.

use std::fs;
use std::path::{Path, PathBuf};

use bgit_repo::{write_atomic, Repository};
use tracing::{debug, trace};
use walkdir::WalkDir;

use crate::error::{RefError, Result};
use crate::names::validate_ref_name;
use crate::traits::RefStore;
use crate::types::RefValue;

/// Reference store backed by the repository's metadata directory.
#[derive(Clone, Debug)]
pub struct FileRefStore {
    repo: Repository,
}

impl FileRefStore {
    pub fn new(repo: &Repository) -> Self {
        Self { repo: repo.clone() }
    }

    /// Path of the file holding `name`. The name must already be validated.
    fn ref_path(&self, name: &str) -> PathBuf {
        let parts: Vec<&str> = name.split('/').collect();
        self.repo.path(&parts)
    }

    fn name_of(&self, path: &Path) -> Option<String> {
        let relative = path.strip_prefix(self.repo.git_dir()).ok()?;
        let parts: Option<Vec<&str>> = relative.components().map(|c| c.as_os_str().to_str()).collect();
        Some(parts?.join("/"))
    }
}

impl RefStore for FileRefStore {
    fn read_ref(&self, name: &str) -> Result<Option<RefValue>> {
        validate_ref_name(name)?;
        let path = self.ref_path(name);
        if !path.is_file() {
            trace!(name, "ref absent");
            return Ok(None);
        }
        let content = fs::read_to_string(&path)?;
        RefValue::parse(name, &content).map(Some)
    }

    fn write_ref(&self, name: &str, value: &RefValue) -> Result<()> {
        validate_ref_name(name)?;
        if let Some(target) = value.as_symbolic() {
            validate_ref_name(target)?;
        }

        let parts: Vec<&str> = name.split('/').collect();
        let path = self
            .repo
            .file(&parts, true)?
            .unwrap_or_else(|| self.ref_path(name));
        if path.is_dir() {
            return Err(RefError::NameConflict {
                name: name.to_string(),
                existing: format!("{name}/"),
            });
        }

        write_atomic(&path, format!("{value}\n").as_bytes())?;
        debug!(name, value = %value, "updated ref");
        Ok(())
    }

    fn delete_ref(&self, name: &str) -> Result<bool> {
        validate_ref_name(name)?;
        let path = self.ref_path(name);
        if !path.is_file() {
            return Ok(false);
        }
        fs::remove_file(&path)?;
        debug!(name, "deleted ref");
        Ok(true)
    }

    fn list_refs(&self, prefix: &str) -> Result<Vec<(String, RefValue)>> {
        let root = self.repo.path(&["refs"]);
        if !root.is_dir() {
            return Ok(Vec::new());
        }

        let mut refs = Vec::new();
        for entry in WalkDir::new(&root).sort_by_file_name() {
            let entry = entry.map_err(|e| {
                RefError::Io(
                    e.into_io_error()
                        .unwrap_or_else(|| std::io::Error::other("ref walk failed")),
                )
            })?;
            if !entry.file_type().is_file() {
                continue;
            }
            let Some(name) = self.name_of(entry.path()) else {
                continue;
            };
            // Temp files from in-flight writes and other debris.
            if validate_ref_name(&name).is_err() || !name.starts_with(prefix) {
                continue;
            }
            let content = fs::read_to_string(entry.path())?;
            refs.push((name.clone(), RefValue::parse(&name, &content)?));
        }
        Ok(refs)
    }
}
