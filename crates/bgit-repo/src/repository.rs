use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::config::RepoConfig;
use crate::error::{RepoError, RepoResult};
use crate::fs::write_atomic;

/// Name of the metadata directory inside a worktree.
pub const METADATA_DIR: &str = ".git";

/// The only `core.repositoryformatversion` this engine understands.
pub const SUPPORTED_FORMAT_VERSION: u32 = 0;

const DEFAULT_DESCRIPTION: &str =
    "Unnamed repository; edit this file 'description' to name the repository.\n";

/// A repository: worktree root, metadata directory, and parsed config.
///
/// Holds no mutable state. Path helpers resolve names relative to the
/// metadata directory and optionally create missing directories.
#[derive(Clone, Debug)]
pub struct Repository {
    worktree: PathBuf,
    git_dir: PathBuf,
    config: RepoConfig,
}

impl Repository {
    /// Open the repository whose worktree root is `worktree`.
    ///
    /// Fails unless `worktree/.git` is a directory holding a `config` whose
    /// format version is [`SUPPORTED_FORMAT_VERSION`].
    pub fn open(worktree: impl AsRef<Path>) -> RepoResult<Self> {
        let worktree = worktree.as_ref().to_path_buf();
        let git_dir = worktree.join(METADATA_DIR);
        if !git_dir.is_dir() {
            return Err(RepoError::NotARepository(worktree));
        }

        let config_path = git_dir.join("config");
        if !config_path.is_file() {
            return Err(RepoError::MissingConfig(config_path));
        }
        let config = RepoConfig::parse(&fs::read_to_string(&config_path)?)?;

        let version = config.format_version()?;
        if version != SUPPORTED_FORMAT_VERSION {
            return Err(RepoError::UnsupportedFormatVersion(version.to_string()));
        }

        debug!(worktree = %worktree.display(), "opened repository");
        Ok(Self {
            worktree,
            git_dir,
            config,
        })
    }

    /// Create a new repository at `worktree`.
    ///
    /// The worktree directory is created if absent. Fails if it exists but
    /// is not a directory, or if its metadata directory is already populated.
    pub fn create(worktree: impl AsRef<Path>) -> RepoResult<Self> {
        let worktree = worktree.as_ref().to_path_buf();
        let git_dir = worktree.join(METADATA_DIR);

        if worktree.exists() {
            if !worktree.is_dir() {
                return Err(RepoError::DirectoryConflict(worktree));
            }
            if git_dir.exists() && fs::read_dir(&git_dir)?.next().is_some() {
                return Err(RepoError::NotEmpty(git_dir));
            }
        }
        fs::create_dir_all(&git_dir)?;

        let repo = Self {
            worktree,
            git_dir,
            config: RepoConfig::default(),
        };

        repo.dir(&["branches"], true)?;
        repo.dir(&["objects"], true)?;
        repo.dir(&["refs", "tags"], true)?;
        repo.dir(&["refs", "heads"], true)?;

        write_atomic(&repo.path(&["description"]), DEFAULT_DESCRIPTION.as_bytes())?;
        write_atomic(&repo.path(&["HEAD"]), b"ref: refs/heads/master\n")?;
        write_atomic(&repo.path(&["config"]), repo.config.to_string().as_bytes())?;

        info!(git_dir = %repo.git_dir.display(), "initialized empty repository");
        Ok(repo)
    }

    /// Find the repository containing `start`, walking up parent directories.
    pub fn discover(start: impl AsRef<Path>) -> RepoResult<Self> {
        let start = fs::canonicalize(start.as_ref())?;
        let mut current = start.as_path();
        loop {
            if current.join(METADATA_DIR).is_dir() {
                return Self::open(current);
            }
            match current.parent() {
                Some(parent) => current = parent,
                None => return Err(RepoError::NotARepository(start)),
            }
        }
    }

    /// The worktree root.
    pub fn worktree(&self) -> &Path {
        &self.worktree
    }

    /// The metadata directory (`<worktree>/.git`).
    pub fn git_dir(&self) -> &Path {
        &self.git_dir
    }

    /// The parsed configuration.
    pub fn config(&self) -> &RepoConfig {
        &self.config
    }

    /// Path of `parts` under the metadata directory. Pure; touches nothing.
    pub fn path(&self, parts: &[&str]) -> PathBuf {
        parts.iter().fold(self.git_dir.clone(), |acc, p| acc.join(p))
    }

    /// Directory `parts` under the metadata directory.
    ///
    /// Returns `Ok(None)` if absent and `mkdir` is false. Fails with
    /// [`RepoError::DirectoryConflict`] if the path exists as a non-directory.
    pub fn dir(&self, parts: &[&str], mkdir: bool) -> RepoResult<Option<PathBuf>> {
        let path = self.path(parts);
        if path.exists() {
            if path.is_dir() {
                return Ok(Some(path));
            }
            return Err(RepoError::DirectoryConflict(path));
        }
        if mkdir {
            fs::create_dir_all(&path)?;
            Ok(Some(path))
        } else {
            Ok(None)
        }
    }

    /// File `parts` under the metadata directory.
    ///
    /// Ensures the parent directory exists (creating it when `mkdir` is set).
    /// Returns `Ok(None)` if the parent is absent and `mkdir` is false.
    pub fn file(&self, parts: &[&str], mkdir: bool) -> RepoResult<Option<PathBuf>> {
        let Some((_, parent)) = parts.split_last() else {
            return Ok(Some(self.git_dir.clone()));
        };
        Ok(self.dir(parent, mkdir)?.map(|_| self.path(parts)))
    }
}

impl std::fmt::Display for Repository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "<Repository path={}>", self.worktree.display())
    }
}
