//! The [`RefStore`] trait defining the reference storage interface.
//!
//! Backends provide raw read/write/delete/list of ref values. Resolution,
//! HEAD handling and the namespace listing are built on top of those four.

use bgit_types::ObjectId;

use crate::error::{RefError, Result};
use crate::names::validate_branch_name;
use crate::types::{Head, RefNode, RefTree, RefValue};

/// Longest chain of symbolic refs followed before giving up.
pub const MAX_SYMREF_DEPTH: usize = 5;

/// Storage backend for named references.
///
/// Names are full ref names (`HEAD`, `refs/heads/main`, ...). The namespace
/// follows git's layout:
///
/// - `refs/heads/*` for branches
/// - `refs/tags/*` for tags
/// - `refs/remotes/{remote}/*` for remote tracking refs
pub trait RefStore: Send + Sync {
    /// Read the stored value of a ref.
    ///
    /// Returns `Ok(None)` if the ref does not exist.
    fn read_ref(&self, name: &str) -> Result<Option<RefValue>>;

    /// Create or replace a ref.
    fn write_ref(&self, name: &str, value: &RefValue) -> Result<()>;

    /// Delete a ref. Returns `Ok(true)` if it existed.
    fn delete_ref(&self, name: &str) -> Result<bool>;

    /// All refs under `refs/` whose full name starts with `prefix`, sorted
    /// by name.
    fn list_refs(&self, prefix: &str) -> Result<Vec<(String, RefValue)>>;

    /// Follow `name` through symbolic refs to an object ID.
    ///
    /// Returns `Ok(None)` when any ref along the chain is absent.
    fn resolve(&self, name: &str) -> Result<Option<ObjectId>> {
        let mut current = name.to_string();
        for _ in 0..=MAX_SYMREF_DEPTH {
            match self.read_ref(&current)? {
                None => return Ok(None),
                Some(RefValue::Direct(id)) => return Ok(Some(id)),
                Some(RefValue::Symbolic(target)) => current = target,
            }
        }
        Err(RefError::SymbolicLoop {
            name: name.to_string(),
        })
    }

    /// Resolve an already-read value.
    fn resolve_value(&self, value: &RefValue) -> Result<Option<ObjectId>> {
        match value {
            RefValue::Direct(id) => Ok(Some(*id)),
            RefValue::Symbolic(target) => self.resolve(target),
        }
    }

    /// The refs below `path` (e.g. `refs` or `refs/heads`) as a tree
    /// mirroring the namespace, each leaf resolved to its ID.
    fn list(&self, path: &str) -> Result<RefTree> {
        let base = path.trim_end_matches('/');
        let prefix = format!("{base}/");
        let mut tree = RefTree::new();
        for (name, value) in self.list_refs(&prefix)? {
            let Some(relative) = name.strip_prefix(&prefix) else {
                continue;
            };
            let target = self.resolve_value(&value)?;
            insert(&mut tree, relative, target);
        }
        Ok(tree)
    }

    /// Read the current HEAD state. `Ok(None)` if HEAD is absent.
    fn head(&self) -> Result<Option<Head>> {
        Ok(self.read_ref("HEAD")?.map(Head::from))
    }

    /// Point HEAD at `refs/heads/<branch>`.
    fn set_head(&self, branch: &str) -> Result<()> {
        validate_branch_name(branch)?;
        self.write_ref("HEAD", &RefValue::Symbolic(format!("refs/heads/{branch}")))
    }

    /// Detach HEAD at `id`.
    fn set_head_detached(&self, id: ObjectId) -> Result<()> {
        self.write_ref("HEAD", &RefValue::Direct(id))
    }

    /// All branch refs.
    fn branches(&self) -> Result<Vec<(String, RefValue)>> {
        self.list_refs("refs/heads/")
    }

    /// All tag refs.
    fn tags(&self) -> Result<Vec<(String, RefValue)>> {
        self.list_refs("refs/tags/")
    }

    /// All known remote names.
    fn remotes(&self) -> Result<Vec<String>> {
        let refs = self.list_refs("refs/remotes/")?;
        let mut remotes: Vec<String> = refs
            .iter()
            .filter_map(|(name, _)| {
                let rest = name.strip_prefix("refs/remotes/")?;
                let remote = rest.split('/').next()?;
                Some(remote.to_string())
            })
            .collect();
        remotes.sort();
        remotes.dedup();
        Ok(remotes)
    }
}

fn insert(tree: &mut RefTree, relative: &str, target: Option<ObjectId>) {
    match relative.split_once('/') {
        None => {
            tree.insert(relative.to_string(), RefNode::Ref(target));
        }
        Some((dir, rest)) => {
            let node = tree
                .entry(dir.to_string())
                .or_insert_with(|| RefNode::Dir(RefTree::new()));
            if let RefNode::Dir(children) = node {
                insert(children, rest, target);
            }
        }
    }
}
