//! In-memory reference store for testing and ephemeral use.
//!
//! [`InMemoryRefStore`] keeps refs in a `BTreeMap` behind a `RwLock`, so
//! listings come out sorted without extra work. It applies the same name
//! rules as the file store, including the ref/directory collision check.

use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock};

use crate::error::{RefError, Result};
use crate::names::validate_ref_name;
use crate::traits::RefStore;
use crate::types::RefValue;

/// An in-memory implementation of [`RefStore`].
#[derive(Debug, Default)]
pub struct InMemoryRefStore {
    refs: RwLock<BTreeMap<String, RefValue>>,
}

impl InMemoryRefStore {
    /// Create a new empty ref store.
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose HEAD points at `refs/heads/master`, like a fresh repository.
    pub fn with_default_head() -> Self {
        let store = Self::new();
        store
            .refs
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert("HEAD".into(), RefValue::Symbolic("refs/heads/master".into()));
        store
    }
}

impl RefStore for InMemoryRefStore {
    fn read_ref(&self, name: &str) -> Result<Option<RefValue>> {
        validate_ref_name(name)?;
        let refs = self.refs.read().unwrap_or_else(PoisonError::into_inner);
        Ok(refs.get(name).cloned())
    }

    fn write_ref(&self, name: &str, value: &RefValue) -> Result<()> {
        validate_ref_name(name)?;
        if let Some(target) = value.as_symbolic() {
            validate_ref_name(target)?;
        }

        let mut refs = self.refs.write().unwrap_or_else(PoisonError::into_inner);

        let below = format!("{name}/");
        if let Some(existing) = refs.keys().find(|k| k.starts_with(&below)) {
            return Err(RefError::NameConflict {
                name: name.to_string(),
                existing: existing.clone(),
            });
        }
        let mut ancestor = name;
        while let Some((parent, _)) = ancestor.rsplit_once('/') {
            if refs.contains_key(parent) {
                return Err(RefError::NameConflict {
                    name: name.to_string(),
                    existing: parent.to_string(),
                });
            }
            ancestor = parent;
        }

        refs.insert(name.to_string(), value.clone());
        Ok(())
    }

    fn delete_ref(&self, name: &str) -> Result<bool> {
        validate_ref_name(name)?;
        let mut refs = self.refs.write().unwrap_or_else(PoisonError::into_inner);
        Ok(refs.remove(name).is_some())
    }

    fn list_refs(&self, prefix: &str) -> Result<Vec<(String, RefValue)>> {
        let refs = self.refs.read().unwrap_or_else(PoisonError::into_inner);
        Ok(refs
            .iter()
            .filter(|(k, _)| k.starts_with("refs/") && k.starts_with(prefix))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect())
    }
}
