//! Core reference types.

use std::collections::BTreeMap;
use std::fmt;

use bgit_types::ObjectId;

use crate::error::{RefError, Result};

/// Prefix marking a symbolic ref's file content.
pub const SYMREF_PREFIX: &str = "ref: ";

/// The stored value of a reference.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RefValue {
    /// Points directly at an object.
    Direct(ObjectId),
    /// Points at another ref by full name (e.g. `refs/heads/master`).
    Symbolic(String),
}

impl RefValue {
    /// Parse ref file content. Surrounding whitespace is ignored.
    pub fn parse(name: &str, content: &str) -> Result<Self> {
        let trimmed = content.trim();
        if let Some(target) = trimmed.strip_prefix(SYMREF_PREFIX) {
            return Ok(Self::Symbolic(target.trim().to_string()));
        }
        ObjectId::from_hex(trimmed)
            .map(Self::Direct)
            .map_err(|_| RefError::Malformed {
                name: name.to_string(),
                content: content.to_string(),
            })
    }

    /// The symbolic target, if any.
    pub fn as_symbolic(&self) -> Option<&str> {
        match self {
            Self::Symbolic(target) => Some(target),
            Self::Direct(_) => None,
        }
    }
}

/// File form: `<hex>` or `ref: <name>`, without the trailing newline.
impl fmt::Display for RefValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Direct(id) => write!(f, "{}", id.to_hex()),
            Self::Symbolic(target) => write!(f, "{SYMREF_PREFIX}{target}"),
        }
    }
}

/// The state of HEAD: either symbolic (pointing to a branch) or detached.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Head {
    /// HEAD names a ref, normally `refs/heads/<branch>`.
    Symbolic(String),
    /// HEAD holds an object ID directly.
    Detached(ObjectId),
}

impl Head {
    /// The branch name when HEAD points into `refs/heads/`.
    pub fn branch(&self) -> Option<&str> {
        match self {
            Self::Symbolic(target) => target.strip_prefix("refs/heads/"),
            Self::Detached(_) => None,
        }
    }
}

impl From<RefValue> for Head {
    fn from(value: RefValue) -> Self {
        match value {
            RefValue::Direct(id) => Self::Detached(id),
            RefValue::Symbolic(target) => Self::Symbolic(target),
        }
    }
}

/// One level of the ref namespace, keyed by path component in sorted order.
pub type RefTree = BTreeMap<String, RefNode>;

/// A node in the ref namespace listing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RefNode {
    /// A ref file, resolved. `None` if its symbolic chain dangles.
    Ref(Option<ObjectId>),
    /// A directory of further refs.
    Dir(RefTree),
}

impl RefNode {
    /// Look up a `/`-separated path below this node.
    pub fn get(&self, path: &str) -> Option<&RefNode> {
        path.split('/').try_fold(self, |node, part| match node {
            Self::Dir(children) => children.get(part),
            Self::Ref(_) => None,
        })
    }

    /// The resolved ID, if this node is a ref.
    pub fn target(&self) -> Option<ObjectId> {
        match self {
            Self::Ref(id) => *id,
            Self::Dir(_) => None,
        }
    }
}
