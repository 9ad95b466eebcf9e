use std::fmt;

use bgit_store::{Commit, ObjectKind};
use bgit_types::ObjectId;
use serde::Serialize;

/// One line of a tree listing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TreeListing {
    /// Six-digit octal mode (`040000`, `100644`, ...).
    pub mode: String,
    pub kind: ObjectKind,
    pub id: ObjectId,
    /// Path relative to the listed tree, `/`-separated.
    pub path: String,
}

impl fmt::Display for TreeListing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}\t{}", self.mode, self.kind, self.id, self.path)
    }
}

/// A commit reached while walking history.
#[derive(Clone, Debug)]
pub struct LogEntry {
    pub id: ObjectId,
    pub commit: Commit,
}

impl LogEntry {
    /// First line of the commit message.
    pub fn summary(&self) -> String {
        let message = String::from_utf8_lossy(self.commit.message());
        message.lines().next().unwrap_or_default().to_string()
    }
}
