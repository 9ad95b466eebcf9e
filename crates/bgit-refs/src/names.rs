//! Ref name validation following git-style conventions.
//!
//! Every `/`-separated component of a name:
//! - Must be non-empty and must not start with `.`
//! - Must not end with `.lock`
//!
//! The whole name:
//! - Must not contain whitespace, `~`, `^`, `:`, `?`, `*`, `[`, `\` or NUL
//! - Must not contain `..` or `@{`
//! - Must not start or end with `/`, nor end with `.`
//!
//! Full ref names additionally live under `refs/`, except for all-caps
//! pseudo-refs such as `HEAD`.

use crate::error::{RefError, Result};

/// Characters that are forbidden anywhere in a name.
const FORBIDDEN_CHARS: &[char] = &[
    ' ', '\t', '\n', '\r', '\0', '~', '^', ':', '?', '*', '[', '\\',
];

fn reject(name: &str, reason: impl Into<String>) -> RefError {
    RefError::InvalidName {
        name: name.to_string(),
        reason: reason.into(),
    }
}

fn check_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(reject(name, "must not be empty"));
    }
    if let Some(ch) = name.chars().find(|c| FORBIDDEN_CHARS.contains(c)) {
        return Err(reject(name, format!("contains forbidden character: {ch:?}")));
    }
    if name.contains("..") {
        return Err(reject(name, "must not contain '..'"));
    }
    if name.contains("@{") {
        return Err(reject(name, "must not contain '@{'"));
    }
    if name.starts_with('/') || name.ends_with('/') {
        return Err(reject(name, "must not start or end with '/'"));
    }
    if name.ends_with('.') {
        return Err(reject(name, "must not end with '.'"));
    }
    for component in name.split('/') {
        if component.is_empty() {
            return Err(reject(name, "path components must not be empty"));
        }
        if component.starts_with('.') {
            return Err(reject(name, format!("component must not start with '.': {component:?}")));
        }
        if component.ends_with(".lock") {
            return Err(reject(name, format!("component must not end with '.lock': {component:?}")));
        }
    }
    Ok(())
}

fn is_pseudo_ref(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_ascii_uppercase() || c == '_')
}

/// Validate a full ref name such as `refs/heads/main` or `HEAD`.
///
/// # Examples
///
/// ```
/// use bgit_refs::names::validate_ref_name;
///
/// assert!(validate_ref_name("HEAD").is_ok());
/// assert!(validate_ref_name("refs/tags/v1.0").is_ok());
/// assert!(validate_ref_name("heads/main").is_err());
/// assert!(validate_ref_name("refs/heads/../config").is_err());
/// ```
pub fn validate_ref_name(name: &str) -> Result<()> {
    if is_pseudo_ref(name) {
        return Ok(());
    }
    if !name.starts_with("refs/") {
        return Err(reject(name, "must be HEAD-like or start with 'refs/'"));
    }
    check_name(name)
}

/// Validate a short branch name (the part after `refs/heads/`).
pub fn validate_branch_name(name: &str) -> Result<()> {
    check_name(name)?;
    if name == "HEAD" {
        return Err(reject(name, "'HEAD' is not a valid branch name"));
    }
    Ok(())
}

/// Validate a short tag name. Same rules as branch names.
pub fn validate_tag_name(name: &str) -> Result<()> {
    check_name(name)
}

/// Validate a remote name. Must be a single component.
pub fn validate_remote_name(name: &str) -> Result<()> {
    check_name(name)?;
    if name.contains('/') {
        return Err(reject(name, "remote name must not contain '/'"));
    }
    Ok(())
}
