//! Repository configuration.
//!
//! The `config` file is INI-style:
//!
//! ```text
//! [core]
//!     repositoryformatversion = 0
//!     filemode = false
//! [remote "origin"]
//!     url = https://example.com/repo.git
//! ```
//!
//! Section and key names are case-insensitive and stored lowercased. A
//! subsection header `[remote "origin"]` is addressed as `remote.origin`.
//! Sections and keys keep their file order so a parsed config writes back in
//! the same shape.

use std::fmt;

use crate::error::{RepoError, RepoResult};

/// One `[section]` and its key/value pairs in file order.
#[derive(Clone, Debug, PartialEq, Eq)]
struct Section {
    name: String,
    entries: Vec<(String, String)>,
}

/// Parsed repository configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RepoConfig {
    sections: Vec<Section>,
}

impl RepoConfig {
    /// An empty configuration (no sections).
    pub fn empty() -> Self {
        Self {
            sections: Vec::new(),
        }
    }

    /// Parse the text of a `config` file.
    pub fn parse(text: &str) -> RepoResult<Self> {
        let mut config = Self::empty();
        let mut current: Option<String> = None;

        for (idx, line) in text.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with(';') {
                continue;
            }

            if let Some(header) = trimmed.strip_prefix('[') {
                let header = header.strip_suffix(']').ok_or_else(|| RepoError::InvalidConfig {
                    line: idx + 1,
                    reason: "unterminated section header".into(),
                })?;
                let name = section_name(header).ok_or_else(|| RepoError::InvalidConfig {
                    line: idx + 1,
                    reason: format!("bad section header: [{header}]"),
                })?;
                config.section_mut(&name);
                current = Some(name);
                continue;
            }

            let section = current.as_deref().ok_or_else(|| RepoError::InvalidConfig {
                line: idx + 1,
                reason: "key outside of any section".into(),
            })?;

            // A bare key is a boolean `true`.
            let (key, value) = match trimmed.split_once('=') {
                Some((k, v)) => (k.trim(), v.trim().trim_matches('"')),
                None => (trimmed, "true"),
            };
            if key.is_empty() {
                return Err(RepoError::InvalidConfig {
                    line: idx + 1,
                    reason: "empty key".into(),
                });
            }
            let section = section.to_string();
            config.set(&section, key, value);
        }

        Ok(config)
    }

    /// Look up a value by section (`core`, `remote.origin`) and key.
    pub fn get(&self, section: &str, key: &str) -> Option<&str> {
        let section = section.to_ascii_lowercase();
        let key = key.to_ascii_lowercase();
        self.sections
            .iter()
            .find(|s| s.name == section)?
            .entries
            .iter()
            .rev()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Look up a boolean value (`true`/`yes`/`on`/`1` and their negations).
    pub fn get_bool(&self, section: &str, key: &str) -> Option<bool> {
        match self.get(section, key)?.to_ascii_lowercase().as_str() {
            "true" | "yes" | "on" | "1" => Some(true),
            "false" | "no" | "off" | "0" | "" => Some(false),
            _ => None,
        }
    }

    /// Set a value, replacing an existing key in the same section.
    pub fn set(&mut self, section: &str, key: &str, value: &str) {
        let key = key.to_ascii_lowercase();
        let entries = &mut self.section_mut(&section.to_ascii_lowercase()).entries;
        match entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, v)) => *v = value.to_string(),
            None => entries.push((key, value.to_string())),
        }
    }

    /// The `core.repositoryformatversion` value.
    ///
    /// A missing key reads as version 0, matching git.
    pub fn format_version(&self) -> RepoResult<u32> {
        match self.get("core", "repositoryformatversion") {
            None => Ok(0),
            Some(raw) => raw
                .parse()
                .map_err(|_| RepoError::UnsupportedFormatVersion(raw.to_string())),
        }
    }

    /// Whether `core.bare` is set.
    pub fn is_bare(&self) -> bool {
        self.get_bool("core", "bare").unwrap_or(false)
    }

    fn section_mut(&mut self, name: &str) -> &mut Section {
        let pos = match self.sections.iter().position(|s| s.name == name) {
            Some(pos) => pos,
            None => {
                self.sections.push(Section {
                    name: name.to_string(),
                    entries: Vec::new(),
                });
                self.sections.len() - 1
            }
        };
        &mut self.sections[pos]
    }
}

impl Default for RepoConfig {
    /// The configuration written by a freshly created repository.
    fn default() -> Self {
        let mut config = Self::empty();
        config.set("core", "repositoryformatversion", "0");
        config.set("core", "filemode", "false");
        config.set("core", "bare", "false");
        config
    }
}

impl fmt::Display for RepoConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for section in &self.sections {
            match section.name.split_once('.') {
                Some((name, sub)) => writeln!(f, "[{name} \"{sub}\"]")?,
                None => writeln!(f, "[{}]", section.name)?,
            }
            for (key, value) in &section.entries {
                writeln!(f, "\t{key} = {value}")?;
            }
        }
        Ok(())
    }
}

/// Turn `core` or `remote "origin"` into `core` / `remote.origin`.
fn section_name(header: &str) -> Option<String> {
    let header = header.trim();
    match header.split_once(char::is_whitespace) {
        None if !header.is_empty() => Some(header.to_ascii_lowercase()),
        None => None,
        Some((name, sub)) => {
            let sub = sub.trim().strip_prefix('"')?.strip_suffix('"')?;
            Some(format!("{}.{sub}", name.to_ascii_lowercase()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
# local settings
[core]
    repositoryformatversion = 0
    filemode = true
    bare = false
    logallrefupdates

[remote "origin"]
    url = https://example.com/repo.git
    fetch = +refs/heads/*:refs/remotes/origin/*
"#;

    #[test]
    fn parse_sections_and_subsections() {
        let config = RepoConfig::parse(SAMPLE).unwrap();
        assert_eq!(config.format_version().unwrap(), 0);
        assert_eq!(config.get_bool("core", "filemode"), Some(true));
        assert_eq!(config.get_bool("core", "logallrefupdates"), Some(true));
        assert!(!config.is_bare());
        assert_eq!(
            config.get("remote.origin", "url"),
            Some("https://example.com/repo.git")
        );
    }

    #[test]
    fn keys_are_case_insensitive() {
        let config = RepoConfig::parse("[Core]\nRepositoryFormatVersion = 0\n").unwrap();
        assert_eq!(config.get("core", "repositoryformatversion"), Some("0"));
        assert_eq!(config.get("CORE", "REPOSITORYFORMATVERSION"), Some("0"));
    }

    #[test]
    fn default_config_roundtrips_through_text() {
        let config = RepoConfig::default();
        let text = config.to_string();
        assert!(text.starts_with("[core]\n\trepositoryformatversion = 0\n"));
        assert_eq!(RepoConfig::parse(&text).unwrap(), config);
    }

    #[test]
    fn non_numeric_version_is_unsupported() {
        let config = RepoConfig::parse("[core]\nrepositoryformatversion = one\n").unwrap();
        assert!(matches!(
            config.format_version(),
            Err(RepoError::UnsupportedFormatVersion(v)) if v == "one"
        ));
    }

    #[test]
    fn missing_version_reads_as_zero() {
        let config = RepoConfig::parse("[core]\nbare = true\n").unwrap();
        assert_eq!(config.format_version().unwrap(), 0);
        assert!(config.is_bare());
    }

    #[test]
    fn key_outside_section_is_rejected() {
        let err = RepoConfig::parse("bare = true\n").unwrap_err();
        assert!(matches!(err, RepoError::InvalidConfig { line: 1, .. }));
    }

    #[test]
    fn unterminated_header_is_rejected() {
        let err = RepoConfig::parse("[core\n").unwrap_err();
        assert!(matches!(err, RepoError::InvalidConfig { line: 1, .. }));
    }

    #[test]
    fn set_replaces_existing_value() {
        let mut config = RepoConfig::default();
        config.set("core", "bare", "true");
        assert!(config.is_bare());
        assert_eq!(config.to_string().matches("bare").count(), 1);
    }
}
