//! Key-value list with message: the body format of commits and tags.
//!
//! ```text
//! tree 29ff16c9c14e2652b22f8b78bb08a5a07930c147
//! parent 206941306e8a8af65b66eaaaea388a7ae24d49a0
//! author Jane <jane@example.com> 1527025023 +0200
//! gpgsig -----BEGIN PGP SIGNATURE-----
//!  <continuation lines start with one space>
//!
//! Free-text message
//! ```
//!
//! Headers are an ordered multi-map: a key may repeat (merge commits carry
//! several `parent` lines) and both key order and per-key value order are
//! preserved. A blank line ends the headers; everything after it is the
//! message, verbatim.

use crate::error::{StoreError, StoreResult};

/// Ordered multi-map of header values plus a trailing message.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Kvlm {
    headers: Vec<(Vec<u8>, Vec<Vec<u8>>)>,
    message: Vec<u8>,
}

impl Kvlm {
    /// Create an empty header block with an empty message.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a header block and message.
    pub fn parse(raw: &[u8]) -> StoreResult<Self> {
        let mut kvlm = Self::new();
        let mut start = 0;

        loop {
            if start >= raw.len() {
                // No blank line: headers only, empty message.
                return Ok(kvlm);
            }

            let space = find(raw, b' ', start);
            let newline = find(raw, b'\n', start);

            let boundary = match (space, newline) {
                (None, _) => true,
                (Some(s), Some(n)) => n < s,
                (Some(_), None) => false,
            };
            if boundary {
                if newline != Some(start) {
                    return Err(StoreError::Malformed(format!(
                        "header line without value at offset {start}"
                    )));
                }
                kvlm.message = raw[start + 1..].to_vec();
                return Ok(kvlm);
            }

            // `boundary` is false only when a space exists.
            let space = space.unwrap_or(start);
            let key = raw[start..space].to_vec();

            // The value ends at the first newline not followed by a space.
            let mut end = start;
            loop {
                end = find(raw, b'\n', end + 1).ok_or_else(|| {
                    StoreError::Malformed(format!("unterminated header value at offset {start}"))
                })?;
                if raw.get(end + 1) != Some(&b' ') {
                    break;
                }
            }

            let value = replace(&raw[space + 1..end], b"\n ", b"\n");
            kvlm.push(key, value);
            start = end + 1;
        }
    }

    /// Serialize headers (in insertion order) followed by a blank line and
    /// the message.
    pub fn serialize(&self) -> Vec<u8> {
        let mut out = Vec::new();
        for (key, values) in &self.headers {
            for value in values {
                out.extend_from_slice(key);
                out.push(b' ');
                out.extend_from_slice(&replace(value, b"\n", b"\n "));
                out.push(b'\n');
            }
        }
        out.push(b'\n');
        out.extend_from_slice(&self.message);
        out
    }

    /// First value for `key`.
    pub fn get(&self, key: &[u8]) -> Option<&[u8]> {
        self.get_all(key).first().map(Vec::as_slice)
    }

    /// All values for `key`, in order. Empty if the key is absent.
    pub fn get_all(&self, key: &[u8]) -> &[Vec<u8>] {
        self.headers
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_slice())
            .unwrap_or(&[])
    }

    /// Append a value to `key`. A new key goes after all existing keys.
    pub fn push(&mut self, key: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) {
        let key = key.into();
        let value = value.into();
        match self.headers.iter_mut().find(|(k, _)| *k == key) {
            Some((_, values)) => values.push(value),
            None => self.headers.push((key, vec![value])),
        }
    }

    /// Replace every value of `key` with a single value, keeping the key's
    /// position if it already exists.
    pub fn set(&mut self, key: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) {
        let key = key.into();
        let value = value.into();
        match self.headers.iter_mut().find(|(k, _)| *k == key) {
            Some((_, values)) => *values = vec![value],
            None => self.headers.push((key, vec![value])),
        }
    }

    /// Header keys in order.
    pub fn keys(&self) -> impl Iterator<Item = &[u8]> {
        self.headers.iter().map(|(k, _)| k.as_slice())
    }

    /// The free-text message.
    pub fn message(&self) -> &[u8] {
        &self.message
    }

    /// Replace the free-text message.
    pub fn set_message(&mut self, message: impl Into<Vec<u8>>) {
        self.message = message.into();
    }
}

fn find(haystack: &[u8], needle: u8, from: usize) -> Option<usize> {
    haystack
        .get(from..)?
        .iter()
        .position(|&b| b == needle)
        .map(|p| p + from)
}

fn replace(haystack: &[u8], from: &[u8], to: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(haystack.len());
    let mut i = 0;
    while i < haystack.len() {
        if haystack[i..].starts_with(from) {
            out.extend_from_slice(to);
            i += from.len();
        } else {
            out.push(haystack[i]);
            i += 1;
        }
    }
    out
}
