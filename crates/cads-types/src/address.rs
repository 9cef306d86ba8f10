use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Content address of a stored object, or a path beneath one.
///
/// An `Address` is opaque to everything except the store that issued it.
/// Stores that use a path-prefix convention hand out addresses of the form
/// `/<prefix>/<hash>` and accept `/<prefix>/<hash>/<file>` on reads; other
/// stores treat the whole string as the key.
#[derive(Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(String);

impl Address {
    /// Wrap a string as an address without validation.
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Parse an address, rejecting empty strings and embedded whitespace.
    pub fn parse(s: &str) -> Result<Self, TypeError> {
        if s.is_empty() {
            return Err(TypeError::EmptyAddress);
        }
        if s.chars().any(char::is_whitespace) {
            return Err(TypeError::InvalidAddress {
                address: s.to_string(),
                reason: "contains whitespace".into(),
            });
        }
        Ok(Self(s.to_string()))
    }

    /// Returns `true` for the empty address (no object).
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    /// The bare hash segment of this address under the given path prefix.
    ///
    /// Leading slashes and the `<prefix>/` scheme segment are stripped and
    /// anything after the first remaining `/` is dropped, so
    /// `/ipfs/QmFoo/structure.json` yields `QmFoo` for prefix `ipfs`.
    pub fn hash_segment(&self, prefix: &str) -> &str {
        let mut rest = self.0.trim_start_matches('/');
        if !prefix.is_empty() {
            if let Some(stripped) = rest
                .strip_prefix(prefix)
                .and_then(|r| r.strip_prefix('/'))
            {
                rest = stripped;
            }
        }
        rest.split('/').next().unwrap_or_default()
    }

    /// Append a path segment.
    pub fn join(&self, segment: &str) -> Self {
        let base = self.0.trim_end_matches('/');
        let segment = segment.trim_start_matches('/');
        Self(format!("{base}/{segment}"))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.0)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Address {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Address {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl AsRef<str> for Address {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
