//! Case-insensitive header names.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use crate::ensure;
use crate::protocol::HeaderError;
use crate::protocol::grammar::is_valid_name;

/// A validated header name.
///
/// The casing supplied by the caller is kept for rendering, while equality and hashing
/// ignore ASCII case, so `Content-Type` and `content-type` name the same header.
#[derive(Debug, Clone, Eq)]
pub struct HeaderName {
    inner: Box<str>,
}

impl HeaderName {
    /// Validates `name` against the RFC 7230 token grammar.
    ///
    /// # Errors
    ///
    /// Returns [`HeaderError::InvalidHeaderName`] for an empty name or one containing
    /// separators, whitespace or non-ASCII characters.
    pub fn new(name: &str) -> Result<Self, HeaderError> {
        ensure!(is_valid_name(name), HeaderError::invalid_name(name));
        Ok(Self { inner: name.into() })
    }

    /// The name in its original casing.
    pub fn as_str(&self) -> &str {
        &self.inner
    }

    /// The ASCII-lowercase form used for lookups.
    pub fn to_lowercase(&self) -> String {
        self.inner.to_ascii_lowercase()
    }

    /// Compares against a plain string without allocating.
    pub fn matches(&self, name: &str) -> bool {
        self.inner.eq_ignore_ascii_case(name)
    }
}

impl PartialEq for HeaderName {
    fn eq(&self, other: &Self) -> bool {
        self.matches(&other.inner)
    }
}

impl PartialEq<str> for HeaderName {
    fn eq(&self, other: &str) -> bool {
        self.matches(other)
    }
}

impl PartialEq<&str> for HeaderName {
    fn eq(&self, other: &&str) -> bool {
        self.matches(other)
    }
}

impl Hash for HeaderName {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for b in self.inner.bytes() {
            state.write_u8(b.to_ascii_lowercase());
        }
        state.write_u8(0xff);
    }
}

impl AsRef<str> for HeaderName {
    fn as_ref(&self) -> &str {
        &self.inner
    }
}

impl fmt::Display for HeaderName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.inner)
    }
}

impl FromStr for HeaderName {
    type Err = HeaderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<&str> for HeaderName {
    type Error = HeaderError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<String> for HeaderName {
    type Error = HeaderError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        ensure!(is_valid_name(&value), HeaderError::invalid_name(value));
        Ok(Self { inner: value.into_boxed_str() })
    }
}
