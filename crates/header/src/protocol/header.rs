//! A single header entry and its wire rendering.
//!
//! A [`Header`] always holds a validated name and a validated value, so it is renderable
//! as soon as it exists. Structured headers may carry their value either as the raw bytes
//! they were built from or as parameter groups; raw bytes are only parsed when the groups
//! are asked for, and are written back untouched until the header is mutated.
//!
//! Raw values are bytes, not text: obs-text (`0x80..=0xFE`) found in older 8-bit values
//! passes validation and is written back byte for byte. [`Header::value`] gives a lossy
//! text view, [`Header::to_str`] a strict one.

use std::borrow::Cow;
use std::fmt;

use bytes::Bytes;
use tracing::warn;

use crate::ensure;
use crate::protocol::grammar::{filter_value_bytes, is_valid_value, parse_label_value, trim_ows_bytes, unfold};
use crate::protocol::params::{is_valid_cookie_group, join_cookie_params, join_params, parse_cookie_params, parse_params};
use crate::protocol::{HeaderError, HeaderName, ParamGroup};

/// The representation a header name maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HeaderKind {
    /// Free-form value, never interpreted.
    Opaque,
    /// `key=value; flag` parameter groups.
    Structured,
    /// Structured, with the [`SetCookie`](crate::protocol::SetCookie) view.
    SetCookie,
    /// Structured, with the [`ContentType`](crate::protocol::ContentType) view.
    ContentType,
}

impl HeaderKind {
    pub fn is_structured(self) -> bool {
        !matches!(self, HeaderKind::Opaque)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            HeaderKind::Opaque => "opaque",
            HeaderKind::Structured => "structured",
            HeaderKind::SetCookie => "set-cookie",
            HeaderKind::ContentType => "content-type",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Value {
    Raw(Bytes),
    Params(Vec<ParamGroup>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    name: HeaderName,
    kind: HeaderKind,
    value: Value,
}

impl Header {
    /// Builds an opaque header from a name and a raw value.
    ///
    /// # Errors
    ///
    /// [`HeaderError::InvalidHeaderName`] or [`HeaderError::InvalidHeaderValue`].
    pub fn new<V: AsRef<[u8]>>(name: &str, value: V) -> Result<Self, HeaderError> {
        Self::with_kind(name, value, HeaderKind::Opaque)
    }

    /// Builds a header of the given kind from raw bytes without parsing them.
    pub fn with_kind<V: AsRef<[u8]>>(name: &str, value: V, kind: HeaderKind) -> Result<Self, HeaderError> {
        let name = HeaderName::new(name)?;
        let value = checked_value(&name, value.as_ref())?;
        Ok(Self { name, kind, value: Value::Raw(value) })
    }

    /// Builds a structured header directly from parameter groups.
    pub fn structured(name: &str, params: Vec<ParamGroup>) -> Result<Self, HeaderError> {
        Self::structured_with_kind(name, params, HeaderKind::Structured)
    }

    pub(crate) fn structured_with_kind(name: &str, params: Vec<ParamGroup>, kind: HeaderKind) -> Result<Self, HeaderError> {
        let name = HeaderName::new(name)?;
        check_params(&name, kind, &params)?;
        Ok(Self { name, kind, value: Value::Params(params) })
    }

    /// Parses a `Name: value` line into an opaque header.
    ///
    /// Use [`HeaderFactory`](crate::HeaderFactory) to get the kind registered for the name.
    pub fn from_line(line: &str) -> Result<Self, HeaderError> {
        let (name, value) = parse_label_value(line)?;
        Self::new(name, value)
    }

    pub fn name(&self) -> &HeaderName {
        &self.name
    }

    pub fn kind(&self) -> HeaderKind {
        self.kind
    }

    pub fn is_structured(&self) -> bool {
        self.kind.is_structured()
    }

    /// Replaces the label, keeping the value and the kind.
    pub fn set_label(&mut self, name: &str) -> Result<(), HeaderError> {
        self.name = HeaderName::new(name)?;
        Ok(())
    }

    /// Replaces the value with raw bytes; the header is left unchanged on error.
    pub fn set_value<V: AsRef<[u8]>>(&mut self, value: V) -> Result<(), HeaderError> {
        self.value = Value::Raw(checked_value(&self.name, value.as_ref())?);
        Ok(())
    }

    /// Replaces the value of a structured header with parameter groups.
    ///
    /// `Set-Cookie` headers take a single group following the cookie grammar.
    ///
    /// # Errors
    ///
    /// [`HeaderError::InvalidHeaderType`] for an opaque header,
    /// [`HeaderError::InvalidHeaderValue`] if a key or the joined value is not allowed.
    pub fn set_params(&mut self, params: Vec<ParamGroup>) -> Result<(), HeaderError> {
        ensure!(self.is_structured(), HeaderError::invalid_type(&self.name, HeaderKind::Structured.as_str()));
        check_params(&self.name, self.kind, &params)?;
        self.value = Value::Params(params);
        Ok(())
    }

    /// Parameter groups of a structured header, `None` for an opaque one.
    ///
    /// Raw values that are not UTF-8 are parsed from their lossy text form.
    pub fn params(&self) -> Option<Cow<'_, [ParamGroup]>> {
        if !self.is_structured() {
            return None;
        }
        Some(match &self.value {
            Value::Raw(raw) if self.kind == HeaderKind::SetCookie => Cow::Owned(parse_cookie_params(&String::from_utf8_lossy(raw))),
            Value::Raw(raw) => Cow::Owned(parse_params(&String::from_utf8_lossy(raw))),
            Value::Params(params) => Cow::Borrowed(params.as_slice()),
        })
    }

    /// The value as it will be written, before the output filter.
    pub fn value_bytes(&self) -> Cow<'_, [u8]> {
        match &self.value {
            Value::Raw(raw) => Cow::Borrowed(raw.as_ref()),
            Value::Params(params) => Cow::Owned(join_for(self.kind, params).into_bytes()),
        }
    }

    /// The value as text; obs-text bytes that are not UTF-8 become `U+FFFD`.
    pub fn value(&self) -> Cow<'_, str> {
        match &self.value {
            Value::Raw(raw) => String::from_utf8_lossy(raw),
            Value::Params(params) => Cow::Owned(join_for(self.kind, params)),
        }
    }

    /// The value as text.
    ///
    /// # Errors
    ///
    /// [`HeaderError::InvalidHeaderValue`] if the raw value is not UTF-8.
    pub fn to_str(&self) -> Result<Cow<'_, str>, HeaderError> {
        match &self.value {
            Value::Raw(raw) => std::str::from_utf8(raw)
                .map(Cow::Borrowed)
                .map_err(|_| HeaderError::invalid_value(&self.name, String::from_utf8_lossy(raw))),
            Value::Params(params) => Ok(Cow::Owned(join_for(self.kind, params))),
        }
    }

    /// The value bytes with obs-folds collapsed to single spaces.
    pub fn unfolded_bytes(&self) -> Vec<u8> {
        unfold(&self.value_bytes()).into_owned()
    }

    /// Text form of [`unfolded_bytes`](Self::unfolded_bytes), lossy like [`value`](Self::value).
    pub fn unfolded_value(&self) -> String {
        String::from_utf8_lossy(&self.unfolded_bytes()).into_owned()
    }

    /// Renders `Name: value` without the trailing CRLF, exactly as it goes on the wire.
    ///
    /// The value goes through [`filter_value_bytes`], so the output never holds a CR or LF
    /// outside of a valid obs-fold.
    pub fn render_bytes(&self) -> Vec<u8> {
        let value = self.value_bytes();
        let filtered = filter_value_bytes(&value);
        if let Cow::Owned(_) = filtered {
            warn!(header = %self.name, "stripped disallowed bytes from header value");
        }

        let name = self.name.as_str().as_bytes();
        let mut line = Vec::with_capacity(name.len() + 2 + filtered.len());
        line.extend_from_slice(name);
        line.extend_from_slice(b": ");
        line.extend_from_slice(&filtered);
        line
    }

    /// Text form of [`render_bytes`](Self::render_bytes), lossy like [`value`](Self::value).
    pub fn render(&self) -> String {
        String::from_utf8_lossy(&self.render_bytes()).into_owned()
    }
}

impl fmt::Display for Header {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

fn checked_value(name: &HeaderName, value: &[u8]) -> Result<Bytes, HeaderError> {
    let value = trim_ows_bytes(value);
    ensure!(is_valid_value(value), HeaderError::invalid_value(name, String::from_utf8_lossy(value)));
    Ok(Bytes::copy_from_slice(value))
}

fn join_for(kind: HeaderKind, params: &[ParamGroup]) -> String {
    match kind {
        HeaderKind::SetCookie => join_cookie_params(params),
        _ => join_params(params),
    }
}

fn check_params(name: &HeaderName, kind: HeaderKind, params: &[ParamGroup]) -> Result<(), HeaderError> {
    if kind == HeaderKind::SetCookie {
        let valid = matches!(params, [group] if is_valid_cookie_group(group));
        ensure!(valid, HeaderError::invalid_value(name, join_cookie_params(params)));
    }
    for (key, _) in params.iter().flat_map(ParamGroup::iter) {
        ensure!(is_param_key(key), HeaderError::invalid_value(name, key));
    }
    let joined = join_for(kind, params);
    ensure!(is_valid_value(&joined), HeaderError::invalid_value(name, joined));
    Ok(())
}

/// Keys must read back as a single key when the joined value is parsed again.
fn is_param_key(key: &str) -> bool {
    !key.is_empty() && !key.bytes().any(|b| matches!(b, b'=' | b';' | b',' | b'"' | b' ' | b'\t' | b'\r' | b'\n'))
}
