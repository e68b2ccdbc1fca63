//! Structured header parameters
//!
//! Values such as `text/html; charset="utf-8"` or `Basic realm="a", Digest realm="b"`
//! are lists of groups: groups are separated by commas, parameters inside a group by
//! semicolons, and each parameter is either a bare `key` or `key=value` where the value
//! may be a quoted string.
//!
//! The parser is lenient on purpose: when it meets input it cannot make sense of it
//! stops and returns the groups it already completed.

use std::fmt;
use std::fmt::Write;
use std::mem;

use tracing::trace;

use crate::protocol::grammar::is_valid_name;

/// One comma-delimited group of parameters, kept in insertion order.
///
/// Keys are compared case-sensitively. Inserting an existing key overwrites its value
/// in place, so the key keeps its original position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParamGroup {
    params: Vec<(String, Option<String>)>,
}

impl ParamGroup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `key` to `value`, replacing an earlier value for the same key.
    pub fn insert<K, V>(&mut self, key: K, value: Option<V>) -> &mut Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let key = key.into();
        let value = value.map(Into::into);
        match self.params.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => *slot = value,
            None => self.params.push((key, value)),
        }
        self
    }

    /// Returns `None` if the key is absent, `Some(None)` for a bare flag.
    pub fn get(&self, key: &str) -> Option<Option<&str>> {
        self.params.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_deref())
    }

    /// Like [`get`](Self::get) but ignoring ASCII case of the key.
    pub fn get_ignore_case(&self, key: &str) -> Option<Option<&str>> {
        self.params.iter().find(|(k, _)| k.eq_ignore_ascii_case(key)).map(|(_, v)| v.as_deref())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn remove(&mut self, key: &str) -> Option<Option<String>> {
        let index = self.params.iter().position(|(k, _)| k == key)?;
        Some(self.params.remove(index).1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.params.iter().map(|(k, v)| (k.as_str(), v.as_deref()))
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }
}

impl<K, V> FromIterator<(K, Option<V>)> for ParamGroup
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, Option<V>)>>(iter: I) -> Self {
        let mut group = ParamGroup::new();
        for (key, value) in iter {
            group.insert(key, value);
        }
        group
    }
}

/// Renders the group as `key=value; key="quoted value"; flag`.
impl fmt::Display for ParamGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, (key, value)) in self.params.iter().enumerate() {
            if index > 0 {
                f.write_str("; ")?;
            }
            f.write_str(key)?;
            match value {
                None => {}
                Some(value) if is_bare_value(value) => write!(f, "={value}")?,
                Some(value) => {
                    f.write_str("=\"")?;
                    for c in value.chars() {
                        if matches!(c, '"' | '\\') {
                            f.write_char('\\')?;
                        }
                        f.write_char(c)?;
                    }
                    f.write_char('"')?;
                }
            }
        }
        Ok(())
    }
}

/// A value is written without quotes only if it is made of word characters.
fn is_bare_value(value: &str) -> bool {
    !value.is_empty() && value.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_')
}

/// Parses a structured value into its parameter groups.
pub fn parse_params(value: &str) -> Vec<ParamGroup> {
    let mut cursor = Cursor { input: value, pos: 0 };
    let mut groups = Vec::new();
    let mut current = ParamGroup::new();

    loop {
        cursor.skip_whitespace();
        match cursor.peek() {
            None => break,
            Some(b',') => {
                cursor.bump();
                if !current.is_empty() {
                    groups.push(mem::take(&mut current));
                }
                continue;
            }
            Some(b';') => {
                cursor.bump();
                continue;
            }
            Some(_) => {}
        }

        let Some(key) = cursor.take_key() else {
            trace!(position = cursor.pos, "stop parsing params at malformed input");
            return groups;
        };

        cursor.skip_whitespace();
        if cursor.peek() != Some(b'=') {
            current.insert(key, None::<String>);
            continue;
        }

        cursor.bump();
        cursor.skip_whitespace();
        let value = if cursor.peek() == Some(b'"') {
            match cursor.take_quoted() {
                Some(value) => value,
                None => {
                    trace!(position = cursor.pos, "stop parsing params at unterminated quoted string");
                    return groups;
                }
            }
        } else {
            cursor.take_bare().to_owned()
        };
        current.insert(key, Some(value));
    }

    if !current.is_empty() {
        groups.push(current);
    }
    groups
}

/// Joins parameter groups back into a header value, the inverse of [`parse_params`].
pub fn join_params(groups: &[ParamGroup]) -> String {
    let mut joined = String::new();
    for (index, group) in groups.iter().enumerate() {
        if index > 0 {
            joined.push_str(", ");
        }
        joined.push_str(&group.to_string());
    }
    joined
}

/// Parses a `Set-Cookie` value into a single group.
///
/// Cookie attributes are only separated by semicolons; commas belong to the values
/// (`Expires=Wed, 21 Oct 2015 07:28:00 GMT`). The cookie pair comes first. Values
/// wrapped in double quotes are unwrapped.
pub fn parse_cookie_params(value: &str) -> Vec<ParamGroup> {
    let mut group = ParamGroup::new();
    for part in value.split(';') {
        let part = part.trim_matches([' ', '\t', '\r', '\n']);
        if part.is_empty() {
            continue;
        }
        match part.split_once('=') {
            Some((key, value)) => {
                let value = value.trim_matches([' ', '\t']);
                let value = value.strip_prefix('"').and_then(|v| v.strip_suffix('"')).unwrap_or(value);
                group.insert(key.trim_end_matches([' ', '\t']), Some(value));
            }
            None => {
                group.insert(part, None::<String>);
            }
        }
    }

    if group.is_empty() { Vec::new() } else { vec![group] }
}

/// Joins `Set-Cookie` parameters as `name=value; Attr=value; Flag`.
///
/// Values are written as they are, never quoted: user agents take a quoted `Path` or
/// `Expires` literally. Check the groups with [`is_valid_cookie_group`] first.
pub fn join_cookie_params(groups: &[ParamGroup]) -> String {
    let mut joined = String::new();
    for (key, value) in groups.iter().flat_map(ParamGroup::iter) {
        if !joined.is_empty() {
            joined.push_str("; ");
        }
        joined.push_str(key);
        if let Some(value) = value {
            joined.push('=');
            joined.push_str(value);
        }
    }
    joined
}

/// Checks a group against the RFC 6265 `Set-Cookie` grammar.
///
/// The first parameter must be the `name=value` cookie pair with a token name and a
/// cookie-octet value, optionally double-quoted. Every following attribute needs a token
/// name and a value without control characters or `;`.
pub fn is_valid_cookie_group(group: &ParamGroup) -> bool {
    let mut params = group.iter();
    let Some((name, Some(value))) = params.next() else {
        return false;
    };
    is_valid_name(name)
        && is_cookie_value(value)
        && params.all(|(key, value)| is_valid_name(key) && value.is_none_or(is_cookie_attribute_value))
}

fn is_cookie_value(value: &str) -> bool {
    let value = value.strip_prefix('"').and_then(|v| v.strip_suffix('"')).unwrap_or(value);
    value.bytes().all(|b| matches!(b, 0x21 | 0x23..=0x2B | 0x2D..=0x3A | 0x3C..=0x5B | 0x5D..=0x7E))
}

fn is_cookie_attribute_value(value: &str) -> bool {
    value.bytes().all(|b| b >= 32 && b != 127 && b != b';')
}

/// Byte cursor over the value; every delimiter is ASCII so slice boundaries stay on
/// char boundaries.
struct Cursor<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn peek(&self) -> Option<u8> {
        self.input.as_bytes().get(self.pos).copied()
    }

    fn bump(&mut self) {
        self.pos += 1;
    }

    fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(b' ' | b'\t' | b'\r' | b'\n')) {
            self.bump();
        }
    }

    fn take_key(&mut self) -> Option<&'a str> {
        let rest = self.rest();
        let len = rest
            .bytes()
            .position(|b| matches!(b, b'=' | b';' | b',' | b'"' | b' ' | b'\t' | b'\r' | b'\n'))
            .unwrap_or(rest.len());
        if len == 0 {
            return None;
        }
        self.pos += len;
        Some(&rest[..len])
    }

    /// Reads a quoted string starting at the opening quote, unescaping `\x` to `x`.
    fn take_quoted(&mut self) -> Option<String> {
        let rest = &self.rest()[1..];
        let mut value = String::new();
        let mut escaped = false;
        for (index, c) in rest.char_indices() {
            if escaped {
                value.push(c);
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                // opening quote + content + closing quote
                self.pos += 1 + index + 1;
                return Some(value);
            } else {
                value.push(c);
            }
        }
        None
    }

    fn take_bare(&mut self) -> &'a str {
        let rest = self.rest();
        let len = rest.bytes().position(|b| matches!(b, b';' | b',')).unwrap_or(rest.len());
        self.pos += len;
        rest[..len].trim_end_matches([' ', '\t', '\r', '\n'])
    }
}
