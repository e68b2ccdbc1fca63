//! Field-line grammar for HTTP/1.x headers
//!
//! Pure functions that split a `Name: value` line, check a header name against the
//! RFC 7230 `token` rule and guard header values against CRLF injection.
//!
//! Values get two layers of protection: [`is_valid_value`] rejects bad input when a
//! header is built, [`filter_value`] strips anything unsafe again when it is rendered.
//! A value that passed validation is left untouched by the filter.

use std::borrow::Cow;

use crate::protocol::HeaderError;

/// Characters that may not appear in the label part of a field line.
const SEPARATORS: &[u8] = b"()<>@,;:\"/[]?={} \t";

/// Non alphanumeric characters allowed in a header name.
const TOKEN_EXTRA: &[u8] = b"'`#$%&*+.^_|~!-";

#[inline]
fn is_separator(b: u8) -> bool {
    SEPARATORS.contains(&b)
}

#[inline]
fn is_token_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || TOKEN_EXTRA.contains(&b)
}

#[inline]
fn is_fold_at(bytes: &[u8], index: usize) -> bool {
    bytes.get(index) == Some(&b'\r') && bytes.get(index + 1) == Some(&b'\n') && matches!(bytes.get(index + 2), Some(b' ' | b'\t'))
}

/// Returns the index of the colon ending a well-formed label.
fn label_end(line: &[u8]) -> Option<usize> {
    let colon = line.iter().position(|&b| b == b':')?;
    let label = &line[..colon];
    (!label.is_empty() && !label.iter().any(|&b| is_separator(b))).then_some(colon)
}

/// Splits a single field line into its label and the raw remainder after the first colon.
///
/// The label keeps its original casing. The value is returned as-is, including any
/// optional whitespace, so callers decide how to trim it. Colons inside the value are
/// kept.
///
/// # Errors
///
/// Returns [`HeaderError::MalformedHeaderLine`] if the line has no colon, the label is
/// empty, or the label contains a separator, space or tab.
pub fn parse_label_value(line: &str) -> Result<(&str, &str), HeaderError> {
    let colon = label_end(line.as_bytes()).ok_or_else(|| HeaderError::malformed_line(line))?;
    Ok((&line[..colon], &line[colon + 1..]))
}

/// Byte form of [`parse_label_value`] for lines read off the wire.
///
/// Only the label has to be text; the value may carry obs-text bytes (`0x80..=0xFE`).
///
/// # Errors
///
/// [`HeaderError::MalformedHeaderLine`] as for [`parse_label_value`], and also when the
/// label is not valid UTF-8.
pub fn parse_label_value_bytes(line: &[u8]) -> Result<(&str, &[u8]), HeaderError> {
    let malformed = || HeaderError::malformed_line(String::from_utf8_lossy(line));
    let colon = label_end(line).ok_or_else(malformed)?;
    let label = std::str::from_utf8(&line[..colon]).map_err(|_| malformed())?;
    Ok((label, &line[colon + 1..]))
}

/// Returns true if `name` is a non-empty RFC 7230 `token`.
pub fn is_valid_name(name: &str) -> bool {
    !name.is_empty() && name.bytes().all(is_token_byte)
}

/// Checks a header value against RFC 7230 §3.2.
///
/// A value is rejected when it contains:
/// - a LF that is not part of a CRLF,
/// - a CR that is not followed by LF,
/// - a CRLF that is not followed by a space or horizontal tab,
/// - a control byte other than HTAB,
/// - DEL,
/// - the byte 255.
///
/// Bytes in `128..=254` are accepted so already deployed 8-bit values keep working.
pub fn is_valid_value<V: AsRef<[u8]>>(value: V) -> bool {
    let bytes = value.as_ref();
    let mut index = 0;
    while index < bytes.len() {
        match bytes[index] {
            b'\r' => {
                if !is_fold_at(bytes, index) {
                    return false;
                }
                // skip the LF, the whitespace after it is checked like any other byte
                index += 2;
                continue;
            }
            b'\n' => return false,
            b'\t' => {}
            b if b < 32 || b == 127 || b == 255 => return false,
            _ => {}
        }
        index += 1;
    }
    true
}

/// Removes everything [`is_valid_value`] would reject instead of failing.
///
/// A CRLF followed by a space or tab is kept as an obs-fold, every other CR or LF is
/// dropped, as are the remaining control characters, DEL and the byte 255. The result
/// always passes [`is_valid_value`] and filtering it again changes nothing.
pub fn filter_value_bytes(value: &[u8]) -> Cow<'_, [u8]> {
    if is_valid_value(value) {
        return Cow::Borrowed(value);
    }

    let mut filtered = Vec::with_capacity(value.len());
    let mut index = 0;
    while index < value.len() {
        match value[index] {
            b'\r' if is_fold_at(value, index) => {
                filtered.extend_from_slice(b"\r\n");
                index += 2;
                continue;
            }
            b'\t' => filtered.push(b'\t'),
            b if b < 32 || b == 127 || b == 255 => {}
            b => filtered.push(b),
        }
        index += 1;
    }
    Cow::Owned(filtered)
}

/// Text form of [`filter_value_bytes`].
///
/// Only ASCII bytes are ever removed, so the result stays valid UTF-8.
pub fn filter_value(value: &str) -> Cow<'_, str> {
    match filter_value_bytes(value.as_bytes()) {
        Cow::Borrowed(_) => Cow::Borrowed(value),
        Cow::Owned(bytes) => Cow::Owned(String::from_utf8_lossy(&bytes).into_owned()),
    }
}

/// Trims optional whitespace (spaces and tabs) from both ends of a value.
#[inline]
pub fn trim_ows(value: &str) -> &str {
    value.trim_matches([' ', '\t'])
}

/// Byte form of [`trim_ows`].
pub fn trim_ows_bytes(value: &[u8]) -> &[u8] {
    let start = value.iter().position(|b| !matches!(b, b' ' | b'\t')).unwrap_or(value.len());
    let end = value.iter().rposition(|b| !matches!(b, b' ' | b'\t')).map_or(start, |last| last + 1);
    &value[start..end]
}

/// Replaces every obs-fold (CRLF plus the whitespace after it) with a single space.
pub fn unfold(value: &[u8]) -> Cow<'_, [u8]> {
    if !value.windows(2).any(|pair| pair == b"\r\n") {
        return Cow::Borrowed(value);
    }

    let mut unfolded = Vec::with_capacity(value.len());
    let mut index = 0;
    while index < value.len() {
        if value[index..].starts_with(b"\r\n") {
            unfolded.push(b' ');
            index += 2;
            while matches!(value.get(index), Some(b' ' | b'\t')) {
                index += 1;
            }
            continue;
        }
        unfolded.push(value[index]);
        index += 1;
    }
    Cow::Owned(unfolded)
}
