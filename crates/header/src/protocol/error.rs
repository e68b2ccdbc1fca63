use std::io;
use thiserror::Error;

/// Errors raised while building, validating or looking up a single header.
///
/// Every variant is returned synchronously from the call that received the bad input;
/// nothing is deferred to render time.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HeaderError {
    #[error("malformed header line: {line:?}")]
    MalformedHeaderLine { line: String },

    #[error("invalid header name: {name:?}")]
    InvalidHeaderName { name: String },

    #[error("invalid value for header {name}: {value:?}")]
    InvalidHeaderValue { name: String, value: String },

    #[error("header {name} is not a {expected} header")]
    InvalidHeaderType { name: String, expected: &'static str },

    #[error("invalid header input: {reason}")]
    InvalidHeaderInput { reason: String },

    #[error("header {name} not found")]
    HeaderNotFound { name: String },
}

impl HeaderError {
    pub fn malformed_line<S: ToString>(line: S) -> Self {
        Self::MalformedHeaderLine { line: line.to_string() }
    }

    pub fn invalid_name<S: ToString>(name: S) -> Self {
        Self::InvalidHeaderName { name: name.to_string() }
    }

    pub fn invalid_value<N: ToString, V: ToString>(name: N, value: V) -> Self {
        Self::InvalidHeaderValue { name: name.to_string(), value: value.to_string() }
    }

    pub fn invalid_type<S: ToString>(name: S, expected: &'static str) -> Self {
        Self::InvalidHeaderType { name: name.to_string(), expected }
    }

    pub fn invalid_input<S: ToString>(reason: S) -> Self {
        Self::InvalidHeaderInput { reason: reason.to_string() }
    }

    pub fn not_found<S: ToString>(name: S) -> Self {
        Self::HeaderNotFound { name: name.to_string() }
    }
}

/// Errors raised while decoding a header block from the wire.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("header size too large, current: {current_size} exceed the limit {max_size}")]
    TooLargeHeader { current_size: usize, max_size: usize },

    #[error("header number exceed the limit {max_num}")]
    TooManyHeaders { max_num: usize },

    #[error("invalid header: {source}")]
    InvalidHeader {
        #[from]
        source: HeaderError,
    },

    #[error("io error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },
}

impl ParseError {
    pub fn too_large_header(current_size: usize, max_size: usize) -> Self {
        Self::TooLargeHeader { current_size, max_size }
    }

    pub fn too_many_headers(max_num: usize) -> Self {
        Self::TooManyHeaders { max_num }
    }

    pub fn io<E: Into<io::Error>>(e: E) -> Self {
        Self::Io { source: e.into() }
    }
}

/// Errors raised while writing a header block.
#[derive(Error, Debug)]
pub enum SendError {
    #[error("io error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },
}

impl SendError {
    pub fn io<E: Into<io::Error>>(e: E) -> Self {
        Self::Io { source: e.into() }
    }
}
