//! A structured model of HTTP/1.x headers
//!
//! This crate parses, validates, stores and renders the header section of an HTTP
//! message. Each field is a [`Header`](protocol::Header) with a case-insensitive name and
//! either an opaque value or structured `key=value; flag` parameters; fields live in an
//! ordered [`HeaderCollection`](protocol::HeaderCollection) that keeps repeated names such
//! as `Set-Cookie`.
//!
//! # Features
//!
//! - RFC 7230 name validation and case-insensitive lookup that keeps the original casing
//! - CRLF-injection defense: values are rejected on input and filtered again on output
//! - Structured parameter parsing and joining (`type; charset="utf-8", other`)
//! - A name-keyed [`HeaderRegistry`] deciding which headers are structured, with typed
//!   views for `Set-Cookie` and `Content-Type`
//! - `tokio_util` codecs for whole header blocks, including obs-fold handling
//! - Conversions to and from [`http::HeaderMap`]
//!
//! # Example
//!
//! ```
//! use micro_header::HeaderFactory;
//! use micro_header::protocol::{HeaderCollection, SetCookie};
//!
//! let factory = HeaderFactory::default();
//! let mut headers = HeaderCollection::new();
//! headers
//!     .append(factory.of("Content-Type: text/html; charset=utf-8").unwrap())
//!     .append(factory.of(("Set-Cookie", "id=1; Path=/; HttpOnly")).unwrap())
//!     .append(factory.of(("Set-Cookie", "theme=dark")).unwrap());
//!
//! assert!(headers.has("content-type"));
//! assert_eq!(headers.find("set-cookie").count(), 2);
//!
//! let cookie = SetCookie::try_from(headers.get_one("set-cookie").unwrap()).unwrap();
//! assert!(cookie.http_only());
//!
//! // values that would split the message are refused when the header is built
//! assert!(factory.of(("X-Name", "a\r\nInjected: yes")).is_err());
//! ```
//!
//! # Architecture
//!
//! - [`protocol`]: names, values, headers, the collection and error types
//! - [`registry`]: header name to kind mapping, with a replaceable process-wide default
//! - [`factory`]: builds headers of the registered kind from lines, pairs or parameters
//! - [`codec`]: header block decoding and encoding over `BytesMut`
//!
//! # Error Handling
//!
//! - [`protocol::HeaderError`]: building or looking up a single header
//! - [`protocol::ParseError`]: decoding a header block
//! - [`protocol::SendError`]: encoding a header block
//!
//! Rendering never fails.
//!
//! # Limitations
//!
//! - Only the header section: no start line, body, chunked coding or connection handling
//! - Header blocks must use CRLF line endings; field names must be ASCII
//! - Default block limits: 8KB and 64 fields

pub mod codec;
pub mod factory;
pub mod protocol;
pub mod registry;

pub use factory::{HeaderFactory, HeaderInput};
pub use registry::HeaderRegistry;

mod utils;
pub(crate) use utils::ensure;
