//! The header model.
//!
//! # Components
//!
//! - **Grammar** ([`grammar`], [`params`]): pure functions over field lines
//!   - [`grammar::parse_label_value`]: splits `Name: value`
//!   - [`grammar::is_valid_value`] / [`grammar::filter_value_bytes`]: CRLF-injection defense
//!   - [`params::parse_params`] / [`params::join_params`]: `key=value; flag` groups
//!
//! - **Entries** ([`Header`], [`HeaderName`], [`HeaderKind`]): a validated name plus an
//!   opaque or structured value that renders back to wire form
//!
//! - **Typed views** ([`SetCookie`], [`ContentType`]): accessors built on the parameter
//!   groups of well-known headers
//!
//! - **Storage** ([`HeaderCollection`]): ordered, case-insensitive, multi-value
//!
//! - **Errors** ([`HeaderError`], [`ParseError`], [`SendError`])

mod error;
pub use error::HeaderError;
pub use error::ParseError;
pub use error::SendError;

pub mod grammar;
pub mod params;
pub use params::ParamGroup;

mod name;
pub use name::HeaderName;

mod header;
pub use header::Header;
pub use header::HeaderKind;

mod typed;
pub use typed::ContentType;
pub use typed::SetCookie;

mod collection;
pub use collection::HeaderCollection;

mod bridge;
