//! Typed views over well-known structured headers.
//!
//! Views are built from the generic parameter groups of a [`Header`]; they do not keep a
//! second copy of the wire value.

use mime::Mime;

use crate::ensure;
use crate::protocol::params::{is_valid_cookie_group, join_cookie_params};
use crate::protocol::{Header, HeaderError, HeaderKind, ParamGroup};

/// A parsed `Set-Cookie` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetCookie {
    name: String,
    value: String,
    attributes: ParamGroup,
}

impl SetCookie {
    pub const HEADER_NAME: &'static str = "Set-Cookie";

    pub fn new<N: Into<String>, V: Into<String>>(name: N, value: V) -> Self {
        Self { name: name.into(), value: value.into(), attributes: ParamGroup::new() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn domain(&self) -> Option<&str> {
        self.attribute("Domain")
    }

    pub fn path(&self) -> Option<&str> {
        self.attribute("Path")
    }

    pub fn expires(&self) -> Option<&str> {
        self.attribute("Expires")
    }

    pub fn same_site(&self) -> Option<&str> {
        self.attribute("SameSite")
    }

    /// `None` when the attribute is absent or not a number.
    pub fn max_age(&self) -> Option<i64> {
        self.attribute("Max-Age")?.parse().ok()
    }

    pub fn secure(&self) -> bool {
        self.attributes.get_ignore_case("Secure").is_some()
    }

    pub fn http_only(&self) -> bool {
        self.attributes.get_ignore_case("HttpOnly").is_some()
    }

    /// Every attribute after the cookie pair, in order.
    pub fn attributes(&self) -> &ParamGroup {
        &self.attributes
    }

    fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get_ignore_case(key).flatten()
    }

    pub fn with_domain<S: Into<String>>(mut self, domain: S) -> Self {
        self.attributes.insert("Domain", Some(domain));
        self
    }

    pub fn with_path<S: Into<String>>(mut self, path: S) -> Self {
        self.attributes.insert("Path", Some(path));
        self
    }

    pub fn with_expires<S: Into<String>>(mut self, expires: S) -> Self {
        self.attributes.insert("Expires", Some(expires));
        self
    }

    pub fn with_max_age(mut self, seconds: i64) -> Self {
        self.attributes.insert("Max-Age", Some(seconds.to_string()));
        self
    }

    pub fn with_same_site<S: Into<String>>(mut self, same_site: S) -> Self {
        self.attributes.insert("SameSite", Some(same_site));
        self
    }

    pub fn with_secure(mut self, secure: bool) -> Self {
        self.set_flag("Secure", secure);
        self
    }

    pub fn with_http_only(mut self, http_only: bool) -> Self {
        self.set_flag("HttpOnly", http_only);
        self
    }

    fn set_flag(&mut self, flag: &str, on: bool) {
        if on {
            self.attributes.insert(flag, None::<String>);
        } else {
            self.attributes.remove(flag);
        }
    }

    /// The header value: the cookie pair, then `; Attr=value` or `; Flag` per attribute.
    ///
    /// # Errors
    ///
    /// [`HeaderError::InvalidHeaderValue`] if the cookie name is not a token, the cookie
    /// value holds anything outside the cookie-octet set (`;`, `,`, whitespace, ...) or an
    /// attribute value holds `;` or a control character.
    pub fn to_value(&self) -> Result<String, HeaderError> {
        let mut group = ParamGroup::new();
        group.insert(self.name.as_str(), Some(self.value.as_str()));
        for (key, value) in self.attributes.iter() {
            group.insert(key, value);
        }

        let groups = [group];
        let value = join_cookie_params(&groups);
        ensure!(is_valid_cookie_group(&groups[0]), HeaderError::invalid_value(Self::HEADER_NAME, value));
        Ok(value)
    }

    /// Builds the `Set-Cookie` header, validating the rendered value.
    pub fn into_header(self) -> Result<Header, HeaderError> {
        Header::with_kind(Self::HEADER_NAME, self.to_value()?, HeaderKind::SetCookie)
    }
}

impl TryFrom<&Header> for SetCookie {
    type Error = HeaderError;

    fn try_from(header: &Header) -> Result<Self, Self::Error> {
        ensure!(header.kind() == HeaderKind::SetCookie, HeaderError::invalid_type(header.name(), HeaderKind::SetCookie.as_str()));

        let params = header.params().unwrap_or_default();
        let group = params.first().ok_or_else(|| HeaderError::invalid_value(header.name(), header.value()))?;
        let mut iter = group.iter();
        let Some((name, Some(value))) = iter.next() else {
            return Err(HeaderError::invalid_value(header.name(), header.value()));
        };

        Ok(Self {
            name: name.to_owned(),
            value: value.to_owned(),
            attributes: iter.collect(),
        })
    }
}

/// A parsed `Content-Type` header.
#[derive(Debug, Clone, PartialEq)]
pub struct ContentType {
    mime: Mime,
}

impl ContentType {
    pub const HEADER_NAME: &'static str = "Content-Type";

    pub fn mime(&self) -> &Mime {
        &self.mime
    }

    /// `type/subtype` without parameters.
    pub fn essence(&self) -> &str {
        self.mime.essence_str()
    }

    pub fn charset(&self) -> Option<&str> {
        self.mime.get_param(mime::CHARSET).map(|charset| charset.as_str())
    }

    pub fn boundary(&self) -> Option<&str> {
        self.mime.get_param(mime::BOUNDARY).map(|boundary| boundary.as_str())
    }

    pub fn into_header(self) -> Result<Header, HeaderError> {
        Header::with_kind(Self::HEADER_NAME, self.mime.as_ref(), HeaderKind::ContentType)
    }
}

impl From<Mime> for ContentType {
    fn from(mime: Mime) -> Self {
        Self { mime }
    }
}

impl TryFrom<&Header> for ContentType {
    type Error = HeaderError;

    fn try_from(header: &Header) -> Result<Self, Self::Error> {
        ensure!(header.kind() == HeaderKind::ContentType, HeaderError::invalid_type(header.name(), HeaderKind::ContentType.as_str()));

        let value = header.unfolded_value();
        let mime = value.parse::<Mime>().map_err(|_| HeaderError::invalid_value(header.name(), &value))?;
        Ok(Self { mime })
    }
}
