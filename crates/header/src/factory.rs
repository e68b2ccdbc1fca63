//! Builds [`Header`] values of the kind registered for their name.

use std::sync::Arc;

use crate::ensure;
use crate::protocol::grammar::{parse_label_value, parse_label_value_bytes};
use crate::protocol::{Header, HeaderError, HeaderKind, ParamGroup};
use crate::registry::HeaderRegistry;

/// Everything a header can be built from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderInput {
    /// A whole `Name: value` line.
    Line(String),
    /// A name and its raw value text.
    Pair { name: String, value: String },
    /// A name and its parameter groups.
    Structured { name: String, params: Vec<ParamGroup> },
    /// `[name]` or `[name, value]`.
    Parts(Vec<String>),
}

impl From<&str> for HeaderInput {
    fn from(line: &str) -> Self {
        HeaderInput::Line(line.to_owned())
    }
}

impl From<String> for HeaderInput {
    fn from(line: String) -> Self {
        HeaderInput::Line(line)
    }
}

impl From<(&str, &str)> for HeaderInput {
    fn from((name, value): (&str, &str)) -> Self {
        HeaderInput::Pair { name: name.to_owned(), value: value.to_owned() }
    }
}

impl From<(String, String)> for HeaderInput {
    fn from((name, value): (String, String)) -> Self {
        HeaderInput::Pair { name, value }
    }
}

impl From<(&str, Vec<ParamGroup>)> for HeaderInput {
    fn from((name, params): (&str, Vec<ParamGroup>)) -> Self {
        HeaderInput::Structured { name: name.to_owned(), params }
    }
}

impl From<(&str, ParamGroup)> for HeaderInput {
    fn from((name, params): (&str, ParamGroup)) -> Self {
        HeaderInput::Structured { name: name.to_owned(), params: vec![params] }
    }
}

impl From<Vec<String>> for HeaderInput {
    fn from(parts: Vec<String>) -> Self {
        HeaderInput::Parts(parts)
    }
}

impl From<&[&str]> for HeaderInput {
    fn from(parts: &[&str]) -> Self {
        HeaderInput::Parts(parts.iter().map(|part| (*part).to_owned()).collect())
    }
}

/// Creates headers, asking its [`HeaderRegistry`] which kind a name maps to.
///
/// Raw values are stored as given and only parsed into parameters on demand, so text
/// that merely looks like delimiters is never rewritten.
#[derive(Debug, Clone)]
pub struct HeaderFactory {
    registry: Arc<HeaderRegistry>,
}

impl HeaderFactory {
    pub fn new(registry: Arc<HeaderRegistry>) -> Self {
        Self { registry }
    }

    pub fn with_registry(registry: HeaderRegistry) -> Self {
        Self::new(Arc::new(registry))
    }

    pub fn registry(&self) -> &HeaderRegistry {
        &self.registry
    }

    /// Builds a header from any supported input.
    ///
    /// # Errors
    ///
    /// - [`HeaderError::InvalidHeaderInput`] for a string without a colon or a parts list
    ///   that is not `[name]` or `[name, value]`
    /// - [`HeaderError::MalformedHeaderLine`] when the label of a line has separators
    /// - [`HeaderError::InvalidHeaderName`] / [`HeaderError::InvalidHeaderValue`] from
    ///   validation
    pub fn of<I: Into<HeaderInput>>(&self, input: I) -> Result<Header, HeaderError> {
        match input.into() {
            HeaderInput::Line(line) => {
                ensure!(line.contains(':'), HeaderError::invalid_input(format!("expected a `name: value` line, got {line:?}")));
                self.of_line(&line)
            }
            HeaderInput::Pair { name, value } => self.of_pair(&name, &value),
            HeaderInput::Structured { name, params } => self.of_params(&name, params),
            HeaderInput::Parts(parts) => match parts.as_slice() {
                [name] => self.of_pair(name, ""),
                [name, value] => self.of_pair(name, value),
                [] => Err(HeaderError::invalid_input("empty header parts")),
                _ => Err(HeaderError::invalid_input(format!("expected a name and a value, got {} parts", parts.len()))),
            },
        }
    }

    /// Parses a `Name: value` line.
    pub fn of_line(&self, line: &str) -> Result<Header, HeaderError> {
        let (name, value) = parse_label_value(line)?;
        self.of_pair(name, value)
    }

    /// Parses a `Name: value` line read off the wire; the value may hold obs-text bytes.
    pub fn of_line_bytes(&self, line: &[u8]) -> Result<Header, HeaderError> {
        let (name, value) = parse_label_value_bytes(line)?;
        self.of_pair(name, value)
    }

    /// Builds from a raw value without parsing it.
    pub fn of_pair<V: AsRef<[u8]>>(&self, name: &str, value: V) -> Result<Header, HeaderError> {
        Header::with_kind(name, value, self.registry.kind_of(name))
    }

    /// Builds a structured header; names registered as opaque become
    /// [`HeaderKind::Structured`].
    pub fn of_params(&self, name: &str, params: Vec<ParamGroup>) -> Result<Header, HeaderError> {
        let kind = match self.registry.kind_of(name) {
            HeaderKind::Opaque => HeaderKind::Structured,
            kind => kind,
        };
        Header::structured_with_kind(name, params, kind)
    }
}

/// Uses the process-wide registry.
impl Default for HeaderFactory {
    fn default() -> Self {
        Self::new(HeaderRegistry::global())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{ContentType, SetCookie};

    #[test]
    fn authenticate_challenge_renders_verbatim() {
        let header = HeaderFactory::default().of(("WWW-Authenticate", r#"Basic realm="admin_panel""#)).unwrap();
        assert_eq!(header.kind(), HeaderKind::Structured);
        assert_eq!(header.render(), r#"WWW-Authenticate: Basic realm="admin_panel""#);
    }

    #[test]
    fn raw_values_are_not_reparsed() {
        let value = r#"attachment; filename="a;b,c.txt"; size=10"#;
        let header = HeaderFactory::default().of(("Content-Disposition", value)).unwrap();
        assert_eq!(header.value(), value);
        assert_eq!(header.params().unwrap()[0].get("filename"), Some(Some("a;b,c.txt")));
    }

    #[test]
    fn line_input_dispatches_on_name() {
        let factory = HeaderFactory::default();

        let cookie = factory.of("set-cookie: id=1; Path=/").unwrap();
        assert_eq!(cookie.kind(), HeaderKind::SetCookie);
        assert_eq!(SetCookie::try_from(&cookie).unwrap().path(), Some("/"));

        let content_type = factory.of("Content-Type: text/plain; charset=utf-8").unwrap();
        assert_eq!(ContentType::try_from(&content_type).unwrap().charset(), Some("utf-8"));

        let other = factory.of("X-Trace: a=1; b=2").unwrap();
        assert_eq!(other.kind(), HeaderKind::Opaque);
        assert!(other.params().is_none());
    }

    #[test]
    fn structured_input_assigns_params() {
        let params: ParamGroup = [("no-cache", None), ("max-age", Some("0"))].into_iter().collect();
        let header = HeaderFactory::default().of(("X-Policy", params)).unwrap();
        assert_eq!(header.kind(), HeaderKind::Structured);
        assert_eq!(header.render(), "X-Policy: no-cache; max-age=0");
    }

    #[test]
    fn parts_input() {
        let factory = HeaderFactory::default();
        assert_eq!(factory.of(&["X-A", "1"][..]).unwrap().render(), "X-A: 1");
        assert_eq!(factory.of(vec!["X-Empty".to_owned()]).unwrap().render(), "X-Empty: ");
        assert!(matches!(factory.of(Vec::<String>::new()), Err(HeaderError::InvalidHeaderInput { .. })));
        assert!(matches!(factory.of(&["a", "b", "c"][..]), Err(HeaderError::InvalidHeaderInput { .. })));
    }

    #[test]
    fn invalid_inputs() {
        let factory = HeaderFactory::default();
        assert!(matches!(factory.of("just text"), Err(HeaderError::InvalidHeaderInput { .. })));
        assert!(matches!(factory.of("Bad Header Name: x"), Err(HeaderError::MalformedHeaderLine { .. })));
        assert!(matches!(factory.of(("Bad Name", "x")), Err(HeaderError::InvalidHeaderName { .. })));
        assert!(matches!(factory.of(("X-A", "line1\r\ninjected: evil")), Err(HeaderError::InvalidHeaderValue { .. })));
        assert!(matches!(factory.of_line("no colon"), Err(HeaderError::MalformedHeaderLine { .. })));
    }

    #[test]
    fn byte_lines_keep_obs_text() {
        let factory = HeaderFactory::default();
        let header = factory.of_line_bytes(b"Content-Disposition: attachment; filename=caf\xe9.txt").unwrap();
        assert_eq!(header.kind(), HeaderKind::Structured);
        assert_eq!(header.render_bytes(), b"Content-Disposition: attachment; filename=caf\xe9.txt".to_vec());
        assert!(matches!(factory.of_line_bytes(b"X-A: a\nb"), Err(HeaderError::InvalidHeaderValue { .. })));
    }

    #[test]
    fn custom_registry() {
        let mut registry = HeaderRegistry::empty();
        registry.register("Link", HeaderKind::Structured).unwrap();
        let factory = HeaderFactory::with_registry(registry);

        let link = factory.of(("Link", r#"</style.css>; rel=preload; as=style"#)).unwrap();
        assert_eq!(link.params().unwrap()[0].get("rel"), Some(Some("preload")));

        let cookie = factory.of(("Set-Cookie", "a=b")).unwrap();
        assert_eq!(cookie.kind(), HeaderKind::Opaque);
        assert!(factory.registry().kind_of("set-cookie") == HeaderKind::Opaque);
    }
}
