//! Mapping from header names to the kind of [`Header`](crate::protocol::Header) they build.
//!
//! A [`HeaderRegistry`] is a plain value handed to a [`HeaderFactory`](crate::HeaderFactory).
//! For convenience a process-wide default is kept behind a one-time initializer; hosts
//! that want different mappings either pass their own registry to the factory or swap
//! the default at startup with [`HeaderRegistry::replace_global`].
//!
//! Registration maps a name onto one of the [`HeaderKind`] variants; it does not add new
//! header types. A host that needs its own view registers the name as
//! [`HeaderKind::Structured`] and builds the view from [`Header::params`], the way
//! [`SetCookie`](crate::protocol::SetCookie) and
//! [`ContentType`](crate::protocol::ContentType) are built.
//!
//! [`Header::params`]: crate::protocol::Header::params

use std::collections::HashMap;
use std::sync::Arc;

use arc_swap::ArcSwap;
use once_cell::sync::Lazy;
use tracing::debug;

use crate::protocol::{HeaderError, HeaderKind, HeaderName};

/// Header kinds known out of the box, keyed by lowercase name.
const DEFAULT_KINDS: &[(&str, HeaderKind)] = &[
    ("set-cookie", HeaderKind::SetCookie),
    ("content-type", HeaderKind::ContentType),
    ("www-authenticate", HeaderKind::Structured),
    ("proxy-authenticate", HeaderKind::Structured),
    ("authentication-info", HeaderKind::Structured),
    ("content-disposition", HeaderKind::Structured),
    ("cache-control", HeaderKind::Structured),
];

static GLOBAL_REGISTRY: Lazy<ArcSwap<HeaderRegistry>> = Lazy::new(|| ArcSwap::from_pointee(HeaderRegistry::default()));

/// Lowercase header name to [`HeaderKind`]; unknown names are [`HeaderKind::Opaque`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderRegistry {
    kinds: HashMap<String, HeaderKind>,
}

impl HeaderRegistry {
    /// A registry with no entries, every header is opaque.
    pub fn empty() -> Self {
        Self { kinds: HashMap::new() }
    }

    /// Returns the current process-wide registry.
    pub fn global() -> Arc<HeaderRegistry> {
        GLOBAL_REGISTRY.load_full()
    }

    /// Replaces the process-wide registry.
    ///
    /// Meant for startup configuration and tests; factories created before the call keep
    /// the registry they were given.
    pub fn replace_global(registry: HeaderRegistry) {
        debug!(entries = registry.kinds.len(), "replace global header registry");
        GLOBAL_REGISTRY.store(Arc::new(registry));
    }

    /// Maps `name` to `kind`, overriding an earlier mapping.
    ///
    /// # Errors
    ///
    /// [`HeaderError::InvalidHeaderName`] if `name` is not a valid header name.
    pub fn register(&mut self, name: &str, kind: HeaderKind) -> Result<&mut Self, HeaderError> {
        let name = HeaderName::new(name)?;
        debug!(header = %name, kind = kind.as_str(), "register header kind");
        self.kinds.insert(name.to_lowercase(), kind);
        Ok(self)
    }

    /// Drops the mapping for `name`, making it opaque again.
    pub fn unregister(&mut self, name: &str) -> Option<HeaderKind> {
        self.kinds.remove(&name.to_ascii_lowercase())
    }

    pub fn kind_of(&self, name: &str) -> HeaderKind {
        if let Some(kind) = self.kinds.get(name) {
            return *kind;
        }
        self.kinds.get(&name.to_ascii_lowercase()).copied().unwrap_or(HeaderKind::Opaque)
    }

    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }
}

/// The registry with the built-in structured headers.
impl Default for HeaderRegistry {
    fn default() -> Self {
        let kinds = DEFAULT_KINDS.iter().map(|(name, kind)| ((*name).to_owned(), *kind)).collect();
        Self { kinds }
    }
}
