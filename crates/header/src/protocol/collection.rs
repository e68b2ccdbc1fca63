//! Ordered, case-insensitive, multi-value header storage.

use std::fmt;

use crate::protocol::{Header, HeaderError};

/// An ordered multiset of headers.
///
/// Several entries may share a name (`Set-Cookie` is the usual example), lookups ignore
/// ASCII case, and iteration follows insertion order across all names. The collection
/// owns its headers; cloning it copies every entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderCollection {
    entries: Vec<Header>,
}

impl HeaderCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self { entries: Vec::with_capacity(capacity) }
    }

    /// Adds a header after every existing entry, never replacing one.
    pub fn append(&mut self, header: Header) -> &mut Self {
        self.entries.push(header);
        self
    }

    /// Alias of [`append`](Self::append).
    #[inline]
    pub fn insert(&mut self, header: Header) -> &mut Self {
        self.append(header)
    }

    /// Removes every entry named like `header`, then appends it.
    pub fn replace(&mut self, header: Header) -> &mut Self {
        let name = header.name().clone();
        self.entries.retain(|entry| entry.name() != &name);
        self.append(header)
    }

    /// All entries named `name`, in insertion order; empty when there are none.
    pub fn find<'a>(&'a self, name: &str) -> impl Iterator<Item = &'a Header> {
        self.entries.iter().filter(move |entry| entry.name().matches(name))
    }

    /// The first entry named `name`.
    ///
    /// # Errors
    ///
    /// [`HeaderError::HeaderNotFound`] when no entry matches.
    pub fn get_one(&self, name: &str) -> Result<&Header, HeaderError> {
        self.find(name).next().ok_or_else(|| HeaderError::not_found(name))
    }

    pub fn get_one_mut(&mut self, name: &str) -> Result<&mut Header, HeaderError> {
        self.entries.iter_mut().find(|entry| entry.name().matches(name)).ok_or_else(|| HeaderError::not_found(name))
    }

    pub fn has(&self, name: &str) -> bool {
        self.find(name).next().is_some()
    }

    /// Removes every entry named `name`; nothing happens if there is none.
    pub fn del(&mut self, name: &str) -> &mut Self {
        self.entries.retain(|entry| !entry.name().matches(name));
        self
    }

    /// Total number of entries across all names.
    pub fn count(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Header> {
        self.entries.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Header> {
        self.entries.iter_mut()
    }

    /// Values grouped per name, in order of first appearance.
    ///
    /// The group keeps the casing of its first entry; repeated headers are listed in
    /// insertion order, so nothing is lost when projecting onto a name-to-list shape.
    /// Values are the text form of [`Header::value`].
    pub fn to_grouped(&self) -> Vec<(String, Vec<String>)> {
        let mut grouped: Vec<(String, Vec<String>)> = Vec::new();
        for entry in &self.entries {
            let value = entry.value().into_owned();
            match grouped.iter_mut().find(|(name, _)| entry.name().matches(name)) {
                Some((_, values)) => values.push(value),
                None => grouped.push((entry.name().as_str().to_owned(), vec![value])),
            }
        }
        grouped
    }

    /// Renders every entry followed by CRLF, then the empty line ending the block.
    pub fn render(&self) -> String {
        let mut block = String::new();
        for entry in &self.entries {
            block.push_str(&entry.render());
            block.push_str("\r\n");
        }
        block.push_str("\r\n");
        block
    }
}

impl fmt::Display for HeaderCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

impl Extend<Header> for HeaderCollection {
    fn extend<T: IntoIterator<Item = Header>>(&mut self, iter: T) {
        self.entries.extend(iter);
    }
}

impl FromIterator<Header> for HeaderCollection {
    fn from_iter<T: IntoIterator<Item = Header>>(iter: T) -> Self {
        Self { entries: iter.into_iter().collect() }
    }
}

impl IntoIterator for HeaderCollection {
    type Item = Header;
    type IntoIter = std::vec::IntoIter<Header>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a> IntoIterator for &'a HeaderCollection {
    type Item = &'a Header;
    type IntoIter = std::slice::Iter<'a, Header>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
