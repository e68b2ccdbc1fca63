//! Conversions between [`HeaderCollection`] and [`http::HeaderMap`].
//!
//! `http` lowercases names, so the original casing does not survive a round trip.
//! Multiplicity and order per name do.

use http::HeaderMap;

use crate::HeaderFactory;
use crate::protocol::{HeaderCollection, HeaderError};

impl HeaderCollection {
    /// Builds a collection from an `http` map, creating each entry through `factory`.
    ///
    /// # Errors
    ///
    /// [`HeaderError::InvalidHeaderValue`] for values that fail validation. Obs-text bytes
    /// are kept as they are.
    pub fn from_header_map(map: &HeaderMap, factory: &HeaderFactory) -> Result<Self, HeaderError> {
        let mut headers = HeaderCollection::with_capacity(map.len());
        for (name, value) in map {
            headers.append(factory.of_pair(name.as_str(), value.as_bytes())?);
        }
        Ok(headers)
    }

    /// Appends every entry to an `http` map; obs-folds are collapsed to single spaces.
    ///
    /// # Errors
    ///
    /// [`HeaderError::InvalidHeaderValue`] if `http` refuses a value.
    pub fn to_header_map(&self) -> Result<HeaderMap, HeaderError> {
        let mut map = HeaderMap::with_capacity(self.count());
        for header in self {
            let name = http::HeaderName::from_bytes(header.name().as_str().as_bytes())
                .map_err(|_| HeaderError::invalid_name(header.name()))?;
            let value = header.unfolded_bytes();
            let value = http::HeaderValue::from_bytes(&value)
                .map_err(|_| HeaderError::invalid_value(header.name(), String::from_utf8_lossy(&value)))?;
            map.append(name, value);
        }
        Ok(map)
    }
}

impl TryFrom<&HeaderCollection> for HeaderMap {
    type Error = HeaderError;

    fn try_from(headers: &HeaderCollection) -> Result<Self, Self::Error> {
        headers.to_header_map()
    }
}

impl TryFrom<&HeaderMap> for HeaderCollection {
    type Error = HeaderError;

    fn try_from(map: &HeaderMap) -> Result<Self, Self::Error> {
        HeaderCollection::from_header_map(map, &HeaderFactory::default())
    }
}
