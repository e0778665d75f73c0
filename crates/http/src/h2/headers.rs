//! HTTP/2 header blocks.
//!
//! A header block is split into the five pseudo-header slots and the ordered
//! regular fields. Pseudo-headers always come first when the block is
//! serialized again, as RFC 9113 §8.3 requires.

use std::fmt;

use tracing::debug;

use crate::protocol::{HeaderField, HeaderFields};

pub const METHOD: &str = ":method";
pub const SCHEME: &str = ":scheme";
pub const AUTHORITY: &str = ":authority";
pub const PATH: &str = ":path";
pub const STATUS: &str = ":status";

/// The pseudo-header slots of a header block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PseudoHeaders {
    method: Option<String>,
    scheme: Option<String>,
    authority: Option<String>,
    path: Option<String>,
    status: Option<String>,
}

impl PseudoHeaders {
    pub fn method(&self) -> Option<&str> {
        self.method.as_deref()
    }

    pub fn scheme(&self) -> Option<&str> {
        self.scheme.as_deref()
    }

    pub fn authority(&self) -> Option<&str> {
        self.authority.as_deref()
    }

    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn set_method(&mut self, method: impl Into<String>) {
        self.method = Some(method.into());
    }

    pub fn set_scheme(&mut self, scheme: impl Into<String>) {
        self.scheme = Some(scheme.into());
    }

    pub fn set_authority(&mut self, authority: impl Into<String>) {
        self.authority = Some(authority.into());
    }

    pub fn set_path(&mut self, path: impl Into<String>) {
        self.path = Some(path.into());
    }

    pub fn set_status(&mut self, status: impl Into<String>) {
        self.status = Some(status.into());
    }

    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }

    /// Iterates the present slots in wire order.
    pub fn iter<'a>(&'a self) -> impl Iterator<Item = (&'a str, &'a str)> {
        let slots: [(&'a str, &'a Option<String>); 5] = [
            (METHOD, &self.method),
            (SCHEME, &self.scheme),
            (AUTHORITY, &self.authority),
            (PATH, &self.path),
            (STATUS, &self.status),
        ];
        slots.into_iter().filter_map(|(name, value)| value.as_deref().map(|value| (name, value)))
    }

    fn slot(&mut self, name: &str) -> Option<&mut Option<String>> {
        let slot = match name {
            METHOD => &mut self.method,
            SCHEME => &mut self.scheme,
            AUTHORITY => &mut self.authority,
            PATH => &mut self.path,
            STATUS => &mut self.status,
            _ => return None,
        };
        Some(slot)
    }
}

/// A decoded or to-be-encoded HTTP/2 header block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Http2Headers {
    pseudo: PseudoHeaders,
    fields: HeaderFields,
}

impl Http2Headers {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn from_parts(pseudo: PseudoHeaders, fields: HeaderFields) -> Self {
        Self { pseudo, fields }
    }

    pub fn pseudo(&self) -> &PseudoHeaders {
        &self.pseudo
    }

    pub fn pseudo_mut(&mut self) -> &mut PseudoHeaders {
        &mut self.pseudo
    }

    pub fn fields(&self) -> &HeaderFields {
        &self.fields
    }

    pub fn fields_mut(&mut self) -> &mut HeaderFields {
        &mut self.fields
    }

    /// Adds one field as it appeared in a header block.
    ///
    /// Known pseudo-headers fill their slot; a repeated one keeps the first
    /// value. Unknown names starting with `:` are kept as regular fields.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        match self.pseudo.slot(&name) {
            Some(slot) if slot.is_none() => *slot = Some(value.into()),
            Some(_) => debug!(name = %name, "ignoring repeated pseudo-header"),
            None => self.fields.append(name, value),
        }
    }

    /// Number of entries, pseudo-headers included.
    pub fn len(&self) -> usize {
        self.pseudo.iter().count() + self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pseudo.is_empty() && self.fields.is_empty()
    }

    /// Iterates every entry in wire order, pseudo-headers first.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pseudo.iter().chain(self.fields.iter().map(|field| (field.name(), field.value())))
    }

    pub fn into_parts(self) -> (PseudoHeaders, HeaderFields) {
        (self.pseudo, self.fields)
    }
}

impl<N: Into<String>, V: Into<String>> FromIterator<(N, V)> for Http2Headers {
    fn from_iter<T: IntoIterator<Item = (N, V)>>(iter: T) -> Self {
        let mut headers = Self::new();
        for (name, value) in iter {
            headers.insert(name, value);
        }
        headers
    }
}

impl FromIterator<HeaderField> for Http2Headers {
    fn from_iter<T: IntoIterator<Item = HeaderField>>(iter: T) -> Self {
        iter.into_iter().map(HeaderField::into_parts).collect()
    }
}

impl fmt::Display for Http2Headers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (name, value) in self.iter() {
            writeln!(f, "{name}: {value}")?;
        }
        Ok(())
    }
}
