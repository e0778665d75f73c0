//! Ordered, case-insensitive header field list.
//!
//! [`HeaderFields`] keeps every field in the order it was received and keeps
//! the original spelling of each name. Lookups compare names ignoring ASCII
//! case. Duplicate names stay separate entries, which matters for fields such
//! as `Set-Cookie` that cannot be combined.
//!
//! Singleton fields like `Content-Length` and `Transfer-Encoding` should only
//! be written through [`HeaderFields::set`], which replaces instead of adding.

use std::fmt;
use std::slice;
use std::vec;

/// A single `name: value` header field.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HeaderField {
    name: String,
    value: String,
}

impl HeaderField {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self { name: name.into(), value: value.into() }
    }

    /// The field name as it was received or added.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// Returns true if this field's name equals `name`, ignoring ASCII case.
    #[inline]
    pub fn is(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }

    pub fn into_parts(self) -> (String, String) {
        (self.name, self.value)
    }
}

impl fmt::Display for HeaderField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.value)
    }
}

/// Ordered multimap of header fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderFields {
    fields: Vec<HeaderField>,
}

impl HeaderFields {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self { fields: Vec::with_capacity(capacity) }
    }

    /// Number of fields, counting duplicates.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Returns the value of the first field named `name`.
    pub fn get<N: AsRef<str>>(&self, name: N) -> Option<&str> {
        let name = name.as_ref();
        self.fields.iter().find(|field| field.is(name)).map(HeaderField::value)
    }

    /// Returns the value of the last field named `name`.
    pub fn last<N: AsRef<str>>(&self, name: N) -> Option<&str> {
        let name = name.as_ref();
        self.fields.iter().rev().find(|field| field.is(name)).map(HeaderField::value)
    }

    /// Returns the values of all fields named `name`, in order.
    pub fn get_all<'a, N: AsRef<str> + 'a>(&'a self, name: N) -> impl Iterator<Item = &'a str> + 'a {
        self.fields.iter().filter(move |field| field.is(name.as_ref())).map(HeaderField::value)
    }

    pub fn contains<N: AsRef<str>>(&self, name: N) -> bool {
        self.get(name).is_some()
    }

    /// Appends a field, keeping any existing fields with the same name.
    pub fn append(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.fields.push(HeaderField::new(name, value));
    }

    /// Replaces the value of `name`.
    ///
    /// The first matching field keeps its position and spelling and takes the
    /// new value; any later duplicates are removed. When no field matches, a
    /// new one is appended.
    pub fn set<N: AsRef<str>>(&mut self, name: N, value: impl Into<String>) {
        let name = name.as_ref();
        let value = value.into();

        match self.fields.iter().position(|field| field.is(name)) {
            Some(index) => {
                self.fields[index].value = value;
                let mut seen = 0_usize;
                self.fields.retain(|field| {
                    if !field.is(name) {
                        return true;
                    }
                    seen += 1;
                    seen == 1
                });
            }
            None => self.fields.push(HeaderField::new(name, value)),
        }
    }

    /// Removes every field named `name`, returning how many were removed.
    pub fn remove<N: AsRef<str>>(&mut self, name: N) -> usize {
        let name = name.as_ref();
        let before = self.fields.len();
        self.fields.retain(|field| !field.is(name));
        before - self.fields.len()
    }

    pub fn clear(&mut self) {
        self.fields.clear();
    }

    pub fn iter(&self) -> slice::Iter<'_, HeaderField> {
        self.fields.iter()
    }
}

impl<'a> IntoIterator for &'a HeaderFields {
    type Item = &'a HeaderField;
    type IntoIter = slice::Iter<'a, HeaderField>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.iter()
    }
}

impl IntoIterator for HeaderFields {
    type Item = HeaderField;
    type IntoIter = vec::IntoIter<HeaderField>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.into_iter()
    }
}

impl Extend<HeaderField> for HeaderFields {
    fn extend<T: IntoIterator<Item = HeaderField>>(&mut self, iter: T) {
        self.fields.extend(iter);
    }
}

impl FromIterator<HeaderField> for HeaderFields {
    fn from_iter<T: IntoIterator<Item = HeaderField>>(iter: T) -> Self {
        Self { fields: iter.into_iter().collect() }
    }
}

impl<N: Into<String>, V: Into<String>> FromIterator<(N, V)> for HeaderFields {
    fn from_iter<T: IntoIterator<Item = (N, V)>>(iter: T) -> Self {
        iter.into_iter().map(|(name, value)| HeaderField::new(name, value)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::header;

    fn sample() -> HeaderFields {
        [("Host", "a"), ("Set-Cookie", "x=1"), ("Accept", "*/*"), ("set-cookie", "y=2")].into_iter().collect()
    }

    #[test]
    fn lookups_ignore_case() {
        let headers = sample();

        assert_eq!(headers.get("host"), Some("a"));
        assert_eq!(headers.get(header::HOST), Some("a"));
        assert_eq!(headers.get("SET-COOKIE"), Some("x=1"));
        assert_eq!(headers.last("Set-Cookie"), Some("y=2"));
        assert!(headers.get("Content-Length").is_none());
    }

    #[test]
    fn duplicates_are_kept_in_order() {
        let headers = sample();

        let cookies: Vec<_> = headers.get_all("Set-Cookie").collect();
        assert_eq!(cookies, vec!["x=1", "y=2"]);
        assert_eq!(headers.len(), 4);
    }

    #[test]
    fn set_replaces_first_and_drops_duplicates() {
        let mut headers = sample();
        headers.set("SET-COOKIE", "z=3");

        assert_eq!(headers.len(), 3);
        let names: Vec<_> = headers.iter().map(HeaderField::name).collect();
        assert_eq!(names, vec!["Host", "Set-Cookie", "Accept"]);
        assert_eq!(headers.get("set-cookie"), Some("z=3"));
    }

    #[test]
    fn set_appends_when_missing() {
        let mut headers = sample();
        headers.set(header::CONTENT_LENGTH, "10");

        assert_eq!(headers.len(), 5);
        assert_eq!(headers.iter().last().map(HeaderField::name), Some("content-length"));
        assert_eq!(headers.get("Content-Length"), Some("10"));
    }

    #[test]
    fn remove_drops_every_occurrence() {
        let mut headers = sample();

        assert_eq!(headers.remove("set-cookie"), 2);
        assert_eq!(headers.remove("set-cookie"), 0);
        assert_eq!(headers.len(), 2);
        assert!(!headers.contains("Set-Cookie"));
    }
}
