//! Multi-valued query parameters
//!
//! Search and link handlers read loosely-typed, possibly repeated query
//! parameters (`?tags=a&tags=b`). `QueryMap` keeps every value in arrival
//! order and offers the lookups those handlers need. It is never mutated
//! after parsing.

use indexmap::IndexMap;

/// Read-only view over a request's query string
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryMap {
    values: IndexMap<String, Vec<String>>,
}

impl QueryMap {
    /// Parse a raw (still percent-encoded) query string
    pub fn parse(raw: &str) -> Self {
        let mut values: IndexMap<String, Vec<String>> = IndexMap::new();
        for (key, value) in url::form_urlencoded::parse(raw.as_bytes()) {
            values
                .entry(key.into_owned())
                .or_default()
                .push(value.into_owned());
        }
        Self { values }
    }

    /// Build a map from key/value pairs
    pub fn from_pairs<K, V, I>(pairs: I) -> Self
    where
        K: Into<String>,
        V: Into<String>,
        I: IntoIterator<Item = (K, V)>,
    {
        let mut values: IndexMap<String, Vec<String>> = IndexMap::new();
        for (key, value) in pairs {
            values.entry(key.into()).or_default().push(value.into());
        }
        Self { values }
    }

    /// True if the key appears at all, even with an empty value
    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// First value for the key
    pub fn first(&self, key: &str) -> Option<&str> {
        self.values
            .get(key)
            .and_then(|v| v.first())
            .map(String::as_str)
    }

    /// First value for the key, ignoring blank values
    pub fn non_blank(&self, key: &str) -> Option<&str> {
        self.first(key).filter(|v| !v.trim().is_empty())
    }

    /// Every value for the key, or `None` when the key is absent
    pub fn all(&self, key: &str) -> Option<&[String]> {
        self.values.get(key).map(Vec::as_slice)
    }

    /// Parse the first value, falling back when absent or unparsable
    pub fn parse_or<T: std::str::FromStr>(&self, key: &str, default: T) -> T {
        self.first(key)
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(default)
    }

    /// Lenient boolean: only a case-insensitive "true" is true
    pub fn flag(&self, key: &str) -> Option<bool> {
        self.first(key).map(|v| v.trim().eq_ignore_ascii_case("true"))
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repeated_keys_keep_order() {
        let q = QueryMap::parse("tags=vip&tags=active&q=x");
        assert_eq!(
            q.all("tags").unwrap(),
            &["vip".to_string(), "active".to_string()]
        );
        assert_eq!(q.first("q"), Some("x"));
    }

    #[test]
    fn test_presence_without_value() {
        let q = QueryMap::parse("count&childrenonly=");
        assert!(q.contains("count"));
        assert!(q.contains("childrenonly"));
        assert_eq!(q.first("count"), Some(""));
        assert_eq!(q.non_blank("count"), None);
    }

    #[test]
    fn test_percent_decoding() {
        let q = QueryMap::parse("latlng=40.7%2C-74.0&q=hello+world");
        assert_eq!(q.first("latlng"), Some("40.7,-74.0"));
        assert_eq!(q.first("q"), Some("hello world"));
    }

    #[test]
    fn test_parse_or_falls_back() {
        let q = QueryMap::parse("radius=abc&limit=5");
        assert_eq!(q.parse_or("radius", 10u32), 10);
        assert_eq!(q.parse_or("limit", 30usize), 5);
        assert_eq!(q.parse_or("missing", 7i64), 7);
    }

    #[test]
    fn test_flag_is_lenient() {
        let q = QueryMap::from_pairs([("a", "TRUE"), ("b", "yes"), ("c", "")]);
        assert_eq!(q.flag("a"), Some(true));
        assert_eq!(q.flag("b"), Some(false));
        assert_eq!(q.flag("c"), Some(false));
        assert_eq!(q.flag("d"), None);
    }
}
