/// A single header line as it appears on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderEntry {
    pub key: String,
    pub value: String,
}

/// Ordered collection of header entries.
///
/// Insertion order is kept so that responses are serialized in the order the
/// headers were added. Lookups ignore ASCII case in the key. Duplicate keys are
/// stored as separate entries and are never merged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    entries: Vec<HeaderEntry>,
}

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a header, keeping any existing entries with the same key.
    pub fn add(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.push(HeaderEntry {
            key: key.into(),
            value: value.into(),
        });
    }

    /// Appends a header whose value is the decimal form of `value`.
    pub fn add_int(&mut self, key: impl Into<String>, value: u64) {
        self.add(key, value.to_string());
    }

    /// Returns the value of the first entry whose key matches `key`,
    /// ignoring ASCII case.
    ///
    /// # Example
    ///
    /// ```
    /// # use staticd::http::headers::Headers;
    /// let mut headers = Headers::new();
    /// headers.add("Content-Length", "42");
    /// assert_eq!(headers.get("content-length"), Some("42"));
    /// assert_eq!(headers.get("missing"), None);
    /// ```
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.key.eq_ignore_ascii_case(key))
            .map(|e| e.value.as_str())
    }

    /// Iterates over every value stored under `key`, in insertion order.
    pub fn get_all<'a, 'k>(&'a self, key: &'k str) -> impl Iterator<Item = &'a str> + use<'a, 'k> {
        self.entries
            .iter()
            .filter(move |e| e.key.eq_ignore_ascii_case(key))
            .map(|e| e.value.as_str())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|e| (e.key.as_str(), e.value.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'a> IntoIterator for &'a Headers {
    type Item = &'a HeaderEntry;
    type IntoIter = std::slice::Iter<'a, HeaderEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
