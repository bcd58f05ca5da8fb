//! Case-insensitive header multi-map and the raw header block parser.
//!
//! # Design
//! Entries live in a `Vec` in first-seen order. Header blocks are small, so a
//! linear scan with `eq_ignore_ascii_case` beats hashing a lowercased copy of
//! every name. The first spelling of a name is kept for rendering.

use tracing::trace;

/// Ordered multi-map from header name to values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderMap {
    entries: Vec<(String, Vec<String>)>,
}

impl HeaderMap {
    pub fn new() -> Self {
        Self::default()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.entries
            .iter()
            .position(|(n, _)| n.eq_ignore_ascii_case(name))
    }

    /// All values for `name` in the order they were added. Empty when absent.
    pub fn get(&self, name: &str) -> &[String] {
        match self.position(name) {
            Some(i) => &self.entries[i].1,
            None => &[],
        }
    }

    /// Values for `name` joined with `", "`.
    pub fn get_line(&self, name: &str) -> String {
        self.get(name).join(", ")
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Number of distinct names.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_slice()))
    }

    /// Replace every value of `name` with `value`.
    pub fn insert(&mut self, name: &str, value: &str) {
        match self.position(name) {
            Some(i) => self.entries[i].1 = vec![value.to_string()],
            None => self
                .entries
                .push((name.to_string(), vec![value.to_string()])),
        }
    }

    /// Add `value` after any existing values of `name`.
    pub fn append(&mut self, name: &str, value: &str) {
        match self.position(name) {
            Some(i) => self.entries[i].1.push(value.to_string()),
            None => self
                .entries
                .push((name.to_string(), vec![value.to_string()])),
        }
    }

    /// Drop `name`. Returns `false` if it was not present.
    pub fn remove(&mut self, name: &str) -> bool {
        match self.position(name) {
            Some(i) => {
                self.entries.remove(i);
                true
            }
            None => false,
        }
    }

    /// Render as a header block, one CRLF-terminated line per value.
    pub fn to_raw(&self) -> String {
        let mut out = String::new();
        for (name, values) in &self.entries {
            for value in values {
                out.push_str(name);
                out.push_str(": ");
                out.push_str(value);
                out.push_str("\r\n");
            }
        }
        out
    }
}

fn trim_ows(s: &str) -> &str {
    s.trim_matches(|c| c == ' ' || c == '\t')
}

/// Parse a raw header block into a [`HeaderMap`].
///
/// Lines without a colon (including a leading status line) are skipped, as
/// are lines whose name is blank. Repeated names accumulate values in order.
pub fn parse_headers(raw: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    for line in raw.split('\n') {
        let line = line.strip_suffix('\r').unwrap_or(line);
        let Some((name, value)) = line.split_once(':') else {
            if !line.is_empty() {
                trace!(line, "skipping header line without colon");
            }
            continue;
        };
        let name = trim_ows(name);
        if name.is_empty() {
            trace!(line, "skipping header line with empty name");
            continue;
        }
        headers.append(name, trim_ows(value));
    }
    headers
}
