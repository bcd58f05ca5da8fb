//! Immutable HTTP response value.
//!
//! # Design
//! `Response` is a handle around shared state that is never mutated after
//! construction. Every `with_*` method builds fresh state and returns a new
//! handle, so the receiver and any clones of it are unaffected. Removing a
//! header that is not there returns a handle to the very same state; use
//! [`Response::ptr_eq`] to observe that.

use std::fmt;
use std::sync::Arc;

use ureq::http::StatusCode;

use crate::error::Error;
use crate::headers::{parse_headers, HeaderMap};

#[derive(Debug, Clone, PartialEq, Eq)]
struct Inner {
    raw_status_line: String,
    raw_headers: String,
    protocol_version: String,
    status: u16,
    reason: String,
    headers: HeaderMap,
    body: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    inner: Arc<Inner>,
}

/// Split `HTTP/1.1 200 OK` into version, code and reason.
fn parse_status_line(line: &str) -> Result<(String, u16, String), Error> {
    let invalid = || Error::InvalidStatusLine(line.to_string());
    let line = line.trim();
    let mut parts = line.splitn(3, ' ');
    let version = parts
        .next()
        .and_then(|p| p.strip_prefix("HTTP/"))
        .filter(|v| !v.is_empty())
        .ok_or_else(invalid)?;
    let status: u16 = parts
        .next()
        .and_then(|p| p.parse().ok())
        .ok_or_else(invalid)?;
    let reason = parts.next().unwrap_or("").trim().to_string();
    Ok((version.to_string(), status, reason))
}

fn starts_with_status_line(text: &str) -> bool {
    text.starts_with("HTTP/")
        && text
            .lines()
            .next()
            .is_some_and(|line| parse_status_line(line).is_ok())
}

fn canonical_reason(status: u16) -> String {
    StatusCode::from_u16(status)
        .ok()
        .and_then(|s| s.canonical_reason())
        .unwrap_or("")
        .to_string()
}

impl Response {
    /// Build a response from the pieces the engine returns.
    pub fn from_raw(status_line: &str, raw_headers: &str, body: impl Into<String>) -> Result<Self, Error> {
        let (protocol_version, status, reason) = parse_status_line(status_line)?;
        let reason = if reason.is_empty() {
            canonical_reason(status)
        } else {
            reason
        };
        Ok(Self {
            inner: Arc::new(Inner {
                raw_status_line: status_line.trim_end_matches(['\r', '\n']).to_string(),
                raw_headers: raw_headers.to_string(),
                protocol_version,
                status,
                reason,
                headers: parse_headers(raw_headers),
                body: body.into(),
            }),
        })
    }

    /// Parse a complete message: status line, header block, blank line, body.
    ///
    /// When the text holds several header blocks (redirect hops, `100
    /// Continue`, a proxy `CONNECT` reply) the last block describes the
    /// response and everything after it is the body.
    pub fn parse(raw: &str) -> Result<Self, Error> {
        let mut rest = raw;
        loop {
            let (head, tail) = match rest.find("\r\n\r\n") {
                Some(i) => (&rest[..i], &rest[i + 4..]),
                None => match rest.find("\n\n") {
                    Some(i) => (&rest[..i], &rest[i + 2..]),
                    None => (rest, ""),
                },
            };
            if starts_with_status_line(tail) {
                rest = tail;
                continue;
            }
            let (status_line, headers) = head.split_once('\n').unwrap_or((head, ""));
            return Self::from_raw(status_line, headers, tail);
        }
    }

    /// Protocol version without the `HTTP/` prefix, e.g. `"1.1"`.
    pub fn protocol_version(&self) -> &str {
        &self.inner.protocol_version
    }

    pub fn status(&self) -> u16 {
        self.inner.status
    }

    pub fn reason_phrase(&self) -> &str {
        &self.inner.reason
    }

    pub fn body(&self) -> &str {
        &self.inner.body
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.inner.headers
    }

    pub fn header(&self, name: &str) -> &[String] {
        self.inner.headers.get(name)
    }

    pub fn header_line(&self, name: &str) -> String {
        self.inner.headers.get_line(name)
    }

    pub fn has_header(&self, name: &str) -> bool {
        self.inner.headers.contains(name)
    }

    /// The status line as received.
    pub fn raw_status_line(&self) -> &str {
        &self.inner.raw_status_line
    }

    /// The header block as received. Not updated by `with_*` methods.
    pub fn raw_headers(&self) -> &str {
        &self.inner.raw_headers
    }

    /// True when both handles share the same underlying state.
    pub fn ptr_eq(a: &Response, b: &Response) -> bool {
        Arc::ptr_eq(&a.inner, &b.inner)
    }

    fn derive(&self, change: impl FnOnce(&mut Inner)) -> Response {
        let mut inner = Inner::clone(&self.inner);
        change(&mut inner);
        Response {
            inner: Arc::new(inner),
        }
    }

    /// Copy with every value of `name` replaced by `value`.
    pub fn with_header(&self, name: &str, value: &str) -> Response {
        self.derive(|inner| inner.headers.insert(name, value))
    }

    /// Copy with `value` appended to `name`.
    pub fn with_added_header(&self, name: &str, value: &str) -> Response {
        self.derive(|inner| inner.headers.append(name, value))
    }

    /// Copy without `name`, or `self` again if there is no such header.
    pub fn without_header(&self, name: &str) -> Response {
        if !self.has_header(name) {
            return self.clone();
        }
        self.derive(|inner| {
            inner.headers.remove(name);
        })
    }

    pub fn with_body(&self, body: impl Into<String>) -> Response {
        let body = body.into();
        self.derive(|inner| inner.body = body)
    }

    /// Copy with a new status. An empty `reason` picks the canonical phrase.
    pub fn with_status(&self, status: u16, reason: &str) -> Result<Response, Error> {
        if !(100..=599).contains(&status) {
            return Err(Error::InvalidStatus(status));
        }
        let reason = if reason.is_empty() {
            canonical_reason(status)
        } else {
            reason.to_string()
        };
        Ok(self.derive(|inner| {
            inner.status = status;
            inner.reason = reason;
        }))
    }

    pub fn with_protocol_version(&self, version: &str) -> Response {
        self.derive(|inner| inner.protocol_version = version.to_string())
    }
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.inner.body)
    }
}
