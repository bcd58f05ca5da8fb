//! Plain-data request and response types exchanged with the transport engine.
//!
//! # Design
//! The client never talks to the engine in terms of options. It first
//! resolves its option set into a `PreparedRequest`, a fully explicit
//! description of one transfer, and hands that to a `Transport`. The engine
//! answers with a `RawResponse`: status line, raw header block and body as
//! text, plus transfer statistics. Both sides are owned data so the boundary
//! is easy to fake in tests.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::Serialize;
use url::Url;

use crate::config::HttpVersion;
use crate::error::Error;
use crate::options::{OptionKind, Options, TransportOption};

/// Redirect limit used when following redirects without an explicit cap.
pub const ENGINE_MAX_REDIRECTS: u32 = 50;

/// Verbs with a dedicated dispatch path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Head,
    Options,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Head => "HEAD",
            HttpMethod::Options => "OPTIONS",
        }
    }

    /// Whether a payload travels in the body rather than the query string.
    pub fn sends_body(self) -> bool {
        matches!(
            self,
            HttpMethod::Post | HttpMethod::Put | HttpMethod::Patch | HttpMethod::Delete
        )
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "get" => Ok(HttpMethod::Get),
            "post" => Ok(HttpMethod::Post),
            "put" => Ok(HttpMethod::Put),
            "patch" => Ok(HttpMethod::Patch),
            "delete" => Ok(HttpMethod::Delete),
            "head" => Ok(HttpMethod::Head),
            "options" => Ok(HttpMethod::Options),
            _ => Err(Error::UnsupportedMethod(s.to_string())),
        }
    }
}

/// Data sent with a request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Payload {
    #[default]
    Empty,
    /// Key/value pairs, form-encoded.
    Form(Vec<(String, String)>),
    /// Sent exactly as given.
    Raw(String),
}

impl Payload {
    pub fn form<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Payload::Form(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Payload::Empty => true,
            Payload::Form(pairs) => pairs.is_empty(),
            Payload::Raw(s) => s.is_empty(),
        }
    }

    /// `application/x-www-form-urlencoded` rendering.
    pub fn encode(&self) -> String {
        match self {
            Payload::Empty => String::new(),
            Payload::Form(pairs) => url::form_urlencoded::Serializer::new(String::new())
                .extend_pairs(pairs)
                .finish(),
            Payload::Raw(s) => s.clone(),
        }
    }
}

impl From<&str> for Payload {
    fn from(s: &str) -> Self {
        Payload::Raw(s.to_string())
    }
}

impl From<String> for Payload {
    fn from(s: String) -> Self {
        Payload::Raw(s)
    }
}

impl From<Vec<(String, String)>> for Payload {
    fn from(pairs: Vec<(String, String)>) -> Self {
        Payload::Form(pairs)
    }
}

impl From<&[(&str, &str)]> for Payload {
    fn from(pairs: &[(&str, &str)]) -> Self {
        Payload::form(pairs.iter().copied())
    }
}

impl<const N: usize> From<[(&str, &str); N]> for Payload {
    fn from(pairs: [(&str, &str); N]) -> Self {
        Payload::form(pairs)
    }
}

/// Authentication scheme for `USERPWD` credentials.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthType {
    Any,
    Basic,
}

impl AuthType {
    pub fn as_str(self) -> &'static str {
        match self {
            AuthType::Any => "any",
            AuthType::Basic => "basic",
        }
    }
}

impl FromStr for AuthType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "any" => Ok(AuthType::Any),
            "basic" => Ok(AuthType::Basic),
            other => Err(Error::InvalidConfig(format!("unsupported auth type '{other}'"))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlsSettings {
    pub verify_peer: bool,
    pub verify_host: bool,
    pub ca_file: Option<PathBuf>,
}

impl Default for TlsSettings {
    fn default() -> Self {
        Self {
            verify_peer: true,
            verify_host: true,
            ca_file: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxySettings {
    /// `scheme://[user:pass@]host[:port]`
    pub uri: String,
    pub tunnel: bool,
}

/// One fully resolved transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedRequest {
    pub method: String,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
    pub timeout: Option<Duration>,
    pub connect_timeout: Option<Duration>,
    pub follow_redirects: bool,
    pub max_redirects: u32,
    pub fail_on_error: bool,
    pub http_version: Option<HttpVersion>,
    pub tls: TlsSettings,
    pub proxy: Option<ProxySettings>,
    /// Prefix the raw text output with the response header block.
    pub include_headers: bool,
}

fn non_negative(options: &Options, option: TransportOption) -> Result<Option<u64>, Error> {
    match options.integer(option) {
        None => Ok(None),
        Some(v) => u64::try_from(v).map(Some).map_err(|_| Error::InvalidOptionValue {
            option,
            expected: OptionKind::Integer,
        }),
    }
}

fn seconds(v: Option<u64>) -> Option<Duration> {
    // Zero means "no limit".
    v.filter(|s| *s > 0).map(Duration::from_secs)
}

fn has_header(headers: &[(String, String)], name: &str) -> bool {
    headers.iter().any(|(n, _)| n.eq_ignore_ascii_case(name))
}

/// Percent-encode one userinfo component. Space becomes `%20`, not `+`.
fn encode_userinfo(s: &str) -> String {
    url::form_urlencoded::byte_serialize(s.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}

impl PreparedRequest {
    /// Resolve `options` against `url` into a concrete transfer.
    pub fn from_options(url: &str, options: &Options) -> Result<Self, Error> {
        use TransportOption as O;

        let mut target = Url::parse(url).map_err(|e| Error::InvalidUrl {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
        if let Some(port) = options.integer(O::Port) {
            let port = u16::try_from(port).map_err(|_| Error::InvalidOptionValue {
                option: O::Port,
                expected: OptionKind::Integer,
            })?;
            target.set_port(Some(port)).map_err(|()| Error::InvalidUrl {
                url: url.to_string(),
                reason: "URL cannot carry a port".to_string(),
            })?;
        }

        let post_fields = options.text(O::PostFields).map(str::to_string);
        let method = if let Some(custom) = options.text(O::CustomRequest) {
            custom.to_ascii_uppercase()
        } else if options.flag(O::NoBody) == Some(true) {
            "HEAD".to_string()
        } else if options.flag(O::Post) == Some(true)
            || (post_fields.is_some() && options.flag(O::HttpGet) != Some(true))
        {
            "POST".to_string()
        } else {
            "GET".to_string()
        };
        let body = if method == "HEAD" || method == "GET" {
            None
        } else {
            post_fields
        };

        let mut headers: Vec<(String, String)> = options
            .list(O::HttpHeader)
            .unwrap_or_default()
            .iter()
            .filter_map(|line| line.split_once(':'))
            .map(|(n, v)| (n.trim().to_string(), v.trim().to_string()))
            .filter(|(n, _)| !n.is_empty())
            .collect();
        if let Some(cookie) = options.text(O::Cookie) {
            headers.push(("Cookie".to_string(), cookie.to_string()));
        }
        if let Some(agent) = options.text(O::UserAgent) {
            headers.push(("User-Agent".to_string(), agent.to_string()));
        }
        if let Some(referer) = options.text(O::Referer) {
            headers.push(("Referer".to_string(), referer.to_string()));
        }
        if let Some(auth) = options.text(O::HttpAuth) {
            auth.parse::<AuthType>()?;
        }
        if let Some(credentials) = options.text(O::UserPwd) {
            if !has_header(&headers, "authorization") {
                headers.push((
                    "Authorization".to_string(),
                    format!("Basic {}", STANDARD.encode(credentials)),
                ));
            }
        }
        if body.is_some() && !has_header(&headers, "content-type") {
            headers.push((
                "Content-Type".to_string(),
                "application/x-www-form-urlencoded".to_string(),
            ));
        }

        let http_version = match options.text(O::HttpVersion) {
            None => None,
            Some(v) => Some(HttpVersion::parse(v).ok_or_else(|| {
                Error::InvalidConfig(format!("unsupported HTTP version '{v}'"))
            })?),
        };

        let follow_redirects = options.flag(O::FollowLocation).unwrap_or(false);
        let max_redirects = match options.integer(O::MaxRedirs) {
            Some(n) if n >= 0 => u32::try_from(n).unwrap_or(u32::MAX),
            _ => ENGINE_MAX_REDIRECTS,
        };

        let tls = TlsSettings {
            verify_peer: options.flag(O::SslVerifyPeer).unwrap_or(true),
            verify_host: options.flag(O::SslVerifyHost).unwrap_or(true),
            ca_file: options.text(O::CaInfo).map(PathBuf::from),
        };

        let proxy = options.text(O::Proxy).map(|host| {
            let (scheme, rest) = host.split_once("://").unwrap_or(("http", host));
            let mut uri = format!("{scheme}://");
            if let Some(credentials) = options.text(O::ProxyUserPwd) {
                let (user, password) = credentials.split_once(':').unwrap_or((credentials, ""));
                uri.push_str(&encode_userinfo(user));
                if !password.is_empty() {
                    uri.push(':');
                    uri.push_str(&encode_userinfo(password));
                }
                uri.push('@');
            }
            uri.push_str(rest.trim_end_matches('/'));
            if let Some(port) = options.integer(O::ProxyPort) {
                uri.push_str(&format!(":{port}"));
            }
            ProxySettings {
                uri,
                tunnel: options.flag(O::HttpProxyTunnel).unwrap_or(false),
            }
        });

        Ok(PreparedRequest {
            method,
            url: target.to_string(),
            headers,
            body,
            timeout: seconds(non_negative(options, O::Timeout)?),
            connect_timeout: seconds(non_negative(options, O::ConnectTimeout)?),
            follow_redirects,
            max_redirects,
            fail_on_error: options.flag(O::FailOnError).unwrap_or(false),
            http_version,
            tls,
            proxy,
            include_headers: options.flag(O::Header).unwrap_or(false),
        })
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Statistics about the most recent transfer.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TransferInfo {
    /// Final URL after redirects.
    pub url: String,
    pub http_code: u16,
    pub content_type: Option<String>,
    pub header_size: usize,
    pub size_download: usize,
    /// Seconds.
    pub total_time: f64,
}

impl TransferInfo {
    /// A single field by its serialized name, e.g. `"http_code"`.
    pub fn get(&self, key: &str) -> Option<serde_json::Value> {
        match serde_json::to_value(self) {
            Ok(serde_json::Value::Object(map)) => map.get(key).cloned(),
            _ => None,
        }
    }
}

/// What the engine hands back for a completed transfer.
#[derive(Debug, Clone, PartialEq)]
pub struct RawResponse {
    pub status_line: String,
    pub headers: String,
    pub body: String,
    pub info: TransferInfo,
}

impl RawResponse {
    /// Response text as a single string, optionally with the header block.
    pub fn into_text(self, include_headers: bool) -> String {
        if !include_headers {
            return self.body;
        }
        let mut out = self.status_line;
        out.push_str("\r\n");
        out.push_str(&self.headers);
        out.push_str("\r\n");
        out.push_str(&self.body);
        out
    }
}
