//! Client-wide defaults applied to every request that does not override them.

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// HTTP protocol version requested from the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HttpVersion {
    #[serde(rename = "1.0")]
    Http10,
    #[serde(rename = "1.1")]
    Http11,
}

impl HttpVersion {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpVersion::Http10 => "1.0",
            HttpVersion::Http11 => "1.1",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "1.0" => Some(HttpVersion::Http10),
            "1.1" => Some(HttpVersion::Http11),
            _ => None,
        }
    }
}

/// Defaults for timeout, strict failure mode, redirect limit and protocol.
///
/// Missing fields in a JSON document take the defaults below.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClientConfig {
    /// Whole-transfer time limit, in seconds.
    pub timeout: u64,
    /// Treat HTTP status >= 400 as a transport failure.
    pub strict_mode: bool,
    pub max_redirects: u32,
    pub http_version: Option<HttpVersion>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: 28,
            strict_mode: false,
            max_redirects: 10,
            http_version: None,
        }
    }
}

impl ClientConfig {
    pub fn from_json_str(json: &str) -> Result<Self, Error> {
        serde_json::from_str(json).map_err(|e| Error::InvalidConfig(e.to_string()))
    }
}
