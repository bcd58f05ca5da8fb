//! Error types for the client.
//!
//! # Design
//! Two classes. Setup errors describe misuse (an unsupported verb, an option
//! fed the wrong kind of value, a malformed URL) and are returned before any
//! network activity. Transport failures come back from the engine as
//! `Error::Transport`; the same `TransportError` is also stored on the client
//! so its code and message can be read after the call.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::options::{OptionKind, TransportOption};

/// Errors returned by `Client` and `Response`.
#[derive(Debug, Error)]
pub enum Error {
    #[error("method '{0}' is not supported")]
    UnsupportedMethod(String),

    #[error("unknown transport option '{0}'")]
    UnknownOption(String),

    #[error("option {option} expects a {expected} value")]
    InvalidOptionValue {
        option: TransportOption,
        expected: OptionKind,
    },

    #[error("invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("cannot read CA file {path}: {source}")]
    CaFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed status line '{0}'")]
    InvalidStatusLine(String),

    #[error("status code {0} is outside 100..=599")]
    InvalidStatus(u16),

    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl Error {
    /// True for failures reported by the transport engine.
    pub fn is_transport(&self) -> bool {
        matches!(self, Error::Transport(_))
    }

    pub fn as_transport(&self) -> Option<&TransportError> {
        match self {
            Error::Transport(e) => Some(e),
            _ => None,
        }
    }
}

/// Category of a transport failure. Discriminants are stable error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportErrorKind {
    Other = 2,
    InvalidUrl = 3,
    ResolveHost = 6,
    Connect = 7,
    HttpStatus = 22,
    Timeout = 28,
    Tls = 35,
    TooManyRedirects = 47,
    Io = 56,
}

/// A failure reported by the transport engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct TransportError {
    pub kind: TransportErrorKind,
    pub message: String,
}

impl TransportError {
    pub fn new(kind: TransportErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn code(&self) -> u32 {
        self.kind as u32
    }
}

impl fmt::Display for TransportErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TransportErrorKind::Other => "transfer failed",
            TransportErrorKind::InvalidUrl => "invalid URL",
            TransportErrorKind::ResolveHost => "could not resolve host",
            TransportErrorKind::Connect => "could not connect",
            TransportErrorKind::HttpStatus => "HTTP error status",
            TransportErrorKind::Timeout => "timed out",
            TransportErrorKind::Tls => "TLS failure",
            TransportErrorKind::TooManyRedirects => "too many redirects",
            TransportErrorKind::Io => "I/O failure",
        };
        f.write_str(s)
    }
}
