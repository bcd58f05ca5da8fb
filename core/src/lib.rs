//! Chainable HTTP client over the `ureq` transport engine.
//!
//! # Overview
//! A `Client` collects headers, cookies, credentials, proxy and TLS settings
//! and transport options through chained setters, then sends one request and
//! returns an immutable `Response`. Connection handling, TLS, redirects and
//! timeouts belong to the engine; this crate maps settings onto it and parses
//! what comes back.
//!
//! # Design
//! - Options are a closed enum (`TransportOption`) with a static table of
//!   symbolic names, so text configuration is still possible but typos and
//!   kind mismatches are caught before any I/O.
//! - Requests are resolved into a plain-data `PreparedRequest` and executed
//!   through the `Transport` trait, so the I/O boundary is explicit and the
//!   builder can be tested without a network.
//! - `Response` is a persistent value: `with_*` methods return new values and
//!   never touch the receiver.
//! - The client's working state is reset after every call.

pub mod client;
pub mod config;
pub mod error;
pub mod headers;
pub mod http;
pub mod options;
pub mod response;
pub mod transport;

pub use client::Client;
pub use config::{ClientConfig, HttpVersion};
pub use error::{Error, TransportError, TransportErrorKind};
pub use headers::{parse_headers, HeaderMap};
pub use http::{AuthType, HttpMethod, Payload, PreparedRequest, RawResponse, TransferInfo};
pub use options::{OptionKind, OptionValue, Options, TransportOption};
pub use response::Response;
pub use transport::{Transport, UreqTransport};
