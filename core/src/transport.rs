//! The seam between the request builder and the engine doing the I/O.
//!
//! # Design
//! `Transport` takes a `PreparedRequest` and returns a `RawResponse` or a
//! `TransportError`. `UreqTransport` is the production engine: it opens a
//! fresh `ureq` agent for every call, configured from the prepared request,
//! and drops it when the call returns. Connection handling, TLS, redirects
//! and timeouts are all the engine's business.

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, trace};
use ureq::http::{self, Version};
use ureq::tls::{parse_pem, PemItem, RootCerts, TlsConfig};
use ureq::{Agent, Body, Proxy, ResponseExt};

use crate::config::HttpVersion;
use crate::error::{TransportError, TransportErrorKind};
use crate::http::{PreparedRequest, RawResponse, TransferInfo};

/// Executes one prepared request.
pub trait Transport {
    fn perform(&self, request: &PreparedRequest) -> Result<RawResponse, TransportError>;
}

/// `ureq`-backed engine.
#[derive(Debug, Clone, Default)]
pub struct UreqTransport;

impl UreqTransport {
    pub fn new() -> Self {
        Self
    }
}

fn tls_config(request: &PreparedRequest) -> Result<TlsConfig, TransportError> {
    let tls = &request.tls;
    let mut builder = TlsConfig::builder().disable_verification(!tls.verify_peer || !tls.verify_host);
    if let Some(path) = &tls.ca_file {
        let pem = std::fs::read(path).map_err(|e| {
            TransportError::new(
                TransportErrorKind::Tls,
                format!("error reading CA file {}: {e}", path.display()),
            )
        })?;
        let certs: Vec<_> = parse_pem(&pem)
            .filter_map(|item| match item {
                Ok(PemItem::Certificate(cert)) => Some(cert.to_owned()),
                _ => None,
            })
            .collect();
        if certs.is_empty() {
            return Err(TransportError::new(
                TransportErrorKind::Tls,
                format!("no certificates found in {}", path.display()),
            ));
        }
        builder = builder.root_certs(RootCerts::Specific(Arc::new(certs)));
    }
    Ok(builder.build())
}

fn agent_for(request: &PreparedRequest) -> Result<Agent, TransportError> {
    let proxy = match &request.proxy {
        Some(p) => {
            trace!(uri = %p.uri, tunnel = p.tunnel, "using proxy");
            Some(Proxy::new(&p.uri).map_err(map_error)?)
        }
        None => None,
    };
    // Not following means handing back the 3xx itself rather than an error.
    let max_redirects = if request.follow_redirects {
        request.max_redirects
    } else {
        0
    };
    let agent = Agent::config_builder()
        .http_status_as_error(request.fail_on_error)
        .max_redirects(max_redirects)
        .max_redirects_will_error(request.follow_redirects)
        .timeout_global(request.timeout)
        .timeout_connect(request.connect_timeout)
        .allow_non_standard_methods(true)
        .tls_config(tls_config(request)?)
        .proxy(proxy)
        .build()
        .new_agent();
    Ok(agent)
}

fn map_error(err: ureq::Error) -> TransportError {
    use TransportErrorKind as K;
    let kind = match &err {
        ureq::Error::StatusCode(_) => K::HttpStatus,
        ureq::Error::Timeout(_) => K::Timeout,
        ureq::Error::HostNotFound => K::ResolveHost,
        ureq::Error::ConnectionFailed => K::Connect,
        ureq::Error::TooManyRedirects => K::TooManyRedirects,
        ureq::Error::BadUri(_) | ureq::Error::Http(_) => K::InvalidUrl,
        ureq::Error::Io(e) if e.kind() == std::io::ErrorKind::ConnectionRefused => K::Connect,
        ureq::Error::Io(e) if e.kind() == std::io::ErrorKind::TimedOut => K::Timeout,
        ureq::Error::Io(_) => K::Io,
        _ => K::Other,
    };
    let message = match &err {
        ureq::Error::StatusCode(code) => format!("the requested URL returned error: {code}"),
        other => other.to_string(),
    };
    TransportError::new(kind, message)
}

fn version_str(version: Version) -> &'static str {
    match version {
        Version::HTTP_09 => "HTTP/0.9",
        Version::HTTP_10 => "HTTP/1.0",
        Version::HTTP_2 => "HTTP/2",
        Version::HTTP_3 => "HTTP/3",
        _ => "HTTP/1.1",
    }
}

fn read_response(
    mut response: http::Response<Body>,
    started: Instant,
) -> Result<RawResponse, TransportError> {
    let status = response.status();
    let status_line = format!(
        "{} {} {}",
        version_str(response.version()),
        status.as_u16(),
        status.canonical_reason().unwrap_or("")
    )
    .trim_end()
    .to_string();

    let mut headers = String::new();
    for (name, value) in response.headers() {
        headers.push_str(name.as_str());
        headers.push_str(": ");
        headers.push_str(&String::from_utf8_lossy(value.as_bytes()));
        headers.push_str("\r\n");
    }
    let content_type = response
        .headers()
        .get(http::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let url = response.get_uri().to_string();

    let body = response.body_mut().read_to_string().map_err(map_error)?;

    let info = TransferInfo {
        url,
        http_code: status.as_u16(),
        content_type,
        header_size: status_line.len() + 2 + headers.len() + 2,
        size_download: body.len(),
        total_time: started.elapsed().as_secs_f64(),
    };
    Ok(RawResponse {
        status_line,
        headers,
        body,
        info,
    })
}

impl Transport for UreqTransport {
    fn perform(&self, request: &PreparedRequest) -> Result<RawResponse, TransportError> {
        let agent = agent_for(request)?;

        let mut builder = http::Request::builder()
            .method(request.method.as_str())
            .uri(request.url.as_str());
        if let Some(version) = request.http_version {
            builder = builder.version(match version {
                HttpVersion::Http10 => Version::HTTP_10,
                HttpVersion::Http11 => Version::HTTP_11,
            });
        }
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let started = Instant::now();
        let sent = match &request.body {
            Some(body) => builder.body(body.clone()).map(|r| agent.run(r)),
            None => builder.body(()).map(|r| agent.run(r)),
        };
        let response = sent
            .map_err(|e| TransportError::new(TransportErrorKind::InvalidUrl, e.to_string()))?
            .map_err(map_error)?;

        let raw = read_response(response, started)?;
        debug!(
            status = raw.info.http_code,
            bytes = raw.info.size_download,
            elapsed_ms = (raw.info.total_time * 1000.0) as u64,
            "transfer complete"
        );
        Ok(raw)
    }
}
