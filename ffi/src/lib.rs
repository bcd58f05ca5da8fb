//! C-ABI wrapper around `httpwrap-core`.
//!
//! # Overview
//! Exposes the configurable HTTP client through `extern "C"` functions so
//! any language with a C FFI can send requests and read immutable responses.
//!
//! # Design
//! - Every `extern "C"` function wraps its body in `catch_unwind` so panics
//!   never cross the FFI boundary.
//! - Setters return an `FfiErrorCode`; `hw_request*` returns null on failure.
//!   Either way the failure stays on the client and can be read back with
//!   `hw_error_code`, `hw_error_transport_code` and `hw_error_message`. A
//!   call that succeeds clears it.
//! - String arguments must be UTF-8. Null is accepted only where documented;
//!   anything else is rejected before the client is touched.
//! - The C caller owns all returned pointers. Strings go back through
//!   `hw_free_string`, handles through their matching `*_free`.

pub mod types;

use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::panic::catch_unwind;
use std::path::Path;

use httpwrap_core::{Client, ClientConfig, HttpMethod, OptionValue, Options, Payload, TransportOption};

use types::*;

/// Borrow a C string that may be null.
unsafe fn optional_str<'a>(ptr: *const c_char, name: &'static str) -> Result<Option<&'a str>, ArgError> {
    if ptr.is_null() {
        return Ok(None);
    }
    unsafe { CStr::from_ptr(ptr) }
        .to_str()
        .map(Some)
        .map_err(|_| ArgError::NotUtf8(name))
}

/// Borrow a C string that must be present.
unsafe fn required_str<'a>(ptr: *const c_char, name: &'static str) -> Result<&'a str, ArgError> {
    unsafe { optional_str(ptr, name) }?.ok_or(ArgError::Null(name))
}

// ---------------------------------------------------------------------------
// Client lifecycle
// ---------------------------------------------------------------------------

/// Create a client with default configuration.
///
/// The caller must free the returned pointer with `hw_client_free`.
#[unsafe(no_mangle)]
pub extern "C" fn hw_client_new() -> *mut FfiClient {
    catch_unwind(|| Box::into_raw(Box::new(FfiClient::new(Client::default()))))
        .unwrap_or(std::ptr::null_mut())
}

/// Create a client from a JSON configuration document, e.g.
/// `{"timeout": 5, "strict_mode": true}`.
///
/// Returns null if `config_json` is null, not UTF-8, or not a valid
/// configuration.
#[unsafe(no_mangle)]
pub extern "C" fn hw_client_new_with_config(config_json: *const c_char) -> *mut FfiClient {
    catch_unwind(|| {
        let Ok(text) = (unsafe { required_str(config_json, "config_json") }) else {
            return std::ptr::null_mut();
        };
        match ClientConfig::from_json_str(text) {
            Ok(config) => Box::into_raw(Box::new(FfiClient::new(Client::new(config)))),
            Err(_) => std::ptr::null_mut(),
        }
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Free a client created by `hw_client_new*`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn hw_client_free(client: *mut FfiClient) {
    if !client.is_null() {
        let _ = catch_unwind(|| {
            drop(unsafe { Box::from_raw(client) });
        });
    }
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Add a request header for the next request.
#[unsafe(no_mangle)]
pub extern "C" fn hw_set_header(
    client: *mut FfiClient,
    name: *const c_char,
    value: *const c_char,
) -> FfiErrorCode {
    catch_unwind(|| {
        if client.is_null() {
            return FfiErrorCode::NullArg;
        }
        let client = unsafe { &mut *client };
        let args = unsafe { (required_str(name, "name"), required_str(value, "value")) };
        let (name, value) = match args {
            (Ok(name), Ok(value)) => (name, value),
            (Err(e), _) | (_, Err(e)) => return client.record_arg(e),
        };
        client.inner.http_header(name, value);
        client.succeed()
    })
    .unwrap_or(FfiErrorCode::Panic)
}

/// Set a transport option by name. `value` is parsed for the option's kind:
/// `1`/`0` or `true`/`false` for flags, decimal for integers, and
/// newline-separated entries for lists.
#[unsafe(no_mangle)]
pub extern "C" fn hw_set_option(
    client: *mut FfiClient,
    name: *const c_char,
    value: *const c_char,
) -> FfiErrorCode {
    catch_unwind(|| {
        if client.is_null() {
            return FfiErrorCode::NullArg;
        }
        let client = unsafe { &mut *client };
        let args = unsafe { (required_str(name, "name"), required_str(value, "value")) };
        let (name, value) = match args {
            (Ok(name), Ok(value)) => (name, value),
            (Err(e), _) | (_, Err(e)) => return client.record_arg(e),
        };
        let applied = name.parse::<TransportOption>().and_then(|option| {
            let value = OptionValue::parse_for(option, value)?;
            client.inner.set_option(option, value).map(|_| ())
        });
        match applied {
            Ok(()) => client.succeed(),
            Err(e) => client.record(&e),
        }
    })
    .unwrap_or(FfiErrorCode::Panic)
}

/// Send `cookie` verbatim as the `Cookie` header.
#[unsafe(no_mangle)]
pub extern "C" fn hw_set_cookie(client: *mut FfiClient, cookie: *const c_char) -> FfiErrorCode {
    catch_unwind(|| {
        if client.is_null() {
            return FfiErrorCode::NullArg;
        }
        let client = unsafe { &mut *client };
        match unsafe { required_str(cookie, "cookie") } {
            Ok(cookie) => {
                client.inner.set_cookie_string(cookie);
                client.succeed()
            }
            Err(e) => client.record_arg(e),
        }
    })
    .unwrap_or(FfiErrorCode::Panic)
}

/// Credentials for the target server.
#[unsafe(no_mangle)]
pub extern "C" fn hw_set_login(
    client: *mut FfiClient,
    username: *const c_char,
    password: *const c_char,
) -> FfiErrorCode {
    catch_unwind(|| {
        if client.is_null() {
            return FfiErrorCode::NullArg;
        }
        let client = unsafe { &mut *client };
        let args = unsafe { (required_str(username, "username"), required_str(password, "password")) };
        let (user, pass) = match args {
            (Ok(user), Ok(pass)) => (user, pass),
            (Err(e), _) | (_, Err(e)) => return client.record_arg(e),
        };
        client.inner.http_login(user, pass, None);
        client.succeed()
    })
    .unwrap_or(FfiErrorCode::Panic)
}

/// Route requests through `host:port`.
#[unsafe(no_mangle)]
pub extern "C" fn hw_set_proxy(
    client: *mut FfiClient,
    host: *const c_char,
    port: u16,
    tunnel: bool,
) -> FfiErrorCode {
    catch_unwind(|| {
        if client.is_null() {
            return FfiErrorCode::NullArg;
        }
        let client = unsafe { &mut *client };
        match unsafe { required_str(host, "host") } {
            Ok(host) => {
                client.inner.proxy(host, port, tunnel);
                client.succeed()
            }
            Err(e) => client.record_arg(e),
        }
    })
    .unwrap_or(FfiErrorCode::Panic)
}

/// TLS verification settings. `ca_file` may be null.
#[unsafe(no_mangle)]
pub extern "C" fn hw_set_secure(
    client: *mut FfiClient,
    verify_peer: bool,
    ca_file: *const c_char,
    verify_host: bool,
) -> FfiErrorCode {
    catch_unwind(|| {
        if client.is_null() {
            return FfiErrorCode::NullArg;
        }
        let client = unsafe { &mut *client };
        let ca_file = match unsafe { optional_str(ca_file, "ca_file") } {
            Ok(path) => path.map(Path::new),
            Err(e) => return client.record_arg(e),
        };
        match client.inner.secure(verify_peer, ca_file, verify_host) {
            Ok(_) => client.succeed(),
            Err(e) => client.record(&e),
        }
    })
    .unwrap_or(FfiErrorCode::Panic)
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

fn dispatch(
    client: &mut FfiClient,
    method: Result<HttpMethod, httpwrap_core::Error>,
    url: &str,
    payload: Option<&str>,
) -> *mut FfiResponse {
    let payload = payload.map(Payload::from).unwrap_or_default();
    let sent = method.and_then(|m| client.inner.send(m, url, payload, Options::new()));
    match sent {
        Ok(response) => {
            client.succeed();
            Box::into_raw(Box::new(FfiResponse { inner: response }))
        }
        Err(e) => {
            client.record(&e);
            std::ptr::null_mut()
        }
    }
}

/// Send `method` to `url`. `payload` may be null; otherwise it is sent as
/// an already-encoded body, or appended to the query for GET and HEAD.
///
/// Returns null on failure. Free the response with `hw_response_free`.
#[unsafe(no_mangle)]
pub extern "C" fn hw_request(
    client: *mut FfiClient,
    method: FfiHttpMethod,
    url: *const c_char,
    payload: *const c_char,
) -> *mut FfiResponse {
    catch_unwind(|| {
        if client.is_null() {
            return std::ptr::null_mut();
        }
        let client = unsafe { &mut *client };
        let args = unsafe { (required_str(url, "url"), optional_str(payload, "payload")) };
        match args {
            (Ok(url), Ok(payload)) => dispatch(client, Ok(method.into()), url, payload),
            (Err(e), _) | (_, Err(e)) => {
                client.record_arg(e);
                std::ptr::null_mut()
            }
        }
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Like `hw_request` with the verb given as text, e.g. `"patch"`.
/// An unsupported verb fails with `UnsupportedMethod`.
#[unsafe(no_mangle)]
pub extern "C" fn hw_request_named(
    client: *mut FfiClient,
    method: *const c_char,
    url: *const c_char,
    payload: *const c_char,
) -> *mut FfiResponse {
    catch_unwind(|| {
        if client.is_null() {
            return std::ptr::null_mut();
        }
        let client = unsafe { &mut *client };
        let args = unsafe {
            (
                required_str(method, "method"),
                required_str(url, "url"),
                optional_str(payload, "payload"),
            )
        };
        match args {
            (Ok(method), Ok(url), Ok(payload)) => dispatch(client, method.parse(), url, payload),
            (Err(e), _, _) | (_, Err(e), _) | (_, _, Err(e)) => {
                client.record_arg(e);
                std::ptr::null_mut()
            }
        }
    })
    .unwrap_or(std::ptr::null_mut())
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Code of the failure of the most recent call made through `client`, or
/// `Ok` if that call succeeded.
#[unsafe(no_mangle)]
pub extern "C" fn hw_error_code(client: *const FfiClient) -> FfiErrorCode {
    catch_unwind(|| {
        if client.is_null() {
            return FfiErrorCode::NullArg;
        }
        let client = unsafe { &*client };
        client
            .last_error
            .as_ref()
            .map(|e| e.code)
            .unwrap_or(FfiErrorCode::Ok)
    })
    .unwrap_or(FfiErrorCode::Panic)
}

/// Numeric transport error code of the most recent call's failure (e.g. 28
/// for a timeout), or 0 when there is none or it was not a transport error.
#[unsafe(no_mangle)]
pub extern "C" fn hw_error_transport_code(client: *const FfiClient) -> u32 {
    catch_unwind(|| {
        if client.is_null() {
            return 0;
        }
        let client = unsafe { &*client };
        client.last_error.as_ref().map(|e| e.transport_code).unwrap_or(0)
    })
    .unwrap_or(0)
}

/// Message of the most recent call's failure, or null if it succeeded.
/// Free with `hw_free_string`.
#[unsafe(no_mangle)]
pub extern "C" fn hw_error_message(client: *const FfiClient) -> *mut c_char {
    catch_unwind(|| {
        if client.is_null() {
            return std::ptr::null_mut();
        }
        let client = unsafe { &*client };
        match &client.last_error {
            Some(e) => to_c_string(&e.message),
            None => std::ptr::null_mut(),
        }
    })
    .unwrap_or(std::ptr::null_mut())
}

// ---------------------------------------------------------------------------
// Response accessors
// ---------------------------------------------------------------------------

/// Status code, or 0 if `response` is null.
#[unsafe(no_mangle)]
pub extern "C" fn hw_response_status(response: *const FfiResponse) -> u16 {
    catch_unwind(|| {
        if response.is_null() {
            return 0;
        }
        unsafe { &*response }.inner.status()
    })
    .unwrap_or(0)
}

#[unsafe(no_mangle)]
pub extern "C" fn hw_response_reason(response: *const FfiResponse) -> *mut c_char {
    catch_unwind(|| {
        if response.is_null() {
            return std::ptr::null_mut();
        }
        to_c_string(unsafe { &*response }.inner.reason_phrase())
    })
    .unwrap_or(std::ptr::null_mut())
}

#[unsafe(no_mangle)]
pub extern "C" fn hw_response_protocol_version(response: *const FfiResponse) -> *mut c_char {
    catch_unwind(|| {
        if response.is_null() {
            return std::ptr::null_mut();
        }
        to_c_string(unsafe { &*response }.inner.protocol_version())
    })
    .unwrap_or(std::ptr::null_mut())
}

/// All values of header `name` joined with `", "`. Null if the header is
/// absent or `name` is null or not UTF-8.
#[unsafe(no_mangle)]
pub extern "C" fn hw_response_header_line(
    response: *const FfiResponse,
    name: *const c_char,
) -> *mut c_char {
    catch_unwind(|| {
        if response.is_null() {
            return std::ptr::null_mut();
        }
        let Ok(name) = (unsafe { required_str(name, "name") }) else {
            return std::ptr::null_mut();
        };
        let response = unsafe { &*response };
        if !response.inner.has_header(name) {
            return std::ptr::null_mut();
        }
        to_c_string(&response.inner.header_line(name))
    })
    .unwrap_or(std::ptr::null_mut())
}

#[unsafe(no_mangle)]
pub extern "C" fn hw_response_body(response: *const FfiResponse) -> *mut c_char {
    catch_unwind(|| {
        if response.is_null() {
            return std::ptr::null_mut();
        }
        to_c_string(unsafe { &*response }.inner.body())
    })
    .unwrap_or(std::ptr::null_mut())
}

// ---------------------------------------------------------------------------
// Free functions
// ---------------------------------------------------------------------------

/// Free a response returned by `hw_request*`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn hw_response_free(response: *mut FfiResponse) {
    if !response.is_null() {
        let _ = catch_unwind(|| {
            drop(unsafe { Box::from_raw(response) });
        });
    }
}

/// Free a string returned by any `hw_*` function. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn hw_free_string(s: *mut c_char) {
    if !s.is_null() {
        let _ = catch_unwind(|| {
            drop(unsafe { CString::from_raw(s) });
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::CString;

    fn take_string(ptr: *mut c_char) -> String {
        assert!(!ptr.is_null());
        let s = unsafe { CStr::from_ptr(ptr) }.to_str().unwrap().to_string();
        hw_free_string(ptr);
        s
    }

    #[test]
    fn client_new_and_free() {
        let client = hw_client_new();
        assert!(!client.is_null());
        assert_eq!(hw_error_code(client), FfiErrorCode::Ok);
        hw_client_free(client);
    }

    #[test]
    fn client_new_with_config() {
        let cfg = CString::new(r#"{"timeout": 5, "strict_mode": true}"#).unwrap();
        let client = hw_client_new_with_config(cfg.as_ptr());
        assert!(!client.is_null());
        let inner = unsafe { &(*client).inner };
        assert_eq!(inner.config().timeout, 5);
        assert!(inner.config().strict_mode);
        hw_client_free(client);
    }

    #[test]
    fn client_new_with_bad_config_returns_null() {
        let cfg = CString::new(r#"{"timeout": "soon"}"#).unwrap();
        assert!(hw_client_new_with_config(cfg.as_ptr()).is_null());
        assert!(hw_client_new_with_config(std::ptr::null()).is_null());
    }

    #[test]
    fn free_null_is_safe() {
        hw_client_free(std::ptr::null_mut());
        hw_response_free(std::ptr::null_mut());
        hw_free_string(std::ptr::null_mut());
    }

    #[test]
    fn null_client_is_rejected() {
        let name = CString::new("X-Test").unwrap();
        assert_eq!(
            hw_set_header(std::ptr::null_mut(), name.as_ptr(), name.as_ptr()),
            FfiErrorCode::NullArg
        );
        assert_eq!(hw_error_code(std::ptr::null()), FfiErrorCode::NullArg);
        assert!(hw_error_message(std::ptr::null()).is_null());
        let url = CString::new("http://localhost/").unwrap();
        assert!(
            hw_request(std::ptr::null_mut(), FfiHttpMethod::Get, url.as_ptr(), std::ptr::null())
                .is_null()
        );
    }

    #[test]
    fn set_header_is_staged() {
        let client = hw_client_new();
        let name = CString::new("X-Trace").unwrap();
        let value = CString::new("abc").unwrap();
        assert_eq!(hw_set_header(client, name.as_ptr(), value.as_ptr()), FfiErrorCode::Ok);
        let inner = unsafe { &(*client).inner };
        assert_eq!(inner.header_lines(), ["X-Trace: abc"]);
        hw_client_free(client);
    }

    #[test]
    fn set_header_null_value_records_error() {
        let client = hw_client_new();
        let name = CString::new("X-Trace").unwrap();
        assert_eq!(
            hw_set_header(client, name.as_ptr(), std::ptr::null()),
            FfiErrorCode::NullArg
        );
        assert_eq!(hw_error_code(client), FfiErrorCode::NullArg);
        assert!(take_string(hw_error_message(client)).contains("null argument"));
        hw_client_free(client);
    }

    #[test]
    fn successful_call_clears_previous_failure() {
        let client = hw_client_new();
        let name = CString::new("NOT_AN_OPTION").unwrap();
        let value = CString::new("1").unwrap();
        hw_set_option(client, name.as_ptr(), value.as_ptr());
        assert_eq!(hw_error_code(client), FfiErrorCode::UnknownOption);

        let name = CString::new("X-Trace").unwrap();
        assert_eq!(hw_set_header(client, name.as_ptr(), value.as_ptr()), FfiErrorCode::Ok);
        assert_eq!(hw_error_code(client), FfiErrorCode::Ok);
        assert!(hw_error_message(client).is_null());
        hw_client_free(client);
    }

    #[test]
    fn non_utf8_header_is_invalid_not_null() {
        let client = hw_client_new();
        let name = CString::new(b"X-\xff".to_vec()).unwrap();
        let value = CString::new("v").unwrap();
        assert_eq!(
            hw_set_header(client, name.as_ptr(), value.as_ptr()),
            FfiErrorCode::InvalidArgument
        );
        assert!(take_string(hw_error_message(client)).contains("name"));
        assert!(unsafe { &(*client).inner }.header_lines().is_empty());
        hw_client_free(client);
    }

    #[test]
    fn set_secure_rejects_non_utf8_ca_file() {
        let client = hw_client_new();
        let path = CString::new(b"/t\xff".to_vec()).unwrap();
        assert_eq!(
            hw_set_secure(client, true, path.as_ptr(), true),
            FfiErrorCode::InvalidArgument
        );
        assert_eq!(hw_error_code(client), FfiErrorCode::InvalidArgument);
        let inner = unsafe { &(*client).inner };
        assert!(!inner.pending_options().contains(TransportOption::SslVerifyPeer));
        assert!(!inner.pending_options().contains(TransportOption::CaInfo));
        hw_client_free(client);
    }

    #[test]
    fn request_rejects_non_utf8_payload_and_url() {
        let client = hw_client_new();
        let url = CString::new("http://127.0.0.1:9/echo").unwrap();
        let payload = CString::new(b"a=\xff".to_vec()).unwrap();
        let resp = hw_request(client, FfiHttpMethod::Post, url.as_ptr(), payload.as_ptr());
        assert!(resp.is_null());
        assert_eq!(hw_error_code(client), FfiErrorCode::InvalidArgument);
        assert!(take_string(hw_error_message(client)).contains("payload"));

        let bad_url = CString::new(b"http://h/\xff".to_vec()).unwrap();
        let method = CString::new("GET").unwrap();
        let resp = hw_request_named(client, method.as_ptr(), bad_url.as_ptr(), std::ptr::null());
        assert!(resp.is_null());
        assert_eq!(hw_error_code(client), FfiErrorCode::InvalidArgument);
        assert!(take_string(hw_error_message(client)).contains("url"));
        hw_client_free(client);
    }

    #[test]
    fn set_option_parses_by_kind() {
        let client = hw_client_new();
        let name = CString::new("curlopt_maxredirs").unwrap();
        let value = CString::new("3").unwrap();
        assert_eq!(hw_set_option(client, name.as_ptr(), value.as_ptr()), FfiErrorCode::Ok);

        let name = CString::new("FOLLOWLOCATION").unwrap();
        let value = CString::new("false").unwrap();
        assert_eq!(hw_set_option(client, name.as_ptr(), value.as_ptr()), FfiErrorCode::Ok);

        let inner = unsafe { &(*client).inner };
        assert_eq!(inner.pending_options().integer(TransportOption::MaxRedirs), Some(3));
        assert_eq!(inner.pending_options().flag(TransportOption::FollowLocation), Some(false));
        hw_client_free(client);
    }

    #[test]
    fn set_option_unknown_name() {
        let client = hw_client_new();
        let name = CString::new("NOT_AN_OPTION").unwrap();
        let value = CString::new("1").unwrap();
        assert_eq!(
            hw_set_option(client, name.as_ptr(), value.as_ptr()),
            FfiErrorCode::UnknownOption
        );
        assert_eq!(hw_error_code(client), FfiErrorCode::UnknownOption);
        hw_client_free(client);
    }

    #[test]
    fn set_option_bad_value() {
        let client = hw_client_new();
        let name = CString::new("TIMEOUT").unwrap();
        let value = CString::new("soon").unwrap();
        assert_eq!(
            hw_set_option(client, name.as_ptr(), value.as_ptr()),
            FfiErrorCode::InvalidArgument
        );
        hw_client_free(client);
    }

    #[test]
    fn set_secure_missing_ca_file() {
        let client = hw_client_new();
        let path = CString::new("/definitely/not/here.pem").unwrap();
        assert_eq!(
            hw_set_secure(client, true, path.as_ptr(), true),
            FfiErrorCode::InvalidArgument
        );
        assert_eq!(hw_set_secure(client, false, std::ptr::null(), false), FfiErrorCode::Ok);
        hw_client_free(client);
    }

    #[test]
    fn unsupported_method_returns_null() {
        let client = hw_client_new();
        let method = CString::new("TRACE").unwrap();
        let url = CString::new("http://localhost/").unwrap();
        let resp = hw_request_named(client, method.as_ptr(), url.as_ptr(), std::ptr::null());
        assert!(resp.is_null());
        assert_eq!(hw_error_code(client), FfiErrorCode::UnsupportedMethod);
        assert_eq!(hw_error_transport_code(client), 0);
        hw_client_free(client);
    }

    #[test]
    fn connection_refused_reports_transport_code() {
        let port = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();
        let client = hw_client_new();
        let url = CString::new(format!("http://127.0.0.1:{port}/")).unwrap();
        let resp = hw_request(client, FfiHttpMethod::Get, url.as_ptr(), std::ptr::null());
        assert!(resp.is_null());
        assert_eq!(hw_error_code(client), FfiErrorCode::Transport);
        assert_ne!(hw_error_transport_code(client), 0);
        assert!(!take_string(hw_error_message(client)).is_empty());
        hw_client_free(client);
    }

    #[test]
    fn response_accessors_null_safe() {
        assert_eq!(hw_response_status(std::ptr::null()), 0);
        assert!(hw_response_reason(std::ptr::null()).is_null());
        assert!(hw_response_body(std::ptr::null()).is_null());
        assert!(hw_response_protocol_version(std::ptr::null()).is_null());
        let name = CString::new("content-type").unwrap();
        assert!(hw_response_header_line(std::ptr::null(), name.as_ptr()).is_null());
    }

    #[test]
    fn response_accessors_read_core_response() {
        let inner = httpwrap_core::Response::from_raw(
            "HTTP/1.1 201 Created",
            "Set-Cookie: a=1\r\nSet-Cookie: b=2\r\n",
            "made",
        )
        .unwrap();
        let resp = Box::into_raw(Box::new(FfiResponse { inner }));

        assert_eq!(hw_response_status(resp), 201);
        assert_eq!(take_string(hw_response_reason(resp)), "Created");
        assert_eq!(take_string(hw_response_protocol_version(resp)), "1.1");
        assert_eq!(take_string(hw_response_body(resp)), "made");

        let name = CString::new("set-cookie").unwrap();
        assert_eq!(take_string(hw_response_header_line(resp, name.as_ptr())), "a=1, b=2");
        let missing = CString::new("x-missing").unwrap();
        assert!(hw_response_header_line(resp, missing.as_ptr()).is_null());

        hw_response_free(resp);
    }

    #[test]
    fn request_against_mock_server() {
        let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = std_listener.local_addr().unwrap().port();
        std_listener.set_nonblocking(true).unwrap();
        std::thread::spawn(move || {
            let rt = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .unwrap();
            rt.block_on(async {
                let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
                mock_server::run(listener).await.unwrap();
            });
        });

        let client = hw_client_new();
        let name = CString::new("X-Trace").unwrap();
        let value = CString::new("ffi").unwrap();
        hw_set_header(client, name.as_ptr(), value.as_ptr());

        let method = CString::new("patch").unwrap();
        let url = CString::new(format!("http://127.0.0.1:{port}/echo")).unwrap();
        let payload = CString::new("a=1&b=2").unwrap();
        let resp = hw_request_named(client, method.as_ptr(), url.as_ptr(), payload.as_ptr());
        assert!(!resp.is_null());
        assert_eq!(hw_response_status(resp), 200);
        assert_eq!(hw_error_code(client), FfiErrorCode::Ok);

        let body: serde_json::Value =
            serde_json::from_str(&take_string(hw_response_body(resp))).unwrap();
        assert_eq!(body["method"], "PATCH");
        assert_eq!(body["body"], "a=1&b=2");
        assert_eq!(body["headers"]["x-trace"][0], "ffi");

        hw_response_free(resp);
        hw_client_free(client);
    }
}
