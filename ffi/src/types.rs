//! `#[repr(C)]` types for the FFI boundary.
//!
//! # Design
//! The client and the response stay opaque: C holds a pointer and passes it
//! back. Only the error code and the method selector cross as C enums.
//! Strings always leave as freshly allocated C strings owned by the caller.

use std::ffi::CString;
use std::os::raw::c_char;

use httpwrap_core::{Error, HttpMethod};

/// Opaque handle to a `Client`, plus the most recent failure of any call
/// made through it.
pub struct FfiClient {
    pub(crate) inner: httpwrap_core::Client,
    pub(crate) last_error: Option<FfiError>,
}

impl FfiClient {
    pub(crate) fn new(inner: httpwrap_core::Client) -> Self {
        Self {
            inner,
            last_error: None,
        }
    }

    /// Remember `err` and return its C code.
    pub(crate) fn record(&mut self, err: &Error) -> FfiErrorCode {
        let failure = FfiError::from(err);
        let code = failure.code;
        self.last_error = Some(failure);
        code
    }

    pub(crate) fn record_arg(&mut self, err: ArgError) -> FfiErrorCode {
        let (code, message) = match err {
            ArgError::Null(name) => (FfiErrorCode::NullArg, format!("null argument: {name}")),
            ArgError::NotUtf8(name) => (
                FfiErrorCode::InvalidArgument,
                format!("argument is not valid UTF-8: {name}"),
            ),
        };
        self.last_error = Some(FfiError {
            code,
            transport_code: 0,
            message,
        });
        code
    }

    /// Forget the previous failure after a call that went through.
    pub(crate) fn succeed(&mut self) -> FfiErrorCode {
        self.last_error = None;
        FfiErrorCode::Ok
    }
}

/// A string argument C handed us that we could not use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ArgError {
    Null(&'static str),
    NotUtf8(&'static str),
}

/// Opaque handle to an immutable `Response`.
pub struct FfiResponse {
    pub(crate) inner: httpwrap_core::Response,
}

pub(crate) struct FfiError {
    pub(crate) code: FfiErrorCode,
    pub(crate) transport_code: u32,
    pub(crate) message: String,
}

impl From<&Error> for FfiError {
    fn from(err: &Error) -> Self {
        let code = match err {
            Error::UnsupportedMethod(_) => FfiErrorCode::UnsupportedMethod,
            Error::UnknownOption(_) => FfiErrorCode::UnknownOption,
            Error::Transport(_) => FfiErrorCode::Transport,
            _ => FfiErrorCode::InvalidArgument,
        };
        FfiError {
            code,
            transport_code: err.as_transport().map(|e| e.code()).unwrap_or(0),
            message: err.to_string(),
        }
    }
}

/// Status codes returned by setters and `hw_error_code`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiErrorCode {
    Ok = 0,
    NullArg = 1,
    InvalidArgument = 2,
    UnsupportedMethod = 3,
    UnknownOption = 4,
    Transport = 5,
    Panic = 6,
}

/// HTTP verb as a C enum.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub enum FfiHttpMethod {
    Get = 0,
    Post = 1,
    Put = 2,
    Patch = 3,
    Delete = 4,
    Head = 5,
    Options = 6,
}

impl From<FfiHttpMethod> for HttpMethod {
    fn from(m: FfiHttpMethod) -> Self {
        match m {
            FfiHttpMethod::Get => HttpMethod::Get,
            FfiHttpMethod::Post => HttpMethod::Post,
            FfiHttpMethod::Put => HttpMethod::Put,
            FfiHttpMethod::Patch => HttpMethod::Patch,
            FfiHttpMethod::Delete => HttpMethod::Delete,
            FfiHttpMethod::Head => HttpMethod::Head,
            FfiHttpMethod::Options => HttpMethod::Options,
        }
    }
}

/// Hand `s` to C. Interior NUL bytes cut the string short.
pub(crate) fn to_c_string(s: &str) -> *mut c_char {
    let end = s.find('\0').unwrap_or(s.len());
    CString::new(&s[..end]).unwrap_or_default().into_raw()
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpwrap_core::{TransportError, TransportErrorKind};

    #[test]
    fn errors_map_to_c_codes() {
        let e = FfiError::from(&Error::UnsupportedMethod("TRACE".into()));
        assert_eq!(e.code, FfiErrorCode::UnsupportedMethod);
        assert_eq!(e.transport_code, 0);

        let e = FfiError::from(&Error::Transport(TransportError::new(
            TransportErrorKind::Timeout,
            "slow",
        )));
        assert_eq!(e.code, FfiErrorCode::Transport);
        assert_eq!(e.transport_code, 28);
        assert_eq!(e.message, "slow");
    }

    #[test]
    fn interior_nul_truncates() {
        let ptr = to_c_string("abc\0def");
        let s = unsafe { CString::from_raw(ptr) };
        assert_eq!(s.to_str().unwrap(), "abc");
    }
}
