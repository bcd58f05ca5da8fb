//! Transport options keyed by symbolic name.
//!
//! # Design
//! Options are an explicit enum rather than free-form strings. The classic
//! symbolic names (`TIMEOUT`, `MAXREDIRS`, ...) survive as a static lookup
//! table so options can still be configured from text, e.g. across the C
//! ABI. Every option declares the kind of value it takes and `Options::set`
//! rejects a mismatch up front.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// A transport engine option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TransportOption {
    Timeout,
    ConnectTimeout,
    FollowLocation,
    MaxRedirs,
    FailOnError,
    HttpVersion,
    SslVerifyPeer,
    SslVerifyHost,
    CaInfo,
    Proxy,
    ProxyPort,
    HttpProxyTunnel,
    ProxyUserPwd,
    UserPwd,
    HttpAuth,
    Cookie,
    CustomRequest,
    HttpHeader,
    PostFields,
    Port,
    HttpGet,
    Post,
    NoBody,
    Header,
    UserAgent,
    Referer,
}

const OPTION_NAMES: &[(&str, TransportOption)] = &[
    ("TIMEOUT", TransportOption::Timeout),
    ("CONNECTTIMEOUT", TransportOption::ConnectTimeout),
    ("FOLLOWLOCATION", TransportOption::FollowLocation),
    ("MAXREDIRS", TransportOption::MaxRedirs),
    ("FAILONERROR", TransportOption::FailOnError),
    ("HTTP_VERSION", TransportOption::HttpVersion),
    ("SSL_VERIFYPEER", TransportOption::SslVerifyPeer),
    ("SSL_VERIFYHOST", TransportOption::SslVerifyHost),
    ("CAINFO", TransportOption::CaInfo),
    ("PROXY", TransportOption::Proxy),
    ("PROXYPORT", TransportOption::ProxyPort),
    ("HTTPPROXYTUNNEL", TransportOption::HttpProxyTunnel),
    ("PROXYUSERPWD", TransportOption::ProxyUserPwd),
    ("USERPWD", TransportOption::UserPwd),
    ("HTTPAUTH", TransportOption::HttpAuth),
    ("COOKIE", TransportOption::Cookie),
    ("CUSTOMREQUEST", TransportOption::CustomRequest),
    ("HTTPHEADER", TransportOption::HttpHeader),
    ("POSTFIELDS", TransportOption::PostFields),
    ("PORT", TransportOption::Port),
    ("HTTPGET", TransportOption::HttpGet),
    ("POST", TransportOption::Post),
    ("NOBODY", TransportOption::NoBody),
    ("HEADER", TransportOption::Header),
    ("USERAGENT", TransportOption::UserAgent),
    ("REFERER", TransportOption::Referer),
];

impl TransportOption {
    /// Symbolic name, e.g. `"MAXREDIRS"`.
    pub fn name(self) -> &'static str {
        OPTION_NAMES
            .iter()
            .find(|(_, o)| *o == self)
            .map(|(n, _)| *n)
            .unwrap_or("UNKNOWN")
    }

    pub fn kind(self) -> OptionKind {
        use TransportOption::*;
        match self {
            Timeout | ConnectTimeout | MaxRedirs | ProxyPort | Port => OptionKind::Integer,
            FollowLocation | FailOnError | SslVerifyPeer | SslVerifyHost | HttpProxyTunnel
            | HttpGet | Post | NoBody | Header => OptionKind::Flag,
            HttpHeader => OptionKind::List,
            HttpVersion | CaInfo | Proxy | ProxyUserPwd | UserPwd | HttpAuth | Cookie
            | CustomRequest | PostFields | UserAgent | Referer => OptionKind::Text,
        }
    }

    pub fn all() -> impl Iterator<Item = TransportOption> {
        OPTION_NAMES.iter().map(|(_, o)| *o)
    }
}

impl fmt::Display for TransportOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TransportOption {
    type Err = Error;

    /// Case-insensitive; an optional `CURLOPT_` prefix is ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        let key = upper.strip_prefix("CURLOPT_").unwrap_or(&upper);
        OPTION_NAMES
            .iter()
            .find(|(n, _)| *n == key)
            .map(|(_, o)| *o)
            .ok_or_else(|| Error::UnknownOption(s.to_string()))
    }
}

/// The kind of value an option accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionKind {
    Flag,
    Integer,
    Text,
    List,
}

impl fmt::Display for OptionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OptionKind::Flag => "flag",
            OptionKind::Integer => "integer",
            OptionKind::Text => "text",
            OptionKind::List => "list",
        })
    }
}

/// A value for a [`TransportOption`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionValue {
    Flag(bool),
    Integer(i64),
    Text(String),
    List(Vec<String>),
}

impl OptionValue {
    pub fn kind(&self) -> OptionKind {
        match self {
            OptionValue::Flag(_) => OptionKind::Flag,
            OptionValue::Integer(_) => OptionKind::Integer,
            OptionValue::Text(_) => OptionKind::Text,
            OptionValue::List(_) => OptionKind::List,
        }
    }

    /// Interpret `text` as a value of the kind `option` expects.
    ///
    /// Flags accept `1/0`, `true/false`, `yes/no`, `on/off`. Lists are
    /// newline separated, blank lines dropped.
    pub fn parse_for(option: TransportOption, text: &str) -> Result<Self, Error> {
        let invalid = || Error::InvalidOptionValue {
            option,
            expected: option.kind(),
        };
        match option.kind() {
            OptionKind::Flag => match text.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => Ok(OptionValue::Flag(true)),
                "0" | "false" | "no" | "off" => Ok(OptionValue::Flag(false)),
                _ => Err(invalid()),
            },
            OptionKind::Integer => text
                .trim()
                .parse()
                .map(OptionValue::Integer)
                .map_err(|_| invalid()),
            OptionKind::Text => Ok(OptionValue::Text(text.to_string())),
            OptionKind::List => Ok(OptionValue::List(
                text.lines()
                    .map(str::trim)
                    .filter(|l| !l.is_empty())
                    .map(str::to_string)
                    .collect(),
            )),
        }
    }
}

impl From<bool> for OptionValue {
    fn from(v: bool) -> Self {
        OptionValue::Flag(v)
    }
}

impl From<i32> for OptionValue {
    fn from(v: i32) -> Self {
        OptionValue::Integer(v.into())
    }
}

impl From<i64> for OptionValue {
    fn from(v: i64) -> Self {
        OptionValue::Integer(v)
    }
}

impl From<u16> for OptionValue {
    fn from(v: u16) -> Self {
        OptionValue::Integer(v.into())
    }
}

impl From<u32> for OptionValue {
    fn from(v: u32) -> Self {
        OptionValue::Integer(v.into())
    }
}

impl From<u64> for OptionValue {
    fn from(v: u64) -> Self {
        OptionValue::Integer(i64::try_from(v).unwrap_or(i64::MAX))
    }
}

impl From<&str> for OptionValue {
    fn from(v: &str) -> Self {
        OptionValue::Text(v.to_string())
    }
}

impl From<String> for OptionValue {
    fn from(v: String) -> Self {
        OptionValue::Text(v)
    }
}

impl From<Vec<String>> for OptionValue {
    fn from(v: Vec<String>) -> Self {
        OptionValue::List(v)
    }
}

/// A kind-checked set of transport options.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Options {
    values: BTreeMap<TransportOption, OptionValue>,
}

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `option`, replacing any earlier value.
    pub fn set(&mut self, option: TransportOption, value: impl Into<OptionValue>) -> Result<(), Error> {
        let value = value.into();
        if value.kind() != option.kind() {
            return Err(Error::InvalidOptionValue {
                option,
                expected: option.kind(),
            });
        }
        self.values.insert(option, value);
        Ok(())
    }

    /// Insert without the kind check, for call sites whose value kind is
    /// fixed by the code itself.
    pub(crate) fn put(&mut self, option: TransportOption, value: impl Into<OptionValue>) {
        let value = value.into();
        debug_assert_eq!(value.kind(), option.kind(), "{option}");
        self.values.insert(option, value);
    }

    /// Builder-style `set` for assembling per-call overrides.
    pub fn with(mut self, option: TransportOption, value: impl Into<OptionValue>) -> Result<Self, Error> {
        self.set(option, value)?;
        Ok(self)
    }

    pub fn get(&self, option: TransportOption) -> Option<&OptionValue> {
        self.values.get(&option)
    }

    pub fn contains(&self, option: TransportOption) -> bool {
        self.values.contains_key(&option)
    }

    pub fn remove(&mut self, option: TransportOption) -> Option<OptionValue> {
        self.values.remove(&option)
    }

    pub fn flag(&self, option: TransportOption) -> Option<bool> {
        match self.values.get(&option) {
            Some(OptionValue::Flag(v)) => Some(*v),
            _ => None,
        }
    }

    pub fn integer(&self, option: TransportOption) -> Option<i64> {
        match self.values.get(&option) {
            Some(OptionValue::Integer(v)) => Some(*v),
            _ => None,
        }
    }

    pub fn text(&self, option: TransportOption) -> Option<&str> {
        match self.values.get(&option) {
            Some(OptionValue::Text(v)) => Some(v),
            _ => None,
        }
    }

    pub fn list(&self, option: TransportOption) -> Option<&[String]> {
        match self.values.get(&option) {
            Some(OptionValue::List(v)) => Some(v),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (TransportOption, &OptionValue)> {
        self.values.iter().map(|(k, v)| (*k, v))
    }

    /// Copy every entry of `other` over this set.
    pub fn merge(&mut self, other: Options) {
        self.values.extend(other.values);
    }
}
