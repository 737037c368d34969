//! API schema version resolution
//!
//! Clients select a response schema through the `version` media-type
//! parameter of the `Accept` header, e.g.
//! `Accept: application/json; version=2.0`. Requests without a usable
//! parameter get the configured default version.

use axum::http::{header, HeaderMap};
use std::fmt;
use std::str::FromStr;

/// An API schema version, ordered by (major, minor)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ApiVersion {
    pub major: u8,
    pub minor: u8,
}

impl ApiVersion {
    pub const fn new(major: u8, minor: u8) -> Self {
        Self { major, minor }
    }
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

impl FromStr for ApiVersion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (major, minor) = match s.split_once('.') {
            Some((major, minor)) => (major, minor),
            None => (s, "0"),
        };

        let major: u8 = major
            .trim()
            .parse()
            .map_err(|_| format!("Invalid version: {}", s))?;
        let minor: u8 = minor
            .trim()
            .parse()
            .map_err(|_| format!("Invalid version: {}", s))?;

        Ok(Self { major, minor })
    }
}

/// Resolve the request's API version from the Accept header
///
/// Falls back to `default` when the header is absent, carries no `version`
/// parameter, or the parameter does not parse.
pub fn resolve_version(headers: &HeaderMap, default: ApiVersion) -> ApiVersion {
    let accept = match headers.get(header::ACCEPT).and_then(|v| v.to_str().ok()) {
        Some(value) => value,
        None => return default,
    };

    // Accept values look like "application/json; version=2.0, text/html".
    // Scan the parameter segments for the first usable version.
    for segment in accept.split([',', ';']) {
        if let Some(value) = segment.trim().strip_prefix("version=") {
            if let Ok(version) = value.trim().parse() {
                return version;
            }
        }
    }

    default
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    const V1: ApiVersion = ApiVersion::new(1, 0);

    fn headers_with_accept(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::ACCEPT, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn parses_major_minor() {
        let version: ApiVersion = "2.0".parse().unwrap();
        assert_eq!(version, ApiVersion::new(2, 0));

        let bare: ApiVersion = "3".parse().unwrap();
        assert_eq!(bare, ApiVersion::new(3, 0));

        assert!("abc".parse::<ApiVersion>().is_err());
        assert!("1.x".parse::<ApiVersion>().is_err());
    }

    #[test]
    fn orders_by_major_then_minor() {
        assert!(ApiVersion::new(2, 0) > ApiVersion::new(1, 9));
        assert!(ApiVersion::new(1, 1) > ApiVersion::new(1, 0));
        assert_eq!(ApiVersion::new(1, 0), V1);
    }

    #[test]
    fn display_round_trips() {
        let version = ApiVersion::new(2, 1);
        let parsed: ApiVersion = version.to_string().parse().unwrap();
        assert_eq!(parsed, version);
    }

    #[test]
    fn resolves_version_parameter() {
        let headers = headers_with_accept("application/json; version=2.0");
        assert_eq!(resolve_version(&headers, V1), ApiVersion::new(2, 0));
    }

    #[test]
    fn resolves_among_multiple_accept_values() {
        let headers = headers_with_accept("text/html, application/json; version=1.1; q=0.9");
        assert_eq!(resolve_version(&headers, V1), ApiVersion::new(1, 1));
    }

    #[test]
    fn missing_header_falls_back_to_default() {
        let headers = HeaderMap::new();
        assert_eq!(resolve_version(&headers, V1), V1);
    }

    #[test]
    fn unparseable_parameter_falls_back_to_default() {
        let headers = headers_with_accept("application/json; version=latest");
        assert_eq!(resolve_version(&headers, V1), V1);

        let headers = headers_with_accept("application/json");
        assert_eq!(resolve_version(&headers, V1), V1);
    }
}
