//! Client identification for rate limiting.
//!
//! The key comes from forwarding headers set by whatever sits in front of the
//! gateway. Nothing here checks that those headers came from a trusted hop, so
//! a client talking to the gateway directly can pick its own key. Clients
//! behind one proxy that does not forward their address share a key.

use std::fmt;

use axum::http::HeaderMap;

/// Headers consulted in priority order.
pub const CLIENT_KEY_HEADERS: [&str; 3] = ["x-forwarded-for", "x-real-ip", "cf-connecting-ip"];

/// Key used when no forwarding header is present.
pub const LOOPBACK_KEY: &str = "127.0.0.1";

/// Identifier partitioning the rate limiter.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClientKey(String);

impl ClientKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ClientKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ClientKey {
    fn from(key: &str) -> Self {
        Self::new(key)
    }
}

/// Resolve the caller's key from request headers.
///
/// The first header with a non-empty value wins and is used verbatim, so a
/// multi-hop `X-Forwarded-For` list is one key.
pub fn resolve_client_key(headers: &HeaderMap) -> ClientKey {
    CLIENT_KEY_HEADERS
        .iter()
        .filter_map(|name| headers.get(*name))
        .filter_map(|value| value.to_str().ok())
        .find(|value| !value.is_empty())
        .map(ClientKey::from)
        .unwrap_or_else(|| ClientKey::from(LOOPBACK_KEY))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(*name, HeaderValue::from_static(value));
        }
        map
    }

    #[test]
    fn test_forwarded_for_takes_precedence() {
        let map = headers(&[
            ("cf-connecting-ip", "198.51.100.3"),
            ("x-real-ip", "198.51.100.2"),
            ("x-forwarded-for", "198.51.100.1"),
        ]);
        assert_eq!(resolve_client_key(&map).as_str(), "198.51.100.1");
    }

    #[test]
    fn test_falls_through_in_order() {
        let map = headers(&[("x-real-ip", "10.0.0.2"), ("cf-connecting-ip", "10.0.0.3")]);
        assert_eq!(resolve_client_key(&map).as_str(), "10.0.0.2");

        let map = headers(&[("cf-connecting-ip", "10.0.0.3")]);
        assert_eq!(resolve_client_key(&map).as_str(), "10.0.0.3");
    }

    #[test]
    fn test_empty_header_is_skipped() {
        let map = headers(&[("x-forwarded-for", ""), ("x-real-ip", "10.0.0.2")]);
        assert_eq!(resolve_client_key(&map).as_str(), "10.0.0.2");
    }

    #[test]
    fn test_value_is_not_trimmed() {
        let map = headers(&[("x-forwarded-for", " 10.0.0.1 "), ("x-real-ip", "10.0.0.2")]);
        assert_eq!(resolve_client_key(&map).as_str(), " 10.0.0.1 ");

        let map = headers(&[("x-forwarded-for", "  "), ("x-real-ip", "10.0.0.2")]);
        assert_eq!(resolve_client_key(&map).as_str(), "  ");
    }

    #[test]
    fn test_loopback_fallback() {
        assert_eq!(resolve_client_key(&HeaderMap::new()).as_str(), LOOPBACK_KEY);
    }

    #[test]
    fn test_forwarded_chain_is_not_split() {
        let map = headers(&[("x-forwarded-for", "203.0.113.7, 10.0.0.1")]);
        assert_eq!(resolve_client_key(&map).as_str(), "203.0.113.7, 10.0.0.1");
    }
}
