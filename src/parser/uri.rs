//! Share-link splitting
//!
//! Breaks `scheme://[userinfo@]host[:port][/path][?query][#fragment]` into its
//! parts without normalizing anything. The `url` crate would percent-decode
//! and re-encode credentials and refuses some of the keys found in the wild
//! (raw `/` and `+` inside WireGuard keys), so the split is done by hand and
//! only the host goes through `url::Host` for validation.

use std::collections::HashMap;
use std::str::FromStr;

use tracing::trace;
use url::Host;

use super::error::ParseError;

// ============================================================================
// URI Parts
// ============================================================================

/// One share link split into its components.
#[derive(Debug, Clone, PartialEq)]
pub struct UriParts {
    /// Scheme as written before `://`
    pub scheme: String,
    /// Raw userinfo, still percent-encoded
    pub userinfo: Option<String>,
    /// Host with IPv6 brackets removed
    pub host: String,
    /// Port, if one was written
    pub port: Option<u16>,
    /// Decoded query parameters
    pub query: QueryParams,
    /// Decoded fragment label
    pub label: Option<String>,
}

impl UriParts {
    /// Splits `raw` for the named protocol.
    pub fn parse(raw: &str, protocol: &'static str) -> Result<Self, ParseError> {
        let (scheme, rest) = raw
            .split_once("://")
            .ok_or_else(|| ParseError::malformed(protocol, "missing scheme separator ://"))?;

        let (rest, fragment) = match rest.split_once('#') {
            Some((rest, fragment)) => (rest, Some(fragment)),
            None => (rest, None),
        };
        let (authority, query) = match rest.split_once('?') {
            Some((authority, query)) => (authority, query),
            None => (rest, ""),
        };
        let (userinfo, hostport) = match authority.rfind('@') {
            Some(at) => (Some(&authority[..at]), &authority[at + 1..]),
            None => (None, authority),
        };
        let hostport = hostport.split('/').next().unwrap_or_default();

        let (host, port) = split_host_port(hostport, protocol)?;
        trace!(
            "Split {} link: host={}, port={:?}, userinfo present={}",
            protocol,
            host,
            port,
            userinfo.is_some()
        );

        Ok(Self {
            scheme: scheme.to_string(),
            userinfo: userinfo.filter(|u| !u.is_empty()).map(str::to_string),
            host,
            port,
            query: QueryParams::parse(query, protocol)?,
            label: fragment.map(decode_label).filter(|l| !l.is_empty()),
        })
    }

    /// Returns the port or a missing-field error.
    pub fn require_port(&self, protocol: &'static str) -> Result<u16, ParseError> {
        self.port
            .ok_or_else(|| ParseError::missing(protocol, "server_port"))
    }

    /// Returns the percent-decoded userinfo, if any.
    pub fn decoded_userinfo(&self, protocol: &'static str) -> Result<Option<String>, ParseError> {
        self.userinfo
            .as_deref()
            .map(|u| percent_decode(u, protocol))
            .transpose()
    }

    /// The fragment label, or `host:port` when the link carries none.
    pub fn tag_or(&self, port: u16) -> String {
        self.label
            .clone()
            .unwrap_or_else(|| format!("{}:{}", self.host, port))
    }
}

// ============================================================================
// Query Parameters
// ============================================================================

/// Query parameters of a share link.
///
/// Keys are kept verbatim; values are percent-decoded. When a key repeats,
/// the first occurrence wins.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryParams {
    params: HashMap<String, String>,
}

impl QueryParams {
    /// Splits on `&`, then on the first `=`.
    pub fn parse(query: &str, protocol: &'static str) -> Result<Self, ParseError> {
        let mut params = HashMap::new();
        for pair in query.split('&').filter(|p| !p.is_empty()) {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            let value = percent_decode(value, protocol)?;
            params.entry(key.to_string()).or_insert(value);
        }
        Ok(Self { params })
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    /// Non-empty value of the first key present.
    pub fn first_of(&self, keys: &[&str]) -> Option<&str> {
        keys.iter()
            .filter_map(|key| self.get(key))
            .find(|value| !value.is_empty())
    }

    /// Owned non-empty value of the first key present.
    pub fn string(&self, keys: &[&str]) -> Option<String> {
        self.first_of(keys).map(str::to_string)
    }

    /// `true` when any of the keys is set to `1` or `true`.
    pub fn flag(&self, keys: &[&str]) -> bool {
        keys.iter()
            .filter_map(|key| self.get(key))
            .any(|value| value == "1" || value.eq_ignore_ascii_case("true"))
    }

    /// Comma-separated list, trimmed, empties dropped.
    pub fn list(&self, keys: &[&str]) -> Vec<String> {
        self.first_of(keys).map(split_list).unwrap_or_default()
    }

    /// Parses a numeric parameter, rejecting values that do not fit.
    pub fn number<T: FromStr>(
        &self,
        protocol: &'static str,
        keys: &'static [&'static str],
    ) -> Result<Option<T>, ParseError> {
        for &key in keys {
            if let Some(value) = self.first_of(&[key]) {
                return value
                    .trim()
                    .parse()
                    .map(Some)
                    .map_err(|_| ParseError::invalid(protocol, key, value));
            }
        }
        Ok(None)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.params.contains_key(key)
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Splits `host[:port]`, handling IPv6 addresses in brackets.
pub fn split_host_port(
    hostport: &str,
    protocol: &'static str,
) -> Result<(String, Option<u16>), ParseError> {
    let (host, port_str) = if let Some(inner) = hostport.strip_prefix('[') {
        let bracket_end = inner
            .find(']')
            .ok_or_else(|| ParseError::invalid(protocol, "server", hostport))?;
        let after = &inner[bracket_end + 1..];
        let port_str = match after.strip_prefix(':') {
            Some(port) => Some(port),
            None if after.is_empty() => None,
            None => return Err(ParseError::invalid(protocol, "server", hostport)),
        };
        (&inner[..bracket_end], port_str)
    } else {
        match hostport.rsplit_once(':') {
            Some((host, port)) => (host, Some(port)),
            None => (hostport, None),
        }
    };

    if host.is_empty() {
        return Err(ParseError::missing(protocol, "server"));
    }
    let check = if host.contains(':') {
        Host::parse(&format!("[{host}]"))
    } else {
        Host::parse(host)
    };
    if check.is_err() {
        return Err(ParseError::invalid(protocol, "server", host));
    }

    let port = match port_str {
        None | Some("") => None,
        Some(port_str) => Some(parse_port(port_str, protocol)?),
    };
    Ok((host.to_string(), port))
}

/// Parses a port in `1..=65535`.
pub fn parse_port(value: &str, protocol: &'static str) -> Result<u16, ParseError> {
    match value.trim().parse::<u16>() {
        Ok(port) if port != 0 => Ok(port),
        _ => Err(ParseError::invalid(protocol, "server_port", value)),
    }
}

/// Percent-decodes `value`; invalid UTF-8 after decoding is malformed input.
pub fn percent_decode(value: &str, protocol: &'static str) -> Result<String, ParseError> {
    urlencoding::decode(value)
        .map(|decoded| decoded.into_owned())
        .map_err(|e| ParseError::malformed(protocol, format!("invalid percent-encoding: {e}")))
}

/// Decodes a display label, keeping the raw text when it is not valid
/// percent-encoding.
pub fn decode_label(raw: &str) -> String {
    urlencoding::decode(raw)
        .map(|decoded| decoded.into_owned())
        .unwrap_or_else(|_| raw.to_string())
        .trim()
        .to_string()
}

pub fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_uri() {
        let parts =
            UriParts::parse("vless://uuid@example.com:443?type=ws&path=%2Fws#My%20Node", "vless")
                .unwrap();
        assert_eq!(parts.scheme, "vless");
        assert_eq!(parts.userinfo.as_deref(), Some("uuid"));
        assert_eq!(parts.host, "example.com");
        assert_eq!(parts.port, Some(443));
        assert_eq!(parts.query.get("type"), Some("ws"));
        assert_eq!(parts.query.get("path"), Some("/ws"));
        assert_eq!(parts.label.as_deref(), Some("My Node"));
    }

    #[test]
    fn test_parse_ipv6_host() {
        let parts = UriParts::parse("trojan://pw@[2001:db8::1]:8443", "trojan").unwrap();
        assert_eq!(parts.host, "2001:db8::1");
        assert_eq!(parts.port, Some(8443));
    }

    #[test]
    fn test_parse_without_port() {
        let parts = UriParts::parse("ssh://root@example.com", "ssh").unwrap();
        assert_eq!(parts.port, None);
        assert_eq!(
            parts.require_port("ssh"),
            Err(ParseError::missing("ssh", "server_port"))
        );
    }

    #[test]
    fn test_userinfo_may_contain_slash_and_at() {
        let parts = UriParts::parse("wg://a/b+c@d=@example.com:51820/?x=1", "wireguard").unwrap();
        assert_eq!(parts.userinfo.as_deref(), Some("a/b+c@d="));
        assert_eq!(parts.host, "example.com");
        assert_eq!(parts.query.get("x"), Some("1"));
    }

    #[test]
    fn test_invalid_port() {
        let err = UriParts::parse("trojan://pw@example.com:99999", "trojan").unwrap_err();
        assert!(matches!(err, ParseError::InvalidField { field: "server_port", .. }));

        let err = UriParts::parse("trojan://pw@example.com:0", "trojan").unwrap_err();
        assert!(matches!(err, ParseError::InvalidField { .. }));
    }

    #[test]
    fn test_missing_host() {
        let err = UriParts::parse("trojan://pw@:443", "trojan").unwrap_err();
        assert_eq!(err, ParseError::missing("trojan", "server"));
    }

    #[test]
    fn test_missing_separator() {
        let err = UriParts::parse("trojan:pw@example.com:443", "trojan").unwrap_err();
        assert!(matches!(err, ParseError::MalformedEncoding { .. }));
    }

    #[test]
    fn test_query_values_decoded_keys_not() {
        let query = QueryParams::parse("a%20b=c%20d&plus=a+b", "vless").unwrap();
        assert_eq!(query.get("a%20b"), Some("c d"));
        assert_eq!(query.get("plus"), Some("a+b"));
    }

    #[test]
    fn test_query_first_occurrence_wins() {
        let query = QueryParams::parse("sni=a.com&sni=b.com", "vless").unwrap();
        assert_eq!(query.get("sni"), Some("a.com"));
    }

    #[test]
    fn test_query_value_with_equals() {
        let query = QueryParams::parse("pbk=abc==&empty", "vless").unwrap();
        assert_eq!(query.get("pbk"), Some("abc=="));
        assert_eq!(query.get("empty"), Some(""));
        assert!(query.contains("empty"));
    }

    #[test]
    fn test_query_invalid_utf8() {
        let err = QueryParams::parse("path=%FF", "vless").unwrap_err();
        assert!(matches!(err, ParseError::MalformedEncoding { .. }));
    }

    #[test]
    fn test_query_helpers() {
        let query =
            QueryParams::parse("insecure=1&alpn=h2,%20http/1.1&upmbps=100&bad=x", "hysteria")
                .unwrap();
        assert!(query.flag(&["allowInsecure", "insecure"]));
        assert_eq!(query.list(&["alpn"]), vec!["h2", "http/1.1"]);
        assert_eq!(query.number::<u32>("hysteria", &["upmbps"]), Ok(Some(100)));
        assert_eq!(query.number::<u32>("hysteria", &["missing"]), Ok(None));
        assert!(query.number::<u32>("hysteria", &["bad"]).is_err());
    }

    #[test]
    fn test_label_falls_back_to_raw() {
        assert_eq!(decode_label("%E4%BD%A0%E5%A5%BD"), "你好");
        assert_eq!(decode_label("bad%FFlabel"), "bad%FFlabel");
    }

    #[test]
    fn test_tag_defaults_to_host_port() {
        let parts = UriParts::parse("trojan://pw@example.com:443", "trojan").unwrap();
        assert_eq!(parts.tag_or(443), "example.com:443");
    }
}
