//! Shadowsocks protocol parser
//!
//! This module provides parsing for Shadowsocks (ss://) URIs.
//! Supports both SIP002 format and legacy format, as well as SIP003 plugins.

use tracing::trace;

use crate::config::outbound::{Outbound, ServerEndpoint, ShadowsocksOutbound};
use crate::parser::base64::decode_base64_str;
use crate::parser::error::ParseError;
use crate::parser::uri::{QueryParams, decode_label, percent_decode, split_host_port};

use super::ProtocolParser;

const PROTOCOL: &str = "shadowsocks";

// ============================================================================
// Shadowsocks Parser
// ============================================================================

/// Parser for Shadowsocks (ss://) URIs
///
/// Supports both SIP002 format and legacy format, as well as SIP003 plugins:
/// - SIP002: ss://BASE64(method:password)@host:port#tag
/// - SIP002 with userinfo: ss://method:password@host:port#tag
/// - SIP002 with SIP003 plugin: ss://userinfo@host:port/?plugin=plugin-name;plugin-opts#tag
/// - Legacy: ss://BASE64(method:password@host:port)#tag
pub struct ShadowsocksParser;

impl ProtocolParser for ShadowsocksParser {
    fn scheme(&self) -> &str {
        "ss"
    }

    fn parse(&self, uri: &str) -> Result<Outbound, ParseError> {
        let uri = uri.trim();
        trace!("Parsing Shadowsocks URI");

        let without_scheme = uri
            .strip_prefix("ss://")
            .ok_or_else(|| ParseError::malformed(PROTOCOL, "missing ss:// prefix"))?;

        let (main_part, label) = match without_scheme.rsplit_once('#') {
            Some((main, label)) => (main, Some(decode_label(label)).filter(|l| !l.is_empty())),
            None => (without_scheme, None),
        };

        let ss = if let Some((userinfo, rest)) = main_part.rsplit_once('@') {
            trace!("Parsing as SIP002 format (found @ separator)");
            parse_sip002(userinfo, rest)?
        } else {
            trace!("Parsing as legacy Base64 format");
            parse_legacy(main_part)?
        };

        let tag = label.unwrap_or_else(|| ss.endpoint.default_tag());
        Ok(Outbound::Shadowsocks(ShadowsocksOutbound { tag, ..ss }))
    }
}

/// Parses `userinfo@host:port[/][?plugin=...]`.
fn parse_sip002(userinfo: &str, rest: &str) -> Result<ShadowsocksOutbound, ParseError> {
    let (hostport, query) = rest.split_once('?').unwrap_or((rest, ""));
    let endpoint = endpoint(hostport.trim_end_matches('/'))?;

    let userinfo = percent_decode(userinfo, PROTOCOL)?;
    let (method, password) = match decode_base64_str(&userinfo) {
        Some(decoded) if decoded.contains(':') => split_credentials(&decoded)?,
        _ => split_credentials(&userinfo)?,
    };

    let query = QueryParams::parse(query, PROTOCOL)?;
    let (plugin, plugin_opts) = parse_plugin(query.get("plugin"));

    Ok(ShadowsocksOutbound {
        plugin,
        plugin_opts,
        udp_over_tcp: query.flag(&["uot", "udp-over-tcp"]),
        ..ShadowsocksOutbound::new(String::new(), endpoint, method, password)
    })
}

/// Parses `BASE64(method:password@host:port)`.
fn parse_legacy(encoded: &str) -> Result<ShadowsocksOutbound, ParseError> {
    let encoded = encoded.trim_end_matches('/');
    let decoded = decode_base64_str(encoded)
        .ok_or_else(|| ParseError::malformed(PROTOCOL, "invalid Base64 payload"))?;

    let (credentials, hostport) = decoded
        .rsplit_once('@')
        .ok_or_else(|| ParseError::malformed(PROTOCOL, "decoded payload has no '@' separator"))?;
    let (method, password) = split_credentials(credentials)?;

    Ok(ShadowsocksOutbound::new(
        String::new(),
        endpoint(hostport.trim())?,
        method,
        password,
    ))
}

fn endpoint(hostport: &str) -> Result<ServerEndpoint, ParseError> {
    match split_host_port(hostport, PROTOCOL)? {
        (host, Some(port)) => Ok(ServerEndpoint::new(host, port)),
        (_, None) => Err(ParseError::malformed(PROTOCOL, "missing ':' before port")),
    }
}

fn split_credentials(credentials: &str) -> Result<(String, String), ParseError> {
    let (method, password) = credentials.split_once(':').ok_or_else(|| {
        ParseError::malformed(PROTOCOL, "credentials are not method:password")
    })?;
    if method.is_empty() {
        return Err(ParseError::missing(PROTOCOL, "method"));
    }
    if password.is_empty() {
        return Err(ParseError::missing(PROTOCOL, "password"));
    }
    Ok((method.to_string(), password.to_string()))
}

/// Splits the SIP003 `plugin` value at its first `;` into name and options.
fn parse_plugin(value: Option<&str>) -> (Option<String>, Option<String>) {
    let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) else {
        return (None, None);
    };
    let (name, opts) = value.split_once(';').unwrap_or((value, ""));
    let name = match name {
        "simple-obfs" => "obfs-local",
        other => other,
    };
    (
        Some(name.to_string()),
        Some(opts.to_string()).filter(|o| !o.is_empty()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(uri: &str) -> ShadowsocksOutbound {
        match ShadowsocksParser.parse(uri) {
            Ok(Outbound::Shadowsocks(ss)) => ss,
            other => panic!("Expected Shadowsocks outbound, got {other:?}"),
        }
    }

    #[test]
    fn test_sip002_base64_userinfo() {
        let ss = parse("ss://YWVzLTI1Ni1nY206cGFzc3dvcmQ=@1.2.3.4:8388#My%20SS");
        assert_eq!(ss.tag, "My SS");
        assert_eq!(ss.endpoint, ServerEndpoint::new("1.2.3.4", 8388));
        assert_eq!(ss.method, "aes-256-gcm");
        assert_eq!(ss.password, "password");
        assert!(ss.plugin.is_none());
    }

    #[test]
    fn test_sip002_plain_userinfo() {
        let ss = parse("ss://2022-blake3-aes-128-gcm:a2V5%3D@example.com:443");
        assert_eq!(ss.method, "2022-blake3-aes-128-gcm");
        assert_eq!(ss.password, "a2V5=");
        assert_eq!(ss.tag, "example.com:443");
    }

    #[test]
    fn test_legacy_whole_base64() {
        let ss = parse("ss://YWVzLTI1Ni1nY206cGFzc3dvcmRAMS4yLjMuNDo4Mzg4#legacy");
        assert_eq!(ss.tag, "legacy");
        assert_eq!(ss.endpoint, ServerEndpoint::new("1.2.3.4", 8388));
        assert_eq!(ss.method, "aes-256-gcm");
        assert_eq!(ss.password, "password");
    }

    #[test]
    fn test_sip003_plugin() {
        let ss = parse(
            "ss://YWVzLTI1Ni1nY206cGFzc3dvcmQ=@1.2.3.4:8388/?plugin=simple-obfs%3Bobfs%3Dhttp%3Bobfs-host%3Dcdn.example.com#p",
        );
        assert_eq!(ss.plugin.as_deref(), Some("obfs-local"));
        assert_eq!(
            ss.plugin_opts.as_deref(),
            Some("obfs=http;obfs-host=cdn.example.com")
        );
    }

    #[test]
    fn test_invalid_base64_is_malformed() {
        let err = ShadowsocksParser.parse("ss://!!!notbase64!!!#x").unwrap_err();
        assert!(matches!(err, ParseError::MalformedEncoding { .. }));
    }

    #[test]
    fn test_legacy_missing_separator_is_malformed() {
        // "aes-256-gcm:password" has no '@'
        let err = ShadowsocksParser
            .parse("ss://YWVzLTI1Ni1nY206cGFzc3dvcmQ=")
            .unwrap_err();
        assert!(matches!(err, ParseError::MalformedEncoding { .. }));
    }

    #[test]
    fn test_missing_port_is_malformed() {
        let err = ShadowsocksParser
            .parse("ss://YWVzLTI1Ni1nY206cGFzc3dvcmQ=@1.2.3.4")
            .unwrap_err();
        assert!(matches!(err, ParseError::MalformedEncoding { .. }));
    }

    #[test]
    fn test_userinfo_without_colon_is_malformed() {
        let err = ShadowsocksParser
            .parse("ss://nocolon@1.2.3.4:8388")
            .unwrap_err();
        assert!(matches!(err, ParseError::MalformedEncoding { .. }));
    }

    #[test]
    fn test_ipv6_server() {
        let ss = parse("ss://YWVzLTI1Ni1nY206cGFzc3dvcmQ=@[2001:db8::1]:8388");
        assert_eq!(ss.endpoint.server, "2001:db8::1");
    }
}
