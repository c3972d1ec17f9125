//! VLESS protocol parser
//!
//! This module provides parsing for VLESS (vless://) URIs.
//! Format: vless://uuid@host:port?params#tag

use tracing::trace;

use crate::config::outbound::{Outbound, ServerEndpoint, VLessOutbound};
use crate::config::shared::{OutboundRealityConfig, OutboundTlsConfig};
use crate::parser::error::ParseError;
use crate::parser::transport::transport_from_query;
use crate::parser::uri::UriParts;

use super::{ProtocolParser, query_tls};

const PROTOCOL: &str = "vless";

// ============================================================================
// VLESS Parser
// ============================================================================

/// Parser for VLESS (vless://) URIs
///
/// Format: vless://uuid@host:port?params#tag
///
/// Supported params:
/// - security: tls, reality, none
/// - sni/peer: Server name for TLS
/// - fp: uTLS fingerprint
/// - pbk: Reality public key
/// - sid: Reality short ID
/// - flow: Flow control (xtls-rprx-vision)
/// - type: Transport type (tcp, ws, grpc, h2)
/// - path/host/serviceName/ed/eh: Transport parameters
pub struct VLessParser;

impl ProtocolParser for VLessParser {
    fn scheme(&self) -> &str {
        "vless"
    }

    fn parse(&self, uri: &str) -> Result<Outbound, ParseError> {
        trace!("Parsing VLESS URI");
        let parts = UriParts::parse(uri, PROTOCOL)?;

        let uuid = parts
            .decoded_userinfo(PROTOCOL)?
            .filter(|u| !u.is_empty())
            .ok_or_else(|| ParseError::missing(PROTOCOL, "uuid"))?;
        let server_port = parts.require_port(PROTOCOL)?;
        let query = &parts.query;

        let security = query.get("security").unwrap_or_default();
        let public_key = query.string(&["pbk", "publicKey"]);
        let reality = match (security, public_key) {
            ("reality", None) => return Err(ParseError::missing(PROTOCOL, "pbk")),
            (_, Some(public_key)) => Some(OutboundRealityConfig::new(
                public_key,
                query.string(&["sid", "shortId"]),
            )),
            _ => None,
        };

        let tls = if reality.is_some() || matches!(security, "tls" | "xtls") {
            trace!("VLESS TLS enabled (security={:?})", security);
            Some(OutboundTlsConfig {
                reality,
                ..query_tls(query, &["sni", "peer"])
            })
        } else {
            None
        };

        Ok(Outbound::VLess(VLessOutbound {
            flow: query.string(&["flow"]),
            packet_encoding: query.string(&["packetEncoding", "packet_encoding"]),
            tls,
            transport: transport_from_query(query, PROTOCOL)?,
            ..VLessOutbound::new(
                parts.tag_or(server_port),
                ServerEndpoint::new(parts.host.clone(), server_port),
                uuid,
            )
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::outbound::V2RayTransport;

    fn parse(uri: &str) -> VLessOutbound {
        match VLessParser.parse(uri) {
            Ok(Outbound::VLess(vless)) => vless,
            other => panic!("Expected VLESS outbound, got {other:?}"),
        }
    }

    #[test]
    fn test_vless_basic() {
        let vless = parse("vless://uuid-here@example.com:443?security=tls&sni=example.com#test-node");
        assert_eq!(vless.tag, "test-node");
        assert_eq!(vless.endpoint, ServerEndpoint::new("example.com", 443));
        assert_eq!(vless.uuid, "uuid-here");
        let tls = vless.tls.unwrap();
        assert!(tls.enabled);
        assert_eq!(tls.server_name.as_deref(), Some("example.com"));
        assert!(tls.reality.is_none());
    }

    #[test]
    fn test_vless_with_reality() {
        let vless = parse(
            "vless://uuid@example.com:443?security=reality&sni=www.microsoft.com&fp=chrome&pbk=publickey123&sid=shortid&flow=xtls-rprx-vision#reality-node",
        );
        assert_eq!(vless.flow.as_deref(), Some("xtls-rprx-vision"));
        let tls = vless.tls.unwrap();
        assert!(tls.enabled);
        assert_eq!(tls.server_name.as_deref(), Some("www.microsoft.com"));
        assert_eq!(tls.utls.unwrap().fingerprint.as_deref(), Some("chrome"));
        let reality = tls.reality.unwrap();
        assert!(reality.enabled);
        assert_eq!(reality.public_key.as_deref(), Some("publickey123"));
        assert_eq!(reality.short_id.as_deref(), Some("shortid"));
    }

    #[test]
    fn test_vless_reality_options_imply_tls() {
        let vless = parse("vless://uuid@example.com:443?pbk=key");
        assert!(vless.tls.is_some_and(|tls| tls.enabled && tls.reality.is_some()));
    }

    #[test]
    fn test_vless_reality_without_public_key() {
        let err = VLessParser
            .parse("vless://uuid@example.com:443?security=reality")
            .unwrap_err();
        assert_eq!(err, ParseError::missing(PROTOCOL, "pbk"));
    }

    #[test]
    fn test_vless_with_websocket() {
        let vless = parse(
            "vless://uuid@example.com:443?security=tls&type=ws&path=%2Fws&host=ws.example.com#ws-node",
        );
        let Some(V2RayTransport::WebSocket(ws)) = vless.transport else {
            panic!("Expected WebSocket transport");
        };
        assert_eq!(ws.path.as_deref(), Some("/ws"));
        assert_eq!(
            ws.headers.get("Host").map(String::as_str),
            Some("ws.example.com")
        );
    }

    #[test]
    fn test_vless_with_grpc() {
        let vless = parse("vless://uuid@example.com:443?type=grpc&serviceName=myservice#grpc-node");
        let Some(V2RayTransport::Grpc(grpc)) = vless.transport else {
            panic!("Expected gRPC transport");
        };
        assert_eq!(grpc.service_name.as_deref(), Some("myservice"));
    }

    #[test]
    fn test_vless_no_security() {
        let vless = parse("vless://uuid@example.com:80?encryption=none");
        assert!(vless.tls.is_none());
        assert_eq!(vless.tag, "example.com:80");
    }

    #[test]
    fn test_vless_missing_uuid() {
        let err = VLessParser.parse("vless://example.com:443").unwrap_err();
        assert_eq!(err, ParseError::missing(PROTOCOL, "uuid"));
    }

    #[test]
    fn test_vless_missing_port() {
        let err = VLessParser.parse("vless://uuid@example.com").unwrap_err();
        assert_eq!(err, ParseError::missing(PROTOCOL, "server_port"));
    }
}
