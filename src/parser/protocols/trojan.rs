//! Trojan protocol parser
//!
//! This module provides parsing for Trojan (trojan://) URIs.
//! Format: trojan://password@host:port?params#tag

use tracing::{debug, trace};

use crate::config::outbound::{Outbound, ServerEndpoint, TrojanOutbound};
use crate::config::shared::{OutboundRealityConfig, OutboundTlsConfig};
use crate::parser::error::ParseError;
use crate::parser::transport::transport_from_query;
use crate::parser::uri::UriParts;

use super::{ProtocolParser, query_tls};

const PROTOCOL: &str = "trojan";

// ============================================================================
// Trojan Parser
// ============================================================================

/// Parser for Trojan (trojan://) URIs
///
/// Format: trojan://password@host:port?params#tag
///
/// Trojan always runs over TLS; `security=none` is ignored.
pub struct TrojanParser;

impl ProtocolParser for TrojanParser {
    fn scheme(&self) -> &str {
        "trojan"
    }

    fn parse(&self, uri: &str) -> Result<Outbound, ParseError> {
        trace!("Parsing Trojan URI");
        let parts = UriParts::parse(uri, PROTOCOL)?;

        let password = parts
            .decoded_userinfo(PROTOCOL)?
            .filter(|p| !p.is_empty())
            .ok_or_else(|| ParseError::missing(PROTOCOL, "password"))?;
        let server_port = parts.require_port(PROTOCOL)?;
        let query = &parts.query;

        if query.get("security") == Some("none") {
            debug!("Ignoring security=none on Trojan link; TLS is mandatory");
        }

        let tls = OutboundTlsConfig {
            reality: query
                .string(&["pbk"])
                .map(|pbk| OutboundRealityConfig::new(pbk, query.string(&["sid"]))),
            ..query_tls(query, &["sni", "peer"])
        };

        Ok(Outbound::Trojan(TrojanOutbound {
            tls: Some(tls),
            transport: transport_from_query(query, PROTOCOL)?,
            ..TrojanOutbound::new(
                parts.tag_or(server_port),
                ServerEndpoint::new(parts.host.clone(), server_port),
                password,
            )
        }))
    }
}
