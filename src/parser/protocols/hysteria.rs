//! Hysteria protocol parser
//!
//! Format: hysteria://host:port?auth=...&peer=...&upmbps=...&downmbps=...#tag

use tracing::trace;

use crate::config::outbound::{HysteriaOutbound, Outbound, ServerEndpoint};
use crate::parser::error::ParseError;
use crate::parser::uri::UriParts;

use super::{ProtocolParser, query_tls};

const PROTOCOL: &str = "hysteria";

/// Parser for Hysteria v1 (hysteria://) URIs
///
/// Supported params:
/// - auth: Authentication string (userinfo is used when absent)
/// - peer/sni: Server name for TLS
/// - insecure: Skip certificate verification
/// - upmbps/downmbps: Bandwidth in Mbps
/// - obfsParam: Obfuscation password
/// - alpn: ALPN protocols
pub struct HysteriaParser;

impl ProtocolParser for HysteriaParser {
    fn scheme(&self) -> &str {
        "hysteria"
    }

    fn parse(&self, uri: &str) -> Result<Outbound, ParseError> {
        trace!("Parsing Hysteria URI");
        let parts = UriParts::parse(uri, PROTOCOL)?;
        let server_port = parts.require_port(PROTOCOL)?;
        let query = &parts.query;

        let auth_str = match query.string(&["auth", "auth_str"]) {
            Some(auth) => Some(auth),
            None => parts.decoded_userinfo(PROTOCOL)?.filter(|u| !u.is_empty()),
        };

        Ok(Outbound::Hysteria(HysteriaOutbound {
            up_mbps: query.number(PROTOCOL, &["upmbps", "up"])?,
            down_mbps: query.number(PROTOCOL, &["downmbps", "down"])?,
            obfs: query.string(&["obfsParam", "obfs-password"]),
            auth_str,
            recv_window_conn: query.number(PROTOCOL, &["recv_window_conn"])?,
            recv_window: query.number(PROTOCOL, &["recv_window"])?,
            disable_mtu_discovery: query.flag(&["disable_mtu_discovery"]),
            tls: Some(query_tls(query, &["peer", "sni"])),
            ..HysteriaOutbound::new(
                parts.tag_or(server_port),
                ServerEndpoint::new(parts.host.clone(), server_port),
            )
        }))
    }
}
