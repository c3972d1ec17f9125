//! WireGuard protocol parser
//!
//! Format: wireguard://PRIVATE_KEY@host:port?public_key=...&address=...#tag

use tracing::trace;

use crate::config::outbound::{Outbound, ServerEndpoint, WireGuardOutbound, WireGuardPeer};
use crate::parser::error::ParseError;
use crate::parser::uri::{QueryParams, UriParts, split_list};

use super::ProtocolParser;

const PROTOCOL: &str = "wireguard";

/// Parser for WireGuard (wireguard:// or wg://) URIs
///
/// The link describes exactly one peer, built from `public_key`.
///
/// Supported params:
/// - public_key/publickey/peer_public_key: Peer public key (required)
/// - address/ip: Local addresses, comma separated
/// - reserved: Three reserved bytes, `a,b,c`
/// - mtu: Tunnel MTU
/// - psk/presharedkey/pre_shared_key: Pre-shared key
pub struct WireGuardParser {
    scheme: &'static str,
}

impl WireGuardParser {
    pub fn new(scheme: &'static str) -> Self {
        Self { scheme }
    }
}

impl ProtocolParser for WireGuardParser {
    fn scheme(&self) -> &str {
        self.scheme
    }

    fn parse(&self, uri: &str) -> Result<Outbound, ParseError> {
        trace!("Parsing WireGuard URI (scheme: {})", self.scheme);
        let parts = UriParts::parse(uri, PROTOCOL)?;

        let private_key = parts
            .decoded_userinfo(PROTOCOL)?
            .filter(|k| !k.is_empty())
            .ok_or_else(|| ParseError::missing(PROTOCOL, "private_key"))?;
        let server_port = parts.require_port(PROTOCOL)?;
        let query = &parts.query;

        let public_key = query
            .string(&["public_key", "publickey", "peer_public_key"])
            .ok_or_else(|| ParseError::missing(PROTOCOL, "public_key"))?;

        let peer = WireGuardPeer {
            pre_shared_key: query.string(&["psk", "presharedkey", "pre_shared_key"]),
            reserved: parse_reserved(query)?,
            ..WireGuardPeer::new(ServerEndpoint::new(parts.host.clone(), server_port), public_key)
        };

        let mut wireguard =
            WireGuardOutbound::new(parts.tag_or(server_port), private_key, peer);
        wireguard.local_address = query
            .list(&["address", "ip"])
            .into_iter()
            .map(with_prefix_length)
            .collect();
        if let Some(mtu) = query.number(PROTOCOL, &["mtu"])? {
            wireguard.mtu = mtu;
        }

        Ok(Outbound::WireGuard(wireguard))
    }
}

/// Appends `/32` or `/128` to a bare address.
pub(crate) fn with_prefix_length(address: String) -> String {
    if address.contains('/') {
        address
    } else if address.contains(':') {
        format!("{}/128", address)
    } else {
        format!("{}/32", address)
    }
}

fn parse_reserved(query: &QueryParams) -> Result<Option<[u8; 3]>, ParseError> {
    let Some(raw) = query.first_of(&["reserved"]) else {
        return Ok(None);
    };
    let bytes = split_list(raw)
        .iter()
        .map(|b| b.parse::<u8>())
        .collect::<Result<Vec<_>, _>>()
        .ok()
        .and_then(|bytes| <[u8; 3]>::try_from(bytes).ok())
        .ok_or_else(|| ParseError::invalid(PROTOCOL, "reserved", raw))?;
    Ok(Some(bytes))
}
