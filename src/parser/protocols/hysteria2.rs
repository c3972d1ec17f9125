//! Hysteria2 protocol parser
//!
//! This module provides parsing for Hysteria2 (hysteria2:// or hy2://) URIs.
//! Format: hysteria2://auth@host:port?params#tag

use tracing::trace;

use crate::config::outbound::{Hysteria2Outbound, Obfuscation, Outbound, ServerEndpoint};
use crate::parser::error::ParseError;
use crate::parser::uri::{UriParts, split_list};

use super::{ProtocolParser, query_tls};

const PROTOCOL: &str = "hysteria2";

// ============================================================================
// Hysteria2 Parser
// ============================================================================

/// Parser for Hysteria2 (hysteria2:// or hy2://) URIs
///
/// Format: hysteria2://auth@host:port?params#tag
///
/// The whole userinfo is the password, so `user:pass` style auth is kept
/// verbatim.
pub struct Hysteria2Parser {
    scheme: &'static str,
}

impl Hysteria2Parser {
    pub fn new(scheme: &'static str) -> Self {
        Self { scheme }
    }
}

impl ProtocolParser for Hysteria2Parser {
    fn scheme(&self) -> &str {
        self.scheme
    }

    fn parse(&self, uri: &str) -> Result<Outbound, ParseError> {
        trace!("Parsing Hysteria2 URI (scheme: {})", self.scheme);
        let parts = UriParts::parse(uri, PROTOCOL)?;
        let server_port = parts.require_port(PROTOCOL)?;
        let query = &parts.query;

        let obfs = query
            .first_of(&["obfs"])
            .filter(|kind| *kind != "none")
            .map(|kind| Obfuscation {
                kind: kind.to_string(),
                password: query.string(&["obfs-password", "obfs_password"]),
            });

        let server_ports = match query.first_of(&["mport"]) {
            Some(mport) => parse_port_ranges(mport)?,
            None => Vec::new(),
        };

        Ok(Outbound::Hysteria2(Hysteria2Outbound {
            password: parts.decoded_userinfo(PROTOCOL)?.filter(|p| !p.is_empty()),
            obfs,
            server_ports,
            up_mbps: query.number(PROTOCOL, &["up", "upmbps"])?,
            down_mbps: query.number(PROTOCOL, &["down", "downmbps"])?,
            tls: Some(query_tls(query, &["sni", "peer"])),
            ..Hysteria2Outbound::new(
                parts.tag_or(server_port),
                ServerEndpoint::new(parts.host.clone(), server_port),
            )
        }))
    }
}

/// Converts `20000-30000,40000` into sing-box `start:end` ranges.
pub(crate) fn parse_port_ranges(mport: &str) -> Result<Vec<String>, ParseError> {
    split_list(mport)
        .iter()
        .map(|range| {
            let range = range.as_str();
            let (start, end) = range.split_once('-').unwrap_or((range, range));
            match (start.trim().parse::<u16>(), end.trim().parse::<u16>()) {
                (Ok(start), Ok(end)) if start != 0 && start <= end => {
                    Ok(format!("{}:{}", start, end))
                }
                _ => Err(ParseError::invalid(PROTOCOL, "mport", range)),
            }
        })
        .collect()
}
