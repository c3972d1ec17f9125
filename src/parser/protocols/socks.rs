//! SOCKS protocol parser
//!
//! Format: socks://[BASE64(user:pass)@]host:port#tag or
//! socks5://[user:pass@]host:port#tag

use tracing::trace;

use crate::config::outbound::{Outbound, ServerEndpoint, SocksOutbound};
use crate::parser::base64::decode_base64_str;
use crate::parser::error::ParseError;
use crate::parser::uri::{UriParts, percent_decode};

use super::ProtocolParser;

const PROTOCOL: &str = "socks";

/// Parser for SOCKS5 (socks:// or socks5://) URIs
pub struct SocksParser {
    scheme: &'static str,
}

impl SocksParser {
    pub fn new(scheme: &'static str) -> Self {
        Self { scheme }
    }
}

impl ProtocolParser for SocksParser {
    fn scheme(&self) -> &str {
        self.scheme
    }

    fn parse(&self, uri: &str) -> Result<Outbound, ParseError> {
        trace!("Parsing SOCKS URI (scheme: {})", self.scheme);
        let parts = UriParts::parse(uri, PROTOCOL)?;
        let server_port = parts.require_port(PROTOCOL)?;

        let socks = SocksOutbound {
            udp_over_tcp: parts.query.flag(&["uot", "udp-over-tcp"]),
            ..SocksOutbound::new(
                parts.tag_or(server_port),
                ServerEndpoint::new(parts.host.clone(), server_port),
            )
        };

        let socks = match parts.userinfo.as_deref() {
            Some(userinfo) => {
                let (username, password) = parse_credentials(userinfo)?;
                SocksOutbound {
                    username: Some(username),
                    password,
                    ..socks
                }
            }
            None => socks,
        };

        Ok(Outbound::Socks(socks))
    }
}

/// Userinfo is either `user:pass` or `BASE64(user:pass)`.
fn parse_credentials(userinfo: &str) -> Result<(String, Option<String>), ParseError> {
    let (user, pass) = match userinfo.split_once(':') {
        Some((user, pass)) => (
            percent_decode(user, PROTOCOL)?,
            Some(percent_decode(pass, PROTOCOL)?),
        ),
        None => {
            let plain = percent_decode(userinfo, PROTOCOL)?;
            let decoded = decode_base64_str(&plain);
            match decoded.as_deref().and_then(|d| d.split_once(':')) {
                Some((user, pass)) => (user.to_string(), Some(pass.to_string())),
                None => (plain, None),
            }
        }
    };
    if user.is_empty() {
        return Err(ParseError::missing(PROTOCOL, "username"));
    }
    Ok((user, pass.filter(|p| !p.is_empty())))
}
