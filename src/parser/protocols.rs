//! Protocol parsers module
//!
//! This module contains parsers for the supported share-link formats.
//! Each parser implements the `ProtocolParser` trait to provide a consistent
//! interface for turning one link into one sing-box outbound.

mod hysteria;
pub(crate) mod hysteria2;
mod shadowsocks;
mod socks;
mod ssh;
mod trojan;
mod tuic;
mod vless;
mod vmess;
pub(crate) mod wireguard;

pub use hysteria::HysteriaParser;
pub use hysteria2::Hysteria2Parser;
pub use shadowsocks::ShadowsocksParser;
pub use socks::SocksParser;
pub use ssh::SshParser;
pub use trojan::TrojanParser;
pub use tuic::TuicParser;
pub use vless::VLessParser;
pub use vmess::VMessParser;
pub use wireguard::WireGuardParser;

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use crate::assemble::normalize_outbound;
use crate::config::outbound::Outbound;
use crate::config::shared::OutboundTlsConfig;

use super::error::ParseError;
use super::uri::QueryParams;

/// Every scheme the built-in registry dispatches on, aliases included.
pub const SUPPORTED_SCHEMES: &[&str] = &[
    "ss",
    "vmess",
    "vless",
    "trojan",
    "hysteria",
    "hysteria2",
    "hy2",
    "tuic",
    "socks",
    "socks5",
    "ssh",
    "wireguard",
    "wg",
];

// ============================================================================
// Protocol Parser Trait
// ============================================================================

/// Trait for parsing individual protocol links
pub trait ProtocolParser: Send + Sync {
    /// Returns the link scheme this parser handles (e.g., "ss", "vmess")
    fn scheme(&self) -> &str;

    /// Parses a link into an Outbound configuration
    fn parse(&self, uri: &str) -> Result<Outbound, ParseError>;

    /// Checks if this parser can handle the given link
    fn can_parse(&self, uri: &str) -> bool {
        uri.strip_prefix(self.scheme())
            .is_some_and(|rest| rest.starts_with("://"))
    }
}

// ============================================================================
// Protocol Registry
// ============================================================================

/// Registry for protocol parsers with dynamic dispatch
///
/// Immutable once built; share it behind an `Arc` to parse from several
/// tasks at once.
#[derive(Default)]
pub struct ProtocolRegistry {
    parsers: HashMap<String, Arc<dyn ProtocolParser>>,
}

impl ProtocolRegistry {
    /// Creates a new empty registry
    pub fn new() -> Self {
        Self {
            parsers: HashMap::new(),
        }
    }

    /// Creates a registry with all built-in parsers registered
    pub fn with_builtin_parsers() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(ShadowsocksParser));
        registry.register(Arc::new(VMessParser));
        registry.register(Arc::new(VLessParser));
        registry.register(Arc::new(TrojanParser));
        registry.register(Arc::new(HysteriaParser));
        registry.register(Arc::new(Hysteria2Parser::new("hysteria2")));
        registry.register(Arc::new(Hysteria2Parser::new("hy2")));
        registry.register(Arc::new(TuicParser));
        registry.register(Arc::new(SocksParser::new("socks")));
        registry.register(Arc::new(SocksParser::new("socks5")));
        registry.register(Arc::new(SshParser));
        registry.register(Arc::new(WireGuardParser::new("wireguard")));
        registry.register(Arc::new(WireGuardParser::new("wg")));
        registry
    }

    /// Registers a protocol parser
    pub fn register(&mut self, parser: Arc<dyn ProtocolParser>) {
        self.parsers.insert(parser.scheme().to_string(), parser);
    }

    /// Gets a parser for the given scheme
    pub fn get(&self, scheme: &str) -> Option<&Arc<dyn ProtocolParser>> {
        self.parsers.get(scheme)
    }

    /// Selects the parser whose scheme literally prefixes `uri`.
    pub fn dispatch(&self, uri: &str) -> Result<&Arc<dyn ProtocolParser>, ParseError> {
        let scheme = extract_scheme(uri)?;
        self.parsers
            .get(scheme)
            .ok_or_else(|| ParseError::UnsupportedScheme(scheme.to_string()))
    }

    /// Parses a link with the matching parser and applies the shared
    /// defaulting rules to the result.
    pub fn parse_uri(&self, uri: &str) -> Result<Outbound, ParseError> {
        let uri = uri.trim();
        let parser = self.dispatch(uri)?;
        debug!("Parsing URI with scheme '{}'", parser.scheme());

        match parser.parse(uri) {
            Ok(outbound) => {
                debug!(
                    "Successfully parsed {} URI -> outbound '{}'",
                    parser.scheme(),
                    outbound.tag()
                );
                Ok(normalize_outbound(outbound))
            }
            Err(e) => {
                debug!("Failed to parse {} URI: {}", parser.scheme(), e);
                Err(e)
            }
        }
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Extracts the scheme from a link
pub fn extract_scheme(uri: &str) -> Result<&str, ParseError> {
    match uri.split_once("://") {
        Some((scheme, _)) if !scheme.is_empty() => Ok(scheme),
        _ => {
            let preview: String = uri.chars().take(24).collect();
            Err(ParseError::UnsupportedScheme(preview))
        }
    }
}

/// Client TLS settings shared by the URI-query protocols.
///
/// `sni_keys` lists the parameter names carrying the server name, in
/// precedence order.
pub(crate) fn query_tls(query: &QueryParams, sni_keys: &[&str]) -> OutboundTlsConfig {
    OutboundTlsConfig {
        insecure: query.flag(&["allowInsecure", "insecure", "allow_insecure"]),
        alpn: query.list(&["alpn"]),
        ..OutboundTlsConfig::enabled()
    }
    .with_server_name(query.string(sni_keys))
    .with_fingerprint(query.string(&["fp"]))
}
