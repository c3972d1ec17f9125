//! Shared field structures for outbound configuration.
//!
//! TLS and its camouflage extensions are embedded in most protocol
//! outbounds, so they live here rather than next to any one protocol.

use serde::{Deserialize, Serialize};

use crate::config::util::is_false;

// ============================================================================
// TLS Fields
// ============================================================================

/// TLS configuration for outbound (client).
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct OutboundTlsConfig {
    /// Enable TLS
    #[serde(default, skip_serializing_if = "is_false")]
    pub enabled: bool,

    /// Do not send server name in ClientHello
    #[serde(default, skip_serializing_if = "is_false")]
    pub disable_sni: bool,

    /// Server name for verification and SNI
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_name: Option<String>,

    /// Accept any server certificate (insecure)
    #[serde(default, skip_serializing_if = "is_false")]
    pub insecure: bool,

    /// List of supported ALPN protocols
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub alpn: Vec<String>,

    /// ECH (Encrypted Client Hello) configuration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ech: Option<OutboundEchConfig>,

    /// uTLS configuration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub utls: Option<UtlsConfig>,

    /// Reality configuration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reality: Option<OutboundRealityConfig>,
}

impl OutboundTlsConfig {
    /// An enabled TLS block with no other settings.
    pub fn enabled() -> Self {
        Self {
            enabled: true,
            ..Default::default()
        }
    }

    /// Sets the server name unless it is empty.
    pub fn with_server_name(mut self, server_name: Option<String>) -> Self {
        self.server_name = server_name.filter(|s| !s.is_empty());
        self
    }

    /// Sets a uTLS fingerprint unless it is empty.
    pub fn with_fingerprint(mut self, fingerprint: Option<String>) -> Self {
        self.utls = fingerprint
            .filter(|fp| !fp.is_empty() && fp != "none")
            .map(UtlsConfig::enabled_with);
        self
    }
}

/// ECH configuration for outbound (client).
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct OutboundEchConfig {
    /// Enable ECH
    #[serde(default, skip_serializing_if = "is_false")]
    pub enabled: bool,

    /// ECH configuration in PEM format
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub config: Vec<String>,
}

/// uTLS configuration for outbound.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct UtlsConfig {
    /// Enable uTLS
    #[serde(default, skip_serializing_if = "is_false")]
    pub enabled: bool,

    /// Fingerprint to use: chrome, firefox, edge, safari, 360, qq, ios, android, random, randomized
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fingerprint: Option<String>,
}

impl UtlsConfig {
    fn enabled_with(fingerprint: String) -> Self {
        Self {
            enabled: true,
            fingerprint: Some(fingerprint),
        }
    }
}

/// Reality configuration for outbound (client).
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct OutboundRealityConfig {
    /// Enable Reality
    #[serde(default, skip_serializing_if = "is_false")]
    pub enabled: bool,

    /// Public key (generated by `sing-box generate reality-keypair`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_key: Option<String>,

    /// Short ID (hex string, 0-8 digits)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short_id: Option<String>,
}

impl OutboundRealityConfig {
    /// Creates an enabled Reality block.
    pub fn new(public_key: impl Into<String>, short_id: Option<String>) -> Self {
        Self {
            enabled: true,
            public_key: Some(public_key.into()),
            short_id: short_id.filter(|s| !s.is_empty()),
        }
    }
}
