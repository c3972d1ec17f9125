//! VMess protocol parser
//!
//! This module provides parsing for VMess (vmess://) URIs.
//! VMess URIs use Base64-encoded JSON format.

use serde::Deserialize;
use tracing::{trace, warn};

use crate::config::outbound::{Outbound, ServerEndpoint, VMessOutbound};
use crate::config::shared::OutboundTlsConfig;
use crate::config::util::{
    deserialize_loose_bool, deserialize_loose_string, deserialize_loose_u16,
    deserialize_loose_u32,
};
use crate::parser::base64::decode_base64_str;
use crate::parser::error::ParseError;
use crate::parser::transport::{TransportOptions, build_transport};
use crate::parser::uri::{decode_label, split_list};

use super::ProtocolParser;

const PROTOCOL: &str = "vmess";

// ============================================================================
// VMess JSON Structure
// ============================================================================

/// VMess share link JSON (v2rayN format)
///
/// Every field is optional here; presence of the required ones is checked
/// after decoding so the error names the missing field.
#[derive(Debug, Deserialize)]
struct VMessJson {
    /// Display name
    #[serde(default, deserialize_with = "deserialize_loose_string")]
    ps: Option<String>,
    /// Server address
    #[serde(default, deserialize_with = "deserialize_loose_string")]
    add: Option<String>,
    /// Server port (number or string)
    #[serde(default, deserialize_with = "deserialize_loose_u16")]
    port: Option<u16>,
    /// User ID (UUID)
    #[serde(default, deserialize_with = "deserialize_loose_string")]
    id: Option<String>,
    /// Alter ID (number or string)
    #[serde(default, deserialize_with = "deserialize_loose_u32")]
    aid: Option<u32>,
    /// Security/cipher
    #[serde(default, deserialize_with = "deserialize_loose_string")]
    scy: Option<String>,
    /// Network type (tcp, ws, grpc, h2, http)
    #[serde(default, deserialize_with = "deserialize_loose_string")]
    net: Option<String>,
    /// Host header / HTTP/2 host
    #[serde(default, deserialize_with = "deserialize_loose_string")]
    host: Option<String>,
    /// Path (ws/h2) or service name (grpc)
    #[serde(default, deserialize_with = "deserialize_loose_string")]
    path: Option<String>,
    /// gRPC service name used by some exporters instead of `path`
    #[serde(
        default,
        rename = "serviceName",
        deserialize_with = "deserialize_loose_string"
    )]
    service_name: Option<String>,
    /// TLS setting ("tls" or empty)
    #[serde(default, deserialize_with = "deserialize_loose_string")]
    tls: Option<String>,
    /// SNI
    #[serde(default, deserialize_with = "deserialize_loose_string")]
    sni: Option<String>,
    /// ALPN, comma separated
    #[serde(default, deserialize_with = "deserialize_loose_string")]
    alpn: Option<String>,
    /// uTLS fingerprint
    #[serde(default, deserialize_with = "deserialize_loose_string")]
    fp: Option<String>,
    /// Skip certificate verification
    #[serde(
        default,
        rename = "allowInsecure",
        deserialize_with = "deserialize_loose_bool"
    )]
    allow_insecure: bool,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

// ============================================================================
// VMess Parser
// ============================================================================

/// Parser for VMess (vmess://) URIs
///
/// Format: vmess://BASE64(JSON)
pub struct VMessParser;

impl ProtocolParser for VMessParser {
    fn scheme(&self) -> &str {
        "vmess"
    }

    fn parse(&self, uri: &str) -> Result<Outbound, ParseError> {
        trace!("Parsing VMess URI");
        let encoded = uri
            .trim()
            .strip_prefix("vmess://")
            .ok_or_else(|| ParseError::malformed(PROTOCOL, "missing vmess:// prefix"))?;

        // A few exporters append a `#label` after the Base64 blob
        let (encoded, label) = match encoded.split_once('#') {
            Some((encoded, label)) => (encoded, Some(decode_label(label))),
            None => (encoded, None),
        };

        let decoded = decode_base64_str(encoded)
            .ok_or_else(|| ParseError::malformed(PROTOCOL, "invalid Base64 payload"))?;
        trace!("VMess decoded JSON length: {} bytes", decoded.len());

        let json: VMessJson = serde_json::from_str(&decoded)
            .map_err(|e| ParseError::malformed(PROTOCOL, format!("invalid JSON: {e}")))?;

        let server =
            non_empty(json.add.clone()).ok_or_else(|| ParseError::missing(PROTOCOL, "server"))?;
        let server_port = match json.port {
            None => return Err(ParseError::missing(PROTOCOL, "server_port")),
            Some(0) => return Err(ParseError::invalid(PROTOCOL, "server_port", "0")),
            Some(port) => port,
        };
        let uuid =
            non_empty(json.id.clone()).ok_or_else(|| ParseError::missing(PROTOCOL, "uuid"))?;
        let endpoint = ServerEndpoint::new(server, server_port);

        let tag = non_empty(json.ps.clone())
            .or(label.filter(|l| !l.is_empty()))
            .unwrap_or_else(|| endpoint.default_tag());

        let alter_id = json.aid.unwrap_or(0);
        if alter_id != 0 {
            warn!(
                "VMess outbound '{}' uses legacy alter id {}; only alter id 0 is supported",
                tag, alter_id
            );
        }

        let transport = build_transport(
            json.net.as_deref(),
            TransportOptions {
                path: json.path.clone(),
                host: json.host.clone(),
                service_name: json.service_name.clone(),
                ..Default::default()
            },
            PROTOCOL,
        )?;

        Ok(Outbound::VMess(VMessOutbound {
            security: non_empty(json.scy.clone()).unwrap_or_else(|| "auto".to_string()),
            alter_id,
            tls: build_tls(&json),
            transport,
            ..VMessOutbound::new(tag, endpoint, uuid)
        }))
    }
}

fn build_tls(json: &VMessJson) -> Option<OutboundTlsConfig> {
    let enabled = json
        .tls
        .as_deref()
        .is_some_and(|tls| tls.eq_ignore_ascii_case("tls"));
    if !enabled {
        return None;
    }

    // The Host header doubles as SNI when no explicit one is given
    let server_name = non_empty(json.sni.clone()).or_else(|| {
        json.host
            .as_deref()
            .and_then(|host| split_list(host).into_iter().next())
    });

    Some(
        OutboundTlsConfig {
            insecure: json.allow_insecure,
            alpn: json.alpn.as_deref().map(split_list).unwrap_or_default(),
            ..OutboundTlsConfig::enabled()
        }
        .with_server_name(server_name)
        .with_fingerprint(json.fp.clone()),
    )
}
