//! Typed view of a Clash aggregator document.
//!
//! Only the keys the translator reads are modelled; everything else in the
//! document is ignored. Scalars that aggregators emit both as numbers and as
//! strings go through the loose deserializers in [`crate::config::util`].

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::config::util::{
    deserialize_loose_bool, deserialize_loose_string, deserialize_loose_u16,
    deserialize_loose_u32, deserialize_loose_u64, deserialize_string_or_vec,
};

/// Top-level document. Entries stay untyped until their `type` is known.
#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "kebab-case", default)]
pub struct ClashDocument {
    #[serde(alias = "Proxy")]
    pub proxies: Option<Vec<serde_yaml::Value>>,

    #[serde(alias = "Proxy Group")]
    pub proxy_groups: Option<Vec<serde_yaml::Value>>,
}

// ============================================================================
// Common Proxy Fields
// ============================================================================

/// Keys shared by every proxy type.
#[derive(Deserialize, Debug, Default, Clone)]
#[serde(rename_all = "kebab-case", default)]
pub struct CommonFields {
    #[serde(deserialize_with = "deserialize_loose_string")]
    pub name: Option<String>,

    #[serde(deserialize_with = "deserialize_loose_string")]
    pub server: Option<String>,

    #[serde(deserialize_with = "deserialize_loose_u16")]
    pub port: Option<u16>,

    #[serde(deserialize_with = "deserialize_loose_bool")]
    pub tls: bool,

    #[serde(deserialize_with = "deserialize_loose_bool")]
    pub skip_cert_verify: bool,

    pub servername: Option<String>,

    pub sni: Option<String>,

    #[serde(deserialize_with = "deserialize_string_or_vec")]
    pub alpn: Vec<String>,

    pub client_fingerprint: Option<String>,

    pub network: Option<String>,

    pub ws_opts: Option<WsOpts>,

    pub grpc_opts: Option<GrpcOpts>,

    pub h2_opts: Option<H2Opts>,

    pub http_opts: Option<HttpOpts>,

    pub reality_opts: Option<RealityOpts>,

    pub ech_opts: Option<EchOpts>,

    pub smux: Option<SmuxOpts>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(rename_all = "kebab-case", default)]
pub struct WsOpts {
    pub path: Option<String>,

    /// Header names are matched case-insensitively by the translator
    pub headers: BTreeMap<String, String>,

    #[serde(deserialize_with = "deserialize_loose_u32")]
    pub max_early_data: Option<u32>,

    pub early_data_header_name: Option<String>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(rename_all = "kebab-case", default)]
pub struct GrpcOpts {
    pub grpc_service_name: Option<String>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(rename_all = "kebab-case", default)]
pub struct H2Opts {
    #[serde(deserialize_with = "deserialize_string_or_vec")]
    pub host: Vec<String>,

    pub path: Option<String>,
}

/// `network: http` options; every header carries a list of values.
#[derive(Deserialize, Debug, Default, Clone)]
#[serde(rename_all = "kebab-case", default)]
pub struct HttpOpts {
    #[serde(deserialize_with = "deserialize_string_or_vec")]
    pub path: Vec<String>,

    pub headers: BTreeMap<String, Vec<String>>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(rename_all = "kebab-case", default)]
pub struct RealityOpts {
    pub public_key: Option<String>,

    #[serde(deserialize_with = "deserialize_loose_string")]
    pub short_id: Option<String>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(rename_all = "kebab-case", default)]
pub struct EchOpts {
    #[serde(deserialize_with = "deserialize_loose_bool")]
    pub enable: bool,

    pub config: Option<String>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(rename_all = "kebab-case", default)]
pub struct SmuxOpts {
    #[serde(deserialize_with = "deserialize_loose_bool")]
    pub enabled: bool,

    pub protocol: Option<String>,

    #[serde(deserialize_with = "deserialize_loose_u32")]
    pub max_connections: Option<u32>,

    #[serde(deserialize_with = "deserialize_loose_u32")]
    pub min_streams: Option<u32>,

    #[serde(deserialize_with = "deserialize_loose_u32")]
    pub max_streams: Option<u32>,

    #[serde(deserialize_with = "deserialize_loose_bool")]
    pub padding: bool,
}

// ============================================================================
// Per-Type Proxies
// ============================================================================

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct ClashShadowsocks {
    #[serde(flatten)]
    pub common: CommonFields,

    #[serde(default)]
    pub cipher: Option<String>,

    #[serde(default, deserialize_with = "deserialize_loose_string")]
    pub password: Option<String>,

    #[serde(default)]
    pub plugin: Option<String>,

    /// Mapping of plugin options, flattened to SIP003 form on translation
    #[serde(default)]
    pub plugin_opts: Option<serde_yaml::Mapping>,

    #[serde(default, deserialize_with = "deserialize_loose_bool")]
    pub udp_over_tcp: bool,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct ClashVmess {
    #[serde(flatten)]
    pub common: CommonFields,

    #[serde(default)]
    pub uuid: Option<String>,

    #[serde(rename = "alterId", default, deserialize_with = "deserialize_loose_u32")]
    pub alter_id: Option<u32>,

    #[serde(default)]
    pub cipher: Option<String>,

    #[serde(default)]
    pub packet_encoding: Option<String>,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct ClashVless {
    #[serde(flatten)]
    pub common: CommonFields,

    #[serde(default)]
    pub uuid: Option<String>,

    #[serde(default)]
    pub flow: Option<String>,

    #[serde(default)]
    pub packet_encoding: Option<String>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct ClashTrojan {
    #[serde(flatten)]
    pub common: CommonFields,

    #[serde(default, deserialize_with = "deserialize_loose_string")]
    pub password: Option<String>,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct ClashHysteria {
    #[serde(flatten)]
    pub common: CommonFields,

    #[serde(
        alias = "auth_str",
        default,
        deserialize_with = "deserialize_loose_string"
    )]
    pub auth_str: Option<String>,

    /// Bandwidth such as `30`, `"30 Mbps"` or `"1 Gbps"`
    #[serde(default, deserialize_with = "deserialize_loose_string")]
    pub up: Option<String>,

    #[serde(default, deserialize_with = "deserialize_loose_string")]
    pub down: Option<String>,

    #[serde(default)]
    pub obfs: Option<String>,

    #[serde(default, deserialize_with = "deserialize_loose_u64")]
    pub recv_window_conn: Option<u64>,

    #[serde(default, deserialize_with = "deserialize_loose_u64")]
    pub recv_window: Option<u64>,

    #[serde(default, deserialize_with = "deserialize_loose_bool")]
    pub disable_mtu_discovery: bool,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct ClashHysteria2 {
    #[serde(flatten)]
    pub common: CommonFields,

    #[serde(default, deserialize_with = "deserialize_loose_string")]
    pub password: Option<String>,

    #[serde(default, deserialize_with = "deserialize_loose_string")]
    pub up: Option<String>,

    #[serde(default, deserialize_with = "deserialize_loose_string")]
    pub down: Option<String>,

    #[serde(default)]
    pub obfs: Option<String>,

    #[serde(default, deserialize_with = "deserialize_loose_string")]
    pub obfs_password: Option<String>,

    /// Port hopping ranges, e.g. `20000-30000,40000`
    #[serde(default, deserialize_with = "deserialize_loose_string")]
    pub ports: Option<String>,

    #[serde(default, deserialize_with = "deserialize_loose_string")]
    pub hop_interval: Option<String>,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct ClashTuic {
    #[serde(flatten)]
    pub common: CommonFields,

    #[serde(default)]
    pub uuid: Option<String>,

    #[serde(default, deserialize_with = "deserialize_loose_string")]
    pub password: Option<String>,

    #[serde(default)]
    pub congestion_controller: Option<String>,

    #[serde(default)]
    pub udp_relay_mode: Option<String>,

    #[serde(default, deserialize_with = "deserialize_loose_bool")]
    pub reduce_rtt: bool,

    /// Milliseconds when written without a unit
    #[serde(default, deserialize_with = "deserialize_loose_string")]
    pub heartbeat_interval: Option<String>,

    #[serde(default, deserialize_with = "deserialize_loose_bool")]
    pub disable_sni: bool,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct ClashSocks {
    #[serde(flatten)]
    pub common: CommonFields,

    #[serde(default, deserialize_with = "deserialize_loose_string")]
    pub username: Option<String>,

    #[serde(default, deserialize_with = "deserialize_loose_string")]
    pub password: Option<String>,

    #[serde(default, deserialize_with = "deserialize_loose_bool")]
    pub udp_over_tcp: bool,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct ClashSsh {
    #[serde(flatten)]
    pub common: CommonFields,

    #[serde(default, deserialize_with = "deserialize_loose_string")]
    pub username: Option<String>,

    #[serde(default, deserialize_with = "deserialize_loose_string")]
    pub password: Option<String>,

    #[serde(default)]
    pub private_key: Option<String>,

    #[serde(default)]
    pub private_key_passphrase: Option<String>,

    #[serde(default, deserialize_with = "deserialize_string_or_vec")]
    pub host_key: Vec<String>,

    #[serde(default, deserialize_with = "deserialize_string_or_vec")]
    pub host_key_algorithms: Vec<String>,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct ClashWireGuard {
    #[serde(flatten)]
    pub common: CommonFields,

    #[serde(default)]
    pub private_key: Option<String>,

    #[serde(default)]
    pub public_key: Option<String>,

    #[serde(default)]
    pub pre_shared_key: Option<String>,

    #[serde(default)]
    pub ip: Option<String>,

    #[serde(default)]
    pub ipv6: Option<String>,

    #[serde(default)]
    pub reserved: Option<Reserved>,

    #[serde(default, deserialize_with = "deserialize_loose_u32")]
    pub mtu: Option<u32>,

    #[serde(default, deserialize_with = "deserialize_string_or_vec")]
    pub allowed_ips: Vec<String>,
}

/// WireGuard reserved bytes: `[1, 2, 3]`, `"1,2,3"` or Base64 of three bytes.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum Reserved {
    Bytes(Vec<u8>),
    Text(String),
}

// ============================================================================
// Proxy Groups
// ============================================================================

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(rename_all = "kebab-case", default)]
pub struct ClashProxyGroup {
    #[serde(deserialize_with = "deserialize_loose_string")]
    pub name: Option<String>,

    #[serde(rename = "type")]
    pub strategy: Option<String>,

    #[serde(deserialize_with = "deserialize_string_or_vec")]
    pub proxies: Vec<String>,

    pub url: Option<String>,

    /// Seconds when written without a unit
    #[serde(deserialize_with = "deserialize_loose_string")]
    pub interval: Option<String>,

    #[serde(deserialize_with = "deserialize_loose_u32")]
    pub tolerance: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_accepts_legacy_keys() {
        let yaml = "Proxy:\n  - {name: a, type: trojan}\nProxy Group:\n  - {name: g, type: select}\n";
        let doc: ClashDocument = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(doc.proxies.unwrap().len(), 1);
        assert_eq!(doc.proxy_groups.unwrap().len(), 1);
    }

    #[test]
    fn test_document_ignores_unknown_keys() {
        let yaml = "port: 7890\nrules:\n  - MATCH,DIRECT\n";
        let doc: ClashDocument = serde_yaml::from_str(yaml).unwrap();
        assert!(doc.proxies.is_none());
        assert!(doc.proxy_groups.is_none());
    }

    #[test]
    fn test_common_fields_loose_scalars() {
        let yaml = r#"
name: 123
server: example.com
port: "8443"
tls: "true"
alpn: h2,http/1.1
ws-opts:
  path: /ws
  max-early-data: "2048"
"#;
        let trojan: ClashTrojan = serde_yaml::from_str(yaml).unwrap();
        let common = trojan.common;
        assert_eq!(common.name.as_deref(), Some("123"));
        assert_eq!(common.port, Some(8443));
        assert!(common.tls);
        assert_eq!(common.alpn, vec!["h2", "http/1.1"]);
        let ws = common.ws_opts.unwrap();
        assert_eq!(ws.path.as_deref(), Some("/ws"));
        assert_eq!(ws.max_early_data, Some(2048));
    }

    #[test]
    fn test_vmess_alter_id_as_string() {
        let yaml = "server: a.com\nport: 443\nuuid: u\nalterId: \"64\"\n";
        let vmess: ClashVmess = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(vmess.alter_id, Some(64));
    }

    #[test]
    fn test_reserved_forms() {
        let list: Reserved = serde_yaml::from_str("[1, 2, 3]").unwrap();
        assert_eq!(list, Reserved::Bytes(vec![1, 2, 3]));
        let text: Reserved = serde_yaml::from_str("\"AQID\"").unwrap();
        assert_eq!(text, Reserved::Text("AQID".to_string()));
    }
}
