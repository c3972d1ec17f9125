use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::config::shared::OutboundTlsConfig;
use crate::config::util::{default_wireguard_mtu, is_default_wireguard_mtu, is_false, is_zero_u32};

// ============================================================================
// Outbound Enum
// ============================================================================

/// Outbound configuration enum
///
/// One variant per protocol the converter can produce, plus the terminal
/// outbounds and the two group strategies. Required fields of each protocol
/// are plain fields on its struct; only genuinely optional settings are
/// `Option`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Outbound {
    /// Direct outbound (send requests directly)
    Direct(DirectOutbound),
    /// Block outbound (block requests)
    Block(BlockOutbound),
    /// DNS outbound (hijack DNS queries)
    #[serde(rename = "dns")]
    Dns(DnsOutbound),
    /// Shadowsocks outbound
    Shadowsocks(ShadowsocksOutbound),
    /// VMess outbound
    #[serde(rename = "vmess")]
    VMess(VMessOutbound),
    /// VLESS outbound
    #[serde(rename = "vless")]
    VLess(VLessOutbound),
    /// Trojan outbound
    Trojan(TrojanOutbound),
    /// Hysteria outbound
    Hysteria(HysteriaOutbound),
    /// Hysteria2 outbound
    Hysteria2(Hysteria2Outbound),
    /// TUIC outbound
    #[serde(rename = "tuic")]
    Tuic(TuicOutbound),
    /// SOCKS outbound
    #[serde(rename = "socks")]
    Socks(SocksOutbound),
    /// SSH outbound
    #[serde(rename = "ssh")]
    Ssh(SshOutbound),
    /// WireGuard outbound
    #[serde(rename = "wireguard")]
    WireGuard(WireGuardOutbound),
    /// Selector outbound (manual selection)
    Selector(SelectorOutbound),
    /// URLTest outbound (automatic selection)
    #[serde(rename = "urltest")]
    UrlTest(UrlTestOutbound),
}

impl Outbound {
    /// Returns the outbound tag.
    pub fn tag(&self) -> &str {
        match self {
            Outbound::Direct(o) => &o.tag,
            Outbound::Block(o) => &o.tag,
            Outbound::Dns(o) => &o.tag,
            Outbound::Shadowsocks(o) => &o.tag,
            Outbound::VMess(o) => &o.tag,
            Outbound::VLess(o) => &o.tag,
            Outbound::Trojan(o) => &o.tag,
            Outbound::Hysteria(o) => &o.tag,
            Outbound::Hysteria2(o) => &o.tag,
            Outbound::Tuic(o) => &o.tag,
            Outbound::Socks(o) => &o.tag,
            Outbound::Ssh(o) => &o.tag,
            Outbound::WireGuard(o) => &o.tag,
            Outbound::Selector(o) => &o.tag,
            Outbound::UrlTest(o) => &o.tag,
        }
    }

    /// Returns the protocol name as written in the `type` field.
    pub fn protocol(&self) -> &'static str {
        match self {
            Outbound::Direct(_) => "direct",
            Outbound::Block(_) => "block",
            Outbound::Dns(_) => "dns",
            Outbound::Shadowsocks(_) => "shadowsocks",
            Outbound::VMess(_) => "vmess",
            Outbound::VLess(_) => "vless",
            Outbound::Trojan(_) => "trojan",
            Outbound::Hysteria(_) => "hysteria",
            Outbound::Hysteria2(_) => "hysteria2",
            Outbound::Tuic(_) => "tuic",
            Outbound::Socks(_) => "socks",
            Outbound::Ssh(_) => "ssh",
            Outbound::WireGuard(_) => "wireguard",
            Outbound::Selector(_) => "selector",
            Outbound::UrlTest(_) => "urltest",
        }
    }

    /// Returns the remote endpoint, if this outbound dials one.
    ///
    /// WireGuard reports its single peer's endpoint.
    pub fn endpoint(&self) -> Option<&ServerEndpoint> {
        match self {
            Outbound::Shadowsocks(o) => Some(&o.endpoint),
            Outbound::VMess(o) => Some(&o.endpoint),
            Outbound::VLess(o) => Some(&o.endpoint),
            Outbound::Trojan(o) => Some(&o.endpoint),
            Outbound::Hysteria(o) => Some(&o.endpoint),
            Outbound::Hysteria2(o) => Some(&o.endpoint),
            Outbound::Tuic(o) => Some(&o.endpoint),
            Outbound::Socks(o) => Some(&o.endpoint),
            Outbound::Ssh(o) => Some(&o.endpoint),
            Outbound::WireGuard(o) => o.peers.first().map(|p| &p.endpoint),
            Outbound::Direct(_)
            | Outbound::Block(_)
            | Outbound::Dns(_)
            | Outbound::Selector(_)
            | Outbound::UrlTest(_) => None,
        }
    }

    /// Returns the TLS block of protocols that carry one.
    pub fn tls(&self) -> Option<&OutboundTlsConfig> {
        match self {
            Outbound::VMess(o) => o.tls.as_ref(),
            Outbound::VLess(o) => o.tls.as_ref(),
            Outbound::Trojan(o) => o.tls.as_ref(),
            Outbound::Hysteria(o) => o.tls.as_ref(),
            Outbound::Hysteria2(o) => o.tls.as_ref(),
            Outbound::Tuic(o) => o.tls.as_ref(),
            _ => None,
        }
    }

    /// Returns the V2Ray transport of protocols that carry one.
    pub fn transport(&self) -> Option<&V2RayTransport> {
        match self {
            Outbound::VMess(o) => o.transport.as_ref(),
            Outbound::VLess(o) => o.transport.as_ref(),
            Outbound::Trojan(o) => o.transport.as_ref(),
            _ => None,
        }
    }

    /// Returns `true` for the direct, block and DNS sinks.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Outbound::Direct(_) | Outbound::Block(_) | Outbound::Dns(_)
        )
    }

    /// Returns `true` for selector and urltest groups.
    pub fn is_group(&self) -> bool {
        matches!(self, Outbound::Selector(_) | Outbound::UrlTest(_))
    }
}

// ============================================================================
// Common Types
// ============================================================================

/// Remote server address and port.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ServerEndpoint {
    /// Server address (domain, IPv4 or bare IPv6)
    pub server: String,

    /// Server port
    pub server_port: u16,
}

impl ServerEndpoint {
    pub fn new(server: impl Into<String>, server_port: u16) -> Self {
        Self {
            server: server.into(),
            server_port,
        }
    }

    /// The `server:port` label used when a source carries no name.
    pub fn default_tag(&self) -> String {
        format!("{}:{}", self.server, self.server_port)
    }
}

/// Multiplex configuration for outbound
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct OutboundMultiplex {
    /// Enable multiplex
    #[serde(default, skip_serializing_if = "is_false")]
    pub enabled: bool,

    /// Multiplex protocol: smux, yamux, h2mux (default: h2mux)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,

    /// Maximum connections (conflicts with max_streams)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_connections: Option<u32>,

    /// Minimum streams before opening new connection (conflicts with max_streams)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_streams: Option<u32>,

    /// Maximum streams per connection (conflicts with max_connections and min_streams)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_streams: Option<u32>,

    /// Enable padding
    #[serde(default, skip_serializing_if = "is_false")]
    pub padding: bool,
}

/// Obfuscation layer (Hysteria2 salamander)
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Obfuscation {
    /// Obfuscation type (only "salamander")
    #[serde(rename = "type")]
    pub kind: String,

    /// Obfuscation password
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

/// V2Ray transport configuration for outbound
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(tag = "type")]
pub enum V2RayTransport {
    /// WebSocket transport
    #[serde(rename = "ws")]
    WebSocket(WebSocketTransport),
    /// gRPC transport
    #[serde(rename = "grpc")]
    Grpc(GrpcTransport),
    /// HTTP/2 transport (sing-box calls it `http`)
    #[serde(rename = "http")]
    Http2(Http2Transport),
}

/// Header sing-box reads WebSocket early data from when a link asks for it
/// without naming one.
pub const DEFAULT_EARLY_DATA_HEADER: &str = "Sec-WebSocket-Protocol";

/// WebSocket transport configuration
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct WebSocketTransport {
    /// HTTP request path
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    /// Extra headers
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,

    /// Max early data size
    #[serde(default, skip_serializing_if = "is_zero_u32")]
    pub max_early_data: u32,

    /// Early data header name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub early_data_header_name: Option<String>,
}

/// gRPC transport configuration
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct GrpcTransport {
    /// gRPC service name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_name: Option<String>,
}

/// HTTP/2 transport configuration
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct Http2Transport {
    /// Host domains
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub host: Vec<String>,

    /// HTTP request path
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

// ============================================================================
// Terminal Outbounds
// ============================================================================

/// Direct outbound configuration
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct DirectOutbound {
    /// Tag of the outbound
    pub tag: String,
}

/// Block outbound configuration
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct BlockOutbound {
    /// Tag of the outbound
    pub tag: String,
}

/// DNS outbound configuration
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct DnsOutbound {
    /// Tag of the outbound
    pub tag: String,
}

// ============================================================================
// Proxy Outbounds
// ============================================================================

/// Shadowsocks outbound configuration
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ShadowsocksOutbound {
    /// Tag of the outbound
    pub tag: String,

    #[serde(flatten)]
    pub endpoint: ServerEndpoint,

    /// Encryption method
    pub method: String,

    /// Password
    pub password: String,

    /// SIP003 plugin
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plugin: Option<String>,

    /// SIP003 plugin options
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plugin_opts: Option<String>,

    /// UDP over TCP
    #[serde(default, skip_serializing_if = "is_false")]
    pub udp_over_tcp: bool,

    /// Multiplex configuration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multiplex: Option<OutboundMultiplex>,
}

/// VMess outbound configuration
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct VMessOutbound {
    /// Tag of the outbound
    pub tag: String,

    #[serde(flatten)]
    pub endpoint: ServerEndpoint,

    /// VMess user UUID
    pub uuid: String,

    /// Security: auto, none, zero, aes-128-gcm, chacha20-poly1305
    pub security: String,

    /// Alter ID (0 = AEAD, anything else = legacy)
    #[serde(default, skip_serializing_if = "is_zero_u32")]
    pub alter_id: u32,

    /// TLS configuration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tls: Option<OutboundTlsConfig>,

    /// UDP packet encoding: packetaddr, xudp
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub packet_encoding: Option<String>,

    /// Multiplex configuration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multiplex: Option<OutboundMultiplex>,

    /// V2Ray transport configuration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transport: Option<V2RayTransport>,
}

/// VLESS outbound configuration
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct VLessOutbound {
    /// Tag of the outbound
    pub tag: String,

    #[serde(flatten)]
    pub endpoint: ServerEndpoint,

    /// VLESS UUID
    pub uuid: String,

    /// VLESS flow (e.g., "xtls-rprx-vision")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flow: Option<String>,

    /// TLS configuration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tls: Option<OutboundTlsConfig>,

    /// UDP packet encoding: packetaddr, xudp (default: xudp)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub packet_encoding: Option<String>,

    /// Multiplex configuration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multiplex: Option<OutboundMultiplex>,

    /// V2Ray transport configuration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transport: Option<V2RayTransport>,
}

/// Trojan outbound configuration
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct TrojanOutbound {
    /// Tag of the outbound
    pub tag: String,

    #[serde(flatten)]
    pub endpoint: ServerEndpoint,

    /// Trojan password
    pub password: String,

    /// TLS configuration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tls: Option<OutboundTlsConfig>,

    /// Multiplex configuration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multiplex: Option<OutboundMultiplex>,

    /// V2Ray transport configuration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transport: Option<V2RayTransport>,
}

/// Hysteria outbound configuration
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct HysteriaOutbound {
    /// Tag of the outbound
    pub tag: String,

    #[serde(flatten)]
    pub endpoint: ServerEndpoint,

    /// Upload bandwidth in Mbps
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub up_mbps: Option<u32>,

    /// Download bandwidth in Mbps
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub down_mbps: Option<u32>,

    /// Obfuscation password
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub obfs: Option<String>,

    /// Authentication string
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_str: Option<String>,

    /// Receive window connection size
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recv_window_conn: Option<u64>,

    /// Receive window size
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recv_window: Option<u64>,

    /// Disable MTU discovery
    #[serde(default, skip_serializing_if = "is_false")]
    pub disable_mtu_discovery: bool,

    /// TLS configuration (required)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tls: Option<OutboundTlsConfig>,
}

/// Hysteria2 outbound configuration
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Hysteria2Outbound {
    /// Tag of the outbound
    pub tag: String,

    #[serde(flatten)]
    pub endpoint: ServerEndpoint,

    /// Server port range list, e.g. `20000:30000`
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub server_ports: Vec<String>,

    /// Port hopping interval
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hop_interval: Option<String>,

    /// Upload bandwidth in Mbps
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub up_mbps: Option<u32>,

    /// Download bandwidth in Mbps
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub down_mbps: Option<u32>,

    /// Obfuscation configuration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub obfs: Option<Obfuscation>,

    /// Authentication password
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    /// TLS configuration (required)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tls: Option<OutboundTlsConfig>,
}

/// TUIC outbound configuration
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct TuicOutbound {
    /// Tag of the outbound
    pub tag: String,

    #[serde(flatten)]
    pub endpoint: ServerEndpoint,

    /// TUIC UUID
    pub uuid: String,

    /// TUIC password
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    /// Congestion control: cubic, new_reno, bbr (default: cubic)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub congestion_control: Option<String>,

    /// UDP relay mode: native, quic (default: native)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub udp_relay_mode: Option<String>,

    /// Zero RTT handshake
    #[serde(default, skip_serializing_if = "is_false")]
    pub zero_rtt_handshake: bool,

    /// Heartbeat interval
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heartbeat: Option<String>,

    /// TLS configuration (required)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tls: Option<OutboundTlsConfig>,
}

/// SOCKS outbound configuration
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct SocksOutbound {
    /// Tag of the outbound
    pub tag: String,

    #[serde(flatten)]
    pub endpoint: ServerEndpoint,

    /// SOCKS version: 4, 4a, or 5
    pub version: String,

    /// SOCKS username
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    /// SOCKS5 password
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    /// UDP over TCP
    #[serde(default, skip_serializing_if = "is_false")]
    pub udp_over_tcp: bool,
}

/// SSH outbound configuration
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct SshOutbound {
    /// Tag of the outbound
    pub tag: String,

    #[serde(flatten)]
    pub endpoint: ServerEndpoint,

    /// SSH username
    pub user: String,

    /// SSH password
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    /// Private key content
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private_key: Option<String>,

    /// Private key passphrase
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private_key_passphrase: Option<String>,

    /// Host key content
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub host_key: Vec<String>,

    /// Host key algorithms
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub host_key_algorithms: Vec<String>,

    /// Client version string
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_version: Option<String>,
}

/// WireGuard outbound configuration
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct WireGuardOutbound {
    /// Tag of the outbound
    pub tag: String,

    /// WireGuard MTU (default: 1408)
    #[serde(
        default = "default_wireguard_mtu",
        skip_serializing_if = "is_default_wireguard_mtu"
    )]
    pub mtu: u32,

    /// Local addresses
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub local_address: Vec<String>,

    /// Private key
    pub private_key: String,

    /// Peers
    pub peers: Vec<WireGuardPeer>,
}

/// WireGuard peer configuration
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct WireGuardPeer {
    #[serde(flatten)]
    pub endpoint: ServerEndpoint,

    /// Peer public key
    pub public_key: String,

    /// Pre-shared key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pre_shared_key: Option<String>,

    /// Allowed IPs
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub allowed_ips: Vec<String>,

    /// Reserved bytes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reserved: Option<[u8; 3]>,
}

// ============================================================================
// Group Outbounds
// ============================================================================

/// Selector outbound configuration (manual selection)
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct SelectorOutbound {
    /// Tag of the outbound
    pub tag: String,

    /// List of outbound tags to select from
    #[serde(default)]
    pub outbounds: Vec<String>,

    /// Default outbound tag
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,

    /// Interrupt existing connections when selection changes
    #[serde(default, skip_serializing_if = "is_false")]
    pub interrupt_exist_connections: bool,
}

/// URLTest outbound configuration (automatic selection)
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct UrlTestOutbound {
    /// Tag of the outbound
    pub tag: String,

    /// List of outbound tags to test
    #[serde(default)]
    pub outbounds: Vec<String>,

    /// Test URL (default: https://www.gstatic.com/generate_204)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Test interval (default: 3m)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interval: Option<String>,

    /// Tolerance in milliseconds (default: 50)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tolerance: Option<u32>,

    /// Idle timeout (default: 30m)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub idle_timeout: Option<String>,

    /// Interrupt existing connections when selection changes
    #[serde(default, skip_serializing_if = "is_false")]
    pub interrupt_exist_connections: bool,
}

// ============================================================================
// Constructors
// ============================================================================

impl DirectOutbound {
    pub fn new(tag: impl Into<String>) -> Self {
        Self { tag: tag.into() }
    }
}

impl BlockOutbound {
    pub fn new(tag: impl Into<String>) -> Self {
        Self { tag: tag.into() }
    }
}

impl DnsOutbound {
    pub fn new(tag: impl Into<String>) -> Self {
        Self { tag: tag.into() }
    }
}

impl ShadowsocksOutbound {
    /// Create a new Shadowsocks outbound with required fields
    pub fn new(
        tag: impl Into<String>,
        endpoint: ServerEndpoint,
        method: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            tag: tag.into(),
            endpoint,
            method: method.into(),
            password: password.into(),
            plugin: None,
            plugin_opts: None,
            udp_over_tcp: false,
            multiplex: None,
        }
    }
}

impl VMessOutbound {
    /// Create a new VMess outbound with required fields
    pub fn new(tag: impl Into<String>, endpoint: ServerEndpoint, uuid: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            endpoint,
            uuid: uuid.into(),
            security: "auto".to_string(),
            alter_id: 0,
            tls: None,
            packet_encoding: None,
            multiplex: None,
            transport: None,
        }
    }
}

impl VLessOutbound {
    /// Create a new VLESS outbound with required fields
    pub fn new(tag: impl Into<String>, endpoint: ServerEndpoint, uuid: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            endpoint,
            uuid: uuid.into(),
            flow: None,
            tls: None,
            packet_encoding: None,
            multiplex: None,
            transport: None,
        }
    }
}

impl TrojanOutbound {
    /// Create a new Trojan outbound with required fields
    pub fn new(
        tag: impl Into<String>,
        endpoint: ServerEndpoint,
        password: impl Into<String>,
    ) -> Self {
        Self {
            tag: tag.into(),
            endpoint,
            password: password.into(),
            tls: None,
            multiplex: None,
            transport: None,
        }
    }
}

impl HysteriaOutbound {
    pub fn new(tag: impl Into<String>, endpoint: ServerEndpoint) -> Self {
        Self {
            tag: tag.into(),
            endpoint,
            up_mbps: None,
            down_mbps: None,
            obfs: None,
            auth_str: None,
            recv_window_conn: None,
            recv_window: None,
            disable_mtu_discovery: false,
            tls: None,
        }
    }
}

impl Hysteria2Outbound {
    pub fn new(tag: impl Into<String>, endpoint: ServerEndpoint) -> Self {
        Self {
            tag: tag.into(),
            endpoint,
            server_ports: Vec::new(),
            hop_interval: None,
            up_mbps: None,
            down_mbps: None,
            obfs: None,
            password: None,
            tls: None,
        }
    }
}

impl TuicOutbound {
    pub fn new(tag: impl Into<String>, endpoint: ServerEndpoint, uuid: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            endpoint,
            uuid: uuid.into(),
            password: None,
            congestion_control: None,
            udp_relay_mode: None,
            zero_rtt_handshake: false,
            heartbeat: None,
            tls: None,
        }
    }
}

impl SocksOutbound {
    pub fn new(tag: impl Into<String>, endpoint: ServerEndpoint) -> Self {
        Self {
            tag: tag.into(),
            endpoint,
            version: "5".to_string(),
            username: None,
            password: None,
            udp_over_tcp: false,
        }
    }
}

impl SshOutbound {
    pub fn new(tag: impl Into<String>, endpoint: ServerEndpoint, user: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            endpoint,
            user: user.into(),
            password: None,
            private_key: None,
            private_key_passphrase: None,
            host_key: Vec::new(),
            host_key_algorithms: Vec::new(),
            client_version: None,
        }
    }
}

impl WireGuardOutbound {
    /// Create a WireGuard outbound with its single peer
    pub fn new(tag: impl Into<String>, private_key: impl Into<String>, peer: WireGuardPeer) -> Self {
        Self {
            tag: tag.into(),
            mtu: default_wireguard_mtu(),
            local_address: Vec::new(),
            private_key: private_key.into(),
            peers: vec![peer],
        }
    }
}

impl WireGuardPeer {
    /// Create a peer routing everything through the tunnel
    pub fn new(endpoint: ServerEndpoint, public_key: impl Into<String>) -> Self {
        Self {
            endpoint,
            public_key: public_key.into(),
            pre_shared_key: None,
            allowed_ips: vec!["0.0.0.0/0".to_string(), "::/0".to_string()],
            reserved: None,
        }
    }
}

impl SelectorOutbound {
    /// Create a new selector outbound with tag
    pub fn new(tag: impl Into<String>, outbounds: Vec<String>) -> Self {
        Self {
            tag: tag.into(),
            outbounds,
            default: None,
            interrupt_exist_connections: false,
        }
    }
}

impl UrlTestOutbound {
    /// Create a new urltest outbound with tag
    pub fn new(tag: impl Into<String>, outbounds: Vec<String>) -> Self {
        Self {
            tag: tag.into(),
            outbounds,
            url: None,
            interval: None,
            tolerance: None,
            idle_timeout: None,
            interrupt_exist_connections: false,
        }
    }
}
