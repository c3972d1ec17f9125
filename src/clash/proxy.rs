//! Translation of one Clash `proxies` entry into an outbound.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde_yaml::Value;
use tracing::trace;

use crate::assemble::normalize_duration;
use crate::config::outbound::{
    GrpcTransport, Http2Transport, Hysteria2Outbound, HysteriaOutbound, Obfuscation, Outbound,
    OutboundMultiplex, ServerEndpoint, ShadowsocksOutbound, SocksOutbound, SshOutbound,
    TrojanOutbound, TuicOutbound, V2RayTransport, VLessOutbound, VMessOutbound,
    WireGuardOutbound, WireGuardPeer,
};
use crate::config::shared::{OutboundEchConfig, OutboundRealityConfig, OutboundTlsConfig};
use crate::parser::base64::decode_base64;
use crate::parser::error::ParseError;
use crate::parser::protocols::hysteria2::parse_port_ranges;
use crate::parser::protocols::wireguard::with_prefix_length;
use crate::parser::transport::websocket;
use crate::parser::uri::split_list;

use super::model::{
    ClashHysteria, ClashHysteria2, ClashShadowsocks, ClashSocks, ClashSsh, ClashTrojan, ClashTuic,
    ClashVless, ClashVmess, ClashWireGuard, CommonFields, Reserved,
};

const DEFAULT_SSH_PORT: u16 = 22;

/// Translates one proxy entry, dispatching on its `type` key.
pub fn translate_proxy(value: Value) -> Result<Outbound, ParseError> {
    let kind = value
        .get("type")
        .and_then(Value::as_str)
        .map(|t| t.trim().to_ascii_lowercase())
        .ok_or_else(|| ParseError::missing("clash", "type"))?;
    trace!("Translating Clash proxy of type {}", kind);

    match kind.as_str() {
        "ss" | "shadowsocks" => shadowsocks(decode("shadowsocks", value)?),
        "vmess" => vmess(decode("vmess", value)?),
        "vless" => vless(decode("vless", value)?),
        "trojan" => trojan(decode("trojan", value)?),
        "hysteria" => hysteria(decode("hysteria", value)?),
        "hysteria2" | "hy2" => hysteria2(decode("hysteria2", value)?),
        "tuic" => tuic(decode("tuic", value)?),
        "socks5" | "socks" => socks(decode("socks", value)?),
        "ssh" => ssh(decode("ssh", value)?),
        "wireguard" => wireguard(decode("wireguard", value)?),
        other => Err(ParseError::UnsupportedScheme(other.to_string())),
    }
}

fn decode<T: DeserializeOwned>(protocol: &'static str, value: Value) -> Result<T, ParseError> {
    serde_yaml::from_value(value).map_err(|e| ParseError::malformed(protocol, e.to_string()))
}

fn required(
    value: Option<String>,
    protocol: &'static str,
    field: &'static str,
) -> Result<String, ParseError> {
    value
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ParseError::missing(protocol, field))
}

// ============================================================================
// Common Fields
// ============================================================================

impl CommonFields {
    fn endpoint(&self, protocol: &'static str) -> Result<ServerEndpoint, ParseError> {
        let server = self
            .server
            .as_deref()
            .map(|s| s.trim().trim_start_matches('[').trim_end_matches(']'))
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ParseError::missing(protocol, "server"))?;
        match self.port {
            None => Err(ParseError::missing(protocol, "server_port")),
            Some(0) => Err(ParseError::invalid(protocol, "server_port", "0")),
            Some(port) => Ok(ServerEndpoint::new(server, port)),
        }
    }

    fn tag(&self, endpoint: &ServerEndpoint) -> String {
        self.name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| endpoint.default_tag())
    }

    fn server_name(&self) -> Option<String> {
        self.servername
            .clone()
            .filter(|s| !s.is_empty())
            .or_else(|| self.sni.clone())
            .filter(|s| !s.is_empty())
    }

    /// TLS block when `tls` is set, Reality options exist or the protocol
    /// always runs over TLS.
    fn tls(&self, always: bool) -> Option<OutboundTlsConfig> {
        let reality = self.reality_opts.as_ref().and_then(|opts| {
            opts.public_key
                .clone()
                .filter(|pk| !pk.is_empty())
                .map(|pk| OutboundRealityConfig::new(pk, opts.short_id.clone()))
        });
        if !(always || self.tls || reality.is_some()) {
            return None;
        }

        let ech = self
            .ech_opts
            .as_ref()
            .filter(|ech| ech.enable)
            .map(|ech| OutboundEchConfig {
                enabled: true,
                config: ech.config.clone().into_iter().collect(),
            });

        let tls = OutboundTlsConfig {
            insecure: self.skip_cert_verify,
            alpn: self.alpn.clone(),
            ech,
            reality,
            ..OutboundTlsConfig::enabled()
        };
        Some(
            tls.with_server_name(self.server_name())
                .with_fingerprint(self.client_fingerprint.clone()),
        )
    }

    fn multiplex(&self) -> Option<OutboundMultiplex> {
        let smux = self.smux.as_ref().filter(|smux| smux.enabled)?;
        Some(OutboundMultiplex {
            enabled: true,
            protocol: smux.protocol.clone(),
            max_connections: smux.max_connections,
            min_streams: smux.min_streams,
            max_streams: smux.max_streams,
            padding: smux.padding,
        })
    }

    fn transport(&self, protocol: &'static str) -> Result<Option<V2RayTransport>, ParseError> {
        let network = self
            .network
            .as_deref()
            .map(str::trim)
            .unwrap_or_default()
            .to_ascii_lowercase();
        let transport = match network.as_str() {
            "" | "tcp" => None,
            "ws" => {
                let opts = self.ws_opts.clone().unwrap_or_default();
                let headers = self.websocket_headers(opts.headers);
                Some(V2RayTransport::WebSocket(websocket(
                    opts.path,
                    headers,
                    opts.max_early_data,
                    opts.early_data_header_name,
                )))
            }
            "grpc" => Some(V2RayTransport::Grpc(GrpcTransport {
                service_name: self
                    .grpc_opts
                    .as_ref()
                    .and_then(|opts| opts.grpc_service_name.clone())
                    .filter(|s| !s.is_empty()),
            })),
            "h2" => {
                let opts = self.h2_opts.clone().unwrap_or_default();
                Some(V2RayTransport::Http2(Http2Transport {
                    host: opts.host,
                    path: opts.path.filter(|p| !p.is_empty()),
                }))
            }
            "http" => {
                let opts = self.http_opts.clone().unwrap_or_default();
                let host = opts
                    .headers
                    .into_iter()
                    .find(|(name, _)| name.eq_ignore_ascii_case("host"))
                    .map(|(_, hosts)| hosts)
                    .unwrap_or_default();
                Some(V2RayTransport::Http2(Http2Transport {
                    host,
                    path: opts.path.into_iter().next().filter(|p| !p.is_empty()),
                }))
            }
            other => return Err(ParseError::invalid(protocol, "network", other)),
        };
        Ok(transport)
    }

    /// Normalizes the `Host` header: an explicit header under any casing
    /// wins, otherwise `servername`/`sni`, otherwise none.
    fn websocket_headers(&self, headers: BTreeMap<String, String>) -> BTreeMap<String, String> {
        let mut host = None;
        let mut normalized = BTreeMap::new();
        for (name, value) in headers {
            if name.eq_ignore_ascii_case("host") {
                if host.is_none() && !value.is_empty() {
                    host = Some(value);
                }
            } else {
                normalized.insert(name, value);
            }
        }
        if let Some(host) = host.or_else(|| self.server_name()) {
            normalized.insert("Host".to_string(), host);
        }
        normalized
    }
}

/// Parses `30`, `"30 Mbps"` or `"1 Gbps"` into whole Mbps.
fn parse_bandwidth(
    value: Option<&str>,
    protocol: &'static str,
    field: &'static str,
) -> Result<Option<u32>, ParseError> {
    let Some(raw) = value.map(str::trim).filter(|v| !v.is_empty()) else {
        return Ok(None);
    };
    let split = raw
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(raw.len());
    let (number, unit) = raw.split_at(split);
    let number: f64 = number
        .parse()
        .map_err(|_| ParseError::invalid(protocol, field, raw))?;
    let factor = match unit.trim().to_ascii_lowercase().as_str() {
        "" | "m" | "mbps" => 1.0,
        "g" | "gbps" => 1000.0,
        _ => return Err(ParseError::invalid(protocol, field, raw)),
    };
    let mbps = (number * factor).round();
    if !(0.0..=f64::from(u32::MAX)).contains(&mbps) {
        return Err(ParseError::invalid(protocol, field, raw));
    }
    Ok(Some(mbps as u32))
}

// ============================================================================
// Per-Type Translation
// ============================================================================

fn shadowsocks(proxy: ClashShadowsocks) -> Result<Outbound, ParseError> {
    const PROTOCOL: &str = "shadowsocks";
    let endpoint = proxy.common.endpoint(PROTOCOL)?;
    let method = required(proxy.cipher, PROTOCOL, "method")?;
    let password = required(proxy.password, PROTOCOL, "password")?;

    let plugin = proxy
        .plugin
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty());
    let plugin_opts = match (plugin.as_deref(), proxy.plugin_opts.as_ref()) {
        (Some(plugin), Some(opts)) => {
            Some(plugin_opts_string(plugin, opts)).filter(|o| !o.is_empty())
        }
        _ => None,
    };
    let plugin = plugin.map(|p| match p.as_str() {
        "obfs" | "simple-obfs" => "obfs-local".to_string(),
        _ => p,
    });

    Ok(Outbound::Shadowsocks(ShadowsocksOutbound {
        plugin,
        plugin_opts,
        udp_over_tcp: proxy.udp_over_tcp,
        multiplex: proxy.common.multiplex(),
        ..ShadowsocksOutbound::new(proxy.common.tag(&endpoint), endpoint, method, password)
    }))
}

/// Flattens a plugin-opts mapping into the SIP003 `key=value;flag` form.
///
/// obfs options are renamed to the `obfs`/`obfs-host` keys obfs-local reads.
/// A boolean `true` becomes a bare flag and `false` is dropped.
fn plugin_opts_string(plugin: &str, opts: &serde_yaml::Mapping) -> String {
    let is_obfs = matches!(plugin, "obfs" | "simple-obfs" | "obfs-local");
    opts.iter()
        .filter_map(|(key, value)| {
            let key = key.as_str()?;
            let key = match (is_obfs, key) {
                (true, "mode") => "obfs",
                (true, "host") => "obfs-host",
                _ => key,
            };
            match value {
                Value::Bool(true) => Some(key.to_string()),
                Value::Bool(false) | Value::Null => None,
                Value::String(s) => Some(format!("{}={}", key, s)),
                Value::Number(n) => Some(format!("{}={}", key, n)),
                _ => None,
            }
        })
        .collect::<Vec<_>>()
        .join(";")
}

fn vmess(proxy: ClashVmess) -> Result<Outbound, ParseError> {
    const PROTOCOL: &str = "vmess";
    let common = &proxy.common;
    let endpoint = common.endpoint(PROTOCOL)?;
    let uuid = required(proxy.uuid, PROTOCOL, "uuid")?;

    let mut vmess = VMessOutbound::new(common.tag(&endpoint), endpoint, uuid);
    if let Some(cipher) = proxy.cipher.filter(|c| !c.is_empty()) {
        vmess.security = cipher;
    }
    vmess.alter_id = proxy.alter_id.unwrap_or(0);
    vmess.tls = common.tls(false);
    vmess.packet_encoding = proxy.packet_encoding.filter(|p| !p.is_empty());
    vmess.multiplex = common.multiplex();
    vmess.transport = common.transport(PROTOCOL)?;
    Ok(Outbound::VMess(vmess))
}

fn vless(proxy: ClashVless) -> Result<Outbound, ParseError> {
    const PROTOCOL: &str = "vless";
    let common = &proxy.common;
    let endpoint = common.endpoint(PROTOCOL)?;
    let uuid = required(proxy.uuid, PROTOCOL, "uuid")?;

    Ok(Outbound::VLess(VLessOutbound {
        flow: proxy.flow.filter(|f| !f.is_empty()),
        tls: common.tls(false),
        packet_encoding: proxy.packet_encoding.filter(|p| !p.is_empty()),
        multiplex: common.multiplex(),
        transport: common.transport(PROTOCOL)?,
        ..VLessOutbound::new(common.tag(&endpoint), endpoint, uuid)
    }))
}

fn trojan(proxy: ClashTrojan) -> Result<Outbound, ParseError> {
    const PROTOCOL: &str = "trojan";
    let common = &proxy.common;
    let endpoint = common.endpoint(PROTOCOL)?;
    let password = required(proxy.password, PROTOCOL, "password")?;

    Ok(Outbound::Trojan(TrojanOutbound {
        tls: common.tls(true),
        multiplex: common.multiplex(),
        transport: common.transport(PROTOCOL)?,
        ..TrojanOutbound::new(common.tag(&endpoint), endpoint, password)
    }))
}

fn hysteria(proxy: ClashHysteria) -> Result<Outbound, ParseError> {
    const PROTOCOL: &str = "hysteria";
    let common = &proxy.common;
    let endpoint = common.endpoint(PROTOCOL)?;

    Ok(Outbound::Hysteria(HysteriaOutbound {
        up_mbps: parse_bandwidth(proxy.up.as_deref(), PROTOCOL, "up")?,
        down_mbps: parse_bandwidth(proxy.down.as_deref(), PROTOCOL, "down")?,
        obfs: proxy.obfs.filter(|o| !o.is_empty()),
        auth_str: proxy.auth_str.filter(|a| !a.is_empty()),
        recv_window_conn: proxy.recv_window_conn,
        recv_window: proxy.recv_window,
        disable_mtu_discovery: proxy.disable_mtu_discovery,
        tls: common.tls(true),
        ..HysteriaOutbound::new(common.tag(&endpoint), endpoint)
    }))
}

fn hysteria2(proxy: ClashHysteria2) -> Result<Outbound, ParseError> {
    const PROTOCOL: &str = "hysteria2";
    let common = &proxy.common;
    let endpoint = common.endpoint(PROTOCOL)?;

    let obfs = proxy
        .obfs
        .filter(|o| !o.is_empty() && o != "none")
        .map(|kind| Obfuscation {
            kind,
            password: proxy.obfs_password.filter(|p| !p.is_empty()),
        });
    let server_ports = match proxy.ports.as_deref().filter(|p| !p.is_empty()) {
        Some(ports) => parse_port_ranges(ports)?,
        None => Vec::new(),
    };

    Ok(Outbound::Hysteria2(Hysteria2Outbound {
        server_ports,
        hop_interval: proxy
            .hop_interval
            .as_deref()
            .map(|i| normalize_duration(i, "s"))
            .filter(|i| !i.is_empty()),
        up_mbps: parse_bandwidth(proxy.up.as_deref(), PROTOCOL, "up")?,
        down_mbps: parse_bandwidth(proxy.down.as_deref(), PROTOCOL, "down")?,
        obfs,
        password: proxy.password.filter(|p| !p.is_empty()),
        tls: common.tls(true),
        ..Hysteria2Outbound::new(common.tag(&endpoint), endpoint)
    }))
}

fn tuic(proxy: ClashTuic) -> Result<Outbound, ParseError> {
    const PROTOCOL: &str = "tuic";
    let common = &proxy.common;
    let endpoint = common.endpoint(PROTOCOL)?;
    let uuid = required(proxy.uuid, PROTOCOL, "uuid")?;

    let tls = common.tls(true).map(|tls| OutboundTlsConfig {
        disable_sni: proxy.disable_sni,
        ..tls
    });

    Ok(Outbound::Tuic(TuicOutbound {
        password: proxy.password.filter(|p| !p.is_empty()),
        congestion_control: proxy.congestion_controller.filter(|c| !c.is_empty()),
        udp_relay_mode: proxy.udp_relay_mode.filter(|m| !m.is_empty()),
        zero_rtt_handshake: proxy.reduce_rtt,
        heartbeat: proxy
            .heartbeat_interval
            .as_deref()
            .map(|h| normalize_duration(h, "ms"))
            .filter(|h| !h.is_empty()),
        tls,
        ..TuicOutbound::new(common.tag(&endpoint), endpoint, uuid)
    }))
}

fn socks(proxy: ClashSocks) -> Result<Outbound, ParseError> {
    let endpoint = proxy.common.endpoint("socks")?;
    Ok(Outbound::Socks(SocksOutbound {
        username: proxy.username.filter(|u| !u.is_empty()),
        password: proxy.password.filter(|p| !p.is_empty()),
        udp_over_tcp: proxy.udp_over_tcp,
        ..SocksOutbound::new(proxy.common.tag(&endpoint), endpoint)
    }))
}

fn ssh(mut proxy: ClashSsh) -> Result<Outbound, ParseError> {
    const PROTOCOL: &str = "ssh";
    proxy.common.port.get_or_insert(DEFAULT_SSH_PORT);
    let endpoint = proxy.common.endpoint(PROTOCOL)?;
    let user = required(proxy.username, PROTOCOL, "user")?;

    Ok(Outbound::Ssh(SshOutbound {
        password: proxy.password.filter(|p| !p.is_empty()),
        private_key: proxy.private_key.filter(|k| !k.is_empty()),
        private_key_passphrase: proxy.private_key_passphrase.filter(|p| !p.is_empty()),
        host_key: proxy.host_key,
        host_key_algorithms: proxy.host_key_algorithms,
        ..SshOutbound::new(proxy.common.tag(&endpoint), endpoint, user)
    }))
}

fn wireguard(proxy: ClashWireGuard) -> Result<Outbound, ParseError> {
    const PROTOCOL: &str = "wireguard";
    let endpoint = proxy.common.endpoint(PROTOCOL)?;
    let tag = proxy.common.tag(&endpoint);
    let private_key = required(proxy.private_key, PROTOCOL, "private_key")?;
    let public_key = required(proxy.public_key, PROTOCOL, "public_key")?;

    let mut peer = WireGuardPeer {
        pre_shared_key: proxy.pre_shared_key.filter(|k| !k.is_empty()),
        reserved: proxy.reserved.map(parse_reserved).transpose()?,
        ..WireGuardPeer::new(endpoint, public_key)
    };
    if !proxy.allowed_ips.is_empty() {
        peer.allowed_ips = proxy.allowed_ips;
    }

    let mut wireguard = WireGuardOutbound::new(tag, private_key, peer);
    wireguard.local_address = [proxy.ip, proxy.ipv6]
        .into_iter()
        .flatten()
        .filter(|a| !a.is_empty())
        .map(with_prefix_length)
        .collect();
    if let Some(mtu) = proxy.mtu {
        wireguard.mtu = mtu;
    }
    Ok(Outbound::WireGuard(wireguard))
}

fn parse_reserved(reserved: Reserved) -> Result<[u8; 3], ParseError> {
    let (bytes, raw) = match reserved {
        Reserved::Bytes(bytes) => {
            let raw = format!("{:?}", bytes);
            (Some(bytes), raw)
        }
        Reserved::Text(text) => {
            let bytes = if text.contains(',') {
                split_list(&text)
                    .iter()
                    .map(|b| b.parse::<u8>())
                    .collect::<Result<Vec<_>, _>>()
                    .ok()
            } else {
                decode_base64(&text)
            };
            (bytes, text)
        }
    };
    bytes
        .and_then(|bytes| <[u8; 3]>::try_from(bytes).ok())
        .ok_or_else(|| ParseError::invalid("wireguard", "reserved", raw))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::outbound::WebSocketTransport;

    fn translate(yaml: &str) -> Result<Outbound, ParseError> {
        translate_proxy(serde_yaml::from_str(yaml).unwrap())
    }

    fn websocket_of(outbound: &Outbound) -> WebSocketTransport {
        match outbound.transport() {
            Some(V2RayTransport::WebSocket(ws)) => ws.clone(),
            other => panic!("Expected WebSocket transport, got {other:?}"),
        }
    }

    #[test]
    fn test_shadowsocks_with_obfs_plugin() {
        let outbound = translate(
            r#"
name: ss-node
type: ss
server: 1.2.3.4
port: 8388
cipher: aes-256-gcm
password: secret
plugin: obfs
plugin-opts:
  mode: http
  host: bing.com
"#,
        )
        .unwrap();
        let Outbound::Shadowsocks(ss) = outbound else {
            panic!("Expected Shadowsocks outbound");
        };
        assert_eq!(ss.tag, "ss-node");
        assert_eq!(ss.method, "aes-256-gcm");
        assert_eq!(ss.plugin.as_deref(), Some("obfs-local"));
        assert_eq!(ss.plugin_opts.as_deref(), Some("obfs=http;obfs-host=bing.com"));
    }

    #[test]
    fn test_v2ray_plugin_opts() {
        let outbound = translate(
            r#"
name: ss-v2
type: ss
server: a.com
port: 443
cipher: chacha20-ietf-poly1305
password: pw
plugin: v2ray-plugin
plugin-opts:
  mode: websocket
  tls: true
  mux: false
  path: /ray
"#,
        )
        .unwrap();
        let Outbound::Shadowsocks(ss) = outbound else {
            panic!("Expected Shadowsocks outbound");
        };
        assert_eq!(ss.plugin.as_deref(), Some("v2ray-plugin"));
        assert_eq!(ss.plugin_opts.as_deref(), Some("mode=websocket;tls;path=/ray"));
    }

    #[test]
    fn test_vmess_ws_host_header_case_insensitive() {
        let outbound = translate(
            r#"
name: vm
type: vmess
server: a.com
port: 443
uuid: 11111111-2222-3333-4444-555555555555
alterId: 0
cipher: auto
tls: true
servername: sni.example.com
network: ws
ws-opts:
  path: /path
  headers:
    host: cdn.example.com
"#,
        )
        .unwrap();
        let ws = websocket_of(&outbound);
        assert_eq!(ws.headers.get("Host").map(String::as_str), Some("cdn.example.com"));
        assert!(!ws.headers.contains_key("host"));
        assert_eq!(
            outbound.tls().unwrap().server_name.as_deref(),
            Some("sni.example.com")
        );
    }

    #[test]
    fn test_ws_host_falls_back_to_servername() {
        let outbound = translate(
            r#"
name: vl
type: vless
server: a.com
port: 443
uuid: u
tls: true
servername: sni.example.com
network: ws
ws-opts:
  path: /ws?ed=2048
"#,
        )
        .unwrap();
        let ws = websocket_of(&outbound);
        assert_eq!(ws.headers.get("Host").map(String::as_str), Some("sni.example.com"));
        assert_eq!(ws.path.as_deref(), Some("/ws"));
        assert_eq!(ws.max_early_data, 2048);
    }

    #[test]
    fn test_ws_host_omitted_without_sources() {
        let outbound = translate(
            "{name: t, type: trojan, server: a.com, port: 443, password: pw, network: ws}",
        )
        .unwrap();
        assert!(websocket_of(&outbound).headers.is_empty());
    }

    #[test]
    fn test_vless_reality_implies_tls() {
        let outbound = translate(
            r#"
name: reality
type: vless
server: a.com
port: 443
uuid: u
flow: xtls-rprx-vision
servername: www.microsoft.com
client-fingerprint: chrome
reality-opts:
  public-key: pbk
  short-id: 0123abcd
"#,
        )
        .unwrap();
        let tls = outbound.tls().unwrap();
        assert!(tls.enabled);
        let reality = tls.reality.as_ref().unwrap();
        assert_eq!(reality.public_key.as_deref(), Some("pbk"));
        assert_eq!(reality.short_id.as_deref(), Some("0123abcd"));
        assert_eq!(
            tls.utls.as_ref().and_then(|u| u.fingerprint.as_deref()),
            Some("chrome")
        );
    }

    #[test]
    fn test_trojan_grpc_and_smux() {
        let outbound = translate(
            r#"
name: tj
type: trojan
server: a.com
port: 443
password: pw
sni: a.com
skip-cert-verify: true
network: grpc
grpc-opts:
  grpc-service-name: tun
smux:
  enabled: true
  protocol: h2mux
  max-streams: 8
"#,
        )
        .unwrap();
        let Outbound::Trojan(trojan) = outbound else {
            panic!("Expected Trojan outbound");
        };
        assert!(trojan.tls.as_ref().unwrap().insecure);
        assert_eq!(
            trojan.transport,
            Some(V2RayTransport::Grpc(GrpcTransport {
                service_name: Some("tun".to_string())
            }))
        );
        let mux = trojan.multiplex.unwrap();
        assert_eq!(mux.protocol.as_deref(), Some("h2mux"));
        assert_eq!(mux.max_streams, Some(8));
    }

    #[test]
    fn test_hysteria_bandwidth_units() {
        let outbound = translate(
            r#"
name: hy
type: hysteria
server: a.com
port: 443
auth_str: token
up: "30 Mbps"
down: 1 Gbps
obfs: mask
"#,
        )
        .unwrap();
        let Outbound::Hysteria(hy) = outbound else {
            panic!("Expected Hysteria outbound");
        };
        assert_eq!(hy.auth_str.as_deref(), Some("token"));
        assert_eq!(hy.up_mbps, Some(30));
        assert_eq!(hy.down_mbps, Some(1000));
        assert_eq!(hy.obfs.as_deref(), Some("mask"));
        assert!(hy.tls.unwrap().enabled);
    }

    #[test]
    fn test_hysteria_invalid_bandwidth() {
        let err = translate("{type: hysteria, server: a.com, port: 443, up: fast}").unwrap_err();
        assert_eq!(err, ParseError::invalid("hysteria", "up", "fast"));
    }

    #[test]
    fn test_bandwidth_out_of_range() {
        let err = translate(r#"{type: hysteria2, server: a.com, port: 443, down: "99999999 Gbps"}"#)
            .unwrap_err();
        assert_eq!(err, ParseError::invalid("hysteria2", "down", "99999999 Gbps"));

        assert_eq!(
            parse_bandwidth(Some("4294967 Gbps"), "hysteria", "up"),
            Ok(Some(4_294_967_000))
        );
    }

    #[test]
    fn test_hysteria2_ports_and_hop_interval() {
        let outbound = translate(
            r#"
name: hy2
type: hysteria2
server: a.com
port: 443
password: pw
obfs: salamander
obfs-password: op
ports: 20000-30000
hop-interval: 30
up: 50
"#,
        )
        .unwrap();
        let Outbound::Hysteria2(hy2) = outbound else {
            panic!("Expected Hysteria2 outbound");
        };
        assert_eq!(hy2.server_ports, vec!["20000:30000"]);
        assert_eq!(hy2.hop_interval.as_deref(), Some("30s"));
        assert_eq!(hy2.up_mbps, Some(50));
        let obfs = hy2.obfs.unwrap();
        assert_eq!(obfs.kind, "salamander");
        assert_eq!(obfs.password.as_deref(), Some("op"));
    }

    #[test]
    fn test_tuic_heartbeat_in_milliseconds() {
        let outbound = translate(
            r#"
name: tuic
type: tuic
server: a.com
port: 443
uuid: u
password: p
congestion-controller: bbr
udp-relay-mode: quic
reduce-rtt: true
heartbeat-interval: 10000
disable-sni: true
alpn: [h3]
"#,
        )
        .unwrap();
        let Outbound::Tuic(tuic) = outbound else {
            panic!("Expected TUIC outbound");
        };
        assert_eq!(tuic.heartbeat.as_deref(), Some("10000ms"));
        assert_eq!(tuic.congestion_control.as_deref(), Some("bbr"));
        assert!(tuic.zero_rtt_handshake);
        let tls = tuic.tls.unwrap();
        assert!(tls.disable_sni);
        assert_eq!(tls.alpn, vec!["h3"]);
    }

    #[test]
    fn test_socks_and_ssh() {
        let socks = translate(
            "{name: s, type: socks5, server: 127.0.0.1, port: 1080, username: u, password: p}",
        )
        .unwrap();
        assert_eq!(socks.protocol(), "socks");

        let ssh = translate("{name: jump, type: ssh, server: a.com, username: root}").unwrap();
        let Outbound::Ssh(ssh) = ssh else {
            panic!("Expected SSH outbound");
        };
        assert_eq!(ssh.endpoint.server_port, 22);
        assert_eq!(ssh.user, "root");
    }

    #[test]
    fn test_wireguard_entry() {
        let outbound = translate(
            r#"
name: warp
type: wireguard
server: 162.159.192.1
port: 2408
ip: 172.16.0.2
ipv6: 2606:4700::2
private-key: cHJpdg==
public-key: cHVi
reserved: [0, 1, 2]
mtu: 1280
"#,
        )
        .unwrap();
        let Outbound::WireGuard(wg) = outbound else {
            panic!("Expected WireGuard outbound");
        };
        assert_eq!(wg.local_address, vec!["172.16.0.2/32", "2606:4700::2/128"]);
        assert_eq!(wg.mtu, 1280);
        assert_eq!(wg.peers[0].reserved, Some([0, 1, 2]));
        assert_eq!(wg.peers[0].public_key, "cHVi");
    }

    #[test]
    fn test_parse_reserved_text_forms() {
        assert_eq!(parse_reserved(Reserved::Text("1,2,3".to_string())).unwrap(), [1, 2, 3]);
        assert_eq!(parse_reserved(Reserved::Text("AQID".to_string())).unwrap(), [1, 2, 3]);
        assert!(parse_reserved(Reserved::Bytes(vec![1, 2])).is_err());
    }

    #[test]
    fn test_missing_fields() {
        assert_eq!(
            translate("{type: vmess, server: a.com, port: 443}").unwrap_err(),
            ParseError::missing("vmess", "uuid")
        );
        assert_eq!(
            translate("{type: trojan, server: a.com, password: pw}").unwrap_err(),
            ParseError::missing("trojan", "server_port")
        );
        assert_eq!(
            translate("{name: x, server: a.com}").unwrap_err(),
            ParseError::missing("clash", "type")
        );
    }

    #[test]
    fn test_unknown_type_and_network() {
        assert_eq!(
            translate("{type: snell, server: a.com, port: 1}").unwrap_err(),
            ParseError::UnsupportedScheme("snell".to_string())
        );
        assert_eq!(
            translate("{type: vmess, server: a.com, port: 1, uuid: u, network: kcp}").unwrap_err(),
            ParseError::invalid("vmess", "network", "kcp")
        );
    }

    #[test]
    fn test_type_error_is_malformed() {
        let err = translate("{type: vmess, server: a.com, port: [1], uuid: u}").unwrap_err();
        assert!(matches!(err, ParseError::MalformedEncoding { protocol: "vmess", .. }));
    }
}
