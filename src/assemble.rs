//! Outbound assembly and shared defaulting
//!
//! This module provides the rules every parsed outbound goes through before
//! it is handed to sing-box:
//! - TLS requirement for protocols that cannot run without it
//! - ALPN defaults for V2Ray-transport protocols
//! - Duration unit normalization
//! - Terminal outbounds appended after aggregator translation
//!
//! Nothing here fails and nothing here retains state between calls.

use tracing::{debug, warn};

use crate::config::outbound::{
    BlockOutbound, DirectOutbound, DnsOutbound, Outbound, V2RayTransport,
};
use crate::config::shared::OutboundTlsConfig;
use crate::parser::error::CompatibilityWarning;

/// Tag of the direct-route terminal outbound
pub const DIRECT_TAG: &str = "direct";
/// Tag of the block-route terminal outbound
pub const BLOCK_TAG: &str = "block";
/// Tag of the DNS-sink terminal outbound
pub const DNS_TAG: &str = "dns-out";

// ============================================================================
// Shared Defaulting
// ============================================================================

/// Applies the TLS requirement and ALPN defaults to one outbound.
///
/// Trojan, Hysteria, Hysteria2, TUIC and VLESS with Reality always leave
/// with `tls.enabled = true`. VMess, VLESS and Trojan with TLS but no ALPN
/// get `["http/1.1"]` over WebSocket and `["h2", "http/1.1"]` otherwise.
/// Applying this twice gives the same result as applying it once.
pub fn normalize_outbound(outbound: Outbound) -> Outbound {
    match outbound {
        Outbound::Trojan(mut trojan) => {
            trojan.tls = Some(require_tls(trojan.tls));
            apply_default_alpn(&mut trojan.tls, trojan.transport.as_ref());
            Outbound::Trojan(trojan)
        }
        Outbound::VLess(mut vless) => {
            let has_reality = vless
                .tls
                .as_ref()
                .is_some_and(|tls| tls.reality.is_some());
            if has_reality {
                vless.tls = Some(require_tls(vless.tls));
            }
            apply_default_alpn(&mut vless.tls, vless.transport.as_ref());
            Outbound::VLess(vless)
        }
        Outbound::VMess(mut vmess) => {
            apply_default_alpn(&mut vmess.tls, vmess.transport.as_ref());
            Outbound::VMess(vmess)
        }
        Outbound::Hysteria(mut hysteria) => {
            hysteria.tls = Some(require_tls(hysteria.tls));
            Outbound::Hysteria(hysteria)
        }
        Outbound::Hysteria2(mut hysteria2) => {
            hysteria2.tls = Some(require_tls(hysteria2.tls));
            Outbound::Hysteria2(hysteria2)
        }
        Outbound::Tuic(mut tuic) => {
            tuic.tls = Some(require_tls(tuic.tls));
            Outbound::Tuic(tuic)
        }
        other => other,
    }
}

fn require_tls(tls: Option<OutboundTlsConfig>) -> OutboundTlsConfig {
    let mut tls = tls.unwrap_or_default();
    if !tls.enabled {
        debug!("Enabling TLS required by protocol");
        tls.enabled = true;
    }
    tls
}

fn apply_default_alpn(tls: &mut Option<OutboundTlsConfig>, transport: Option<&V2RayTransport>) {
    if let Some(tls) = tls.as_mut()
        && tls.enabled
        && tls.alpn.is_empty()
    {
        tls.alpn = match transport {
            Some(V2RayTransport::WebSocket(_)) => vec!["http/1.1".to_string()],
            _ => vec!["h2".to_string(), "http/1.1".to_string()],
        };
    }
}

/// Appends `default_unit` to a duration written without any unit letters.
///
/// `"300"` with unit `"s"` becomes `"300s"`; `"5m"` is returned unchanged.
pub fn normalize_duration(value: &str, default_unit: &str) -> String {
    let value = value.trim();
    if value.is_empty() || value.chars().any(|c| c.is_ascii_alphabetic()) {
        value.to_string()
    } else {
        format!("{}{}", value, default_unit)
    }
}

// ============================================================================
// Aggregated Assembly
// ============================================================================

/// The direct, block and DNS sinks, in that order.
pub fn terminal_outbounds() -> [Outbound; 3] {
    [
        Outbound::Direct(DirectOutbound::new(DIRECT_TAG)),
        Outbound::Block(BlockOutbound::new(BLOCK_TAG)),
        Outbound::Dns(DnsOutbound::new(DNS_TAG)),
    ]
}

/// Orders aggregator output: normalized proxies, then groups, then the three
/// terminal outbounds exactly once.
///
/// Tags are not deduplicated.
pub fn assemble_aggregated(proxies: Vec<Outbound>, groups: Vec<Outbound>) -> Vec<Outbound> {
    debug!(
        "Assembling {} proxies and {} groups",
        proxies.len(),
        groups.len()
    );
    let mut outbounds = Vec::with_capacity(proxies.len() + groups.len() + 3);
    outbounds.extend(proxies.into_iter().map(normalize_outbound));
    outbounds.extend(groups);
    outbounds.extend(terminal_outbounds());
    outbounds
}

/// Advisory warnings for an outbound that was produced but may not behave as
/// its source intended.
pub fn compatibility_warnings(outbound: &Outbound) -> Vec<CompatibilityWarning> {
    match outbound {
        Outbound::VMess(vmess) if vmess.alter_id != 0 => {
            vec![CompatibilityWarning::LegacyAlterId {
                tag: vmess.tag.clone(),
                alter_id: vmess.alter_id,
            }]
        }
        _ => Vec::new(),
    }
}

/// Logs every compatibility warning in `outbounds` and returns them.
pub fn collect_warnings(outbounds: &[Outbound]) -> Vec<CompatibilityWarning> {
    let warnings: Vec<CompatibilityWarning> =
        outbounds.iter().flat_map(compatibility_warnings).collect();
    for warning in &warnings {
        warn!("{}", warning);
    }
    warnings
}

/// Fills in the health-check URL and interval of urltest groups that do not
/// set their own.
pub fn apply_health_check_defaults(
    outbounds: &mut [Outbound],
    url: Option<&str>,
    interval: Option<&str>,
) {
    for outbound in outbounds.iter_mut() {
        if let Outbound::UrlTest(urltest) = outbound {
            if urltest.url.is_none() {
                urltest.url = url.map(str::to_string);
            }
            if urltest.interval.is_none() {
                urltest.interval = interval.map(|i| normalize_duration(i, "s"));
            }
        }
    }
}
