//! V2Ray transport construction
//!
//! VMess, VLESS and Trojan links describe their transport with the same
//! handful of fields (`type`/`net`, `path`, `host`, `serviceName`, `ed`),
//! so the mapping onto [`V2RayTransport`] lives here once.

use std::collections::BTreeMap;

use tracing::trace;

use crate::config::outbound::{
    DEFAULT_EARLY_DATA_HEADER, GrpcTransport, Http2Transport, V2RayTransport, WebSocketTransport,
};

use super::error::ParseError;
use super::uri::{QueryParams, split_list};

/// Transport fields gathered from a link before the network type is known.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransportOptions {
    pub path: Option<String>,
    /// WebSocket `Host` header, or comma-separated HTTP/2 host list
    pub host: Option<String>,
    pub service_name: Option<String>,
    /// Explicit early-data size; suppresses inference from the path
    pub max_early_data: Option<u32>,
    pub early_data_header_name: Option<String>,
}

impl TransportOptions {
    /// Reads the transport fields of a URI-query link.
    pub fn from_query(query: &QueryParams, protocol: &'static str) -> Result<Self, ParseError> {
        Ok(Self {
            path: query.string(&["path"]),
            host: query.string(&["host"]),
            service_name: query.string(&["serviceName", "service_name"]),
            max_early_data: query.number(protocol, &["ed"])?,
            early_data_header_name: query.string(&["eh"]),
        })
    }
}

/// Builds the transport for a network name.
///
/// `tcp` and an absent name mean no V2Ray transport. A network the model
/// cannot express is an error rather than being silently dropped.
pub fn build_transport(
    network: Option<&str>,
    options: TransportOptions,
    protocol: &'static str,
) -> Result<Option<V2RayTransport>, ParseError> {
    let network = network.map(str::trim).unwrap_or_default();
    let transport = match network.to_ascii_lowercase().as_str() {
        "" | "tcp" | "raw" | "none" => None,
        "ws" | "websocket" => Some(V2RayTransport::WebSocket(websocket(
            options.path,
            host_header(options.host),
            options.max_early_data,
            options.early_data_header_name,
        ))),
        "grpc" => Some(V2RayTransport::Grpc(GrpcTransport {
            service_name: options
                .service_name
                .or(options.path)
                .filter(|s| !s.is_empty()),
        })),
        "h2" | "http" => Some(V2RayTransport::Http2(Http2Transport {
            host: options.host.as_deref().map(split_list).unwrap_or_default(),
            path: options.path.filter(|p| !p.is_empty()),
        })),
        _ => return Err(ParseError::invalid(protocol, "transport", network)),
    };
    Ok(transport)
}

/// Builds the transport described by a URI-query link's `type` parameter.
pub fn transport_from_query(
    query: &QueryParams,
    protocol: &'static str,
) -> Result<Option<V2RayTransport>, ParseError> {
    let options = TransportOptions::from_query(query, protocol)?;
    build_transport(query.get("type"), options, protocol)
}

/// Builds a WebSocket transport, inferring early data from the path when no
/// explicit size was given.
pub fn websocket(
    path: Option<String>,
    headers: BTreeMap<String, String>,
    max_early_data: Option<u32>,
    early_data_header_name: Option<String>,
) -> WebSocketTransport {
    let mut ws = WebSocketTransport {
        path: path.filter(|p| !p.is_empty()),
        headers,
        max_early_data: max_early_data.unwrap_or(0),
        early_data_header_name: early_data_header_name.filter(|h| !h.is_empty()),
    };

    if max_early_data.is_none()
        && let Some(path) = ws.path.as_deref()
        && let Some((stripped, size)) = split_path_early_data(path)
    {
        trace!("Inferred WebSocket early data {} from path {:?}", size, path);
        ws.path = Some(stripped).filter(|p| !p.is_empty());
        ws.max_early_data = size;
        ws.early_data_header_name = Some(DEFAULT_EARLY_DATA_HEADER.to_string());
    }

    ws
}

/// Removes an embedded `ed=<digits>` token from a WebSocket path.
///
/// Returns the path without the token and the early-data size, or `None`
/// when the path carries no such token.
pub fn split_path_early_data(path: &str) -> Option<(String, u32)> {
    let (base, query) = path.split_once('?')?;

    let mut early_data = None;
    let mut kept = Vec::new();
    for pair in query.split('&') {
        match pair.strip_prefix("ed=").and_then(parse_digits) {
            Some(size) if early_data.is_none() => early_data = Some(size),
            _ => kept.push(pair),
        }
    }

    let size = early_data?;
    let path = if kept.is_empty() {
        base.to_string()
    } else {
        format!("{}?{}", base, kept.join("&"))
    };
    Some((path, size))
}

fn parse_digits(value: &str) -> Option<u32> {
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    value.parse().ok()
}

fn host_header(host: Option<String>) -> BTreeMap<String, String> {
    host.filter(|h| !h.is_empty())
        .map(|h| BTreeMap::from([("Host".to_string(), h)]))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(raw: &str) -> QueryParams {
        QueryParams::parse(raw, "vless").unwrap()
    }

    #[test]
    fn test_no_transport_for_tcp() {
        assert_eq!(transport_from_query(&query("type=tcp"), "vless"), Ok(None));
        assert_eq!(transport_from_query(&query(""), "vless"), Ok(None));
    }

    #[test]
    fn test_websocket_from_query() {
        let transport =
            transport_from_query(&query("type=ws&path=%2Fray&host=cdn.example.com"), "vless")
                .unwrap();
        let Some(V2RayTransport::WebSocket(ws)) = transport else {
            panic!("Expected WebSocket transport");
        };
        assert_eq!(ws.path.as_deref(), Some("/ray"));
        assert_eq!(ws.headers.get("Host").map(String::as_str), Some("cdn.example.com"));
        assert_eq!(ws.max_early_data, 0);
        assert!(ws.early_data_header_name.is_none());
    }

    #[test]
    fn test_early_data_inferred_from_path() {
        let transport =
            transport_from_query(&query("type=ws&path=%2Fws%3Fed%3D2048"), "vless").unwrap();
        let Some(V2RayTransport::WebSocket(ws)) = transport else {
            panic!("Expected WebSocket transport");
        };
        assert_eq!(ws.max_early_data, 2048);
        assert_eq!(
            ws.early_data_header_name.as_deref(),
            Some(DEFAULT_EARLY_DATA_HEADER)
        );
        assert_eq!(ws.path.as_deref(), Some("/ws"));
    }

    #[test]
    fn test_explicit_early_data_wins() {
        let transport = transport_from_query(
            &query("type=ws&path=%2Fws%3Fed%3D2048&ed=1024&eh=X-Early"),
            "vless",
        )
        .unwrap();
        let Some(V2RayTransport::WebSocket(ws)) = transport else {
            panic!("Expected WebSocket transport");
        };
        assert_eq!(ws.max_early_data, 1024);
        assert_eq!(ws.early_data_header_name.as_deref(), Some("X-Early"));
        assert_eq!(ws.path.as_deref(), Some("/ws?ed=2048"));
    }

    #[test]
    fn test_split_path_early_data_keeps_other_params() {
        assert_eq!(
            split_path_early_data("/ws?a=1&ed=512&b=2"),
            Some(("/ws?a=1&b=2".to_string(), 512))
        );
        assert_eq!(split_path_early_data("/ws?ed=abc"), None);
        assert_eq!(split_path_early_data("/ws"), None);
    }

    #[test]
    fn test_grpc_service_name_falls_back_to_path() {
        let transport = build_transport(
            Some("grpc"),
            TransportOptions {
                path: Some("TunService".to_string()),
                ..Default::default()
            },
            "vmess",
        )
        .unwrap();
        assert_eq!(
            transport,
            Some(V2RayTransport::Grpc(GrpcTransport {
                service_name: Some("TunService".to_string())
            }))
        );
    }

    #[test]
    fn test_http2_host_list() {
        let transport =
            transport_from_query(&query("type=h2&host=a.com,b.com&path=%2Fh2"), "vless").unwrap();
        let Some(V2RayTransport::Http2(h2)) = transport else {
            panic!("Expected HTTP/2 transport");
        };
        assert_eq!(h2.host, vec!["a.com", "b.com"]);
        assert_eq!(h2.path.as_deref(), Some("/h2"));
    }

    #[test]
    fn test_unknown_network_rejected() {
        let err = transport_from_query(&query("type=kcp"), "vless").unwrap_err();
        assert_eq!(err, ParseError::invalid("vless", "transport", "kcp"));
    }
}
