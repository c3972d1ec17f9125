//! Translation of Clash `proxy-groups` entries.
//!
//! sing-box only has manual selection and latency-based selection, so
//! `fallback` and `load-balance` both become urltest groups.

use serde_yaml::Value;
use tracing::debug;

use crate::assemble::{BLOCK_TAG, DIRECT_TAG, normalize_duration};
use crate::config::outbound::{Outbound, SelectorOutbound, UrlTestOutbound};
use crate::parser::error::ParseError;

use super::model::ClashProxyGroup;

const PROTOCOL: &str = "proxy-group";

/// Translates one group entry.
pub fn translate_group(value: Value) -> Result<Outbound, ParseError> {
    let group: ClashProxyGroup = serde_yaml::from_value(value)
        .map_err(|e| ParseError::malformed(PROTOCOL, e.to_string()))?;

    let tag = group
        .name
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
        .ok_or_else(|| ParseError::missing(PROTOCOL, "name"))?;
    let strategy = group
        .strategy
        .map(|s| s.trim().to_ascii_lowercase())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ParseError::missing(PROTOCOL, "type"))?;
    let members: Vec<String> = group
        .proxies
        .iter()
        .map(String::as_str)
        .map(member_tag)
        .collect();

    match strategy.as_str() {
        "select" => Ok(Outbound::Selector(SelectorOutbound::new(tag, members))),
        "url-test" | "fallback" | "load-balance" => {
            if strategy != "url-test" {
                debug!("Collapsing {} group '{}' into urltest", strategy, tag);
            }
            Ok(Outbound::UrlTest(UrlTestOutbound {
                url: group.url.filter(|u| !u.is_empty()),
                interval: group
                    .interval
                    .as_deref()
                    .map(|i| normalize_duration(i, "s"))
                    .filter(|i| !i.is_empty()),
                tolerance: group.tolerance,
                ..UrlTestOutbound::new(tag, members)
            }))
        }
        other => Err(ParseError::UnsupportedStrategy(other.to_string())),
    }
}

/// Rewrites Clash built-in policy names to the terminal outbound tags.
fn member_tag(member: &str) -> String {
    match member.trim() {
        "DIRECT" => DIRECT_TAG.to_string(),
        "REJECT" | "REJECT-DROP" => BLOCK_TAG.to_string(),
        other => other.to_string(),
    }
}
