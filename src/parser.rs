//! Subscription and Protocol Parsing Module
//!
//! This module provides functionality for:
//! - Detecting subscription content types (Base64 link list, plain link list, Clash YAML)
//! - Decoding content (handling Base64 encoding with various line break scenarios)
//! - Parsing share links (ss://, vmess://, vless://, trojan://, hysteria://,
//!   hysteria2://, tuic://, socks://, ssh://, wireguard://)
//! - Batch conversion where one bad entry never affects its siblings

pub mod base64;
pub mod detection;
pub mod error;
pub mod protocols;
pub mod transport;
pub mod uri;

pub use detection::{SubscriptionType, detect_subscription_type};
pub use error::{CompatibilityWarning, ParseError};
pub use protocols::{ProtocolParser, ProtocolRegistry};

use tracing::{debug, warn};

use crate::config::outbound::Outbound;

use self::base64::decode_base64_str;

// ============================================================================
// Conversion Results
// ============================================================================

/// One input entry that could not be converted.
#[derive(Debug, Clone, PartialEq)]
pub struct EntryFailure {
    /// Position of the entry in its input
    pub index: usize,
    /// Display label of the entry, when one could be recovered
    pub label: String,
    pub error: ParseError,
}

/// Outcome of converting many entries: N inputs with K failures yield
/// N - K outbounds and K failures.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Conversion {
    pub outbounds: Vec<Outbound>,
    pub failures: Vec<EntryFailure>,
}

impl Conversion {
    /// Records the result of the entry at `index`.
    pub fn record(&mut self, index: usize, label: String, result: Result<Outbound, ParseError>) {
        match result {
            Ok(outbound) => self.outbounds.push(outbound),
            Err(error) => {
                warn!("Skipping entry {} ({}): {}", index, label, error);
                self.failures.push(EntryFailure {
                    index,
                    label,
                    error,
                });
            }
        }
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

// ============================================================================
// Link Batches
// ============================================================================

/// Parses a single share link with the built-in parsers.
pub fn parse_link(uri: &str) -> Result<Outbound, ParseError> {
    ProtocolRegistry::with_builtin_parsers().parse_uri(uri)
}

/// Splits link-list content into candidate links, skipping blank lines and
/// `#` comments.
pub fn link_lines(content: &str) -> Vec<&str> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .collect()
}

/// Label used to report a failed link without echoing its credentials.
pub fn link_label(uri: &str) -> String {
    if let Some((_, fragment)) = uri.rsplit_once('#') {
        let label = uri::decode_label(fragment);
        if !label.is_empty() {
            return label;
        }
    }
    match uri.split_once("://") {
        Some((scheme, _)) => format!("{}://", scheme),
        None => "<invalid link>".to_string(),
    }
}

/// Parses every link in order; failures are collected, never fatal.
pub fn parse_batch<S: AsRef<str>>(registry: &ProtocolRegistry, links: &[S]) -> Conversion {
    debug!("Parsing {} links", links.len());
    let mut conversion = Conversion::default();
    for (index, link) in links.iter().enumerate() {
        let link = link.as_ref();
        conversion.record(index, link_label(link), registry.parse_uri(link));
    }
    debug!(
        "Link batch complete: {} successful, {} failed",
        conversion.outbounds.len(),
        conversion.failures.len()
    );
    conversion
}

// ============================================================================
// Unified Subscription Conversion
// ============================================================================

/// Returns link-list text, decoding it first when it is Base64.
pub fn decode_subscription_content(content: &str) -> Result<String, ParseError> {
    match detect_subscription_type(content) {
        SubscriptionType::Base64UriList => decode_base64_str(content.trim())
            .ok_or_else(|| ParseError::malformed("subscription", "invalid Base64 content")),
        _ => Ok(content.to_string()),
    }
}

/// Converts subscription content with automatic type detection.
pub fn convert_subscription(content: &str) -> Result<Conversion, ParseError> {
    let registry = ProtocolRegistry::with_builtin_parsers();
    convert_subscription_with_registry(content, &registry)
}

/// Converts subscription content using a custom registry
///
/// Link lists yield one outbound per good link. Clash documents yield
/// proxies, groups and the three terminal outbounds.
pub fn convert_subscription_with_registry(
    content: &str,
    registry: &ProtocolRegistry,
) -> Result<Conversion, ParseError> {
    let subscription_type = detect_subscription_type(content);
    debug!("Detected subscription type: {}", subscription_type);

    match subscription_type {
        SubscriptionType::PlainUriList => Ok(parse_batch(registry, &link_lines(content))),
        SubscriptionType::Base64UriList => {
            let decoded = decode_subscription_content(content)?;
            Ok(parse_batch(registry, &link_lines(&decoded)))
        }
        SubscriptionType::ClashYaml => crate::clash::translate(content),
        SubscriptionType::Unknown => Err(ParseError::malformed(
            "subscription",
            "unable to detect subscription format",
        )),
    }
}
