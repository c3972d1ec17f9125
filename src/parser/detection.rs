//! Subscription format detection
//!
//! This module provides functionality for detecting the type of subscription
//! content: Base64 link lists, plain link lists, and Clash YAML documents.

use tracing::debug;

use super::base64::decode_base64_str;
use super::protocols::SUPPORTED_SCHEMES;

// ============================================================================
// Subscription Type Detection
// ============================================================================

/// Detected subscription content type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscriptionType {
    /// Base64 encoded link list
    Base64UriList,
    /// Plain text link list (one link per line)
    PlainUriList,
    /// Clash YAML format
    ClashYaml,
    /// Unknown format
    Unknown,
}

impl std::fmt::Display for SubscriptionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SubscriptionType::Base64UriList => write!(f, "Base64 URI List"),
            SubscriptionType::PlainUriList => write!(f, "Plain URI List"),
            SubscriptionType::ClashYaml => write!(f, "Clash YAML"),
            SubscriptionType::Unknown => write!(f, "Unknown"),
        }
    }
}

/// Detects the type of subscription content
pub fn detect_subscription_type(content: &str) -> SubscriptionType {
    let trimmed = content.trim();
    let content_preview: String = trimmed.chars().take(100).collect();
    debug!(
        "Detecting subscription type, content length: {} bytes, preview: {:?}...",
        content.len(),
        content_preview
    );

    if is_clash_yaml(trimmed) {
        debug!("Detected Clash YAML format (contains proxy definitions)");
        return SubscriptionType::ClashYaml;
    }

    if is_plain_uri_list(trimmed) {
        let first_line = trimmed.lines().next().unwrap_or("");
        debug!(
            "Detected plain URI list format, first line: {:?}",
            first_line
        );
        return SubscriptionType::PlainUriList;
    }

    if is_base64_content(trimmed) {
        debug!("Detected Base64 encoded URI list format");
        return SubscriptionType::Base64UriList;
    }

    debug!("Unable to detect subscription format");
    SubscriptionType::Unknown
}

/// Checks if content is Clash YAML format
pub fn is_clash_yaml(content: &str) -> bool {
    let trimmed = content.trim();

    trimmed.starts_with("port:")
        || trimmed.starts_with("mixed-port:")
        || trimmed
            .lines()
            .any(|line| line.starts_with("proxies:") || line.starts_with("proxy-groups:"))
}

/// Checks if content is a plain link list
///
/// Any `scheme://` line counts, supported or not, so a list that opens with
/// an unknown scheme still converts its other links.
pub fn is_plain_uri_list(content: &str) -> bool {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .any(looks_like_link)
}

/// Checks if a string has the `scheme://` shape of a share link
pub fn looks_like_link(s: &str) -> bool {
    s.split_once("://").is_some_and(|(scheme, _)| {
        scheme.starts_with(|c: char| c.is_ascii_alphabetic())
            && scheme
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
    })
}

/// Checks if a string starts with a supported share-link scheme
pub fn is_proxy_uri(s: &str) -> bool {
    SUPPORTED_SCHEMES
        .iter()
        .any(|scheme| s.strip_prefix(scheme).is_some_and(|rest| rest.starts_with("://")))
}

/// Checks if content appears to be a Base64 encoded link list
pub fn is_base64_content(content: &str) -> bool {
    let cleaned: String = content.chars().filter(|c| !c.is_whitespace()).collect();

    if cleaned.len() < 4 {
        return false;
    }

    let is_valid_base64 = cleaned.chars().all(|c| {
        c.is_ascii_alphanumeric() || c == '+' || c == '/' || c == '=' || c == '-' || c == '_'
    });
    if !is_valid_base64 {
        return false;
    }

    decode_base64_str(&cleaned)
        .is_some_and(|decoded| decoded.lines().any(|line| is_proxy_uri(line.trim())))
}
