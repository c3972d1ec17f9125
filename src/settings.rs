//! Converter settings parsed from a TOML file.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::helpers::{expand_tilde, fetch_text, is_url};

/// Converter configuration
///
/// ```toml
/// input = "https://example.com/subscription"
/// output = "~/sing-box/outbounds.json"
/// user_agent = "clash-verge/1.0"
///
/// [health_check]
/// url = "https://www.gstatic.com/generate_204"
/// interval = "300"
/// ```
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ConvertConfig {
    /// Subscription path or URL; overridden by `--input`
    #[serde(default)]
    pub input: Option<String>,

    /// Output file path, default "./out/outbounds.json"
    #[serde(default = "default_output")]
    pub output: String,

    /// User agent sent when fetching subscriptions
    #[serde(default)]
    pub user_agent: Option<String>,

    /// Defaults for urltest groups that do not specify their own
    #[serde(default)]
    pub health_check: HealthCheck,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct HealthCheck {
    /// Probe URL
    #[serde(default)]
    pub url: Option<String>,

    /// Probe interval; seconds when written without a unit
    #[serde(default)]
    pub interval: Option<String>,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            input: None,
            output: default_output(),
            user_agent: None,
            health_check: HealthCheck::default(),
        }
    }
}

impl ConvertConfig {
    /// Parse converter config from TOML string
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: ConvertConfig =
            toml::from_str(content).context("Failed to parse converter config TOML")?;

        if let Some(url) = config.health_check.url.as_deref() {
            url::Url::parse(url)
                .with_context(|| format!("Invalid health_check.url: {}", url))?;
        }

        Ok(config)
    }

    /// Load converter config from file path
    pub async fn from_file(path: &Path) -> Result<Self> {
        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read converter config from {:?}", path))?;
        Self::from_toml(&content)
    }

    /// Load converter config from file path or URL
    pub async fn load(path_or_url: &str) -> Result<Self> {
        if is_url(path_or_url) {
            let content = fetch_text(path_or_url, None).await?;
            Self::from_toml(&content)
        } else {
            let expanded = expand_tilde(path_or_url);
            Self::from_file(Path::new(&expanded)).await
        }
    }
}

fn default_output() -> String {
    "./out/outbounds.json".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
input = "https://example.com/sub"
output = "/tmp/outbounds.json"
user_agent = "clash-verge/1.0"

[health_check]
url = "https://www.gstatic.com/generate_204"
interval = "300"
"#;
        let config = ConvertConfig::from_toml(toml).unwrap();
        assert_eq!(config.input.as_deref(), Some("https://example.com/sub"));
        assert_eq!(config.output, "/tmp/outbounds.json");
        assert_eq!(config.user_agent.as_deref(), Some("clash-verge/1.0"));
        assert_eq!(
            config.health_check.url.as_deref(),
            Some("https://www.gstatic.com/generate_204")
        );
        assert_eq!(config.health_check.interval.as_deref(), Some("300"));
    }

    #[test]
    fn test_parse_empty_config_uses_defaults() {
        let config = ConvertConfig::from_toml("").unwrap();
        assert_eq!(config, ConvertConfig::default());
        assert_eq!(config.output, "./out/outbounds.json");
    }

    #[test]
    fn test_parse_invalid_health_check_url_fails() {
        let toml = "[health_check]\nurl = \"not a url\"\n";
        assert!(ConvertConfig::from_toml(toml).is_err());
    }

    #[test]
    fn test_parse_invalid_toml_fails() {
        assert!(ConvertConfig::from_toml("output = [").is_err());
    }
}
