//! Conversion pipeline behind the command-line front end
//!
//! Reads a subscription, converts it and writes the outbound document.
//! Link lists are converted with one blocking task per link; results are
//! collected in input order and a failing link never affects the others.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use crate::assemble::{apply_health_check_defaults, collect_warnings};
use crate::clash;
use crate::config::OutboundSet;
use crate::helpers::{expand_tilde, read_text};
use crate::parser::{
    Conversion, ProtocolRegistry, SubscriptionType, decode_subscription_content,
    detect_subscription_type, link_label, link_lines,
};
use crate::settings::ConvertConfig;

/// Converts links in parallel, one blocking task per link.
pub async fn convert_links(
    registry: Arc<ProtocolRegistry>,
    links: Vec<String>,
) -> Result<Conversion> {
    debug!("Spawning {} link conversion tasks", links.len());
    let handles: Vec<_> = links
        .into_iter()
        .map(|link| {
            let registry = Arc::clone(&registry);
            tokio::task::spawn_blocking(move || (link_label(&link), registry.parse_uri(&link)))
        })
        .collect();

    let mut conversion = Conversion::default();
    for (index, handle) in handles.into_iter().enumerate() {
        let (label, result) = handle
            .await
            .with_context(|| format!("Conversion task for link {} failed", index))?;
        conversion.record(index, label, result);
    }
    Ok(conversion)
}

/// Detects the subscription format and converts it.
pub async fn convert_content(
    content: &str,
    registry: Arc<ProtocolRegistry>,
) -> Result<Conversion> {
    let subscription_type = detect_subscription_type(content);
    info!("Detected subscription type: {}", subscription_type);

    match subscription_type {
        SubscriptionType::PlainUriList | SubscriptionType::Base64UriList => {
            let decoded = decode_subscription_content(content)?;
            let links = link_lines(&decoded).into_iter().map(str::to_string).collect();
            convert_links(registry, links).await
        }
        SubscriptionType::ClashYaml => Ok(clash::translate(content)?),
        SubscriptionType::Unknown => anyhow::bail!("Unable to detect subscription format"),
    }
}

/// Reads, converts and post-processes one subscription.
pub async fn run(settings: &ConvertConfig, input: &str) -> Result<OutboundSet> {
    info!("Reading subscription from {}", input);
    let content = read_text(input, settings.user_agent.as_deref())
        .await
        .with_context(|| format!("Failed to load subscription from {}", input))?;

    let registry = Arc::new(ProtocolRegistry::with_builtin_parsers());
    let mut conversion = convert_content(&content, registry).await?;

    for failure in &conversion.failures {
        warn!(
            "Entry {} ({}) skipped: {}",
            failure.index, failure.label, failure.error
        );
    }

    apply_health_check_defaults(
        &mut conversion.outbounds,
        settings.health_check.url.as_deref(),
        settings.health_check.interval.as_deref(),
    );
    collect_warnings(&conversion.outbounds);

    let groups = conversion
        .outbounds
        .iter()
        .filter(|o| o.is_group())
        .count();
    info!(
        "Converted {} outbounds ({} groups), {} entries skipped",
        conversion.outbounds.len(),
        groups,
        conversion.failures.len()
    );
    Ok(OutboundSet::new(conversion.outbounds))
}

/// Writes the document to `output`, or to stdout when no path is given.
pub async fn write_output(set: &OutboundSet, output: Option<&str>) -> Result<()> {
    let json = set
        .to_json_pretty()
        .context("Failed to serialize outbounds to JSON")?;

    let Some(output) = output else {
        println!("{}", json);
        return Ok(());
    };

    let expanded_path = expand_tilde(output);
    let path = Path::new(&expanded_path);

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Failed to create output directory {:?}", parent))?;
    }

    tokio::fs::write(path, &json)
        .await
        .with_context(|| format!("Failed to write outbounds to {:?}", path))?;

    info!("Outbounds written to {:?}", path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::outbound::Outbound;

    fn registry() -> Arc<ProtocolRegistry> {
        Arc::new(ProtocolRegistry::with_builtin_parsers())
    }

    #[tokio::test]
    async fn test_convert_links_keeps_input_order() {
        let links = vec![
            "trojan://pw@a.com:443#first".to_string(),
            "vmess://!!!".to_string(),
            "hy2://pw@b.com:443#third".to_string(),
            "tuic://u:p@c.com:443#fourth".to_string(),
        ];
        let conversion = convert_links(registry(), links).await.unwrap();

        let tags: Vec<&str> = conversion.outbounds.iter().map(Outbound::tag).collect();
        assert_eq!(tags, vec!["first", "third", "fourth"]);
        assert_eq!(conversion.failures.len(), 1);
        assert_eq!(conversion.failures[0].index, 1);
    }

    #[tokio::test]
    async fn test_convert_content_clash() {
        let yaml = "proxies:\n  - {name: a, type: trojan, server: a.com, port: 443, password: pw}\n";
        let conversion = convert_content(yaml, registry()).await.unwrap();
        assert_eq!(conversion.outbounds.len(), 4);
    }

    #[tokio::test]
    async fn test_convert_content_leading_unknown_scheme() {
        let content = "naive+https://u:p@a.com:443\ntrojan://pw@b.com:443#b\n";
        let conversion = convert_content(content, registry()).await.unwrap();
        assert_eq!(conversion.outbounds.len(), 1);
        assert_eq!(conversion.failures[0].index, 0);
    }

    #[tokio::test]
    async fn test_convert_content_unknown() {
        assert!(convert_content("hello world", registry()).await.is_err());
    }

    #[tokio::test]
    async fn test_run_applies_health_check_defaults() {
        let path = std::env::temp_dir().join("switchyard-pipeline-run.yaml");
        let yaml = r#"
proxies:
  - {name: a, type: trojan, server: a.com, port: 443, password: pw}
proxy-groups:
  - {name: auto, type: url-test, proxies: [a]}
"#;
        tokio::fs::write(&path, yaml).await.unwrap();

        let settings = ConvertConfig::from_toml(
            "[health_check]\nurl = \"https://cp.example.com/204\"\ninterval = \"120\"\n",
        )
        .unwrap();
        let set = run(&settings, path.to_str().unwrap()).await.unwrap();
        tokio::fs::remove_file(&path).await.unwrap();

        let Some(Outbound::UrlTest(urltest)) = set.outbounds.get(1) else {
            panic!("Expected urltest group at index 1");
        };
        assert_eq!(urltest.url.as_deref(), Some("https://cp.example.com/204"));
        assert_eq!(urltest.interval.as_deref(), Some("120s"));
    }

    #[tokio::test]
    async fn test_write_output_creates_directories() {
        let dir = std::env::temp_dir().join("switchyard-write-output");
        let path = dir.join("nested").join("outbounds.json");
        let set = OutboundSet::new(crate::assemble::terminal_outbounds().to_vec());

        write_output(&set, path.to_str()).await.unwrap();
        let written = tokio::fs::read_to_string(&path).await.unwrap();
        assert!(written.contains(r#""tag": "dns-out""#));

        tokio::fs::remove_dir_all(&dir).await.unwrap();
    }
}
