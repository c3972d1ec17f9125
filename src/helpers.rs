//! Utility functions for the command-line front end
//!
//! Path expansion and HTTP fetching of subscriptions and config files.

use anyhow::{Context, Result};
use tracing::debug;

use crate::get_version;

// ============================================================================
// Path Utilities
// ============================================================================

/// Expand ~ to home directory in path
pub fn expand_tilde(path: &str) -> String {
    if (path.starts_with("~/") || path == "~")
        && let Some(home) = dirs_home()
    {
        return path.replacen("~", &home, 1);
    }
    path.to_string()
}

/// Get home directory path
pub fn dirs_home() -> Option<String> {
    #[cfg(windows)]
    {
        std::env::var("USERPROFILE").ok()
    }
    #[cfg(not(windows))]
    {
        std::env::var("HOME").ok()
    }
}

pub fn is_url(path_or_url: &str) -> bool {
    path_or_url.starts_with("http://") || path_or_url.starts_with("https://")
}

// ============================================================================
// HTTP Utilities
// ============================================================================

/// The user agent sent when none is configured.
pub fn default_user_agent() -> String {
    format!("switchyard/{}", get_version())
}

/// Fetch text content from a URL
pub async fn fetch_text(url: &str, user_agent: Option<&str>) -> Result<String> {
    debug!("Fetching URL: {}", url);

    let client = reqwest::Client::builder()
        .user_agent(user_agent.map_or_else(default_user_agent, str::to_string))
        .build()
        .context("Failed to build HTTP client")?;

    let response = client
        .get(url)
        .send()
        .await
        .with_context(|| format!("Failed to fetch URL: {}", url))?;

    let status = response.status();
    if !status.is_success() {
        anyhow::bail!("HTTP request failed with status {}: {}", status, url);
    }

    let text = response
        .text()
        .await
        .with_context(|| format!("Failed to read response body from: {}", url))?;

    Ok(text)
}

/// Read text from a local path (with `~` expansion) or an http(s) URL.
pub async fn read_text(path_or_url: &str, user_agent: Option<&str>) -> Result<String> {
    if is_url(path_or_url) {
        fetch_text(path_or_url, user_agent).await
    } else {
        let expanded = expand_tilde(path_or_url);
        tokio::fs::read_to_string(&expanded)
            .await
            .with_context(|| format!("Failed to read {}", expanded))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    #[test]
    fn test_expand_tilde_with_home() {
        if let Ok(home) = env::var("HOME") {
            let expanded = expand_tilde("~/test/path");
            assert!(expanded.starts_with(&home));
            assert!(expanded.ends_with("/test/path"));
            assert!(!expanded.contains('~'));
        }
    }

    #[test]
    fn test_expand_tilde_just_tilde() {
        if let Ok(home) = env::var("HOME") {
            assert_eq!(expand_tilde("~"), home);
        }
    }

    #[test]
    fn test_expand_tilde_untouched() {
        for path in ["/absolute/path/to/file", "./relative/path", "/some/~/path"] {
            assert_eq!(expand_tilde(path), path);
        }
    }

    #[test]
    fn test_is_url() {
        assert!(is_url("https://example.com/sub"));
        assert!(is_url("http://example.com/sub"));
        assert!(!is_url("~/sub.txt"));
        assert!(!is_url("ftp://example.com/sub"));
    }

    #[test]
    fn test_default_user_agent() {
        assert!(default_user_agent().starts_with("switchyard/"));
    }

    #[tokio::test]
    async fn test_read_text_local_file() {
        let path = env::temp_dir().join("switchyard-read-text-test.txt");
        tokio::fs::write(&path, "trojan://pw@a.com:443").await.unwrap();
        let text = read_text(path.to_str().unwrap(), None).await.unwrap();
        assert_eq!(text, "trojan://pw@a.com:443");
        tokio::fs::remove_file(&path).await.unwrap();
    }

    #[tokio::test]
    async fn test_read_text_missing_file() {
        let err = read_text("/nonexistent/switchyard/input.txt", None)
            .await
            .unwrap_err();
        assert!(format!("{:#}", err).contains("Failed to read"));
    }
}
