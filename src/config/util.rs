//! Utility functions for serde serialization/deserialization.
//!
//! This module contains helper functions commonly used with serde's
//! `skip_serializing_if` and `default` attributes, plus deserializers for
//! the loosely-typed scalars that subscription sources emit.

use serde::{Deserialize, Deserializer};

// ============================================================================
// Boolean Helpers
// ============================================================================

/// Returns `true` if the boolean value is `false`.
///
/// Used with `#[serde(skip_serializing_if = "is_false")]` to omit false values.
#[inline]
pub fn is_false(b: &bool) -> bool {
    !*b
}

// ============================================================================
// Numeric Zero Helpers
// ============================================================================

/// Returns `true` if the u32 value is zero.
///
/// Used with `#[serde(skip_serializing_if = "is_zero_u32")]` to omit zero values.
#[inline]
pub fn is_zero_u32(v: &u32) -> bool {
    *v == 0
}

// ============================================================================
// WireGuard MTU Helpers
// ============================================================================

/// Default WireGuard MTU value (1408).
pub const DEFAULT_WIREGUARD_MTU: u32 = 1408;

/// Returns the default WireGuard MTU value.
#[inline]
pub fn default_wireguard_mtu() -> u32 {
    DEFAULT_WIREGUARD_MTU
}

/// Returns `true` if the MTU value is the default WireGuard MTU (1408).
#[inline]
pub fn is_default_wireguard_mtu(v: &u32) -> bool {
    *v == DEFAULT_WIREGUARD_MTU
}

// ============================================================================
// Loose Scalar Deserializers
// ============================================================================

/// A scalar that may arrive either as a number or as a string.
///
/// Share-link JSON and Clash YAML both emit ports, alter ids and bandwidth
/// figures in either form, e.g. `"port": 443` and `"port": "443"`.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum LooseScalar {
    Integer(i64),
    Float(f64),
    Bool(bool),
    Text(String),
}

impl LooseScalar {
    /// Renders the scalar back to its textual form.
    pub fn as_text(&self) -> String {
        match self {
            LooseScalar::Integer(n) => n.to_string(),
            LooseScalar::Float(f) => f.to_string(),
            LooseScalar::Bool(b) => b.to_string(),
            LooseScalar::Text(s) => s.trim().to_string(),
        }
    }

    /// Interprets the scalar as an unsigned integer.
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            LooseScalar::Integer(n) => u64::try_from(*n).ok(),
            LooseScalar::Float(_) | LooseScalar::Bool(_) => None,
            LooseScalar::Text(s) => s.trim().parse().ok(),
        }
    }

    /// Interprets the scalar as a boolean (`true`, `1`).
    pub fn as_bool(&self) -> bool {
        match self {
            LooseScalar::Bool(b) => *b,
            LooseScalar::Integer(n) => *n != 0,
            LooseScalar::Float(_) => false,
            LooseScalar::Text(s) => matches!(s.trim(), "1" | "true" | "True" | "TRUE"),
        }
    }
}

/// Deserializes an optional u16 that may be a number or a numeric string.
///
/// Empty strings are treated as absent.
pub fn deserialize_loose_u16<'de, D>(deserializer: D) -> Result<Option<u16>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<LooseScalar>::deserialize(deserializer)? {
        None => Ok(None),
        Some(LooseScalar::Text(s)) if s.trim().is_empty() => Ok(None),
        Some(value) => {
            let n = value
                .as_u64()
                .ok_or_else(|| serde::de::Error::custom(format!("invalid number: {:?}", value)))?;
            u16::try_from(n)
                .map(Some)
                .map_err(|_| serde::de::Error::custom(format!("number out of range: {}", n)))
        }
    }
}

/// Deserializes an optional u32 that may be a number or a numeric string.
pub fn deserialize_loose_u32<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<LooseScalar>::deserialize(deserializer)? {
        None => Ok(None),
        Some(LooseScalar::Text(s)) if s.trim().is_empty() => Ok(None),
        Some(value) => {
            let n = value
                .as_u64()
                .ok_or_else(|| serde::de::Error::custom(format!("invalid number: {:?}", value)))?;
            u32::try_from(n)
                .map(Some)
                .map_err(|_| serde::de::Error::custom(format!("number out of range: {}", n)))
        }
    }
}

/// Deserializes an optional u64 that may be a number or a numeric string.
pub fn deserialize_loose_u64<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<LooseScalar>::deserialize(deserializer)? {
        None => Ok(None),
        Some(LooseScalar::Text(s)) if s.trim().is_empty() => Ok(None),
        Some(value) => value
            .as_u64()
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid number: {:?}", value))),
    }
}

/// Deserializes an optional string that may have been written as a number.
pub fn deserialize_loose_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<LooseScalar>::deserialize(deserializer)?.map(|v| v.as_text()))
}

/// Deserializes an optional boolean that may be written as `1`/`"true"`.
pub fn deserialize_loose_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<LooseScalar>::deserialize(deserializer)?
        .map(|v| v.as_bool())
        .unwrap_or(false))
}

// ============================================================================
// String or Vec Deserializer
// ============================================================================

/// Helper enum for fields that can be either a single string or a list.
///
/// Clash documents write `alpn: h2` as readily as `alpn: [h2, http/1.1]`.
#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrVec {
    Single(String),
    Multiple(Vec<String>),
}

/// Deserializes a string or list of strings into a `Vec<String>`.
pub fn deserialize_string_or_vec<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<StringOrVec>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(StringOrVec::Single(s)) => s
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect(),
        Some(StringOrVec::Multiple(v)) => v,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Loose {
        #[serde(default, deserialize_with = "deserialize_loose_u16")]
        port: Option<u16>,
        #[serde(default, deserialize_with = "deserialize_loose_bool")]
        flag: bool,
        #[serde(default, deserialize_with = "deserialize_string_or_vec")]
        alpn: Vec<String>,
    }

    #[test]
    fn test_is_false() {
        assert!(is_false(&false));
        assert!(!is_false(&true));
    }

    #[test]
    fn test_is_zero_u32() {
        assert!(is_zero_u32(&0));
        assert!(!is_zero_u32(&7));
    }

    #[test]
    fn test_wireguard_mtu_default() {
        assert_eq!(default_wireguard_mtu(), 1408);
        assert!(is_default_wireguard_mtu(&1408));
        assert!(!is_default_wireguard_mtu(&1280));
    }

    #[test]
    fn test_loose_port_number_and_string() {
        let a: Loose = serde_json::from_str(r#"{"port": 443}"#).unwrap();
        let b: Loose = serde_json::from_str(r#"{"port": "443"}"#).unwrap();
        assert_eq!(a.port, Some(443));
        assert_eq!(b.port, Some(443));
    }

    #[test]
    fn test_loose_port_empty_string_is_none() {
        let a: Loose = serde_json::from_str(r#"{"port": ""}"#).unwrap();
        assert_eq!(a.port, None);
    }

    #[test]
    fn test_loose_port_out_of_range() {
        let result: Result<Loose, _> = serde_json::from_str(r#"{"port": 70000}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_loose_bool() {
        let a: Loose = serde_json::from_str(r#"{"flag": "1"}"#).unwrap();
        let b: Loose = serde_json::from_str(r#"{"flag": true}"#).unwrap();
        let c: Loose = serde_json::from_str(r#"{}"#).unwrap();
        assert!(a.flag);
        assert!(b.flag);
        assert!(!c.flag);
    }

    #[test]
    fn test_string_or_vec() {
        let a: Loose = serde_json::from_str(r#"{"alpn": "h2,http/1.1"}"#).unwrap();
        let b: Loose = serde_json::from_str(r#"{"alpn": ["h3"]}"#).unwrap();
        assert_eq!(a.alpn, vec!["h2", "http/1.1"]);
        assert_eq!(b.alpn, vec!["h3"]);
    }
}
