//! Parse error and advisory warning types
//!
//! Every failure while translating one link or one aggregator entry is
//! reported as a [`ParseError`] value. Nothing in the parsing layer panics
//! on bad input, so a caller working through a batch can skip the entry and
//! carry on.

use thiserror::Error;

/// Failure to turn one raw entry into an outbound.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The link prefix (or aggregator `type`) matches no known protocol.
    #[error("unsupported scheme: {0}")]
    UnsupportedScheme(String),

    /// The aggregator group strategy has no canonical counterpart.
    #[error("unsupported group strategy: {0}")]
    UnsupportedStrategy(String),

    /// Base64, percent-encoding or JSON/YAML decoding failed, or a
    /// required separator is missing.
    #[error("malformed {protocol} encoding: {reason}")]
    MalformedEncoding {
        protocol: &'static str,
        reason: String,
    },

    /// Server, port or a mandatory credential is absent after decoding.
    #[error("{protocol} entry missing required field `{field}`")]
    MissingRequiredField {
        protocol: &'static str,
        field: &'static str,
    },

    /// A field is present but its value cannot be used.
    #[error("invalid `{field}` in {protocol} entry: {value}")]
    InvalidField {
        protocol: &'static str,
        field: &'static str,
        value: String,
    },
}

impl ParseError {
    pub fn malformed(protocol: &'static str, reason: impl Into<String>) -> Self {
        ParseError::MalformedEncoding {
            protocol,
            reason: reason.into(),
        }
    }

    pub fn missing(protocol: &'static str, field: &'static str) -> Self {
        ParseError::MissingRequiredField { protocol, field }
    }

    pub fn invalid(protocol: &'static str, field: &'static str, value: impl Into<String>) -> Self {
        ParseError::InvalidField {
            protocol,
            field,
            value: value.into(),
        }
    }
}

/// Advisory signal about an outbound that was produced but may not work as
/// the source intended.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompatibilityWarning {
    /// VMess with a nonzero alter id; the engine only speaks the AEAD
    /// (alter id 0) handshake.
    #[error("outbound '{tag}' uses legacy VMess alter id {alter_id}; only alter id 0 is supported")]
    LegacyAlterId { tag: String, alter_id: u32 },
}
