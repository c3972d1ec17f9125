use serde::{Deserialize, Serialize};

use crate::config::outbound::Outbound;

pub mod outbound;
pub mod shared;
pub mod util;

/// The document handed to the engine's configuration builder.
///
/// Only the `outbounds` section is produced here; inbounds, routing and DNS
/// are owned by whoever embeds the result.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct OutboundSet {
    /// Outbounds in source order
    #[serde(default)]
    pub outbounds: Vec<Outbound>,
}

impl OutboundSet {
    pub fn new(outbounds: Vec<Outbound>) -> Self {
        Self { outbounds }
    }

    /// Serializes the set as pretty-printed sing-box JSON.
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Tags of every outbound, in order.
    pub fn tags(&self) -> Vec<&str> {
        self.outbounds.iter().map(Outbound::tag).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::outbound::{BlockOutbound, DirectOutbound};

    #[test]
    fn test_empty_set() {
        let set = OutboundSet::default();
        let json = serde_json::to_string(&set).unwrap();
        assert_eq!(json, r#"{"outbounds":[]}"#);
    }

    #[test]
    fn test_set_tags_in_order() {
        let set = OutboundSet::new(vec![
            Outbound::Direct(DirectOutbound::new("direct")),
            Outbound::Block(BlockOutbound::new("block")),
        ]);
        assert_eq!(set.tags(), vec!["direct", "block"]);
    }

    #[test]
    fn test_set_round_trip() {
        let set = OutboundSet::new(vec![Outbound::Direct(DirectOutbound::new("direct"))]);
        let json = set.to_json_pretty().unwrap();
        let back: OutboundSet = serde_json::from_str(&json).unwrap();
        assert_eq!(back, set);
    }
}
