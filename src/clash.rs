//! Clash aggregator document translation
//!
//! A Clash subscription carries typed `proxies` and `proxy-groups` lists.
//! Every entry is translated independently: a bad entry is recorded as a
//! failure and the rest of the document still converts. Successful entries
//! are assembled as proxies, then groups, then the direct, block and DNS
//! terminal outbounds.

pub mod group;
pub mod model;
pub mod proxy;

use serde_yaml::Value;
use tracing::debug;

use crate::assemble::assemble_aggregated;
use crate::parser::error::ParseError;
use crate::parser::{Conversion, EntryFailure};

use self::group::translate_group;
use self::model::ClashDocument;
use self::proxy::translate_proxy;

/// Translates a Clash YAML document.
///
/// Failure indices count proxies first, then groups: the group at position
/// `i` is reported as index `proxies.len() + i`.
pub fn translate(yaml: &str) -> Result<Conversion, ParseError> {
    let document: ClashDocument =
        serde_yaml::from_str(yaml).map_err(|e| ParseError::malformed("clash", e.to_string()))?;
    let proxy_entries = document.proxies.unwrap_or_default();
    let group_entries = document.proxy_groups.unwrap_or_default();
    debug!(
        "Clash document has {} proxies and {} groups",
        proxy_entries.len(),
        group_entries.len()
    );

    let offset = proxy_entries.len();
    let mut proxies = Conversion::default();
    for (index, entry) in proxy_entries.into_iter().enumerate() {
        let label = entry_label(&entry, index);
        proxies.record(index, label, translate_proxy(entry));
    }

    let mut groups = Conversion::default();
    for (position, entry) in group_entries.into_iter().enumerate() {
        let index = offset + position;
        let label = entry_label(&entry, index);
        groups.record(index, label, translate_group(entry));
    }

    let mut failures: Vec<EntryFailure> = proxies.failures;
    failures.extend(groups.failures);
    Ok(Conversion {
        outbounds: assemble_aggregated(proxies.outbounds, groups.outbounds),
        failures,
    })
}

fn entry_label(entry: &Value, index: usize) -> String {
    match entry.get("name") {
        Some(Value::String(name)) => name.clone(),
        Some(Value::Number(number)) => number.to_string(),
        _ => format!("#{}", index),
    }
}
