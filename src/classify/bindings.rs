//! Stream binding extraction from the configuration overlay
//!
//! A binding is any `<namespace>.bindings.<channel>.destination` key.

use crate::overlay::ConfigurationOverlay;
use std::collections::{BTreeMap, BTreeSet};

/// Channel → destination for every binding under `namespace`
pub fn binding_destinations(overlay: &ConfigurationOverlay, namespace: &str) -> BTreeMap<String, String> {
    let prefix = format!("{namespace}.bindings.");
    overlay
        .iter()
        .filter_map(|(key, value)| {
            let channel = key.strip_prefix(prefix.as_str())?.strip_suffix(".destination")?;
            (!channel.is_empty()).then(|| (channel.to_string(), value.to_string()))
        })
        .collect()
}

pub fn distinct_destinations(bindings: &BTreeMap<String, String>) -> BTreeSet<String> {
    bindings.values().cloned().collect()
}

/// First channel (in name order) that consumes input, e.g. `consume-in-0`
pub fn input_channel(bindings: &BTreeMap<String, String>) -> Option<&str> {
    bindings
        .keys()
        .map(String::as_str)
        .find(|channel| channel.contains("-in-"))
}
