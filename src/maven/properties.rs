//! `${name}` placeholder substitution
//!
//! Substitution is a single pass: text produced by a replacement is never
//! scanned again, so `a=${b}` substitutes `${a}` to the literal `${b}`.
//! Unknown names are left untouched.

use super::descriptor::DescriptorNode;
use regex::{Captures, Regex};
use std::collections::BTreeMap;
use std::sync::OnceLock;

pub type PropertyMap = BTreeMap<String, String>;

fn placeholder_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\$\{([^}]+)\}").expect("valid regex"))
}

pub fn substitute(input: &str, properties: &PropertyMap) -> String {
    if !input.contains("${") {
        return input.to_string();
    }

    placeholder_regex()
        .replace_all(input, |caps: &Captures| match properties.get(&caps[1]) {
            Some(value) => value.clone(),
            None => caps[0].to_string(),
        })
        .into_owned()
}

pub fn has_placeholder(input: &str) -> bool {
    placeholder_regex().is_match(input)
}

/// The properties visible from one descriptor, nearest definition winning
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropertyScope {
    properties: PropertyMap,
}

impl PropertyScope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Layers, lowest precedence first: `base` (typically a rendered
    /// effective descriptor), each ancestor root-most first, the descriptor
    /// itself, then the `project.*` built-ins.
    pub fn for_descriptor(
        node: &DescriptorNode,
        ancestors_root_first: &[&DescriptorNode],
        base: Option<&PropertyMap>,
    ) -> Self {
        let mut scope = Self::new();
        if let Some(base) = base {
            scope.layer(base);
        }
        for ancestor in ancestors_root_first {
            scope.layer(&ancestor.properties);
        }
        scope.layer(&node.properties);
        scope.layer(&builtins(node));
        scope
    }

    pub fn layer(&mut self, properties: &PropertyMap) {
        for (k, v) in properties {
            self.properties.insert(k.clone(), v.clone());
        }
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.properties.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }

    pub fn resolve(&self, input: &str) -> String {
        substitute(input, &self.properties)
    }

    pub fn as_map(&self) -> &PropertyMap {
        &self.properties
    }

    pub fn into_map(self) -> PropertyMap {
        self.properties
    }
}

fn builtins(node: &DescriptorNode) -> PropertyMap {
    let mut map = PropertyMap::new();
    let c = &node.coordinate;

    for prefix in ["project", "pom"] {
        map.insert(format!("{prefix}.groupId"), c.group_id.clone());
        map.insert(format!("{prefix}.artifactId"), c.artifact_id.clone());
        if let Some(v) = &c.version {
            map.insert(format!("{prefix}.version"), v.clone());
        }
        if let Some(parent) = node.parent_coordinate() {
            map.insert(format!("{prefix}.parent.groupId"), parent.group_id.clone());
            map.insert(
                format!("{prefix}.parent.artifactId"),
                parent.artifact_id.clone(),
            );
            if let Some(v) = &parent.version {
                map.insert(format!("{prefix}.parent.version"), v.clone());
            }
        }
    }

    if let Some(v) = node.parent_coordinate().and_then(|p| p.version.clone()) {
        map.insert("parent.version".to_string(), v);
    }

    map
}
