//! Application configuration overlay
//!
//! Flattens `application.properties` / `application.yml` / `application.yaml`
//! under `src/main/resources` into dotted keys, then layers the variants of
//! every active profile on top.

use crate::fs::FileSystem;
use serde::Deserialize;
use serde_yaml::Value;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, warn};

pub const RESOURCES_DIR: &str = "src/main/resources";
pub const ACTIVE_PROFILES_KEY: &str = "spring.profiles.active";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Properties,
    Yaml,
}

const VARIANTS: &[(&str, Format)] = &[
    ("properties", Format::Properties),
    ("yml", Format::Yaml),
    ("yaml", Format::Yaml),
];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigurationOverlay {
    values: BTreeMap<String, String>,
}

impl ConfigurationOverlay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Base files first, then `application-<profile>.*` for each profile
    /// listed in `spring.profiles.active`, in order. Missing files contribute
    /// nothing; malformed ones are logged and skipped.
    pub fn load(fs: &dyn FileSystem, project_dir: &Path) -> Self {
        let resources = project_dir.join(RESOURCES_DIR);
        let mut overlay = Self::new();

        overlay.apply_variants(fs, &resources, "application");

        for profile in overlay.active_profiles() {
            debug!(profile = %profile, "Applying profile configuration");
            overlay.apply_variants(fs, &resources, &format!("application-{profile}"));
        }

        overlay
    }

    fn apply_variants(&mut self, fs: &dyn FileSystem, resources: &Path, stem: &str) {
        for (extension, format) in VARIANTS {
            let path = resources.join(format!("{stem}.{extension}"));
            if fs.is_file(&path) {
                self.apply_file(fs, &path, *format);
            }
        }
    }

    fn apply_file(&mut self, fs: &dyn FileSystem, path: &Path, format: Format) {
        let content = match fs.read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                warn!("Skipping unreadable configuration file {}: {}", path.display(), e);
                return;
            }
        };

        match format {
            Format::Properties => self.apply_properties(&content),
            Format::Yaml => {
                if let Err(e) = self.apply_yaml(&content) {
                    warn!("Skipping malformed configuration file {}: {}", path.display(), e);
                }
            }
        }
    }

    /// `key=value` lines; blank lines and `#` comments are skipped and only
    /// the first `=` splits
    pub fn apply_properties(&mut self, content: &str) {
        for line in content.lines() {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            if let Some((key, value)) = trimmed.split_once('=') {
                self.values
                    .insert(key.trim().to_string(), value.trim().to_string());
            }
        }
    }

    /// Every YAML document in `content`, flattened. Nothing is applied unless
    /// all documents parse.
    pub fn apply_yaml(&mut self, content: &str) -> Result<(), serde_yaml::Error> {
        let mut flattened = BTreeMap::new();
        for document in serde_yaml::Deserializer::from_str(content) {
            let value = Value::deserialize(document)?;
            flatten("", &value, &mut flattened);
        }
        self.values.extend(flattened);
        Ok(())
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn as_map(&self) -> &BTreeMap<String, String> {
        &self.values
    }

    pub fn active_profiles(&self) -> Vec<String> {
        self.get(ACTIVE_PROFILES_KEY)
            .map(|profiles| {
                profiles
                    .split(',')
                    .map(str::trim)
                    .filter(|p| !p.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ConfigurationOverlay {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

fn flatten(prefix: &str, value: &Value, out: &mut BTreeMap<String, String>) {
    match value {
        Value::Mapping(mapping) => {
            for (key, child) in mapping {
                let Some(key) = scalar_text(key) else {
                    continue;
                };
                let path = if prefix.is_empty() {
                    key
                } else {
                    format!("{prefix}.{key}")
                };
                flatten(&path, child, out);
            }
        }
        Value::Sequence(items) => {
            for (i, item) in items.iter().enumerate() {
                flatten(&format!("{prefix}[{i}]"), item, out);
            }
        }
        Value::Tagged(tagged) => flatten(prefix, &tagged.value, out),
        scalar => {
            if prefix.is_empty() {
                return;
            }
            if let Some(text) = scalar_text(scalar) {
                out.insert(prefix.to_string(), text);
            }
        }
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => Some(String::new()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) => Some(s.clone()),
        _ => None,
    }
}
