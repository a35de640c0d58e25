//! Stack settings model: project, stack name, and raw configuration values.
//!
//! These are the values the orchestration engine hands to a composition.
//! Typed, secret-aware access lives in `azcompose-core::config`.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::Path;

use serde::de::{DeserializeSeed, IgnoredAny, MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};

use crate::constants::{CONFIG_NAMESPACE_SEPARATOR, DEFAULT_STACK, SECRET_MARKER};
use crate::error::{ComposeError, Result};

/// A scalar configuration value as written in a stack file.
///
/// Anything that is not a boolean or a whole number keeps its source text,
/// so `1.20` reads back as `1.20`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ConfigScalar {
    /// `true` / `false`.
    Bool(bool),
    /// Whole number.
    Int(i64),
    /// Anything else, verbatim.
    Text(String),
}

impl ConfigScalar {
    /// Classifies raw scalar text.
    #[must_use]
    pub fn from_text(text: String) -> Self {
        if matches!(text.as_str(), "true" | "True" | "TRUE") {
            return Self::Bool(true);
        }
        if matches!(text.as_str(), "false" | "False" | "FALSE") {
            return Self::Bool(false);
        }
        text.parse::<i64>().map_or(Self::Text(text), Self::Int)
    }
}

impl fmt::Display for ConfigScalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(n) => write!(f, "{n}"),
            Self::Text(s) => write!(f, "{s}"),
        }
    }
}

// Read through `deserialize_str`, which hands back the scalar as written
// instead of YAML's resolved number.
impl<'de> Deserialize<'de> for ConfigScalar {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        String::deserialize(deserializer).map(Self::from_text)
    }
}

/// One configuration entry: either a bare scalar or `{ value, secret }`.
#[derive(Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ConfigEntry {
    /// Value with an explicit secret flag.
    Structured {
        /// Raw value.
        value: ConfigScalar,
        /// Whether the value must be treated as secret.
        #[serde(default)]
        secret: bool,
    },
    /// Bare, non-secret value.
    Plain(ConfigScalar),
}

impl ConfigEntry {
    /// Creates a non-secret entry.
    #[must_use]
    pub fn plain(value: impl Into<String>) -> Self {
        Self::Plain(ConfigScalar::Text(value.into()))
    }

    /// Creates a secret entry.
    #[must_use]
    pub fn secret(value: impl Into<String>) -> Self {
        Self::Structured {
            value: ConfigScalar::Text(value.into()),
            secret: true,
        }
    }

    /// Returns `true` if the entry is marked secret.
    #[must_use]
    pub const fn is_secret(&self) -> bool {
        matches!(self, Self::Structured { secret: true, .. })
    }

    /// Returns the raw scalar.
    #[must_use]
    pub const fn scalar(&self) -> &ConfigScalar {
        match self {
            Self::Structured { value, .. } | Self::Plain(value) => value,
        }
    }
}

impl fmt::Debug for ConfigEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_secret() {
            f.write_str(SECRET_MARKER)
        } else {
            write!(f, "{:?}", self.scalar())
        }
    }
}

/// Settings of one stack: identity plus its configuration map.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StackSettings {
    /// Project name, also the default configuration namespace.
    pub project: String,
    /// Stack name (`dev`, `prod`, ...).
    pub stack: String,
    /// Configuration values keyed by `namespace:key`.
    pub config: BTreeMap<String, ConfigEntry>,
}

/// First pass over a stack file: identity plus the shape of each entry.
#[derive(Deserialize)]
struct StackFileShape {
    project: String,
    #[serde(default = "default_stack")]
    stack: String,
    #[serde(default)]
    config: BTreeMap<String, serde_yaml::Value>,
}

fn default_stack() -> String {
    DEFAULT_STACK.to_string()
}

#[derive(Deserialize)]
struct StructuredEntry {
    value: ConfigScalar,
    #[serde(default)]
    secret: bool,
}

/// Second pass over a stack file: reads the `config` section with every
/// scalar kept verbatim. `structured` names the keys written as mappings.
struct ConfigSection<'a> {
    structured: &'a BTreeSet<String>,
}

impl<'de> DeserializeSeed<'de> for ConfigSection<'_> {
    type Value = BTreeMap<String, ConfigEntry>;

    fn deserialize<D>(self, deserializer: D) -> std::result::Result<Self::Value, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(self)
    }
}

impl<'de> Visitor<'de> for ConfigSection<'_> {
    type Value = BTreeMap<String, ConfigEntry>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a stack file mapping")
    }

    fn visit_map<A>(self, mut map: A) -> std::result::Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut config = BTreeMap::new();
        while let Some(key) = map.next_key::<String>()? {
            if key != "config" {
                let _ = map.next_value::<IgnoredAny>()?;
                continue;
            }
            config = map.next_value_seed(ConfigEntries {
                structured: self.structured,
            })?;
        }
        Ok(config)
    }
}

struct ConfigEntries<'a> {
    structured: &'a BTreeSet<String>,
}

impl<'de> DeserializeSeed<'de> for ConfigEntries<'_> {
    type Value = BTreeMap<String, ConfigEntry>;

    fn deserialize<D>(self, deserializer: D) -> std::result::Result<Self::Value, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(self)
    }
}

impl<'de> Visitor<'de> for ConfigEntries<'_> {
    type Value = BTreeMap<String, ConfigEntry>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a map of configuration entries")
    }

    fn visit_map<A>(self, mut map: A) -> std::result::Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut entries = BTreeMap::new();
        while let Some(key) = map.next_key::<String>()? {
            let entry = if self.structured.contains(&key) {
                let StructuredEntry { value, secret } = map.next_value()?;
                ConfigEntry::Structured { value, secret }
            } else {
                ConfigEntry::Plain(map.next_value()?)
            };
            let _ = entries.insert(key, entry);
        }
        Ok(entries)
    }
}

impl StackSettings {
    /// Creates settings with an empty configuration map.
    #[must_use]
    pub fn new(project: impl Into<String>, stack: impl Into<String>) -> Self {
        Self {
            project: project.into(),
            stack: stack.into(),
            config: BTreeMap::new(),
        }
    }

    /// Adds a plain value. Bare keys are placed in the project namespace.
    #[must_use]
    pub fn with_value(mut self, key: &str, value: impl Into<String>) -> Self {
        let key = self.qualify(key);
        let _ = self.config.insert(key, ConfigEntry::plain(value));
        self
    }

    /// Adds a secret value. Bare keys are placed in the project namespace.
    #[must_use]
    pub fn with_secret(mut self, key: &str, value: impl Into<String>) -> Self {
        let key = self.qualify(key);
        let _ = self.config.insert(key, ConfigEntry::secret(value));
        self
    }

    /// Qualifies a bare key with the project namespace.
    #[must_use]
    pub fn qualify(&self, key: &str) -> String {
        if key.contains(CONFIG_NAMESPACE_SEPARATOR) {
            key.to_string()
        } else {
            format!("{}{CONFIG_NAMESPACE_SEPARATOR}{key}", self.project)
        }
    }

    /// Looks up an entry by fully qualified key.
    #[must_use]
    pub fn entry(&self, qualified_key: &str) -> Option<&ConfigEntry> {
        self.config.get(qualified_key)
    }

    /// Parses settings from YAML text.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not a valid stack file.
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        let shape: StackFileShape = serde_yaml::from_str(text)?;
        let structured: BTreeSet<String> = shape
            .config
            .iter()
            .filter(|(_, value)| value.is_mapping())
            .map(|(key, _)| key.clone())
            .collect();
        let config = ConfigSection {
            structured: &structured,
        }
        .deserialize(serde_yaml::Deserializer::from_str(text))?;

        let mut settings = Self {
            project: shape.project,
            stack: shape.stack,
            config,
        };
        let bare: Vec<String> = settings
            .config
            .keys()
            .filter(|k| !k.contains(CONFIG_NAMESPACE_SEPARATOR))
            .cloned()
            .collect();
        for key in bare {
            if let Some(entry) = settings.config.remove(&key) {
                let qualified = settings.qualify(&key);
                let _ = settings.config.insert(qualified, entry);
            }
        }
        Ok(settings)
    }

    /// Loads settings from a YAML stack file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        tracing::debug!(path = %path.display(), "loading stack settings");
        let text = std::fs::read_to_string(path).map_err(|e| ComposeError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_yaml_str(&text)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn bare_keys_are_qualified_with_project() {
        let settings = StackSettings::new("webapp", "dev").with_value("base_name", "demo");
        assert!(settings.entry("webapp:base_name").is_some());
    }

    #[test]
    fn namespaced_keys_are_kept() {
        let settings =
            StackSettings::new("webapp", "dev").with_value("azure-native:location", "westus2");
        assert!(settings.entry("azure-native:location").is_some());
    }

    #[test]
    fn yaml_parses_plain_and_secret_entries() {
        let yaml = r"
project: webapp
stack: prod
config:
  base_name: demo
  webapp:nodeCount: 3
  webapp:password:
    value: hunter2
    secret: true
";
        let settings = StackSettings::from_yaml_str(yaml).expect("parse");
        assert_eq!(settings.stack, "prod");
        let base = settings.entry("webapp:base_name").expect("base_name");
        assert!(!base.is_secret());
        assert_eq!(base.scalar().to_string(), "demo");
        let count = settings.entry("webapp:nodeCount").expect("nodeCount");
        assert_eq!(count.scalar(), &ConfigScalar::Int(3));
        let pw = settings.entry("webapp:password").expect("password");
        assert!(pw.is_secret());
    }

    #[test]
    fn decimal_text_is_kept_verbatim() {
        let yaml = r#"
project: aks
config:
  k8sVersion: 1.20
  quoted: "1.20"
  ratio: 0.50
  enabled: true
  nodeCount: 3
  aks:version:
    value: 1.10
    secret: true
"#;
        let settings = StackSettings::from_yaml_str(yaml).expect("parse");
        let text = |key: &str| settings.entry(key).expect(key).scalar().to_string();
        assert_eq!(text("aks:k8sVersion"), "1.20");
        assert_eq!(text("aks:quoted"), "1.20");
        assert_eq!(text("aks:ratio"), "0.50");
        assert_eq!(text("aks:version"), "1.10");
        assert!(settings.entry("aks:version").unwrap().is_secret());
        assert_eq!(settings.entry("aks:enabled").unwrap().scalar(), &ConfigScalar::Bool(true));
        assert_eq!(settings.entry("aks:nodeCount").unwrap().scalar(), &ConfigScalar::Int(3));
    }

    #[test]
    fn stack_defaults_to_dev() {
        let settings = StackSettings::from_yaml_str("project: p\n").expect("parse");
        assert_eq!(settings.stack, "dev");
        assert!(settings.config.is_empty());
    }

    #[test]
    fn secret_entries_are_redacted_in_debug() {
        let settings = StackSettings::new("p", "dev").with_secret("password", "hunter2");
        let debug = format!("{settings:?}");
        assert!(!debug.contains("hunter2"), "got: {debug}");
        assert!(debug.contains(SECRET_MARKER));
    }

    #[test]
    fn load_reads_file() {
        let mut file = tempfile::NamedTempFile::new().expect("tempfile");
        writeln!(file, "project: site\nconfig:\n  base_name: component").expect("write");
        let settings = StackSettings::load(file.path()).expect("load");
        assert_eq!(settings.project, "site");
        assert!(settings.entry("site:base_name").is_some());
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let err = StackSettings::load(Path::new("/nonexistent/stack.yaml")).unwrap_err();
        assert!(matches!(err, ComposeError::Io { .. }));
    }
}
