//! Configuration resolver.
//!
//! Typed, secret-aware reads over the stack settings handed in by the
//! engine. A [`Config`] is an explicit context obtained from a
//! [`Stack`](crate::stack::Stack), never a process-wide global, so several
//! compositions can run side by side without interfering.
//!
//! Plain getters refuse secret-marked keys: the only way to read a secret
//! is [`Config::get_secret`], which returns a [`Secret`].

use std::cell::RefCell;
use std::rc::Rc;

use azcompose_common::config::{ConfigScalar, StackSettings};
use azcompose_common::constants::CONFIG_NAMESPACE_SEPARATOR;
use azcompose_common::error::{ComposeError, Result};
use serde::Serialize;

use crate::secret::Secret;

/// A record of one configuration read, kept for previews.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfigRead {
    /// Fully qualified key.
    pub key: String,
    /// Whether the key was read as a secret.
    pub secret: bool,
    /// Whether a value was present in the settings.
    pub found: bool,
    /// Whether the caller supplied a fallback default.
    pub defaulted: bool,
}

pub(crate) type ReadLog = Rc<RefCell<Vec<ConfigRead>>>;

/// Configuration reader for one namespace.
#[derive(Debug, Clone)]
pub struct Config {
    namespace: String,
    settings: Rc<StackSettings>,
    reads: ReadLog,
}

impl Config {
    pub(crate) fn new(settings: Rc<StackSettings>, namespace: &str, reads: ReadLog) -> Self {
        Self {
            namespace: namespace.to_string(),
            settings,
            reads,
        }
    }

    /// The namespace keys are read from.
    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    fn qualify(&self, key: &str) -> String {
        format!("{}{CONFIG_NAMESPACE_SEPARATOR}{key}", self.namespace)
    }

    fn record(&self, key: &str, secret: bool, found: bool, defaulted: bool) {
        tracing::debug!(key, secret, found, defaulted, "config read");
        self.reads.borrow_mut().push(ConfigRead {
            key: key.to_string(),
            secret,
            found,
            defaulted,
        });
    }

    fn plain(&self, key: &str, defaulted: bool) -> Result<Option<ConfigScalar>> {
        let qualified = self.qualify(key);
        let entry = self.settings.entry(&qualified);
        self.record(&qualified, false, entry.is_some(), defaulted);
        match entry {
            Some(e) if e.is_secret() => Err(ComposeError::secret_leak(format!(
                "configuration key {qualified} is secret; read it with get_secret"
            ))),
            Some(e) => Ok(Some(e.scalar().clone())),
            None => Ok(None),
        }
    }

    /// Reads a string value; `None` when unset.
    ///
    /// # Errors
    ///
    /// Returns [`ComposeError::SecretLeak`] if the key holds a secret.
    pub fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.plain(key, false)?.map(|s| s.to_string()))
    }

    /// Reads a string value, falling back to `default`.
    ///
    /// # Errors
    ///
    /// Returns [`ComposeError::SecretLeak`] if the key holds a secret.
    pub fn get_or(&self, key: &str, default: &str) -> Result<String> {
        Ok(self
            .plain(key, true)?
            .map_or_else(|| default.to_string(), |s| s.to_string()))
    }

    /// Reads a required string value.
    ///
    /// # Errors
    ///
    /// Returns [`ComposeError::MissingConfig`] if unset.
    pub fn require(&self, key: &str) -> Result<String> {
        self.get(key)?.ok_or_else(|| ComposeError::MissingConfig {
            key: self.qualify(key),
        })
    }

    /// Reads an integer value; `None` when unset.
    ///
    /// # Errors
    ///
    /// Returns [`ComposeError::InvalidConfig`] if the value is not an integer.
    pub fn get_int(&self, key: &str) -> Result<Option<i64>> {
        self.plain(key, false)?
            .map(|s| self.parse_int(key, &s))
            .transpose()
    }

    /// Reads an integer value, falling back to `default`.
    ///
    /// # Errors
    ///
    /// Returns [`ComposeError::InvalidConfig`] if the value is not an integer.
    pub fn get_int_or(&self, key: &str, default: i64) -> Result<i64> {
        Ok(self
            .plain(key, true)?
            .map(|s| self.parse_int(key, &s))
            .transpose()?
            .unwrap_or(default))
    }

    /// Reads a required integer value.
    ///
    /// # Errors
    ///
    /// Returns [`ComposeError::MissingConfig`] if unset.
    pub fn require_int(&self, key: &str) -> Result<i64> {
        self.get_int(key)?.ok_or_else(|| ComposeError::MissingConfig {
            key: self.qualify(key),
        })
    }

    /// Reads a boolean value; `None` when unset.
    ///
    /// # Errors
    ///
    /// Returns [`ComposeError::InvalidConfig`] if the value is not a boolean.
    pub fn get_bool(&self, key: &str) -> Result<Option<bool>> {
        self.plain(key, false)?
            .map(|s| self.parse_bool(key, &s))
            .transpose()
    }

    /// Reads a boolean value, falling back to `default`.
    ///
    /// # Errors
    ///
    /// Returns [`ComposeError::InvalidConfig`] if the value is not a boolean.
    pub fn get_bool_or(&self, key: &str, default: bool) -> Result<bool> {
        Ok(self
            .plain(key, true)?
            .map(|s| self.parse_bool(key, &s))
            .transpose()?
            .unwrap_or(default))
    }

    /// Reads a value as a secret. Plain values are promoted.
    #[must_use]
    pub fn get_secret(&self, key: &str) -> Option<Secret<String>> {
        let qualified = self.qualify(key);
        let entry = self.settings.entry(&qualified);
        self.record(&qualified, true, entry.is_some(), false);
        entry.map(|e| Secret::new(e.scalar().to_string()))
    }

    /// Reads a value as a secret, falling back to `default`.
    #[must_use]
    pub fn get_secret_or(&self, key: &str, default: &str) -> Secret<String> {
        let qualified = self.qualify(key);
        let entry = self.settings.entry(&qualified);
        self.record(&qualified, true, entry.is_some(), true);
        Secret::new(entry.map_or_else(|| default.to_string(), |e| e.scalar().to_string()))
    }

    /// Reads a required secret value.
    ///
    /// # Errors
    ///
    /// Returns [`ComposeError::MissingConfig`] if unset.
    pub fn require_secret(&self, key: &str) -> Result<Secret<String>> {
        self.get_secret(key).ok_or_else(|| ComposeError::MissingConfig {
            key: self.qualify(key),
        })
    }

    fn parse_int(&self, key: &str, scalar: &ConfigScalar) -> Result<i64> {
        match scalar {
            ConfigScalar::Int(n) => Ok(*n),
            ConfigScalar::Text(s) => s.trim().parse().map_err(|_| self.invalid(key, "integer", s)),
            other => Err(self.invalid(key, "integer", &other.to_string())),
        }
    }

    fn parse_bool(&self, key: &str, scalar: &ConfigScalar) -> Result<bool> {
        match scalar {
            ConfigScalar::Bool(b) => Ok(*b),
            ConfigScalar::Text(s) => match s.trim() {
                "true" => Ok(true),
                "false" => Ok(false),
                _ => Err(self.invalid(key, "boolean", s)),
            },
            other => Err(self.invalid(key, "boolean", &other.to_string())),
        }
    }

    fn invalid(&self, key: &str, expected: &str, got: &str) -> ComposeError {
        ComposeError::InvalidConfig {
            key: self.qualify(key),
            message: format!("expected {expected}, got \"{got}\""),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_for(settings: StackSettings) -> (Config, ReadLog) {
        let reads: ReadLog = Rc::default();
        let ns = settings.project.clone();
        (
            Config::new(Rc::new(settings), &ns, Rc::clone(&reads)),
            reads,
        )
    }

    #[test]
    fn defaults_are_never_absent() {
        let (config, _) = config_for(StackSettings::new("app", "dev"));
        assert_eq!(config.get_or("adminUserName", "testuser").unwrap(), "testuser");
        assert_eq!(config.get_int_or("nodeCount", 2).unwrap(), 2);
        assert!(!config.get_bool_or("protect", false).unwrap());
        assert_eq!(config.get_secret_or("password", "fallback").expose(), "fallback");
    }

    #[test]
    fn absent_without_default_is_none() {
        let (config, _) = config_for(StackSettings::new("app", "dev"));
        assert_eq!(config.get("k8sVersion").unwrap(), None);
        assert!(config.get_secret("password").is_none());
    }

    #[test]
    fn require_reports_qualified_key() {
        let (config, _) = config_for(StackSettings::new("app", "dev"));
        let err = config.require("base_name").unwrap_err();
        assert!(matches!(err, ComposeError::MissingConfig { ref key } if key == "app:base_name"));
    }

    #[test]
    fn plain_read_of_secret_is_rejected() {
        let (config, _) = config_for(StackSettings::new("app", "dev").with_secret("password", "pw"));
        let err = config.get("password").unwrap_err();
        assert!(matches!(err, ComposeError::SecretLeak { .. }));
        assert_eq!(config.get_secret("password").unwrap().expose(), "pw");
    }

    #[test]
    fn plain_value_read_as_secret_is_promoted() {
        let (config, _) = config_for(StackSettings::new("app", "dev").with_value("token", "abc"));
        let secret = config.get_secret("token").expect("present");
        assert_eq!(format!("{secret:?}"), "[secret]");
    }

    #[test]
    fn integers_parse_from_text() {
        let (config, _) = config_for(StackSettings::new("app", "dev").with_value("nodeCount", "3"));
        assert_eq!(config.get_int("nodeCount").unwrap(), Some(3));
    }

    #[test]
    fn invalid_integer_is_reported() {
        let (config, _) = config_for(StackSettings::new("app", "dev").with_value("nodeCount", "many"));
        let err = config.get_int_or("nodeCount", 2).unwrap_err();
        assert!(matches!(err, ComposeError::InvalidConfig { .. }), "got: {err}");
    }

    #[test]
    fn reads_are_recorded() {
        let (config, reads) =
            config_for(StackSettings::new("app", "dev").with_secret("password", "pw"));
        let _ = config.get_or("base_name", "component").unwrap();
        let _ = config.get_secret("password");
        let log = reads.borrow();
        assert_eq!(log.len(), 2);
        assert_eq!(log[0].key, "app:base_name");
        assert!(log[0].defaulted);
        assert!(!log[0].found);
        assert!(log[1].secret);
        assert!(log[1].found);
    }
}
