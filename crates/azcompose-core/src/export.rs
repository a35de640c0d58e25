//! Stack outputs.
//!
//! The [`ExportRegistry`] holds the named values a composition publishes.
//! Values may be literals or deferred outputs; a secret value can only be
//! published through [`ExportRegistry::export_secret`].

use std::collections::BTreeSet;

use azcompose_common::constants::SECRET_MARKER;
use azcompose_common::error::{ComposeError, Result};
use azcompose_common::types::{ExportName, Urn};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::output::{Output, OutputOrigin, ResolvedState};
use crate::secret::Secret;

const COMPUTED: &str = "<computed>";

/// What an export value is made of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportKind {
    /// A value known at composition time.
    Literal,
    /// A resource attribute passed through untouched.
    Attribute,
    /// A transformation over one or more deferred outputs.
    Derived,
}

/// The value side of an export.
#[derive(Debug, Clone)]
pub enum ExportValue {
    /// Known at composition time.
    Literal(Value),
    /// Secret known at composition time.
    Secret(Secret<Value>),
    /// Produced by the engine.
    Deferred(Output<Value>),
}

impl ExportValue {
    /// Returns `true` if the value carries a secret.
    #[must_use]
    pub const fn is_secret(&self) -> bool {
        match self {
            Self::Literal(_) => false,
            Self::Secret(_) => true,
            Self::Deferred(o) => o.is_secret(),
        }
    }

    /// Classifies the value.
    #[must_use]
    pub const fn kind(&self) -> ExportKind {
        match self {
            Self::Literal(_) | Self::Secret(_) => ExportKind::Literal,
            Self::Deferred(o) => match o.origin() {
                OutputOrigin::Known => ExportKind::Literal,
                OutputOrigin::Attribute => ExportKind::Attribute,
                OutputOrigin::Derived => ExportKind::Derived,
            },
        }
    }

    fn into_secret(self) -> Self {
        match self {
            Self::Literal(v) => Self::Secret(Secret::new(v)),
            Self::Deferred(o) => Self::Deferred(o.as_secret()),
            secret @ Self::Secret(_) => secret,
        }
    }
}

impl<T: Serialize + 'static> From<Output<T>> for ExportValue {
    fn from(output: Output<T>) -> Self {
        Self::Deferred(output.into_value())
    }
}

impl<T: Serialize + 'static> From<&Output<T>> for ExportValue {
    fn from(output: &Output<T>) -> Self {
        Self::Deferred(output.clone().into_value())
    }
}

impl From<Secret<String>> for ExportValue {
    fn from(secret: Secret<String>) -> Self {
        Self::Secret(secret.map(Value::String))
    }
}

impl From<&str> for ExportValue {
    fn from(value: &str) -> Self {
        Self::Literal(Value::String(value.to_string()))
    }
}

impl From<String> for ExportValue {
    fn from(value: String) -> Self {
        Self::Literal(Value::String(value))
    }
}

impl From<bool> for ExportValue {
    fn from(value: bool) -> Self {
        Self::Literal(Value::Bool(value))
    }
}

impl From<i64> for ExportValue {
    fn from(value: i64) -> Self {
        Self::Literal(Value::from(value))
    }
}

impl From<Value> for ExportValue {
    fn from(value: Value) -> Self {
        Self::Literal(value)
    }
}

/// A registered stack output.
#[derive(Debug, Clone)]
pub struct ExportRecord {
    /// Output name.
    pub name: ExportName,
    /// Whether the plaintext is withheld from listings.
    pub secret: bool,
    value: ExportValue,
}

impl ExportRecord {
    /// How the value is produced.
    #[must_use]
    pub const fn kind(&self) -> ExportKind {
        self.value.kind()
    }

    /// The exported value.
    #[must_use]
    pub const fn value(&self) -> &ExportValue {
        &self.value
    }

    /// Resources that must be provisioned before the value is known.
    #[must_use]
    pub fn dependencies(&self) -> BTreeSet<Urn> {
        match &self.value {
            ExportValue::Deferred(o) => o.dependencies().clone(),
            ExportValue::Literal(_) | ExportValue::Secret(_) => BTreeSet::new(),
        }
    }

    /// Rendering for listings: literals as JSON, deferred values as a
    /// placeholder, secrets always redacted.
    #[must_use]
    pub fn display_value(&self) -> String {
        if self.secret {
            return SECRET_MARKER.to_string();
        }
        match &self.value {
            ExportValue::Literal(v) => v.to_string(),
            ExportValue::Secret(_) => SECRET_MARKER.to_string(),
            ExportValue::Deferred(o) if o.origin() == OutputOrigin::Known => o
                .resolve(&ResolvedState::new())
                .map_or_else(|_| COMPUTED.to_string(), |v| v.to_string()),
            ExportValue::Deferred(_) => COMPUTED.to_string(),
        }
    }
}

/// A published value after deployment.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedExport {
    /// Plaintext value.
    Plain(Value),
    /// Value withheld from default listings.
    Secret(Secret<Value>),
}

/// Named outputs of a composition, in registration order.
#[derive(Debug, Clone, Default)]
pub struct ExportRegistry {
    records: Vec<ExportRecord>,
}

impl ExportRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a non-secret output.
    ///
    /// # Errors
    ///
    /// Returns [`ComposeError::NameCollision`] if the name is taken, or
    /// [`ComposeError::SecretLeak`] if the value carries a secret.
    pub fn export(&mut self, name: &str, value: impl Into<ExportValue>) -> Result<()> {
        let value = value.into();
        if value.is_secret() {
            return Err(ComposeError::secret_leak(format!(
                "export \"{name}\" carries a secret value; publish it with export_secret"
            )));
        }
        self.register(name, value, false)
    }

    /// Registers an output whose plaintext is withheld from listings.
    ///
    /// # Errors
    ///
    /// Returns [`ComposeError::NameCollision`] if the name is taken.
    pub fn export_secret(&mut self, name: &str, value: impl Into<ExportValue>) -> Result<()> {
        self.register(name, value.into().into_secret(), true)
    }

    fn register(&mut self, name: &str, value: ExportValue, secret: bool) -> Result<()> {
        if self.get(name).is_some() {
            return Err(ComposeError::NameCollision {
                kind: "export",
                name: name.to_string(),
            });
        }
        tracing::debug!(name, secret, kind = ?value.kind(), "registered export");
        self.records.push(ExportRecord {
            name: ExportName::new(name),
            secret,
            value,
        });
        Ok(())
    }

    /// Looks up an export by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ExportRecord> {
        self.records.iter().find(|r| r.name.as_str() == name)
    }

    /// Iterates in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &ExportRecord> {
        self.records.iter()
    }

    /// Number of exports.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` if nothing is exported.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Produces every published value. Engine side only.
    ///
    /// # Errors
    ///
    /// Returns an error if a deferred value cannot be resolved yet.
    pub fn resolve_all(&self, state: &ResolvedState) -> Result<Vec<(ExportName, ResolvedExport)>> {
        self.records
            .iter()
            .map(|record| {
                let value = match &record.value {
                    ExportValue::Literal(v) => v.clone(),
                    ExportValue::Secret(s) => s.expose().clone(),
                    ExportValue::Deferred(o) => o.resolve(state)?,
                };
                let resolved = if record.secret {
                    ResolvedExport::Secret(Secret::new(value))
                } else {
                    ResolvedExport::Plain(value)
                };
                Ok((record.name.clone(), resolved))
            })
            .collect()
    }
}
