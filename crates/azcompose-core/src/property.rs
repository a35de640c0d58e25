//! Property bags attached to declarations.
//!
//! Typed builders in the schema crate lower themselves into a
//! [`PropertyMap`]. Values stay unresolved: deferred parts keep their
//! [`Output`] and only the engine turns the map into plain JSON.

use std::collections::{BTreeMap, BTreeSet};

use azcompose_common::constants::SECRET_MARKER;
use azcompose_common::error::{ComposeError, Result};
use azcompose_common::types::Urn;
use serde::Serialize;
use serde_json::{Map, Value, json};

use crate::asset::FileAsset;
use crate::output::{Input, Output, ResolvedState};
use crate::secret::Secret;

/// One property value.
#[derive(Debug, Clone)]
pub enum PropertyValue {
    /// Explicitly unset.
    Null,
    /// Plain literal.
    Literal(Value),
    /// Secret literal.
    Secret(Secret<Value>),
    /// Value produced by another declaration.
    Deferred(Output<Value>),
    /// Local file uploaded by the engine.
    Asset(FileAsset),
    /// Ordered list.
    Array(Vec<PropertyValue>),
    /// Nested object.
    Object(PropertyMap),
    /// A value that could not be serialized. Declaring it fails.
    Invalid(String),
}

impl PropertyValue {
    /// Adds every resource this value references to `deps`.
    pub fn collect_dependencies(&self, deps: &mut BTreeSet<Urn>) {
        match self {
            Self::Deferred(output) => deps.extend(output.dependencies().iter().cloned()),
            Self::Array(items) => items.iter().for_each(|v| v.collect_dependencies(deps)),
            Self::Object(map) => map.values().for_each(|v| v.collect_dependencies(deps)),
            Self::Null | Self::Literal(_) | Self::Secret(_) | Self::Asset(_) | Self::Invalid(_) => {}
        }
    }

    /// Returns `true` if any part of the value is secret.
    #[must_use]
    pub fn is_secret(&self) -> bool {
        match self {
            Self::Secret(_) => true,
            Self::Deferred(output) => output.is_secret(),
            Self::Array(items) => items.iter().any(Self::is_secret),
            Self::Object(map) => map.values().any(Self::is_secret),
            Self::Null | Self::Literal(_) | Self::Asset(_) | Self::Invalid(_) => false,
        }
    }

    /// Returns `true` if any leaf is a plaintext literal.
    #[must_use]
    pub fn has_plain_literal(&self) -> bool {
        match self {
            Self::Literal(_) => true,
            Self::Array(items) => items.iter().any(Self::has_plain_literal),
            Self::Object(map) => map.values().any(Self::has_plain_literal),
            Self::Null | Self::Secret(_) | Self::Deferred(_) | Self::Asset(_) | Self::Invalid(_) => {
                false
            }
        }
    }

    /// Path and message of the first value that failed to lower.
    fn find_invalid(&self, path: String) -> Option<(String, String)> {
        match self {
            Self::Invalid(message) => Some((path, message.clone())),
            Self::Array(items) => items
                .iter()
                .enumerate()
                .find_map(|(i, v)| v.find_invalid(format!("{path}.{i}"))),
            Self::Object(map) => map
                .entries
                .iter()
                .find_map(|(k, v)| v.find_invalid(format!("{path}.{k}"))),
            _ => None,
        }
    }

    /// Renders the value for previews and engine hand-off: deferred parts
    /// become `{"$deferred": {...}}` markers and secrets are redacted.
    #[must_use]
    pub fn to_plan_json(&self) -> Value {
        match self {
            Self::Null | Self::Invalid(_) => Value::Null,
            Self::Literal(v) => v.clone(),
            Self::Secret(_) => Value::String(SECRET_MARKER.to_string()),
            Self::Deferred(output) => json!({
                "$deferred": {
                    "origin": output.origin(),
                    "secret": output.is_secret(),
                    "dependsOn": output.dependencies(),
                }
            }),
            Self::Asset(asset) => json!({ "$asset": asset.path() }),
            Self::Array(items) => Value::Array(items.iter().map(Self::to_plan_json).collect()),
            Self::Object(map) => map.to_plan_json(),
        }
    }

    /// Produces the plain JSON the provider receives. Engine side only.
    ///
    /// # Errors
    ///
    /// Returns an error if a deferred part cannot be resolved yet.
    pub fn resolve(&self, state: &ResolvedState) -> Result<Value> {
        Ok(match self {
            Self::Null => Value::Null,
            Self::Invalid(message) => {
                return Err(ComposeError::InvalidProperty {
                    context: message.clone(),
                });
            }
            Self::Literal(v) => v.clone(),
            Self::Secret(s) => s.expose().clone(),
            Self::Deferred(output) => output.resolve(state)?,
            Self::Asset(asset) => json!({ "$asset": asset.path() }),
            Self::Array(items) => Value::Array(
                items
                    .iter()
                    .map(|v| v.resolve(state))
                    .collect::<Result<Vec<_>>>()?,
            ),
            Self::Object(map) => map.resolve(state)?,
        })
    }
}

/// Lowers an input into a property value.
impl<T> From<Input<T>> for PropertyValue
where
    T: Serialize + 'static,
{
    fn from(input: Input<T>) -> Self {
        match input {
            Input::Value(v) => literal(&v),
            Input::Secret(s) => match serde_json::to_value(s.expose()) {
                Ok(v) => Self::Secret(Secret::new(v)),
                Err(e) => Self::Invalid(format!("secret literal is not serializable: {e}")),
            },
            Input::Output(o) => Self::Deferred(o.into_value()),
        }
    }
}

fn literal<T: Serialize>(value: &T) -> PropertyValue {
    match serde_json::to_value(value) {
        Ok(v) => PropertyValue::Literal(v),
        Err(e) => PropertyValue::Invalid(format!("literal is not serializable: {e}")),
    }
}

impl<T: Serialize + 'static> From<Output<T>> for PropertyValue {
    fn from(output: Output<T>) -> Self {
        Self::Deferred(output.into_value())
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        Self::Literal(Value::String(value.to_string()))
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        Self::Literal(Value::String(value))
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        Self::Literal(Value::Bool(value))
    }
}

impl From<i64> for PropertyValue {
    fn from(value: i64) -> Self {
        Self::Literal(Value::from(value))
    }
}

impl From<u32> for PropertyValue {
    fn from(value: u32) -> Self {
        Self::Literal(Value::from(value))
    }
}

impl From<Value> for PropertyValue {
    fn from(value: Value) -> Self {
        Self::Literal(value)
    }
}

impl From<FileAsset> for PropertyValue {
    fn from(asset: FileAsset) -> Self {
        Self::Asset(asset)
    }
}

impl From<PropertyMap> for PropertyValue {
    fn from(map: PropertyMap) -> Self {
        Self::Object(map)
    }
}

impl<V: Into<Self>> From<Vec<V>> for PropertyValue {
    fn from(items: Vec<V>) -> Self {
        Self::Array(items.into_iter().map(Into::into).collect())
    }
}

/// Ordered property name to value mapping.
#[derive(Debug, Clone, Default)]
pub struct PropertyMap {
    entries: BTreeMap<String, PropertyValue>,
}

impl PropertyMap {
    /// Creates an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a property, builder style.
    #[must_use]
    pub fn with(mut self, key: &str, value: impl Into<PropertyValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Sets a property only when a value is given.
    #[must_use]
    pub fn with_optional<V: Into<PropertyValue>>(self, key: &str, value: Option<V>) -> Self {
        match value {
            Some(v) => self.with(key, v),
            None => self,
        }
    }

    /// Sets a property.
    pub fn insert(&mut self, key: &str, value: impl Into<PropertyValue>) {
        let _ = self.entries.insert(key.to_string(), value.into());
    }

    /// Iterates over the values.
    pub fn values(&self) -> impl Iterator<Item = &PropertyValue> {
        self.entries.values()
    }

    /// Returns a top-level property.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&PropertyValue> {
        self.entries.get(key)
    }

    /// Returns a nested property by dotted path (`osProfile.adminPassword`).
    #[must_use]
    pub fn get_path(&self, path: &str) -> Option<&PropertyValue> {
        let mut segments = path.split('.');
        let mut current = self.entries.get(segments.next()?)?;
        for segment in segments {
            current = match current {
                PropertyValue::Object(map) => map.entries.get(segment)?,
                PropertyValue::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
                _ => return None,
            };
        }
        Some(current)
    }

    /// Mutable variant of [`PropertyMap::get_path`].
    pub fn get_path_mut(&mut self, path: &str) -> Option<&mut PropertyValue> {
        let mut segments = path.split('.');
        let mut current = self.entries.get_mut(segments.next()?)?;
        for segment in segments {
            current = match current {
                PropertyValue::Object(map) => map.entries.get_mut(segment)?,
                PropertyValue::Array(items) => items.get_mut(segment.parse::<usize>().ok()?)?,
                _ => return None,
            };
        }
        Some(current)
    }

    /// Fails on the first value that could not be lowered.
    ///
    /// # Errors
    ///
    /// Returns [`ComposeError::InvalidProperty`] naming the property path.
    pub fn check(&self) -> Result<()> {
        match self
            .entries
            .iter()
            .find_map(|(k, v)| v.find_invalid(k.clone()))
        {
            Some((path, message)) => Err(ComposeError::InvalidProperty {
                context: format!("\"{path}\": {message}"),
            }),
            None => Ok(()),
        }
    }

    /// Every resource referenced anywhere in the map.
    #[must_use]
    pub fn dependencies(&self) -> BTreeSet<Urn> {
        let mut deps = BTreeSet::new();
        self.entries
            .values()
            .for_each(|v| v.collect_dependencies(&mut deps));
        deps
    }

    /// Iterates over top-level properties.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &PropertyValue)> {
        self.entries.iter()
    }

    /// Number of top-level properties.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no property is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// See [`PropertyValue::to_plan_json`].
    #[must_use]
    pub fn to_plan_json(&self) -> Value {
        Value::Object(
            self.entries
                .iter()
                .map(|(k, v)| (k.clone(), v.to_plan_json()))
                .collect::<Map<_, _>>(),
        )
    }

    /// See [`PropertyValue::resolve`].
    ///
    /// # Errors
    ///
    /// Returns an error if a deferred part cannot be resolved yet.
    pub fn resolve(&self, state: &ResolvedState) -> Result<Value> {
        let mut out = Map::new();
        for (k, v) in &self.entries {
            let _ = out.insert(k.clone(), v.resolve(state)?);
        }
        Ok(Value::Object(out))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_paths_resolve() {
        let map = PropertyMap::new().with(
            "osProfile",
            PropertyMap::new().with("adminUsername", "webserver"),
        );
        let value = map.get_path("osProfile.adminUsername").expect("path");
        assert!(matches!(value, PropertyValue::Literal(Value::String(s)) if s == "webserver"));
        assert!(map.get_path("osProfile.missing").is_none());
    }

    #[test]
    fn array_paths_resolve() {
        let map = PropertyMap::new().with(
            "subnets",
            vec![PropertyMap::new().with("name", "default")],
        );
        assert!(map.get_path("subnets.0.name").is_some());
        assert!(map.get_path("subnets.1.name").is_none());
    }

    #[test]
    fn plan_json_redacts_secrets() {
        let map = PropertyMap::new()
            .with("value", PropertyValue::Secret(Secret::new(Value::from("hunter2"))))
            .with("endDate", "2099-01-01T00:00:00Z");
        let rendered = map.to_plan_json().to_string();
        assert!(!rendered.contains("hunter2"), "got: {rendered}");
        assert!(rendered.contains(SECRET_MARKER));
    }

    #[test]
    fn plain_literal_detection_is_recursive() {
        let secret_only = PropertyValue::Object(
            PropertyMap::new().with("k", PropertyValue::Secret(Secret::new(Value::from(1)))),
        );
        assert!(!secret_only.has_plain_literal());
        assert!(secret_only.is_secret());
        let mixed = PropertyValue::from(vec![PropertyValue::from("x")]);
        assert!(mixed.has_plain_literal());
    }

    fn unserializable() -> Input<BTreeMap<Vec<u8>, i32>> {
        Input::Value(BTreeMap::from([(vec![1_u8], 1)]))
    }

    #[test]
    fn unserializable_literal_is_reported_with_its_path() {
        let map = PropertyMap::new()
            .with("name", "ok")
            .with("tags", PropertyMap::new().with("inner", unserializable()));
        let err = map.check().unwrap_err();
        assert!(
            matches!(&err, ComposeError::InvalidProperty { context } if context.contains("tags.inner")),
            "got: {err}"
        );
        assert!(PropertyMap::new().with("name", "ok").check().is_ok());
    }

    #[test]
    fn invalid_value_never_resolves() {
        let value = PropertyValue::from(unserializable());
        assert!(value.resolve(&ResolvedState::new()).is_err());
    }

    #[test]
    fn assets_render_as_paths() {
        let map = PropertyMap::new().with("source", FileAsset::new("./wwwroot/index.html"));
        assert_eq!(
            map.to_plan_json()["source"]["$asset"],
            Value::from("./wwwroot/index.html")
        );
    }
}
