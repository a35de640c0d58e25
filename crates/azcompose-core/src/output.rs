//! Deferred outputs: values only known once the engine has provisioned
//! the resources they come from.
//!
//! An [`Output`] is a recipe, not a value. Transformations registered with
//! [`Output::map`], [`Output::try_map`], [`Output::combine`] and
//! [`Output::all`] are stored and only run when the engine calls
//! [`Output::resolve`] against a [`ResolvedState`] that contains every
//! resource the output depends on. Nothing in the composition phase can
//! block on or read an output.

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::sync::Arc;

use azcompose_common::error::{ComposeError, Result};
use azcompose_common::types::Urn;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::secret::Secret;

/// Attribute values of provisioned resources, keyed by URN.
///
/// Filled in by the engine as it walks the graph; read by outputs when
/// they are resolved.
#[derive(Debug, Clone, Default)]
pub struct ResolvedState {
    resources: HashMap<Urn, Value>,
}

impl ResolvedState {
    /// Creates an empty state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the attributes of a provisioned resource.
    pub fn insert(&mut self, urn: Urn, attributes: Value) {
        let _ = self.resources.insert(urn, attributes);
    }

    /// Returns `true` if the resource has been provisioned.
    #[must_use]
    pub fn contains(&self, urn: &Urn) -> bool {
        self.resources.contains_key(urn)
    }

    /// Returns all attributes of a provisioned resource.
    #[must_use]
    pub fn attributes(&self, urn: &Urn) -> Option<&Value> {
        self.resources.get(urn)
    }

    /// Looks up a dotted attribute path (`primaryEndpoints.web`,
    /// `subnets.0.id`) on a provisioned resource.
    ///
    /// # Errors
    ///
    /// Returns [`ComposeError::Unresolved`] if the resource is not
    /// provisioned or the path does not exist.
    pub fn attribute(&self, urn: &Urn, path: &str) -> Result<&Value> {
        let unresolved = || ComposeError::Unresolved {
            resource: urn.to_string(),
            attribute: path.to_string(),
        };
        let mut current = self.resources.get(urn).ok_or_else(unresolved)?;
        for segment in path.split('.').filter(|s| !s.is_empty()) {
            current = match current {
                Value::Object(map) => map.get(segment),
                Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
                _ => None,
            }
            .ok_or_else(unresolved)?;
        }
        Ok(current)
    }

    /// Number of provisioned resources.
    #[must_use]
    pub fn len(&self) -> usize {
        self.resources.len()
    }

    /// Returns `true` if nothing has been provisioned.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }
}

/// How an output value comes into being.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputOrigin {
    /// A value already known at composition time.
    Known,
    /// A resource attribute, passed through untouched.
    Attribute,
    /// The result of a transformation over other outputs.
    Derived,
}

type Resolver<T> = Arc<dyn Fn(&ResolvedState) -> Result<T> + Send + Sync>;

/// A value produced by the engine after provisioning.
pub struct Output<T> {
    resolver: Resolver<T>,
    deps: BTreeSet<Urn>,
    secret: bool,
    origin: OutputOrigin,
}

impl<T> Clone for Output<T> {
    fn clone(&self) -> Self {
        Self {
            resolver: Arc::clone(&self.resolver),
            deps: self.deps.clone(),
            secret: self.secret,
            origin: self.origin,
        }
    }
}

impl<T> fmt::Debug for Output<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Output")
            .field("origin", &self.origin)
            .field("secret", &self.secret)
            .field("dependencies", &self.deps)
            .finish_non_exhaustive()
    }
}

impl<T: 'static> Output<T> {
    /// An output whose value is already known.
    pub fn known(value: T) -> Self
    where
        T: Clone + Send + Sync,
    {
        Self {
            resolver: Arc::new(move |_: &ResolvedState| Ok(value.clone())),
            deps: BTreeSet::new(),
            secret: false,
            origin: OutputOrigin::Known,
        }
    }

    /// A known output that stays secret through every transformation.
    pub fn from_secret(secret: Secret<T>) -> Self
    where
        T: Clone + Send + Sync,
    {
        Self::known(secret.into_exposed()).as_secret()
    }

    /// An attribute of a declared resource.
    pub(crate) fn attribute(urn: Urn, path: impl Into<String>, secret: bool) -> Self
    where
        T: DeserializeOwned,
    {
        let path = path.into();
        let key = urn.clone();
        Self {
            resolver: Arc::new(move |state: &ResolvedState| {
                let raw = state.attribute(&key, &path)?;
                Ok(serde_json::from_value(raw.clone())?)
            }),
            deps: BTreeSet::from([urn]),
            secret,
            origin: OutputOrigin::Attribute,
        }
    }

    /// Registers a transformation to run once the value is available.
    pub fn map<U, F>(self, f: F) -> Output<U>
    where
        U: 'static,
        F: Fn(T) -> U + Send + Sync + 'static,
    {
        let inner = self.resolver;
        Output {
            resolver: Arc::new(move |state: &ResolvedState| inner(state).map(&f)),
            deps: self.deps,
            secret: self.secret,
            origin: OutputOrigin::Derived,
        }
    }

    /// Like [`Output::map`], for transformations that can fail.
    pub fn try_map<U, F>(self, f: F) -> Output<U>
    where
        U: 'static,
        F: Fn(T) -> Result<U> + Send + Sync + 'static,
    {
        let inner = self.resolver;
        Output {
            resolver: Arc::new(move |state: &ResolvedState| inner(state).and_then(&f)),
            deps: self.deps,
            secret: self.secret,
            origin: OutputOrigin::Derived,
        }
    }

    /// Joins two outputs. The result depends on both and is secret if
    /// either is.
    pub fn combine<U, V, F>(self, other: Output<U>, f: F) -> Output<V>
    where
        U: 'static,
        V: 'static,
        F: Fn(T, U) -> V + Send + Sync + 'static,
    {
        let left = self.resolver;
        let right = other.resolver;
        let mut deps = self.deps;
        deps.extend(other.deps);
        Output {
            resolver: Arc::new(move |state: &ResolvedState| Ok(f(left(state)?, right(state)?))),
            deps,
            secret: self.secret || other.secret,
            origin: OutputOrigin::Derived,
        }
    }

    /// Joins any number of outputs into one output of a vector.
    pub fn all(outputs: impl IntoIterator<Item = Self>) -> Output<Vec<T>> {
        let outputs: Vec<Self> = outputs.into_iter().collect();
        let deps = outputs.iter().flat_map(|o| o.deps.iter().cloned()).collect();
        let secret = outputs.iter().any(|o| o.secret);
        let resolvers: Vec<Resolver<T>> = outputs.into_iter().map(|o| o.resolver).collect();
        Output {
            resolver: Arc::new(move |state: &ResolvedState| {
                resolvers.iter().map(|r| r(state)).collect()
            }),
            deps,
            secret,
            origin: OutputOrigin::Derived,
        }
    }

    /// Marks the output secret.
    #[must_use]
    pub fn as_secret(mut self) -> Self {
        self.secret = true;
        self
    }

    /// Erases the value type into JSON, keeping origin and secrecy.
    pub fn into_value(self) -> Output<Value>
    where
        T: Serialize,
    {
        let origin = self.origin;
        let mut erased = self.try_map(|v| Ok(serde_json::to_value(v)?));
        erased.origin = origin;
        erased
    }

    /// Evaluates the output against provisioned state.
    ///
    /// Only the engine calls this, after every dependency has been
    /// provisioned. Registered transformations run here and nowhere else.
    ///
    /// # Errors
    ///
    /// Returns [`ComposeError::Unresolved`] if a dependency is not yet in
    /// `state`, or any error raised by a transformation.
    pub fn resolve(&self, state: &ResolvedState) -> Result<T> {
        if let Some(missing) = self.deps.iter().find(|urn| !state.contains(urn)) {
            return Err(ComposeError::Unresolved {
                resource: missing.to_string(),
                attribute: "*".into(),
            });
        }
        (self.resolver)(state)
    }
}

impl<T> Output<T> {
    /// Returns `true` if the value must be treated as secret.
    pub const fn is_secret(&self) -> bool {
        self.secret
    }

    /// How the value is produced.
    pub const fn origin(&self) -> OutputOrigin {
        self.origin
    }

    /// Resources that must be provisioned before the value is known.
    pub const fn dependencies(&self) -> &BTreeSet<Urn> {
        &self.deps
    }
}

/// A property argument: a literal, a secret literal, or a deferred output.
#[derive(Debug, Clone)]
pub enum Input<T> {
    /// Plain literal.
    Value(T),
    /// Literal that must be treated as secret.
    Secret(Secret<T>),
    /// Value known only after provisioning.
    Output(Output<T>),
}

impl<T> Input<T> {
    /// Returns `true` if the input carries a secret.
    pub const fn is_secret(&self) -> bool {
        match self {
            Self::Value(_) => false,
            Self::Secret(_) => true,
            Self::Output(o) => o.is_secret(),
        }
    }
}

impl<T: Clone + Send + Sync + 'static> Input<T> {
    /// Lifts the input into an output.
    pub fn into_output(self) -> Output<T> {
        match self {
            Self::Value(v) => Output::known(v),
            Self::Secret(s) => Output::from_secret(s),
            Self::Output(o) => o,
        }
    }
}

impl<T> From<Output<T>> for Input<T> {
    fn from(output: Output<T>) -> Self {
        Self::Output(output)
    }
}

impl<T> From<&Output<T>> for Input<T> {
    fn from(output: &Output<T>) -> Self {
        Self::Output(output.clone())
    }
}

impl<T> From<Secret<T>> for Input<T> {
    fn from(secret: Secret<T>) -> Self {
        Self::Secret(secret)
    }
}

impl From<String> for Input<String> {
    fn from(value: String) -> Self {
        Self::Value(value)
    }
}

impl From<&String> for Input<String> {
    fn from(value: &String) -> Self {
        Self::Value(value.clone())
    }
}

impl From<&str> for Input<String> {
    fn from(value: &str) -> Self {
        Self::Value(value.to_string())
    }
}

impl From<bool> for Input<bool> {
    fn from(value: bool) -> Self {
        Self::Value(value)
    }
}

impl From<i64> for Input<i64> {
    fn from(value: i64) -> Self {
        Self::Value(value)
    }
}

impl From<u32> for Input<u32> {
    fn from(value: u32) -> Self {
        Self::Value(value)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use azcompose_common::types::{ResourceName, TypeToken};
    use serde_json::json;

    use super::*;

    fn urn(name: &str) -> Urn {
        Urn::new(
            "dev",
            "test",
            &TypeToken::new("test:index:Thing"),
            &ResourceName::new(name),
        )
    }

    #[test]
    fn map_is_not_evaluated_until_resolved() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let host: Output<String> = Output::attribute(urn("ep"), "hostName", false);
        let url = host.map(move |h| {
            let _ = counter.fetch_add(1, Ordering::SeqCst);
            format!("https://{h}")
        });
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(url.origin(), OutputOrigin::Derived);

        let mut state = ResolvedState::new();
        state.insert(urn("ep"), json!({ "hostName": "cdn.example.net" }));
        assert_eq!(url.resolve(&state).unwrap(), "https://cdn.example.net");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn resolve_before_dependency_is_unresolved() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let out: Output<String> = Output::attribute(urn("sa"), "name", false);
        let mapped = out.map(move |n| {
            let _ = counter.fetch_add(1, Ordering::SeqCst);
            n
        });
        let err = mapped.resolve(&ResolvedState::new()).unwrap_err();
        assert!(matches!(err, ComposeError::Unresolved { .. }), "got: {err}");
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn combine_unions_dependencies_and_secrecy() {
        let a: Output<String> = Output::attribute(urn("rg"), "name", false);
        let b: Output<String> = Output::attribute(urn("pw"), "result", true);
        let joined = a.combine(b, |rg, pw| format!("{rg}/{pw}"));
        assert!(joined.is_secret());
        assert_eq!(joined.dependencies().len(), 2);
    }

    #[test]
    fn all_collects_in_order() {
        let outputs = vec![
            Output::attribute(urn("a"), "v", false),
            Output::attribute(urn("b"), "v", false),
        ];
        let joined: Output<Vec<i64>> = Output::all(outputs);
        let mut state = ResolvedState::new();
        state.insert(urn("a"), json!({ "v": 1 }));
        state.insert(urn("b"), json!({ "v": 2 }));
        assert_eq!(joined.resolve(&state).unwrap(), vec![1, 2]);
    }

    #[test]
    fn attribute_path_walks_arrays() {
        let mut state = ResolvedState::new();
        state.insert(urn("vnet"), json!({ "subnets": [{ "id": "subnet-0" }] }));
        let id: Output<String> = Output::attribute(urn("vnet"), "subnets.0.id", false);
        assert_eq!(id.resolve(&state).unwrap(), "subnet-0");
    }

    #[test]
    fn secret_is_sticky_through_map() {
        let out = Output::from_secret(Secret::new("pw".to_string())).map(|s| s.len());
        assert!(out.is_secret());
        assert_eq!(out.resolve(&ResolvedState::new()).unwrap(), 2);
    }

    #[test]
    fn into_value_keeps_origin() {
        let out: Output<String> = Output::attribute(urn("sa"), "name", false);
        assert_eq!(out.into_value().origin(), OutputOrigin::Attribute);
    }

    #[test]
    fn input_secrecy() {
        assert!(!Input::<String>::from("plain").is_secret());
        assert!(Input::<String>::from(Secret::new("x".to_string())).is_secret());
    }
}
