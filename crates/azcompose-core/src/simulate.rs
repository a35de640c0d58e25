//! In-process engine double.
//!
//! The real orchestration engine lives outside this crate. The
//! [`SimulatedEngine`] stands in for it in tests and previews: it walks a
//! [`Composition`] in dependency order, resolves each declaration's inputs
//! against what has been provisioned so far, asks a [`Provisioner`] for the
//! resulting attributes, and finally resolves component outputs and stack
//! exports.

use std::collections::{BTreeMap, HashMap};
use std::future::Future;
use std::time::Duration;

use azcompose_common::error::{ComposeError, Result};
use azcompose_common::types::{ExportName, ResourceName, TypeToken, Urn};
use serde_json::{Value, json};
use tokio::sync::Mutex;

use crate::export::ResolvedExport;
use crate::output::ResolvedState;
use crate::resource::DeclarationMode;
use crate::secret::Secret;
use crate::stack::Composition;

/// A single create or lookup handed to a provisioner.
#[derive(Debug, Clone)]
pub struct ProvisionRequest {
    /// Node being provisioned.
    pub urn: Urn,
    /// Logical name.
    pub name: ResourceName,
    /// Provider type token.
    pub type_token: TypeToken,
    /// Create or look up.
    pub mode: DeclarationMode,
    /// Fully resolved input properties.
    pub inputs: Value,
}

/// Creates resources and answers lookups.
///
/// Implementors return the attribute object the provider reports for the
/// request; the engine records it under the request URN.
pub trait Provisioner: Send + Sync {
    /// Provisions one declaration.
    ///
    /// # Errors
    ///
    /// Returns [`ComposeError::Provider`] if the provider rejects the
    /// request.
    fn provision(&self, request: ProvisionRequest) -> impl Future<Output = Result<Value>> + Send;
}

/// Provisioner that echoes inputs back as attributes.
///
/// Every resource gets an `id` and a `name` unless its inputs or a
/// registered override already carry them. Overrides are merged on top of
/// the echoed inputs, keyed by logical name.
#[derive(Debug, Default)]
pub struct SimulatedProvisioner {
    overrides: HashMap<String, Value>,
    failures: HashMap<String, String>,
    delay: Option<Duration>,
    calls: Mutex<Vec<Urn>>,
}

impl SimulatedProvisioner {
    /// Creates a provisioner with no overrides.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds attributes reported for the named resource.
    #[must_use]
    pub fn with_attributes(mut self, name: &str, attributes: Value) -> Self {
        let _ = self.overrides.insert(name.to_string(), attributes);
        self
    }

    /// Makes provisioning of the named resource fail.
    #[must_use]
    pub fn failing(mut self, name: &str, message: &str) -> Self {
        let _ = self.failures.insert(name.to_string(), message.to_string());
        self
    }

    /// Waits this long before answering each request.
    #[must_use]
    pub const fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// URNs provisioned so far, in call order.
    pub async fn calls(&self) -> Vec<Urn> {
        self.calls.lock().await.clone()
    }
}

impl Provisioner for SimulatedProvisioner {
    async fn provision(&self, request: ProvisionRequest) -> Result<Value> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.calls.lock().await.push(request.urn.clone());
        if let Some(message) = self.failures.get(request.name.as_str()) {
            return Err(ComposeError::Provider {
                resource: request.urn.to_string(),
                message: message.clone(),
            });
        }

        let mut attributes = match request.inputs {
            Value::Object(map) => map,
            _ => serde_json::Map::new(),
        };
        let _ = attributes
            .entry("id")
            .or_insert_with(|| json!(format!("/simulated/{}/{}", request.type_token, request.name)));
        let _ = attributes
            .entry("name")
            .or_insert_with(|| json!(request.name.as_str()));
        if let Some(Value::Object(extra)) = self.overrides.get(request.name.as_str()) {
            for (k, v) in extra {
                let _ = attributes.insert(k.clone(), v.clone());
            }
        }
        Ok(Value::Object(attributes))
    }
}

/// Walks compositions against a provisioner.
#[derive(Debug)]
pub struct SimulatedEngine<P> {
    provisioner: P,
}

impl<P: Provisioner> SimulatedEngine<P> {
    /// Creates an engine over the given provisioner.
    pub const fn new(provisioner: P) -> Self {
        Self { provisioner }
    }

    /// The underlying provisioner.
    pub const fn provisioner(&self) -> &P {
        &self.provisioner
    }

    /// Provisions every declaration in dependency order, then resolves
    /// component outputs and exports.
    ///
    /// # Errors
    ///
    /// Returns the first provider error, or [`ComposeError::Unresolved`]
    /// if a value cannot be resolved from what was provisioned.
    pub async fn deploy(&self, composition: &Composition) -> Result<Deployment> {
        let order = composition.graph().resolve_order()?;
        let mut state = ResolvedState::new();
        let mut created = Vec::new();

        for urn in &order {
            if composition.component_by_urn(urn).is_some() {
                state.insert(urn.clone(), json!({}));
                continue;
            }
            let Some(decl) = composition.declaration_by_urn(urn) else {
                continue;
            };
            let inputs = decl.properties.resolve(&state)?;
            let request = ProvisionRequest {
                urn: urn.clone(),
                name: decl.name.clone(),
                type_token: decl.type_token.clone(),
                mode: decl.mode,
                inputs,
            };
            let attributes = self.provisioner.provision(request).await?;
            tracing::info!(urn = %urn, mode = ?decl.mode, "provisioned");
            state.insert(urn.clone(), attributes);
            if decl.mode == DeclarationMode::Managed {
                created.push(Created {
                    urn: urn.clone(),
                    protect: decl.options.protect,
                });
            }
        }

        let mut components = BTreeMap::new();
        for component in composition.components() {
            let mut outputs = BTreeMap::new();
            for (key, output) in &component.outputs {
                let value = output.resolve(&state)?;
                let resolved = if output.is_secret() {
                    ResolvedExport::Secret(Secret::new(value))
                } else {
                    ResolvedExport::Plain(value)
                };
                let _ = outputs.insert(key.clone(), resolved);
            }
            let _ = components.insert(component.name.to_string(), outputs);
        }

        let exports = composition.exports().resolve_all(&state)?;
        tracing::info!(
            created = created.len(),
            exports = exports.len(),
            "deployment complete"
        );
        Ok(Deployment {
            state,
            created,
            components,
            exports,
        })
    }
}

#[derive(Debug, Clone)]
struct Created {
    urn: Urn,
    protect: bool,
}

/// The result of a simulated deployment.
#[derive(Debug, Clone)]
pub struct Deployment {
    state: ResolvedState,
    created: Vec<Created>,
    components: BTreeMap<String, BTreeMap<String, ResolvedExport>>,
    exports: Vec<(ExportName, ResolvedExport)>,
}

impl Deployment {
    /// Attributes of everything provisioned.
    #[must_use]
    pub const fn state(&self) -> &ResolvedState {
        &self.state
    }

    /// Managed resources created, in creation order.
    #[must_use]
    pub fn created(&self) -> Vec<&Urn> {
        self.created.iter().map(|c| &c.urn).collect()
    }

    /// A resolved stack export.
    #[must_use]
    pub fn export(&self, name: &str) -> Option<&ResolvedExport> {
        self.exports
            .iter()
            .find(|(n, _)| n.as_str() == name)
            .map(|(_, v)| v)
    }

    /// All resolved exports, in registration order.
    #[must_use]
    pub fn exports(&self) -> &[(ExportName, ResolvedExport)] {
        &self.exports
    }

    /// A resolved component output.
    #[must_use]
    pub fn component_output(&self, component: &str, output: &str) -> Option<&ResolvedExport> {
        self.components.get(component)?.get(output)
    }

    /// Tears down every created resource in reverse creation order.
    ///
    /// # Errors
    ///
    /// Returns [`ComposeError::Provider`] naming the first protected
    /// resource; nothing is removed in that case.
    pub fn destroy(&mut self) -> Result<usize> {
        if let Some(protected) = self.created.iter().find(|c| c.protect) {
            return Err(ComposeError::Provider {
                resource: protected.urn.to_string(),
                message: "resource is protected; clear the protect option before destroying".into(),
            });
        }
        let removed = self.created.len();
        for created in self.created.drain(..).rev() {
            tracing::info!(urn = %created.urn, "destroyed");
        }
        self.state = ResolvedState::new();
        self.components.clear();
        self.exports.clear();
        Ok(removed)
    }
}
