//! The composition context.
//!
//! A [`Stack`] is created per composition from the settings the engine
//! hands in. Programs read configuration through it, declare resources and
//! components on it, and register exports with it. [`Stack::finish`]
//! validates the result into an immutable [`Composition`].
//!
//! Composition is synchronous and never contacts the cloud: no property
//! value is resolved here.

use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::rc::Rc;

use azcompose_common::config::StackSettings;
use azcompose_common::constants::CHILD_NAME_SEPARATOR;
use azcompose_common::error::{ComposeError, Result};
use azcompose_common::types::{ResourceName, TypeToken, Urn};
use serde::Serialize;
use serde_json::Value;

use crate::component::{ComponentBoundary, ComponentHandle, ComponentOutputs, ParentFrame};
use crate::config::{Config, ConfigRead, ReadLog};
use crate::export::{ExportKind, ExportRegistry, ExportValue};
use crate::graph::DependencyGraph;
use crate::property::{PropertyMap, PropertyValue};
use crate::resource::{DeclarationMode, Resource, ResourceDeclaration, ResourceKind, ResourceOptions};

/// A composition in progress.
#[derive(Debug)]
pub struct Stack {
    settings: Rc<StackSettings>,
    reads: ReadLog,
    scopes: HashSet<ScopedName>,
    declarations: Vec<ResourceDeclaration>,
    components: Vec<ComponentBoundary>,
    frames: Vec<ParentFrame>,
    exports: ExportRegistry,
    graph: DependencyGraph,
}

impl Stack {
    /// Creates an empty, isolated composition context.
    #[must_use]
    pub fn new(settings: StackSettings) -> Self {
        Self {
            settings: Rc::new(settings),
            reads: Rc::new(RefCell::new(Vec::new())),
            scopes: HashSet::new(),
            declarations: Vec::new(),
            components: Vec::new(),
            frames: Vec::new(),
            exports: ExportRegistry::new(),
            graph: DependencyGraph::new(),
        }
    }

    /// Runs a program against a fresh stack and validates the result.
    ///
    /// # Errors
    ///
    /// Returns the first composition error raised by the program or by
    /// validation. Nothing is handed to an engine in that case.
    pub fn run<F>(settings: StackSettings, program: F) -> Result<Composition>
    where
        F: FnOnce(&mut Self) -> Result<()>,
    {
        let span = tracing::info_span!("compose", project = %settings.project, stack = %settings.stack);
        let _guard = span.enter();
        let mut stack = Self::new(settings);
        program(&mut stack)?;
        stack.finish()
    }

    /// Project name.
    #[must_use]
    pub fn project(&self) -> &str {
        &self.settings.project
    }

    /// Stack name.
    #[must_use]
    pub fn stack_name(&self) -> &str {
        &self.settings.stack
    }

    /// Configuration reader for the project namespace.
    #[must_use]
    pub fn config(&self) -> Config {
        self.config_namespace(&self.settings.project)
    }

    /// Configuration reader for another namespace (`azure-native`).
    #[must_use]
    pub fn config_namespace(&self, namespace: &str) -> Config {
        Config::new(Rc::clone(&self.settings), namespace, Rc::clone(&self.reads))
    }

    fn scoped(&self, name: &str) -> ScopedName {
        (self.frames.last().map(|f| f.urn.clone()), name.to_string())
    }

    /// Checks `name` is free in the current scope and returns its display
    /// name. Uniqueness is per parent, so a child never collides with a
    /// declaration outside its component.
    fn check_name(&self, kind: &'static str, name: &str) -> Result<ResourceName> {
        let display = self.frames.last().map_or_else(
            || ResourceName::new(name),
            |frame| ResourceName::new(format!("{}{CHILD_NAME_SEPARATOR}{name}", frame.name)),
        );
        if self.scopes.contains(&self.scoped(name)) {
            return Err(ComposeError::NameCollision {
                kind,
                name: display.to_string(),
            });
        }
        Ok(display)
    }

    fn claim_name(&mut self, name: &str) {
        let key = self.scoped(name);
        let _ = self.scopes.insert(key);
    }

    fn urn_for(&self, type_token: &TypeToken, name: &str) -> Urn {
        match self.frames.last() {
            Some(frame) => frame.urn.child(type_token, name),
            None => Urn::new(
                &self.settings.stack,
                &self.settings.project,
                type_token,
                &ResourceName::new(name),
            ),
        }
    }

    fn effective_options(&self, options: ResourceOptions, type_token: &TypeToken) -> ResourceOptions {
        match self.frames.last() {
            Some(frame) => options.inherit(&frame.options, type_token),
            None => options,
        }
    }

    /// Expands explicit dependencies on components to their descendants.
    fn expand_dependency(&self, urn: &Urn, into: &mut BTreeSet<Urn>) {
        let _ = into.insert(urn.clone());
        if let Some(component) = self.components.iter().find(|c| &c.urn == urn) {
            for child in &component.children {
                self.expand_dependency(child, into);
            }
        }
    }

    fn check_known(&self, deps: &BTreeSet<Urn>) -> Result<()> {
        match deps.iter().find(|urn| !self.graph.contains(urn)) {
            Some(unknown) => Err(ComposeError::UnknownResource {
                name: unknown.to_string(),
            }),
            None => Ok(()),
        }
    }

    fn attach(&mut self, urn: &Urn, deps: &BTreeSet<Urn>, parent: Option<&Urn>) -> Result<()> {
        let _ = self.graph.add_node(urn);
        for dep in deps {
            self.graph.add_dependency(urn, dep)?;
        }
        if let Some(parent) = parent {
            self.graph.add_dependency(urn, parent)?;
            if let Some(component) = self.components.iter_mut().find(|c| &c.urn == parent) {
                component.children.push(urn.clone());
            }
        }
        Ok(())
    }

    /// Declares a resource and returns its typed handle.
    ///
    /// Inside a component the logical name is scoped to the component and
    /// displayed with its prefix, and the component's options are inherited.
    ///
    /// # Errors
    ///
    /// - [`ComposeError::NameCollision`] if the logical name is taken in
    ///   the current scope.
    /// - [`ComposeError::InvalidProperty`] if a property value could not be
    ///   serialized.
    /// - [`ComposeError::SecretLeak`] if a plaintext literal is given for a
    ///   property the schema types as secret.
    /// - [`ComposeError::UnknownResource`] if a property or option refers to
    ///   a handle this stack never declared.
    pub fn declare<K: ResourceKind>(
        &mut self,
        name: &str,
        args: K,
        options: ResourceOptions,
    ) -> Result<K::Handle> {
        let logical = name;
        let name = self.check_name("resource", logical)?;
        let type_token = TypeToken::new(K::TYPE);
        let urn = self.urn_for(&type_token, logical);

        let mut properties = args.into_properties();
        properties.check().map_err(|e| match e {
            ComposeError::InvalidProperty { context } => ComposeError::InvalidProperty {
                context: format!("{context} on {name}"),
            },
            other => other,
        })?;
        guard_secret_inputs(&mut properties, K::SECRET_INPUTS, &name)?;

        let options = self.effective_options(options, &type_token);
        let mut deps = properties.dependencies();
        for explicit in &options.depends_on {
            self.expand_dependency(explicit, &mut deps);
        }
        if let Some(provider) = &options.provider {
            let _ = deps.insert(provider.urn.clone());
        }
        self.check_known(&deps)?;

        let parent = self.frames.last().map(|f| f.urn.clone());
        self.attach(&urn, &deps, parent.as_ref())?;
        tracing::debug!(
            urn = %urn,
            dependencies = deps.len(),
            protect = options.protect,
            mode = ?K::MODE,
            "declared resource"
        );

        self.claim_name(logical);
        self.declarations.push(ResourceDeclaration {
            urn: urn.clone(),
            name: name.clone(),
            type_token: type_token.clone(),
            mode: K::MODE,
            properties,
            options,
            parent,
            dependencies: deps,
        });
        Ok(K::Handle::from(Resource::new(
            urn,
            name,
            type_token,
            K::SECRET_OUTPUTS,
        )))
    }

    /// Opens a component boundary, declares its children through `build`,
    /// and registers the outputs `build` returns.
    ///
    /// Child names are scoped to the component: their URNs carry the
    /// component's type and name, and they display as `<component>-<child>`.
    /// The same component can be instantiated several times under different
    /// names. `options` is applied to every child. If `build` fails, the
    /// boundary and everything declared inside it are removed again.
    ///
    /// # Errors
    ///
    /// Returns [`ComposeError::NameCollision`] if the component name is
    /// taken, or any error raised while declaring the children.
    pub fn component<O, F>(
        &mut self,
        name: &str,
        type_token: &str,
        options: ResourceOptions,
        build: F,
    ) -> Result<ComponentHandle<O>>
    where
        O: ComponentOutputs,
        F: FnOnce(&mut Self) -> Result<O>,
    {
        let logical = name;
        let name = self.check_name("component", logical)?;
        let type_token = TypeToken::new(type_token);
        let urn = self.urn_for(&type_token, logical);
        let options = self.effective_options(options, &type_token);

        let mut deps = BTreeSet::new();
        for explicit in &options.depends_on {
            self.expand_dependency(explicit, &mut deps);
        }
        self.check_known(&deps)?;
        let checkpoint = self.checkpoint();
        let parent = self.frames.last().map(|f| f.urn.clone());
        self.attach(&urn, &deps, parent.as_ref())?;
        self.claim_name(logical);

        tracing::debug!(urn = %urn, protect = options.protect, "opened component");
        self.components.push(ComponentBoundary {
            urn: urn.clone(),
            name: name.clone(),
            type_token: type_token.clone(),
            options: options.clone(),
            parent,
            children: Vec::new(),
            outputs: BTreeMap::new(),
        });
        self.frames.push(ParentFrame {
            urn: urn.clone(),
            name: name.clone(),
            options,
        });
        let built = build(self);
        let _ = self.frames.pop();
        let outputs = match built {
            Ok(outputs) => outputs,
            Err(err) => {
                tracing::debug!(urn = %urn, error = %err, "component failed, rolling back");
                self.rollback(checkpoint);
                return Err(err);
            }
        };

        if let Some(boundary) = self.components.iter_mut().find(|c| c.urn == urn) {
            for (key, value) in outputs.outputs() {
                let _ = boundary.outputs.insert(key.to_string(), value);
            }
            tracing::debug!(
                urn = %urn,
                children = boundary.children.len(),
                outputs = boundary.outputs.len(),
                "closed component"
            );
        }
        Ok(ComponentHandle::new(urn, name, type_token, outputs))
    }

    fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            scopes: self.scopes.clone(),
            declarations: self.declarations.len(),
            components: self.components.len(),
            exports: self.exports.clone(),
            graph: self.graph.clone(),
        }
    }

    /// Drops everything registered since `checkpoint`, including the
    /// failed component's entry in its parent's children.
    fn rollback(&mut self, checkpoint: Checkpoint) {
        self.scopes = checkpoint.scopes;
        self.declarations.truncate(checkpoint.declarations);
        self.components.truncate(checkpoint.components);
        self.exports = checkpoint.exports;
        self.graph = checkpoint.graph;
        let graph = &self.graph;
        for component in &mut self.components {
            component.children.retain(|child| graph.contains(child));
        }
    }

    /// Registers a non-secret stack output.
    ///
    /// # Errors
    ///
    /// Returns [`ComposeError::NameCollision`] for a duplicate name or
    /// [`ComposeError::SecretLeak`] for a secret value.
    pub fn export(&mut self, name: &str, value: impl Into<ExportValue>) -> Result<()> {
        let value = value.into();
        if let ExportValue::Deferred(output) = &value {
            self.check_known(output.dependencies())?;
        }
        self.exports.export(name, value)
    }

    /// Registers a stack output withheld from default listings.
    ///
    /// # Errors
    ///
    /// Returns [`ComposeError::NameCollision`] for a duplicate name.
    pub fn export_secret(&mut self, name: &str, value: impl Into<ExportValue>) -> Result<()> {
        let value = value.into();
        if let ExportValue::Deferred(output) = &value {
            self.check_known(output.dependencies())?;
        }
        self.exports.export_secret(name, value)
    }

    /// Declarations registered so far.
    #[must_use]
    pub fn declarations(&self) -> &[ResourceDeclaration] {
        &self.declarations
    }

    /// Validates and freezes the composition.
    ///
    /// # Errors
    ///
    /// Returns any error found by [`crate::validator::validate`].
    pub fn finish(self) -> Result<Composition> {
        let reads = self.reads.borrow().clone();
        let composition = Composition {
            settings: (*self.settings).clone(),
            declarations: self.declarations,
            components: self.components,
            exports: self.exports,
            graph: self.graph,
            config_reads: reads,
        };
        crate::validator::validate(&composition)?;
        tracing::info!(
            resources = composition.declarations.len(),
            components = composition.components.len(),
            exports = composition.exports.len(),
            "composition validated"
        );
        Ok(composition)
    }
}

fn guard_secret_inputs(
    properties: &mut PropertyMap,
    secret_paths: &[&str],
    name: &ResourceName,
) -> Result<()> {
    for path in secret_paths {
        let Some(value) = properties.get_path_mut(path) else {
            continue;
        };
        match value {
            PropertyValue::Deferred(output) if !output.is_secret() => {
                tracing::debug!(resource = %name, property = path, "marking deferred input secret");
                *output = output.clone().as_secret();
            }
            other if other.has_plain_literal() => {
                return Err(ComposeError::secret_leak(format!(
                    "property \"{path}\" of {name} expects a secret but received a plaintext literal"
                )));
            }
            _ => {}
        }
    }
    Ok(())
}

/// A logical name within the scope of its parent, if any.
type ScopedName = (Option<Urn>, String);

/// State captured before a component runs, restored if it fails.
#[derive(Debug)]
struct Checkpoint {
    scopes: HashSet<ScopedName>,
    declarations: usize,
    components: usize,
    exports: ExportRegistry,
    graph: DependencyGraph,
}

/// A validated composition, ready for an engine.
#[derive(Debug, Clone)]
pub struct Composition {
    pub(crate) settings: StackSettings,
    pub(crate) declarations: Vec<ResourceDeclaration>,
    pub(crate) components: Vec<ComponentBoundary>,
    pub(crate) exports: ExportRegistry,
    pub(crate) graph: DependencyGraph,
    pub(crate) config_reads: Vec<ConfigRead>,
}

impl Composition {
    /// Stack settings the composition was built from.
    #[must_use]
    pub const fn settings(&self) -> &StackSettings {
        &self.settings
    }

    /// All resource declarations, in declaration order.
    #[must_use]
    pub fn declarations(&self) -> &[ResourceDeclaration] {
        &self.declarations
    }

    /// All component boundaries, in registration order.
    #[must_use]
    pub fn components(&self) -> &[ComponentBoundary] {
        &self.components
    }

    /// The export registry.
    #[must_use]
    pub const fn exports(&self) -> &ExportRegistry {
        &self.exports
    }

    /// The dependency graph.
    #[must_use]
    pub const fn graph(&self) -> &DependencyGraph {
        &self.graph
    }

    /// Configuration reads made while composing.
    #[must_use]
    pub fn config_reads(&self) -> &[ConfigRead] {
        &self.config_reads
    }

    /// Looks up a declaration by display name (`<component>-<child>` for
    /// children). Returns the first match if two scopes share a display name.
    #[must_use]
    pub fn declaration(&self, name: &str) -> Option<&ResourceDeclaration> {
        self.declarations.iter().find(|d| d.name.as_str() == name)
    }

    /// Looks up a declaration by URN.
    #[must_use]
    pub fn declaration_by_urn(&self, urn: &Urn) -> Option<&ResourceDeclaration> {
        self.declarations.iter().find(|d| &d.urn == urn)
    }

    /// Looks up a component by display name.
    #[must_use]
    pub fn component(&self, name: &str) -> Option<&ComponentBoundary> {
        self.components.iter().find(|c| c.name.as_str() == name)
    }

    /// Looks up a component by URN.
    #[must_use]
    pub fn component_by_urn(&self, urn: &Urn) -> Option<&ComponentBoundary> {
        self.components.iter().find(|c| &c.urn == urn)
    }

    /// Every declaration nested under a component, at any depth.
    #[must_use]
    pub fn descendants(&self, component: &Urn) -> Vec<&ResourceDeclaration> {
        let mut out = Vec::new();
        let mut pending = vec![component.clone()];
        while let Some(current) = pending.pop() {
            if let Some(boundary) = self.component_by_urn(&current) {
                for child in &boundary.children {
                    match self.declaration_by_urn(child) {
                        Some(decl) => out.push(decl),
                        None => pending.push(child.clone()),
                    }
                }
            }
        }
        out
    }

    /// Serializable snapshot for previews and engine hand-off, with
    /// declarations in dependency order and secrets redacted.
    ///
    /// # Errors
    ///
    /// Returns [`ComposeError::CyclicDependency`] if the graph has a cycle.
    pub fn plan(&self) -> Result<Plan> {
        let order = self.graph.resolve_order()?;
        let position: HashMap<&Urn, usize> = order.iter().enumerate().map(|(i, u)| (u, i)).collect();

        let mut resources: Vec<&ResourceDeclaration> = self.declarations.iter().collect();
        resources.sort_by_key(|d| position.get(&d.urn).copied().unwrap_or(usize::MAX));

        Ok(Plan {
            project: self.settings.project.clone(),
            stack: self.settings.stack.clone(),
            resources: resources
                .into_iter()
                .map(|d| PlannedResource {
                    urn: d.urn.clone(),
                    name: d.name.clone(),
                    type_token: d.type_token.clone(),
                    mode: d.mode,
                    parent: d.parent.clone(),
                    options: d.options.clone(),
                    depends_on: d.dependencies.iter().cloned().collect(),
                    properties: d.properties.to_plan_json(),
                })
                .collect(),
            components: self
                .components
                .iter()
                .map(|c| PlannedComponent {
                    urn: c.urn.clone(),
                    name: c.name.clone(),
                    type_token: c.type_token.clone(),
                    parent: c.parent.clone(),
                    protect: c.options.protect,
                    children: c.children.clone(),
                    outputs: c.output_names().map(ToString::to_string).collect(),
                })
                .collect(),
            exports: self
                .exports
                .iter()
                .map(|e| PlannedExport {
                    name: e.name.to_string(),
                    kind: e.kind(),
                    secret: e.secret,
                    value: e.display_value(),
                    depends_on: e.dependencies().into_iter().collect(),
                })
                .collect(),
            config: self.config_reads.clone(),
        })
    }
}

/// Serializable snapshot of a composition.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Plan {
    /// Project name.
    pub project: String,
    /// Stack name.
    pub stack: String,
    /// Declarations in dependency order.
    pub resources: Vec<PlannedResource>,
    /// Component boundaries.
    pub components: Vec<PlannedComponent>,
    /// Stack outputs.
    pub exports: Vec<PlannedExport>,
    /// Configuration reads.
    pub config: Vec<ConfigRead>,
}

/// One declaration in a [`Plan`].
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlannedResource {
    /// Unique identifier.
    pub urn: Urn,
    /// Logical name.
    pub name: ResourceName,
    /// Provider type token.
    #[serde(rename = "type")]
    pub type_token: TypeToken,
    /// Managed or lookup.
    pub mode: DeclarationMode,
    /// Enclosing component.
    pub parent: Option<Urn>,
    /// Effective options.
    pub options: ResourceOptions,
    /// Nodes this one waits for.
    pub depends_on: Vec<Urn>,
    /// Properties, deferred parts marked and secrets redacted.
    pub properties: Value,
}

/// One component in a [`Plan`].
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlannedComponent {
    /// Unique identifier.
    pub urn: Urn,
    /// Logical name.
    pub name: ResourceName,
    /// Component type token.
    #[serde(rename = "type")]
    pub type_token: TypeToken,
    /// Enclosing component.
    pub parent: Option<Urn>,
    /// Whether children are protected.
    pub protect: bool,
    /// Direct children.
    pub children: Vec<Urn>,
    /// Registered output names.
    pub outputs: Vec<String>,
}

/// One export in a [`Plan`].
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlannedExport {
    /// Output name.
    pub name: String,
    /// Literal, attribute, or derived.
    pub kind: ExportKind,
    /// Whether the value is withheld.
    pub secret: bool,
    /// Display rendering.
    pub value: String,
    /// Nodes the value waits for.
    pub depends_on: Vec<Urn>,
}
