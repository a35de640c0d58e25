//! Logic App workflows.

use azcompose_core::{Input, Output, PropertyMap, ResourceKind};
use serde_json::Value;

schema_enum! {
    /// Whether a workflow runs.
    WorkflowState {
        /// Triggers fire.
        Enabled => "Enabled",
        /// Triggers are ignored.
        Disabled => "Disabled",
    }
}

/// Arguments for a workflow.
#[derive(Debug, Clone)]
pub struct WorkflowArgs {
    resource_group_name: Input<String>,
    location: Option<Input<String>>,
    state: WorkflowState,
    definition: Option<Value>,
}

impl WorkflowArgs {
    /// An enabled workflow with no definition.
    #[must_use]
    pub fn new(resource_group_name: impl Into<Input<String>>) -> Self {
        Self {
            resource_group_name: resource_group_name.into(),
            location: None,
            state: WorkflowState::Enabled,
            definition: None,
        }
    }

    /// Azure region.
    #[must_use]
    pub fn location(mut self, location: impl Into<Input<String>>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Run state.
    #[must_use]
    pub const fn state(mut self, state: WorkflowState) -> Self {
        self.state = state;
        self
    }

    /// Workflow definition document, passed through untouched.
    #[must_use]
    pub fn definition(mut self, definition: Value) -> Self {
        self.definition = Some(definition);
        self
    }
}

impl ResourceKind for WorkflowArgs {
    type Handle = Workflow;
    const TYPE: &'static str = "azure-native:logic:Workflow";

    fn into_properties(self) -> PropertyMap {
        PropertyMap::new()
            .with("resourceGroupName", self.resource_group_name)
            .with_optional("location", self.location)
            .with("state", self.state)
            .with_optional("definition", self.definition)
    }
}

resource_handle! {
    /// A declared workflow.
    Workflow
}

impl Workflow {
    /// Endpoint that triggers the workflow.
    #[must_use]
    pub fn access_endpoint(&self) -> Output<String> {
        self.0.output("accessEndpoint")
    }
}
