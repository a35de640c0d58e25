//! Resource groups.

use azcompose_core::{Input, PropertyMap, ResourceKind};

/// Arguments for a resource group.
#[derive(Debug, Clone, Default)]
pub struct ResourceGroupArgs {
    location: Option<Input<String>>,
    resource_group_name: Option<Input<String>>,
}

impl ResourceGroupArgs {
    /// A resource group in the provider's default location with an
    /// auto-named physical name.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Azure region.
    #[must_use]
    pub fn location(mut self, location: impl Into<Input<String>>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Fixed physical name instead of an auto-named one.
    #[must_use]
    pub fn resource_group_name(mut self, name: impl Into<Input<String>>) -> Self {
        self.resource_group_name = Some(name.into());
        self
    }
}

impl ResourceKind for ResourceGroupArgs {
    type Handle = ResourceGroup;
    const TYPE: &'static str = "azure-native:resources:ResourceGroup";

    fn into_properties(self) -> PropertyMap {
        PropertyMap::new()
            .with_optional("location", self.location)
            .with_optional("resourceGroupName", self.resource_group_name)
    }
}

resource_handle! {
    /// A declared resource group.
    ResourceGroup
}

#[cfg(test)]
mod tests {
    use azcompose_core::PropertyValue;

    use super::*;

    #[test]
    fn unset_properties_are_omitted() {
        let props = ResourceGroupArgs::new().into_properties();
        assert!(props.is_empty());
    }

    #[test]
    fn location_is_a_literal() {
        let props = ResourceGroupArgs::new().location("westus2").into_properties();
        assert!(matches!(props.get("location"), Some(PropertyValue::Literal(_))));
    }
}
