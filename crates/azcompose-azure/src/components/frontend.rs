//! CDN frontend in front of an origin host.

use azcompose_common::error::Result;
use azcompose_core::{ComponentHandle, ComponentOutputs, Input, Output, ResourceOptions, Stack};
use serde_json::Value;

use crate::cdn::{DeepCreatedOrigin, EndpointArgs, ProfileArgs, QueryStringCachingBehavior, SkuName};

/// Component type token.
pub const TYPE: &str = "azc:web:Frontend";

/// Inputs of a frontend.
#[derive(Debug, Clone)]
pub struct FrontendArgs {
    resource_group_name: Input<String>,
    origin_host: Input<String>,
    endpoint_name: Option<Input<String>>,
    sku: SkuName,
}

impl FrontendArgs {
    /// A Microsoft standard CDN in `resource_group_name` fronting
    /// `origin_host` (a bare host name, no scheme or path).
    #[must_use]
    pub fn new(
        resource_group_name: impl Into<Input<String>>,
        origin_host: impl Into<Input<String>>,
    ) -> Self {
        Self {
            resource_group_name: resource_group_name.into(),
            origin_host: origin_host.into(),
            endpoint_name: None,
            sku: SkuName::StandardMicrosoft,
        }
    }

    /// Globally unique endpoint label.
    #[must_use]
    pub fn endpoint_name(mut self, name: impl Into<Input<String>>) -> Self {
        self.endpoint_name = Some(name.into());
        self
    }

    /// CDN pricing tier.
    #[must_use]
    pub const fn sku(mut self, sku: SkuName) -> Self {
        self.sku = sku;
        self
    }
}

/// Outputs of a frontend.
#[derive(Debug, Clone)]
pub struct FrontendOutputs {
    /// `https://` URL of the CDN endpoint.
    pub cdn_url: Output<String>,
}

impl ComponentOutputs for FrontendOutputs {
    fn outputs(&self) -> Vec<(&'static str, Output<Value>)> {
        vec![("cdnUrl", self.cdn_url.clone().into_value())]
    }
}

/// Declares a CDN profile and an HTTPS-only endpoint for the origin.
///
/// # Errors
///
/// Returns any composition error raised while declaring the children.
pub fn frontend(
    stack: &mut Stack,
    name: &str,
    args: FrontendArgs,
    options: ResourceOptions,
) -> Result<ComponentHandle<FrontendOutputs>> {
    stack.component(name, TYPE, options, |stack| {
        let profile = stack.declare(
            "profile",
            ProfileArgs::new(args.resource_group_name.clone(), args.sku),
            ResourceOptions::new(),
        )?;

        let mut endpoint = EndpointArgs::new(args.resource_group_name, profile.name())
            .protocols(false, true)
            .origin_host_header(args.origin_host.clone())
            .origin(DeepCreatedOrigin::new("origin-storage-account", args.origin_host).https_port(443))
            .query_string_caching_behavior(QueryStringCachingBehavior::NotSet);
        if let Some(endpoint_name) = args.endpoint_name {
            endpoint = endpoint.endpoint_name(endpoint_name);
        }
        let endpoint = stack.declare("endpoint", endpoint, ResourceOptions::new())?;

        Ok(FrontendOutputs {
            cdn_url: endpoint.host_name().map(|host| format!("https://{host}")),
        })
    })
}

#[cfg(test)]
mod tests {
    use azcompose_common::config::StackSettings;

    use super::*;

    #[test]
    fn children_are_prefixed_and_wired() {
        let composition = Stack::run(StackSettings::new("t", "dev"), |stack| {
            let _ = frontend(stack, "cdn", FrontendArgs::new("rg", "site.example.net"), ResourceOptions::new())?;
            Ok(())
        })
        .unwrap();
        let profile = composition.declaration("cdn-profile").expect("profile");
        let endpoint = composition.declaration("cdn-endpoint").expect("endpoint");
        assert!(endpoint.dependencies.contains(&profile.urn));
        let component = composition.component("cdn").expect("component");
        assert_eq!(component.output_names().collect::<Vec<_>>(), vec!["cdnUrl"]);
    }
}
