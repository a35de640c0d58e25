//! CDN profiles and endpoints.

use azcompose_core::{Input, Output, PropertyMap, PropertyValue, ResourceKind};

schema_enum! {
    /// CDN pricing tier.
    SkuName {
        /// Microsoft standard.
        StandardMicrosoft => "Standard_Microsoft",
        /// Akamai standard.
        StandardAkamai => "Standard_Akamai",
        /// Verizon standard.
        StandardVerizon => "Standard_Verizon",
        /// Verizon premium.
        PremiumVerizon => "Premium_Verizon",
    }
}

schema_enum! {
    /// How query strings affect caching.
    QueryStringCachingBehavior {
        /// Cache ignoring the query string.
        IgnoreQueryString => "IgnoreQueryString",
        /// Never cache requests with a query string.
        BypassCaching => "BypassCaching",
        /// Cache each distinct URL.
        UseQueryString => "UseQueryString",
        /// Leave the provider default.
        NotSet => "NotSet",
    }
}

/// Arguments for a CDN profile.
#[derive(Debug, Clone)]
pub struct ProfileArgs {
    resource_group_name: Input<String>,
    location: Option<Input<String>>,
    sku: SkuName,
}

impl ProfileArgs {
    /// A profile in the given resource group.
    #[must_use]
    pub fn new(resource_group_name: impl Into<Input<String>>, sku: SkuName) -> Self {
        Self {
            resource_group_name: resource_group_name.into(),
            location: None,
            sku,
        }
    }

    /// Azure region.
    #[must_use]
    pub fn location(mut self, location: impl Into<Input<String>>) -> Self {
        self.location = Some(location.into());
        self
    }
}

impl ResourceKind for ProfileArgs {
    type Handle = Profile;
    const TYPE: &'static str = "azure-native:cdn:Profile";

    fn into_properties(self) -> PropertyMap {
        PropertyMap::new()
            .with("resourceGroupName", self.resource_group_name)
            .with_optional("location", self.location)
            .with("sku", PropertyMap::new().with("name", self.sku))
    }
}

resource_handle! {
    /// A declared CDN profile.
    Profile
}

/// An origin server behind an endpoint.
#[derive(Debug, Clone)]
pub struct DeepCreatedOrigin {
    name: String,
    host_name: Input<String>,
    https_port: Option<u32>,
}

impl DeepCreatedOrigin {
    /// An origin reached at `host_name`.
    #[must_use]
    pub fn new(name: impl Into<String>, host_name: impl Into<Input<String>>) -> Self {
        Self {
            name: name.into(),
            host_name: host_name.into(),
            https_port: None,
        }
    }

    /// HTTPS port on the origin.
    #[must_use]
    pub const fn https_port(mut self, port: u32) -> Self {
        self.https_port = Some(port);
        self
    }
}

impl From<DeepCreatedOrigin> for PropertyValue {
    fn from(origin: DeepCreatedOrigin) -> Self {
        PropertyMap::new()
            .with("name", origin.name)
            .with("hostName", origin.host_name)
            .with_optional("httpsPort", origin.https_port)
            .into()
    }
}

/// Arguments for a CDN endpoint.
#[derive(Debug, Clone)]
pub struct EndpointArgs {
    resource_group_name: Input<String>,
    profile_name: Input<String>,
    location: Option<Input<String>>,
    endpoint_name: Option<Input<String>>,
    is_http_allowed: Option<bool>,
    is_https_allowed: Option<bool>,
    origin_host_header: Option<Input<String>>,
    origins: Vec<DeepCreatedOrigin>,
    query_string_caching_behavior: Option<QueryStringCachingBehavior>,
}

impl EndpointArgs {
    /// An endpoint on the given profile.
    #[must_use]
    pub fn new(
        resource_group_name: impl Into<Input<String>>,
        profile_name: impl Into<Input<String>>,
    ) -> Self {
        Self {
            resource_group_name: resource_group_name.into(),
            profile_name: profile_name.into(),
            location: None,
            endpoint_name: None,
            is_http_allowed: None,
            is_https_allowed: None,
            origin_host_header: None,
            origins: Vec::new(),
            query_string_caching_behavior: None,
        }
    }

    /// Azure region.
    #[must_use]
    pub fn location(mut self, location: impl Into<Input<String>>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Globally unique endpoint name (the `<name>.azureedge.net` label).
    #[must_use]
    pub fn endpoint_name(mut self, name: impl Into<Input<String>>) -> Self {
        self.endpoint_name = Some(name.into());
        self
    }

    /// Allowed protocols.
    #[must_use]
    pub const fn protocols(mut self, http: bool, https: bool) -> Self {
        self.is_http_allowed = Some(http);
        self.is_https_allowed = Some(https);
        self
    }

    /// Host header sent to the origin.
    #[must_use]
    pub fn origin_host_header(mut self, host: impl Into<Input<String>>) -> Self {
        self.origin_host_header = Some(host.into());
        self
    }

    /// Adds an origin.
    #[must_use]
    pub fn origin(mut self, origin: DeepCreatedOrigin) -> Self {
        self.origins.push(origin);
        self
    }

    /// Query string caching.
    #[must_use]
    pub const fn query_string_caching_behavior(mut self, behavior: QueryStringCachingBehavior) -> Self {
        self.query_string_caching_behavior = Some(behavior);
        self
    }
}

impl ResourceKind for EndpointArgs {
    type Handle = Endpoint;
    const TYPE: &'static str = "azure-native:cdn:Endpoint";

    fn into_properties(self) -> PropertyMap {
        PropertyMap::new()
            .with("resourceGroupName", self.resource_group_name)
            .with("profileName", self.profile_name)
            .with_optional("location", self.location)
            .with_optional("endpointName", self.endpoint_name)
            .with_optional("isHttpAllowed", self.is_http_allowed)
            .with_optional("isHttpsAllowed", self.is_https_allowed)
            .with_optional("originHostHeader", self.origin_host_header)
            .with("origins", self.origins)
            .with_optional("queryStringCachingBehavior", self.query_string_caching_behavior)
    }
}

resource_handle! {
    /// A declared CDN endpoint.
    Endpoint
}

impl Endpoint {
    /// Host name clients reach the endpoint at (`<name>.azureedge.net`).
    #[must_use]
    pub fn host_name(&self) -> Output<String> {
        self.0.output("hostName")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_origins_are_nested() {
        let plan = EndpointArgs::new("rg", "profile")
            .protocols(false, true)
            .origin(DeepCreatedOrigin::new("origin-storage-account", "site.example.net").https_port(443))
            .query_string_caching_behavior(QueryStringCachingBehavior::NotSet)
            .into_properties()
            .to_plan_json();
        assert_eq!(plan["isHttpAllowed"], false);
        assert_eq!(plan["origins"][0]["httpsPort"], 443);
        assert_eq!(plan["queryStringCachingBehavior"], "NotSet");
    }

    #[test]
    fn profile_sku_is_nested() {
        let plan = ProfileArgs::new("rg", SkuName::StandardMicrosoft)
            .into_properties()
            .to_plan_json();
        assert_eq!(plan["sku"]["name"], "Standard_Microsoft");
    }
}
