//! Azure AD applications and service principals.

use azcompose_core::{Input, Output, PropertyMap, ResourceKind};

/// Arguments for an AD application.
#[derive(Debug, Clone)]
pub struct ApplicationArgs {
    display_name: Input<String>,
}

impl ApplicationArgs {
    /// An application with the given display name.
    #[must_use]
    pub fn new(display_name: impl Into<Input<String>>) -> Self {
        Self {
            display_name: display_name.into(),
        }
    }
}

impl ResourceKind for ApplicationArgs {
    type Handle = Application;
    const TYPE: &'static str = "azuread:index/application:Application";

    fn into_properties(self) -> PropertyMap {
        PropertyMap::new().with("displayName", self.display_name)
    }
}

resource_handle! {
    /// A declared AD application.
    Application
}

impl Application {
    /// Client ID of the application.
    #[must_use]
    pub fn application_id(&self) -> Output<String> {
        self.0.output("applicationId")
    }
}

/// Arguments for a service principal.
#[derive(Debug, Clone)]
pub struct ServicePrincipalArgs {
    application_id: Input<String>,
}

impl ServicePrincipalArgs {
    /// A principal for the given application.
    #[must_use]
    pub fn new(application_id: impl Into<Input<String>>) -> Self {
        Self {
            application_id: application_id.into(),
        }
    }
}

impl ResourceKind for ServicePrincipalArgs {
    type Handle = ServicePrincipal;
    const TYPE: &'static str = "azuread:index/servicePrincipal:ServicePrincipal";

    fn into_properties(self) -> PropertyMap {
        PropertyMap::new().with("applicationId", self.application_id)
    }
}

resource_handle! {
    /// A declared service principal.
    ServicePrincipal
}

/// Arguments for a service principal password.
#[derive(Debug, Clone)]
pub struct ServicePrincipalPasswordArgs {
    service_principal_id: Input<String>,
    value: Input<String>,
    end_date: String,
}

impl ServicePrincipalPasswordArgs {
    /// A password for the given principal. `value` is a secret slot.
    #[must_use]
    pub fn new(
        service_principal_id: impl Into<Input<String>>,
        value: impl Into<Input<String>>,
        end_date: impl Into<String>,
    ) -> Self {
        Self {
            service_principal_id: service_principal_id.into(),
            value: value.into(),
            end_date: end_date.into(),
        }
    }
}

impl ResourceKind for ServicePrincipalPasswordArgs {
    type Handle = ServicePrincipalPassword;
    const TYPE: &'static str = "azuread:index/servicePrincipalPassword:ServicePrincipalPassword";
    const SECRET_INPUTS: &'static [&'static str] = &["value"];
    const SECRET_OUTPUTS: &'static [&'static str] = &["value"];

    fn into_properties(self) -> PropertyMap {
        PropertyMap::new()
            .with("servicePrincipalId", self.service_principal_id)
            .with("value", self.value)
            .with("endDate", self.end_date)
    }
}

resource_handle! {
    /// A declared service principal password.
    ServicePrincipalPassword
}

impl ServicePrincipalPassword {
    /// The password. Always secret.
    #[must_use]
    pub fn value(&self) -> Output<String> {
        self.0.output("value")
    }
}
