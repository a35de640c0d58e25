//! Virtual machines.

use azcompose_core::{Input, PropertyMap, PropertyValue, ResourceKind};
use base64::Engine;

schema_enum! {
    /// Virtual machine sizes.
    VirtualMachineSizeTypes {
        /// Basic A0.
        StandardA0 => "Standard_A0",
        /// Basic A1.
        StandardA1 => "Standard_A1",
        /// Burstable B1s.
        StandardB1s => "Standard_B1s",
        /// General purpose D2 v2.
        StandardD2V2 => "Standard_D2_v2",
    }
}

schema_enum! {
    /// How an OS disk is created.
    DiskCreateOptionTypes {
        /// From the image reference.
        FromImage => "FromImage",
        /// Empty disk.
        Empty => "Empty",
        /// Attach an existing disk.
        Attach => "Attach",
    }
}

/// Marketplace image to boot from.
#[derive(Debug, Clone)]
pub struct ImageReference {
    /// Image publisher (`canonical`).
    pub publisher: String,
    /// Offer (`UbuntuServer`).
    pub offer: String,
    /// SKU (`16.04-LTS`).
    pub sku: String,
    /// Version (`latest`).
    pub version: String,
}

impl ImageReference {
    /// Creates an image reference.
    #[must_use]
    pub fn new(
        publisher: impl Into<String>,
        offer: impl Into<String>,
        sku: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            publisher: publisher.into(),
            offer: offer.into(),
            sku: sku.into(),
            version: version.into(),
        }
    }
}

impl From<ImageReference> for PropertyValue {
    fn from(image: ImageReference) -> Self {
        PropertyMap::new()
            .with("publisher", image.publisher)
            .with("offer", image.offer)
            .with("sku", image.sku)
            .with("version", image.version)
            .into()
    }
}

/// Arguments for a virtual machine.
///
/// `osProfile.adminPassword` is a secret slot: it accepts a secret config
/// value or a deferred output, never a plaintext literal.
#[derive(Debug, Clone)]
pub struct VirtualMachineArgs {
    resource_group_name: Input<String>,
    location: Option<Input<String>>,
    network_interface_ids: Vec<Input<String>>,
    vm_size: VirtualMachineSizeTypes,
    computer_name: String,
    admin_username: Input<String>,
    admin_password: Option<Input<String>>,
    custom_data: Option<String>,
    disable_password_authentication: bool,
    os_disk_create_option: DiskCreateOptionTypes,
    image_reference: Option<ImageReference>,
}

impl VirtualMachineArgs {
    /// A Linux machine in the given resource group.
    #[must_use]
    pub fn new(
        resource_group_name: impl Into<Input<String>>,
        vm_size: VirtualMachineSizeTypes,
        admin_username: impl Into<Input<String>>,
    ) -> Self {
        Self {
            resource_group_name: resource_group_name.into(),
            location: None,
            network_interface_ids: Vec::new(),
            vm_size,
            computer_name: "hostname".to_string(),
            admin_username: admin_username.into(),
            admin_password: None,
            custom_data: None,
            disable_password_authentication: true,
            os_disk_create_option: DiskCreateOptionTypes::FromImage,
            image_reference: None,
        }
    }

    /// Azure region.
    #[must_use]
    pub fn location(mut self, location: impl Into<Input<String>>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Attaches a network interface by resource ID.
    #[must_use]
    pub fn network_interface(mut self, id: impl Into<Input<String>>) -> Self {
        self.network_interface_ids.push(id.into());
        self
    }

    /// Host name inside the guest.
    #[must_use]
    pub fn computer_name(mut self, name: impl Into<String>) -> Self {
        self.computer_name = name.into();
        self
    }

    /// Admin password; also enables password authentication.
    #[must_use]
    pub fn admin_password(mut self, password: impl Into<Input<String>>) -> Self {
        self.admin_password = Some(password.into());
        self.disable_password_authentication = false;
        self
    }

    /// Script run on first boot. Stored base64 encoded, as the provider
    /// expects.
    #[must_use]
    pub fn custom_data(mut self, script: &str) -> Self {
        self.custom_data = Some(base64::engine::general_purpose::STANDARD.encode(script.as_bytes()));
        self
    }

    /// How the OS disk is created.
    #[must_use]
    pub const fn os_disk_create_option(mut self, option: DiskCreateOptionTypes) -> Self {
        self.os_disk_create_option = option;
        self
    }

    /// Image to boot from.
    #[must_use]
    pub fn image_reference(mut self, image: ImageReference) -> Self {
        self.image_reference = Some(image);
        self
    }
}

impl ResourceKind for VirtualMachineArgs {
    type Handle = VirtualMachine;
    const TYPE: &'static str = "azure-native:compute:VirtualMachine";
    const SECRET_INPUTS: &'static [&'static str] = &["osProfile.adminPassword"];

    fn into_properties(self) -> PropertyMap {
        let interfaces: Vec<PropertyValue> = self
            .network_interface_ids
            .into_iter()
            .map(|id| PropertyMap::new().with("id", id).into())
            .collect();
        let os_profile = PropertyMap::new()
            .with("computerName", self.computer_name)
            .with("adminUsername", self.admin_username)
            .with_optional("adminPassword", self.admin_password)
            .with_optional("customData", self.custom_data)
            .with(
                "linuxConfiguration",
                PropertyMap::new().with(
                    "disablePasswordAuthentication",
                    self.disable_password_authentication,
                ),
            );
        let storage_profile = PropertyMap::new()
            .with(
                "osDisk",
                PropertyMap::new().with("createOption", self.os_disk_create_option),
            )
            .with_optional("imageReference", self.image_reference);

        PropertyMap::new()
            .with("resourceGroupName", self.resource_group_name)
            .with_optional("location", self.location)
            .with("networkProfile", PropertyMap::new().with("networkInterfaces", interfaces))
            .with("hardwareProfile", PropertyMap::new().with("vmSize", self.vm_size))
            .with("osProfile", os_profile)
            .with("storageProfile", storage_profile)
    }
}

resource_handle! {
    /// A declared virtual machine.
    VirtualMachine
}
