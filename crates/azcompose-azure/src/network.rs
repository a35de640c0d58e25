//! Virtual networks, public IP addresses, and network interfaces.

use azcompose_core::resource::DeclarationMode;
use azcompose_core::{Input, Output, PropertyMap, PropertyValue, ResourceKind};

schema_enum! {
    /// How an IP address is assigned.
    IpAllocationMethod {
        /// Assigned when the address is attached to a running resource.
        Dynamic => "Dynamic",
        /// Assigned at creation and kept until deletion.
        Static => "Static",
    }
}

/// A subnet carved out of a virtual network's address space.
#[derive(Debug, Clone)]
pub struct Subnet {
    /// Subnet name.
    pub name: String,
    /// CIDR prefix (`10.0.1.0/24`).
    pub address_prefix: String,
}

impl Subnet {
    /// Creates a subnet.
    #[must_use]
    pub fn new(name: impl Into<String>, address_prefix: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            address_prefix: address_prefix.into(),
        }
    }
}

impl From<Subnet> for PropertyValue {
    fn from(subnet: Subnet) -> Self {
        PropertyMap::new()
            .with("name", subnet.name)
            .with("addressPrefix", subnet.address_prefix)
            .into()
    }
}

/// Arguments for a virtual network.
#[derive(Debug, Clone)]
pub struct VirtualNetworkArgs {
    resource_group_name: Input<String>,
    location: Option<Input<String>>,
    address_prefixes: Vec<String>,
    subnets: Vec<Subnet>,
}

impl VirtualNetworkArgs {
    /// A network in the given resource group with no address space yet.
    #[must_use]
    pub fn new(resource_group_name: impl Into<Input<String>>) -> Self {
        Self {
            resource_group_name: resource_group_name.into(),
            location: None,
            address_prefixes: Vec::new(),
            subnets: Vec::new(),
        }
    }

    /// Azure region.
    #[must_use]
    pub fn location(mut self, location: impl Into<Input<String>>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Adds a CIDR block to the address space.
    #[must_use]
    pub fn address_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.address_prefixes.push(prefix.into());
        self
    }

    /// Adds a subnet.
    #[must_use]
    pub fn subnet(mut self, subnet: Subnet) -> Self {
        self.subnets.push(subnet);
        self
    }
}

impl ResourceKind for VirtualNetworkArgs {
    type Handle = VirtualNetwork;
    const TYPE: &'static str = "azure-native:network:VirtualNetwork";

    fn into_properties(self) -> PropertyMap {
        PropertyMap::new()
            .with("resourceGroupName", self.resource_group_name)
            .with_optional("location", self.location)
            .with(
                "addressSpace",
                PropertyMap::new().with("addressPrefixes", self.address_prefixes),
            )
            .with("subnets", self.subnets)
    }
}

resource_handle! {
    /// A declared virtual network.
    VirtualNetwork
}

impl VirtualNetwork {
    /// Resource ID of the subnet at `index`.
    #[must_use]
    pub fn subnet_id(&self, index: usize) -> Output<String> {
        self.0.output(&format!("subnets.{index}.id"))
    }
}

/// Arguments for a public IP address.
#[derive(Debug, Clone)]
pub struct PublicIpAddressArgs {
    resource_group_name: Input<String>,
    location: Option<Input<String>>,
    allocation_method: Option<IpAllocationMethod>,
}

impl PublicIpAddressArgs {
    /// An address in the given resource group.
    #[must_use]
    pub fn new(resource_group_name: impl Into<Input<String>>) -> Self {
        Self {
            resource_group_name: resource_group_name.into(),
            location: None,
            allocation_method: None,
        }
    }

    /// Azure region.
    #[must_use]
    pub fn location(mut self, location: impl Into<Input<String>>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// How the address is assigned.
    #[must_use]
    pub const fn public_ip_allocation_method(mut self, method: IpAllocationMethod) -> Self {
        self.allocation_method = Some(method);
        self
    }
}

impl ResourceKind for PublicIpAddressArgs {
    type Handle = PublicIpAddress;
    const TYPE: &'static str = "azure-native:network:PublicIPAddress";

    fn into_properties(self) -> PropertyMap {
        PropertyMap::new()
            .with("resourceGroupName", self.resource_group_name)
            .with_optional("location", self.location)
            .with_optional("publicIPAllocationMethod", self.allocation_method)
    }
}

resource_handle! {
    /// A declared public IP address.
    PublicIpAddress
}

impl PublicIpAddress {
    /// The assigned address. Empty for a dynamic address until it is
    /// attached; look it up with [`GetPublicIpAddressArgs`] instead.
    #[must_use]
    pub fn ip_address(&self) -> Output<String> {
        self.0.output("ipAddress")
    }
}

/// One IP configuration of a network interface.
#[derive(Debug, Clone)]
pub struct IpConfiguration {
    name: String,
    subnet_id: Input<String>,
    private_ip_allocation_method: IpAllocationMethod,
    public_ip_address_id: Option<Input<String>>,
}

impl IpConfiguration {
    /// A dynamically addressed configuration on the given subnet.
    #[must_use]
    pub fn new(name: impl Into<String>, subnet_id: impl Into<Input<String>>) -> Self {
        Self {
            name: name.into(),
            subnet_id: subnet_id.into(),
            private_ip_allocation_method: IpAllocationMethod::Dynamic,
            public_ip_address_id: None,
        }
    }

    /// How the private address is assigned.
    #[must_use]
    pub const fn private_ip_allocation_method(mut self, method: IpAllocationMethod) -> Self {
        self.private_ip_allocation_method = method;
        self
    }

    /// Attaches a public IP address by resource ID.
    #[must_use]
    pub fn public_ip_address(mut self, id: impl Into<Input<String>>) -> Self {
        self.public_ip_address_id = Some(id.into());
        self
    }
}

impl From<IpConfiguration> for PropertyValue {
    fn from(config: IpConfiguration) -> Self {
        PropertyMap::new()
            .with("name", config.name)
            .with("subnet", PropertyMap::new().with("id", config.subnet_id))
            .with("privateIPAllocationMethod", config.private_ip_allocation_method)
            .with_optional(
                "publicIPAddress",
                config
                    .public_ip_address_id
                    .map(|id| PropertyMap::new().with("id", id)),
            )
            .into()
    }
}

/// Arguments for a network interface.
#[derive(Debug, Clone)]
pub struct NetworkInterfaceArgs {
    resource_group_name: Input<String>,
    location: Option<Input<String>>,
    ip_configurations: Vec<IpConfiguration>,
}

impl NetworkInterfaceArgs {
    /// An interface in the given resource group.
    #[must_use]
    pub fn new(resource_group_name: impl Into<Input<String>>) -> Self {
        Self {
            resource_group_name: resource_group_name.into(),
            location: None,
            ip_configurations: Vec::new(),
        }
    }

    /// Azure region.
    #[must_use]
    pub fn location(mut self, location: impl Into<Input<String>>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Adds an IP configuration.
    #[must_use]
    pub fn ip_configuration(mut self, config: IpConfiguration) -> Self {
        self.ip_configurations.push(config);
        self
    }
}

impl ResourceKind for NetworkInterfaceArgs {
    type Handle = NetworkInterface;
    const TYPE: &'static str = "azure-native:network:NetworkInterface";

    fn into_properties(self) -> PropertyMap {
        PropertyMap::new()
            .with("resourceGroupName", self.resource_group_name)
            .with_optional("location", self.location)
            .with("ipConfigurations", self.ip_configurations)
    }
}

resource_handle! {
    /// A declared network interface.
    NetworkInterface
}

/// Lookup of an existing public IP address.
#[derive(Debug, Clone)]
pub struct GetPublicIpAddressArgs {
    resource_group_name: Input<String>,
    public_ip_address_name: Input<String>,
}

impl GetPublicIpAddressArgs {
    /// Looks up an address by resource group and name.
    #[must_use]
    pub fn new(
        resource_group_name: impl Into<Input<String>>,
        public_ip_address_name: impl Into<Input<String>>,
    ) -> Self {
        Self {
            resource_group_name: resource_group_name.into(),
            public_ip_address_name: public_ip_address_name.into(),
        }
    }
}

impl ResourceKind for GetPublicIpAddressArgs {
    type Handle = PublicIpAddressLookup;
    const TYPE: &'static str = "azure-native:network:getPublicIPAddress";
    const MODE: DeclarationMode = DeclarationMode::Read;

    fn into_properties(self) -> PropertyMap {
        PropertyMap::new()
            .with("resourceGroupName", self.resource_group_name)
            .with("publicIpAddressName", self.public_ip_address_name)
    }
}

resource_handle! {
    /// Result of a public IP address lookup.
    PublicIpAddressLookup
}

impl PublicIpAddressLookup {
    /// The address as currently assigned.
    #[must_use]
    pub fn ip_address(&self) -> Output<String> {
        self.0.output("ipAddress")
    }
}
