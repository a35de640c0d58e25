//! Network plumbing for a single public-facing server.

use azcompose_common::error::Result;
use azcompose_core::{ComponentHandle, ComponentOutputs, Input, Output, ResourceOptions, Stack};
use serde_json::Value;

use crate::network::{
    GetPublicIpAddressArgs, IpAllocationMethod, IpConfiguration, NetworkInterfaceArgs,
    PublicIpAddressArgs, Subnet, VirtualNetworkArgs,
};

/// Component type token.
pub const TYPE: &str = "azc:network:ServerNetwork";

/// Inputs of a server network.
#[derive(Debug, Clone)]
pub struct ServerNetworkArgs {
    resource_group_name: Input<String>,
    address_prefix: String,
    subnet_prefix: String,
}

impl ServerNetworkArgs {
    /// A `10.0.0.0/16` network with one `10.0.1.0/24` subnet.
    #[must_use]
    pub fn new(resource_group_name: impl Into<Input<String>>) -> Self {
        Self {
            resource_group_name: resource_group_name.into(),
            address_prefix: "10.0.0.0/16".to_string(),
            subnet_prefix: "10.0.1.0/24".to_string(),
        }
    }

    /// Address space and subnet CIDR blocks.
    #[must_use]
    pub fn prefixes(mut self, address_prefix: impl Into<String>, subnet_prefix: impl Into<String>) -> Self {
        self.address_prefix = address_prefix.into();
        self.subnet_prefix = subnet_prefix.into();
        self
    }
}

/// Outputs of a server network.
#[derive(Debug, Clone)]
pub struct ServerNetworkOutputs {
    /// Resource ID of the network interface to attach to a VM.
    pub network_interface_id: Output<String>,
    /// Public address as assigned once the interface is attached.
    pub public_ip_address: Output<String>,
}

impl ComponentOutputs for ServerNetworkOutputs {
    fn outputs(&self) -> Vec<(&'static str, Output<Value>)> {
        vec![
            ("networkInterfaceId", self.network_interface_id.clone().into_value()),
            ("publicIpAddress", self.public_ip_address.clone().into_value()),
        ]
    }
}

/// Declares a virtual network, a dynamic public IP, a network interface
/// joining the two, and a lookup of the address the IP ends up with.
///
/// # Errors
///
/// Returns any composition error raised while declaring the children.
pub fn server_network(
    stack: &mut Stack,
    name: &str,
    args: ServerNetworkArgs,
    options: ResourceOptions,
) -> Result<ComponentHandle<ServerNetworkOutputs>> {
    stack.component(name, TYPE, options, |stack| {
        let vnet = stack.declare(
            "vnet",
            VirtualNetworkArgs::new(args.resource_group_name.clone())
                .address_prefix(args.address_prefix)
                .subnet(Subnet::new("default", args.subnet_prefix)),
            ResourceOptions::new(),
        )?;
        let ip = stack.declare(
            "ip",
            PublicIpAddressArgs::new(args.resource_group_name.clone())
                .public_ip_allocation_method(IpAllocationMethod::Dynamic),
            ResourceOptions::new(),
        )?;
        let nic = stack.declare(
            "nic",
            NetworkInterfaceArgs::new(args.resource_group_name.clone()).ip_configuration(
                IpConfiguration::new("webserveripcfg", vnet.subnet_id(0))
                    .private_ip_allocation_method(IpAllocationMethod::Dynamic)
                    .public_ip_address(ip.id()),
            ),
            ResourceOptions::new(),
        )?;
        // A dynamic address is only assigned once the interface exists.
        let lookup = stack.declare(
            "ip-lookup",
            GetPublicIpAddressArgs::new(args.resource_group_name, ip.name()),
            ResourceOptions::new().depends_on(&nic),
        )?;

        Ok(ServerNetworkOutputs {
            network_interface_id: nic.id(),
            public_ip_address: lookup.ip_address(),
        })
    })
}

#[cfg(test)]
mod tests {
    use azcompose_common::config::StackSettings;

    use super::*;

    #[test]
    fn lookup_waits_for_interface() {
        let composition = Stack::run(StackSettings::new("t", "dev"), |stack| {
            let _ = server_network(stack, "network", ServerNetworkArgs::new("rg"), ResourceOptions::new())?;
            Ok(())
        })
        .unwrap();
        let nic = composition.declaration("network-nic").expect("nic");
        let lookup = composition.declaration("network-ip-lookup").expect("lookup");
        assert!(lookup.dependencies.contains(&nic.urn));
        assert_eq!(composition.component("network").unwrap().children.len(), 4);
    }
}
