//! Linux web server on a protected network component.

use azcompose_common::error::Result;
use azcompose_core::{Input, ResourceOptions, Stack};

use super::resource_group;
use crate::components::{ServerNetworkArgs, server_network};
use crate::compute::{ImageReference, VirtualMachineArgs, VirtualMachineSizeTypes};
use crate::random::RandomPasswordArgs;

const INIT_SCRIPT: &str = "#!/bin/bash

echo \"Hello, World!\" > index.html
nohup python -m SimpleHTTPServer 80 &";

/// Declares the server network component, then a VM attached to it.
///
/// Reads `username` (default `webserver`), `protect` (default `true`),
/// and the secret `password`; when no password is configured a generated
/// one is declared instead. Exports `public_ip`.
///
/// # Errors
///
/// Returns any composition error.
pub fn run(stack: &mut Stack) -> Result<()> {
    let config = stack.config();
    let username = config.get_or("username", "webserver")?;
    let protect = config.get_bool_or("protect", true)?;
    let password: Input<String> = match config.get_secret("password") {
        Some(secret) => secret.into(),
        None => {
            tracing::debug!("no admin password configured, generating one");
            stack
                .declare(
                    "password",
                    RandomPasswordArgs::new(16).override_special("@_#"),
                    ResourceOptions::new(),
                )?
                .result()
                .into()
        }
    };

    let rg = resource_group(stack, "server")?;
    let network = server_network(
        stack,
        "network",
        ServerNetworkArgs::new(rg.name()),
        ResourceOptions::new().protect(protect),
    )?;

    let _ = stack.declare(
        "server-vm",
        VirtualMachineArgs::new(rg.name(), VirtualMachineSizeTypes::StandardA0, username)
            .network_interface(&network.network_interface_id)
            .computer_name("hostname")
            .admin_password(password)
            .custom_data(INIT_SCRIPT)
            .image_reference(ImageReference::new("canonical", "UbuntuServer", "16.04-LTS", "latest")),
        ResourceOptions::new(),
    )?;

    stack.export("public_ip", &network.public_ip_address)
}
