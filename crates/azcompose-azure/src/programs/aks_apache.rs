//! AKS cluster running an Apache Helm chart.

use azcompose_common::error::Result;
use azcompose_core::{Input, ResourceOptions, Stack};

use super::resource_group;
use crate::azuread::{ApplicationArgs, ServicePrincipalArgs, ServicePrincipalPasswordArgs};
use crate::containerservice::{
    AgentPoolProfile, ListManagedClusterUserCredentialsArgs, ManagedClusterArgs,
};
use crate::kubernetes::{ChartArgs, ProviderArgs};
use crate::random::RandomPasswordArgs;
use crate::tls::{Algorithm, PrivateKeyArgs};

const CHART_REPO: &str = "https://charts.bitnami.com/bitnami";
const SP_PASSWORD_END_DATE: &str = "2099-01-01T00:00:00Z";

/// Provisions the cluster, its service principal, and the chart.
///
/// Reads `k8sVersion`, `adminUserName`, `nodeCount`, `nodeSize` with
/// defaults, and the secret `password`, generating one when unset.
///
/// # Errors
///
/// Returns any composition error.
pub fn run(stack: &mut Stack) -> Result<()> {
    let config = stack.config();
    let k8s_version = config.get_or("k8sVersion", "1.18.14")?;
    let admin_username = config.get_or("adminUserName", "testuser")?;
    let node_count = config.get_int_or("nodeCount", 2)?;
    let node_size = config.get_or("nodeSize", "Standard_D2_v2")?;
    let password: Input<String> = match config.get_secret("password") {
        Some(secret) => secret.into(),
        None => {
            tracing::debug!("no service principal password configured, generating one");
            stack
                .declare("pw", RandomPasswordArgs::new(20).special(true), ResourceOptions::new())?
                .result()
                .into()
        }
    };

    let ssh_key = stack.declare(
        "ssh-key",
        PrivateKeyArgs::new(Algorithm::Rsa).rsa_bits(4096),
        ResourceOptions::new(),
    )?;
    let rg = resource_group(stack, "rg")?;

    let app = stack.declare("app", ApplicationArgs::new("app"), ResourceOptions::new())?;
    let sp = stack.declare(
        "service-principal",
        ServicePrincipalArgs::new(app.application_id()),
        ResourceOptions::new(),
    )?;
    let sp_password = stack.declare(
        "sp-password",
        ServicePrincipalPasswordArgs::new(sp.id(), password, SP_PASSWORD_END_DATE),
        ResourceOptions::new(),
    )?;

    let cluster = stack.declare(
        "cluster",
        ManagedClusterArgs::new(rg.name(), rg.name())
            .kubernetes_version(k8s_version)
            .kube_dashboard(true)
            .agent_pool(AgentPoolProfile::new("agentpool", node_count, node_size))
            .linux_profile(admin_username, ssh_key.public_key_openssh())
            .node_resource_group("node-resource-group")
            .service_principal(app.application_id(), sp_password.value()),
        ResourceOptions::new(),
    )?;

    let creds = stack.declare(
        "creds",
        ListManagedClusterUserCredentialsArgs::new(rg.name(), cluster.name()),
        ResourceOptions::new(),
    )?;
    let kubeconfig = creds.kubeconfig(0);

    let provider = stack.declare(
        "k8s-provider",
        ProviderArgs::new(&kubeconfig),
        ResourceOptions::new(),
    )?;
    let apache = stack.declare(
        "apache-chart",
        ChartArgs::new("apache").version("8.3.2").repo(CHART_REPO),
        ResourceOptions::new().provider(&provider),
    )?;

    stack.export("cluster_name", cluster.name())?;
    stack.export_secret("kubeconfig", kubeconfig)?;
    stack.export("apache_service_ip", apache.service_ip("apache-chart"))
}
