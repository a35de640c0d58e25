//! Managed Kubernetes clusters.

use azcompose_common::error::ComposeError;
use azcompose_core::resource::DeclarationMode;
use azcompose_core::{Handle, Input, Output, PropertyMap, PropertyValue, ResourceKind};
use base64::Engine;

schema_enum! {
    /// Role of an agent pool.
    AgentPoolMode {
        /// Hosts system pods.
        System => "System",
        /// Hosts application pods only.
        User => "User",
    }
}

schema_enum! {
    /// Node operating system.
    OsType {
        /// Linux nodes.
        Linux => "Linux",
        /// Windows nodes.
        Windows => "Windows",
    }
}

schema_enum! {
    /// How agent pool nodes are grouped.
    AgentPoolType {
        /// Scale set backed pool.
        VirtualMachineScaleSets => "VirtualMachineScaleSets",
        /// Availability set backed pool.
        AvailabilitySet => "AvailabilitySet",
    }
}

/// A node pool of a managed cluster.
#[derive(Debug, Clone)]
pub struct AgentPoolProfile {
    name: String,
    count: Input<i64>,
    vm_size: Input<String>,
    max_pods: u32,
    mode: AgentPoolMode,
    os_disk_size_gb: u32,
    os_type: OsType,
    pool_type: AgentPoolType,
}

impl AgentPoolProfile {
    /// A Linux system pool on scale sets with 110 pods per node and a
    /// 30 GB OS disk.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        count: impl Into<Input<i64>>,
        vm_size: impl Into<Input<String>>,
    ) -> Self {
        Self {
            name: name.into(),
            count: count.into(),
            vm_size: vm_size.into(),
            max_pods: 110,
            mode: AgentPoolMode::System,
            os_disk_size_gb: 30,
            os_type: OsType::Linux,
            pool_type: AgentPoolType::VirtualMachineScaleSets,
        }
    }

    /// Pool role.
    #[must_use]
    pub const fn mode(mut self, mode: AgentPoolMode) -> Self {
        self.mode = mode;
        self
    }

    /// Maximum pods per node.
    #[must_use]
    pub const fn max_pods(mut self, max_pods: u32) -> Self {
        self.max_pods = max_pods;
        self
    }
}

impl From<AgentPoolProfile> for PropertyValue {
    fn from(pool: AgentPoolProfile) -> Self {
        PropertyMap::new()
            .with("name", pool.name)
            .with("count", pool.count)
            .with("vmSize", pool.vm_size)
            .with("maxPods", pool.max_pods)
            .with("mode", pool.mode)
            .with("osDiskSizeGB", pool.os_disk_size_gb)
            .with("osType", pool.os_type)
            .with("type", pool.pool_type)
            .with("nodeLabels", PropertyMap::new())
            .into()
    }
}

/// Arguments for a managed cluster.
///
/// `servicePrincipalProfile.secret` is a secret slot.
#[derive(Debug, Clone)]
pub struct ManagedClusterArgs {
    resource_group_name: Input<String>,
    dns_prefix: Input<String>,
    kubernetes_version: Option<Input<String>>,
    enable_rbac: bool,
    kube_dashboard: bool,
    agent_pools: Vec<AgentPoolProfile>,
    admin_username: Option<Input<String>>,
    ssh_public_key: Option<Input<String>>,
    node_resource_group: Option<String>,
    service_principal: Option<(Input<String>, Input<String>)>,
}

impl ManagedClusterArgs {
    /// A cluster in the given resource group with RBAC enabled.
    #[must_use]
    pub fn new(
        resource_group_name: impl Into<Input<String>>,
        dns_prefix: impl Into<Input<String>>,
    ) -> Self {
        Self {
            resource_group_name: resource_group_name.into(),
            dns_prefix: dns_prefix.into(),
            kubernetes_version: None,
            enable_rbac: true,
            kube_dashboard: false,
            agent_pools: Vec::new(),
            admin_username: None,
            ssh_public_key: None,
            node_resource_group: None,
            service_principal: None,
        }
    }

    /// Kubernetes version (`1.18.14`).
    #[must_use]
    pub fn kubernetes_version(mut self, version: impl Into<Input<String>>) -> Self {
        self.kubernetes_version = Some(version.into());
        self
    }

    /// Enables the Kubernetes dashboard add-on.
    #[must_use]
    pub const fn kube_dashboard(mut self, enabled: bool) -> Self {
        self.kube_dashboard = enabled;
        self
    }

    /// Adds a node pool.
    #[must_use]
    pub fn agent_pool(mut self, pool: AgentPoolProfile) -> Self {
        self.agent_pools.push(pool);
        self
    }

    /// Linux admin account and its SSH public key.
    #[must_use]
    pub fn linux_profile(
        mut self,
        admin_username: impl Into<Input<String>>,
        ssh_public_key: impl Into<Input<String>>,
    ) -> Self {
        self.admin_username = Some(admin_username.into());
        self.ssh_public_key = Some(ssh_public_key.into());
        self
    }

    /// Name of the resource group holding the node resources.
    #[must_use]
    pub fn node_resource_group(mut self, name: impl Into<String>) -> Self {
        self.node_resource_group = Some(name.into());
        self
    }

    /// Service principal credentials the cluster runs as.
    #[must_use]
    pub fn service_principal(
        mut self,
        client_id: impl Into<Input<String>>,
        secret: impl Into<Input<String>>,
    ) -> Self {
        self.service_principal = Some((client_id.into(), secret.into()));
        self
    }
}

impl ResourceKind for ManagedClusterArgs {
    type Handle = ManagedCluster;
    const TYPE: &'static str = "azure-native:containerservice:ManagedCluster";
    const SECRET_INPUTS: &'static [&'static str] = &["servicePrincipalProfile.secret"];

    fn into_properties(self) -> PropertyMap {
        let linux_profile = self.admin_username.map(|user| {
            let keys: Vec<PropertyValue> = self
                .ssh_public_key
                .into_iter()
                .map(|key| PropertyMap::new().with("keyData", key).into())
                .collect();
            PropertyMap::new()
                .with("adminUsername", user)
                .with("ssh", PropertyMap::new().with("publicKeys", keys))
        });
        let service_principal = self.service_principal.map(|(client_id, secret)| {
            PropertyMap::new()
                .with("clientId", client_id)
                .with("secret", secret)
        });

        PropertyMap::new()
            .with("resourceGroupName", self.resource_group_name)
            .with("dnsPrefix", self.dns_prefix)
            .with_optional("kubernetesVersion", self.kubernetes_version)
            .with("enableRBAC", self.enable_rbac)
            .with(
                "addonProfiles",
                PropertyMap::new().with(
                    "KubeDashboard",
                    PropertyMap::new().with("enabled", self.kube_dashboard),
                ),
            )
            .with("agentPoolProfiles", self.agent_pools)
            .with_optional("linuxProfile", linux_profile)
            .with_optional("nodeResourceGroup", self.node_resource_group)
            .with_optional("servicePrincipalProfile", service_principal)
    }
}

resource_handle! {
    /// A declared managed cluster.
    ManagedCluster
}

/// Lookup of a cluster's user credentials.
#[derive(Debug, Clone)]
pub struct ListManagedClusterUserCredentialsArgs {
    resource_group_name: Input<String>,
    resource_name: Input<String>,
}

impl ListManagedClusterUserCredentialsArgs {
    /// Credentials of the named cluster.
    #[must_use]
    pub fn new(
        resource_group_name: impl Into<Input<String>>,
        resource_name: impl Into<Input<String>>,
    ) -> Self {
        Self {
            resource_group_name: resource_group_name.into(),
            resource_name: resource_name.into(),
        }
    }
}

impl ResourceKind for ListManagedClusterUserCredentialsArgs {
    type Handle = ClusterUserCredentials;
    const TYPE: &'static str = "azure-native:containerservice:listManagedClusterUserCredentials";
    const SECRET_OUTPUTS: &'static [&'static str] = &["kubeconfigs"];
    const MODE: DeclarationMode = DeclarationMode::Read;

    fn into_properties(self) -> PropertyMap {
        PropertyMap::new()
            .with("resourceGroupName", self.resource_group_name)
            .with("resourceName", self.resource_name)
    }
}

resource_handle! {
    /// Result of a credentials lookup.
    ClusterUserCredentials
}

impl ClusterUserCredentials {
    /// The kubeconfig at `index`, decoded from the base64 the provider
    /// returns. Always secret.
    #[must_use]
    pub fn kubeconfig(&self, index: usize) -> Output<String> {
        let resource = self.urn().to_string();
        self.0
            .output::<String>(&format!("kubeconfigs.{index}.value"))
            .try_map(move |encoded| {
                let bytes = base64::engine::general_purpose::STANDARD
                    .decode(encoded.trim())
                    .map_err(|e| ComposeError::Provider {
                        resource: resource.clone(),
                        message: format!("kubeconfig is not valid base64: {e}"),
                    })?;
                String::from_utf8(bytes).map_err(|e| ComposeError::Provider {
                    resource: resource.clone(),
                    message: format!("kubeconfig is not valid UTF-8: {e}"),
                })
            })
    }
}

#[cfg(test)]
mod tests {
    use azcompose_common::config::StackSettings;
    use azcompose_core::simulate::{SimulatedEngine, SimulatedProvisioner};
    use azcompose_core::{ResourceOptions, Stack};
    use serde_json::json;

    use super::*;

    #[test]
    fn plaintext_service_principal_secret_is_rejected() {
        let mut stack = Stack::new(StackSettings::new("t", "dev"));
        let err = stack
            .declare(
                "cluster",
                ManagedClusterArgs::new("rg", "dns").service_principal("client", "plaintext"),
                ResourceOptions::new(),
            )
            .unwrap_err();
        assert!(matches!(err, ComposeError::SecretLeak { .. }), "got: {err}");
    }

    #[test]
    fn pool_uses_schema_names() {
        let plan = ManagedClusterArgs::new("rg", "dns")
            .agent_pool(AgentPoolProfile::new("agentpool", 2_i64, "Standard_D2_v2"))
            .into_properties()
            .to_plan_json();
        let pool = &plan["agentPoolProfiles"][0];
        assert_eq!(pool["osDiskSizeGB"], 30);
        assert_eq!(pool["type"], "VirtualMachineScaleSets");
        assert_eq!(pool["mode"], "System");
        assert_eq!(plan["enableRBAC"], true);
    }

    #[tokio::test]
    async fn kubeconfig_is_decoded_after_lookup() {
        let composition = Stack::run(StackSettings::new("t", "dev"), |stack| {
            let creds = stack.declare(
                "creds",
                ListManagedClusterUserCredentialsArgs::new("rg", "cluster"),
                ResourceOptions::new(),
            )?;
            let kubeconfig = creds.kubeconfig(0);
            assert!(kubeconfig.is_secret());
            stack.export_secret("kubeconfig", kubeconfig)
        })
        .unwrap();

        let encoded = base64::engine::general_purpose::STANDARD.encode("apiVersion: v1\n");
        let provisioner = SimulatedProvisioner::new()
            .with_attributes("creds", json!({ "kubeconfigs": [{ "value": encoded }] }));
        let deployment = SimulatedEngine::new(provisioner)
            .deploy(&composition)
            .await
            .unwrap();
        match deployment.export("kubeconfig") {
            Some(azcompose_core::export::ResolvedExport::Secret(s)) => {
                assert_eq!(s.expose(), &json!("apiVersion: v1\n"));
            }
            other => panic!("expected secret export, got {other:?}"),
        }
    }
}
