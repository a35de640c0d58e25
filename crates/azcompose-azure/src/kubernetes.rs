//! Kubernetes provider instances and Helm charts.
//!
//! A chart is declared against an explicit [`Provider`] through
//! [`ResourceOptions::provider`](azcompose_core::ResourceOptions::provider);
//! the kubeconfig the provider is built from is a secret slot.

use azcompose_core::{Input, Output, PropertyMap, ResourceKind};
use serde_json::Value;

/// Arguments for an explicit Kubernetes provider.
#[derive(Debug, Clone)]
pub struct ProviderArgs {
    kubeconfig: Input<String>,
}

impl ProviderArgs {
    /// A provider talking to the cluster described by `kubeconfig`.
    #[must_use]
    pub fn new(kubeconfig: impl Into<Input<String>>) -> Self {
        Self {
            kubeconfig: kubeconfig.into(),
        }
    }
}

impl ResourceKind for ProviderArgs {
    type Handle = Provider;
    const TYPE: &'static str = "azc:providers:kubernetes";
    const SECRET_INPUTS: &'static [&'static str] = &["kubeconfig"];

    fn into_properties(self) -> PropertyMap {
        PropertyMap::new().with("kubeconfig", self.kubeconfig)
    }
}

resource_handle! {
    /// A declared Kubernetes provider.
    Provider
}

/// Arguments for a Helm chart release.
#[derive(Debug, Clone)]
pub struct ChartArgs {
    chart: String,
    version: Option<String>,
    repo: Option<String>,
    values: Option<Value>,
}

impl ChartArgs {
    /// Installs `chart` at its latest version.
    #[must_use]
    pub fn new(chart: impl Into<String>) -> Self {
        Self {
            chart: chart.into(),
            version: None,
            repo: None,
            values: None,
        }
    }

    /// Chart version (`8.3.2`).
    #[must_use]
    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Repository the chart is fetched from.
    #[must_use]
    pub fn repo(mut self, repo: impl Into<String>) -> Self {
        self.repo = Some(repo.into());
        self
    }

    /// Values overriding the chart defaults.
    #[must_use]
    pub fn values(mut self, values: Value) -> Self {
        self.values = Some(values);
        self
    }
}

impl ResourceKind for ChartArgs {
    type Handle = Chart;
    const TYPE: &'static str = "kubernetes:helm.sh/v3:Chart";

    fn into_properties(self) -> PropertyMap {
        PropertyMap::new()
            .with("chart", self.chart)
            .with_optional("version", self.version)
            .with_optional(
                "fetchOpts",
                self.repo.map(|repo| PropertyMap::new().with("repo", repo)),
            )
            .with_optional("values", self.values)
    }
}

resource_handle! {
    /// A declared chart release.
    Chart
}

impl Chart {
    /// Load balancer ingress IP of a `v1/Service` the chart created.
    #[must_use]
    pub fn service_ip(&self, service: &str) -> Output<String> {
        self.0.output(&format!(
            "resources.v1/Service:{service}.status.loadBalancer.ingress.0.ip"
        ))
    }
}

#[cfg(test)]
mod tests {
    use azcompose_common::config::StackSettings;
    use azcompose_common::error::ComposeError;
    use azcompose_core::{Handle, ResourceOptions, Stack};

    use super::*;

    #[test]
    fn plaintext_kubeconfig_is_rejected() {
        let mut stack = Stack::new(StackSettings::new("t", "dev"));
        let err = stack
            .declare("k8s", ProviderArgs::new("apiVersion: v1"), ResourceOptions::new())
            .unwrap_err();
        assert!(matches!(err, ComposeError::SecretLeak { .. }));
    }

    #[test]
    fn chart_records_provider() {
        let mut stack = Stack::new(StackSettings::new("t", "dev"));
        let provider = stack
            .declare(
                "k8s",
                ProviderArgs::new(azcompose_core::Secret::new("apiVersion: v1".to_string())),
                ResourceOptions::new(),
            )
            .unwrap();
        let chart = stack
            .declare(
                "apache-chart",
                ChartArgs::new("apache").version("8.3.2").repo("https://charts.bitnami.com/bitnami"),
                ResourceOptions::new().provider(&provider),
            )
            .unwrap();
        let composition = stack.finish().unwrap();
        let decl = composition.declaration("apache-chart").unwrap();
        assert_eq!(decl.options.provider.as_ref().map(|p| p.package.as_str()), Some("kubernetes"));
        assert!(decl.dependencies.contains(provider.urn()));
        assert!(!chart.service_ip("apache-chart").is_secret());
    }
}
