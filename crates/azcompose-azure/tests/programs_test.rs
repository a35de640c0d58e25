//! Integration tests for the built-in programs.
//!
//! Each test composes a catalog program against explicit stack settings,
//! inspects the validated composition, and where useful hands it to the
//! simulated engine with provider attributes filled in.

#![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]

use azcompose_azure::programs::{self, catalog};
use azcompose_azure::random::RandomPasswordArgs;
use azcompose_common::config::StackSettings;
use azcompose_common::error::ComposeError;
use azcompose_core::export::ResolvedExport;
use azcompose_core::property::PropertyValue;
use azcompose_core::simulate::{SimulatedEngine, SimulatedProvisioner};
use azcompose_core::{Composition, ExportKind, ResourceOptions, Stack};
use base64::Engine as _;
use serde_json::{Value, json};

fn compose(program: &str, settings: StackSettings) -> azcompose_common::error::Result<Composition> {
    let program = programs::find(program).expect("program in catalog");
    Stack::run(settings, program.run)
}

fn plain(export: Option<&ResolvedExport>) -> Value {
    match export.expect("export resolved") {
        ResolvedExport::Plain(v) => v.clone(),
        ResolvedExport::Secret(_) => panic!("expected a plain export"),
    }
}

// ── Catalog ─────────────────────────────────────────────────────────

#[test]
fn every_program_composes_with_minimal_config() {
    for program in catalog() {
        let settings = StackSettings::new(program.project, "dev")
            .with_value("stack-basics:base_name", "demo");
        let result = Stack::run(settings, program.run);
        assert!(result.is_ok(), "{} failed: {:?}", program.name, result.err());
    }
}

#[test]
fn stack_basics_requires_base_name() {
    let err = compose("stack-basics", StackSettings::new("stack-basics", "dev")).unwrap_err();
    assert!(matches!(err, ComposeError::MissingConfig { .. }), "got {err:?}");

    let composition = compose(
        "stack-basics",
        StackSettings::new("stack-basics", "dev").with_value("stack-basics:base_name", "shop"),
    )
    .unwrap();
    assert!(composition.declaration("shop-rg").is_some());
    assert_eq!(
        composition.exports().get("resource_group_name").unwrap().kind(),
        ExportKind::Attribute
    );
}

#[test]
fn location_is_read_from_the_provider_namespace() {
    let composition = compose(
        "stack-basics",
        StackSettings::new("stack-basics", "dev")
            .with_value("stack-basics:base_name", "shop")
            .with_value("azure-native:location", "westus2"),
    )
    .unwrap();
    let rg = composition.declaration("shop-rg").unwrap();
    assert!(matches!(
        rg.properties.get("location"),
        Some(PropertyValue::Literal(Value::String(s))) if s == "westus2"
    ));
}

// ── Secrets ─────────────────────────────────────────────────────────

#[test]
fn webserver_generates_a_password_when_none_is_configured() {
    let composition = compose("webserver", StackSettings::new("webserver", "dev")).unwrap();
    let generated = composition.declaration("password").expect("generated password");
    assert_eq!(generated.type_token.as_str(), "random:index/randomPassword:RandomPassword");

    let vm = composition.declaration("server-vm").unwrap();
    assert!(vm.dependencies.contains(&generated.urn));
    let password = vm.properties.get_path("osProfile.adminPassword").unwrap();
    assert!(password.is_secret());
    assert!(!password.has_plain_literal());
}

#[test]
fn webserver_uses_the_configured_secret() {
    let composition = compose(
        "webserver",
        StackSettings::new("webserver", "dev").with_secret("webserver:password", "s3cret!"),
    )
    .unwrap();
    assert!(composition.declaration("password").is_none());

    let rendered = serde_json::to_string(&composition.plan().unwrap()).unwrap();
    assert!(!rendered.contains("s3cret!"), "plan leaked the password");
}

#[test]
fn plain_export_of_a_secret_is_rejected() {
    let err = Stack::run(StackSettings::new("t", "dev"), |stack| {
        let password = stack.declare("pw", RandomPasswordArgs::new(16), ResourceOptions::new())?;
        stack.export("password", password.result())
    })
    .unwrap_err();
    assert!(matches!(err, ComposeError::SecretLeak { .. }), "got {err:?}");
}

#[test]
fn plain_read_of_a_secret_key_is_rejected() {
    let err = compose(
        "webserver",
        StackSettings::new("webserver", "dev").with_secret("webserver:username", "root"),
    )
    .unwrap_err();
    assert!(matches!(err, ComposeError::SecretLeak { .. }), "got {err:?}");
}

#[test]
fn aks_kubeconfig_is_exported_as_secret() {
    let composition = compose("aks-apache", StackSettings::new("aks-apache", "dev")).unwrap();
    let kubeconfig = composition.exports().get("kubeconfig").unwrap();
    assert!(kubeconfig.secret);
    assert_eq!(kubeconfig.kind(), ExportKind::Derived);

    let provider = composition.declaration("k8s-provider").unwrap();
    let chart = composition.declaration("apache-chart").unwrap();
    assert_eq!(chart.options.provider.as_ref().unwrap().urn, provider.urn);
    assert!(chart.dependencies.contains(&provider.urn));
}

// ── Exports ─────────────────────────────────────────────────────────

#[test]
fn static_website_exports_attribute_and_derived_values() {
    let composition = compose("static-website", StackSettings::new("static-website", "dev")).unwrap();
    let exports = composition.exports();
    assert_eq!(exports.get("staticEndpoint").unwrap().kind(), ExportKind::Attribute);
    assert_eq!(exports.get("cdnEndpoint").unwrap().kind(), ExportKind::Derived);
    assert_eq!(exports.get("cdnEndpoint").unwrap().display_value(), "<computed>");
}

// ── Components ──────────────────────────────────────────────────────

#[test]
fn static_website_frontend_is_protected_by_default() {
    let composition = compose("static-website", StackSettings::new("static-website", "dev")).unwrap();
    let frontend = composition.component("component-frontend").expect("frontend");
    let children = composition.descendants(&frontend.urn);
    assert_eq!(children.len(), 2);
    assert!(children.iter().all(|d| d.options.protect));
    assert!(!composition.declaration("component-sa").unwrap().options.protect);
}

#[test]
fn protection_can_be_switched_off() {
    let composition = compose(
        "webserver",
        StackSettings::new("webserver", "dev").with_value("webserver:protect", "false"),
    )
    .unwrap();
    let network = composition.component("network").unwrap();
    assert!(composition.descendants(&network.urn).iter().all(|d| !d.options.protect));
}

#[test]
fn webserver_vm_waits_for_the_network_interface() {
    let composition = compose("webserver", StackSettings::new("webserver", "dev")).unwrap();
    let nic = composition.declaration("network-nic").unwrap();
    let vm = composition.declaration("server-vm").unwrap();
    assert!(vm.dependencies.contains(&nic.urn));

    let order: Vec<String> = composition
        .plan()
        .unwrap()
        .resources
        .into_iter()
        .map(|r| r.name.to_string())
        .collect();
    let position = |name: &str| order.iter().position(|n| n == name).unwrap();
    assert!(position("server") < position("network-vnet"));
    assert!(position("network-nic") < position("server-vm"));
    assert!(position("network-nic") < position("network-ip-lookup"));
}

// ── Simulated deployment ────────────────────────────────────────────

#[tokio::test]
async fn static_website_deploys_and_resolves_endpoints() {
    let composition = compose("static-website", StackSettings::new("static-website", "dev")).unwrap();
    let provisioner = SimulatedProvisioner::new()
        .with_attributes(
            "component-sa",
            json!({ "primaryEndpoints": { "web": "https://componentsa.z22.web.core.windows.net/" } }),
        )
        .with_attributes("component-staticWebsite", json!({ "containerName": "$web" }))
        .with_attributes(
            "component-frontend-endpoint",
            json!({ "hostName": "cdn-endpnt-component-sa.azureedge.net" }),
        );
    let engine = SimulatedEngine::new(provisioner);
    let mut deployment = engine.deploy(&composition).await.unwrap();

    assert_eq!(
        plain(deployment.export("staticEndpoint")),
        json!("https://componentsa.z22.web.core.windows.net/")
    );
    assert_eq!(
        plain(deployment.export("cdnEndpoint")),
        json!("https://cdn-endpnt-component-sa.azureedge.net")
    );
    assert_eq!(
        plain(deployment.component_output("component-frontend", "cdnUrl")),
        json!("https://cdn-endpnt-component-sa.azureedge.net")
    );

    let endpoint = composition.declaration("component-frontend-endpoint").unwrap();
    let inputs = deployment.state().attributes(&endpoint.urn).unwrap();
    assert_eq!(inputs["originHostHeader"], json!("componentsa.z22.web.core.windows.net"));
    assert_eq!(inputs["endpointName"], json!("cdn-endpnt-component-sa"));

    let err = deployment.destroy().unwrap_err();
    assert!(matches!(err, ComposeError::Provider { .. }), "got {err:?}");
}

#[tokio::test]
async fn webserver_deploys_with_a_generated_password() {
    let composition = compose(
        "webserver",
        StackSettings::new("webserver", "dev").with_value("webserver:protect", "false"),
    )
    .unwrap();
    let provisioner = SimulatedProvisioner::new()
        .with_attributes("password", json!({ "result": "Xy_9@generated" }))
        .with_attributes(
            "network-vnet",
            json!({ "subnets": [{ "id": "/subnets/default" }] }),
        )
        .with_attributes("network-ip-lookup", json!({ "ipAddress": "20.1.2.3" }));
    let engine = SimulatedEngine::new(provisioner);
    let mut deployment = engine.deploy(&composition).await.unwrap();

    assert_eq!(plain(deployment.export("public_ip")), json!("20.1.2.3"));
    let vm = composition.declaration("server-vm").unwrap();
    let attributes = deployment.state().attributes(&vm.urn).unwrap();
    assert_eq!(attributes["osProfile"]["adminPassword"], json!("Xy_9@generated"));
    assert_eq!(attributes["osProfile"]["computerName"], json!("hostname"));

    let created = deployment.created().len();
    assert_eq!(deployment.destroy().unwrap(), created);
}

#[tokio::test]
async fn aks_kubeconfig_is_decoded_and_kept_secret() {
    let composition = compose("aks-apache", StackSettings::new("aks-apache", "dev")).unwrap();
    let encoded = base64::engine::general_purpose::STANDARD.encode("apiVersion: v1\nkind: Config\n");
    let provisioner = SimulatedProvisioner::new()
        .with_attributes("ssh-key", json!({ "publicKeyOpenssh": "ssh-rsa AAAAB3Nza" }))
        .with_attributes("app", json!({ "applicationId": "00000000-0000-0000-0000-00000000a11c" }))
        .with_attributes("creds", json!({ "kubeconfigs": [{ "name": "clusterUser", "value": encoded }] }))
        .with_attributes(
            "apache-chart",
            json!({
                "resources": {
                    "v1/Service:apache-chart": {
                        "status": { "loadBalancer": { "ingress": [{ "ip": "52.0.0.7" }] } }
                    }
                }
            }),
        );
    let engine = SimulatedEngine::new(provisioner);
    let deployment = engine.deploy(&composition).await.unwrap();

    match deployment.export("kubeconfig").unwrap() {
        ResolvedExport::Secret(s) => assert_eq!(s.expose(), &json!("apiVersion: v1\nkind: Config\n")),
        ResolvedExport::Plain(_) => panic!("kubeconfig must stay secret"),
    }
    assert_eq!(plain(deployment.export("apache_service_ip")), json!("52.0.0.7"));
    assert_eq!(plain(deployment.export("cluster_name")), json!("cluster"));
}

#[tokio::test]
async fn provider_failure_stops_the_deployment() {
    let composition = compose(
        "stack-basics",
        StackSettings::new("stack-basics", "dev").with_value("stack-basics:base_name", "shop"),
    )
    .unwrap();
    let engine = SimulatedEngine::new(SimulatedProvisioner::new().failing("shop-rg", "quota exceeded"));
    let err = engine.deploy(&composition).await.unwrap_err();
    assert!(matches!(err, ComposeError::Provider { ref message, .. } if message == "quota exceeded"));
    assert_eq!(engine.provisioner().calls().await.len(), 1);
}
