//! Storage accounts, static websites, and blobs.

use azcompose_core::asset::FileAsset;
use azcompose_core::{Input, Output, PropertyMap, ResourceKind};

schema_enum! {
    /// Blob access tier.
    AccessTier {
        /// Frequently accessed data.
        Hot => "Hot",
        /// Infrequently accessed data.
        Cool => "Cool",
    }
}

schema_enum! {
    /// Storage account kind.
    Kind {
        /// General purpose v2.
        StorageV2 => "StorageV2",
        /// Blob-only account.
        BlobStorage => "BlobStorage",
    }
}

schema_enum! {
    /// Storage account SKU.
    SkuName {
        /// Locally redundant.
        StandardLrs => "Standard_LRS",
        /// Geo redundant.
        StandardGrs => "Standard_GRS",
        /// Read-access geo redundant.
        StandardRagrs => "Standard_RAGRS",
        /// Premium locally redundant.
        PremiumLrs => "Premium_LRS",
    }
}

schema_enum! {
    /// Who manages the encryption keys.
    KeySource {
        /// Microsoft-managed keys.
        MicrosoftStorage => "Microsoft.Storage",
        /// Customer-managed keys in Key Vault.
        MicrosoftKeyvault => "Microsoft.Keyvault",
    }
}

schema_enum! {
    /// Traffic that bypasses the network rules.
    Bypass {
        /// Trusted Azure services.
        AzureServices => "AzureServices",
        /// Nothing bypasses.
        None => "None",
    }
}

schema_enum! {
    /// Network rule fallback.
    DefaultAction {
        /// Allow unmatched traffic.
        Allow => "Allow",
        /// Deny unmatched traffic.
        Deny => "Deny",
    }
}

/// Encryption settings for a storage account.
#[derive(Debug, Clone, Copy)]
pub struct Encryption {
    /// Key management.
    pub key_source: KeySource,
    /// Encrypt blob storage.
    pub blob: bool,
    /// Encrypt file storage.
    pub file: bool,
}

/// Network rules for a storage account.
#[derive(Debug, Clone, Copy)]
pub struct NetworkRuleSet {
    /// Traffic that skips the rules.
    pub bypass: Bypass,
    /// Fallback for unmatched traffic.
    pub default_action: DefaultAction,
}

/// Arguments for a storage account.
#[derive(Debug, Clone)]
pub struct StorageAccountArgs {
    resource_group_name: Input<String>,
    location: Option<Input<String>>,
    sku: SkuName,
    kind: Kind,
    access_tier: Option<AccessTier>,
    enable_https_traffic_only: Option<bool>,
    encryption: Option<Encryption>,
    network_rule_set: Option<NetworkRuleSet>,
}

impl StorageAccountArgs {
    /// An account in the given resource group.
    #[must_use]
    pub fn new(resource_group_name: impl Into<Input<String>>, sku: SkuName, kind: Kind) -> Self {
        Self {
            resource_group_name: resource_group_name.into(),
            location: None,
            sku,
            kind,
            access_tier: None,
            enable_https_traffic_only: None,
            encryption: None,
            network_rule_set: None,
        }
    }

    /// Azure region.
    #[must_use]
    pub fn location(mut self, location: impl Into<Input<String>>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Blob access tier.
    #[must_use]
    pub const fn access_tier(mut self, tier: AccessTier) -> Self {
        self.access_tier = Some(tier);
        self
    }

    /// Rejects plain HTTP.
    #[must_use]
    pub const fn enable_https_traffic_only(mut self, enabled: bool) -> Self {
        self.enable_https_traffic_only = Some(enabled);
        self
    }

    /// Encryption at rest.
    #[must_use]
    pub const fn encryption(mut self, encryption: Encryption) -> Self {
        self.encryption = Some(encryption);
        self
    }

    /// Network rules.
    #[must_use]
    pub const fn network_rule_set(mut self, rules: NetworkRuleSet) -> Self {
        self.network_rule_set = Some(rules);
        self
    }
}

impl ResourceKind for StorageAccountArgs {
    type Handle = StorageAccount;
    const TYPE: &'static str = "azure-native:storage:StorageAccount";

    fn into_properties(self) -> PropertyMap {
        let enabled = |on: bool| PropertyMap::new().with("enabled", on);
        PropertyMap::new()
            .with("resourceGroupName", self.resource_group_name)
            .with_optional("location", self.location)
            .with("sku", PropertyMap::new().with("name", self.sku))
            .with("kind", self.kind)
            .with_optional("accessTier", self.access_tier)
            .with_optional("enableHttpsTrafficOnly", self.enable_https_traffic_only)
            .with_optional(
                "encryption",
                self.encryption.map(|e| {
                    PropertyMap::new().with("keySource", e.key_source).with(
                        "services",
                        PropertyMap::new()
                            .with("blob", enabled(e.blob))
                            .with("file", enabled(e.file)),
                    )
                }),
            )
            .with_optional(
                "networkRuleSet",
                self.network_rule_set.map(|r| {
                    PropertyMap::new()
                        .with("bypass", r.bypass)
                        .with("defaultAction", r.default_action)
                }),
            )
    }
}

resource_handle! {
    /// A declared storage account.
    StorageAccount
}

impl StorageAccount {
    /// Web endpoint of the account's static website
    /// (`https://<account>.z22.web.core.windows.net/`).
    #[must_use]
    pub fn primary_web_endpoint(&self) -> Output<String> {
        self.0.output("primaryEndpoints.web")
    }

    /// Blob endpoint.
    #[must_use]
    pub fn primary_blob_endpoint(&self) -> Output<String> {
        self.0.output("primaryEndpoints.blob")
    }
}

/// Arguments enabling static website hosting on an account.
#[derive(Debug, Clone)]
pub struct StorageAccountStaticWebsiteArgs {
    resource_group_name: Input<String>,
    account_name: Input<String>,
    index_document: Option<String>,
    error404_document: Option<String>,
}

impl StorageAccountStaticWebsiteArgs {
    /// Enables hosting on the given account.
    #[must_use]
    pub fn new(
        resource_group_name: impl Into<Input<String>>,
        account_name: impl Into<Input<String>>,
    ) -> Self {
        Self {
            resource_group_name: resource_group_name.into(),
            account_name: account_name.into(),
            index_document: None,
            error404_document: None,
        }
    }

    /// Default document (`index.html`).
    #[must_use]
    pub fn index_document(mut self, document: impl Into<String>) -> Self {
        self.index_document = Some(document.into());
        self
    }

    /// Not-found document (`404.html`).
    #[must_use]
    pub fn error404_document(mut self, document: impl Into<String>) -> Self {
        self.error404_document = Some(document.into());
        self
    }
}

impl ResourceKind for StorageAccountStaticWebsiteArgs {
    type Handle = StorageAccountStaticWebsite;
    const TYPE: &'static str = "azure-native:storage:StorageAccountStaticWebsite";

    fn into_properties(self) -> PropertyMap {
        PropertyMap::new()
            .with("resourceGroupName", self.resource_group_name)
            .with("accountName", self.account_name)
            .with_optional("indexDocument", self.index_document)
            .with_optional("error404Document", self.error404_document)
    }
}

resource_handle! {
    /// Static website hosting on a storage account.
    StorageAccountStaticWebsite
}

impl StorageAccountStaticWebsite {
    /// Name of the container that serves the site (`$web`).
    #[must_use]
    pub fn container_name(&self) -> Output<String> {
        self.0.output("containerName")
    }
}

/// Arguments for a blob uploaded from a local file.
#[derive(Debug, Clone)]
pub struct BlobArgs {
    resource_group_name: Input<String>,
    account_name: Input<String>,
    container_name: Input<String>,
    source: FileAsset,
    content_type: Option<String>,
}

impl BlobArgs {
    /// Uploads `source` into the given container. The file is passed to
    /// the engine by path and never read here.
    #[must_use]
    pub fn new(
        resource_group_name: impl Into<Input<String>>,
        account_name: impl Into<Input<String>>,
        container_name: impl Into<Input<String>>,
        source: FileAsset,
    ) -> Self {
        Self {
            resource_group_name: resource_group_name.into(),
            account_name: account_name.into(),
            container_name: container_name.into(),
            source,
            content_type: None,
        }
    }

    /// MIME type served with the blob.
    #[must_use]
    pub fn content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }
}

impl ResourceKind for BlobArgs {
    type Handle = Blob;
    const TYPE: &'static str = "azure-native:storage:Blob";

    fn into_properties(self) -> PropertyMap {
        PropertyMap::new()
            .with("resourceGroupName", self.resource_group_name)
            .with("accountName", self.account_name)
            .with("containerName", self.container_name)
            .with("source", self.source)
            .with_optional("contentType", self.content_type)
    }
}

resource_handle! {
    /// A declared blob.
    Blob
}

impl Blob {
    /// Public URL of the blob.
    #[must_use]
    pub fn url(&self) -> Output<String> {
        self.0.output("url")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn account_properties_use_schema_names() {
        let plan = StorageAccountArgs::new("rg", SkuName::StandardLrs, Kind::StorageV2)
            .access_tier(AccessTier::Hot)
            .enable_https_traffic_only(true)
            .encryption(Encryption {
                key_source: KeySource::MicrosoftStorage,
                blob: true,
                file: true,
            })
            .network_rule_set(NetworkRuleSet {
                bypass: Bypass::AzureServices,
                default_action: DefaultAction::Allow,
            })
            .into_properties()
            .to_plan_json();
        assert_eq!(plan["sku"]["name"], "Standard_LRS");
        assert_eq!(plan["kind"], "StorageV2");
        assert_eq!(plan["encryption"]["keySource"], "Microsoft.Storage");
        assert_eq!(plan["encryption"]["services"]["file"]["enabled"], true);
        assert_eq!(plan["networkRuleSet"]["bypass"], "AzureServices");
    }

    #[test]
    fn blob_source_is_passed_as_asset() {
        let plan = BlobArgs::new("rg", "acct", "$web", FileAsset::new("./wwwroot/missing.html"))
            .content_type("text/html")
            .into_properties()
            .to_plan_json();
        assert_eq!(plan["source"]["$asset"], "./wwwroot/missing.html");
    }
}
