//! Static website on a storage account, fronted by a CDN component.

use azcompose_common::error::Result;
use azcompose_core::asset::FileAsset;
use azcompose_core::{ResourceOptions, Stack};

use super::resource_group;
use crate::components::{FrontendArgs, frontend};
use crate::storage::{
    AccessTier, BlobArgs, Bypass, DefaultAction, Encryption, Kind, KeySource, NetworkRuleSet,
    SkuName, StorageAccountArgs, StorageAccountStaticWebsiteArgs,
};

/// Pages uploaded from the local `wwwroot` directory.
const PAGES: &[(&str, &str)] = &[("index_html", "index.html"), ("notfound_html", "404.html")];

/// Declares the account, enables static hosting, uploads the pages, and
/// puts a protected CDN frontend in front of the site.
///
/// Reads `base_name` (default `component`) and `protect` (default `true`).
/// Exports `staticEndpoint`, the account's web endpoint as reported, and
/// `cdnEndpoint`, the CDN host turned into a URL.
///
/// # Errors
///
/// Returns any composition error.
pub fn run(stack: &mut Stack) -> Result<()> {
    let config = stack.config();
    let base_name = config.get_or("base_name", "component")?;
    let protect = config.get_bool_or("protect", true)?;

    let rg = resource_group(stack, &format!("{base_name}-rg"))?;
    let account = stack.declare(
        &format!("{base_name}-sa"),
        StorageAccountArgs::new(rg.name(), SkuName::StandardLrs, Kind::StorageV2)
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
            }),
        ResourceOptions::new(),
    )?;

    let web_endpoint = account.primary_web_endpoint();
    let origin_host = web_endpoint
        .clone()
        .map(|url| url.replace("https://", "").replace('/', ""));

    let site = stack.declare(
        &format!("{base_name}-staticWebsite"),
        StorageAccountStaticWebsiteArgs::new(rg.name(), account.name())
            .index_document("index.html")
            .error404_document("404.html"),
        ResourceOptions::new(),
    )?;
    for (name, file) in PAGES {
        let _ = stack.declare(
            name,
            BlobArgs::new(
                rg.name(),
                account.name(),
                site.container_name(),
                FileAsset::new(format!("./wwwroot/{file}")),
            )
            .content_type("text/html"),
            ResourceOptions::new(),
        )?;
    }

    let cdn = frontend(
        stack,
        &format!("{base_name}-frontend"),
        FrontendArgs::new(rg.name(), origin_host)
            .endpoint_name(account.name().map(|sa| format!("cdn-endpnt-{sa}"))),
        ResourceOptions::new().protect(protect),
    )?;

    stack.export("staticEndpoint", web_endpoint)?;
    stack.export("cdnEndpoint", &cdn.cdn_url)
}
