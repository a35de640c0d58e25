//! `azc preview`: Show what a program would deploy.

use std::fmt::Write as _;

use azcompose_common::types::Urn;
use azcompose_core::Composition;
use azcompose_core::resource::DeclarationMode;
use clap::Args;

use super::StackSource;
use crate::output;

/// Arguments for the `preview` command.
#[derive(Args, Debug)]
pub struct PreviewArgs {
    /// Built-in program to compose.
    pub program: String,

    /// Print the full plan as JSON instead of a tree.
    #[arg(long)]
    pub json: bool,
}

/// Executes the `preview` command.
///
/// Composes the program, then prints every node in dependency order,
/// indented under its component, followed by the configuration read and
/// the exports. Secret values are always redacted.
///
/// # Errors
///
/// Returns an error if composition fails; nothing is printed in that case.
pub fn execute(source: &StackSource, args: &PreviewArgs) -> anyhow::Result<()> {
    let composition = super::compose(source, &args.program)?;
    if args.json {
        return output::emit_json(&composition.plan()?);
    }
    output::emit(&render(&args.program, &composition)?);
    Ok(())
}

fn depth(composition: &Composition, parent: Option<&Urn>) -> usize {
    let mut depth = 0;
    let mut current = parent.cloned();
    while let Some(urn) = current {
        depth += 1;
        current = composition.component_by_urn(&urn).and_then(|c| c.parent.clone());
    }
    depth
}

/// Renders the preview tree.
///
/// # Errors
///
/// Returns an error if the graph has a cycle.
pub(crate) fn render(program: &str, composition: &Composition) -> anyhow::Result<String> {
    let settings = composition.settings();
    let mut out = output::heading(&format!(
        "Preview of {program} ({}/{})",
        settings.project, settings.stack
    ));
    out.push('\n');

    for urn in composition.graph().resolve_order()? {
        if let Some(component) = composition.component_by_urn(&urn) {
            let indent = "    ".repeat(depth(composition, component.parent.as_ref()));
            let protect = if component.options.protect { "  [protected]" } else { "" };
            let _ = writeln!(
                out,
                "  {indent}+ {}  {}{protect}",
                component.name, component.type_token
            );
        } else if let Some(decl) = composition.declaration_by_urn(&urn) {
            let indent = "    ".repeat(depth(composition, decl.parent.as_ref()));
            let marker = match decl.mode {
                DeclarationMode::Managed => '+',
                DeclarationMode::Read => '>',
            };
            let protect = if decl.options.protect { "  [protected]" } else { "" };
            let _ = writeln!(out, "  {indent}{marker} {}  {}{protect}", decl.name, decl.type_token);

            let waits: Vec<String> = decl
                .dependencies
                .iter()
                .filter(|d| Some(*d) != decl.parent.as_ref())
                .map(Urn::name)
                .collect();
            if !waits.is_empty() {
                let _ = writeln!(out, "  {indent}      waits for: {}", waits.join(", "));
            }
            if let Some(provider) = &decl.options.provider {
                let _ = writeln!(out, "  {indent}      provider: {}", provider.urn.name());
            }
        }
    }

    let reads = composition.config_reads();
    if !reads.is_empty() {
        out.push_str("\n  Config:\n");
        for read in reads {
            let _ = writeln!(out, "    {}  {}", read.key, super::config::status(read));
        }
    }

    let exports = composition.exports();
    if !exports.is_empty() {
        out.push_str("\n  Exports:\n");
        for export in exports.iter() {
            let _ = writeln!(out, "    {} = {}", export.name, export.display_value());
        }
    }

    let _ = writeln!(
        out,
        "\n  {}, {}, {}.",
        output::plural(composition.declarations().len(), "resource"),
        output::plural(composition.components().len(), "component"),
        output::plural(exports.len(), "export"),
    );
    Ok(out)
}

#[cfg(test)]
mod tests {
    use azcompose_azure::programs::find;
    use azcompose_common::config::StackSettings;
    use azcompose_core::Stack;

    use super::*;

    fn preview(program: &str, settings: StackSettings) -> String {
        let composition = Stack::run(settings, find(program).unwrap().run).unwrap();
        render(program, &composition).unwrap()
    }

    #[test]
    fn children_are_indented_under_their_component() {
        let text = preview("webserver", StackSettings::new("webserver", "dev"));
        assert!(text.contains("  + network  azc:network:ServerNetwork  [protected]"), "{text}");
        assert!(text.contains("      + network-nic  azure-native:network:NetworkInterface  [protected]"));
        let lines: Vec<&str> = text.lines().collect();
        let lookup = lines
            .iter()
            .position(|l| l.starts_with("      > network-ip-lookup"))
            .unwrap();
        assert!(lines[lookup + 1].contains("waits for:"));
        assert!(lines[lookup + 1].contains("network-nic"));
    }

    #[test]
    fn secrets_never_reach_the_preview() {
        let text = preview(
            "webserver",
            StackSettings::new("webserver", "dev").with_secret("webserver:password", "hunter2"),
        );
        assert!(!text.contains("hunter2"));
        assert!(text.contains("webserver:password  secret, set"));
    }

    #[test]
    fn summary_counts_everything() {
        let text = preview("static-website", StackSettings::new("static-website", "dev"));
        assert!(text.contains("7 resources, 1 component, 2 exports."), "{text}");
        assert!(text.contains("cdnEndpoint = <computed>"));
    }
}
