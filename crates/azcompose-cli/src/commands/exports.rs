//! `azc exports`: List the stack outputs a program registers.

use azcompose_core::Composition;
use clap::Args;

use super::StackSource;
use crate::output;

/// Arguments for the `exports` command.
#[derive(Args, Debug)]
pub struct ExportsArgs {
    /// Built-in program to compose.
    pub program: String,

    /// Print the export records as JSON.
    #[arg(long)]
    pub json: bool,
}

/// Executes the `exports` command.
///
/// Values produced by the engine print as `<computed>`; secret values
/// print as the redaction marker.
///
/// # Errors
///
/// Returns an error if composition fails.
pub fn execute(source: &StackSource, args: &ExportsArgs) -> anyhow::Result<()> {
    let composition = super::compose(source, &args.program)?;
    if args.json {
        return output::emit_json(&composition.plan()?.exports);
    }
    output::emit(&render(&composition));
    Ok(())
}

pub(crate) fn render(composition: &Composition) -> String {
    let rows: Vec<Vec<String>> = composition
        .exports()
        .iter()
        .map(|e| {
            vec![
                e.name.to_string(),
                format!("{:?}", e.kind()).to_lowercase(),
                if e.secret { "yes" } else { "no" }.to_string(),
                e.display_value(),
            ]
        })
        .collect();
    output::table(&["NAME", "KIND", "SECRET", "VALUE"], &rows)
}

#[cfg(test)]
mod tests {
    use azcompose_azure::programs::find;
    use azcompose_common::config::StackSettings;
    use azcompose_core::Stack;

    use super::*;

    #[test]
    fn aks_exports_list_kinds_and_redact_kubeconfig() {
        let composition = Stack::run(
            StackSettings::new("aks-apache", "dev"),
            find("aks-apache").unwrap().run,
        )
        .unwrap();
        let text = render(&composition);
        let kubeconfig = text.lines().find(|l| l.starts_with("kubeconfig")).unwrap();
        assert!(kubeconfig.contains("derived"));
        assert!(kubeconfig.contains("yes"));
        assert!(kubeconfig.ends_with("[secret]"));
        let cluster = text.lines().find(|l| l.starts_with("cluster_name")).unwrap();
        assert!(cluster.contains("attribute"));
        assert!(cluster.ends_with("<computed>"));
    }
}
