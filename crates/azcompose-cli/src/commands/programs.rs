//! `azc programs`: List the built-in programs.

use azcompose_azure::programs::catalog;
use clap::Args;

use crate::output;

/// Arguments for the `programs` command.
#[derive(Args, Debug)]
pub struct ProgramsArgs {}

/// Executes the `programs` command.
///
/// # Errors
///
/// Never fails; the signature matches the other commands.
#[allow(clippy::unnecessary_wraps)]
pub fn execute(_args: &ProgramsArgs) -> anyhow::Result<()> {
    output::emit(&render());
    Ok(())
}

fn render() -> String {
    let rows: Vec<Vec<String>> = catalog()
        .iter()
        .map(|p| vec![p.name.to_string(), p.description.to_string()])
        .collect();
    output::table(&["NAME", "DESCRIPTION"], &rows)
}
