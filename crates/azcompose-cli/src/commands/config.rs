//! `azc config`: Show the configuration keys a program reads.

use azcompose_core::Composition;
use azcompose_core::config::ConfigRead;
use clap::Args;

use super::StackSource;
use crate::output;

/// Arguments for the `config` command.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    /// Built-in program to compose.
    pub program: String,
}

/// Executes the `config` command.
///
/// Lists every key the program read, in read order, and whether the stack
/// settings supplied it. Values are never printed.
///
/// # Errors
///
/// Returns an error if composition fails, including a required key being
/// absent.
pub fn execute(source: &StackSource, args: &ConfigArgs) -> anyhow::Result<()> {
    let composition = super::compose(source, &args.program)?;
    output::emit(&render(&composition));
    Ok(())
}

/// `plain, set`, `secret, default`, `plain, unset`.
pub(crate) fn status(read: &ConfigRead) -> String {
    let kind = if read.secret { "secret" } else { "plain" };
    let source = match (read.found, read.defaulted) {
        (true, _) => "set",
        (false, true) => "default",
        (false, false) => "unset",
    };
    format!("{kind}, {source}")
}

pub(crate) fn render(composition: &Composition) -> String {
    let rows: Vec<Vec<String>> = composition
        .config_reads()
        .iter()
        .map(|read| vec![read.key.clone(), status(read)])
        .collect();
    output::table(&["KEY", "STATUS"], &rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read(secret: bool, found: bool, defaulted: bool) -> ConfigRead {
        ConfigRead {
            key: "webserver:password".into(),
            secret,
            found,
            defaulted,
        }
    }

    #[test]
    fn status_reports_source() {
        assert_eq!(status(&read(true, true, false)), "secret, set");
        assert_eq!(status(&read(false, false, true)), "plain, default");
        assert_eq!(status(&read(false, false, false)), "plain, unset");
    }
}
