//! CLI command definitions and dispatch.

pub mod config;
pub mod exports;
pub mod graph;
pub mod preview;
pub mod programs;

use std::path::{Path, PathBuf};

use azcompose_azure::programs::{Program, find};
use azcompose_common::config::StackSettings;
use azcompose_common::constants::{BIN_NAME, DEFAULT_STACK, DEFAULT_STACK_FILE};
use azcompose_core::{Composition, Stack};
use clap::{Parser, Subcommand};

/// azcompose: compose Azure resource graphs from typed programs.
#[derive(Parser, Debug)]
#[command(name = BIN_NAME, version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,

    /// Path to the stack settings file. Defaults to `stack.yaml` when it
    /// exists, otherwise to empty settings for the program's project.
    #[arg(long, global = true, env = "AZC_STACK_FILE")]
    pub stack_file: Option<PathBuf>,

    /// Stack name, overriding the one in the stack file.
    #[arg(long, global = true)]
    pub stack: Option<String>,
}

/// Available CLI subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Compose a program and show what would be deployed.
    Preview(preview::PreviewArgs),
    /// Print the dependency graph of a program.
    Graph(graph::GraphArgs),
    /// List the stack outputs a program registers.
    Exports(exports::ExportsArgs),
    /// Show the configuration keys a program reads.
    Config(config::ConfigArgs),
    /// List the built-in programs.
    Programs(programs::ProgramsArgs),
}

/// Where stack settings come from.
#[derive(Debug, Clone)]
pub struct StackSource {
    file: Option<PathBuf>,
    stack: Option<String>,
}

impl StackSource {
    /// Settings for `program`: the explicit stack file, else `stack.yaml`
    /// in the working directory, else empty settings.
    fn settings(&self, program: &Program) -> anyhow::Result<StackSettings> {
        let mut settings = match &self.file {
            Some(path) => StackSettings::load(path)?,
            None if Path::new(DEFAULT_STACK_FILE).exists() => {
                StackSettings::load(Path::new(DEFAULT_STACK_FILE))?
            }
            None => {
                tracing::debug!(program = program.name, "no stack file, using empty settings");
                StackSettings::new(program.project, DEFAULT_STACK)
            }
        };
        if let Some(stack) = &self.stack {
            settings.stack.clone_from(stack);
        }
        Ok(settings)
    }
}

/// Looks up a program and composes it.
///
/// # Errors
///
/// Returns an error if the program is unknown, the stack file cannot be
/// loaded, or composition fails.
pub(crate) fn compose(source: &StackSource, name: &str) -> anyhow::Result<Composition> {
    let program = find(name).ok_or_else(|| {
        anyhow::anyhow!("unknown program \"{name}\"; run `{BIN_NAME} programs` to list them")
    })?;
    let settings = source.settings(program)?;
    tracing::info!(program = name, project = %settings.project, stack = %settings.stack, "composing");
    Ok(Stack::run(settings, program.run)?)
}

/// Dispatches the parsed CLI command to its handler.
///
/// # Errors
///
/// Returns an error if the command execution fails.
pub fn execute(cli: Cli) -> anyhow::Result<()> {
    let source = StackSource {
        file: cli.stack_file,
        stack: cli.stack,
    };
    match cli.command {
        Command::Preview(args) => preview::execute(&source, &args),
        Command::Graph(args) => graph::execute(&source, &args),
        Command::Exports(args) => exports::execute(&source, &args),
        Command::Config(args) => config::execute(&source, &args),
        Command::Programs(args) => programs::execute(&args),
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write as _;

    use clap::CommandFactory;

    use super::*;

    fn no_file() -> StackSource {
        StackSource {
            file: None,
            stack: None,
        }
    }

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_flags_parse_after_subcommand() {
        let cli = Cli::try_parse_from(["azc", "preview", "webserver", "--stack", "prod", "--json"])
            .unwrap();
        assert_eq!(cli.stack.as_deref(), Some("prod"));
        assert!(matches!(cli.command, Command::Preview(ref a) if a.json && a.program == "webserver"));
    }

    #[test]
    fn unknown_program_is_an_error() {
        let err = compose(&no_file(), "nope").unwrap_err();
        assert!(err.to_string().contains("unknown program"));
    }

    #[test]
    fn stack_file_is_loaded_and_stack_overridden() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "project: stack-basics\nstack: dev\nconfig:\n  base_name: shop\n"
        )
        .unwrap();
        let source = StackSource {
            file: Some(file.path().to_path_buf()),
            stack: Some("prod".into()),
        };
        let composition = compose(&source, "stack-basics").unwrap();
        assert_eq!(composition.settings().stack, "prod");
        assert!(composition.declaration("shop-rg").is_some());
    }

    #[test]
    fn missing_explicit_stack_file_is_an_error() {
        let source = StackSource {
            file: Some(PathBuf::from("/nonexistent/stack.yaml")),
            stack: None,
        };
        assert!(compose(&source, "webserver").is_err());
    }
}
