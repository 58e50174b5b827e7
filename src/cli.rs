//! Command-line interface implementation for tmpl-renderer.
//! Provides argument parsing using clap plus an environment variable
//! fallback for every flag that was left at its default.

use clap::parser::ValueSource;
use clap::{ArgMatches, CommandFactory, FromArgMatches, Parser};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Program name; also the prefix of every fallback environment variable.
pub const CLI_NAME: &str = "tmpl-renderer";

/// Command-line arguments structure for tmpl-renderer.
#[derive(Parser, Debug)]
#[command(name = CLI_NAME, version, about = "tmpl-renderer renders a template file", long_about = None)]
pub struct Args {
    /// Path to the template file. Only the first path is rendered;
    /// additional positional arguments are ignored.
    #[arg(value_name = "TEMPLATE")]
    pub templates: Vec<PathBuf>,

    /// Write the rendered output to this file instead of stdout
    #[arg(long, value_name = "PATH")]
    pub out: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,
}

/// Parses command line arguments and applies the environment fallback.
///
/// # Returns
/// * `Args` - Parsed command line arguments, with any flag left at its
///   default filled in from `TMPL_RENDERER_<FLAG>` when that variable is
///   set and non-empty.
pub fn get_args() -> Args {
    let matches = Args::command().get_matches();
    let mut args = match Args::from_arg_matches(&matches) {
        Ok(args) => args,
        Err(e) => e.exit(),
    };
    apply_env_fallback(&mut args, &matches, |key| std::env::var(key).ok());
    args
}

/// Derives the fallback environment variable name for a flag:
/// `<CLI_NAME>_<FLAG>` uppercased, with hyphens folded to underscores.
pub fn env_var_for_flag(flag: &str) -> String {
    format!("{}_{}", CLI_NAME, flag).replace('-', "_").to_uppercase()
}

/// Returns the template path from the positional arguments. Only the first
/// path is rendered; extras are ignored.
///
/// # Errors
/// * `Error::UsageError` when no positional argument was given
pub fn template_arg(args: &Args) -> Result<&Path> {
    args.templates
        .first()
        .map(PathBuf::as_path)
        .ok_or_else(|| Error::UsageError("Please provide a template".to_string()))
}

/// Fills any flag that was not explicitly set on the command line from the
/// environment. The lookup is injected so tests never have to mutate the
/// process environment. Explicitly set flags always win; empty variable
/// values are ignored.
pub fn apply_env_fallback<F>(args: &mut Args, matches: &ArgMatches, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    for arg in Args::command().get_arguments() {
        if arg.is_positional() {
            continue;
        }
        let id = arg.get_id().as_str();
        if matches.value_source(id) == Some(ValueSource::CommandLine) {
            continue;
        }
        let value = match lookup(&env_var_for_flag(id)) {
            Some(value) if !value.is_empty() => value,
            _ => continue,
        };
        match id {
            "out" => args.out = Some(PathBuf::from(value)),
            "verbose" => {
                args.verbose =
                    ["1", "true", "yes"].iter().any(|t| value.eq_ignore_ascii_case(t));
            }
            // clap's implicit help/version arguments carry no state
            _ => {}
        }
    }
}
