//! Command-line argument parsing.
//!
//! This module defines the command-line interface of the `clam` binary using
//! the `clap` crate.

use std::time::Duration;

use clam_core::config::DEFAULT_SHELL;
use clam_core::Syntax;
use clap::{Parser, ValueEnum};

/// Placeholder syntax accepted on the command line.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum SyntaxArg {
    /// `{{ name }}` placeholders
    Mustache,
    /// `{name}` placeholders
    Braces,
}

impl From<SyntaxArg> for Syntax {
    fn from(value: SyntaxArg) -> Self {
        match value {
            SyntaxArg::Mustache => Syntax::Mustache,
            SyntaxArg::Braces => Syntax::Braces,
        }
    }
}

/// Parses a timeout given in (possibly fractional) seconds.
///
/// # Errors
///
/// Returns a message if the value is not a finite, non-negative number.
pub fn parse_timeout(value: &str) -> Result<Duration, String> {
    let seconds: f64 = value
        .parse()
        .map_err(|_| format!("`{value}` is not a number of seconds"))?;

    Duration::try_from_secs_f64(seconds).map_err(|_| format!("`{value}` is not a valid timeout"))
}

/// Command-line arguments for the clam CLI tool.
///
/// # Examples
///
/// ```rust
/// use clap::Parser;
/// use clam_cli::cli_args::Args;
///
/// let args = Args::parse_from(["clam", "echo Hello {{ name }}", "-p", "name=World"]);
/// assert_eq!(args.parameters, vec!["name=World"]);
/// ```
#[derive(Parser, Debug)] // requires `derive` feature
#[command(term_width = 0, version)] // Just to make testing across clap features easier
pub struct Args {
    /// The command template to render and run.
    pub template: String,

    /// Named parameters for the template in the format key=value.
    ///
    /// Multiple parameters can be provided with repeated `-p` flags.
    /// Values given here override those from `--params-file`.
    #[arg(long = "param", short = 'p', action = clap::ArgAction::Append)]
    pub parameters: Vec<String>,

    /// Path to a YAML file mapping parameter names to values.
    #[arg(long, short = 'f')]
    pub params_file: Option<String>,

    /// Output file for the command, available in the template as `output`.
    ///
    /// If not provided, a temporary file is created.
    #[arg(long, short = 'o')]
    pub output: Option<String>,

    /// Kill the command if it runs longer than this many seconds (0 disables).
    #[arg(long, short = 't', value_parser = parse_timeout)]
    pub timeout: Option<Duration>,

    /// Shell used to run the rendered command.
    #[arg(long, default_value = DEFAULT_SHELL)]
    pub shell: String,

    /// Placeholder syntax of the template.
    #[arg(long, value_enum, default_value_t = SyntaxArg::Mustache)]
    pub syntax: SyntaxArg,

    /// Perform a dry run, which just prints out the command but does not execute it.
    #[arg(long, short = 'd', action)]
    pub dry_run: bool,

    /// Print the contents of the output file instead of its path.
    #[arg(long, action)]
    pub cat: bool,
}
