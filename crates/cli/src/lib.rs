//! Clam CLI Library
//!
//! This crate provides the command-line interface for clam: it turns
//! command-line arguments into a parameter map and a runner configuration,
//! then hands the template to [`clam_core`].
//!
//! # Examples
//!
//! ```bash
//! # Write into an implicit temporary file and print its path
//! clam 'echo Hello {{ name }} > {{ output }}' -p name=World
//!
//! # Print the output file's contents instead
//! clam --cat 'echo Hello,World | cut -d, -f2 > {{ output }}'
//!
//! # Kill the command after half a second
//! clam -t 0.5 'sleep 1'
//!
//! # Show what would run
//! clam --dry-run -f params.yml 'sort {{ input }} > {{ output }}'
//! ```

pub mod cli_args;
pub mod display;
pub mod parameters;

use clam_core::{RunnerConfig, Sink};

use crate::cli_args::Args;

/// Builds the runner configuration described by the arguments. Both streams
/// are inherited from the `clam` process.
pub fn runner_config(args: &Args) -> RunnerConfig {
    let mut config = RunnerConfig::default()
        .with_shell(args.shell.clone())
        .with_stdout(Sink::Inherit)
        .with_stderr(Sink::Inherit)
        .with_syntax(args.syntax.into());

    if let Some(timeout) = args.timeout {
        config = config.with_timeout(timeout);
    }

    config
}
