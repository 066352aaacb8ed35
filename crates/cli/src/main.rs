use std::io::{self, stdout};
use std::process::ExitCode;

use clap::Parser;
use log::debug;

use clam_cli::cli_args::Args;
use clam_cli::display::print_resolved;
use clam_cli::parameters::build_parameter_map;
use clam_cli::runner_config;
use clam_core::config::VERSION;
use clam_core::error::{Error, Result};
use clam_core::Runner;

/// Exit code for timed out commands, as used by `timeout(1)`.
const TIMEOUT_EXIT_CODE: u8 = 124;

fn execute(args: &Args) -> Result<()> {
    debug!("clam {}", VERSION);

    let mut params = build_parameter_map(args)?;
    let runner = Runner::new(runner_config(args));

    if args.dry_run {
        let resolved = runner.resolve(&args.template, &mut params)?;
        print_resolved(&mut stdout(), &resolved, &params).map_err(Error::Stdio)?;
        println!("Dry run is specified, exiting without executing.");
        return Ok(());
    }

    if args.cat {
        let mut reader = runner.run_reader(&args.template, &mut params)?;
        io::copy(&mut reader, &mut stdout()).map_err(Error::Stdio)?;
    } else {
        let output = runner.run_output(&args.template, &mut params)?;
        println!("{}", output.display());
    }

    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();

    let args = Args::parse();

    match execute(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{e}");
            if e.is_timeout() {
                ExitCode::from(TIMEOUT_EXIT_CODE)
            } else {
                ExitCode::FAILURE
            }
        }
    }
}
