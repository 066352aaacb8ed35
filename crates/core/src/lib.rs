//! Clam Core Library
//!
//! Templated shell calls. A command template is rendered with named values,
//! run under `/bin/bash -c`, and optionally killed if it runs past a deadline.
//! If the command writes to `{{ output }}`, the caller gets that file back
//! without having to name it.
//!
//! # Key Features
//!
//! - **Templating**: `{{ name }}` placeholders, or `{name}` with [`Syntax::Braces`]
//! - **Implicit Output**: a missing or empty `output` parameter becomes a fresh temporary file
//! - **Stream Sinks**: inherit, discard, append to a file, or copy into a writer
//! - **Timeouts**: runaway commands are killed and reported as [`Error::Timeout`]
//!
//! # The `output` parameter
//!
//! The parameter map passed to every entry point is modified in place. When
//! `output` is absent or empty, a temporary file named `clam-*` is created in
//! the system temp directory and its path is stored under `output` before the
//! template is rendered. That file is left on disk for the caller to remove.
//!
//! # Examples
//!
//! ```no_run
//! use clam_core::ParameterMap;
//!
//! let mut params = ParameterMap::from([("name".to_string(), "World".to_string())]);
//! let output = clam_core::run_output("echo Hello {{ name }} > {{ output }}", &mut params)?;
//! assert_eq!(std::fs::read_to_string(output)?, "Hello World\n");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::collections::HashMap;

pub mod config;
pub mod error;
pub mod execution;
pub mod file_handling;
pub mod interpolation;

pub use error::{Error, Result};
pub use execution::{run, run_file, run_output, run_reader, Runner, RunnerConfig, Sink};
pub use interpolation::{Resolved, Syntax};

/// Template parameters, keyed by placeholder name.
pub type ParameterMap = HashMap<String, String>;
