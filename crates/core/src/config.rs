//! Constants and path utilities shared by the runner and the CLI.

/// Version of the library.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default shell to use for command execution
pub const DEFAULT_SHELL: &str = "/bin/bash";

/// Reserved parameter naming the command's output file.
pub const OUTPUT_KEY: &str = "output";

/// Name prefix of temporary output files allocated during resolution.
pub const TEMP_FILE_PREFIX: &str = "clam-";

/// Expands shell variables like `~` in a user supplied path.
///
/// # Examples
///
/// ```
/// use clam_core::config::expand_path;
///
/// let expanded = expand_path("~/params.yml");
/// assert!(!expanded.starts_with('~'));
///
/// assert_eq!(expand_path("/tmp/params.yml"), "/tmp/params.yml");
/// ```
pub fn expand_path(path: &str) -> String {
    shellexpand::tilde(path).to_string()
}
