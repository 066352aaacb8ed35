use std::path::PathBuf;
use std::process::ExitStatus;
use std::time::Duration;

use leon::{ParseError, RenderError};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Could not allocate a temporary output file: {}", _0)]
    Resolution(std::io::Error),

    #[error("Temporary output path {:?} is not valid UTF-8", .0)]
    NonUtf8Path(PathBuf),

    #[error("Error parsing placeholder string: {}", .0)]
    Parse(#[from] ParseError),

    #[error("Error rendering placeholder string: {}", .0)]
    Render(#[from] RenderError),

    #[error("Could not start shell `{}`: {}", .shell, .original)]
    Spawn {
        shell: String,
        original: std::io::Error,
    },

    #[error("Error with sub process: {}", _0)]
    SubProcess(std::io::Error),

    #[error("The sub process exited with non-success status: {}", _0)]
    SubProcessExit(ExitStatus),

    #[error("timed out: {}", .command)]
    Timeout { command: String, timeout: Duration },

    #[error("IO error with {} file at path `{}`: {}", .file_description, .path, .original)]
    Io {
        file_description: String,
        path: String,
        original: std::io::Error,
    },

    #[error("Error {} {} file at `{}`: {}", .action, .file_description, .path, .original)]
    Yaml {
        action: String,
        file_description: String,
        path: String,
        original: serde_yaml::Error,
    },

    #[error("Invalid parameter format `{}`: expected key=value", .0)]
    ParameterFormat(String),

    #[error("STDIO error: {}", .0)]
    Stdio(std::io::Error),

    #[error("Misc error: {}", .0)]
    Misc(String),
}

impl Error {
    pub fn spawn_error(shell: &str, original: std::io::Error) -> Self {
        Self::Spawn {
            shell: shell.to_string(),
            original,
        }
    }

    pub fn timeout(command: String, timeout: Duration) -> Self {
        Self::Timeout { command, timeout }
    }

    pub fn yaml_error(
        action: String,
        file_description: String,
        path: String,
        original: serde_yaml::Error,
    ) -> Self {
        Self::Yaml {
            action,
            file_description,
            path,
            original,
        }
    }

    pub fn io_error(file_description: String, path: String, original: std::io::Error) -> Self {
        Self::Io {
            file_description,
            path,
            original,
        }
    }

    /// True when the command was killed because its deadline elapsed.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_message_carries_command() {
        let error = Error::timeout("sleep 1".to_string(), Duration::from_millis(50));
        assert!(error.is_timeout());
        assert_eq!(error.to_string(), "timed out: sleep 1");
    }

    #[test]
    fn test_other_errors_are_not_timeouts() {
        let error = Error::spawn_error(
            "/no/such/shell",
            std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        );
        assert!(!error.is_timeout());
        assert!(error.to_string().contains("/no/such/shell"));
    }

    #[test]
    fn test_render_message_names_the_action() {
        let template = leon::Template::parse("echo {missing}").unwrap();
        let error: Error = template
            .render(&std::collections::HashMap::<String, String>::new())
            .unwrap_err()
            .into();
        assert!(error
            .to_string()
            .starts_with("Error rendering placeholder string: "));
    }
}
