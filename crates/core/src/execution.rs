//! Running resolved templates under a shell.
//!
//! Every entry point takes a template and a [`ParameterMap`] and funnels into
//! [`Runner::run_output`]. Be aware that the map is modified: a missing or
//! empty `output` entry is replaced by the path of a freshly created temporary
//! file (see [`crate::interpolation::ensure_output`]).

use std::fmt::{Debug, Formatter};
use std::fs::{File, OpenOptions};
use std::io::{BufReader, Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use log::{debug, info, warn};
use wait_timeout::ChildExt;

use crate::config::DEFAULT_SHELL;
use crate::error::{Error, Result};
use crate::interpolation::{self, Resolved, Syntax};
use crate::ParameterMap;

/// A writer shared between the runner and the caller.
pub type SharedWriter = Arc<Mutex<dyn Write + Send>>;

/// Destination of one of the child's output streams.
#[derive(Clone, Default)]
pub enum Sink {
    /// The host process's own stream.
    #[default]
    Inherit,
    /// Discard everything.
    Null,
    /// Append to a file, creating it if needed.
    File(PathBuf),
    /// Copy into an in-process writer, e.g. an `Arc<Mutex<Vec<u8>>>`.
    Writer(SharedWriter),
}

impl Debug for Sink {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Sink::Inherit => formatter.write_str("Inherit"),
            Sink::Null => formatter.write_str("Null"),
            Sink::File(path) => formatter.debug_tuple("File").field(path).finish(),
            Sink::Writer(_) => formatter.write_str("Writer(..)"),
        }
    }
}

impl Sink {
    fn stdio(&self, stream: &str) -> Result<Stdio> {
        match self {
            Sink::Inherit => Ok(Stdio::inherit()),
            Sink::Null => Ok(Stdio::null()),
            Sink::File(path) => OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map(Stdio::from)
                .map_err(|e| Error::io_error(stream.to_string(), path.display().to_string(), e)),
            Sink::Writer(_) => Ok(Stdio::piped()),
        }
    }

    fn pump<R: Read + Send + 'static>(&self, pipe: Option<R>) -> Option<JoinHandle<Result<u64>>> {
        let Sink::Writer(writer) = self else {
            return None;
        };
        let writer = Arc::clone(writer);

        pipe.map(|reader| thread::spawn(move || copy_into(reader, &writer)))
    }
}

fn copy_into<R: Read>(mut reader: R, writer: &SharedWriter) -> Result<u64> {
    let mut buffer = [0u8; 8192];
    let mut total = 0u64;

    loop {
        let read = reader.read(&mut buffer).map_err(Error::SubProcess)?;
        if read == 0 {
            return Ok(total);
        }

        let mut writer = writer
            .lock()
            .map_err(|_| Error::Misc("output writer mutex was poisoned".to_string()))?;
        writer.write_all(&buffer[..read]).map_err(Error::SubProcess)?;
        writer.flush().map_err(Error::SubProcess)?;
        total += read as u64;
    }
}

/// Execution context for templated commands.
///
/// The default configuration writes to the host's standard streams, runs
/// under [`DEFAULT_SHELL`], uses mustache placeholders and has no deadline.
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    pub shell: String,
    pub stdout: Sink,
    pub stderr: Sink,
    /// `None` or a zero duration means no deadline.
    pub timeout: Option<Duration>,
    pub syntax: Syntax,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            shell: DEFAULT_SHELL.to_string(),
            stdout: Sink::Inherit,
            stderr: Sink::Inherit,
            timeout: None,
            syntax: Syntax::Mustache,
        }
    }
}

impl RunnerConfig {
    #[must_use]
    pub fn with_shell(mut self, shell: impl Into<String>) -> Self {
        self.shell = shell.into();
        self
    }

    #[must_use]
    pub fn with_stdout(mut self, sink: Sink) -> Self {
        self.stdout = sink;
        self
    }

    #[must_use]
    pub fn with_stderr(mut self, sink: Sink) -> Self {
        self.stderr = sink;
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    #[must_use]
    pub fn with_syntax(mut self, syntax: Syntax) -> Self {
        self.syntax = syntax;
        self
    }

    fn deadline(&self) -> Option<Duration> {
        self.timeout.filter(|timeout| !timeout.is_zero())
    }
}

/// Runs templated shell commands with a fixed configuration.
///
/// A runner holds no mutable state and may be shared between threads; each
/// call owns its child process.
#[derive(Debug, Clone, Default)]
pub struct Runner {
    config: RunnerConfig,
}

impl Runner {
    pub fn new(config: RunnerConfig) -> Self {
        Self { config }
    }

    /// A standard runner that kills commands running longer than `timeout`.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self::new(RunnerConfig::default().with_timeout(timeout))
    }

    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    /// Resolves `template` without running it. Allocates the output file like
    /// a real run would.
    ///
    /// # Errors
    ///
    /// See [`interpolation::resolve`].
    pub fn resolve(&self, template: &str, params: &mut ParameterMap) -> Result<Resolved> {
        interpolation::resolve(self.config.syntax, template, params)
    }

    /// Runs a command, discarding the output path.
    ///
    /// # Errors
    ///
    /// See [`Runner::run_output`].
    pub fn run(&self, template: &str, params: &mut ParameterMap) -> Result<()> {
        self.run_output(template, params).map(|_| ())
    }

    /// Runs a command and opens its output file.
    ///
    /// # Errors
    ///
    /// Fails like [`Runner::run_output`], or if the output cannot be opened.
    pub fn run_file(&self, template: &str, params: &mut ParameterMap) -> Result<File> {
        let output = self.run_output(template, params)?;
        open_output(&output)
    }

    /// Runs a command and returns its output as a buffered reader.
    ///
    /// # Errors
    ///
    /// See [`Runner::run_file`].
    pub fn run_reader(
        &self,
        template: &str,
        params: &mut ParameterMap,
    ) -> Result<BufReader<File>> {
        self.run_file(template, params).map(BufReader::new)
    }

    /// Runs a command and returns the path of its output.
    ///
    /// If `params` has no `output` entry, or an empty one, a temporary file is
    /// created and its path is stored in `params["output"]` before rendering.
    /// The returned path is that entry, whether or not the command wrote to it.
    ///
    /// # Errors
    ///
    /// - resolution errors (output allocation, malformed template)
    /// - [`Error::Spawn`] if the shell cannot be started
    /// - [`Error::SubProcessExit`] if the command exits unsuccessfully
    /// - [`Error::Timeout`] if the deadline elapses; the command is killed
    pub fn run_output(&self, template: &str, params: &mut ParameterMap) -> Result<PathBuf> {
        let Resolved { command, output } = self.resolve(template, params)?;

        info!("{}", command);

        let mut child = self.spawn(&command)?;
        let pumps = [
            self.config.stdout.pump(child.stdout.take()),
            self.config.stderr.pump(child.stderr.take()),
        ];

        let status = self.wait(&mut child, command)?;

        for pump in pumps.into_iter().flatten() {
            pump.join()
                .map_err(|_| Error::Misc("output pump thread panicked".to_string()))??;
        }

        if status.success() {
            Ok(output)
        } else {
            Err(Error::SubProcessExit(status))
        }
    }

    fn spawn(&self, command: &str) -> Result<Child> {
        debug!(
            "Spawning `{}` with stdout {:?}, stderr {:?}",
            self.config.shell, self.config.stdout, self.config.stderr
        );

        Command::new(&self.config.shell)
            .arg("-c")
            .arg(command)
            .stdin(Stdio::null())
            .stdout(self.config.stdout.stdio("stdout")?)
            .stderr(self.config.stderr.stdio("stderr")?)
            .spawn()
            .map_err(|e| Error::spawn_error(&self.config.shell, e))
    }

    fn wait(&self, child: &mut Child, command: String) -> Result<ExitStatus> {
        let Some(timeout) = self.config.deadline() else {
            return child.wait().map_err(Error::SubProcess);
        };

        if let Some(status) = child.wait_timeout(timeout).map_err(Error::SubProcess)? {
            return Ok(status);
        }

        // The child may have exited between the deadline and the kill.
        let _ = child.kill();
        if let Err(e) = child.wait() {
            warn!("Failed to reap timed out command: {}", e);
        }

        Err(Error::timeout(command, timeout))
    }
}

fn open_output(path: &Path) -> Result<File> {
    File::open(path).map_err(|e| {
        Error::io_error("output".to_string(), path.display().to_string(), e)
    })
}

/// Runs a templated command with the default runner.
///
/// # Errors
///
/// See [`Runner::run_output`].
pub fn run(template: &str, params: &mut ParameterMap) -> Result<()> {
    Runner::default().run(template, params)
}

/// Runs a templated command with the default runner and returns the output
/// path, allocating a temporary one if `params` names none.
///
/// # Errors
///
/// See [`Runner::run_output`].
pub fn run_output(template: &str, params: &mut ParameterMap) -> Result<PathBuf> {
    Runner::default().run_output(template, params)
}

/// Runs a templated command with the default runner and opens the output.
///
/// # Errors
///
/// See [`Runner::run_file`].
pub fn run_file(template: &str, params: &mut ParameterMap) -> Result<File> {
    Runner::default().run_file(template, params)
}

/// Runs a templated command with the default runner and returns the output
/// as a buffered reader.
///
/// # Errors
///
/// See [`Runner::run_file`].
pub fn run_reader(template: &str, params: &mut ParameterMap) -> Result<BufReader<File>> {
    Runner::default().run_reader(template, params)
}
