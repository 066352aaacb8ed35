//! Integration tests for clam-core
//!
//! These tests run real shell commands through the public entry points and
//! check the files and streams they produce.

use clam_core::{
    config::OUTPUT_KEY, run, run_file, run_output, run_reader, Error, ParameterMap, Runner,
    RunnerConfig, Sink, Syntax,
};
use std::fs;
use std::io::Read;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};
use tempfile::NamedTempFile;

fn params(pairs: &[(&str, &str)]) -> ParameterMap {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect()
}

fn quiet_runner() -> Runner {
    Runner::new(RunnerConfig::default().with_stdout(Sink::Null))
}

#[test]
fn test_run_simple_command() {
    let mut params = params(&[("name", "World")]);
    run("echo Hello {{name}}", &mut params).unwrap();

    let output = PathBuf::from(&params[OUTPUT_KEY]);
    assert!(output.exists());
    fs::remove_file(output).unwrap();
}

/// Test the two end-to-end output scenarios
#[test]
fn test_run_output_writes_to_allocated_file() {
    let cases = [
        ("echo Hello {{name}} > {{output}}", params(&[("name", "World")]), "Hello World\n"),
        ("echo Hello,World | cut -d, -f2 > {{ output }}", params(&[]), "World\n"),
    ];

    for (template, mut ctx, expected) in cases {
        let output = run_output(template, &mut ctx).unwrap();

        assert_eq!(output, PathBuf::from(&ctx[OUTPUT_KEY]));
        assert_eq!(fs::read_to_string(&output).unwrap(), expected);
        fs::remove_file(output).unwrap();
    }
}

#[test]
fn test_run_output_keeps_given_path() {
    let temp_dir = tempfile::tempdir().unwrap();
    let given = temp_dir.path().join("greeting.txt");
    let mut ctx = params(&[("name", "World"), ("output", given.to_str().unwrap())]);

    let output = quiet_runner()
        .run_output("echo Hello {{name}} > {{output}}", &mut ctx)
        .unwrap();

    assert_eq!(output, given);
    assert_eq!(fs::read_to_string(&given).unwrap(), "Hello World\n");
}

/// A given output is reported even if the template never writes to it
#[test]
fn test_run_output_reports_unreferenced_output() {
    let temp_dir = tempfile::tempdir().unwrap();
    let given = temp_dir.path().join("never-written.txt");
    let mut ctx = params(&[("output", given.to_str().unwrap())]);

    let output = quiet_runner().run_output("true", &mut ctx).unwrap();

    assert_eq!(output, given);
    assert!(!given.exists());
}

#[test]
fn test_run_file_and_reader() {
    let mut ctx = params(&[("name", "World")]);
    let mut file = run_file("echo Hello {{name}} > {{output}}", &mut ctx).unwrap();
    let mut contents = String::new();
    file.read_to_string(&mut contents).unwrap();
    assert_eq!(contents, "Hello World\n");
    fs::remove_file(&ctx[OUTPUT_KEY]).unwrap();

    let mut ctx = params(&[]);
    let mut reader = run_reader("echo Hello,World | cut -d, -f2 > {{ output }}", &mut ctx).unwrap();
    let mut contents = String::new();
    reader.read_to_string(&mut contents).unwrap();
    assert_eq!(contents, "World\n");
    fs::remove_file(&ctx[OUTPUT_KEY]).unwrap();
}

/// A file sink is appended to, so one file can collect several runs
#[test]
fn test_file_sink_appends_across_runs() {
    let sink_file = NamedTempFile::new().unwrap();
    let runner = Runner::new(
        RunnerConfig::default().with_stdout(Sink::File(sink_file.path().to_path_buf())),
    );

    let cases = [
        ("echo Hello {{name}}", params(&[("name", "World")])),
        ("echo Hello,World | cut -d, -f2", params(&[])),
    ];
    for (template, mut ctx) in cases {
        let output = runner.run_output(template, &mut ctx).unwrap();
        fs::remove_file(output).unwrap();
    }

    assert_eq!(
        fs::read_to_string(sink_file.path()).unwrap(),
        "Hello World\nWorld\n"
    );
}

#[test]
fn test_stderr_writer_sink() {
    let buffer = Arc::new(Mutex::new(Vec::new()));
    let runner = Runner::new(RunnerConfig::default().with_stderr(Sink::Writer(buffer.clone())));
    let mut ctx = params(&[("message", "oops")]);

    let result = runner.run_output("echo {{message}} >&2; exit 1", &mut ctx);

    assert!(matches!(result, Err(Error::SubProcessExit(_))));
    assert_eq!(String::from_utf8(buffer.lock().unwrap().clone()).unwrap(), "oops\n");
    fs::remove_file(&ctx[OUTPUT_KEY]).unwrap();
}

/// Shell braces and hyphenated keys pass through the default syntax
#[test]
fn test_shell_expansions_and_hyphenated_keys() {
    let cases = [
        ("x=abc; echo ${#x} > {{ output }}", params(&[]), "3\n"),
        (
            "echo {{file-name}} > {{ output }}",
            params(&[("file-name", "x.txt")]),
            "x.txt\n",
        ),
        (
            "echo Hello,World,! | awk -F, '{print $2}' > {{ output }}",
            params(&[]),
            "World\n",
        ),
    ];

    for (template, mut ctx, expected) in cases {
        let output = quiet_runner().run_output(template, &mut ctx).unwrap();

        assert_eq!(fs::read_to_string(&output).unwrap(), expected);
        fs::remove_file(output).unwrap();
    }
}

#[test]
fn test_braces_syntax() {
    let runner = Runner::new(RunnerConfig::default().with_syntax(Syntax::Braces));
    let mut ctx = params(&[("name", "World")]);

    let output = runner
        .run_output("echo Hello {name} > {output}", &mut ctx)
        .unwrap();

    assert_eq!(fs::read_to_string(&output).unwrap(), "Hello World\n");
    fs::remove_file(output).unwrap();
}

#[test]
fn test_timeout_returns_timeout_error() {
    let runner = Runner::with_timeout(Duration::from_millis(50));
    let mut ctx = params(&[]);

    let start = Instant::now();
    let err = runner.run_output("sleep 1", &mut ctx).unwrap_err();

    assert!(err.is_timeout(), "got {err}");
    assert!(start.elapsed() < Duration::from_millis(900));
    fs::remove_file(&ctx[OUTPUT_KEY]).unwrap();
}

#[test]
fn test_timeout_not_triggered_by_fast_command() {
    let runner = Runner::with_timeout(Duration::from_secs(2));
    let mut ctx = params(&[]);

    let output = runner.run_output("sleep 0.1", &mut ctx).unwrap();
    fs::remove_file(output).unwrap();
}

/// After a timeout the killed process has been reaped and no longer exists
#[cfg(target_os = "linux")]
#[test]
fn test_timed_out_process_is_gone() {
    let pid_file = NamedTempFile::new().unwrap();
    let runner = Runner::new(
        RunnerConfig::default()
            .with_stdout(Sink::Null)
            .with_timeout(Duration::from_millis(500)),
    );
    let mut ctx = params(&[("pidfile", pid_file.path().to_str().unwrap())]);

    let err = runner
        .run_output("echo $$ > {{pidfile}}; exec sleep 10", &mut ctx)
        .unwrap_err();
    assert!(err.is_timeout());

    let pid = fs::read_to_string(pid_file.path()).unwrap();
    let pid = pid.trim();
    assert!(!pid.is_empty());
    assert!(!PathBuf::from(format!("/proc/{pid}")).exists());
    fs::remove_file(&ctx[OUTPUT_KEY]).unwrap();
}

/// Concurrent runs with allocated outputs never share a file
#[test]
fn test_concurrent_runs_do_not_interfere() {
    let runner = quiet_runner();
    let template = "sleep 0.2; echo {{name}} > {{output}}";

    let outputs: Vec<(String, PathBuf)> = thread::scope(|scope| {
        let handles: Vec<_> = ["first", "second"]
            .into_iter()
            .map(|name| {
                let runner = &runner;
                scope.spawn(move || {
                    let mut ctx = params(&[("name", name)]);
                    (name.to_string(), runner.run_output(template, &mut ctx).unwrap())
                })
            })
            .collect();

        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_ne!(outputs[0].1, outputs[1].1);
    for (name, output) in outputs {
        assert_eq!(fs::read_to_string(&output).unwrap(), format!("{name}\n"));
        fs::remove_file(output).unwrap();
    }
}

/// The runner remains usable after failures
#[test]
fn test_runner_reusable_after_errors() {
    let runner = Runner::new(
        RunnerConfig::default()
            .with_stdout(Sink::Null)
            .with_stderr(Sink::Null)
            .with_timeout(Duration::from_millis(100)),
    );

    let mut ctx = params(&[]);
    assert!(runner.run("sleep 2", &mut ctx).unwrap_err().is_timeout());
    fs::remove_file(&ctx[OUTPUT_KEY]).unwrap();

    let mut ctx = params(&[]);
    assert!(matches!(runner.run("false", &mut ctx), Err(Error::SubProcessExit(_))));
    fs::remove_file(&ctx[OUTPUT_KEY]).unwrap();

    let mut ctx = params(&[]);
    runner.run("true", &mut ctx).unwrap();
    fs::remove_file(&ctx[OUTPUT_KEY]).unwrap();
}
