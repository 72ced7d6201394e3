//! Command execution and failure reporting.

use std::io::{self, Read, Write};
use std::process::Stdio;
use std::sync::Arc;
use std::thread;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use super::command::Command;
use super::options::{FanOut, RunOptions};
use crate::config::{Config, ShellSection};
use crate::error::{ExitFailure, RunError};
use crate::failure::{ExitOnFailure, FailureHandler, GlobalHandler};
use crate::Result;

/// Label for failures while producing captured output.
const OUTPUT_CONTEXT: &str = "output";

/// Label for failures while decoding captured output.
const DECODE_JSON_CONTEXT: &str = "decode json";

/// Runs commands and reports every failure to one [`FailureHandler`].
///
/// None of the reporting methods return an error. With the default
/// [`ExitOnFailure`] handler any failure ends the process; install a
/// different handler to log or record failures instead.
#[derive(Clone)]
pub struct Runner {
    handler: Arc<dyn FailureHandler>,
    shell: ShellSection,
}

impl Runner {
    /// Create a runner reporting to `handler`.
    pub fn new(handler: Arc<dyn FailureHandler>) -> Self {
        Self {
            handler,
            shell: ShellSection::default(),
        }
    }

    /// Create a runner reporting to `handler`, using the configured shell.
    pub fn with_config(handler: Arc<dyn FailureHandler>, config: &Config) -> Self {
        Self {
            handler,
            shell: config.shell.clone(),
        }
    }

    /// Runner reporting to the process-wide handler.
    ///
    /// The handler is looked up each time a failure is reported, so later
    /// calls to [`set_failure_handler`](crate::set_failure_handler) apply.
    pub fn global() -> Self {
        Self::new(Arc::new(GlobalHandler))
    }

    /// The handler failures are reported to.
    pub fn handler(&self) -> &Arc<dyn FailureHandler> {
        &self.handler
    }

    /// Build a command running `command_line` through the configured shell.
    ///
    /// The line is passed to the shell as is. Quoting is the caller's job.
    pub fn sh<'a>(&self, command_line: impl Into<String>) -> Command<'a> {
        Command::shell(&self.shell.program, &self.shell.flag, command_line)
    }

    /// Report `result`'s error unchanged, if any.
    pub fn check<T, E>(&self, result: std::result::Result<T, E>) -> Option<T>
    where
        E: Into<RunError>,
    {
        match result {
            Ok(value) => Some(value),
            Err(err) => {
                self.handler.fail(err.into());
                None
            }
        }
    }

    /// Report `result`'s error as `"<prefix>: <error>"`, if any.
    pub fn check_p<T, E>(
        &self,
        prefix: &'static str,
        result: std::result::Result<T, E>,
    ) -> Option<T>
    where
        E: Into<RunError>,
    {
        self.check(result.map_err(|err| err.into().context(prefix)))
    }

    /// Run `command` after applying `options`.
    pub fn run(&self, command: Command<'_>, options: RunOptions<'_>) {
        self.check(try_run(command, options));
    }

    /// Run `command_line` through the shell.
    pub fn run_sh(&self, command_line: &str, options: RunOptions<'_>) {
        self.run(self.sh(command_line), options);
    }

    /// Run `command` and return what it wrote to stdout.
    ///
    /// Caller sinks in `options` still receive a copy of both streams. A
    /// failure is reported as `output: <error>; stderr: <stderr>`, and the
    /// stdout captured up to that point is returned.
    pub fn get_stdout(&self, command: Command<'_>, options: RunOptions<'_>) -> Vec<u8> {
        let (stdout, result) = capture(command, options);
        self.check_p(OUTPUT_CONTEXT, result);
        stdout
    }

    /// Run `command_line` through the shell and return its stdout.
    pub fn get_stdout_sh(&self, command_line: &str, options: RunOptions<'_>) -> Vec<u8> {
        self.get_stdout(self.sh(command_line), options)
    }

    /// Run `command` and decode its stdout as JSON into `dest`.
    ///
    /// This is [`get_stdout`](Self::get_stdout) followed by
    /// [`decode_json`](Self::decode_json): if the handler lets a command
    /// failure pass, whatever stdout was captured is still decoded.
    pub fn decode_json_output<T>(
        &self,
        command: Command<'_>,
        dest: &mut T,
        options: RunOptions<'_>,
    ) where
        T: DeserializeOwned,
    {
        let stdout = self.get_stdout(command, options);
        self.decode_json(stdout.as_slice(), dest);
    }

    /// Run `command_line` through the shell and decode its stdout as JSON.
    pub fn decode_json_output_sh<T>(
        &self,
        command_line: &str,
        dest: &mut T,
        options: RunOptions<'_>,
    ) where
        T: DeserializeOwned,
    {
        self.decode_json_output(self.sh(command_line), dest, options);
    }

    /// Decode the first JSON value in `reader` into `dest`.
    ///
    /// Anything after that value is left unread. On success `dest` is
    /// replaced by the decoded value: an existing map is not merged into, and
    /// struct fields absent from the JSON take their serde defaults (or fail
    /// to decode) rather than keeping their old values. On failure `dest` is
    /// untouched.
    pub fn decode_json<R, T>(&self, reader: R, dest: &mut T)
    where
        R: Read,
        T: DeserializeOwned,
    {
        if let Some(value) = self.check_p(DECODE_JSON_CONTEXT, decode_first(reader)) {
            *dest = value;
        }
    }
}

impl Default for Runner {
    fn default() -> Self {
        Self::new(Arc::new(ExitOnFailure))
    }
}

impl std::fmt::Debug for Runner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Runner").field("shell", &self.shell).finish()
    }
}

/// Run `command` after applying `options`, returning any failure.
pub fn try_run(command: Command<'_>, options: RunOptions<'_>) -> Result<()> {
    execute(command.apply(options))
}

/// Run `command` and return its stdout, or an `output: ...` error.
pub fn try_get_stdout(command: Command<'_>, options: RunOptions<'_>) -> Result<Vec<u8>> {
    let (stdout, result) = capture(command, options);
    result
        .map(|()| stdout)
        .map_err(|err| err.context(OUTPUT_CONTEXT))
}

/// Run `command` and decode its stdout as JSON.
pub fn try_decode_json_output<T>(command: Command<'_>, options: RunOptions<'_>) -> Result<T>
where
    T: DeserializeOwned,
{
    let stdout = try_get_stdout(command, options)?;
    decode_first(stdout.as_slice()).map_err(|err| RunError::from(err).context(DECODE_JSON_CONTEXT))
}

/// Decode one JSON value, ignoring whatever follows it.
fn decode_first<R, T>(reader: R) -> serde_json::Result<T>
where
    R: Read,
    T: DeserializeOwned,
{
    let mut de = serde_json::Deserializer::from_reader(reader);
    T::deserialize(&mut de)
}

/// Run with capture buffers layered after the caller's sinks.
///
/// Returns captured stdout even when the command failed.
fn capture(command: Command<'_>, options: RunOptions<'_>) -> (Vec<u8>, Result<()>) {
    let mut stdout: Vec<u8> = Vec::new();
    let mut stderr: Vec<u8> = Vec::new();
    let result = execute(
        command
            .apply(options)
            .stdout(&mut stdout)
            .stderr(&mut stderr),
    );

    let result = result.map_err(|err| match err {
        RunError::Exit { status } => RunError::ExitWithStderr {
            status,
            stderr: String::from_utf8_lossy(&stderr).into_owned(),
        },
        other => other,
    });
    (stdout, result)
}

/// Spawn `command`, pump its output into the sinks and wait for it.
///
/// Streams without sinks go to the null device, as does stdin. A failed
/// exit status takes precedence over errors writing to a sink, unless the
/// child died of `SIGPIPE` because a failing sink closed its pipe.
fn execute(command: Command<'_>) -> Result<()> {
    let mut std_cmd = command.to_std();
    let shown = command.to_string();
    let Command {
        program,
        stdout,
        stderr,
        ..
    } = command;

    let mut out = FanOut::new(stdout);
    let mut err = FanOut::new(stderr);

    std_cmd
        .stdin(Stdio::null())
        .stdout(stdio_for(&out))
        .stderr(stdio_for(&err));

    debug!(command = %shown, "spawning command");
    let mut child = std_cmd
        .spawn()
        .map_err(|source| RunError::Spawn { program, source })?;

    let child_out = child.stdout.take();
    let child_err = child.stderr.take();

    // Drain both pipes at once so a full stderr pipe cannot stall stdout
    let (out_result, err_result) = thread::scope(|scope| {
        let out_thread = scope.spawn(|| pump(child_out, &mut out));
        let err_result = pump(child_err, &mut err);
        let out_result = out_thread
            .join()
            .unwrap_or_else(|panic| std::panic::resume_unwind(panic));
        (out_result, err_result)
    });

    let status = child.wait()?;
    debug!(command = %shown, status = %status, "command exited");

    if let Some(status) = ExitFailure::from_status(status) {
        if status.is_broken_pipe() {
            out_result?;
            err_result?;
        }
        return Err(RunError::Exit { status });
    }
    out_result?;
    err_result?;
    Ok(())
}

fn stdio_for(sinks: &FanOut<'_>) -> Stdio {
    if sinks.is_empty() {
        Stdio::null()
    } else {
        Stdio::piped()
    }
}

fn pump<R: Read>(source: Option<R>, sink: &mut FanOut<'_>) -> io::Result<u64> {
    match source {
        Some(mut source) => {
            let copied = io::copy(&mut source, sink)?;
            sink.flush()?;
            Ok(copied)
        }
        None => Ok(0),
    }
}
