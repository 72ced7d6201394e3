//! Free functions reporting to the process-wide failure handler.
//!
//! Each call resolves the handler when a failure happens, so a handler
//! installed with [`set_failure_handler`](crate::set_failure_handler)
//! applies to every call made after it.

use std::io::Read;

use serde::de::DeserializeOwned;

use crate::error::RunError;
use crate::execution::{Command, RunOptions, Runner};

/// Run `command` after applying `options`.
///
/// Failures are reported unchanged, e.g. `exit status 1`.
pub fn run(command: Command<'_>, options: RunOptions<'_>) {
    Runner::global().run(command, options);
}

/// Run `command_line` through `/bin/sh -c`.
///
/// Never build `command_line` from untrusted input.
pub fn run_sh(command_line: &str, options: RunOptions<'_>) {
    Runner::global().run_sh(command_line, options);
}

/// Run `command` and return its stdout.
pub fn get_stdout(command: Command<'_>, options: RunOptions<'_>) -> Vec<u8> {
    Runner::global().get_stdout(command, options)
}

/// Run `command_line` through `/bin/sh -c` and return its stdout.
pub fn get_stdout_sh(command_line: &str, options: RunOptions<'_>) -> Vec<u8> {
    Runner::global().get_stdout_sh(command_line, options)
}

/// Run `command` and decode its stdout as JSON into `dest`.
pub fn decode_json_output<T>(command: Command<'_>, dest: &mut T, options: RunOptions<'_>)
where
    T: DeserializeOwned,
{
    Runner::global().decode_json_output(command, dest, options);
}

/// Run `command_line` through `/bin/sh -c` and decode its stdout as JSON.
pub fn decode_json_output_sh<T>(command_line: &str, dest: &mut T, options: RunOptions<'_>)
where
    T: DeserializeOwned,
{
    Runner::global().decode_json_output_sh(command_line, dest, options);
}

/// Decode JSON from `reader` into `dest`.
pub fn decode_json<R, T>(reader: R, dest: &mut T)
where
    R: Read,
    T: DeserializeOwned,
{
    Runner::global().decode_json(reader, dest);
}

/// Report `result`'s error unchanged, if any.
pub fn check<T, E>(result: Result<T, E>) -> Option<T>
where
    E: Into<RunError>,
{
    Runner::global().check(result)
}

/// Report `result`'s error as `"<prefix>: <error>"`, if any.
pub fn check_p<T, E>(prefix: &'static str, result: Result<T, E>) -> Option<T>
where
    E: Into<RunError>,
{
    Runner::global().check_p(prefix, result)
}
