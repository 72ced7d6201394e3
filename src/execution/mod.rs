//! Command execution.
//!
//! This module provides:
//! - [`Command`], a pending process invocation
//! - [`RunOptions`], extra stdout/stderr sinks attached before a run
//! - [`Runner`], which executes commands and reports failures to a handler
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use justrun::{out, Command, CollectFailures, RunOptions, Runner};
//!
//! let failures = Arc::new(CollectFailures::new());
//! let runner = Runner::new(failures.clone());
//!
//! // Capture stdout while also teeing it into a log buffer
//! let mut log: Vec<u8> = Vec::new();
//! let version = runner.get_stdout(Command::new("git").arg("--version"), out(&mut log));
//!
//! // Shell syntax through `sh -c`
//! runner.run_sh("ls *.toml | wc -l", RunOptions::new());
//! ```

mod command;
mod options;
mod runner;

pub use command::{Command, DEFAULT_SHELL, DEFAULT_SHELL_FLAG};
pub use options::{err, out, RunOptions, Sink};
pub use runner::{try_decode_json_output, try_get_stdout, try_run, Runner};
