//! # justrun
//!
//! Run external commands from scripts and tools without threading errors
//! through every call site.
//!
//! Commands are executed, their stdout captured or decoded as JSON, and any
//! failure is handed to a single [`FailureHandler`] instead of being
//! returned. The default handler, [`ExitOnFailure`], logs the error and
//! terminates the process. Tests and long-running callers install their own.
//!
//! ## Features
//!
//! - **Capture**: [`get_stdout`] returns stdout; failures carry the stderr text
//! - **JSON**: [`decode_json_output`] decodes stdout into any `Deserialize` type
//! - **Tee**: [`out`] and [`err`] copy output into caller-supplied writers
//! - **Shell**: `*_sh` variants run a command line through `/bin/sh -c`
//! - **Injectable handler**: a [`Runner`] carries its own handler; the free
//!   functions use the process-wide one
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::collections::HashMap;
//! use justrun::{Command, RunOptions};
//!
//! // Any failure below logs and exits with status 1
//! let head = justrun::get_stdout(
//!     Command::new("git").args(["rev-parse", "HEAD"]),
//!     RunOptions::new(),
//! );
//! println!("HEAD is {}", String::from_utf8_lossy(&head).trim());
//!
//! let mut meta: HashMap<String, serde_json::Value> = HashMap::new();
//! justrun::decode_json_output_sh("cargo metadata --format-version 1", &mut meta, RunOptions::new());
//! ```

pub mod config;
pub mod error;
pub mod execution;
pub mod failure;
pub mod global;
pub mod logging;

// Re-export commonly used types
pub use config::{Config, ConfigError};
pub use error::{ExitFailure, Result, RunError};
pub use execution::{
    err, out, try_decode_json_output, try_get_stdout, try_run, Command, RunOptions, Runner, Sink,
};
pub use failure::{
    failure_handler, reset_failure_handler, set_failure_handler, CollectFailures, ExitOnFailure,
    FailureHandler,
};
pub use global::{
    check, check_p, decode_json, decode_json_output, decode_json_output_sh, get_stdout,
    get_stdout_sh, run, run_sh,
};
