//! Process-wide failure handler tests.
//!
//! Kept in a single test so nothing else in this binary swaps the handler
//! concurrently.

#![cfg(unix)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use justrun::{Command, RunError, RunOptions};

#[test]
fn test_replaced_handler_receives_failures() {
    let seen: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
    let recorder = Arc::clone(&seen);
    justrun::set_failure_handler(Arc::new(move |err: RunError| {
        recorder.lock().unwrap().push(err.to_string());
    }));

    // Success reports nothing
    let hello = justrun::get_stdout(Command::new("echo").arg("hello"), RunOptions::new());
    assert_eq!(hello, b"hello\n");
    assert!(seen.lock().unwrap().is_empty());

    // Failures go to the replacement instead of terminating the process
    justrun::get_stdout(
        Command::sh("echo 'the stderr contents' 1>&2; exit 3"),
        RunOptions::new(),
    );
    justrun::run_sh("exit 2", RunOptions::new());

    let mut result: HashMap<String, serde_json::Value> = HashMap::new();
    justrun::decode_json_output_sh("echo invalid json", &mut result, RunOptions::new());
    justrun::decode_json(&b"[1, 2"[..], &mut result);

    let io_err = std::io::Error::new(std::io::ErrorKind::Other, "oops");
    assert!(justrun::check_p::<(), _>("setup", Err(io_err)).is_none());

    let messages = seen.lock().unwrap().clone();
    assert_eq!(messages.len(), 5, "{messages:?}");
    assert_eq!(
        messages[0],
        "output: exit status 3; stderr: the stderr contents\n"
    );
    assert_eq!(messages[1], "exit status 2");
    assert!(messages[2].starts_with("decode json:"));
    assert!(messages[3].starts_with("decode json:"));
    assert_eq!(messages[4], "setup: I/O error: oops");

    // A second replacement takes over for later calls
    let collector = Arc::new(justrun::CollectFailures::new());
    justrun::set_failure_handler(collector.clone());
    justrun::run(Command::new("false"), RunOptions::new());
    assert_eq!(collector.len(), 1);
    assert_eq!(seen.lock().unwrap().len(), 5);

    justrun::reset_failure_handler();
}
