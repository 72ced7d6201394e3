//! Error types for justrun.

use std::fmt;
use std::process::ExitStatus;

use thiserror::Error;

/// Main error type for command execution and output decoding.
#[derive(Error, Debug)]
pub enum RunError {
    /// The process could not be started.
    #[error("exec {program:?}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The process exited unsuccessfully.
    #[error("{status}")]
    Exit { status: ExitFailure },

    /// The process exited unsuccessfully; its stderr was captured.
    #[error("{status}; stderr: {stderr}")]
    ExitWithStderr { status: ExitFailure, stderr: String },

    /// Copying process output into a sink failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Output was not valid JSON for the destination type.
    #[error("{0}")]
    Json(#[from] serde_json::Error),

    /// Another error with a short static label in front of it.
    #[error("{prefix}: {source}")]
    Context {
        prefix: &'static str,
        #[source]
        source: Box<RunError>,
    },
}

impl RunError {
    /// Wrap this error with a static label.
    pub fn context(self, prefix: &'static str) -> Self {
        Self::Context {
            prefix,
            source: Box::new(self),
        }
    }

    /// Exit status of the failed process, looking through any labels.
    pub fn exit_status(&self) -> Option<&ExitFailure> {
        match self {
            Self::Exit { status } | Self::ExitWithStderr { status, .. } => Some(status),
            Self::Context { source, .. } => source.exit_status(),
            _ => None,
        }
    }
}

/// A non-successful process exit status.
///
/// Displays as `exit status N`, or `signal: N` when the process was killed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitFailure(ExitStatus);

impl ExitFailure {
    /// Wrap an exit status. Returns `None` for a successful status.
    pub fn from_status(status: ExitStatus) -> Option<Self> {
        if status.success() {
            None
        } else {
            Some(Self(status))
        }
    }

    /// Exit code, if the process exited normally.
    pub fn code(&self) -> Option<i32> {
        self.0.code()
    }

    /// The underlying status.
    pub fn status(&self) -> ExitStatus {
        self.0
    }

    /// Whether the process was killed by `SIGPIPE` after its reader went away.
    pub fn is_broken_pipe(&self) -> bool {
        // SIGPIPE is 13 on every Unix std supports
        self.signal() == Some(13)
    }

    #[cfg(unix)]
    fn signal(&self) -> Option<i32> {
        use std::os::unix::process::ExitStatusExt;
        self.0.signal()
    }

    #[cfg(not(unix))]
    fn signal(&self) -> Option<i32> {
        None
    }
}

impl fmt::Display for ExitFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.code(), self.signal()) {
            (Some(code), _) => write!(f, "exit status {}", code),
            (None, Some(signal)) => write!(f, "signal: {}", signal),
            (None, None) => write!(f, "{}", self.0),
        }
    }
}

/// Convenience Result type for justrun operations.
pub type Result<T> = std::result::Result<T, RunError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[cfg(unix)]
    fn exit_failure(raw: i32) -> ExitFailure {
        use std::os::unix::process::ExitStatusExt;
        ExitFailure::from_status(ExitStatus::from_raw(raw)).unwrap()
    }

    #[cfg(unix)]
    #[test]
    fn test_exit_code_display() {
        // wait(2) encodes the exit code in the high byte
        let status = exit_failure(3 << 8);
        assert_eq!(status.code(), Some(3));
        assert_eq!(status.to_string(), "exit status 3");
    }

    #[cfg(unix)]
    #[test]
    fn test_signal_display() {
        let status = exit_failure(9);
        assert_eq!(status.code(), None);
        assert_eq!(status.to_string(), "signal: 9");
    }

    #[cfg(unix)]
    #[test]
    fn test_broken_pipe_detection() {
        assert!(exit_failure(13).is_broken_pipe());
        assert!(!exit_failure(9).is_broken_pipe());
        assert!(!exit_failure(13 << 8).is_broken_pipe());
    }

    #[cfg(unix)]
    #[test]
    fn test_success_is_not_a_failure() {
        use std::os::unix::process::ExitStatusExt;
        assert!(ExitFailure::from_status(ExitStatus::from_raw(0)).is_none());
    }

    #[cfg(unix)]
    #[test]
    fn test_exit_with_stderr_display() {
        let err = RunError::ExitWithStderr {
            status: exit_failure(3 << 8),
            stderr: "the stderr contents\n".into(),
        };
        assert_eq!(
            err.to_string(),
            "exit status 3; stderr: the stderr contents\n"
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_exit_status_through_context() {
        let err = RunError::Exit {
            status: exit_failure(2 << 8),
        }
        .context("output");
        assert_eq!(err.exit_status().and_then(ExitFailure::code), Some(2));
    }

    #[test]
    fn test_context_display_and_source() {
        let json_err = serde_json::from_str::<serde_json::Value>("nope").unwrap_err();
        let err = RunError::from(json_err).context("decode json");

        assert!(err.to_string().starts_with("decode json: expected"));
        assert!(err.source().is_some());
        assert!(err.exit_status().is_none());
    }

    #[test]
    fn test_spawn_display() {
        let err = RunError::Spawn {
            program: "no-such-program".into(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        };
        assert_eq!(err.to_string(), "exec \"no-such-program\": not found");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe closed");
        let err: RunError = io_err.into();
        assert!(matches!(err, RunError::Io(_)));
        assert!(err.to_string().contains("I/O error"));
    }
}
