//! Pending command representation.

use std::fmt;
use std::path::PathBuf;

use super::options::{RunOptions, Sink};

/// Shell used by [`Command::sh`].
pub const DEFAULT_SHELL: &str = "/bin/sh";

/// Flag passing the command line to [`DEFAULT_SHELL`] as a script.
pub const DEFAULT_SHELL_FLAG: &str = "-c";

/// An external process invocation that has not run yet.
///
/// Output sinks are borrowed for `'a`, so a caller can tee output into a
/// local buffer and read it back once the command has been executed.
/// Executing a command consumes it.
pub struct Command<'a> {
    /// Program name or path. Bare names are resolved through `PATH`.
    pub program: String,
    /// Arguments, in order.
    pub args: Vec<String>,
    /// Working directory override (if any).
    pub working_dir: Option<PathBuf>,
    /// Environment variables to set on top of the inherited environment.
    pub env: Vec<(String, String)>,
    pub(crate) stdout: Vec<Sink<'a>>,
    pub(crate) stderr: Vec<Sink<'a>>,
}

impl<'a> Command<'a> {
    /// Create a command running `program` with no arguments.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            working_dir: None,
            env: Vec::new(),
            stdout: Vec::new(),
            stderr: Vec::new(),
        }
    }

    /// Run `command_line` through `/bin/sh -c`.
    ///
    /// Pipes, globs and variable expansion all work. The line is handed to
    /// the shell verbatim, so never build it from untrusted input.
    pub fn sh(command_line: impl Into<String>) -> Self {
        Self::shell(DEFAULT_SHELL, DEFAULT_SHELL_FLAG, command_line)
    }

    /// Run `command_line` through a specific shell, e.g. `bash -c`.
    pub fn shell(
        shell: impl Into<String>,
        flag: impl Into<String>,
        command_line: impl Into<String>,
    ) -> Self {
        Self::new(shell).arg(flag).arg(command_line)
    }

    /// Append an argument.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append several arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Set the working directory.
    pub fn working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    /// Add an environment variable.
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    /// Add multiple environment variables.
    pub fn envs<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.env
            .extend(vars.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Tee stdout into `sink`, after any sinks already attached.
    pub fn stdout(mut self, sink: impl std::io::Write + Send + 'a) -> Self {
        self.stdout.push(Box::new(sink));
        self
    }

    /// Tee stderr into `sink`, after any sinks already attached.
    pub fn stderr(mut self, sink: impl std::io::Write + Send + 'a) -> Self {
        self.stderr.push(Box::new(sink));
        self
    }

    /// Apply run options, keeping their order.
    pub fn apply(mut self, options: RunOptions<'a>) -> Self {
        self.stdout.extend(options.stdout);
        self.stderr.extend(options.stderr);
        self
    }

    /// Number of sinks attached to (stdout, stderr).
    pub fn sink_counts(&self) -> (usize, usize) {
        (self.stdout.len(), self.stderr.len())
    }

    /// Build the std command, without any stdio configuration.
    pub(crate) fn to_std(&self) -> std::process::Command {
        let mut cmd = std::process::Command::new(&self.program);
        cmd.args(&self.args);
        if let Some(dir) = &self.working_dir {
            cmd.current_dir(dir);
        }
        cmd.envs(self.env.iter().map(|(k, v)| (k, v)));
        cmd
    }
}

/// Shell-like rendering for logs, e.g. `echo hello`.
impl fmt::Display for Command<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            if arg.is_empty() || arg.contains(char::is_whitespace) {
                write!(f, " {:?}", arg)?;
            } else {
                write!(f, " {}", arg)?;
            }
        }
        Ok(())
    }
}

impl fmt::Debug for Command<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("program", &self.program)
            .field("args", &self.args)
            .field("working_dir", &self.working_dir)
            .field("env", &self.env)
            .field("stdout_sinks", &self.stdout.len())
            .field("stderr_sinks", &self.stderr.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_new() {
        let cmd = Command::new("ls");
        assert_eq!(cmd.program, "ls");
        assert!(cmd.args.is_empty());
        assert!(cmd.working_dir.is_none());
        assert!(cmd.env.is_empty());
        assert_eq!(cmd.sink_counts(), (0, 0));
    }

    #[test]
    fn test_command_builder_chain() {
        let cmd = Command::new("cargo")
            .arg("build")
            .args(["--release", "--locked"])
            .working_dir("/project")
            .env("RUST_LOG", "debug")
            .envs([("A", "1"), ("B", "2")]);

        assert_eq!(cmd.args, vec!["build", "--release", "--locked"]);
        assert_eq!(cmd.working_dir, Some(PathBuf::from("/project")));
        assert_eq!(cmd.env.len(), 3);
        assert_eq!(cmd.env[0], ("RUST_LOG".to_string(), "debug".to_string()));
    }

    #[test]
    fn test_sh_wraps_command_line() {
        let cmd = Command::sh("echo hello | tr a-z A-Z");
        assert_eq!(cmd.program, "/bin/sh");
        assert_eq!(cmd.args, vec!["-c", "echo hello | tr a-z A-Z"]);
    }

    #[test]
    fn test_shell_with_custom_program() {
        let cmd = Command::shell("bash", "-ec", "true");
        assert_eq!(cmd.program, "bash");
        assert_eq!(cmd.args, vec!["-ec", "true"]);
    }

    #[test]
    fn test_sinks_accumulate() {
        let mut a: Vec<u8> = Vec::new();
        let mut b: Vec<u8> = Vec::new();
        let mut c: Vec<u8> = Vec::new();

        let cmd = Command::new("true")
            .stdout(&mut a)
            .apply(RunOptions::new().out(&mut b).err(&mut c));

        assert_eq!(cmd.sink_counts(), (2, 1));
    }

    #[test]
    fn test_display_quotes_whitespace() {
        let cmd = Command::sh("echo hello");
        assert_eq!(cmd.to_string(), "/bin/sh -c \"echo hello\"");
        assert_eq!(Command::new("echo").arg("").to_string(), "echo \"\"");
    }

    #[test]
    fn test_debug_hides_sinks() {
        let mut buf: Vec<u8> = Vec::new();
        let cmd = Command::new("echo").stdout(&mut buf);
        let debug = format!("{:?}", cmd);
        assert!(debug.contains("stdout_sinks: 1"));
    }
}
