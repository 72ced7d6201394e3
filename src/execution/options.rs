//! Output sinks and the options that attach them.

use std::fmt;
use std::io::{self, Write};

/// A writer receiving a copy of one output stream.
pub type Sink<'a> = Box<dyn Write + Send + 'a>;

/// Extra output sinks to attach before a command runs.
///
/// Sinks are kept in the order they were added. Adding a sink never
/// replaces an earlier one: every sink on a stream gets a full copy.
///
/// ```
/// use justrun::RunOptions;
///
/// let mut log: Vec<u8> = Vec::new();
/// let options = RunOptions::new().out(&mut log).err(std::io::stderr());
/// assert!(!options.is_empty());
/// ```
#[derive(Default)]
pub struct RunOptions<'a> {
    pub(crate) stdout: Vec<Sink<'a>>,
    pub(crate) stderr: Vec<Sink<'a>>,
}

impl<'a> RunOptions<'a> {
    /// No extra sinks.
    pub fn new() -> Self {
        Self::default()
    }

    /// Tee stdout into `sink`.
    pub fn out(mut self, sink: impl Write + Send + 'a) -> Self {
        self.stdout.push(Box::new(sink));
        self
    }

    /// Tee stderr into `sink`.
    pub fn err(mut self, sink: impl Write + Send + 'a) -> Self {
        self.stderr.push(Box::new(sink));
        self
    }

    /// Whether no sink was added.
    pub fn is_empty(&self) -> bool {
        self.stdout.is_empty() && self.stderr.is_empty()
    }
}

impl fmt::Debug for RunOptions<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunOptions")
            .field("stdout_sinks", &self.stdout.len())
            .field("stderr_sinks", &self.stderr.len())
            .finish()
    }
}

/// Options with a single stdout sink.
pub fn out<'a>(sink: impl Write + Send + 'a) -> RunOptions<'a> {
    RunOptions::new().out(sink)
}

/// Options with a single stderr sink.
pub fn err<'a>(sink: impl Write + Send + 'a) -> RunOptions<'a> {
    RunOptions::new().err(sink)
}

/// Writer duplicating everything into each of its sinks, in order.
pub(crate) struct FanOut<'a> {
    sinks: Vec<Sink<'a>>,
}

impl<'a> FanOut<'a> {
    pub(crate) fn new(sinks: Vec<Sink<'a>>) -> Self {
        Self { sinks }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

impl Write for FanOut<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        for sink in &mut self.sinks {
            sink.write_all(buf)?;
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        for sink in &mut self.sinks {
            sink.flush()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FailingWriter;

    impl Write for FailingWriter {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_options_keep_order() {
        let mut first: Vec<u8> = Vec::new();
        let mut second: Vec<u8> = Vec::new();

        {
            let options = out(&mut first).out(&mut second).err(io::sink());
            assert_eq!(options.stdout.len(), 2);
            assert_eq!(options.stderr.len(), 1);

            let mut fan = FanOut::new(options.stdout);
            fan.write_all(b"hello\n").unwrap();
        }

        assert_eq!(first, b"hello\n");
        assert_eq!(second, b"hello\n");
    }

    #[test]
    fn test_empty_options() {
        assert!(RunOptions::new().is_empty());
        assert!(!err(io::sink()).is_empty());
    }

    #[test]
    fn test_fan_out_copies_every_write() {
        let mut a: Vec<u8> = Vec::new();
        let mut b: Vec<u8> = Vec::new();
        let sinks: Vec<Sink<'_>> = vec![Box::new(&mut a), Box::new(&mut b)];
        let mut fan = FanOut::new(sinks);

        fan.write_all(b"one ").unwrap();
        fan.write_all(b"two").unwrap();
        fan.flush().unwrap();
        drop(fan);

        assert_eq!(a, b"one two");
        assert_eq!(b, b"one two");
    }

    #[test]
    fn test_fan_out_reports_sink_errors() {
        let sinks: Vec<Sink<'_>> = vec![Box::new(FailingWriter)];
        let mut fan = FanOut::new(sinks);
        let err = fan.write(b"data").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
    }

    #[test]
    fn test_empty_fan_out_discards() {
        let mut fan = FanOut::new(Vec::new());
        assert!(fan.is_empty());
        assert_eq!(fan.write(b"ignored").unwrap(), 7);
    }
}
