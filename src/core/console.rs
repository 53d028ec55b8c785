//! core::console
//!
//! Standard and error output sinks.
//!
//! # Design
//!
//! The engine never writes to process streams directly. Every invocation
//! carries a [`Console`] holding two shareable writers; help, version,
//! completion and command output go to the standard sink, diagnostics go
//! to the error sink. Tests supply an in-memory console with
//! [`Console::buffered`].

use std::fmt::Display;
use std::io::{self, Write};
use std::sync::{Arc, Mutex, MutexGuard};

type SharedWriter = Arc<Mutex<Box<dyn Write + Send>>>;

fn lock(writer: &SharedWriter) -> MutexGuard<'_, Box<dyn Write + Send>> {
    writer.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// A pair of output sinks.
#[derive(Clone)]
pub struct Console {
    out: SharedWriter,
    err: SharedWriter,
}

impl std::fmt::Debug for Console {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Console").finish_non_exhaustive()
    }
}

impl Console {
    /// Create a console from two writers.
    pub fn new(out: impl Write + Send + 'static, err: impl Write + Send + 'static) -> Self {
        Self {
            out: Arc::new(Mutex::new(Box::new(out))),
            err: Arc::new(Mutex::new(Box::new(err))),
        }
    }

    /// Console bound to the process standard output and error streams.
    pub fn stdio() -> Self {
        Self::new(io::stdout(), io::stderr())
    }

    /// In-memory console and a handle to read what was written.
    pub fn buffered() -> (Self, CapturedOutput) {
        let captured = CapturedOutput::default();
        let console = Self::new(captured.out.clone(), captured.err.clone());
        (console, captured)
    }

    /// Writer for the standard sink.
    pub fn out(&self) -> Sink {
        Sink(self.out.clone())
    }

    /// Writer for the error sink.
    pub fn err(&self) -> Sink {
        Sink(self.err.clone())
    }

    /// Write one line to the standard sink.
    pub fn out_line(&self, message: impl Display) {
        write_line(&self.out, message);
    }

    /// Write one line to the error sink.
    pub fn err_line(&self, message: impl Display) {
        write_line(&self.err, message);
    }

    /// Write preformatted text to the standard sink without adding a newline.
    pub fn out_text(&self, text: &str) {
        write_text(&self.out, text);
    }

    /// Write preformatted text to the error sink without adding a newline.
    pub fn err_text(&self, text: &str) {
        write_text(&self.err, text);
    }

    /// Flush both sinks.
    pub fn flush(&self) {
        for writer in [&self.out, &self.err] {
            if let Err(e) = lock(writer).flush() {
                tracing::debug!(error = %e, "failed to flush console");
            }
        }
    }
}

fn write_line(writer: &SharedWriter, message: impl Display) {
    if let Err(e) = writeln!(lock(writer), "{}", message) {
        tracing::debug!(error = %e, "failed to write console line");
    }
}

fn write_text(writer: &SharedWriter, text: &str) {
    if let Err(e) = lock(writer).write_all(text.as_bytes()) {
        tracing::debug!(error = %e, "failed to write console text");
    }
}

/// An `io::Write` handle onto one console sink.
pub struct Sink(SharedWriter);

impl Write for Sink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        lock(&self.0).write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        lock(&self.0).flush()
    }
}

/// Growable in-memory buffer shared between a console and its reader.
#[derive(Clone, Default)]
pub struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    /// Contents decoded as UTF-8 (lossy).
    pub fn contents(&self) -> String {
        let bytes = self.0.lock().unwrap_or_else(|p| p.into_inner());
        String::from_utf8_lossy(&bytes).into_owned()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Reader side of [`Console::buffered`].
#[derive(Clone, Default)]
pub struct CapturedOutput {
    out: SharedBuffer,
    err: SharedBuffer,
}

impl CapturedOutput {
    /// Everything written to the standard sink.
    pub fn stdout(&self) -> String {
        self.out.contents()
    }

    /// Everything written to the error sink.
    pub fn stderr(&self) -> String {
        self.err.contents()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buffered_console_separates_streams() {
        let (console, captured) = Console::buffered();
        console.out_line("hello");
        console.err_line("oops");

        assert_eq!(captured.stdout(), "hello\n");
        assert_eq!(captured.stderr(), "oops\n");
    }

    #[test]
    fn sink_supports_write_macros() {
        let (console, captured) = Console::buffered();
        let mut out = console.out();
        write!(out, "a").unwrap();
        writeln!(out, "b").unwrap();

        assert_eq!(captured.stdout(), "ab\n");
        assert!(captured.stderr().is_empty());
    }

    #[test]
    fn clones_share_sinks() {
        let (console, captured) = Console::buffered();
        let other = console.clone();
        console.out_text("1");
        other.out_text("2");

        assert_eq!(captured.stdout(), "12");
    }
}
