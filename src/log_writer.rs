use std::{
    io::{self, Write},
    sync::{Arc, Mutex, PoisonError},
};

/// Destination of formatted log lines.
pub trait LogWriter {
    /// Writes one complete line, terminated by a newline.
    fn regular(&mut self, line: &str) -> io::Result<()>;
    fn flush(&mut self) -> io::Result<()>;
}

/// Writes `line` and its newline in a single `write_all`, then flushes.
fn write_line<W: Write>(out: &mut W, line: &str) -> io::Result<()> {
    let mut buf = String::with_capacity(line.len() + 1);
    buf.push_str(line);
    buf.push('\n');
    out.write_all(buf.as_bytes())?;
    out.flush()
}

#[derive(Default, Debug)]
pub struct LogStdout;

impl LogWriter for LogStdout {
    fn regular(&mut self, line: &str) -> io::Result<()> {
        write_line(&mut io::stdout().lock(), line)
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stdout().flush()
    }
}

/// In-memory writer. Clones share the same lines, so a handle kept by the caller
/// sees everything written through the logger.
#[derive(Default, Debug, Clone)]
pub struct LogBuffer {
    lines: Arc<Mutex<Vec<String>>>,
}

impl LogBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl LogWriter for LogBuffer {
    fn regular(&mut self, line: &str) -> io::Result<()> {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(line.into());
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[test]
fn test_log_buffer() {
    let buffer = LogBuffer::new();
    let mut writer = buffer.clone();
    writer.regular("Hello, world!").unwrap();
    writer.regular("rust is awesome !").unwrap();
    writer.flush().unwrap();
    assert_eq!(buffer.lines(), ["Hello, world!", "rust is awesome !"]);
}

#[test]
fn test_write_line_appends_newline() {
    let mut out = Vec::new();
    write_line(&mut out, "2024-01-01 12:00:00 [ERROR]: disk C: full").unwrap();
    write_line(&mut out, "").unwrap();
    assert_eq!(out, b"2024-01-01 12:00:00 [ERROR]: disk C: full\n\n");
}

#[test]
fn test_log_stdout() {
    let mut log_stdout = LogStdout;
    log_stdout.regular("Hello, world!").unwrap();
    log_stdout.regular("").unwrap();
    log_stdout.flush().unwrap();
}
