//! # stamplog
//! Process-wide logger writing severity-filtered, timestamped lines to stdout.
//!
//! Every accepted call prints one line shaped like
//! `2024-01-01 12:00:00 [ERROR]: disk C: full`.
//!
//! ## Usage
//! ```toml
//! // Cargo.toml
//! ...
//! [dependencies]
//! stamplog = "0.1.0"
//! ```
//!
//! ```rust
//! use stamplog::Severity;
//!
//! stamplog::set_level(Severity::Warning);
//! stamplog::info!("skip me");
//! stamplog::error!("disk {} full", "C:");
//! ```
//!
//! ## Placeholders
//! Each `{}` in the format is replaced by the next argument. Missing arguments leave the
//! rest of the format untouched, extra arguments are ignored.
//!
//! ```rust
//! use stamplog::{Logger, LogBuffer};
//!
//! let buffer = LogBuffer::new();
//! let logger = Logger::new(buffer.clone());
//! logger.warning("a {} b {} c", &[&"x"]);
//! assert!(buffer.lines()[0].ends_with(" [WARNING]: a x b {} c"));
//! ```
//!
//! ## Multi-threaded logging
//! ```rust
//! use stamplog::logger_config;
//!
//! logger_config().init_global();
//! let handles: Vec<_> = (0..5).map(|i| {
//!     std::thread::spawn(move || {
//!         stamplog::info!("Hello, world from thread {}!", i);
//!         log::warn!("log facade calls land in the same place");
//!     })
//! }).collect();
//! for h in handles { h.join().unwrap(); }
//! ```

mod log_writer;
mod severity;
mod utils;

use std::{
    fmt::Display,
    io,
    sync::{
        LazyLock, Mutex, PoisonError,
        atomic::{AtomicU8, Ordering},
    },
};

use log::{LevelFilter, Log};

pub use log_writer::{LogBuffer, LogStdout, LogWriter};
pub use severity::{Severity, label_of};
pub use utils::substitute;
use utils::{format_log, timestamp};

/// The process-wide logger, created on first access.
static LOGGER: LazyLock<Logger> = LazyLock::new(|| Logger::new(LogStdout));

/// Severity-filtered logger owning a single output.
pub struct Logger {
    /// Minimum severity emitted, stored as the `Severity` ordinal.
    threshold: AtomicU8,
    writer: Mutex<Box<dyn LogWriter + Send>>,
}

impl Logger {
    /// Creates a standalone logger with the default `Info` threshold.
    pub fn new<W: LogWriter + Send + 'static>(writer: W) -> Self {
        Self {
            threshold: AtomicU8::new(Severity::default() as u8),
            writer: Mutex::new(Box::new(writer)),
        }
    }

    /// Returns the shared stdout logger. Concurrent first calls still construct it once.
    pub fn instance() -> &'static Logger {
        &LOGGER
    }

    pub fn set_level(&self, level: Severity) {
        self.threshold.store(level as u8, Ordering::Relaxed);
    }

    pub fn level(&self) -> Severity {
        Severity::from_u8(self.threshold.load(Ordering::Relaxed)).unwrap_or_default()
    }

    pub fn enabled(&self, level: Severity) -> bool {
        level as u8 >= self.threshold.load(Ordering::Relaxed)
    }

    /// Logs `format` at `level`, substituting `args` into its `{}` placeholders.
    ///
    /// # Panics
    /// If the underlying writer fails. Use [`Logger::try_log`] to handle the error instead.
    pub fn log(&self, level: Severity, format: &str, args: &[&dyn Display]) {
        self.try_log(level, format, args)
            .expect("Unable to write log line");
    }

    /// Like [`Logger::log`], but returns write failures instead of panicking.
    ///
    /// Placeholders are substituted before the writer lock is taken, so a `Display`
    /// argument that itself logs cannot deadlock. The timestamp and the write happen
    /// under the lock, so lines stay whole and in lock order.
    pub fn try_log(&self, level: Severity, format: &str, args: &[&dyn Display]) -> io::Result<()> {
        if !self.enabled(level) {
            return Ok(());
        }
        self.emit(level, &substitute(format, args))
    }

    pub fn error(&self, format: &str, args: &[&dyn Display]) {
        self.log(Severity::Error, format, args)
    }

    pub fn warning(&self, format: &str, args: &[&dyn Display]) {
        self.log(Severity::Warning, format, args)
    }

    pub fn info(&self, format: &str, args: &[&dyn Display]) {
        self.log(Severity::Info, format, args)
    }

    fn emit(&self, level: Severity, message: &str) -> io::Result<()> {
        // a panic in another writer call must not silence the logger
        let mut writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        writer.regular(&format_log(timestamp(), level, message))
    }
}

impl Log for Logger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        Logger::enabled(self, metadata.level().into())
    }

    fn log(&self, record: &log::Record) {
        let level = record.level().into();
        if !Logger::enabled(self, level) {
            return;
        }
        self.emit(level, &record.args().to_string()).ok();
    }

    fn flush(&self) {
        let mut writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        writer.flush().ok();
    }
}

/// Builder for configuring the global logger or creating standalone ones.
pub struct ConfigBuilder {
    level: Severity,
    log_facade: bool,
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self {
            level: Severity::default(),
            log_facade: true,
        }
    }
}

impl ConfigBuilder {
    /// Sets the minimum severity
    pub fn with_level(self, level: Severity) -> Self {
        Self { level, ..self }
    }
    /// Whether `init_global` registers the logger with the `log` crate.
    pub fn with_log_facade(self, yes: bool) -> Self {
        Self {
            log_facade: yes,
            ..self
        }
    }
    /// Applies the configuration to the shared logger and returns it.
    /// Registering with the `log` crate only happens once per process; later calls just update the level.
    pub fn init_global(self) -> &'static Logger {
        let logger = Logger::instance();
        logger.set_level(self.level);
        if self.log_facade && log::set_logger(logger).is_ok() {
            log::set_max_level(LevelFilter::Trace);
        }
        logger
    }
    /// Builds a standalone logger writing to `writer`.
    pub fn build<W: LogWriter + Send + 'static>(self, writer: W) -> Logger {
        let logger = Logger::new(writer);
        logger.set_level(self.level);
        logger
    }
}

/// Returns a default ConfigBuilder for configuring the logger.
pub fn logger_config() -> ConfigBuilder {
    ConfigBuilder::default()
}

/// Sets the threshold of the shared logger.
pub fn set_level(level: Severity) {
    Logger::instance().set_level(level)
}

pub fn log(level: Severity, format: &str, args: &[&dyn Display]) {
    Logger::instance().log(level, format, args)
}

pub fn error(format: &str, args: &[&dyn Display]) {
    Logger::instance().error(format, args)
}

pub fn warning(format: &str, args: &[&dyn Display]) {
    Logger::instance().warning(format, args)
}

pub fn info(format: &str, args: &[&dyn Display]) {
    Logger::instance().info(format, args)
}

/// Logs through the shared logger: `log!(Severity::Info, "x = {}", x)`.
#[macro_export]
macro_rules! log {
    ($level:expr, $format:expr $(, $arg:expr)* $(,)?) => {
        $crate::Logger::instance().log($level, $format, &[$(&$arg as &dyn ::std::fmt::Display),*])
    };
}

#[macro_export]
macro_rules! error {
    ($format:expr $(, $arg:expr)* $(,)?) => {
        $crate::log!($crate::Severity::Error, $format $(, $arg)*)
    };
}

#[macro_export]
macro_rules! warning {
    ($format:expr $(, $arg:expr)* $(,)?) => {
        $crate::log!($crate::Severity::Warning, $format $(, $arg)*)
    };
}

#[macro_export]
macro_rules! info {
    ($format:expr $(, $arg:expr)* $(,)?) => {
        $crate::log!($crate::Severity::Info, $format $(, $arg)*)
    };
}

#[cfg(test)]
fn message_of(line: &str) -> &str {
    // "YYYY-MM-DD HH:MM:SS [LEVEL]: message"
    let (head, message) = line.split_once("]: ").unwrap();
    chrono::NaiveDateTime::parse_from_str(&head[..19], "%Y-%m-%d %H:%M:%S").unwrap();
    message
}

#[test]
fn test_threshold_filtering() {
    for threshold in Severity::ALL {
        let buffer = LogBuffer::new();
        let logger = logger_config().with_level(threshold).build(buffer.clone());
        for level in Severity::ALL {
            logger.log(level, "message at {}", &[&level]);
        }
        let expected: Vec<_> = Severity::ALL
            .into_iter()
            .filter(|level| *level >= threshold)
            .map(|level| format!("[{level}]: message at {level}"))
            .collect();
        let lines = buffer.lines();
        assert_eq!(lines.len(), expected.len());
        for (line, expected) in lines.iter().zip(expected) {
            assert!(line.ends_with(&expected), "{line} does not end with {expected}");
        }
    }
}

#[test]
fn test_default_threshold_is_info() {
    let buffer = LogBuffer::new();
    let logger = Logger::new(buffer.clone());
    assert_eq!(logger.level(), Severity::Info);
    logger.log(Severity::Debug, "hidden", &[]);
    logger.log(Severity::Info, "shown", &[]);
    assert_eq!(buffer.lines().len(), 1);
}

#[test]
fn test_end_to_end_line() {
    let buffer = LogBuffer::new();
    let logger = Logger::new(buffer.clone());
    logger.set_level(Severity::Warning);
    logger.info("skip me", &[]);
    logger.error("disk {} full", &[&"C:"]);
    let lines = buffer.lines();
    assert_eq!(lines.len(), 1);
    assert_eq!(message_of(&lines[0]), "disk C: full");
    assert_eq!(&lines[0][19..], " [ERROR]: disk C: full");
}

#[test]
fn test_shorthands_and_verbatim_format() {
    let buffer = LogBuffer::new();
    let logger = Logger::new(buffer.clone());
    logger.info("{} stays", &[]);
    logger.warning("value {}", &[&42]);
    logger.error("no placeholders", &[&1, &2]);
    let lines = buffer.lines();
    assert!(lines[0].ends_with(" [INFO]: {} stays"));
    assert!(lines[1].ends_with(" [WARNING]: value 42"));
    assert!(lines[2].ends_with(" [ERROR]: no placeholders"));
}

#[test]
fn test_concurrent_lines_stay_whole() {
    use std::sync::Arc;
    let buffer = LogBuffer::new();
    let logger = Arc::new(Logger::new(buffer.clone()));
    let handles: Vec<_> = (0..8)
        .map(|i| {
            let logger = Arc::clone(&logger);
            std::thread::spawn(move || {
                for j in 0..100 {
                    logger.info("thread {} line {} end", &[&i, &j]);
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }
    let lines = buffer.lines();
    assert_eq!(lines.len(), 800);
    for i in 0..8 {
        let mine: Vec<_> = lines
            .iter()
            .map(|line| message_of(line))
            .filter(|m| m.starts_with(&format!("thread {i} ")))
            .collect();
        let expected: Vec<_> = (0..100).map(|j| format!("thread {i} line {j} end")).collect();
        assert_eq!(mine, expected);
    }
}

#[test]
fn test_poisoned_writer_keeps_logging() {
    struct Panicky(LogBuffer);
    impl LogWriter for Panicky {
        fn regular(&mut self, line: &str) -> io::Result<()> {
            if line.ends_with("boom") {
                panic!("writer failure");
            }
            self.0.regular(line)
        }
        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }
    let buffer = LogBuffer::new();
    let logger = std::sync::Arc::new(Logger::new(Panicky(buffer.clone())));
    let cloned = std::sync::Arc::clone(&logger);
    assert!(std::thread::spawn(move || cloned.info("boom", &[])).join().is_err());
    logger.info("still here", &[]);
    assert_eq!(buffer.lines().len(), 1);
}

#[test]
fn test_try_log_reports_write_failure() {
    struct Broken;
    impl LogWriter for Broken {
        fn regular(&mut self, _: &str) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::WriteZero, "full"))
        }
        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }
    let logger = Logger::new(Broken);
    assert_eq!(
        logger.try_log(Severity::Error, "x", &[]).unwrap_err().kind(),
        io::ErrorKind::WriteZero
    );
    // filtered calls never reach the writer
    assert!(logger.try_log(Severity::Debug, "x", &[]).is_ok());
}

#[test]
fn test_log_facade_records() {
    let buffer = LogBuffer::new();
    let logger = logger_config()
        .with_level(Severity::Warning)
        .build(buffer.clone());
    for level in [log::Level::Info, log::Level::Warn] {
        Log::log(
            &logger,
            &log::Record::builder()
                .level(level)
                .args(format_args!("facade {{}} verbatim"))
                .build(),
        );
    }
    Log::flush(&logger);
    let lines = buffer.lines();
    assert_eq!(lines.len(), 1);
    assert!(lines[0].ends_with(" [WARNING]: facade {} verbatim"));
    assert!(!Log::enabled(
        &logger,
        &log::Metadata::builder().level(log::Level::Trace).build()
    ));
}

#[test]
fn test_argument_that_logs_does_not_deadlock() {
    struct Noisy<'a>(&'a Logger);
    impl Display for Noisy<'_> {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            self.0.info("inner", &[]);
            f.write_str("outer arg")
        }
    }
    let buffer = LogBuffer::new();
    let logger = Logger::new(buffer.clone());
    logger.warning("got {}", &[&Noisy(&logger)]);
    let lines = buffer.lines();
    assert_eq!(lines.len(), 2);
    assert_eq!(message_of(&lines[0]), "inner");
    assert_eq!(message_of(&lines[1]), "got outer arg");
}
