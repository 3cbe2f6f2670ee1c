use std::fmt;

use log::Level;

/// Severity of a log message, ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(u8)]
pub enum Severity {
    Debug = 0,
    #[default]
    Info = 1,
    Warning = 2,
    Error = 3,
}

/// Label printed for a raw severity value. Values outside the known range render as `UNKNOWN`.
pub fn label_of(raw: u8) -> &'static str {
    match raw {
        0 => "DEBUG",
        1 => "INFO",
        2 => "WARNING",
        3 => "ERROR",
        _ => "UNKNOWN",
    }
}

impl Severity {
    pub const ALL: [Severity; 4] = [
        Severity::Debug,
        Severity::Info,
        Severity::Warning,
        Severity::Error,
    ];

    pub fn from_u8(raw: u8) -> Option<Self> {
        Self::ALL.get(raw as usize).copied()
    }

    pub fn as_str(self) -> &'static str {
        label_of(self as u8)
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Level> for Severity {
    fn from(level: Level) -> Self {
        match level {
            Level::Error => Severity::Error,
            Level::Warn => Severity::Warning,
            Level::Info => Severity::Info,
            Level::Debug | Level::Trace => Severity::Debug,
        }
    }
}

#[test]
fn test_severity_ordering() {
    assert!(Severity::Debug < Severity::Info);
    assert!(Severity::Info < Severity::Warning);
    assert!(Severity::Warning < Severity::Error);
    assert_eq!(Severity::default(), Severity::Info);
}

#[test]
fn test_severity_labels() {
    let labels: Vec<_> = Severity::ALL.iter().map(|s| s.to_string()).collect();
    assert_eq!(labels, ["DEBUG", "INFO", "WARNING", "ERROR"]);
    assert_eq!(label_of(4), "UNKNOWN");
    assert_eq!(label_of(u8::MAX), "UNKNOWN");
    assert_eq!(Severity::from_u8(2), Some(Severity::Warning));
    assert_eq!(Severity::from_u8(7), None);
}

#[test]
fn test_severity_from_log_level() {
    assert_eq!(Severity::from(Level::Trace), Severity::Debug);
    assert_eq!(Severity::from(Level::Warn), Severity::Warning);
    assert_eq!(Severity::from(Level::Error), Severity::Error);
}
