use std::fmt::Display;

use chrono::{Local, NaiveDateTime};

use crate::severity::Severity;

const PLACEHOLDER: &str = "{}";

/// Replaces each `{}` in `format` with the next argument, in order.
///
/// With no arguments the format is returned untouched. Once the arguments run out
/// (or no placeholder is left) the rest of the format is appended as is, so
/// `"a {} b {} c"` with `["x"]` gives `"a x b {} c"`. Surplus arguments are dropped.
pub fn substitute(format: &str, args: &[&dyn Display]) -> String {
    if args.is_empty() {
        return format.to_owned();
    }
    let mut message = String::with_capacity(format.len());
    let mut rest = format;
    for arg in args {
        let Some(pos) = rest.find(PLACEHOLDER) else {
            break;
        };
        message.push_str(&rest[..pos]);
        message.push_str(&arg.to_string());
        rest = &rest[pos + PLACEHOLDER.len()..];
    }
    message.push_str(rest);
    message
}

/// Current local wall-clock time, truncated to whole seconds on display.
pub fn timestamp() -> NaiveDateTime {
    Local::now().naive_local()
}

pub fn format_log(time: NaiveDateTime, level: Severity, message: &str) -> String {
    let time = time.format("%Y-%m-%d %H:%M:%S");
    format!("{time} [{level}]: {message}")
}

#[cfg(test)]
fn at(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
}

#[test]
fn test_substitute_in_order() {
    assert_eq!(substitute("answer: {}", &[&42]), "answer: 42");
    assert_eq!(substitute("a {} b {} c", &[&"x", &"y"]), "a x b y c");
    assert_eq!(substitute("{}{}", &[&1, &2.5]), "12.5");
}

#[test]
fn test_substitute_exhausted_arguments_keep_tail() {
    assert_eq!(substitute("a {} b {} c", &[&"x"]), "a x b {} c");
    assert_eq!(substitute("{} {} {}", &[&'z']), "z {} {}");
}

#[test]
fn test_substitute_surplus_arguments() {
    assert_eq!(substitute("no placeholder", &[&1, &2, &3]), "no placeholder");
    assert_eq!(substitute("one {} only", &[&"x", &"y"]), "one x only");
}

#[test]
fn test_substitute_without_arguments_is_verbatim() {
    assert_eq!(substitute("keep {} as is", &[]), "keep {} as is");
    assert_eq!(substitute("", &[]), "");
}

#[test]
fn test_substitute_arguments_are_not_rescanned() {
    assert_eq!(substitute("{} {}", &[&"{}", &"x"]), "{} x");
    assert_eq!(substitute("{{}}", &[&1]), "{1}");
    assert_eq!(substitute("été {} ünï", &[&"ça"]), "été ça ünï");
}

#[test]
fn test_substitute_lone_brace_is_literal() {
    assert_eq!(substitute("set {a} = {}", &[&1]), "set {a} = 1");
    assert_eq!(substitute("{", &[&1]), "{");
}

#[test]
fn test_format_log() {
    let time = at("2024-01-01 12:00:00");
    let message = substitute("disk {} full", &[&"C:"]);
    assert_eq!(
        format_log(time, Severity::Error, &message),
        "2024-01-01 12:00:00 [ERROR]: disk C: full"
    );
    assert_eq!(
        format_log(at("1999-12-31 23:59:59"), Severity::Warning, "late"),
        "1999-12-31 23:59:59 [WARNING]: late"
    );
}

#[test]
fn test_timestamp_renders_whole_seconds() {
    let rendered = timestamp().format("%Y-%m-%d %H:%M:%S").to_string();
    assert_eq!(rendered.len(), 19);
    assert!(NaiveDateTime::parse_from_str(&rendered, "%Y-%m-%d %H:%M:%S").is_ok());
}
