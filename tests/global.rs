use std::{
    process::Command,
    sync::{Arc, Barrier},
};

use chrono::NaiveDateTime;

use stamplog::{Logger, Severity, logger_config};

#[test]
fn test_instance_is_shared_across_threads() {
    let barrier = Arc::new(Barrier::new(16));
    let handles: Vec<_> = (0..16)
        .map(|_| {
            let barrier = Arc::clone(&barrier);
            std::thread::spawn(move || {
                barrier.wait();
                Logger::instance() as *const Logger as usize
            })
        })
        .collect();
    let addresses: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert!(addresses.iter().all(|a| *a == addresses[0]));
    assert_eq!(addresses[0], Logger::instance() as *const Logger as usize);
}

#[test]
fn test_global_configuration() {
    let logger = logger_config().with_level(Severity::Warning).init_global();
    assert!(std::ptr::eq(logger, Logger::instance()));
    assert_eq!(Logger::instance().level(), Severity::Warning);
    assert_eq!(log::max_level(), log::LevelFilter::Trace);

    stamplog::info!("skip me");
    stamplog::error!("disk {} full", "C:");
    stamplog::warning!("{} of {} retries", 3, 5);
    stamplog::log!(Severity::Debug, "filtered");
    log::warn!("through the log facade");
    log::debug!("filtered by the same threshold");

    // a second init only updates the level
    logger_config().with_level(Severity::Debug).init_global();
    assert_eq!(Logger::instance().level(), Severity::Debug);

    stamplog::set_level(Severity::Error);
    assert!(!Logger::instance().enabled(Severity::Warning));
    stamplog::info("dropped {}", &[&1]);
    stamplog::warning("dropped", &[]);
    stamplog::error("kept {}", &[&"line"]);
    stamplog::log(Severity::Error, "kept", &[]);
    stamplog::set_level(Severity::Info);
}

/// Set in the re-executed test binary so `emit_through_shared_logger` logs instead of returning.
const CHILD_ENV: &str = "STAMPLOG_TEST_CHILD";

/// Strips the timestamp of every log line found in `stdout`. Lines from the test harness are skipped,
/// and a log line glued after harness text is found by locating its timestamp.
fn log_lines(stdout: &str) -> Vec<String> {
    stdout
        .lines()
        .filter_map(|line| {
            line.char_indices().find_map(|(pos, _)| {
                let stamp = line.get(pos..pos + 19)?;
                NaiveDateTime::parse_from_str(stamp, "%Y-%m-%d %H:%M:%S").ok()?;
                Some(line[pos + 19..].to_string())
            })
        })
        .collect()
}

#[test]
fn emit_through_shared_logger() {
    if std::env::var_os(CHILD_ENV).is_none() {
        return;
    }
    stamplog::set_level(Severity::Warning);
    stamplog::info!("skip me");
    stamplog::error!("disk {} full", "C:");
    stamplog::warning!("a {} b {} c", "x");
    Logger::instance().log(Severity::Debug, "hidden", &[]);
}

#[test]
fn test_stdout_receives_whole_lines() {
    let output = Command::new(std::env::current_exe().unwrap())
        .args(["emit_through_shared_logger", "--exact", "--nocapture", "--test-threads=1"])
        .env(CHILD_ENV, "1")
        .output()
        .unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(!stdout.contains("skip me"));
    assert!(!stdout.contains("hidden"));
    assert_eq!(
        log_lines(&stdout),
        [" [ERROR]: disk C: full", " [WARNING]: a x b {} c"]
    );
}
