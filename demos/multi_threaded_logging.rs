use stamplog::{Severity, logger_config};

fn main() {
    let logger = logger_config().with_level(Severity::Debug).init_global();
    stamplog::info!("Hello, world!");
    log::debug!("log facade messages use the same output");

    let handles: Vec<_> = (0..5)
        .map(|i| {
            std::thread::spawn(move || {
                for j in 0..3 {
                    stamplog::warning!("thread {} message {}", i, j);
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    logger.set_level(Severity::Error);
    stamplog::info!("this line is filtered");
    stamplog::error!("only errors from now on, {} placeholder left: {}", "one");
}
