use tracing::metadata::LevelFilter;
use tracing_subscriber::fmt::SubscriberBuilder;
use tracing_subscriber::EnvFilter;

/// Installs the global subscriber. `-v` counts pick a level, otherwise
/// `RUST_LOG` decides. Logs go to stderr so query output stays clean.
pub fn log_init(verbose: u8, debug: bool) {
    let mut log_level = match verbose {
        0 => None,
        1 => Some(LevelFilter::WARN),
        2 => Some(LevelFilter::INFO),
        3 => Some(LevelFilter::DEBUG),
        _ => Some(LevelFilter::TRACE),
    };
    if debug {
        log_level = Some(LevelFilter::DEBUG);
    }

    let builder = SubscriberBuilder::default().with_writer(std::io::stderr);
    if let Some(log_level) = log_level {
        builder.with_max_level(log_level).init();
    } else {
        builder.with_env_filter(EnvFilter::from_default_env()).init();
    }
}
