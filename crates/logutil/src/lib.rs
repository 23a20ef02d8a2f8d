//! Utilities for logging.
use tracing::Level;
use tracing_subscriber::filter::Directive;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LoggingMode {
    #[default]
    Pretty,
    Json,
    Compact,
}

/// Map a `-v` count onto a max level.
///
/// No flag keeps INFO so that the progress of a run is visible.
pub fn verbosity_level(verbosity: u8) -> Level {
    match verbosity {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

fn env_filter(level: Level) -> EnvFilter {
    let mut filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();
    // Transport internals are only interesting when explicitly asked for.
    for noisy in ["hyper=info", "hyper_util=info", "reqwest=info", "rustls=info"] {
        if let Ok(directive) = noisy.parse::<Directive>() {
            filter = filter.add_directive(directive);
        }
    }
    filter
}

/// Install the global subscriber.
///
/// Logs go to stderr. Subsequent calls are no-ops.
pub fn init(verbosity: u8, mode: LoggingMode) {
    let level = verbosity_level(verbosity);
    let builder = FmtSubscriber::builder()
        .with_env_filter(env_filter(level))
        .with_writer(std::io::stderr);

    let result = match mode {
        LoggingMode::Pretty => tracing::subscriber::set_global_default(
            builder.with_file(true).with_line_number(true).finish(),
        ),
        LoggingMode::Json => tracing::subscriber::set_global_default(
            builder.json().with_current_span(false).finish(),
        ),
        LoggingMode::Compact => {
            tracing::subscriber::set_global_default(builder.compact().with_target(false).finish())
        }
    };

    // Already set, e.g. by a test harness.
    let _ = result;
}

/// Subscriber for tests, output is captured by the test harness.
pub fn init_test() {
    let subscriber = FmtSubscriber::builder()
        .with_test_writer()
        .with_env_filter(env_filter(Level::DEBUG))
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_maps_to_level() {
        assert_eq!(Level::INFO, verbosity_level(0));
        assert_eq!(Level::DEBUG, verbosity_level(1));
        assert_eq!(Level::TRACE, verbosity_level(2));
        assert_eq!(Level::TRACE, verbosity_level(9));
    }

    #[test]
    fn init_twice_does_not_panic() {
        init_test();
        init(0, LoggingMode::Compact);
    }
}
