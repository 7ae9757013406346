//! Tracing setup for the binary.
//!
//! Logs go to a daily-rolling file under ~/.config/regdesk/logs so they
//! never interleave with the REPL. `RUST_LOG` overrides the default filter.

use regdesk_infrastructure::RegdeskPaths;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_FILTER: &str = "regdesk=info";
const LOG_FILE_PREFIX: &str = "regdesk.log";

/// Installs the global subscriber. Keep the returned guard alive until
/// exit so buffered lines are flushed.
///
/// Falls back to warnings on stderr when the logs directory is unusable.
pub fn init() -> Option<WorkerGuard> {
    let filter =
        || EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let logs_dir = RegdeskPaths::logs_dir()
        .ok()
        .filter(|dir| std::fs::create_dir_all(dir).is_ok());

    match logs_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::registry()
                .with(filter())
                .with(tracing_subscriber::fmt::layer().with_ansi(false).with_writer(writer))
                .init();
            Some(guard)
        }
        None => {
            tracing_subscriber::registry()
                .with(EnvFilter::new("warn"))
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
            None
        }
    }
}
