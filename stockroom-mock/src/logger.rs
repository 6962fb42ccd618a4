//! Logging setup for the mock backend binary.

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

/// Initialize the global subscriber.
///
/// `RUST_LOG` wins over `log_level` when set. With `log_dir` pointing at an
/// existing directory, output goes to a daily rolling file there; the
/// returned guard must be kept alive for buffered lines to be flushed.
pub fn init_logger_with_file(log_level: &str, log_dir: Option<&str>) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("stockroom_mock={log_level},tower_http={log_level}")));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_file(false)
        .with_line_number(false)
        .with_thread_ids(false)
        .with_target(false);

    if let Some(dir) = log_dir
        && Path::new(dir).is_dir()
    {
        let file_appender = tracing_appender::rolling::daily(dir, "stockroom-mock");
        let (writer, guard) = tracing_appender::non_blocking(file_appender);
        subscriber.with_ansi(false).with_writer(writer).init();
        return Some(guard);
    }

    subscriber.init();
    None
}
