use std::fs;
use std::io;

use tracing::dispatcher::DefaultGuard;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::Layer;
use tracing_subscriber::{fmt, registry};

use crate::exchange::config::{Config, Logging};
use crate::exchange::error::Result;

// This is a helper struct to store the logger guards. When they are dropped, logging can be reset.
#[allow(dead_code)]
pub struct LogGuards {
    log_guard: Option<WorkerGuard>,
    default: DefaultGuard,
}

pub fn init_std_out_logging_thread_local() -> DefaultGuard {
    let collector = registry().with(
        fmt::Layer::new()
            .with_writer(io::stdout)
            .with_filter(LevelFilter::INFO),
    );
    tracing::subscriber::set_default(collector)
}

/// Installs the subscriber for the calling thread. Every rank gets a json log file if file
/// logging is configured; only rank 0 writes to stdout.
pub fn init_logging(config: &Config, rank: u32) -> Result<LogGuards> {
    let dir = &config.output().output_dir;

    let (log_layer, log_guard) = if Logging::Info == config.output().logging {
        fs::create_dir_all(dir)?;
        let log_file_name = format!("log_process_{rank}.txt");
        let log_file_appender = rolling::never(dir, log_file_name);
        let (log_file, log_guard) = non_blocking(log_file_appender);
        let layer = fmt::Layer::new()
            .with_writer(log_file)
            .json()
            .with_ansi(false)
            .with_filter(LevelFilter::DEBUG);
        (Some(layer), Some(log_guard))
    } else {
        (None, None)
    };

    let console_layer = (rank == 0).then(|| {
        fmt::layer()
            .with_writer(io::stdout)
            .with_span_events(FmtSpan::CLOSE)
            .with_filter(LevelFilter::INFO)
    });

    // Add `Optional`s. If None, then the corresponding layer is not added.
    let collector = registry().with(log_layer).with(console_layer);

    let default = tracing::subscriber::set_default(collector);

    Ok(LogGuards { log_guard, default })
}

#[cfg(test)]
mod tests {
    use serial_test::serial;
    use tracing::info;

    use super::init_logging;
    use crate::exchange::config::{Config, Logging};

    #[test]
    #[serial]
    fn file_logging_creates_log_per_rank() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.modules.output.output_dir = dir.path().to_path_buf();
        config.modules.output.logging = Logging::Info;

        {
            let _guards = init_logging(&config, 1).unwrap();
            info!("written to the log file of rank 1");
        }

        let content = std::fs::read_to_string(dir.path().join("log_process_1.txt")).unwrap();
        assert!(content.contains("written to the log file of rank 1"));
    }

    #[test]
    #[serial]
    fn no_file_without_file_logging() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.modules.output.output_dir = dir.path().to_path_buf();

        {
            let _guards = init_logging(&config, 0).unwrap();
            info!("only on stdout");
        }

        assert!(!dir.path().join("log_process_0.txt").exists());
    }
}
