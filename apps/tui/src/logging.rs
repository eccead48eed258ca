//! Tracing setup. The dashboard owns the terminal, so interactive runs log
//! to a file; headless runs log to stderr.

use color_eyre::eyre::eyre;
use color_eyre::Result;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use crate::config::AppConfig;

fn filter(config: &AppConfig) -> EnvFilter {
    EnvFilter::try_new(&config.log_filter).unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Installs a subscriber writing to `config.log_file`. Keep the returned
/// guard alive for the lifetime of the program or buffered lines are lost.
pub fn init_file_logging(config: &AppConfig) -> Result<WorkerGuard> {
    let directory = config
        .log_file
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .map_or_else(|| std::path::PathBuf::from("."), std::path::Path::to_path_buf);
    let file_name = config
        .log_file
        .file_name()
        .ok_or_else(|| eyre!("Log file path has no file name: {}", config.log_file.display()))?;

    std::fs::create_dir_all(&directory)?;
    let appender = tracing_appender::rolling::never(&directory, file_name);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::fmt()
        .with_env_filter(filter(config))
        .with_writer(writer)
        .with_ansi(false)
        .with_target(true)
        .compact()
        .try_init()
        .map_err(|e| eyre!("Failed to install logger: {e}"))?;

    Ok(guard)
}

pub fn init_stderr_logging(config: &AppConfig) -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(filter(config))
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .try_init()
        .map_err(|e| eyre!("Failed to install logger: {e}"))
}
