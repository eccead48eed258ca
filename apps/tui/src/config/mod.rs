use cube_report_core::{ColumnLayout, CubeEndpoint, DEFAULT_BASE_URL};
use dotenv::dotenv;
use std::env;
use std::path::PathBuf;
use thiserror::Error;

/// Terminal width (in cells) from which the bar groups use two columns.
pub const DEFAULT_COLUMN_BREAKPOINT: u16 = 120;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("REPORT_COLUMN_BREAKPOINT must be a positive number of cells, got '{0}'")]
    InvalidBreakpoint(String),

    #[error(transparent)]
    Endpoint(#[from] cube_report_core::RequestError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub base_url: String,
    pub column_breakpoint: u16,
    pub log_filter: String,
    pub log_file: PathBuf,
}

impl AppConfig {
    pub fn endpoint(&self) -> Result<CubeEndpoint, ConfigError> {
        Ok(CubeEndpoint::parse(&self.base_url)?)
    }

    pub const fn column_layout(&self) -> ColumnLayout {
        ColumnLayout::new(self.column_breakpoint)
    }
}

/// Loads `.env` if present, then reads the configuration from the
/// environment.
pub fn init_app_config() -> Result<AppConfig, ConfigError> {
    dotenv().ok();
    config_from(|key| env::var(key).ok())
}

/// Builds the configuration from an arbitrary variable lookup.
pub fn config_from(lookup: impl Fn(&str) -> Option<String>) -> Result<AppConfig, ConfigError> {
    let base_url = lookup("CUBE_BASE_URL")
        .filter(|url| !url.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

    let column_breakpoint = match lookup("REPORT_COLUMN_BREAKPOINT") {
        Some(raw) => raw
            .trim()
            .parse::<u16>()
            .ok()
            .filter(|cells| *cells > 0)
            .ok_or_else(|| ConfigError::InvalidBreakpoint(raw.clone()))?,
        None => DEFAULT_COLUMN_BREAKPOINT,
    };

    let log_filter = lookup("REPORT_LOG").unwrap_or_else(|| "info".to_string());
    let log_file = lookup("REPORT_LOG_FILE").map_or_else(default_log_file, PathBuf::from);

    let config = AppConfig {
        base_url,
        column_breakpoint,
        log_filter,
        log_file,
    };
    config.endpoint()?;
    Ok(config)
}

fn default_log_file() -> PathBuf {
    env::temp_dir().join("cube-report.log")
}
