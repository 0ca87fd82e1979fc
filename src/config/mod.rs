mod file_config;

pub use file_config::{FileConfig, PaginationConfig};

use crate::server::RequestsLoggingLevel;
use anyhow::{bail, Result};
use clap::ValueEnum;
use std::path::PathBuf;

pub const DEFAULT_PAGE_LIMIT: usize = 20;
pub const MAX_PAGE_LIMIT: usize = 100;
pub const DEFAULT_REQUEST_TIMEOUT_SEC: u64 = 30;

/// CLI arguments that can be used for config resolution.
#[derive(Debug, Clone)]
pub struct CliConfig {
    pub db_dir: Option<PathBuf>,
    pub port: u16,
    pub logging_level: RequestsLoggingLevel,
    pub request_timeout_sec: u64,
}

impl Default for CliConfig {
    fn default() -> Self {
        CliConfig {
            db_dir: None,
            port: 3001,
            logging_level: RequestsLoggingLevel::default(),
            request_timeout_sec: DEFAULT_REQUEST_TIMEOUT_SEC,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub db_dir: PathBuf,
    pub port: u16,
    pub logging_level: RequestsLoggingLevel,
    pub request_timeout_sec: u64,
    pub default_page_limit: usize,
    pub max_page_limit: usize,
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        let db_dir = file
            .db_dir
            .map(PathBuf::from)
            .or_else(|| cli.db_dir.clone())
            .ok_or_else(|| {
                anyhow::anyhow!("db_dir must be specified via --db-dir or in config file")
            })?;

        if !db_dir.exists() {
            bail!("Database directory does not exist: {:?}", db_dir);
        }
        if !db_dir.is_dir() {
            bail!("db_dir is not a directory: {:?}", db_dir);
        }

        let port = file.port.unwrap_or(cli.port);
        let logging_level = file
            .logging_level
            .and_then(|s| parse_logging_level(&s))
            .unwrap_or_else(|| cli.logging_level.clone());
        let request_timeout_sec = file
            .request_timeout_sec
            .unwrap_or(cli.request_timeout_sec);

        let pagination = file.pagination.unwrap_or_default();
        let max_page_limit = pagination.max_limit.unwrap_or(MAX_PAGE_LIMIT);
        let default_page_limit = pagination.default_limit.unwrap_or(DEFAULT_PAGE_LIMIT);
        if max_page_limit == 0 {
            bail!("max_limit must be greater than zero");
        }
        if default_page_limit == 0 || default_page_limit > max_page_limit {
            bail!(
                "default_limit {} must be between 1 and max_limit {}",
                default_page_limit,
                max_page_limit
            );
        }

        Ok(AppConfig {
            db_dir,
            port,
            logging_level,
            request_timeout_sec,
            default_page_limit,
            max_page_limit,
        })
    }

    pub fn library_db_path(&self) -> PathBuf {
        self.db_dir.join("library.db")
    }
}

/// Parses a logging level string into RequestsLoggingLevel.
fn parse_logging_level(s: &str) -> Option<RequestsLoggingLevel> {
    RequestsLoggingLevel::from_str(s, true).ok()
}
