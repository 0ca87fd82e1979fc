use super::RequestsLoggingLevel;
use crate::config::{AppConfig, DEFAULT_PAGE_LIMIT, DEFAULT_REQUEST_TIMEOUT_SEC, MAX_PAGE_LIMIT};

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub requests_logging_level: RequestsLoggingLevel,
    pub port: u16,
    pub request_timeout_sec: u64,
    /// Page size used when a listing request does not ask for one.
    pub default_page_limit: usize,
    pub max_page_limit: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            requests_logging_level: RequestsLoggingLevel::Path,
            port: 3001,
            request_timeout_sec: DEFAULT_REQUEST_TIMEOUT_SEC,
            default_page_limit: DEFAULT_PAGE_LIMIT,
            max_page_limit: MAX_PAGE_LIMIT,
        }
    }
}

impl From<&AppConfig> for ServerConfig {
    fn from(app_config: &AppConfig) -> Self {
        ServerConfig {
            requests_logging_level: app_config.logging_level.clone(),
            port: app_config.port,
            request_timeout_sec: app_config.request_timeout_sec,
            default_page_limit: app_config.default_page_limit,
            max_page_limit: app_config.max_page_limit,
        }
    }
}
