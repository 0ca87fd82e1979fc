pub mod config;
mod http_layers;
pub mod library_routes;
pub mod server;
pub mod session;
pub mod state;

pub use config::ServerConfig;
pub use http_layers::*;
pub use server::{make_app, run_server};

/// Seconds a client should wait before retrying after a store failure.
pub const STORE_RETRY_AFTER_SEC: &str = "5";
