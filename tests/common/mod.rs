//! Common test infrastructure
//!
//! Tests should only import from this module, not from internal submodules.
//!
//! # Example
//!
//! ```no_run
//! mod common;
//! use common::{TestServer, TestClient, TEST_USER_TOKEN};
//! use reqwest::StatusCode;
//!
//! #[tokio::test]
//! async fn test_list_entries() {
//!     let server = TestServer::spawn().await;
//!     let client = TestClient::authenticated(server.base_url.clone(), TEST_USER_TOKEN);
//!
//!     let response = client.list_entries(&[]).await;
//!     assert_eq!(response.status(), StatusCode::OK);
//! }
//! ```

mod client;
mod constants;
mod fixtures;
mod server;

pub use client::TestClient;
pub use constants::*;
pub use server::TestServer;

#[allow(unused_imports)]
pub(crate) use fixtures::create_test_db_with_users;
