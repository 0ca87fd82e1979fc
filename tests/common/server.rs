//! Test server lifecycle management
//!
//! Each test gets an isolated server with its own database.

use super::constants::*;
use super::fixtures::create_test_db_with_users;
use media_library_server::server::{make_app, RequestsLoggingLevel, ServerConfig};
use media_library_server::user::UserStore;
use media_library_server::SqliteLibraryStore;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::net::TcpListener;

/// Test server instance with an isolated database
///
/// When dropped, the server gracefully shuts down and temp resources are cleaned up.
pub struct TestServer {
    /// Base URL for making requests (e.g., "http://127.0.0.1:12345")
    pub base_url: String,

    /// The port the server is listening on
    pub port: u16,

    /// Store for direct database access in tests
    pub store: Arc<SqliteLibraryStore>,

    _temp_db_dir: TempDir,
    _shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl TestServer {
    /// Spawns a new test server on a random port
    ///
    /// # Panics
    ///
    /// Panics if the database can't be created, the port can't be bound or
    /// the server doesn't become ready within `SERVER_READY_TIMEOUT_MS`.
    pub async fn spawn() -> Self {
        let (temp_db_dir, db_path) =
            create_test_db_with_users().expect("Failed to create test database");
        let store =
            Arc::new(SqliteLibraryStore::new(&db_path).expect("Failed to open library store"));

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");
        let port = listener
            .local_addr()
            .expect("Failed to get local address")
            .port();
        let base_url = format!("http://127.0.0.1:{}", port);

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

        let config = ServerConfig {
            port,
            requests_logging_level: RequestsLoggingLevel::None,
            request_timeout_sec: REQUEST_TIMEOUT_SECS,
            default_page_limit: TEST_DEFAULT_PAGE_LIMIT,
            max_page_limit: 50,
        };
        let app = make_app(config, store.clone());

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .expect("Server failed");
        });

        let server = Self {
            base_url,
            port,
            store,
            _temp_db_dir: temp_db_dir,
            _shutdown_tx: Some(shutdown_tx),
        };

        server.wait_for_ready().await;

        server
    }

    /// Id of a fixture user
    pub fn user_id(&self, handle: &str) -> usize {
        self.store
            .get_user_id(handle)
            .expect("Failed to read user")
            .unwrap_or_else(|| panic!("No fixture user {}", handle))
    }

    /// Waits for the server to become ready by polling the / endpoint
    async fn wait_for_ready(&self) {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(100))
            .build()
            .expect("Failed to build reqwest client");

        let start = std::time::Instant::now();
        let timeout = Duration::from_millis(SERVER_READY_TIMEOUT_MS);

        loop {
            if start.elapsed() > timeout {
                panic!(
                    "Server did not become ready within {}ms",
                    SERVER_READY_TIMEOUT_MS
                );
            }

            match client.get(format!("{}/", self.base_url)).send().await {
                Ok(response) if response.status().is_success() => return,
                _ => {
                    tokio::time::sleep(Duration::from_millis(SERVER_READY_POLL_INTERVAL_MS)).await;
                }
            }
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self._shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}
