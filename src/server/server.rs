use anyhow::{Context, Result};
use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use axum::{
    extract::State, middleware, response::IntoResponse, routing::get, Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::timeout::TimeoutLayer;
use tracing::info;

use super::library_routes::make_library_routes;
use super::session::Session;
use super::{log_requests, state::*, ServerConfig};
use crate::library::{FullLibraryStore, LibraryEntryStore, LibraryManager};
use crate::user::UserStore;

#[derive(Serialize, Deserialize, Debug)]
pub struct ServerStats {
    pub uptime: String,
    pub hash: String,
    pub user_id: Option<usize>,
}

fn format_uptime(duration: Duration) -> String {
    let total_seconds = duration.as_secs();

    let days = total_seconds / 86_400;
    let hours = (total_seconds % 86_400) / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    format!("{}d {:02}:{:02}:{:02}", days, hours, minutes, seconds)
}

async fn home(session: Option<Session>, State(state): State<ServerState>) -> impl IntoResponse {
    let stats = ServerStats {
        uptime: format_uptime(state.start_time.elapsed()),
        hash: state.hash.clone(),
        user_id: session.map(|s| s.user_id),
    };
    Json(stats)
}

impl ServerState {
    fn new<S: FullLibraryStore + 'static>(config: ServerConfig, store: Arc<S>) -> ServerState {
        let entry_store: Arc<dyn LibraryEntryStore> = store.clone();
        let user_store: Arc<dyn UserStore> = store;
        ServerState {
            config,
            start_time: Instant::now(),
            library_manager: Arc::new(LibraryManager::new(entry_store)),
            user_store,
            hash: env!("CARGO_PKG_VERSION").to_owned(),
        }
    }
}

pub fn make_app<S: FullLibraryStore + 'static>(config: ServerConfig, store: Arc<S>) -> Router {
    let state = ServerState::new(config.clone(), store);

    let home_router: Router = Router::new()
        .route("/", get(home))
        .with_state(state.clone());

    home_router
        .nest("/v1/library-entries", make_library_routes(state.clone()))
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.request_timeout_sec,
        )))
        .layer(middleware::from_fn_with_state(state, log_requests))
}

pub async fn run_server<S: FullLibraryStore + 'static>(
    config: ServerConfig,
    store: Arc<S>,
) -> Result<()> {
    let port = config.port;
    let app = make_app(config, store);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port))
        .await
        .with_context(|| format!("Failed to bind port {}", port))?;
    info!("Listening on port {}", port);

    Ok(axum::serve(listener, app).await?)
}
