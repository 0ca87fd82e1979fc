use axum::extract::FromRef;

use crate::library::LibraryManager;
use crate::user::UserStore;
use std::sync::Arc;
use std::time::Instant;

use super::ServerConfig;

pub type GuardedLibraryManager = Arc<LibraryManager>;
pub type GuardedUserStore = Arc<dyn UserStore>;

#[derive(Clone)]
pub struct ServerState {
    pub config: ServerConfig,
    pub start_time: Instant,
    pub library_manager: GuardedLibraryManager,
    pub user_store: GuardedUserStore,
    pub hash: String,
}

impl FromRef<ServerState> for GuardedLibraryManager {
    fn from_ref(input: &ServerState) -> Self {
        input.library_manager.clone()
    }
}

impl FromRef<ServerState> for GuardedUserStore {
    fn from_ref(input: &ServerState) -> Self {
        input.user_store.clone()
    }
}

impl FromRef<ServerState> for ServerConfig {
    fn from_ref(input: &ServerState) -> Self {
        input.config.clone()
    }
}
