//! Test fixture creation for the library database

use super::constants::*;
use anyhow::Result;
use media_library_server::user::{AuthToken, AuthTokenValue, UserAuthTokenStore, UserStore};
use media_library_server::SqliteLibraryStore;
use std::path::PathBuf;
use tempfile::TempDir;

fn add_user_with_token(store: &SqliteLibraryStore, handle: &str, token: &str) -> Result<usize> {
    let user_id = store.create_user(handle)?;
    store.add_user_auth_token(AuthToken {
        user_id,
        value: AuthTokenValue(token.to_string()),
        created: 0,
        last_used: None,
    })?;
    Ok(user_id)
}

/// Creates a temporary library database holding `TEST_USER` and `OTHER_USERS`,
/// each with a known token.
/// Returns (temp_dir, db_path)
pub fn create_test_db_with_users() -> Result<(TempDir, PathBuf)> {
    let dir = TempDir::new()?;
    let db_path = dir.path().join("library.db");

    let store = SqliteLibraryStore::new(&db_path)?;
    add_user_with_token(&store, TEST_USER, TEST_USER_TOKEN)?;
    for (handle, token) in OTHER_USERS {
        add_user_with_token(&store, handle, token)?;
    }

    Ok((dir, db_path))
}
