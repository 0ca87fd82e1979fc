use super::auth::{AuthToken, AuthTokenValue};
use anyhow::Result;

pub trait UserAuthTokenStore: Send + Sync {
    /// Returns a user's authentication token given an AuthTokenValue.
    /// Returns Ok(None) if the token does not exist.
    fn get_user_auth_token(&self, token: &AuthTokenValue) -> Result<Option<AuthToken>>;

    /// Deletes an auth token given the token value.
    /// Returns Ok(None) if the token does not exist.
    fn delete_user_auth_token(&self, token: &AuthTokenValue) -> Result<Option<AuthToken>>;

    /// Updates an auth token with the latest timestamp.
    fn update_user_auth_token_last_used_timestamp(&self, token: &AuthTokenValue) -> Result<()>;

    /// Adds a new auth token, fails if the value is already taken.
    fn add_user_auth_token(&self, token: AuthToken) -> Result<()>;

    /// Returns all the tokens issued to the user with the given id.
    fn get_all_user_auth_tokens(&self, user_id: usize) -> Result<Vec<AuthToken>>;
}

pub trait UserStore: UserAuthTokenStore + Send + Sync {
    /// Creates a new user and returns the user id.
    fn create_user(&self, user_handle: &str) -> Result<usize>;

    /// Returns the handle of the user with the given id.
    /// Returns Ok(None) if the user does not exist.
    fn get_user_handle(&self, user_id: usize) -> Result<Option<String>>;

    /// Returns the id of the user with the given handle.
    /// Returns Ok(None) if the user does not exist.
    fn get_user_id(&self, user_handle: &str) -> Result<Option<usize>>;

    /// Returns all users' handles.
    fn get_all_user_handles(&self) -> Result<Vec<String>>;

    /// Deletes a user together with their tokens and library entries.
    /// Returns false if the user did not exist.
    fn delete_user(&self, user_id: usize) -> Result<bool>;
}
