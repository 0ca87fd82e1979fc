pub mod auth;
mod user_store;

pub use auth::{AuthToken, AuthTokenValue};
pub use user_store::{UserAuthTokenStore, UserStore};
