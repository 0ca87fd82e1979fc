use thiserror::Error;

use crate::media::MediaRef;

#[derive(Debug, Error)]
pub enum LibraryError {
    #[error("Library entry {0} not found")]
    NotFound(usize),

    #[error("User {requester} does not own library entry {entry_id}")]
    NotOwner { entry_id: usize, requester: usize },

    #[error("User {user_id} already tracks {media}")]
    AlreadyTracked { user_id: usize, media: MediaRef },

    #[error("Rating {0} is out of range")]
    InvalidRating(u8),

    #[error("Unknown media type '{0}'")]
    InvalidMediaType(String),

    #[error("Media id {0} is out of range")]
    InvalidMediaId(usize),

    #[error("User {0} does not exist")]
    UnknownUser(usize),

    #[error("Library store failure: {0:#}")]
    Store(anyhow::Error),
}

/// Store errors may carry a domain error raised by the store itself, in which
/// case that error is surfaced instead of a generic store failure.
impl From<anyhow::Error> for LibraryError {
    fn from(err: anyhow::Error) -> Self {
        match err.downcast::<LibraryError>() {
            Ok(library_error) => library_error,
            Err(err) => LibraryError::Store(err),
        }
    }
}
