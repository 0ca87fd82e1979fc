mod error;
pub mod filter;
mod library_manager;
mod library_store;
pub mod models;
mod sqlite_library_store;

pub use error::LibraryError;
pub use filter::{page_request_from_params, LibraryEntryFilter, Predicate, Requester};
pub use library_manager::LibraryManager;
pub use library_store::{FullLibraryStore, LibraryEntryStore};
pub use models::{
    LibraryEntry, LibraryEntryStatus, LibraryEntryUpdate, LibraryEntryView, NewLibraryEntry, Page,
    PageRequest,
};
pub use sqlite_library_store::{SqliteLibraryStore, VERSIONED_SCHEMAS};
