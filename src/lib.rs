//! Media Library Server Library
//!
//! This library exposes the internal modules for the server binaries and for testing.

pub mod config;
pub mod embed;
pub mod library;
pub mod media;
pub mod server;
pub mod sqlite_persistence;
pub mod user;

// Re-export commonly used types for convenience
pub use library::{LibraryEntryFilter, LibraryManager, Requester, SqliteLibraryStore};
pub use media::{MediaKind, MediaRef};
pub use server::{run_server, RequestsLoggingLevel};
