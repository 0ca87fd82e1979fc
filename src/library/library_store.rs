use anyhow::Result;

use super::filter::Predicate;
use super::models::{LibraryEntry, Page, PageRequest};
use crate::user::UserStore;

pub trait LibraryEntryStore: Send + Sync {
    /// Persists a new entry and returns it with its assigned id.
    /// Fails with `LibraryError::AlreadyTracked` if the owner already tracks the media.
    fn insert_library_entry(&self, entry: &LibraryEntry) -> Result<LibraryEntry>;

    /// Returns Ok(None) if there is no entry with the given id.
    fn get_library_entry(&self, id: usize) -> Result<Option<LibraryEntry>>;

    /// Returns the entries matching all the predicates, ordered by id.
    fn list_library_entries(
        &self,
        predicates: &[Predicate],
        page: PageRequest,
    ) -> Result<Page<LibraryEntry>>;

    /// Overwrites every mutable field of an existing entry.
    /// Returns false if the entry does not exist.
    fn save_library_entry(&self, entry: &LibraryEntry) -> Result<bool>;

    /// Returns false if the entry does not exist.
    fn delete_library_entry(&self, id: usize) -> Result<bool>;
}

pub trait FullLibraryStore: LibraryEntryStore + UserStore {}

impl<T: LibraryEntryStore + UserStore> FullLibraryStore for T {}
