use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info};

use super::filter::{LibraryEntryFilter, Predicate, Requester};
use super::models::{LibraryEntry, LibraryEntryUpdate, NewLibraryEntry, Page, PageRequest};
use super::{LibraryEntryStore, LibraryError};

/// Owner-aware operations on library entries.
///
/// Every read goes through the visibility rules, every write is restricted to
/// the entry's owner. Another user's private entry is reported as missing
/// rather than forbidden, so its existence is not leaked.
pub struct LibraryManager {
    store: Arc<dyn LibraryEntryStore>,
}

fn now() -> i64 {
    Utc::now().timestamp()
}

impl LibraryManager {
    pub fn new(store: Arc<dyn LibraryEntryStore>) -> Self {
        LibraryManager { store }
    }

    pub fn list_library_entries(
        &self,
        filter: &LibraryEntryFilter,
        requester: Requester,
        page: PageRequest,
    ) -> Result<Page<LibraryEntry>, LibraryError> {
        let predicates = filter.predicates(requester);
        debug!("Listing library entries with {:?} {:?}", predicates, page);
        Ok(self.store.list_library_entries(&predicates, page)?)
    }

    pub fn get_library_entry(
        &self,
        id: usize,
        requester: Requester,
    ) -> Result<LibraryEntry, LibraryError> {
        let entry = self
            .store
            .get_library_entry(id)?
            .ok_or(LibraryError::NotFound(id))?;
        if !Predicate::VisibleTo(requester.user_id()).matches(&entry) {
            return Err(LibraryError::NotFound(id));
        }
        Ok(entry)
    }

    pub fn create_library_entry(
        &self,
        owner: usize,
        new_entry: NewLibraryEntry,
    ) -> Result<LibraryEntry, LibraryError> {
        let entry = new_entry.into_entry(owner, now())?;
        let created = self.store.insert_library_entry(&entry)?;
        info!(
            "User {} started tracking {} as entry {}",
            owner, created.media, created.id
        );
        Ok(created)
    }

    pub fn update_library_entry(
        &self,
        id: usize,
        requester_id: usize,
        update: LibraryEntryUpdate,
    ) -> Result<LibraryEntry, LibraryError> {
        let mut entry = self.get_owned_entry(id, requester_id)?;
        update.apply(&mut entry, now())?;
        if !self.store.save_library_entry(&entry)? {
            return Err(LibraryError::NotFound(id));
        }
        Ok(entry)
    }

    pub fn delete_library_entry(&self, id: usize, requester_id: usize) -> Result<(), LibraryError> {
        self.get_owned_entry(id, requester_id)?;
        if !self.store.delete_library_entry(id)? {
            return Err(LibraryError::NotFound(id));
        }
        info!("User {} deleted library entry {}", requester_id, id);
        Ok(())
    }

    fn get_owned_entry(
        &self,
        id: usize,
        requester_id: usize,
    ) -> Result<LibraryEntry, LibraryError> {
        let entry = self.get_library_entry(id, Requester::User(requester_id))?;
        if entry.user_id != requester_id {
            return Err(LibraryError::NotOwner {
                entry_id: id,
                requester: requester_id,
            });
        }
        Ok(entry)
    }
}
