//! Library entry data models

use serde::{Deserialize, Serialize};

use super::LibraryError;
use crate::embed::extract_embeddable_links;
use crate::media::MediaRef;

pub const MIN_RATING: u8 = 1;
pub const MAX_RATING: u8 = 20;
/// Ids are stored as sqlite integers.
pub const MAX_MEDIA_ID: usize = i64::MAX as usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LibraryEntryStatus {
    Current,
    Planned,
    Completed,
    OnHold,
    Dropped,
}

impl LibraryEntryStatus {
    pub fn to_int(&self) -> i32 {
        match self {
            LibraryEntryStatus::Current => 1,
            LibraryEntryStatus::Planned => 2,
            LibraryEntryStatus::Completed => 3,
            LibraryEntryStatus::OnHold => 4,
            LibraryEntryStatus::Dropped => 5,
        }
    }

    pub fn from_int(value: i32) -> Option<Self> {
        match value {
            1 => Some(LibraryEntryStatus::Current),
            2 => Some(LibraryEntryStatus::Planned),
            3 => Some(LibraryEntryStatus::Completed),
            4 => Some(LibraryEntryStatus::OnHold),
            5 => Some(LibraryEntryStatus::Dropped),
            _ => None,
        }
    }
}

/// A user's progress record against one media item.
#[derive(Debug, Clone, PartialEq)]
pub struct LibraryEntry {
    pub id: usize,
    pub user_id: usize,
    pub media: MediaRef,
    pub status: LibraryEntryStatus,
    pub progress: u32,
    pub private: bool,
    pub notes: Option<String>,
    pub rating: Option<u8>,
    pub reconsuming: bool,
    pub reconsume_count: u32,
    pub started_at: Option<i64>,
    pub finished_at: Option<i64>,
    pub progressed_at: Option<i64>,
    pub created: i64,
    pub updated: i64,
}

impl LibraryEntry {
    fn stamp_status(&mut self, now: i64) {
        match self.status {
            LibraryEntryStatus::Current if self.started_at.is_none() => {
                self.started_at = Some(now)
            }
            LibraryEntryStatus::Completed if self.finished_at.is_none() => {
                self.finished_at = Some(now)
            }
            _ => {}
        }
    }
}

fn validate_rating(rating: Option<u8>) -> Result<(), LibraryError> {
    match rating {
        Some(r) if !(MIN_RATING..=MAX_RATING).contains(&r) => Err(LibraryError::InvalidRating(r)),
        _ => Ok(()),
    }
}

/// Everything needed to start tracking a media item, the owner comes from the requester.
#[derive(Debug, Clone)]
pub struct NewLibraryEntry {
    pub media: MediaRef,
    pub status: LibraryEntryStatus,
    pub progress: u32,
    pub private: bool,
    pub notes: Option<String>,
    pub rating: Option<u8>,
}

impl NewLibraryEntry {
    pub fn new(media: MediaRef, status: LibraryEntryStatus) -> Self {
        NewLibraryEntry {
            media,
            status,
            progress: 0,
            private: false,
            notes: None,
            rating: None,
        }
    }

    pub fn private(mut self, private: bool) -> Self {
        self.private = private;
        self
    }

    /// Builds the entry that will be persisted, `id` is assigned by the store.
    pub fn into_entry(self, user_id: usize, now: i64) -> Result<LibraryEntry, LibraryError> {
        validate_rating(self.rating)?;
        if self.media.id > MAX_MEDIA_ID {
            return Err(LibraryError::InvalidMediaId(self.media.id));
        }
        let mut entry = LibraryEntry {
            id: 0,
            user_id,
            media: self.media,
            status: self.status,
            progress: self.progress,
            private: self.private,
            notes: self.notes.filter(|n| !n.is_empty()),
            rating: self.rating,
            reconsuming: false,
            reconsume_count: 0,
            started_at: None,
            finished_at: None,
            progressed_at: (self.progress > 0).then_some(now),
            created: now,
            updated: now,
        };
        entry.stamp_status(now);
        Ok(entry)
    }
}

/// Partial update of an entry, absent fields are left untouched.
///
/// An empty `notes` string clears the notes and a `rating` of 0 clears the rating.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LibraryEntryUpdate {
    pub status: Option<LibraryEntryStatus>,
    pub progress: Option<u32>,
    pub private: Option<bool>,
    pub notes: Option<String>,
    pub rating: Option<u8>,
    pub reconsuming: Option<bool>,
    pub reconsume_count: Option<u32>,
}

impl LibraryEntryUpdate {
    pub fn apply(self, entry: &mut LibraryEntry, now: i64) -> Result<(), LibraryError> {
        let rating = match self.rating {
            Some(0) => Some(None),
            Some(r) => {
                validate_rating(Some(r))?;
                Some(Some(r))
            }
            None => None,
        };

        if let Some(status) = self.status {
            entry.status = status;
            entry.stamp_status(now);
        }
        if let Some(progress) = self.progress {
            if progress != entry.progress {
                entry.progress = progress;
                entry.progressed_at = Some(now);
            }
        }
        if let Some(private) = self.private {
            entry.private = private;
        }
        if let Some(notes) = self.notes {
            entry.notes = Some(notes).filter(|n| !n.is_empty());
        }
        if let Some(rating) = rating {
            entry.rating = rating;
        }
        if let Some(reconsuming) = self.reconsuming {
            entry.reconsuming = reconsuming;
        }
        if let Some(reconsume_count) = self.reconsume_count {
            entry.reconsume_count = reconsume_count;
        }
        entry.updated = now;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub limit: usize,
    pub offset: usize,
}

impl PageRequest {
    pub fn unbounded() -> Self {
        PageRequest {
            limit: usize::MAX,
            offset: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Number of matching items before limit and offset were applied.
    pub total_count: usize,
}

/// Wire representation of a library entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LibraryEntryView {
    pub id: usize,
    pub user_id: usize,
    pub media_type: String,
    pub media_id: usize,
    pub status: LibraryEntryStatus,
    pub progress: u32,
    pub private: bool,
    pub notes: Option<String>,
    pub embeddable_links: Vec<String>,
    pub rating: Option<u8>,
    pub reconsuming: bool,
    pub reconsume_count: u32,
    pub started_at: Option<i64>,
    pub finished_at: Option<i64>,
    pub progressed_at: Option<i64>,
    pub created: i64,
    pub updated: i64,
}

impl From<&LibraryEntry> for LibraryEntryView {
    fn from(entry: &LibraryEntry) -> Self {
        LibraryEntryView {
            id: entry.id,
            user_id: entry.user_id,
            media_type: entry.media.kind.name().to_string(),
            media_id: entry.media.id,
            status: entry.status,
            progress: entry.progress,
            private: entry.private,
            embeddable_links: entry
                .notes
                .as_deref()
                .map(extract_embeddable_links)
                .unwrap_or_default(),
            notes: entry.notes.clone(),
            rating: entry.rating,
            reconsuming: entry.reconsuming,
            reconsume_count: entry.reconsume_count,
            started_at: entry.started_at,
            finished_at: entry.finished_at,
            progressed_at: entry.progressed_at,
            created: entry.created,
            updated: entry.updated,
        }
    }
}
