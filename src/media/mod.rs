//! Polymorphic media references.
//!
//! A library entry points at one item of one media category. The category is a
//! closed set, resolved by name through [`MEDIA_KINDS`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MediaKind {
    Anime,
    Manga,
    Drama,
}

/// Name lookup table, the names are the ones exposed on the wire and stored in the db.
pub const MEDIA_KINDS: &[(&str, MediaKind)] = &[
    ("Anime", MediaKind::Anime),
    ("Manga", MediaKind::Manga),
    ("Drama", MediaKind::Drama),
];

impl MediaKind {
    pub fn name(&self) -> &'static str {
        match self {
            MediaKind::Anime => "Anime",
            MediaKind::Manga => "Manga",
            MediaKind::Drama => "Drama",
        }
    }

    pub fn from_name(name: &str) -> Option<MediaKind> {
        MEDIA_KINDS
            .iter()
            .find(|(candidate, _)| *candidate == name)
            .map(|(_, kind)| *kind)
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for MediaKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        MediaKind::from_name(s).ok_or_else(|| anyhow::anyhow!("Unknown media type {}", s))
    }
}

/// The (category, id) pair identifying a tracked item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MediaRef {
    pub kind: MediaKind,
    pub id: usize,
}

impl MediaRef {
    pub fn new(kind: MediaKind, id: usize) -> Self {
        MediaRef { kind, id }
    }
}

impl fmt::Display for MediaRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.kind, self.id)
    }
}
