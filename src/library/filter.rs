//! Query filters over library entries.
//!
//! Request parameters are parsed into a [`LibraryEntryFilter`], which is then
//! turned into a list of [`Predicate`]s. The predicates are ANDed together and
//! always end with the visibility predicate for the requester, so a filter can
//! only ever narrow down what the requester is allowed to see.
//!
//! The same predicates are evaluated either in memory with [`resolve`] or by
//! the sqlite store through [`compose_sql`], both must select the same rows.

use std::collections::HashMap;

use rusqlite::types::Value;

use super::models::{LibraryEntry, Page, PageRequest};
use crate::media::{MediaKind, MediaRef};

/// Who is asking for entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requester {
    Anonymous,
    User(usize),
}

impl Requester {
    pub fn user_id(&self) -> Option<usize> {
        match self {
            Requester::Anonymous => None,
            Requester::User(id) => Some(*id),
        }
    }
}

impl From<Option<usize>> for Requester {
    fn from(user_id: Option<usize>) -> Self {
        match user_id {
            Some(id) => Requester::User(id),
            None => Requester::Anonymous,
        }
    }
}

/// A filter value supplied by the client, kept even when it can't be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterValue<T> {
    Value(T),
    Malformed,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LibraryEntryFilter {
    pub user_id: Option<FilterValue<usize>>,
    pub media: Option<FilterValue<MediaRef>>,
}

/// Accepted spellings of each filter key, in order of precedence.
const USER_ID_KEYS: &[&str] = &["filter[user_id]", "filter[userId]", "user_id", "userId"];
const MEDIA_TYPE_KEYS: &[&str] = &[
    "filter[media_type]",
    "filter[mediaType]",
    "media_type",
    "mediaType",
];
const MEDIA_ID_KEYS: &[&str] = &[
    "filter[media_id]",
    "filter[mediaId]",
    "media_id",
    "mediaId",
];

fn lookup<'a>(params: &'a HashMap<String, String>, keys: &[&str]) -> Option<&'a str> {
    keys.iter()
        .find_map(|key| params.get(*key))
        .map(String::as_str)
}

fn parse_id(raw: &str) -> FilterValue<usize> {
    match raw.trim().parse::<usize>() {
        Ok(id) => FilterValue::Value(id),
        Err(_) => FilterValue::Malformed,
    }
}

fn parse_media(kind: &str, id: &str) -> FilterValue<MediaRef> {
    match (MediaKind::from_name(kind.trim()), parse_id(id)) {
        (Some(kind), FilterValue::Value(id)) => FilterValue::Value(MediaRef::new(kind, id)),
        _ => FilterValue::Malformed,
    }
}

impl LibraryEntryFilter {
    pub fn by_user(user_id: usize) -> Self {
        LibraryEntryFilter {
            user_id: Some(FilterValue::Value(user_id)),
            media: None,
        }
    }

    pub fn by_media(media: MediaRef) -> Self {
        LibraryEntryFilter {
            user_id: None,
            media: Some(FilterValue::Value(media)),
        }
    }

    /// Builds a filter out of the raw query parameters, unknown keys are ignored.
    ///
    /// The media filter needs both type and id, one without the other is
    /// treated as if neither was given.
    pub fn from_params(params: &HashMap<String, String>) -> Self {
        let media = match (lookup(params, MEDIA_TYPE_KEYS), lookup(params, MEDIA_ID_KEYS)) {
            (Some(kind), Some(id)) => Some(parse_media(kind, id)),
            _ => None,
        };

        LibraryEntryFilter {
            user_id: lookup(params, USER_ID_KEYS).map(parse_id),
            media,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.user_id.is_none() && self.media.is_none()
    }

    /// Predicates selecting the entries matching this filter that `requester` may see.
    pub fn predicates(&self, requester: Requester) -> Vec<Predicate> {
        let mut predicates = vec![];
        match &self.user_id {
            Some(FilterValue::Value(id)) => predicates.push(Predicate::UserId(*id)),
            Some(FilterValue::Malformed) => predicates.push(Predicate::Nothing),
            None => {}
        }
        match &self.media {
            Some(FilterValue::Value(media)) => predicates.push(Predicate::Media(*media)),
            Some(FilterValue::Malformed) => predicates.push(Predicate::Nothing),
            None => {}
        }
        predicates.push(Predicate::VisibleTo(requester.user_id()));
        predicates
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Predicate {
    UserId(usize),
    Media(MediaRef),
    /// Public entries, plus the private ones owned by the given user.
    VisibleTo(Option<usize>),
    Nothing,
}

impl Predicate {
    pub fn matches(&self, entry: &LibraryEntry) -> bool {
        match self {
            Predicate::UserId(id) => entry.user_id == *id,
            Predicate::Media(media) => entry.media == *media,
            Predicate::VisibleTo(None) => !entry.private,
            Predicate::VisibleTo(Some(id)) => !entry.private || entry.user_id == *id,
            Predicate::Nothing => false,
        }
    }

    /// SQL condition over the `library_entry` table, with positional parameters.
    ///
    /// Ids that don't fit a sqlite integer can't be stored, so they match no row.
    pub fn to_sql(&self) -> (String, Vec<Value>) {
        match *self {
            Predicate::UserId(id) => match i64::try_from(id) {
                Ok(id) => ("user_id = ?".to_string(), vec![Value::Integer(id)]),
                Err(_) => Predicate::Nothing.to_sql(),
            },
            Predicate::Media(media) => match i64::try_from(media.id) {
                Ok(id) => (
                    "(media_type = ? AND media_id = ?)".to_string(),
                    vec![
                        Value::Text(media.kind.name().to_string()),
                        Value::Integer(id),
                    ],
                ),
                Err(_) => Predicate::Nothing.to_sql(),
            },
            Predicate::VisibleTo(Some(id)) => match i64::try_from(id) {
                Ok(id) => ("(private = 0 OR user_id = ?)".to_string(), vec![Value::Integer(id)]),
                Err(_) => Predicate::VisibleTo(None).to_sql(),
            },
            Predicate::VisibleTo(None) => ("private = 0".to_string(), vec![]),
            Predicate::Nothing => ("0".to_string(), vec![]),
        }
    }
}

/// ANDs the predicates into a single WHERE condition.
pub fn compose_sql(predicates: &[Predicate]) -> (String, Vec<Value>) {
    if predicates.is_empty() {
        return ("1".to_string(), vec![]);
    }
    let mut clauses = Vec::with_capacity(predicates.len());
    let mut params = vec![];
    for predicate in predicates {
        let (clause, mut predicate_params) = predicate.to_sql();
        clauses.push(clause);
        params.append(&mut predicate_params);
    }
    (clauses.join(" AND "), params)
}

/// Evaluates the filter over an in-memory collection, keeping the input order.
pub fn resolve(
    entries: &[LibraryEntry],
    filter: &LibraryEntryFilter,
    requester: Requester,
    page: PageRequest,
) -> Page<LibraryEntry> {
    let predicates = filter.predicates(requester);
    let matching: Vec<&LibraryEntry> = entries
        .iter()
        .filter(|entry| predicates.iter().all(|p| p.matches(entry)))
        .collect();
    Page {
        total_count: matching.len(),
        items: matching
            .into_iter()
            .skip(page.offset)
            .take(page.limit)
            .cloned()
            .collect(),
    }
}

/// Reads `page[limit]` and `page[offset]` (or bare `limit`/`offset`).
///
/// Missing or unparsable values fall back to the defaults, the limit is
/// clamped into `1..=max_limit`.
pub fn page_request_from_params(
    params: &HashMap<String, String>,
    default_limit: usize,
    max_limit: usize,
) -> PageRequest {
    let lookup = |name: &str| {
        params
            .get(&format!("page[{}]", name))
            .or_else(|| params.get(name))
            .and_then(|v| v.trim().parse::<usize>().ok())
    };
    let limit = lookup("limit")
        .unwrap_or(default_limit)
        .clamp(1, max_limit.max(1));
    PageRequest {
        limit,
        offset: lookup("offset").unwrap_or(0),
    }
}
