//! Routes under `/v1/library-entries`.

use std::collections::HashMap;

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::{error, warn};

use super::session::{requester_of, Session};
use super::state::{GuardedLibraryManager, ServerState};
use super::{ServerConfig, STORE_RETRY_AFTER_SEC};
use crate::library::{
    page_request_from_params, LibraryEntryFilter, LibraryEntryStatus, LibraryEntryUpdate,
    LibraryEntryView, LibraryError, NewLibraryEntry,
};
use crate::media::{MediaKind, MediaRef};

#[derive(Serialize, Deserialize, Debug)]
pub struct LibraryEntriesResponse {
    pub data: Vec<LibraryEntryView>,
    pub total_count: usize,
}

#[derive(Deserialize, Debug)]
struct CreateLibraryEntryBody {
    pub media_type: String,
    pub media_id: usize,
    pub status: LibraryEntryStatus,
    #[serde(default)]
    pub progress: u32,
    #[serde(default)]
    pub private: bool,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub rating: Option<u8>,
}

impl TryFrom<CreateLibraryEntryBody> for NewLibraryEntry {
    type Error = LibraryError;

    fn try_from(body: CreateLibraryEntryBody) -> Result<Self, Self::Error> {
        let kind = MediaKind::from_name(&body.media_type)
            .ok_or(LibraryError::InvalidMediaType(body.media_type))?;
        Ok(NewLibraryEntry {
            media: MediaRef::new(kind, body.media_id),
            status: body.status,
            progress: body.progress,
            private: body.private,
            notes: body.notes,
            rating: body.rating,
        })
    }
}

impl IntoResponse for LibraryError {
    fn into_response(self) -> Response {
        let status = match &self {
            LibraryError::NotFound(_) => StatusCode::NOT_FOUND,
            LibraryError::NotOwner { .. } => StatusCode::FORBIDDEN,
            LibraryError::AlreadyTracked { .. } => StatusCode::CONFLICT,
            LibraryError::InvalidRating(_)
            | LibraryError::InvalidMediaType(_)
            | LibraryError::InvalidMediaId(_)
            | LibraryError::UnknownUser(_) => StatusCode::BAD_REQUEST,
            LibraryError::Store(err) => {
                error!("Library store failure: {:#}", err);
                return (
                    StatusCode::SERVICE_UNAVAILABLE,
                    [(header::RETRY_AFTER, STORE_RETRY_AFTER_SEC)],
                    "Library store unavailable",
                )
                    .into_response();
            }
        };
        if status == StatusCode::FORBIDDEN {
            warn!("{}", self);
        }
        (status, self.to_string()).into_response()
    }
}

async fn list_library_entries(
    session: Option<Session>,
    State(manager): State<GuardedLibraryManager>,
    State(config): State<ServerConfig>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let filter = LibraryEntryFilter::from_params(&params);
    let page = page_request_from_params(&params, config.default_page_limit, config.max_page_limit);
    match manager.list_library_entries(&filter, requester_of(&session), page) {
        Ok(page) => Json(LibraryEntriesResponse {
            data: page.items.iter().map(LibraryEntryView::from).collect(),
            total_count: page.total_count,
        })
        .into_response(),
        Err(err) => err.into_response(),
    }
}

async fn get_library_entry(
    session: Option<Session>,
    State(manager): State<GuardedLibraryManager>,
    Path(id): Path<usize>,
) -> Response {
    match manager.get_library_entry(id, requester_of(&session)) {
        Ok(entry) => Json(LibraryEntryView::from(&entry)).into_response(),
        Err(err) => err.into_response(),
    }
}

async fn post_library_entry(
    session: Session,
    State(manager): State<GuardedLibraryManager>,
    Json(body): Json<CreateLibraryEntryBody>,
) -> Response {
    let created = NewLibraryEntry::try_from(body)
        .and_then(|new_entry| manager.create_library_entry(session.user_id, new_entry));
    match created {
        Ok(entry) => (StatusCode::CREATED, Json(LibraryEntryView::from(&entry))).into_response(),
        Err(err) => err.into_response(),
    }
}

async fn patch_library_entry(
    session: Session,
    State(manager): State<GuardedLibraryManager>,
    Path(id): Path<usize>,
    Json(update): Json<LibraryEntryUpdate>,
) -> Response {
    match manager.update_library_entry(id, session.user_id, update) {
        Ok(entry) => Json(LibraryEntryView::from(&entry)).into_response(),
        Err(err) => err.into_response(),
    }
}

async fn delete_library_entry(
    session: Session,
    State(manager): State<GuardedLibraryManager>,
    Path(id): Path<usize>,
) -> Response {
    match manager.delete_library_entry(id, session.user_id) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => err.into_response(),
    }
}

pub fn make_library_routes(state: ServerState) -> Router {
    Router::new()
        .route("/", get(list_library_entries).post(post_library_entry))
        .route(
            "/{id}",
            get(get_library_entry)
                .patch(patch_library_entry)
                .delete(delete_library_entry),
        )
        .with_state(state)
}
