//! Note ingestion and listing.
//!
//! `POST /save-note` accepts a signed event from the browser and answers with
//! the rendered card for it; `GET /fetch-notes` answers with the author's list.

use axum::body::Bytes;
use axum::extract::{Query, State};
use futures::StreamExt;
use maud::Markup;
use nts_relay::{Event, Filter};

use crate::error::WebError;
use crate::render::View;
use crate::state::AppState;

/// Maximum notes returned by `/fetch-notes`.
pub const NOTE_LIST_LIMIT: usize = 20;

/// Store a note and render its card.
pub async fn save_note(State(state): State<AppState>, body: Bytes) -> Result<Markup, WebError> {
    let event: Event = serde_json::from_slice(&body).map_err(|e| {
        tracing::debug!(error = %e, "undecodable note body");
        WebError::BadRequest("Invalid request body".to_string())
    })?;

    if !is_valid_note(&event, state.config.note_kind) {
        tracing::warn!(
            kind = event.kind,
            content_len = event.content.len(),
            "rejected note event"
        );
        return Err(WebError::BadRequest("Invalid note event".to_string()));
    }

    tracing::info!(id = %event.id, pubkey = %event.pubkey, "received note event");

    let outcome = state
        .relay
        .add_event(event.clone())
        .await
        .map_err(WebError::relay("Failed to save note"))?;

    tracing::info!(id = %event.id, ?outcome, "note saved");

    state
        .renderer
        .render(&View::NoteCard(&event))
        .map_err(WebError::render("Error rendering note card"))
}

/// List an author's notes, newest first.
pub async fn fetch_notes(
    State(state): State<AppState>,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<Markup, WebError> {
    // A repeated `pubkey` is not an error: the first one is used.
    let pubkey = params
        .into_iter()
        .find_map(|(key, value)| (key == "pubkey").then_some(value))
        .filter(|p| !p.is_empty())
        .ok_or_else(|| WebError::BadRequest("Pubkey is required".to_string()))?;

    let filter = Filter::new()
        .kind(state.config.note_kind)
        .author(pubkey.as_str())
        .limit(NOTE_LIST_LIMIT);

    let notes: Vec<Event> = state
        .relay
        .query_events(filter)
        .await
        .map_err(WebError::relay("Failed to fetch notes"))?
        .collect()
        .await;

    tracing::debug!(pubkey = %pubkey, count = notes.len(), "fetched notes");

    state
        .renderer
        .render(&View::NoteList(&notes))
        .map_err(WebError::render("Failed to render notes"))
}

/// The web layer only checks the kind and that there is something to store.
/// IDs, signatures and replacement rules belong to the relay.
fn is_valid_note(event: &Event, note_kind: u16) -> bool {
    event.kind == note_kind && !event.content.is_empty()
}
