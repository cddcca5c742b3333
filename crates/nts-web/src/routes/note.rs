//! Single note page.

use axum::extract::{Path, State};
use futures::StreamExt;
use maud::Markup;
use nts_relay::Filter;

use crate::error::WebError;
use crate::render::View;
use crate::state::AppState;

/// Render the page for one note by ID.
///
/// The query result is drained in full; if the relay yields more than one
/// event the first is shown.
pub async fn single_note(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Markup, WebError> {
    let matches: Vec<_> = state
        .relay
        .query_events(Filter::new().id(id.as_str()))
        .await
        .map_err(WebError::relay("Failed to fetch note"))?
        .collect()
        .await;

    let Some(note) = matches.first() else {
        return Err(WebError::NotFound("404 page not found".to_string()));
    };

    if matches.len() > 1 {
        tracing::debug!(id = %id, count = matches.len(), "multiple events for one id");
    }

    state
        .renderer
        .render(&View::NotePage {
            title: "Note",
            note,
        })
        .map_err(WebError::render("Failed to render template"))
}
