//! Home page: relay metadata, the note form, and the visitor's notes.

use axum::extract::State;
use maud::Markup;

use crate::error::WebError;
use crate::render::View;
use crate::state::AppState;

/// Render the home page.
pub async fn home_page(State(state): State<AppState>) -> Result<Markup, WebError> {
    let markup = state
        .renderer
        .render(&View::HomePage {
            title: "Home",
            info: &state.info,
        })
        .map_err(WebError::render("Failed to render home page"))?;

    tracing::debug!("home page rendered");
    Ok(markup)
}
