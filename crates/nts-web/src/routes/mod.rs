//! Route definitions for the web front-end.
//!
//! ## Routes
//!
//! - `GET /` - Home page
//! - `POST /save-note` - Store a signed note, respond with its card fragment
//! - `GET /fetch-notes?pubkey=` - Note list fragment for an author
//! - `GET /note/{id}` - Single note page
//! - `GET /health` - Health check (JSON)
//! - `GET /static/*` - Static assets

mod health;
mod home;
mod note;
mod notes;

use axum::Router;
use axum::middleware;
use axum::routing::{get, post};
use tower_http::services::ServeDir;

use crate::logging::log_requests;
use crate::state::AppState;

/// Build the complete router.
pub fn router(state: AppState) -> Router {
    let static_files = ServeDir::new(&state.config.static_dir);

    let pages = Router::new()
        .route("/", get(home::home_page))
        .route("/save-note", post(notes::save_note))
        .route("/fetch-notes", get(notes::fetch_notes))
        .route("/note/{id}", get(note::single_note))
        .route_layer(middleware::from_fn(log_requests));

    pages
        .route("/health", get(health::health_check))
        .nest_service("/static", static_files)
        .with_state(state)
}
