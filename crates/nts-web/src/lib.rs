//! nts-web - HTTP front-end for storing and browsing Nostr notes.
//!
//! Browsers sign note events client-side and POST them here; the server
//! checks the kind and content, hands the event to a [`nts_relay::Relay`],
//! and answers with HTML fragments for htmx to swap into the page.
//!
//! # Architecture
//!
//! - **Routes**: axum handlers for the home page, note ingestion, note
//!   listing and single-note pages, wrapped in a request logger
//! - **Render**: a [`render::Renderer`] turning named views into HTML with
//!   maud (compile-time templates, all dynamic values escaped)
//! - **State**: configuration, relay handle and renderer, built once at
//!   start-up and shared by every request

pub mod config;
pub mod error;
pub mod logging;
pub mod render;
pub mod routes;
pub mod state;

pub use config::Config;
pub use routes::router;
pub use state::AppState;
