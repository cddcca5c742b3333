//! Application state shared across all request handlers.

use std::sync::Arc;

use nts_relay::{Relay, RelayInfo};

use crate::config::Config;
use crate::render::Renderer;

/// Shared application state available to all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<Config>,

    /// Relay metadata shown on the home page.
    pub info: Arc<RelayInfo>,

    /// Event store the handlers write to and read from.
    pub relay: Arc<dyn Relay>,

    /// View renderer, built once at start-up.
    pub renderer: Arc<dyn Renderer>,
}

impl AppState {
    /// Create application state from configuration and its collaborators.
    pub fn new(config: Config, relay: Arc<dyn Relay>, renderer: Arc<dyn Renderer>) -> Self {
        let info = config.relay_info();

        tracing::info!(
            relay_name = %info.name,
            note_kind = config.note_kind,
            "application state initialized"
        );

        Self {
            config: Arc::new(config),
            info: Arc::new(info),
            relay,
            renderer,
        }
    }
}
