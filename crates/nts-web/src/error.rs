//! Error types for the web front-end.
//!
//! Errors are returned as short plain-text bodies: the page scripts show them
//! inline next to the note form.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use nts_relay::RelayError;

use crate::render::RenderError;

/// Web handler error type.
#[derive(Debug, thiserror::Error)]
pub enum WebError {
    /// The request was malformed or failed validation.
    #[error("{0}")]
    BadRequest(String),

    /// Nothing matched the request.
    #[error("{0}")]
    NotFound(String),

    /// The relay failed to store or query events.
    #[error("{message}: {source}")]
    Relay {
        message: &'static str,
        #[source]
        source: RelayError,
    },

    /// A view failed to render.
    #[error("{message}: {source}")]
    Render {
        message: &'static str,
        #[source]
        source: RenderError,
    },
}

impl WebError {
    /// Wrap a relay failure with the message shown to the client.
    pub fn relay(message: &'static str) -> impl FnOnce(RelayError) -> Self {
        move |source| Self::Relay { message, source }
    }

    /// Wrap a render failure with the message shown to the client.
    pub fn render(message: &'static str) -> impl FnOnce(RenderError) -> Self {
        move |source| Self::Render { message, source }
    }

    /// HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Relay { .. } | Self::Render { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            Self::BadRequest(msg) => {
                tracing::warn!(error = %msg, "bad request");
                msg
            }
            Self::NotFound(msg) => {
                tracing::info!(error = %msg, "not found");
                msg
            }
            Self::Relay { message, source } => {
                tracing::error!(error = %source, "{message}");
                message.to_string()
            }
            Self::Render { message, source } => {
                tracing::error!(error = %source, "{message}");
                message.to_string()
            }
        };

        (status, body).into_response()
    }
}
