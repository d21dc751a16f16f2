//! Error responses for the console API.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use console_core::ConsoleError;
use thiserror::Error;

/// Errors a handler can return.
#[derive(Debug, Error)]
pub enum WebError {
    /// A console workflow failed.
    #[error(transparent)]
    Console(#[from] ConsoleError),

    /// The request carried no usable user id.
    #[error("missing or empty x-user-id header")]
    Unauthorized,

    /// The request was malformed before reaching a workflow.
    #[error("bad request: {0}")]
    BadRequest(String),
}

impl WebError {
    fn status(&self) -> StatusCode {
        match self {
            WebError::Unauthorized => StatusCode::UNAUTHORIZED,
            WebError::BadRequest(_) => StatusCode::BAD_REQUEST,
            WebError::Console(err) => match err {
                ConsoleError::NotFound { .. } => StatusCode::NOT_FOUND,
                ConsoleError::Validation(_) => StatusCode::BAD_REQUEST,
                ConsoleError::MissingField { .. } | ConsoleError::PlaceholderDropped(_) => {
                    StatusCode::UNPROCESSABLE_ENTITY
                }
                ConsoleError::NotProvisioned { .. }
                | ConsoleError::AlreadyProvisioned(_)
                | ConsoleError::SessionActive { .. }
                | ConsoleError::NoActiveSession => StatusCode::CONFLICT,
                ConsoleError::UpstreamConfig { .. }
                | ConsoleError::Upstream { .. }
                | ConsoleError::MalformedResponse(_)
                | ConsoleError::Completion(_)
                | ConsoleError::Network(_)
                | ConsoleError::AnalyticsUnavailable { .. } => StatusCode::BAD_GATEWAY,
                ConsoleError::Store(_) | ConsoleError::Configuration(_) | ConsoleError::Cancelled => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
        }
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.to_string();

        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), "Request failed: {}", message);
        } else {
            tracing::warn!(status = status.as_u16(), "Request rejected: {}", message);
        }

        let body = serde_json::json!({
            "error": message
        });

        (status, Json(body)).into_response()
    }
}

/// Result type for handlers.
pub type Result<T> = std::result::Result<T, WebError>;

#[cfg(test)]
mod tests {
    use super::*;
    use console_core::Mode;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (ConsoleError::profile_not_found("x"), StatusCode::NOT_FOUND),
            (ConsoleError::Validation("bad".into()), StatusCode::BAD_REQUEST),
            (
                ConsoleError::PlaceholderDropped("{{botName}}".into()),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (ConsoleError::AlreadyProvisioned(Mode::Sales), StatusCode::CONFLICT),
            (ConsoleError::NoActiveSession, StatusCode::CONFLICT),
            (
                ConsoleError::UpstreamConfig {
                    status: 422,
                    message: "bad prompt".into(),
                },
                StatusCode::BAD_GATEWAY,
            ),
            (ConsoleError::Store("disk".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (err, expected) in cases {
            assert_eq!(WebError::from(err).status(), expected);
        }
        assert_eq!(WebError::Unauthorized.status(), StatusCode::UNAUTHORIZED);
    }
}
