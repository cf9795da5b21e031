use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rchat::{RelayError, RelayErrorKind};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    Relay(#[from] RelayError),

    #[error("Missing session id")]
    MissingSession,

    #[error("Invalid request body: {0}")]
    InvalidBody(String),
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Relay(error) => match error.kind {
                RelayErrorKind::EmptyInput => StatusCode::BAD_REQUEST,
                RelayErrorKind::UnknownBot => StatusCode::NOT_FOUND,
                RelayErrorKind::MissingCredential => StatusCode::INTERNAL_SERVER_ERROR,
                RelayErrorKind::UpstreamConnect | RelayErrorKind::UpstreamStream => {
                    StatusCode::BAD_GATEWAY
                }
            },
            ApiError::MissingSession | ApiError::InvalidBody(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), error = %self, "request failed");
        }

        let body = ErrorResponse {
            error: self.to_string(),
        };

        (status, Json(body)).into_response()
    }
}
