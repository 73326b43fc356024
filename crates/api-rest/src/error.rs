//! Mapping of ward errors onto HTTP responses.

use axum::{http::StatusCode, response::IntoResponse, response::Response, Json};
use serde::Serialize;
use utoipa::ToSchema;
use ward_core::WardError;

/// Error body returned by every failing endpoint.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorRes {
    pub error: String,
}

#[derive(Debug)]
pub struct ApiError(pub WardError);

impl From<WardError> for ApiError {
    fn from(err: WardError) -> Self {
        Self(err)
    }
}

/// HTTP status for a ward error.
pub fn status_for(err: &WardError) -> StatusCode {
    match err {
        WardError::NotFound { .. } => StatusCode::NOT_FOUND,
        WardError::BedOccupied { .. }
        | WardError::PatientAlreadyAssigned { .. }
        | WardError::PatientNotAssigned(_)
        | WardError::DestinationUnavailable { .. }
        | WardError::InvalidTransition(_)
        | WardError::RoomNotEmpty(_) => StatusCode::CONFLICT,
        WardError::ChecklistIncomplete { .. }
        | WardError::InvalidInput(_)
        | WardError::VitalsOutOfRange(_) => StatusCode::UNPROCESSABLE_ENTITY,
        WardError::Dataset(_)
        | WardError::FileRead(_)
        | WardError::FileWrite(_)
        | WardError::YamlSerialization(_)
        | WardError::LockPoisoned => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = status_for(&self.0);
        if status.is_server_error() {
            tracing::error!("request failed: {:?}", self.0);
            return (
                status,
                Json(ErrorRes {
                    error: "Internal error".into(),
                }),
            )
                .into_response();
        }
        (
            status,
            Json(ErrorRes {
                error: self.0.to_string(),
            }),
        )
            .into_response()
    }
}
