use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::ErrorResponse;

/// Message returned to clients for every failure; details only go to the log
pub const GENERIC_ERROR_MESSAGE: &str = "Failed to fetch or format data";

#[derive(Debug, Error)]
pub enum ChainError {
    #[error("option chain fetch failed: {0}")]
    FetchFailure(String),

    #[error("unexpected option chain payload: {0}")]
    MalformedPayload(String),

    #[error("no PE record carries an underlying value")]
    MissingUnderlyingValue,

    #[error("no strike within {band} of the rounded underlying {center}")]
    NoStrikesInBand { center: i64, band: i64 },
}

impl IntoResponse for ChainError {
    fn into_response(self) -> Response {
        let status = match self {
            ChainError::FetchFailure(_) => StatusCode::BAD_GATEWAY,
            ChainError::MalformedPayload(_)
            | ChainError::MissingUnderlyingValue
            | ChainError::NoStrikesInBand { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        (
            status,
            Json(ErrorResponse {
                error: GENERIC_ERROR_MESSAGE.to_string(),
            }),
        )
            .into_response()
    }
}
