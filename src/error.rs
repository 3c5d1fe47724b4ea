use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use folio_contact::ValidationError;
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Contact(#[from] folio_contact::Error),

    #[error("Malformed JSON body: {0}")]
    MalformedJson(String),

    #[error("Request body too large")]
    PayloadTooLarge,

    #[error("Rate limit exceeded, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Origin not allowed")]
    OriginNotAllowed,

    #[error("Not found")]
    NotFound,
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::Contact(err.into())
    }
}

// Bodies that are absent or hold the wrong shape behave like an empty form.
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        match rejection {
            JsonRejection::JsonDataError(_) | JsonRejection::MissingJsonContentType(_) => {
                ValidationError::MissingFields.into()
            }
            rejection if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE => {
                ApiError::PayloadTooLarge
            }
            rejection => ApiError::MalformedJson(rejection.body_text()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status_code, message) = match &self {
            ApiError::Contact(folio_contact::Error::Validation(e)) => {
                (StatusCode::BAD_REQUEST, e.to_string())
            }
            ApiError::Contact(folio_contact::Error::Transport(e)) => {
                tracing::error!("Mail transport error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to send message.".to_string(),
                )
            }
            ApiError::MalformedJson(detail) => {
                tracing::debug!(detail = %detail, "Rejected malformed JSON body");
                (StatusCode::BAD_REQUEST, "Malformed JSON body.".to_string())
            }
            ApiError::PayloadTooLarge => (
                StatusCode::PAYLOAD_TOO_LARGE,
                "Request body too large.".to_string(),
            ),
            ApiError::RateLimited { .. } => (
                StatusCode::TOO_MANY_REQUESTS,
                "Too many requests, please try again later.".to_string(),
            ),
            ApiError::OriginNotAllowed => {
                (StatusCode::FORBIDDEN, "Origin not allowed.".to_string())
            }
            ApiError::NotFound => (StatusCode::NOT_FOUND, "Not found.".to_string()),
        };

        let mut response = (status_code, Json(json!({ "message": message }))).into_response();

        if let ApiError::RateLimited { retry_after_secs } = self {
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from(retry_after_secs));
        }

        response
    }
}
