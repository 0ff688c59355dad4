use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use pokeapi_client::PokeApiError;
use serde_json::json;

/// Application error type that converts to HTTP responses
#[derive(Debug)]
pub enum AppError {
    BadRequest(String),
    Forbidden(String),
    NotFound(String),
    /// PokeAPI failed or timed out
    Upstream(PokeApiError),
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Upstream(e) => {
                tracing::warn!(error = %e, "PokeAPI request failed");
                (StatusCode::BAD_GATEWAY, e.to_string())
            }
            AppError::Internal(msg) => {
                tracing::error!(error = %msg, "Internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".into(),
                )
            }
        };

        (status, axum::Json(json!({ "error": message }))).into_response()
    }
}

impl From<PokeApiError> for AppError {
    fn from(e: PokeApiError) -> Self {
        if e.is_not_found() {
            AppError::NotFound("Pokemon not found".into())
        } else if matches!(e, PokeApiError::Cache(_)) {
            AppError::Internal(e.to_string())
        } else {
            AppError::Upstream(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let not_found: AppError = PokeApiError::Status {
            status: 404,
            reason: "Not Found".into(),
        }
        .into();
        assert_eq!(not_found.into_response().status(), StatusCode::NOT_FOUND);

        let upstream: AppError = PokeApiError::Status {
            status: 503,
            reason: "Service Unavailable".into(),
        }
        .into();
        assert_eq!(upstream.into_response().status(), StatusCode::BAD_GATEWAY);

        let internal: AppError = PokeApiError::Cache("type mismatch".into()).into();
        assert_eq!(
            internal.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );

        assert_eq!(
            AppError::BadRequest("bad id".into()).into_response().status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::Forbidden("nope".into()).into_response().status(),
            StatusCode::FORBIDDEN
        );
    }
}
