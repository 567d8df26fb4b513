use std::error::Error as StdError;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use domain::error::{DomainErrorKind, EntityErrorKind, Error as DomainError, InternalErrorKind};

use log::*;

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug)]
pub struct Error(DomainError);

impl StdError for Error {}

impl std::fmt::Display for Error {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> core::result::Result<(), std::fmt::Error> {
        write!(fmt, "{self:?}")
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    status_code: u16,
    error: &'static str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    details: Vec<String>,
}

fn error_response(status: StatusCode, error: &'static str, details: Vec<String>) -> Response {
    let body = ErrorBody {
        status_code: status.into(),
        error,
        details,
    };
    (status, Json(body)).into_response()
}

// List of possible StatusCode variants https://docs.rs/http/latest/http/status/struct.StatusCode.html#associatedconstant.UNPROCESSABLE_ENTITY
impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self.0.error_kind {
            DomainErrorKind::Internal(internal_error_kind) => match internal_error_kind {
                InternalErrorKind::Entity(entity_error_kind) => match entity_error_kind {
                    EntityErrorKind::NotFound => {
                        error_response(StatusCode::NOT_FOUND, "NOT FOUND", Vec::new())
                    }
                    EntityErrorKind::Other(reason) => {
                        error!("Entity error while handling request: {reason}");
                        error_response(
                            StatusCode::INTERNAL_SERVER_ERROR,
                            "INTERNAL SERVER ERROR",
                            Vec::new(),
                        )
                    }
                },
                InternalErrorKind::Other(reason) => {
                    error!("Internal error while handling request: {reason}");
                    error_response(
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "INTERNAL SERVER ERROR",
                        Vec::new(),
                    )
                }
            },
            DomainErrorKind::Validation(details) => error_response(
                StatusCode::UNPROCESSABLE_ENTITY,
                "UNPROCESSABLE ENTITY",
                details,
            ),
            DomainErrorKind::BadRequest(details) => {
                error_response(StatusCode::BAD_REQUEST, "BAD REQUEST", details)
            }
        }
    }
}

impl<E> From<E> for Error
where
    E: Into<DomainError>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use serde_json::{json, Value};

    async fn render(err: DomainError) -> (StatusCode, Value) {
        let response = Error::from(err).into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn validation_errors_map_to_422_with_details() {
        let (status, body) =
            render(DomainError::validation(vec!["Sport must be non-empty".to_string()])).await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(
            body,
            json!({
                "status_code": 422,
                "error": "UNPROCESSABLE ENTITY",
                "details": ["Sport must be non-empty"]
            })
        );
    }

    #[tokio::test]
    async fn bad_request_maps_to_400() {
        let (status, body) =
            render(DomainError::bad_request("limit must be between 1 and 100")).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["details"], json!(["limit must be between 1 and 100"]));
    }

    #[tokio::test]
    async fn not_found_maps_to_404_without_details() {
        let err = DomainError {
            source: None,
            error_kind: DomainErrorKind::Internal(InternalErrorKind::Entity(
                EntityErrorKind::NotFound,
            )),
        };

        let (status, body) = render(err).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({"status_code": 404, "error": "NOT FOUND"}));
    }

    #[tokio::test]
    async fn other_internal_errors_map_to_500() {
        let err = DomainError {
            source: None,
            error_kind: DomainErrorKind::Internal(InternalErrorKind::Other("boom".to_string())),
        };

        let (status, _) = render(err).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }
}
