use axum::extract::{FromRequest, Request};
use axum::{async_trait, Json};
use domain::error::Error as DomainError;
use serde::de::DeserializeOwned;

use crate::Error;
use log::*;

/// `axum::Json`, rejecting malformed bodies with a 400 and the reason.
pub(crate) struct JsonBody<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => {
                let reason = rejection.body_text();
                debug!("Rejecting request body: {reason}");
                Err(DomainError::bad_request(reason).into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, StatusCode};
    use axum::response::IntoResponse;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct Score {
        home_score: i32,
    }

    fn json_request(body: &'static str) -> Request {
        Request::builder()
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn well_formed_body_is_extracted() {
        let request = json_request(r#"{"homeScore": 2}"#);

        let JsonBody(score) = JsonBody::<Score>::from_request(request, &()).await.unwrap();

        assert_eq!(score.home_score, 2);
    }

    #[tokio::test]
    async fn wrong_field_type_is_a_bad_request() {
        let request = json_request(r#"{"homeScore": "2"}"#);

        let rejection = JsonBody::<Score>::from_request(request, &())
            .await
            .err()
            .unwrap();

        assert_eq!(rejection.into_response().status(), StatusCode::BAD_REQUEST);
    }
}
