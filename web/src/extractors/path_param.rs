use axum::extract::{FromRequestParts, Path};
use axum::async_trait;
use axum::http::request::Parts;
use domain::error::Error as DomainError;
use serde::de::DeserializeOwned;

use crate::Error;
use log::*;

/// `axum::extract::Path`, rejecting ids that do not parse with a 400.
pub(crate) struct PathParam<T>(pub T);

#[async_trait]
impl<T, S> FromRequestParts<S> for PathParam<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Path::<T>::from_request_parts(parts, state).await {
            Ok(Path(value)) => Ok(Self(value)),
            Err(rejection) => {
                let reason = rejection.body_text();
                debug!("Rejecting path parameters: {reason}");
                Err(DomainError::bad_request(reason).into())
            }
        }
    }
}
