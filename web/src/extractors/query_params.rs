use axum::extract::{FromRequestParts, Query};
use axum::async_trait;
use axum::http::request::Parts;
use domain::error::Error as DomainError;
use serde::de::DeserializeOwned;

use crate::Error;
use log::*;

/// `axum::extract::Query`, rejecting unparsable query strings with a 400 and
/// the reason.
pub(crate) struct QueryParams<T>(pub T);

#[async_trait]
impl<T, S> FromRequestParts<S> for QueryParams<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Query::<T>::from_request_parts(parts, state).await {
            Ok(Query(value)) => Ok(Self(value)),
            Err(rejection) => {
                let reason = rejection.body_text();
                debug!("Rejecting query string: {reason}");
                Err(DomainError::bad_request(reason).into())
            }
        }
    }
}
