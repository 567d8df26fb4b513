//! Error types for the `domain` layer.
use entity_api::error::{EntityApiErrorKind, Error as EntityApiError};
use std::error::Error as StdError;
use std::fmt;
use validator::ValidationErrors;

/// Top-level domain error type.
/// Errors from lower layers are translated into a tree of `error_kind` enums
/// rooted here, keeping the original error in `source`. `web` only looks at
/// the kinds to pick an HTTP status and never depends on `entity_api` directly.
#[derive(Debug)]
pub struct Error {
    pub source: Option<Box<dyn StdError + Send + Sync>>,
    pub error_kind: DomainErrorKind,
}

/// Enum representing the major categories of errors that can occur in the `domain` layer.
#[derive(Debug, PartialEq)]
pub enum DomainErrorKind {
    Internal(InternalErrorKind),
    /// The request body failed validation; one human readable issue per entry.
    Validation(Vec<String>),
    /// The request could not be read (query string, path or body shape); one
    /// human readable issue per entry.
    BadRequest(Vec<String>),
}

/// Enum representing the various kinds of internal errors that can occur in the `domain` layer.
#[derive(Debug, PartialEq)]
pub enum InternalErrorKind {
    Entity(EntityErrorKind),
    Other(String),
}

/// Entity errors bubbled up from `entity_api`, reduced to what callers act on.
#[derive(Debug, PartialEq)]
pub enum EntityErrorKind {
    NotFound,
    Other(String),
}

impl Error {
    pub fn validation(issues: Vec<String>) -> Self {
        Error {
            source: None,
            error_kind: DomainErrorKind::Validation(issues),
        }
    }

    pub fn bad_request(issue: impl Into<String>) -> Self {
        Error {
            source: None,
            error_kind: DomainErrorKind::BadRequest(vec![issue.into()]),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Domain Error: {:?}", self.error_kind)
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn StdError + 'static))
    }
}

// This is where we translate errors from the `entity_api` layer to the `domain` layer.
impl From<EntityApiError> for Error {
    fn from(err: EntityApiError) -> Self {
        let entity_error_kind = match err.error_kind {
            EntityApiErrorKind::RecordNotFound => EntityErrorKind::NotFound,
            EntityApiErrorKind::SystemError => EntityErrorKind::Other("SystemError".to_string()),
        };

        Error {
            source: Some(Box::new(err)),
            error_kind: DomainErrorKind::Internal(InternalErrorKind::Entity(entity_error_kind)),
        }
    }
}

impl From<ValidationErrors> for Error {
    fn from(errors: ValidationErrors) -> Self {
        let mut issues: Vec<String> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, field_errors)| {
                field_errors.iter().map(move |error| match &error.message {
                    Some(message) => message.to_string(),
                    None => format!("{field}: {}", error.code),
                })
            })
            .collect();
        // field_errors() is a HashMap; keep responses stable
        issues.sort();

        Error {
            source: Some(Box::new(errors)),
            error_kind: DomainErrorKind::Validation(issues),
        }
    }
}
