use crate::commentary::Model;
use crate::error::Error;
use crate::{Id, Store};
use entity_api::commentary::{self as commentary_api, NewCommentary};
use events::{DomainEvent, EventPublisher};
use serde::Deserialize;
use serde_json::{Map, Value};
use utoipa::ToSchema;
use validator::Validate;

use log::*;

/// Request body for posting a commentary entry to a match.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct CreateParams {
    #[validate(
        required(message = "Minute is required"),
        range(min = 0, message = "Minute must be a non-negative integer")
    )]
    pub minute: Option<i32>,
    #[validate(
        required(message = "Sequence is required"),
        range(min = 0, message = "Sequence must be a non-negative integer")
    )]
    pub sequence: Option<i32>,
    #[validate(required(message = "Period is required"))]
    pub period: Option<String>,
    #[validate(required(message = "Event type is required"))]
    pub event_type: Option<String>,
    #[validate(required(message = "Actor is required"))]
    pub actor: Option<String>,
    #[validate(required(message = "Team is required"))]
    pub team: Option<String>,
    #[validate(length(min = 1, message = "Message must be non-empty"))]
    pub message: String,
    #[schema(value_type = Object)]
    pub metadata: Option<Map<String, Value>>,
    pub tags: Option<Vec<String>>,
}

impl CreateParams {
    pub fn into_new_commentary(self) -> Result<NewCommentary, Error> {
        self.validate()?;

        let (Some(minute), Some(sequence)) = (self.minute, self.sequence) else {
            return Err(Error::validation(vec![
                "Commentary is missing required fields".to_string(),
            ]));
        };
        let (Some(period), Some(event_type), Some(actor), Some(team)) =
            (self.period, self.event_type, self.actor, self.team)
        else {
            return Err(Error::validation(vec![
                "Commentary is missing required fields".to_string(),
            ]));
        };

        Ok(NewCommentary {
            minute,
            sequence,
            period,
            event_type,
            actor,
            team,
            message: self.message,
            metadata: self.metadata.unwrap_or_default(),
            tags: self.tags.unwrap_or_default(),
        })
    }
}

/// Validates and stores a commentary entry, then pushes it to the match's
/// subscribers.
pub async fn create(
    store: &Store,
    event_publisher: &EventPublisher,
    match_id: Id,
    params: CreateParams,
) -> Result<Model, Error> {
    let new_commentary = params.into_new_commentary()?;
    let created = commentary_api::create(store, match_id, new_commentary).await?;

    match serde_json::to_value(&created) {
        Ok(value) => {
            event_publisher
                .publish(DomainEvent::CommentaryPosted {
                    match_id,
                    commentary: value,
                })
                .await
        }
        Err(e) => warn!(
            "Commentary {} for match {match_id} stored but could not be announced: {e}",
            created.id
        ),
    }

    Ok(created)
}

pub async fn find_by_match(store: &Store, match_id: Id, limit: usize) -> Result<Vec<Model>, Error> {
    Ok(commentary_api::find_by_match(store, match_id, limit).await?)
}
