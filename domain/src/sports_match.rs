use crate::error::Error;
use crate::matches::Model;
use crate::{Id, Store};
use chrono::{DateTime, Utc};
use entity_api::matches::{self as match_api, NewMatch};
use events::{DomainEvent, EventPublisher};
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use log::*;

/// Request body for creating a match. Times are RFC 3339 strings.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct CreateParams {
    #[validate(length(min = 1, message = "Sport must be non-empty"))]
    pub sport: String,
    #[validate(length(min = 1, message = "Home team must be non-empty"))]
    pub home_team: String,
    #[validate(length(min = 1, message = "Away team must be non-empty"))]
    pub away_team: String,
    #[schema(example = "2026-10-19T18:00:00Z")]
    pub start_time: String,
    #[schema(example = "2026-10-19T19:45:00Z")]
    pub end_time: String,
    #[validate(range(min = 0, message = "Home score must be a non-negative integer"))]
    pub home_score: Option<i32>,
    #[validate(range(min = 0, message = "Away score must be a non-negative integer"))]
    pub away_score: Option<i32>,
}

/// Request body for overwriting a match's score.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct UpdateScoreParams {
    #[validate(
        required(message = "Home score is required"),
        range(min = 0, message = "Home score must be a non-negative integer")
    )]
    pub home_score: Option<i32>,
    #[validate(
        required(message = "Away score is required"),
        range(min = 0, message = "Away score must be a non-negative integer")
    )]
    pub away_score: Option<i32>,
}

impl CreateParams {
    /// Validates every field, reporting all problems at once.
    pub fn into_new_match(self) -> Result<NewMatch, Error> {
        let mut issues = match self.validate() {
            Ok(()) => Vec::new(),
            Err(errors) => match Error::from(errors).error_kind {
                crate::error::DomainErrorKind::Validation(issues) => issues,
                _ => Vec::new(),
            },
        };

        let start_time = parse_time("startTime", &self.start_time, &mut issues);
        let end_time = parse_time("endTime", &self.end_time, &mut issues);

        let (Some(start_time), Some(end_time)) = (start_time, end_time) else {
            return Err(Error::validation(issues));
        };

        if end_time <= start_time {
            issues.push("endTime must be chronologically after startTime".to_string());
        }
        if !issues.is_empty() {
            return Err(Error::validation(issues));
        }

        Ok(NewMatch {
            sport: self.sport,
            home_team: self.home_team,
            away_team: self.away_team,
            start_time,
            end_time,
            home_score: self.home_score.unwrap_or(0),
            away_score: self.away_score.unwrap_or(0),
        })
    }
}

fn parse_time(field: &str, value: &str, issues: &mut Vec<String>) -> Option<DateTime<Utc>> {
    match DateTime::parse_from_rfc3339(value) {
        Ok(parsed) => Some(parsed.with_timezone(&Utc)),
        Err(_) => {
            issues.push(format!("{field} must be a valid ISO date string"));
            None
        }
    }
}

/// Validates and stores a new match, then announces it to every connected
/// client. Nothing is announced if validation or the write fails.
pub async fn create(
    store: &Store,
    event_publisher: &EventPublisher,
    params: CreateParams,
) -> Result<Model, Error> {
    let new_match = params.into_new_match()?;
    let created = match_api::create(store, new_match).await?;

    match serde_json::to_value(&created) {
        Ok(value) => {
            event_publisher
                .publish(DomainEvent::MatchCreated {
                    match_id: created.id,
                    r#match: value,
                })
                .await
        }
        Err(e) => warn!("Match {} stored but could not be announced: {e}", created.id),
    }

    Ok(created)
}

pub async fn find_by_id(store: &Store, id: Id) -> Result<Model, Error> {
    Ok(match_api::find_by_id(store, id).await?)
}

pub async fn find_latest(store: &Store, limit: usize) -> Result<Vec<Model>, Error> {
    Ok(match_api::find_latest(store, limit).await?)
}

pub async fn update_score(
    store: &Store,
    id: Id,
    params: UpdateScoreParams,
) -> Result<Model, Error> {
    params.validate()?;

    let (Some(home_score), Some(away_score)) = (params.home_score, params.away_score) else {
        return Err(Error::validation(vec![
            "Both homeScore and awayScore are required".to_string(),
        ]));
    };

    Ok(match_api::update_score(store, id, home_score, away_score).await?)
}
