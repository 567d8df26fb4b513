use crate::match_status::MatchStatus;
use crate::Id;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A tracked sporting event.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[schema(as = entity::matches::Model)]
#[serde(rename_all = "camelCase")]
pub struct Model {
    pub id: Id,

    pub sport: String,

    pub home_team: String,

    pub away_team: String,

    /// Derived from `start_time`/`end_time` when the record is written
    pub status: MatchStatus,

    #[schema(value_type = String, format = DateTime)]
    pub start_time: DateTime<Utc>,

    #[schema(value_type = String, format = DateTime)]
    pub end_time: DateTime<Utc>,

    pub home_score: i32,

    pub away_score: i32,

    #[schema(value_type = String, format = DateTime)]
    pub created_at: DateTime<Utc>,
}
