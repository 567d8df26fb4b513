use crate::Id;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use utoipa::ToSchema;

/// A single narrative entry attached to one match.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[schema(as = entity::commentary::Model)]
#[serde(rename_all = "camelCase")]
pub struct Model {
    pub id: Id,

    pub match_id: Id,

    /// Match clock minute the entry refers to
    pub minute: i32,

    /// Ordering of entries within the same minute
    pub sequence: i32,

    pub period: String,

    pub event_type: String,

    pub actor: String,

    pub team: String,

    pub message: String,

    /// Free-form structured details (e.g. assist, card colour)
    #[schema(value_type = Object)]
    pub metadata: Map<String, Value>,

    pub tags: Vec<String>,

    #[schema(value_type = String, format = DateTime)]
    pub created_at: DateTime<Utc>,
}
