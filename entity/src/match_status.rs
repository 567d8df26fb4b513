use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Where a match is in its lifecycle, derived from its start and end times.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Deserialize, Default, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum MatchStatus {
    #[default]
    Scheduled,
    Live,
    Finished,
}

impl MatchStatus {
    /// `Scheduled` before kickoff, `Finished` from `end_time` on, `Live` in between.
    pub fn at(start_time: DateTime<Utc>, end_time: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        if now < start_time {
            MatchStatus::Scheduled
        } else if now >= end_time {
            MatchStatus::Finished
        } else {
            MatchStatus::Live
        }
    }
}

impl std::fmt::Display for MatchStatus {
    fn fmt(&self, fmt: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MatchStatus::Scheduled => write!(fmt, "scheduled"),
            MatchStatus::Live => write!(fmt, "live"),
            MatchStatus::Finished => write!(fmt, "finished"),
        }
    }
}
