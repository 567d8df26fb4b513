use super::error::Error;
use crate::store::Store;
use chrono::{DateTime, Utc};
use entity::match_status::MatchStatus;
use entity::matches::Model;
use entity::Id;

use log::*;

/// A validated match ready to be stored.
#[derive(Debug, Clone, PartialEq)]
pub struct NewMatch {
    pub sport: String,
    pub home_team: String,
    pub away_team: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub home_score: i32,
    pub away_score: i32,
}

pub async fn create(store: &Store, new_match: NewMatch) -> Result<Model, Error> {
    debug!("New Match to be inserted: {new_match:?}");

    let now = Utc::now();
    let mut tables = store.write().await;

    let model = Model {
        id: tables.next_match_id()?,
        status: MatchStatus::at(new_match.start_time, new_match.end_time, now),
        sport: new_match.sport,
        home_team: new_match.home_team,
        away_team: new_match.away_team,
        start_time: new_match.start_time,
        end_time: new_match.end_time,
        home_score: new_match.home_score,
        away_score: new_match.away_score,
        created_at: now,
    };

    tables.matches.insert(model.id, model.clone());
    Ok(model)
}

pub async fn find_by_id(store: &Store, id: Id) -> Result<Model, Error> {
    store.read().await.matches.get(&id).cloned().ok_or_else(|| {
        error!("Match with id {id} not found");
        Error::not_found()
    })
}

/// Newest matches first, at most `limit` of them.
pub async fn find_latest(store: &Store, limit: usize) -> Result<Vec<Model>, Error> {
    Ok(store
        .read()
        .await
        .matches
        .values()
        .rev()
        .take(limit)
        .cloned()
        .collect())
}

/// Overwrites both scores and refreshes the derived status.
pub async fn update_score(
    store: &Store,
    id: Id,
    home_score: i32,
    away_score: i32,
) -> Result<Model, Error> {
    let mut tables = store.write().await;

    match tables.matches.get_mut(&id) {
        Some(existing) => {
            debug!("Existing Match model to be Updated: {existing:?}");

            existing.home_score = home_score;
            existing.away_score = away_score;
            existing.status = MatchStatus::at(existing.start_time, existing.end_time, Utc::now());
            Ok(existing.clone())
        }
        None => {
            error!("Match with id {id} not found");
            Err(Error::not_found())
        }
    }
}
