use super::error::Error;
use crate::store::Store;
use chrono::Utc;
use entity::commentary::Model;
use entity::Id;
use serde_json::{Map, Value};

use log::*;

/// A validated commentary entry ready to be stored.
#[derive(Debug, Clone, PartialEq)]
pub struct NewCommentary {
    pub minute: i32,
    pub sequence: i32,
    pub period: String,
    pub event_type: String,
    pub actor: String,
    pub team: String,
    pub message: String,
    pub metadata: Map<String, Value>,
    pub tags: Vec<String>,
}

/// Stores a commentary entry for an existing match.
pub async fn create(
    store: &Store,
    match_id: Id,
    new_commentary: NewCommentary,
) -> Result<Model, Error> {
    debug!("New Commentary for match {match_id} to be inserted: {new_commentary:?}");

    let mut tables = store.write().await;
    if !tables.matches.contains_key(&match_id) {
        error!("Cannot add commentary, match with id {match_id} not found");
        return Err(Error::not_found());
    }

    let model = Model {
        id: tables.next_commentary_id()?,
        match_id,
        minute: new_commentary.minute,
        sequence: new_commentary.sequence,
        period: new_commentary.period,
        event_type: new_commentary.event_type,
        actor: new_commentary.actor,
        team: new_commentary.team,
        message: new_commentary.message,
        metadata: new_commentary.metadata,
        tags: new_commentary.tags,
        created_at: Utc::now(),
    };

    tables.commentary.insert(model.id, model.clone());
    Ok(model)
}

/// Newest commentary for one match first, at most `limit` entries.
pub async fn find_by_match(store: &Store, match_id: Id, limit: usize) -> Result<Vec<Model>, Error> {
    let tables = store.read().await;
    if !tables.matches.contains_key(&match_id) {
        return Err(Error::not_found());
    }

    Ok(tables
        .commentary
        .values()
        .rev()
        .filter(|entry| entry.match_id == match_id)
        .take(limit)
        .cloned()
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EntityApiErrorKind;
    use crate::matches::{self, NewMatch};
    use chrono::Duration;

    fn entry(minute: i32, message: &str) -> NewCommentary {
        NewCommentary {
            minute,
            sequence: 0,
            period: "first_half".to_string(),
            event_type: "goal".to_string(),
            actor: "Striker".to_string(),
            team: "Rovers".to_string(),
            message: message.to_string(),
            metadata: Map::new(),
            tags: vec![],
        }
    }

    async fn seeded_store() -> (Store, Id, Id) {
        let store = Store::new();
        let start_time = Utc::now();
        let mut ids = Vec::new();
        for _ in 0..2 {
            let created = matches::create(
                &store,
                NewMatch {
                    sport: "football".to_string(),
                    home_team: "Rovers".to_string(),
                    away_team: "United".to_string(),
                    start_time,
                    end_time: start_time + Duration::minutes(90),
                    home_score: 0,
                    away_score: 0,
                },
            )
            .await
            .unwrap();
            ids.push(created.id);
        }
        (store, ids[0], ids[1])
    }

    #[tokio::test]
    async fn create_for_unknown_match_is_not_found() {
        let store = Store::new();

        let result = create(&store, 7, entry(1, "Kickoff")).await;

        assert_eq!(
            result.unwrap_err().error_kind,
            EntityApiErrorKind::RecordNotFound
        );
    }

    #[tokio::test]
    async fn find_by_match_filters_and_orders_newest_first() {
        let (store, first, second) = seeded_store().await;
        create(&store, first, entry(1, "Kickoff")).await.unwrap();
        create(&store, second, entry(2, "Elsewhere")).await.unwrap();
        create(&store, first, entry(10, "Goal")).await.unwrap();

        let messages: Vec<String> = find_by_match(&store, first, 10)
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.message)
            .collect();

        assert_eq!(messages, vec!["Goal", "Kickoff"]);
    }

    #[tokio::test]
    async fn find_by_match_respects_limit() {
        let (store, first, _) = seeded_store().await;
        for minute in 0..5 {
            create(&store, first, entry(minute, "Tick")).await.unwrap();
        }

        assert_eq!(find_by_match(&store, first, 2).await.unwrap().len(), 2);
    }
}
