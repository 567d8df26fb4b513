use crate::error::{EntityApiErrorKind, Error};
use entity::{commentary, matches, Id};
use std::collections::BTreeMap;
use tokio::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// In-process record store. Ids are assigned sequentially starting at 1 so
/// newer records always sort after older ones.
#[derive(Default)]
pub struct Store {
    tables: RwLock<Tables>,
}

#[derive(Default)]
pub(crate) struct Tables {
    last_match_id: Id,
    last_commentary_id: Id,
    pub(crate) matches: BTreeMap<Id, matches::Model>,
    pub(crate) commentary: BTreeMap<Id, commentary::Model>,
}

impl Tables {
    pub(crate) fn next_match_id(&mut self) -> Result<Id, Error> {
        self.last_match_id = next_id(self.last_match_id)?;
        Ok(self.last_match_id)
    }

    pub(crate) fn next_commentary_id(&mut self) -> Result<Id, Error> {
        self.last_commentary_id = next_id(self.last_commentary_id)?;
        Ok(self.last_commentary_id)
    }
}

fn next_id(last: Id) -> Result<Id, Error> {
    last.checked_add(1).ok_or(Error {
        source: None,
        error_kind: EntityApiErrorKind::SystemError,
    })
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) async fn read(&self) -> RwLockReadGuard<'_, Tables> {
        self.tables.read().await
    }

    pub(crate) async fn write(&self) -> RwLockWriteGuard<'_, Tables> {
        self.tables.write().await
    }

    pub async fn match_count(&self) -> usize {
        self.read().await.matches.len()
    }
}
