//! In-memory competition store.
//!
//! Each competition sits behind its own mutex, so operations on one competition are
//! serialized while different competitions proceed in parallel. Updates are applied to a
//! clone and committed only when the operation succeeds.

use crate::models::{Competition, CompetitionError, CompetitionId, CompetitionResult};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::time::{Duration, Instant};

struct Entry {
    competition: Competition,
    last_activity: Instant,
}

#[derive(Default)]
pub struct CompetitionStore {
    entries: RwLock<HashMap<CompetitionId, Arc<Mutex<Entry>>>>,
}

impl CompetitionStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn entry(&self, id: CompetitionId) -> CompetitionResult<Arc<Mutex<Entry>>> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries
            .get(&id)
            .cloned()
            .ok_or_else(|| CompetitionError::NotFound(format!("competition {}", id)))
    }

    /// Add a competition; an existing one with the same id is a duplicate.
    pub fn insert(&self, competition: Competition) -> CompetitionResult<CompetitionId> {
        let id = competition.id;
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        if entries.contains_key(&id) {
            return Err(CompetitionError::Duplicate(format!("competition {}", id)));
        }
        entries.insert(
            id,
            Arc::new(Mutex::new(Entry {
                competition,
                last_activity: Instant::now(),
            })),
        );
        log::info!("stored competition {}", id);
        Ok(id)
    }

    /// Snapshot of a competition. Reading counts as activity.
    pub fn get(&self, id: CompetitionId) -> CompetitionResult<Competition> {
        let entry = self.entry(id)?;
        let mut entry = entry.lock().unwrap_or_else(PoisonError::into_inner);
        entry.last_activity = Instant::now();
        Ok(entry.competition.clone())
    }

    /// Run `op` against a working copy and commit it only on success.
    pub fn update<T>(
        &self,
        id: CompetitionId,
        op: impl FnOnce(&mut Competition) -> CompetitionResult<T>,
    ) -> CompetitionResult<T> {
        let entry = self.entry(id)?;
        let mut entry = entry.lock().unwrap_or_else(PoisonError::into_inner);
        entry.last_activity = Instant::now();

        let mut working = entry.competition.clone();
        match op(&mut working) {
            Ok(out) => {
                entry.competition = working;
                Ok(out)
            }
            Err(e) => {
                log::warn!("competition {}: rejected: {}", id, e);
                Err(e)
            }
        }
    }

    pub fn remove(&self, id: CompetitionId) -> CompetitionResult<()> {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| CompetitionError::NotFound(format!("competition {}", id)))
    }

    /// Drop competitions idle for at least `timeout`. Returns how many were removed.
    pub fn evict_inactive(&self, timeout: Duration) -> usize {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let before = entries.len();
        entries.retain(|_, entry| {
            let entry = entry.lock().unwrap_or_else(PoisonError::into_inner);
            entry.last_activity.elapsed() < timeout
        });
        let removed = before - entries.len();
        if removed > 0 {
            log::info!("evicted {} inactive competition(s)", removed);
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CompetitionFormat, CompetitionStatus, Identity};
    use chrono::Utc;
    use uuid::Uuid;

    fn store_with_one() -> (CompetitionStore, CompetitionId) {
        let store = CompetitionStore::new();
        let c = Competition::new("Club Night", CompetitionFormat::SingleElimination, Uuid::new_v4(), Utc::now());
        let id = store.insert(c).unwrap();
        (store, id)
    }

    #[test]
    fn failed_update_leaves_competition_untouched() {
        let (store, id) = store_with_one();
        let err = store
            .update(id, |c| {
                c.open_registration(Utc::now())?;
                c.register_participant(Identity::named("Ann"), Utc::now())?;
                c.complete(Utc::now())
            })
            .unwrap_err();
        assert!(matches!(err, CompetitionError::InvalidStateTransition { .. }));
        let c = store.get(id).unwrap();
        assert_eq!(c.status(), CompetitionStatus::Draft);
        assert!(c.participants().is_empty());
    }

    #[test]
    fn successful_update_commits() {
        let (store, id) = store_with_one();
        store.update(id, |c| c.open_registration(Utc::now())).unwrap();
        assert_eq!(store.get(id).unwrap().status(), CompetitionStatus::Open);
    }

    #[test]
    fn unknown_id_is_not_found() {
        let store = CompetitionStore::new();
        assert!(matches!(store.get(Uuid::new_v4()), Err(CompetitionError::NotFound(_))));
    }

    #[test]
    fn eviction_respects_timeout() {
        let (store, _) = store_with_one();
        assert_eq!(store.evict_inactive(Duration::from_secs(3600)), 0);
        assert_eq!(store.evict_inactive(Duration::ZERO), 1);
        assert!(store.is_empty());
    }
}
