//! In-memory arena store for tests and single-node deployments.

use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};

use arena_core::{CreatureId, Match, MatchId, RatingChange, RatingRecord};
use chrono::{DateTime, Utc};

use crate::repository::{
    HistoryRepository, MatchCommit, MatchHistoryEntry, MatchRepository, RatingRepository,
    RepositoryError, Result,
};

#[derive(Default)]
struct Tables {
    matches: HashMap<MatchId, Match>,
    ratings: BTreeMap<CreatureId, RatingRecord>,
    history: Vec<MatchHistoryEntry>,
}

/// Thread-safe store holding matches, ratings and history behind one lock.
///
/// The single lock makes every [`MatchRepository::commit`] a transaction over
/// all three tables. Not persistent across process restarts.
pub struct InMemoryArenaStore {
    tables: RwLock<Tables>,
    next_id: AtomicU64,
}

impl InMemoryArenaStore {
    pub fn new() -> Self {
        Self {
            tables: RwLock::new(Tables::default()),
            next_id: AtomicU64::new(1),
        }
    }
}

impl Default for InMemoryArenaStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MatchRepository for InMemoryArenaStore {
    fn next_match_id(&self) -> Result<MatchId> {
        Ok(MatchId(self.next_id.fetch_add(1, Ordering::Relaxed)))
    }

    fn insert(&self, battle: &Match) -> Result<()> {
        let mut tables = self
            .tables
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;

        if tables.matches.contains_key(&battle.id) {
            return Err(RepositoryError::MatchExists(battle.id));
        }

        let (a, b) = (battle.challenger.creature, battle.defender.creature);
        if tables
            .matches
            .values()
            .any(|open| open.is_open() && open.involves_pair(a, b))
        {
            return Err(RepositoryError::DuplicateOpenMatch);
        }

        tables.matches.insert(battle.id, battle.clone());
        Ok(())
    }

    fn load(&self, id: MatchId) -> Result<Option<Match>> {
        let tables = self
            .tables
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        Ok(tables.matches.get(&id).cloned())
    }

    fn commit(&self, commit: MatchCommit) -> Result<Option<RatingChange>> {
        let MatchCommit {
            expected_version,
            next,
            settlement,
        } = commit;

        let mut guard = self
            .tables
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        let tables = &mut *guard;

        let stored = tables
            .matches
            .get(&next.id)
            .ok_or(RepositoryError::MatchNotFound(next.id))?;
        if stored.version != expected_version {
            return Err(RepositoryError::version_conflict(stored, expected_version));
        }
        if !stored.is_open() {
            return Err(RepositoryError::AlreadyComplete(next.id));
        }
        if next.version != expected_version + 1 {
            return Err(RepositoryError::CorruptedData(format!(
                "match {} must advance to version {}, got {}",
                next.id,
                expected_version + 1,
                next.version
            )));
        }

        let mut change = None;
        if !next.is_open() {
            let (Some(winner), Some(loser), Some(reason)) =
                (next.winner, next.loser(), next.completion)
            else {
                return Err(RepositoryError::CorruptedData(format!(
                    "match {} completed without a winner",
                    next.id
                )));
            };

            let initial = settlement.initial_rating;
            let mut winner_record = tables
                .ratings
                .get(&winner)
                .cloned()
                .unwrap_or_else(|| RatingRecord::new(winner, initial));
            let mut loser_record = tables
                .ratings
                .get(&loser)
                .cloned()
                .unwrap_or_else(|| RatingRecord::new(loser, initial));

            let applied = settlement
                .updater
                .apply(&mut winner_record, &mut loser_record);

            tables.history.push(MatchHistoryEntry {
                match_id: next.id,
                challenger: (&next.challenger).into(),
                defender: (&next.defender).into(),
                winner,
                rounds: next.round,
                rating_delta: applied.delta,
                reason,
                completed_at: next.last_action_at,
            });
            tables.ratings.insert(winner, winner_record);
            tables.ratings.insert(loser, loser_record);
            change = Some(applied);
        }

        tables.matches.insert(next.id, next);
        Ok(change)
    }

    fn idle_since(&self, cutoff: DateTime<Utc>) -> Result<Vec<MatchId>> {
        let tables = self
            .tables
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        let mut ids: Vec<MatchId> = tables
            .matches
            .values()
            .filter(|battle| battle.is_open() && battle.last_action_at <= cutoff)
            .map(|battle| battle.id)
            .collect();
        ids.sort_unstable();
        Ok(ids)
    }
}

impl RatingRepository for InMemoryArenaStore {
    fn ratings(&self) -> Result<Vec<RatingRecord>> {
        let tables = self
            .tables
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        Ok(tables.ratings.values().cloned().collect())
    }
}

impl HistoryRepository for InMemoryArenaStore {
    fn history_for(&self, creatures: &[CreatureId]) -> Result<Vec<MatchHistoryEntry>> {
        let tables = self
            .tables
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        Ok(tables
            .history
            .iter()
            .rev()
            .filter(|entry| creatures.iter().any(|&creature| entry.involves(creature)))
            .cloned()
            .collect())
    }

    fn history_len(&self) -> Result<usize> {
        let tables = self
            .tables
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        Ok(tables.history.len())
    }
}
