//! Battle orchestration: start matches, resolve rounds, forfeit idle matches.
//!
//! [`BattleService`] is the only writer of match records. Every mutation of a
//! match runs under that match's async lock and is committed with a version
//! compare-and-swap, so concurrent submissions of the same version resolve
//! exactly once.
mod locks;
mod views;

use std::collections::HashMap;
use std::sync::Arc;

use arena_core::{
    BattleAction, BattleConfig, CombatantSnapshot, CreatureId, CreatureProfile, EloRating, Match,
    MatchId, OpponentPolicy, PcgRng, PlayerId, RatingChange, RatingRecord, RngOracle, RoundRolls,
    Side, resolve_round, validate_action,
};
use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::api::{BattleError, RejectReason, Result};
use crate::events::{Event, EventBus, MatchEvent, RatingEvent};
use crate::oracle::CreatureOracle;
use crate::repository::{
    ArenaRepository, MatchCommit, MatchHistoryEntry, RepositoryError, Settlement,
};

use locks::MatchLocks;
pub use views::{LeaderboardEntry, OpponentEntry, RoundReport, SubmitAction};

/// Cloneable façade over storage, the creature roster and the opponent policy.
#[derive(Clone)]
pub struct BattleService {
    store: Arc<dyn ArenaRepository>,
    roster: Arc<dyn CreatureOracle>,
    policy: Arc<dyn OpponentPolicy>,
    rng: Arc<dyn RngOracle>,
    config: BattleConfig,
    locks: MatchLocks,
    events: EventBus,
}

impl BattleService {
    pub fn new(
        store: Arc<dyn ArenaRepository>,
        roster: Arc<dyn CreatureOracle>,
        policy: Arc<dyn OpponentPolicy>,
        config: BattleConfig,
        events: EventBus,
    ) -> Self {
        Self {
            store,
            roster,
            policy,
            rng: Arc::new(PcgRng),
            config,
            locks: MatchLocks::default(),
            events,
        }
    }

    /// Replace the roll source (e.g. with a fixed oracle in tests).
    pub fn with_rng(mut self, rng: Arc<dyn RngOracle>) -> Self {
        self.rng = rng;
        self
    }

    pub fn config(&self) -> &BattleConfig {
        &self.config
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    fn settlement(&self) -> Settlement {
        Settlement {
            updater: EloRating::new(self.config.k_factor),
            initial_rating: self.config.initial_rating,
        }
    }

    // ========================================================================
    // Commands
    // ========================================================================

    /// Open a match between the player's creature and `opponent`.
    ///
    /// With `creature = None` the player's first owned creature fights.
    pub async fn start_match(
        &self,
        player: PlayerId,
        creature: Option<CreatureId>,
        opponent: CreatureId,
    ) -> Result<Match> {
        let mine = match creature {
            Some(id) => self
                .roster
                .creature(id)
                .await?
                .filter(|profile| profile.owner == player)
                .ok_or_else(|| {
                    BattleError::rejected(
                        RejectReason::WrongSubmitter,
                        format!("{player} does not own {id}"),
                    )
                })?,
            None => self.default_creature(player).await?.ok_or_else(|| {
                BattleError::rejected(
                    RejectReason::WrongSubmitter,
                    format!("{player} owns no creature"),
                )
            })?,
        };

        let theirs = self
            .roster
            .creature(opponent)
            .await?
            .ok_or(BattleError::OpponentUnavailable(opponent))?;

        if theirs.id == mine.id || theirs.owner == player {
            return Err(BattleError::SelfChallengeRejected);
        }

        let id = self.store.next_match_id()?;
        let battle = Match::new(
            id,
            CombatantSnapshot::capture(&mine),
            CombatantSnapshot::capture(&theirs),
            rand::random(),
            Utc::now(),
        );

        self.store.insert(&battle).map_err(|err| match err {
            RepositoryError::DuplicateOpenMatch => BattleError::DuplicateMatch,
            other => BattleError::Repository(other),
        })?;

        info!(
            match_id = %id,
            challenger = %mine.id,
            defender = %theirs.id,
            first_striker = %battle.first_striker,
            "Match started"
        );
        self.events.publish(Event::Match(MatchEvent::Started {
            match_id: id,
            challenger: mine.id,
            defender: theirs.id,
        }));

        Ok(battle)
    }

    /// Resolve one round: the player's action against the opponent policy's.
    pub async fn submit_action(&self, request: SubmitAction) -> Result<RoundReport> {
        let SubmitAction {
            player,
            match_id,
            expected_version,
            action,
        } = request;

        let lease = self.locks.acquire(match_id).await;

        let battle = self
            .store
            .load(match_id)?
            .ok_or(BattleError::MatchNotFound(match_id))?;

        if battle.challenger.owner != player {
            return Err(BattleError::rejected(
                RejectReason::WrongSubmitter,
                format!("{player} does not control {match_id}"),
            ));
        }
        if !battle.is_open() {
            return Err(BattleError::rejected(
                RejectReason::MatchComplete,
                format!("{match_id} is already complete"),
            ));
        }
        let expected = expected_version.unwrap_or(battle.version);
        if expected != battle.version {
            return Err(BattleError::rejected(
                RejectReason::StaleVersion,
                format!("expected version {}, submitted {expected}", battle.version),
            ));
        }

        validate_action(&battle, Side::Challenger, &action)?;
        let reply = self.opponent_action(&battle);

        let round = battle.round + 1;
        let rolls = RoundRolls::draw(self.rng.as_ref(), battle.seed, round);
        let mut next = battle.clone();
        let outcome = resolve_round(
            &mut next,
            &action,
            &reply,
            rolls,
            &self.config,
            Utc::now(),
        )?;

        let winner = next.winner;
        let version = next.version;
        let rating_change = self.commit(&battle, next)?;
        drop(lease);

        debug!(
            match_id = %match_id,
            round,
            challenger_action = %outcome.challenger.action,
            challenger_damage = outcome.challenger.damage,
            defender_action = %outcome.defender.action,
            defender_damage = outcome.defender.damage,
            version,
            "Round resolved"
        );
        self.events.publish(Event::Match(MatchEvent::RoundResolved {
            match_id,
            outcome: outcome.clone(),
            version,
        }));

        Ok(RoundReport {
            match_id,
            challenger: battle.challenger.creature,
            outcome,
            version,
            winner,
            rating_change,
        })
    }

    /// Forfeit every open match idle since `cutoff`. Returns the forfeited ids.
    ///
    /// Failures on one match are logged and do not stop the sweep.
    pub async fn forfeit_idle_since(&self, cutoff: DateTime<Utc>) -> Result<Vec<MatchId>> {
        let candidates = self.store.idle_since(cutoff)?;
        let mut forfeited = Vec::with_capacity(candidates.len());

        for id in candidates {
            match self.forfeit_if_idle(id, cutoff).await {
                Ok(true) => forfeited.push(id),
                Ok(false) => {}
                Err(err) => warn!(match_id = %id, error = %err, "Failed to forfeit idle match"),
            }
        }

        Ok(forfeited)
    }

    async fn forfeit_if_idle(&self, id: MatchId, cutoff: DateTime<Utc>) -> Result<bool> {
        let lease = self.locks.acquire(id).await;

        // Re-check under the lock: a round may have landed since the scan.
        let Some(battle) = self.store.load(id)? else {
            return Ok(false);
        };
        if !battle.is_open() || battle.last_action_at > cutoff {
            return Ok(false);
        }

        let mut next = battle.clone();
        next.forfeit(Utc::now());
        self.commit(&battle, next)?;
        drop(lease);

        warn!(
            match_id = %id,
            challenger = %battle.challenger.creature,
            idle_since = %battle.last_action_at,
            "Challenger forfeited idle match"
        );
        Ok(true)
    }

    /// Pick the defender's action, falling back to Attack if the policy
    /// returns something the rules reject.
    fn opponent_action(&self, battle: &Match) -> BattleAction {
        let action = self.policy.choose(battle, Side::Defender);
        match validate_action(battle, Side::Defender, &action) {
            Ok(_) => action,
            Err(err) => {
                warn!(match_id = %battle.id, %action, error = %err, "Opponent policy chose an invalid action");
                BattleAction::Attack
            }
        }
    }

    /// Compare-and-swap `next` over `current`, then publish completion events.
    ///
    /// Must be called with the match lock held.
    fn commit(&self, current: &Match, next: Match) -> Result<Option<RatingChange>> {
        let id = next.id;
        let completion = next.winner.zip(next.completion);
        let rounds = next.round;

        let change = self
            .store
            .commit(MatchCommit {
                expected_version: current.version,
                next,
                settlement: self.settlement(),
            })
            .map_err(|err| match err {
                RepositoryError::VersionConflict { .. } => {
                    BattleError::rejected(RejectReason::StaleVersion, err.to_string())
                }
                RepositoryError::AlreadyComplete(_) => {
                    BattleError::rejected(RejectReason::MatchComplete, err.to_string())
                }
                other => BattleError::Repository(other),
            })?;

        if let Some((winner, reason)) = completion {
            info!(match_id = %id, %winner, reason = ?reason, rounds, "Match complete");
            self.events.publish(Event::Match(MatchEvent::Completed {
                match_id: id,
                winner,
                reason,
                rounds,
            }));
            if let Some(change) = change {
                info!(
                    match_id = %id,
                    winner = %change.winner,
                    loser = %change.loser,
                    delta = change.delta,
                    "Ratings updated"
                );
                self.events.publish(Event::Rating(RatingEvent {
                    match_id: id,
                    change,
                }));
            }
        }

        Ok(change)
    }

    // ========================================================================
    // Queries
    // ========================================================================

    pub async fn match_view(&self, id: MatchId) -> Result<Match> {
        self.store.load(id)?.ok_or(BattleError::MatchNotFound(id))
    }

    /// First creature (by id) owned by `player`.
    pub async fn default_creature(&self, player: PlayerId) -> Result<Option<CreatureProfile>> {
        Ok(self
            .roster
            .creatures_owned_by(player)
            .await?
            .into_iter()
            .next())
    }

    /// Creatures not owned by `player`, with their current rating.
    pub async fn opponents(&self, player: PlayerId) -> Result<Vec<OpponentEntry>> {
        let creatures = self.roster.all_creatures().await?;
        let ratings = self.rating_table()?;
        let mut entries = Vec::new();

        for profile in creatures.into_iter().filter(|p| p.owner != player) {
            let rating = ratings
                .get(&profile.id)
                .map_or(self.config.initial_rating, |record| record.rating);
            entries.push(OpponentEntry {
                creature: profile.id,
                name: profile.name,
                species: profile.species,
                element: profile.element,
                tier: profile.tier,
                level: profile.level,
                owner: profile.owner,
                owner_name: profile.owner_name,
                rating,
            });
        }

        Ok(entries)
    }

    /// Roster creatures ordered by rating (desc), ties broken by creature id.
    pub async fn leaderboard(&self, limit: Option<usize>) -> Result<Vec<LeaderboardEntry>> {
        let creatures = self.roster.all_creatures().await?;
        let ratings = self.rating_table()?;
        let mut rows = Vec::with_capacity(creatures.len());

        for profile in creatures {
            let (rating, wins, losses) = ratings.get(&profile.id).map_or(
                (self.config.initial_rating, 0, 0),
                |record| (record.rating, record.wins, record.losses),
            );
            rows.push((profile, rating, wins, losses));
        }

        rows.sort_by(|(a, ra, ..), (b, rb, ..)| rb.cmp(ra).then(a.id.cmp(&b.id)));

        Ok(rows
            .into_iter()
            .take(limit.unwrap_or(usize::MAX))
            .enumerate()
            .map(|(index, (profile, rating, wins, losses))| LeaderboardEntry {
                rank: index + 1,
                creature: profile.id,
                name: profile.name,
                level: profile.level,
                owner: profile.owner,
                owner_name: profile.owner_name,
                rating,
                wins,
                losses,
            })
            .collect())
    }

    /// Completed matches involving any creature `player` owns, newest first.
    pub async fn history(&self, player: PlayerId) -> Result<Vec<MatchHistoryEntry>> {
        let owned: Vec<CreatureId> = self
            .roster
            .creatures_owned_by(player)
            .await?
            .into_iter()
            .map(|profile| profile.id)
            .collect();
        if owned.is_empty() {
            return Ok(Vec::new());
        }
        Ok(self.store.history_for(&owned)?)
    }

    /// One read of every rating record, keyed by creature.
    fn rating_table(&self) -> Result<HashMap<CreatureId, RatingRecord>> {
        Ok(self
            .store
            .ratings()?
            .into_iter()
            .map(|record| (record.creature, record))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oracle::InMemoryRoster;
    use crate::repository::InMemoryArenaStore;
    use arena_core::{BasicAttackPolicy, Skill, StatBlock, Tier};

    fn profile(id: u64, owner: u64, stats: StatBlock) -> CreatureProfile {
        CreatureProfile {
            id: CreatureId(id),
            owner: PlayerId(owner),
            owner_name: format!("player-{owner}"),
            name: format!("pet-{id}"),
            species: String::new(),
            element: String::new(),
            tier: Tier::BASE,
            level: id as u32,
            stats,
            skills: vec![Skill::active("Slam", 200, Some(2))],
        }
    }

    fn service() -> BattleService {
        let roster = InMemoryRoster::from_profiles([
            profile(1, 10, StatBlock::new(50, 20, 200, 30, 0)),
            profile(2, 20, StatBlock::new(40, 25, 220, 25, 0)),
            profile(3, 30, StatBlock::new(10, 10, 50, 5, 0)),
            profile(4, 10, StatBlock::new(10, 10, 50, 5, 0)),
        ]);
        BattleService::new(
            Arc::new(InMemoryArenaStore::new()),
            Arc::new(roster),
            Arc::new(BasicAttackPolicy),
            BattleConfig::new(),
            EventBus::new(),
        )
    }

    #[tokio::test]
    async fn start_defaults_to_first_owned_creature() {
        let service = service();
        let battle = service
            .start_match(PlayerId(10), None, CreatureId(2))
            .await
            .unwrap();

        assert_eq!(battle.challenger.creature, CreatureId(1));
        assert_eq!(battle.version, 0);
        assert_eq!(battle.hp(Side::Challenger), 200);
        assert_eq!(battle.hp(Side::Defender), 220);
        assert_eq!(battle.first_striker, Side::Challenger);
    }

    #[tokio::test]
    async fn start_rejects_foreign_creature_and_own_opponent() {
        let service = service();

        let err = service
            .start_match(PlayerId(10), Some(CreatureId(2)), CreatureId(3))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            BattleError::ActionRejected {
                reason: RejectReason::WrongSubmitter,
                ..
            }
        ));

        let err = service
            .start_match(PlayerId(10), Some(CreatureId(1)), CreatureId(4))
            .await
            .unwrap_err();
        assert!(matches!(err, BattleError::SelfChallengeRejected));

        let err = service
            .start_match(PlayerId(10), Some(CreatureId(1)), CreatureId(1))
            .await
            .unwrap_err();
        assert!(matches!(err, BattleError::SelfChallengeRejected));

        let err = service
            .start_match(PlayerId(10), None, CreatureId(99))
            .await
            .unwrap_err();
        assert!(matches!(err, BattleError::OpponentUnavailable(CreatureId(99))));
    }

    #[tokio::test]
    async fn submit_checks_owner_and_version() {
        let service = service();
        let battle = service
            .start_match(PlayerId(10), None, CreatureId(2))
            .await
            .unwrap();

        let err = service
            .submit_action(SubmitAction {
                player: PlayerId(20),
                match_id: battle.id,
                expected_version: Some(0),
                action: BattleAction::Attack,
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            BattleError::ActionRejected {
                reason: RejectReason::WrongSubmitter,
                ..
            }
        ));

        let err = service
            .submit_action(SubmitAction {
                player: PlayerId(10),
                match_id: battle.id,
                expected_version: Some(3),
                action: BattleAction::Attack,
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            BattleError::ActionRejected {
                reason: RejectReason::StaleVersion,
                ..
            }
        ));

        let err = service
            .submit_action(SubmitAction {
                player: PlayerId(10),
                match_id: MatchId(999),
                expected_version: None,
                action: BattleAction::Attack,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, BattleError::MatchNotFound(MatchId(999))));
    }

    #[tokio::test]
    async fn lock_slots_do_not_outlive_requests() {
        let service = service();

        for id in 1_000..2_000 {
            let err = service
                .submit_action(SubmitAction {
                    player: PlayerId(10),
                    match_id: MatchId(id),
                    expected_version: None,
                    action: BattleAction::Attack,
                })
                .await
                .unwrap_err();
            assert!(matches!(err, BattleError::MatchNotFound(_)));
        }
        assert_eq!(service.locks.len(), 0);

        let battle = service
            .start_match(PlayerId(30), None, CreatureId(1))
            .await
            .unwrap();
        let attack = || SubmitAction {
            player: PlayerId(30),
            match_id: battle.id,
            expected_version: None,
            action: BattleAction::Attack,
        };
        while !service.submit_action(attack()).await.unwrap().is_over() {}
        assert_eq!(service.locks.len(), 0);

        for _ in 0..5 {
            let err = service.submit_action(attack()).await.unwrap_err();
            assert!(matches!(
                err,
                BattleError::ActionRejected {
                    reason: RejectReason::MatchComplete,
                    ..
                }
            ));
        }
        assert_eq!(service.locks.len(), 0);
    }

    #[tokio::test]
    async fn invalid_skill_leaves_match_unchanged() {
        let service = service();
        let battle = service
            .start_match(PlayerId(10), None, CreatureId(2))
            .await
            .unwrap();

        let err = service
            .submit_action(SubmitAction {
                player: PlayerId(10),
                match_id: battle.id,
                expected_version: Some(0),
                action: BattleAction::skill("Nope"),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, BattleError::InvalidAction(_)));
        assert_eq!(service.match_view(battle.id).await.unwrap(), battle);
    }

    #[tokio::test]
    async fn leaderboard_orders_by_rating_then_id() {
        let service = service();
        let battle = service
            .start_match(PlayerId(30), None, CreatureId(1))
            .await
            .unwrap();

        // Creature 3 is far weaker; attack until the match ends.
        let mut version = battle.version;
        loop {
            let report = service
                .submit_action(SubmitAction {
                    player: PlayerId(30),
                    match_id: battle.id,
                    expected_version: Some(version),
                    action: BattleAction::Attack,
                })
                .await
                .unwrap();
            version = report.version;
            if report.is_over() {
                assert_eq!(report.winner, Some(CreatureId(1)));
                assert_eq!(report.challenger_rating_delta(), Some(-16));
                break;
            }
        }

        let board = service.leaderboard(None).await.unwrap();
        let order: Vec<u64> = board.iter().map(|row| row.creature.0).collect();
        assert_eq!(order, vec![1, 2, 4, 3]);
        assert_eq!(board[0].rating, 1016);
        assert_eq!(board[0].wins, 1);
        assert_eq!(board[3].losses, 1);
        assert_eq!(board[0].rank, 1);

        assert_eq!(service.leaderboard(Some(2)).await.unwrap().len(), 2);

        let history = service.history(PlayerId(30)).await.unwrap();
        assert_eq!(history.len(), 1);
        assert!(service.history(PlayerId(20)).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn opponents_exclude_own_creatures() {
        let service = service();
        let opponents = service.opponents(PlayerId(10)).await.unwrap();
        let ids: Vec<u64> = opponents.iter().map(|entry| entry.creature.0).collect();
        assert_eq!(ids, vec![2, 3]);
        assert!(opponents.iter().all(|entry| entry.rating == 1000));
    }
}
