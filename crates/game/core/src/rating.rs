//! Elo-style rating updates for decisive matches.
//!
//! ```text
//! expected = 1 / (1 + 10^((Rl - Rw) / 400))
//! delta    = min(round(K × (1 - expected)), Rl)
//! Rw' = Rw + delta
//! Rl' = Rl - delta
//! ```
//!
//! Ratings are integers and the same `delta` is added to the winner and
//! subtracted from the loser, so rating mass is conserved exactly. Capping
//! `delta` at the loser's rating keeps ratings non-negative without breaking
//! that symmetry.

use crate::state::CreatureId;

/// Rating and record of one creature.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RatingRecord {
    pub creature: CreatureId,
    pub rating: u32,
    pub wins: u32,
    pub losses: u32,
}

impl RatingRecord {
    pub fn new(creature: CreatureId, rating: u32) -> Self {
        Self {
            creature,
            rating,
            wins: 0,
            losses: 0,
        }
    }
}

/// Rating movement caused by one match.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RatingChange {
    pub winner: CreatureId,
    pub loser: CreatureId,
    /// Points moved from loser to winner.
    pub delta: u32,
}

impl RatingChange {
    /// Signed change from the point of view of `creature`.
    pub fn signed_for(&self, creature: CreatureId) -> i64 {
        if creature == self.winner {
            self.delta as i64
        } else if creature == self.loser {
            -(self.delta as i64)
        } else {
            0
        }
    }
}

/// Paired rating updater.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EloRating {
    pub k_factor: u32,
}

impl EloRating {
    pub const fn new(k_factor: u32) -> Self {
        Self { k_factor }
    }

    /// Probability that `winner_rating` beats `loser_rating`.
    pub fn expected_win(winner_rating: u32, loser_rating: u32) -> f64 {
        let diff = loser_rating as f64 - winner_rating as f64;
        1.0 / (1.0 + 10f64.powf(diff / 400.0))
    }

    /// Points the winner gains (and the loser loses).
    pub fn delta(&self, winner_rating: u32, loser_rating: u32) -> u32 {
        let expected = Self::expected_win(winner_rating, loser_rating);
        let raw = (self.k_factor as f64 * (1.0 - expected)).round();
        (raw.max(0.0) as u32).min(loser_rating)
    }

    /// Apply a decisive result to both records and return the change.
    pub fn apply(&self, winner: &mut RatingRecord, loser: &mut RatingRecord) -> RatingChange {
        let delta = self.delta(winner.rating, loser.rating);

        winner.rating += delta;
        winner.wins += 1;
        loser.rating -= delta;
        loser.losses += 1;

        RatingChange {
            winner: winner.creature,
            loser: loser.creature,
            delta,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_ratings_move_half_k() {
        let elo = EloRating::new(32);
        assert_eq!(elo.delta(1000, 1000), 16);
    }

    #[test]
    fn upset_moves_more_than_expected_win() {
        let elo = EloRating::new(32);
        let upset = elo.delta(1000, 1400);
        let expected = elo.delta(1400, 1000);
        assert!(upset > expected);
        assert_eq!(upset + expected, 32);
    }

    #[test]
    fn apply_is_zero_sum() {
        let elo = EloRating::new(32);
        let mut winner = RatingRecord::new(CreatureId(1), 1100);
        let mut loser = RatingRecord::new(CreatureId(2), 950);
        let before = winner.rating + loser.rating;

        let change = elo.apply(&mut winner, &mut loser);

        assert_eq!(winner.rating + loser.rating, before);
        assert_eq!(winner.rating, 1100 + change.delta);
        assert_eq!(loser.rating, 950 - change.delta);
        assert_eq!((winner.wins, winner.losses), (1, 0));
        assert_eq!((loser.wins, loser.losses), (0, 1));
        assert_eq!(change.signed_for(CreatureId(1)), change.delta as i64);
        assert_eq!(change.signed_for(CreatureId(2)), -(change.delta as i64));
    }

    #[test]
    fn loser_rating_never_negative() {
        let elo = EloRating::new(32);
        let mut winner = RatingRecord::new(CreatureId(1), 0);
        let mut loser = RatingRecord::new(CreatureId(2), 5);

        let change = elo.apply(&mut winner, &mut loser);

        assert_eq!(change.delta, 5);
        assert_eq!(loser.rating, 0);
        assert_eq!(winner.rating, 5);
    }
}
