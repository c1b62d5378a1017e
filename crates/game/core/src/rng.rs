//! Deterministic random rolls for battle resolution.
//!
//! Every roll in a match is derived from the match seed, the round number, the
//! acting side, and a per-purpose context value. Replaying the same match with
//! the same seed yields the same rolls.

use crate::state::Side;

/// Source of deterministic random numbers.
///
/// Implementations must be pure: the same seed always yields the same value.
pub trait RngOracle: Send + Sync {
    /// Generate a random u32 value from a seed.
    fn next_u32(&self, seed: u64) -> u32;

    /// Percentile roll in `[0, 100)`.
    fn roll_percent(&self, seed: u64) -> u32 {
        self.next_u32(seed) % 100
    }

    /// Uniform index in `[0, len)`. Returns 0 when `len` is 0.
    fn pick(&self, seed: u64, len: usize) -> usize {
        if len == 0 {
            return 0;
        }
        self.next_u32(seed) as usize % len
    }
}

/// PCG-XSH-RR generator: 64-bit state, 32-bit output.
#[derive(Clone, Copy, Debug, Default)]
pub struct PcgRng;

impl PcgRng {
    const MULTIPLIER: u64 = 6364136223846793005;
    const INCREMENT: u64 = 1442695040888963407;

    #[inline]
    fn pcg_step(state: u64) -> u64 {
        state
            .wrapping_mul(Self::MULTIPLIER)
            .wrapping_add(Self::INCREMENT)
    }

    #[inline]
    fn pcg_output(state: u64) -> u32 {
        let xorshifted = (((state >> 18) ^ state) >> 27) as u32;
        let rot = (state >> 59) as u32;
        xorshifted.rotate_right(rot)
    }
}

impl RngOracle for PcgRng {
    fn next_u32(&self, seed: u64) -> u32 {
        Self::pcg_output(Self::pcg_step(seed))
    }
}

/// What a roll is used for. Keeps independent rolls in one round apart.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RollContext {
    Critical = 0,
    PolicyWeight = 1,
    PolicyPick = 2,
}

/// Mix the match seed with round, side and context into a roll seed.
pub fn compute_seed(match_seed: u64, round: u32, side: Side, context: RollContext) -> u64 {
    let mut hash = match_seed;
    hash ^= (round as u64).wrapping_mul(0x9e3779b97f4a7c15);
    hash ^= (side.tag() as u64 + 1).wrapping_mul(0x517cc1b727220a95);
    hash ^= (context as u64 + 1).wrapping_mul(0x85ebca6b);

    // avalanche
    hash ^= hash >> 33;
    hash = hash.wrapping_mul(0xff51afd7ed558ccd);
    hash ^= hash >> 33;
    hash
}

/// The random inputs of one round, drawn up front so resolution stays pure.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RoundRolls {
    /// Crit roll of the challenger, in `[0, 100)`.
    pub challenger_crit: u32,
    /// Crit roll of the defender, in `[0, 100)`.
    pub defender_crit: u32,
}

impl RoundRolls {
    /// Rolls that never crit (unless crit chance is 100).
    pub const NO_CRIT: Self = Self {
        challenger_crit: 99,
        defender_crit: 99,
    };

    /// Draw the rolls for `round` of a match.
    pub fn draw(rng: &(impl RngOracle + ?Sized), match_seed: u64, round: u32) -> Self {
        let roll = |side| rng.roll_percent(compute_seed(match_seed, round, side, RollContext::Critical));
        Self {
            challenger_crit: roll(Side::Challenger),
            defender_crit: roll(Side::Defender),
        }
    }

    pub fn crit_roll(&self, side: Side) -> u32 {
        match side {
            Side::Challenger => self.challenger_crit,
            Side::Defender => self.defender_crit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_value() {
        let rng = PcgRng;
        assert_eq!(rng.next_u32(12345), rng.next_u32(12345));
    }

    #[test]
    fn rolls_stay_in_range() {
        let rng = PcgRng;
        for seed in 0..500u64 {
            assert!(rng.roll_percent(seed) < 100);
            assert!(rng.pick(seed, 3) < 3);
        }
        assert_eq!(rng.pick(1, 0), 0);
    }

    #[test]
    fn seeds_differ_by_side_round_and_context() {
        let a = compute_seed(7, 1, Side::Challenger, RollContext::Critical);
        let b = compute_seed(7, 1, Side::Defender, RollContext::Critical);
        let c = compute_seed(7, 2, Side::Challenger, RollContext::Critical);
        let d = compute_seed(7, 1, Side::Challenger, RollContext::PolicyWeight);
        assert_ne!(a, b);
        assert_ne!(a, c);
        assert_ne!(a, d);
    }

    #[test]
    fn round_rolls_are_reproducible() {
        let first = RoundRolls::draw(&PcgRng, 99, 4);
        let second = RoundRolls::draw(&PcgRng, 99, 4);
        assert_eq!(first, second);
    }
}
