//! Team identities and per-team state
//!
//! This module defines the four fixed teams of a game and the authoritative
//! record kept for each of them: remaining time, points, resource usage and
//! the flags that drive locking, freezing and elimination.

use enum_map::{Enum, EnumMap};
use serde::{Deserialize, Serialize};

use crate::config::GameConfig;

/// Identifier of one of the four competing teams
///
/// Team identifiers are immutable for the whole session and double as
/// keys for every per-team map in the engine.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Enum,
    Serialize,
    Deserialize,
    derive_more::Display,
)]
pub enum TeamId {
    /// Team A
    A,
    /// Team B
    B,
    /// Team C
    C,
    /// Team D
    D,
}

impl TeamId {
    /// All teams in roster order
    pub const ALL: [TeamId; crate::constants::team::COUNT] =
        [TeamId::A, TeamId::B, TeamId::C, TeamId::D];

    /// Iterates over every team except this one, in roster order
    pub fn opponents(self) -> impl Iterator<Item = TeamId> {
        Self::ALL.into_iter().filter(move |team| *team != self)
    }
}

/// The authoritative record for a single team
///
/// Only [`crate::game::GameEngine`] mutates these records; everyone else
/// reads them through snapshots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamState {
    /// Seconds left on the team's clock (never negative)
    pub time_remaining: f64,
    /// Points earned so far
    pub points: u64,
    /// Waiting for host action; blocks assignment and ticking
    pub locked: bool,
    /// The next assignment is consumed without a question
    pub frozen: bool,
    /// Wrong answers in a row since the last correct answer or dare
    pub consecutive_wrong: u32,
    /// The next answer is resolved with doubled stakes
    pub double_or_nothing: bool,
    /// Lifelines applied so far
    pub lifelines_used: u32,
    /// Dares completed (or spent as fallback) so far
    pub dares_used: u32,
    /// Lifeline budget
    pub max_lifelines: u32,
    /// Dare budget
    pub max_dares: u32,
    /// Out of the game until restart
    pub eliminated: bool,
    /// The clock ran out and the host has not resolved it yet
    pub timeout_occurred: bool,
    /// The team may spend a lifeline or dare to recover from the timeout
    pub fallback_available: bool,
}

impl Default for TeamState {
    fn default() -> Self {
        Self::new(&GameConfig::default())
    }
}

impl TeamState {
    /// Creates a fresh team record from the game configuration
    pub fn new(config: &GameConfig) -> Self {
        Self {
            time_remaining: config.initial_time,
            points: 0,
            locked: false,
            frozen: false,
            consecutive_wrong: 0,
            double_or_nothing: false,
            lifelines_used: 0,
            dares_used: 0,
            max_lifelines: config.max_lifelines,
            max_dares: config.max_dares,
            eliminated: false,
            timeout_occurred: false,
            fallback_available: false,
        }
    }

    /// Lifelines still available to the team
    pub fn remaining_lifelines(&self) -> u32 {
        self.max_lifelines.saturating_sub(self.lifelines_used)
    }

    /// Dares still available to the team
    pub fn remaining_dares(&self) -> u32 {
        self.max_dares.saturating_sub(self.dares_used)
    }

    /// Whether the team may draw a lifeline right now
    pub fn can_use_lifeline(&self) -> bool {
        self.remaining_lifelines() > 0 && !self.locked && !self.eliminated
    }

    /// Whether the team still has a dare to spend
    pub fn can_use_dare(&self) -> bool {
        self.remaining_dares() > 0 && !self.eliminated
    }

    /// Whether a question may be assigned to the team
    pub fn is_assignable(&self) -> bool {
        !self.locked && !self.eliminated
    }

    /// Adds time, never ending above `cap`
    ///
    /// A team already above the cap is brought down to it.
    pub fn gain_time(&mut self, seconds: f64, cap: f64) {
        self.time_remaining = (self.time_remaining + seconds).clamp(0.0, cap);
    }

    /// Removes time, flooring at zero
    ///
    /// # Returns
    ///
    /// The number of seconds actually removed
    pub fn lose_time(&mut self, seconds: f64) -> f64 {
        let taken = seconds.min(self.time_remaining).max(0.0);
        self.time_remaining -= taken;
        taken
    }

    /// Adds time without an upper bound, flooring at zero
    pub fn add_uncapped(&mut self, seconds: f64) {
        self.time_remaining = (self.time_remaining + seconds).max(0.0);
    }

    /// Marks the team as out of the game
    pub fn eliminate(&mut self) {
        self.eliminated = true;
        self.locked = true;
        self.fallback_available = false;
    }
}

/// State for every team, keyed by [`TeamId`]
pub type Teams = EnumMap<TeamId, TeamState>;

/// Creates the default state for all four teams
pub fn fresh_teams(config: &GameConfig) -> Teams {
    EnumMap::from_fn(|_| TeamState::new(config))
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn test_team_id_display() {
        assert_eq!(TeamId::A.to_string(), "A");
        assert_eq!(TeamId::D.to_string(), "D");
    }

    #[test]
    fn test_opponents_excludes_self_in_order() {
        let opponents: Vec<_> = TeamId::B.opponents().collect();
        assert_eq!(opponents, vec![TeamId::A, TeamId::C, TeamId::D]);
    }

    #[test]
    fn test_fresh_team_defaults() {
        let team = TeamState::default();
        assert!((team.time_remaining - crate::constants::team::INITIAL_TIME).abs() < f64::EPSILON);
        assert_eq!(team.points, 0);
        assert_eq!(team.remaining_lifelines(), 3);
        assert_eq!(team.remaining_dares(), 3);
        assert!(team.is_assignable());
        assert!(team.can_use_lifeline());
    }

    #[test]
    fn test_gain_time_clamps_to_cap() {
        let mut team = TeamState {
            time_remaining: 55.0,
            ..TeamState::default()
        };
        team.gain_time(10.0, 60.0);
        assert!((team.time_remaining - 60.0).abs() < f64::EPSILON);

        let mut team = TeamState::default();
        team.gain_time(10.0, 60.0);
        assert!((team.time_remaining - 60.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_lose_time_floors_at_zero() {
        let mut team = TeamState {
            time_remaining: 3.0,
            ..TeamState::default()
        };
        let taken = team.lose_time(5.0);
        assert!((taken - 3.0).abs() < f64::EPSILON);
        assert!(team.time_remaining.abs() < f64::EPSILON);
    }

    #[test]
    fn test_add_uncapped_exceeds_cap() {
        let mut team = TeamState {
            time_remaining: 58.0,
            ..TeamState::default()
        };
        team.add_uncapped(15.0);
        assert!((team.time_remaining - 73.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_locked_team_cannot_use_lifeline_but_can_dare() {
        let team = TeamState {
            locked: true,
            ..TeamState::default()
        };
        assert!(!team.can_use_lifeline());
        assert!(team.can_use_dare());
        assert!(!team.is_assignable());
    }

    #[test]
    fn test_eliminate_sets_terminal_flags() {
        let mut team = TeamState {
            fallback_available: true,
            timeout_occurred: true,
            ..TeamState::default()
        };
        team.eliminate();
        assert!(team.eliminated);
        assert!(team.locked);
        assert!(!team.fallback_available);
        assert!(!team.can_use_dare());
    }

    #[test]
    fn test_remaining_saturates() {
        let team = TeamState {
            lifelines_used: 5,
            ..TeamState::default()
        };
        assert_eq!(team.remaining_lifelines(), 0);
    }

    #[test]
    fn test_teams_serialize_by_team_key() {
        let teams = fresh_teams(&GameConfig::default());
        let json = serde_json::to_string(&teams).unwrap();
        assert!(json.contains("\"A\""));
        assert!(json.contains("\"D\""));
        let restored: Teams = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, teams);
    }
}
