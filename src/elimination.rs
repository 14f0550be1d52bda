//! Timeout, fallback and elimination rules
//!
//! Pure decision functions over a [`TeamState`]. Nothing in this module
//! mutates state; the engine applies the decisions.

use garde::Validate;
use serde::{Deserialize, Serialize};

use crate::{config::validate_seconds, constants, teams::TeamState};

/// What should happen to a team whose clock just ran out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimeoutDecision {
    /// No lifelines and no dares remain
    pub should_eliminate: bool,
    /// At least one lifeline or dare remains
    pub can_use_fallback: bool,
    /// Lifelines left to spend
    pub remaining_lifelines: u32,
    /// Dares left to spend
    pub remaining_dares: u32,
}

/// Recovery actions open to a team, used to enable fallback controls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FallbackOptions {
    /// A lifeline can be spent
    pub can_use_lifeline: bool,
    /// A dare can be spent
    pub can_use_dare: bool,
    /// Lifelines left
    pub remaining_lifelines: u32,
    /// Dares left
    pub remaining_dares: u32,
}

/// Display classification of a team's clock
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, derive_more::Display)]
pub enum CriticalState {
    /// Plenty of time left
    Normal,
    /// Time is getting low
    Warning,
    /// Time is nearly gone
    Critical,
    /// The clock has run out
    Timeout,
    /// The team is out of the game
    Eliminated,
}

/// Boundaries between the [`CriticalState`] bands
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Validate)]
pub struct CriticalThresholds {
    /// At or below this many seconds the team is critical
    #[garde(custom(|v, _| validate_seconds("critical", v, 0.0, constants::team::MAX_INITIAL_TIME)))]
    pub critical: f64,
    /// At or below this many seconds the team is in warning
    #[garde(custom(|v, _| validate_seconds("warning", v, 0.0, constants::team::MAX_INITIAL_TIME)))]
    pub warning: f64,
}

impl Default for CriticalThresholds {
    fn default() -> Self {
        Self {
            critical: constants::critical::CRITICAL_SECONDS,
            warning: constants::critical::WARNING_SECONDS,
        }
    }
}

impl CriticalThresholds {
    /// Classifies a team; the first matching band wins
    pub fn classify(&self, team: &TeamState) -> CriticalState {
        if team.eliminated {
            CriticalState::Eliminated
        } else if team.time_remaining <= 0.0 {
            CriticalState::Timeout
        } else if team.time_remaining <= self.critical {
            CriticalState::Critical
        } else if team.time_remaining <= self.warning {
            CriticalState::Warning
        } else {
            CriticalState::Normal
        }
    }
}

/// Decides between elimination and a fallback window for a timed-out team
pub fn handle_timeout(team: &TeamState) -> TimeoutDecision {
    let has_lifelines = team.lifelines_used < team.max_lifelines;
    let has_dares = team.dares_used < team.max_dares;

    TimeoutDecision {
        should_eliminate: !has_lifelines && !has_dares,
        can_use_fallback: has_lifelines || has_dares,
        remaining_lifelines: if has_lifelines {
            team.remaining_lifelines()
        } else {
            0
        },
        remaining_dares: if has_dares { team.remaining_dares() } else { 0 },
    }
}

/// Remaining recovery resources, regardless of whether a timeout happened
pub fn fallback_options(team: &TeamState) -> FallbackOptions {
    let remaining_lifelines = team.remaining_lifelines();
    let remaining_dares = team.remaining_dares();

    FallbackOptions {
        can_use_lifeline: remaining_lifelines > 0,
        can_use_dare: remaining_dares > 0,
        remaining_lifelines,
        remaining_dares,
    }
}

/// Whether the team is inside an open fallback window with something to spend
pub fn can_use_fallback(team: &TeamState) -> bool {
    team.timeout_occurred
        && team.fallback_available
        && (team.lifelines_used < team.max_lifelines || team.dares_used < team.max_dares)
}

/// Whether a team at zero time has no way back
pub fn should_eliminate(team: &TeamState) -> bool {
    if team.time_remaining > 0.0 {
        return false;
    }
    team.eliminated || (team.timeout_occurred && !can_use_fallback(team))
}

/// Classifies a team with the default thresholds
pub fn critical_state(team: &TeamState) -> CriticalState {
    CriticalThresholds::default().classify(team)
}
