//! Answer stakes, final scores and standings
//!
//! This module holds the scoring side of the game: how much time and how
//! many points an answer is worth, how a team's final score is computed
//! from its remaining time and points, and the final standings shown when
//! the game ends.

use garde::Validate;
use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::{
    config::validate_seconds,
    constants,
    teams::{TeamId, Teams},
};

/// Time and point swing for one answer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Validate)]
pub struct Stakes {
    /// Seconds gained on a correct answer
    #[garde(custom(|v, _| validate_seconds("gain", v, 0.0, constants::stakes::MAX_SWING)))]
    pub gain: f64,
    /// Seconds lost on a wrong answer
    #[garde(custom(|v, _| validate_seconds("penalty", v, 0.0, constants::stakes::MAX_SWING)))]
    pub penalty: f64,
    /// Points earned on a correct answer
    #[garde(skip)]
    pub points: u64,
}

/// Stakes for normal answers and for answers under double or nothing
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Validate)]
pub struct StakesTable {
    /// Stakes when double or nothing is not armed
    #[garde(dive)]
    pub standard: Stakes,
    /// Stakes when double or nothing is armed
    #[garde(dive)]
    pub double_or_nothing: Stakes,
}

impl Default for StakesTable {
    fn default() -> Self {
        Self {
            standard: Stakes {
                gain: constants::stakes::STANDARD_GAIN,
                penalty: constants::stakes::STANDARD_PENALTY,
                points: constants::stakes::STANDARD_POINTS,
            },
            double_or_nothing: Stakes {
                gain: constants::stakes::DOUBLE_GAIN,
                penalty: constants::stakes::DOUBLE_PENALTY,
                points: constants::stakes::DOUBLE_POINTS,
            },
        }
    }
}

impl StakesTable {
    /// Picks the stakes for the next answer
    pub fn select(&self, double_or_nothing: bool) -> Stakes {
        if double_or_nothing {
            self.double_or_nothing
        } else {
            self.standard
        }
    }
}

/// Final score of a team: remaining seconds plus twice its points
pub fn final_score(time_remaining: f64, points: u64) -> f64 {
    time_remaining + (points * 2) as f64
}

/// Formats seconds as `m:ss`, dropping fractions
pub fn format_time(seconds: f64) -> String {
    let whole = seconds.max(0.0).floor() as u64;
    format!("{}:{:02}", whole / 60, whole % 60)
}

/// One row of the final standings
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Standing {
    /// The team
    pub team: TeamId,
    /// Seconds left when the game ended
    pub time_remaining: f64,
    /// `time_remaining` as `m:ss`
    pub display_time: String,
    /// Points earned
    pub points: u64,
    /// `time_remaining + points * 2`
    pub final_score: f64,
}

/// Final standings, best first
///
/// Ties keep roster order, so the first maximal team in A–D order wins.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Standings {
    /// Rows in descending score order
    entries: Vec<Standing>,
}

impl Standings {
    /// Computes the standings from the teams' final state
    pub fn compute(teams: &Teams) -> Self {
        let entries = teams
            .iter()
            .map(|(team, state)| Standing {
                team,
                time_remaining: state.time_remaining,
                display_time: format_time(state.time_remaining),
                points: state.points,
                final_score: final_score(state.time_remaining, state.points),
            })
            .sorted_by(|a, b| b.final_score.total_cmp(&a.final_score))
            .collect_vec();

        Self { entries }
    }

    /// The winning team
    pub fn winner(&self) -> Option<TeamId> {
        self.entries.first().map(|standing| standing.team)
    }

    /// All rows, best first
    pub fn entries(&self) -> &[Standing] {
        &self.entries
    }

    /// The row of a specific team
    pub fn get(&self, team: TeamId) -> Option<&Standing> {
        self.entries.iter().find(|standing| standing.team == team)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::{config::GameConfig, teams::fresh_teams};

    fn teams_with(scores: [(f64, u64); 4]) -> Teams {
        let mut teams = fresh_teams(&GameConfig::default());
        for (team, (time, points)) in TeamId::ALL.into_iter().zip(scores) {
            teams[team].time_remaining = time;
            teams[team].points = points;
        }
        teams
    }

    #[test]
    fn test_final_score() {
        assert!((final_score(40.0, 10) - 60.0).abs() < f64::EPSILON);
        assert!((final_score(0.0, 0)).abs() < f64::EPSILON);
    }

    #[test]
    fn test_standings_order_and_winner() {
        let standings = Standings::compute(&teams_with([
            (40.0, 10),
            (10.0, 30),
            (60.0, 0),
            (5.0, 5),
        ]));

        assert_eq!(standings.winner(), Some(TeamId::B));
        let scores: Vec<_> = TeamId::ALL
            .into_iter()
            .map(|team| standings.get(team).unwrap().final_score)
            .collect();
        assert_eq!(scores, vec![60.0, 70.0, 60.0, 15.0]);

        let order: Vec<_> = standings.entries().iter().map(|s| s.team).collect();
        assert_eq!(order, vec![TeamId::B, TeamId::A, TeamId::C, TeamId::D]);
        assert_eq!(standings.get(TeamId::C).unwrap().display_time, "1:00");
    }

    #[test]
    fn test_standings_tie_keeps_roster_order() {
        let standings = Standings::compute(&teams_with([
            (10.0, 0),
            (30.0, 0),
            (30.0, 0),
            (30.0, 0),
        ]));
        assert_eq!(standings.winner(), Some(TeamId::B));
    }

    #[test]
    fn test_stakes_selection() {
        let table = StakesTable::default();
        assert_eq!(table.select(false).points, 10);
        assert_eq!(table.select(true).points, 20);
        assert!((table.select(true).penalty - 20.0).abs() < f64::EPSILON);
        assert!(table.validate().is_ok());
    }

    #[test]
    fn test_format_time() {
        assert_eq!(format_time(0.0), "0:00");
        assert_eq!(format_time(65.7), "1:05");
        assert_eq!(format_time(120.0), "2:00");
        assert_eq!(format_time(-3.0), "0:00");
    }
}
