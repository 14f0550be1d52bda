//! Game configuration
//!
//! Every rule value that the engine depends on (starting time, gain cap,
//! resource budgets, clock timing, answer stakes, critical thresholds and
//! the team color table) is gathered in [`GameConfig`], which is handed to
//! the engine at construction time. Defaults come from
//! [`crate::constants`].

use std::time::Duration;

use enum_map::{EnumMap, enum_map};
use garde::Validate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    constants,
    elimination::CriticalThresholds,
    leaderboard::StakesTable,
    teams::TeamId,
};

type ValidationResult = garde::Result;

/// Validates that a duration in milliseconds falls within specified bounds
///
/// # Generics
///
/// * `MIN_MILLIS` - The minimum allowed duration in milliseconds (inclusive).
/// * `MAX_MILLIS` - The maximum allowed duration in milliseconds (inclusive).
fn validate_millis<const MIN_MILLIS: u64, const MAX_MILLIS: u64>(
    field: &'static str,
    val: &Duration,
) -> ValidationResult {
    let millis = u64::try_from(val.as_millis()).unwrap_or(u64::MAX);
    if (MIN_MILLIS..=MAX_MILLIS).contains(&millis) {
        Ok(())
    } else {
        Err(garde::Error::new(format!(
            "{field} is outside of the bounds [{MIN_MILLIS}ms,{MAX_MILLIS}ms]",
        )))
    }
}

/// Validates that a number of seconds is finite and within `[min, max]`
pub(crate) fn validate_seconds(
    field: &'static str,
    val: &f64,
    min: f64,
    max: f64,
) -> ValidationResult {
    if val.is_finite() && (min..=max).contains(val) {
        Ok(())
    } else {
        Err(garde::Error::new(format!(
            "{field} is outside of the bounds [{min},{max}]"
        )))
    }
}

/// Display color assigned to a team
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamColor {
    /// Hex notation, e.g. `#3b82f6`
    pub hex: String,
    /// The same color as red, green and blue components
    pub rgb: [u8; 3],
}

impl TeamColor {
    fn new(hex: &str, rgb: [u8; 3]) -> Self {
        Self {
            hex: hex.to_owned(),
            rgb,
        }
    }
}

/// Errors raised while loading a configuration
#[derive(Debug, Error)]
pub enum Error {
    /// The configuration is not well-formed JSON for [`GameConfig`]
    #[error("malformed configuration: {0}")]
    Parse(#[from] serde_json::Error),
    /// The configuration parsed but violates a rule limit
    #[error("invalid configuration: {0}")]
    Invalid(garde::Report),
}

/// Rule values for a game session
#[serde_with::serde_as]
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct GameConfig {
    /// Seconds on every clock at the start of a game
    #[garde(custom(|v, _| validate_seconds("initial_time", v, 1.0, constants::team::MAX_INITIAL_TIME)))]
    pub initial_time: f64,
    /// Upper bound applied when a team gains time from answers and lifelines
    #[garde(custom(|v, _| validate_seconds("time_gain_cap", v, 1.0, constants::team::MAX_INITIAL_TIME)))]
    pub time_gain_cap: f64,
    /// Lifelines per team
    #[garde(range(max = constants::team::MAX_RESOURCE_LIMIT))]
    pub max_lifelines: u32,
    /// Dares per team
    #[garde(range(max = constants::team::MAX_RESOURCE_LIMIT))]
    pub max_dares: u32,
    /// Period of the countdown tick
    #[garde(custom(|v, _| validate_millis::<{ constants::clock::MIN_TICK_INTERVAL_MS }, { constants::clock::MAX_TICK_INTERVAL_MS }>("tick_interval", v)))]
    #[serde_as(as = "serde_with::DurationMilliSeconds<u64>")]
    pub tick_interval: Duration,
    /// Delay before a streak-triggered dare is presented
    #[garde(custom(|v, _| validate_millis::<0, { constants::clock::MAX_DARE_DELAY_MS }>("dare_delay", v)))]
    #[serde_as(as = "serde_with::DurationMilliSeconds<u64>")]
    pub dare_delay: Duration,
    /// Wrong answers in a row that trigger a dare
    #[garde(range(min = 1))]
    pub dare_streak: u32,
    /// Time and point swings for answers
    #[garde(dive)]
    pub stakes: StakesTable,
    /// Boundaries for the warning and critical display states
    #[garde(dive)]
    pub thresholds: CriticalThresholds,
    /// Display color of each team
    #[garde(skip)]
    pub colors: EnumMap<TeamId, TeamColor>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            initial_time: constants::team::INITIAL_TIME,
            time_gain_cap: constants::team::TIME_GAIN_CAP,
            max_lifelines: constants::team::MAX_LIFELINES,
            max_dares: constants::team::MAX_DARES,
            tick_interval: Duration::from_millis(constants::clock::TICK_INTERVAL_MS),
            dare_delay: Duration::from_millis(constants::clock::DARE_DELAY_MS),
            dare_streak: constants::team::DARE_STREAK,
            stakes: StakesTable::default(),
            thresholds: CriticalThresholds::default(),
            colors: enum_map! {
                TeamId::A => TeamColor::new("#3b82f6", [59, 130, 246]),
                TeamId::B => TeamColor::new("#60a5fa", [96, 165, 250]),
                TeamId::C => TeamColor::new("#93c5fd", [147, 197, 253]),
                TeamId::D => TeamColor::new("#2563eb", [37, 99, 235]),
            },
        }
    }
}

impl GameConfig {
    /// Parses and validates a configuration from JSON
    ///
    /// Missing fields take their default values.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Parse`] for malformed JSON and [`Error::Invalid`]
    /// when a value is outside its allowed bounds.
    pub fn from_json(json: &str) -> Result<Self, Error> {
        let config: Self = serde_json::from_str(json)?;
        config.validate().map_err(Error::Invalid)?;
        Ok(config)
    }

    /// Length of one clock tick in seconds
    pub fn tick_seconds(&self) -> f64 {
        self.tick_interval.as_secs_f64()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(GameConfig::default().validate().is_ok());
    }

    #[test]
    fn test_default_config_matches_constants() {
        let config = GameConfig::default();
        assert_eq!(config.max_lifelines, 3);
        assert_eq!(config.max_dares, 3);
        assert_eq!(config.tick_interval, Duration::from_millis(100));
        assert_eq!(config.dare_delay, Duration::from_millis(500));
        assert!((config.tick_seconds() - 0.1).abs() < 1e-9);
        assert_eq!(config.colors[TeamId::A].hex, "#3b82f6");
    }

    #[test]
    fn test_from_json_fills_defaults() {
        let config = GameConfig::from_json(r#"{"max_lifelines": 5, "tick_interval": 250}"#).unwrap();
        assert_eq!(config.max_lifelines, 5);
        assert_eq!(config.max_dares, 3);
        assert_eq!(config.tick_interval, Duration::from_millis(250));
    }

    #[test]
    fn test_from_json_rejects_malformed() {
        assert!(matches!(
            GameConfig::from_json("{not json"),
            Err(Error::Parse(_))
        ));
    }

    #[test]
    fn test_from_json_rejects_out_of_bounds() {
        assert!(matches!(
            GameConfig::from_json(r#"{"tick_interval": 5}"#),
            Err(Error::Invalid(_))
        ));
        assert!(matches!(
            GameConfig::from_json(r#"{"max_dares": 11}"#),
            Err(Error::Invalid(_))
        ));
        assert!(matches!(
            GameConfig::from_json(r#"{"initial_time": -1.0}"#),
            Err(Error::Invalid(_))
        ));
    }

    #[test]
    fn test_seconds_fields_are_bounded() {
        let mut config = GameConfig::default();
        config.time_gain_cap = 0.5;
        assert!(config.validate().is_err());

        let mut config = GameConfig::default();
        config.initial_time = f64::NAN;
        assert!(config.validate().is_err());

        let mut config = GameConfig::default();
        config.initial_time = 90.0;
        config.time_gain_cap = 45.0;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_round_trips_durations_as_millis() {
        let json = serde_json::to_string(&GameConfig::default()).unwrap();
        assert!(json.contains("\"tick_interval\":100"));
        assert!(json.contains("\"dare_delay\":500"));
    }
}
