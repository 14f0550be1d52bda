//! Configuration constants for the Cognitive Clock game system
//!
//! This module contains the default rule values and the validation limits
//! used throughout the engine. Runtime values live in
//! [`crate::config::GameConfig`]; the constants here are its defaults and
//! the boundaries it is validated against.

/// Team roster and per-team resource defaults
pub mod team {
    /// Number of competing teams
    pub const COUNT: usize = 4;
    /// Seconds on every team's clock at the start of a game
    pub const INITIAL_TIME: f64 = 120.0;
    /// Upper bound applied whenever a team gains time from an answer or lifeline
    pub const TIME_GAIN_CAP: f64 = 60.0;
    /// Lifelines each team may use per game
    pub const MAX_LIFELINES: u32 = 3;
    /// Dares each team may use per game
    pub const MAX_DARES: u32 = 3;
    /// Consecutive wrong answers that trigger a dare
    pub const DARE_STREAK: u32 = 2;
    /// Largest configurable resource budget
    pub const MAX_RESOURCE_LIMIT: u32 = 10;
    /// Largest configurable starting time in seconds
    pub const MAX_INITIAL_TIME: f64 = 3600.0;
}

/// Clock driver timing
pub mod clock {
    /// Period of the countdown tick in milliseconds
    pub const TICK_INTERVAL_MS: u64 = 100;
    /// Delay between a second consecutive wrong answer and the dare it triggers
    pub const DARE_DELAY_MS: u64 = 500;
    /// Smallest configurable tick period in milliseconds
    pub const MIN_TICK_INTERVAL_MS: u64 = 10;
    /// Largest configurable tick period in milliseconds
    pub const MAX_TICK_INTERVAL_MS: u64 = 1000;
    /// Largest configurable dare delay in milliseconds
    pub const MAX_DARE_DELAY_MS: u64 = 10_000;
}

/// Answer stakes
pub mod stakes {
    /// Seconds gained for a correct answer
    pub const STANDARD_GAIN: f64 = 10.0;
    /// Seconds lost for a wrong answer
    pub const STANDARD_PENALTY: f64 = 5.0;
    /// Points for a correct answer
    pub const STANDARD_POINTS: u64 = 10;
    /// Seconds gained for a correct answer under double or nothing
    pub const DOUBLE_GAIN: f64 = 20.0;
    /// Seconds lost for a wrong answer under double or nothing
    pub const DOUBLE_PENALTY: f64 = 20.0;
    /// Points for a correct answer under double or nothing
    pub const DOUBLE_POINTS: u64 = 20;
    /// Largest configurable time swing for a single answer
    pub const MAX_SWING: f64 = 120.0;
}

/// Critical-state thresholds shown next to each team's clock
pub mod critical {
    /// At or below this many seconds a team is critical
    pub const CRITICAL_SECONDS: f64 = 10.0;
    /// At or below this many seconds a team is in warning
    pub const WARNING_SECONDS: f64 = 20.0;
}

/// Resource pool behaviour
pub mod pool {
    /// Number of recent draws remembered across pool resets
    pub const HISTORY_LENGTH: usize = 3;
}

/// Question bank limits
pub mod question {
    /// Every question has exactly this many options
    pub const OPTION_COUNT: usize = 4;
    /// Highest valid correct-option index
    pub const MAX_ANSWER_INDEX: usize = OPTION_COUNT - 1;
    /// Maximum length of a question prompt
    pub const MAX_TEXT_LENGTH: usize = 300;
    /// Maximum length of a single option
    pub const MAX_OPTION_LENGTH: usize = 200;
    /// Maximum length of a category label
    pub const MAX_CATEGORY_LENGTH: usize = 60;
}

/// Lifeline catalog limits and effect magnitudes
pub mod lifeline {
    /// Seconds added by "Time Boost"
    pub const BOOST_SECONDS: f64 = 10.0;
    /// Seconds removed by "Time Thief"
    pub const STEAL_SECONDS: f64 = 10.0;
    /// Seconds drained from every opponent by "Mass Drain"
    pub const DRAIN_SECONDS: f64 = 5.0;
    /// Largest configurable effect magnitude
    pub const MAX_EFFECT_SECONDS: f64 = 60.0;
    /// Maximum length of a lifeline name
    pub const MAX_NAME_LENGTH: usize = 40;
    /// Maximum length of a lifeline description
    pub const MAX_DESCRIPTION_LENGTH: usize = 200;
}

/// Dare catalog limits
pub mod dare {
    /// Maximum length of a dare description
    pub const MAX_DESCRIPTION_LENGTH: usize = 300;
    /// Maximum length of a hint or riddle answer
    pub const MAX_HINT_LENGTH: usize = 100;
    /// Largest reward a dare may grant, in seconds
    pub const MAX_REWARD: u32 = 60;
}
