//! Dare catalog
//!
//! Dares are short physical or verbal challenges. They are presented after
//! a streak of wrong answers, on host request, or as a fallback after a
//! timeout. Completing one grants its reward in seconds, which is not
//! subject to the gain cap.

use std::time::Duration;

use garde::Validate;
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

use crate::{
    constants::dare::{MAX_DESCRIPTION_LENGTH, MAX_HINT_LENGTH, MAX_REWARD},
    pool::Identified,
};

/// Kind of challenge, used for display grouping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DareKind {
    /// Speak on a topic or recite something
    Verbal,
    /// Solve a riddle
    Riddle,
    /// Say something kind about another player
    Appreciation,
    /// Act something out without speaking
    Acting,
    /// Recall a list under time pressure
    Memory,
}

/// A dare catalog entry
#[serde_with::serde_as]
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct Dare {
    /// Stable identifier
    #[garde(length(min = 1, max = MAX_HINT_LENGTH))]
    pub id: String,
    /// Kind of challenge
    #[garde(skip)]
    #[serde(rename = "type")]
    pub kind: DareKind,
    /// What the team has to do
    #[garde(length(min = 1, max = MAX_DESCRIPTION_LENGTH))]
    pub description: String,
    /// Hint shown on request (riddles)
    #[garde(length(max = MAX_HINT_LENGTH))]
    #[serde(default)]
    pub hint: Option<String>,
    /// Expected answer (riddles)
    #[garde(length(max = MAX_HINT_LENGTH))]
    #[serde(default)]
    pub answer: Option<String>,
    /// Suggested time limit, in whole seconds
    #[garde(skip)]
    #[serde_as(as = "Option<serde_with::DurationSeconds<u64>>")]
    pub duration: Option<Duration>,
    /// Seconds granted on completion
    #[garde(range(min = 1, max = MAX_REWARD))]
    pub reward: u32,
}

impl Dare {
    fn timed(id: &str, kind: DareKind, description: &str, seconds: u64, reward: u32) -> Self {
        Self {
            id: id.to_owned(),
            kind,
            description: description.to_owned(),
            hint: None,
            answer: None,
            duration: Some(Duration::from_secs(seconds)),
            reward,
        }
    }

    fn riddle(id: &str, description: &str, answer: &str, hint: &str, reward: u32) -> Self {
        Self {
            id: id.to_owned(),
            kind: DareKind::Riddle,
            description: description.to_owned(),
            hint: Some(hint.to_owned()),
            answer: Some(answer.to_owned()),
            duration: None,
            reward,
        }
    }

    /// Reward as seconds of clock time
    pub fn reward_seconds(&self) -> f64 {
        f64::from(self.reward)
    }
}

impl Identified for Dare {
    fn id(&self) -> &str {
        &self.id
    }
}

/// The ten standard dares
pub fn standard_catalog() -> Vec<Dare> {
    vec![
        Dare::timed(
            "explain-topic",
            DareKind::Verbal,
            "Explain in 30 seconds why teamwork is important",
            30,
            5,
        ),
        Dare::riddle(
            "riddle-1",
            "Solve this riddle: I speak without a mouth and hear without ears. I have no body, but come alive with wind. What am I?",
            "echo",
            "Think about sound",
            10,
        ),
        Dare::riddle(
            "riddle-2",
            "Solve this riddle: The more you take, the more you leave behind. What am I?",
            "footsteps",
            "Think about walking",
            10,
        ),
        Dare::timed(
            "appreciation",
            DareKind::Appreciation,
            "Say something you appreciate about each of the other players",
            45,
            5,
        ),
        Dare::timed(
            "silent-act-1",
            DareKind::Acting,
            "Act out \"brushing your teeth\" without speaking for 15 seconds",
            15,
            5,
        ),
        Dare::timed(
            "silent-act-2",
            DareKind::Acting,
            "Act out \"making a sandwich\" without speaking for 15 seconds",
            15,
            5,
        ),
        Dare::timed(
            "tongue-twister",
            DareKind::Verbal,
            "Say this 3 times fast: \"Red lorry, yellow lorry\"",
            20,
            10,
        ),
        Dare::timed(
            "memory",
            DareKind::Memory,
            "Name 5 countries that start with the letter \"C\" in 20 seconds",
            20,
            15,
        ),
        Dare::timed(
            "compliment",
            DareKind::Appreciation,
            "Give a genuine compliment to the player with the lowest score",
            15,
            5,
        ),
        Dare::riddle(
            "riddle-3",
            "Solve this riddle: What has keys but no locks, space but no room, and you can enter but not go inside?",
            "keyboard",
            "Think about computers",
            15,
        ),
    ]
}
