//! Lifeline catalog
//!
//! A lifeline is a single-use ability a team draws and then applies to
//! itself or an opponent. Its effect is plain data, a [`LifelineEffect`],
//! interpreted by the engine.

use garde::Validate;
use serde::{Deserialize, Serialize};

use crate::{
    config::validate_seconds,
    constants::lifeline::{
        BOOST_SECONDS, DRAIN_SECONDS, MAX_DESCRIPTION_LENGTH, MAX_EFFECT_SECONDS, MAX_NAME_LENGTH,
        STEAL_SECONDS,
    },
    pool::Identified,
};

fn validate_effect_seconds(val: &f64) -> garde::Result {
    validate_seconds("seconds", val, 0.0, MAX_EFFECT_SECONDS)
}

/// What a lifeline does when applied
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Validate)]
#[serde(tag = "kind")]
pub enum LifelineEffect {
    /// The acting team gains time, up to the gain cap
    AddSelfTime {
        /// Seconds gained
        #[garde(custom(|v, _| validate_effect_seconds(v)))]
        seconds: f64,
    },
    /// The target loses time, flooring at zero
    StealTime {
        /// Seconds removed
        #[garde(custom(|v, _| validate_effect_seconds(v)))]
        seconds: f64,
    },
    /// The acting team and the target exchange their remaining time
    SwapTime,
    /// The target's next assignment is skipped
    Freeze,
    /// Every opponent with time left loses up to `seconds`; the acting team
    /// gains the total, up to the gain cap
    DrainAll {
        /// Seconds drained from each opponent
        #[garde(custom(|v, _| validate_effect_seconds(v)))]
        seconds: f64,
    },
    /// The acting team's next answer is resolved with doubled stakes
    ArmDoubleOrNothing,
}

impl LifelineEffect {
    /// Whether the effect must name an opposing team
    pub fn requires_target(&self) -> bool {
        matches!(self, Self::StealTime { .. } | Self::SwapTime | Self::Freeze)
    }
}

/// A lifeline catalog entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Lifeline {
    /// Stable identifier
    #[garde(length(min = 1, max = MAX_NAME_LENGTH))]
    pub id: String,
    /// Display name
    #[garde(length(min = 1, max = MAX_NAME_LENGTH))]
    pub name: String,
    /// Display description
    #[garde(length(max = MAX_DESCRIPTION_LENGTH))]
    pub description: String,
    /// The effect applied
    #[garde(dive)]
    pub effect: LifelineEffect,
}

impl Lifeline {
    fn new(id: &str, name: &str, description: &str, effect: LifelineEffect) -> Self {
        Self {
            id: id.to_owned(),
            name: name.to_owned(),
            description: description.to_owned(),
            effect,
        }
    }

    /// Whether applying the lifeline needs a target team
    pub fn requires_target(&self) -> bool {
        self.effect.requires_target()
    }
}

impl Identified for Lifeline {
    fn id(&self) -> &str {
        &self.id
    }
}

/// The six standard lifelines
pub fn standard_catalog() -> Vec<Lifeline> {
    vec![
        Lifeline::new(
            "add-time-self",
            "Time Boost",
            "Add 10 seconds to your timer",
            LifelineEffect::AddSelfTime {
                seconds: BOOST_SECONDS,
            },
        ),
        Lifeline::new(
            "subtract-time-opponent",
            "Time Thief",
            "Subtract 10 seconds from an opponent",
            LifelineEffect::StealTime {
                seconds: STEAL_SECONDS,
            },
        ),
        Lifeline::new(
            "exchange-time",
            "Time Swap",
            "Exchange your remaining time with another team",
            LifelineEffect::SwapTime,
        ),
        Lifeline::new(
            "freeze-opponent",
            "Freeze",
            "Freeze an opponent's next turn",
            LifelineEffect::Freeze,
        ),
        Lifeline::new(
            "steal-from-all",
            "Mass Drain",
            "Steal 5 seconds from each opponent",
            LifelineEffect::DrainAll {
                seconds: DRAIN_SECONDS,
            },
        ),
        Lifeline::new(
            "double-or-nothing",
            "Double or Nothing",
            "Next answer: +20s & +20pts if correct, -20s if wrong",
            LifelineEffect::ArmDoubleOrNothing,
        ),
    ]
}
