//! # Cognitive Clock Game Library
//!
//! This library provides the game-state engine for Cognitive Clock, a
//! host-run quiz game in which four teams race against their own countdown
//! clocks. It tracks each team's remaining time, points and single-use
//! lifelines and dares, resolves timeouts into elimination or a recovery
//! window, and deals questions in a category-rotating order.
//!
//! The engine is a single-writer state machine. It owns no timers: the host
//! schedules the [`AlarmMessage`]s the engine asks for and hands them back
//! when they fire.

#![cfg_attr(all(coverage_nightly, test), feature(coverage_attribute))]
#![deny(missing_docs)]
#![deny(rustdoc::missing_crate_level_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::struct_field_names)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::wildcard_imports)]
#![allow(clippy::struct_excessive_bools)]

use serde::{Deserialize, Serialize};

pub mod constants;

pub mod catalog;
pub mod clock;
pub mod config;
pub mod deck;
pub mod elimination;
pub mod game;
pub mod leaderboard;
pub mod persistence;
pub mod pool;
pub mod shuffler;
pub mod teams;

pub use game::{GameEngine, HostCommand, Outcome, UpdateMessage};

/// Alarm messages for timed events
///
/// The engine asks the host to deliver these after a delay. Each alarm
/// carries the epoch it was scheduled under, so an alarm that outlived the
/// countdown or dare it belonged to is recognised and ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlarmMessage {
    /// One period of the active team's countdown has elapsed
    Tick {
        /// The team whose clock is running
        team: teams::TeamId,
        /// Countdown epoch at scheduling time
        epoch: u64,
    },
    /// The delay after a streak of wrong answers is over
    DareDue {
        /// The team that owes a dare
        team: teams::TeamId,
        /// Dare epoch at scheduling time
        epoch: u64,
    },
}
