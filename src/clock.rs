//! Countdown clock driver
//!
//! The engine never owns a timer. Instead it asks the host to deliver an
//! [`AlarmMessage`] after a delay and handles it in
//! [`crate::game::GameEngine::receive_alarm`]. Alarms cannot be recalled
//! once scheduled, so cancellation works by epoch: every alarm carries the
//! epoch it was scheduled under and is ignored if the epoch has moved on.

use enum_map::EnumMap;
use serde::{Deserialize, Serialize};
use web_time::Duration;

use crate::{AlarmMessage, teams::TeamId};

/// Tracks which team's clock is running and which alarms are still live
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClockDriver {
    active: Option<TeamId>,
    tick_epoch: u64,
    dare_epochs: EnumMap<TeamId, u64>,
}

impl ClockDriver {
    /// Starts the countdown for `team`, replacing any running countdown
    ///
    /// # Arguments
    ///
    /// * `team` - The team whose clock should run
    /// * `interval` - Delay until the first tick
    /// * `schedule_message` - Function to schedule the tick alarm
    pub fn start<S: FnMut(AlarmMessage, Duration)>(
        &mut self,
        team: TeamId,
        interval: Duration,
        mut schedule_message: S,
    ) {
        self.tick_epoch += 1;
        self.active = Some(team);
        schedule_message(
            AlarmMessage::Tick {
                team,
                epoch: self.tick_epoch,
            },
            interval,
        );
    }

    /// Stops the running countdown, if any
    ///
    /// # Returns
    ///
    /// The team that was active
    pub fn stop(&mut self) -> Option<TeamId> {
        self.tick_epoch += 1;
        self.active.take()
    }

    /// The team whose clock is running
    pub fn active(&self) -> Option<TeamId> {
        self.active
    }

    /// Whether a tick alarm is still current
    pub fn accepts_tick(&self, team: TeamId, epoch: u64) -> bool {
        self.active == Some(team) && self.tick_epoch == epoch
    }

    /// Schedules the next tick for the active team
    pub fn reschedule<S: FnMut(AlarmMessage, Duration)>(
        &self,
        interval: Duration,
        mut schedule_message: S,
    ) {
        if let Some(team) = self.active {
            schedule_message(
                AlarmMessage::Tick {
                    team,
                    epoch: self.tick_epoch,
                },
                interval,
            );
        }
    }

    /// Schedules a delayed dare for `team`, superseding one already pending
    pub fn schedule_dare<S: FnMut(AlarmMessage, Duration)>(
        &mut self,
        team: TeamId,
        delay: Duration,
        mut schedule_message: S,
    ) {
        self.dare_epochs[team] += 1;
        schedule_message(
            AlarmMessage::DareDue {
                team,
                epoch: self.dare_epochs[team],
            },
            delay,
        );
    }

    /// Whether a dare alarm is still current
    pub fn accepts_dare(&self, team: TeamId, epoch: u64) -> bool {
        self.dare_epochs[team] == epoch
    }

    /// Invalidates every pending dare alarm
    pub fn cancel_dares(&mut self) {
        for epoch in self.dare_epochs.values_mut() {
            *epoch += 1;
        }
    }

    /// Stops the countdown and invalidates every pending alarm
    pub fn cancel_all(&mut self) {
        self.stop();
        self.cancel_dares();
    }
}
