//! Core game logic and state management
//!
//! This module contains the [`GameEngine`], the single owner of every team
//! record, both resource pools, the question deck and the clock driver.
//! The host drives it with [`HostCommand`]s and delivers scheduled
//! [`AlarmMessage`]s back to it; the engine answers every command with an
//! [`Outcome`] and queues [`UpdateMessage`]s for the presentation layer.
//!
//! Commands that do not make sense in the current state are declined and
//! leave the state untouched. Every applied command saves the team records
//! through the engine's [`SnapshotStore`].

use enum_map::EnumMap;
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use web_time::{Duration, SystemTime};

use crate::{
    AlarmMessage,
    catalog::{self, Catalogs, Dare, Lifeline, LifelineEffect, Question},
    clock::ClockDriver,
    config::GameConfig,
    deck::QuestionDeck,
    elimination::{self, CriticalState, TimeoutDecision},
    leaderboard::Standings,
    persistence::{self, MemoryStore, SnapshotStore},
    pool::{PoolStats, ResourcePool},
    teams::{TeamId, TeamState, Teams, fresh_teams},
};

/// Whether the game accepts commands
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    /// Commands are accepted
    #[default]
    Playing,
    /// The game has ended; only a restart is accepted
    Ended,
}

/// Commands issued by the host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum HostCommand {
    /// Give the current question to a team and start its clock
    AssignQuestion(TeamId),
    /// Judge the active team's answer
    SubmitAnswer {
        /// The answering team
        team: TeamId,
        /// Whether the answer was correct
        correct: bool,
    },
    /// Draw a lifeline for a team
    DrawLifeline(TeamId),
    /// Apply a lifeline; the drawn one unless `lifeline` names another
    ApplyLifeline {
        /// The acting team
        team: TeamId,
        /// Opponent for targeted lifelines
        target: Option<TeamId>,
        /// Catalog id of the lifeline to apply
        lifeline: Option<String>,
    },
    /// Put the drawn lifeline back without using it
    CancelLifeline,
    /// Present a dare to a team
    TriggerDare(TeamId),
    /// Record a completed dare; the presented one unless `dare` names another
    CompleteDare {
        /// The team that completed it
        team: TeamId,
        /// Catalog id of the dare
        dare: Option<String>,
    },
    /// Dismiss the presented dare without completing it
    CloseDare,
    /// Spend a lifeline to recover from a timeout
    FallbackUseLifeline(TeamId),
    /// Spend a dare to recover from a timeout
    FallbackUseDare(TeamId),
    /// Remove a team from the game
    Eliminate(TeamId),
    /// Release a locked team
    Unlock(TeamId),
    /// Move to the next question
    NextQuestion,
    /// Move to the previous question
    PreviousQuestion,
    /// Show or hide the options
    ToggleOptions,
    /// Show or hide the correct answer
    ToggleAnswer,
    /// Finish the game and compute the standings
    EndGame,
    /// Start over with fresh teams and pools
    Restart,
}

/// Why a command was declined
#[derive(Debug, Clone, PartialEq, Eq, Serialize, derive_more::Display)]
pub enum Reason {
    /// The game has ended
    #[display("the game has ended")]
    GameOver,
    /// The team is out of the game
    #[display("team is eliminated")]
    TeamEliminated,
    /// The team is locked
    #[display("team is locked")]
    TeamLocked,
    /// The team is not locked
    #[display("team is not locked")]
    NotLocked,
    /// The team is not answering a question
    #[display("team is not active")]
    NotActive,
    /// The team's lifeline budget is spent or it may not draw now
    #[display("no lifeline available")]
    NoLifelinesLeft,
    /// The team's dare budget is spent
    #[display("no dare available")]
    NoDaresLeft,
    /// A drawn lifeline is waiting to be applied or cancelled
    #[display("a lifeline is already drawn")]
    LifelinePending,
    /// No lifeline was drawn for the team and none was named
    #[display("no lifeline to apply")]
    NoLifeline,
    /// No dare was presented to the team and none was named
    #[display("no dare to complete")]
    NoDare,
    /// The named catalog entry does not exist
    #[display("unknown catalog entry {_0}")]
    UnknownEntry(String),
    /// A targeted lifeline was applied without a target
    #[display("lifeline needs a target")]
    TargetRequired,
    /// A lifeline targeted the acting team
    #[display("a team cannot target itself")]
    InvalidTarget,
    /// The team has no open fallback window
    #[display("no fallback available")]
    NoFallback,
    /// The deck cannot move further in that direction
    #[display("no more questions that way")]
    EndOfDeck,
    /// The catalog has nothing to draw
    #[display("catalog is empty")]
    CatalogEmpty,
    /// A clock amount was negative or not a number
    #[display("invalid amount of time")]
    InvalidDuration,
}

/// Result of a command or alarm
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Outcome {
    /// The state changed
    Applied,
    /// The state is unchanged
    Declined(Reason),
}

impl Outcome {
    /// Whether the command took effect
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied)
    }
}

/// Resource spent to recover from a timeout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Resource {
    /// A lifeline
    Lifeline,
    /// A dare
    Dare,
}

/// A lifeline drawn and not yet applied
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PendingLifeline {
    /// The team that drew it
    pub team: TeamId,
    /// The lifeline
    pub lifeline: Lifeline,
}

/// A dare presented and not yet completed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PresentedDare {
    /// The team it was presented to
    pub team: TeamId,
    /// The dare
    pub dare: Dare,
}

/// Events for the presentation layer
#[derive(Debug, Clone, Serialize)]
pub enum UpdateMessage {
    /// A team received a question and its clock started
    QuestionAssigned {
        /// The team
        team: TeamId,
        /// Position of the question in the deck
        index: usize,
    },
    /// A frozen team's turn was skipped
    FreezeConsumed(TeamId),
    /// An answer was judged
    AnswerResolved {
        /// The team
        team: TeamId,
        /// Whether it was correct
        correct: bool,
        /// Seconds left afterwards
        time_remaining: f64,
        /// Points afterwards
        points: u64,
    },
    /// A wrong answer cost the team time
    TimePenalty(TeamId),
    /// A team's clock ran out and it may spend a fallback
    TimedOut {
        /// The team
        team: TeamId,
        /// What the team has left to recover with
        decision: TimeoutDecision,
    },
    /// A team is out of the game
    Eliminated(TeamId),
    /// A lifeline was drawn
    LifelineDrawn {
        /// The drawing team
        team: TeamId,
        /// The lifeline
        lifeline: Lifeline,
    },
    /// A lifeline took effect
    LifelineApplied {
        /// The acting team
        team: TeamId,
        /// The lifeline's id
        lifeline: String,
        /// Human-readable account of the effect
        summary: String,
    },
    /// A dare was presented
    DarePresented {
        /// The team
        team: TeamId,
        /// The dare
        dare: Dare,
    },
    /// A dare was completed
    DareCompleted {
        /// The team
        team: TeamId,
        /// Seconds granted
        reward: u32,
    },
    /// A team recovered from a timeout
    FallbackUsed {
        /// The team
        team: TeamId,
        /// What it spent
        resource: Resource,
    },
    /// A team was unlocked by the host
    Unlocked(TeamId),
    /// The deck moved
    QuestionChanged {
        /// New position
        index: usize,
        /// Deck size
        count: usize,
    },
    /// The option or answer display changed
    RevealChanged {
        /// Options shown
        options: bool,
        /// Answer shown
        answer: bool,
    },
    /// The game ended
    GameOver(Standings),
    /// The game was restarted
    Restarted,
}

impl UpdateMessage {
    /// Converts the update message to a JSON string for transmission
    ///
    /// # Panics
    ///
    /// This method panics if serialization fails, which should never happen
    /// with the default JSON serializer for well-formed data.
    pub fn to_message(&self) -> String {
        serde_json::to_string(self).expect("default serializer cannot fail")
    }
}

/// The question currently on screen
#[derive(Debug, Clone, Serialize)]
pub struct QuestionView {
    /// Position in the deck
    pub index: usize,
    /// Deck size
    pub count: usize,
    /// The question
    pub question: Question,
    /// Options shown
    pub options_shown: bool,
    /// Answer shown
    pub answer_shown: bool,
}

/// Everything the presentation layer needs to draw the game
#[serde_with::serde_as]
#[skip_serializing_none]
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    /// Whether the game is running
    pub phase: Phase,
    /// Every team's record
    pub teams: Teams,
    /// Display band of every team's clock
    pub critical: EnumMap<TeamId, CriticalState>,
    /// The team whose clock is running
    pub active_team: Option<TeamId>,
    /// Time since the active team received its question
    #[serde_as(as = "Option<serde_with::DurationMilliSeconds<u64>>")]
    pub elapsed: Option<Duration>,
    /// The question on screen
    pub question: Option<QuestionView>,
    /// A drawn lifeline awaiting application
    pub pending_lifeline: Option<PendingLifeline>,
    /// A presented dare awaiting completion
    pub presented_dare: Option<PresentedDare>,
    /// Final standings once the game has ended
    pub standings: Option<Standings>,
}

/// The authoritative game state and its rules
pub struct GameEngine<S: SnapshotStore = MemoryStore> {
    config: GameConfig,
    catalogs: Catalogs,
    teams: Teams,
    lifelines: ResourcePool<Lifeline>,
    dares: ResourcePool<Dare>,
    deck: QuestionDeck,
    clock: ClockDriver,
    phase: Phase,
    pending_lifeline: Option<PendingLifeline>,
    presented_dare: Option<PresentedDare>,
    question_started: Option<SystemTime>,
    standings: once_cell_serde::sync::OnceCell<Standings>,
    updates: Vec<UpdateMessage>,
    store: S,
}

impl GameEngine<MemoryStore> {
    /// An engine with the default rules, the bundled catalogs and no
    /// durable storage
    ///
    /// # Errors
    ///
    /// Fails only if the bundled catalogs are corrupt.
    pub fn with_defaults() -> Result<Self, catalog::Error> {
        Ok(Self::new(
            GameConfig::default(),
            Catalogs::bundled()?,
            MemoryStore::default(),
        ))
    }
}

impl<S: SnapshotStore> GameEngine<S> {
    /// Creates an engine, resuming saved teams from `store` when they are
    /// eligible
    ///
    /// # Arguments
    ///
    /// * `config` - Rule values, expected to be validated already
    /// * `catalogs` - Questions, lifelines and dares
    /// * `store` - Where team snapshots are saved
    pub fn new(config: GameConfig, catalogs: Catalogs, store: S) -> Self {
        let teams = persistence::restore_teams(&store, &config);
        let lifelines = ResourcePool::new(&catalogs.lifelines);
        let dares = ResourcePool::new(&catalogs.dares);
        let deck = QuestionDeck::shuffled(catalogs.questions.questions());

        tracing::info!(
            questions = deck.len(),
            lifelines = catalogs.lifelines.len(),
            dares = catalogs.dares.len(),
            "game ready"
        );

        Self {
            config,
            catalogs,
            teams,
            lifelines,
            dares,
            deck,
            clock: ClockDriver::default(),
            phase: Phase::Playing,
            pending_lifeline: None,
            presented_dare: None,
            question_started: None,
            standings: once_cell_serde::sync::OnceCell::new(),
            updates: Vec::new(),
            store,
        }
    }

    /// Dispatches a host command
    ///
    /// # Arguments
    ///
    /// * `command` - The command to execute
    /// * `schedule_message` - Function to schedule clock and dare alarms
    pub fn receive_command<F: FnMut(AlarmMessage, Duration)>(
        &mut self,
        command: HostCommand,
        schedule_message: F,
    ) -> Outcome {
        match command {
            HostCommand::AssignQuestion(team) => self.assign_question(team, schedule_message),
            HostCommand::SubmitAnswer { team, correct } => {
                self.submit_answer(team, correct, schedule_message)
            }
            HostCommand::DrawLifeline(team) => self.draw_lifeline(team),
            HostCommand::ApplyLifeline {
                team,
                target,
                lifeline,
            } => self.apply_lifeline(team, target, lifeline.as_deref()),
            HostCommand::CancelLifeline => self.cancel_lifeline(),
            HostCommand::TriggerDare(team) => self.trigger_dare(team),
            HostCommand::CompleteDare { team, dare } => self.complete_dare(team, dare.as_deref()),
            HostCommand::CloseDare => self.close_dare(),
            HostCommand::FallbackUseLifeline(team) => self.fallback_use_lifeline(team),
            HostCommand::FallbackUseDare(team) => self.fallback_use_dare(team),
            HostCommand::Eliminate(team) => self.eliminate(team),
            HostCommand::Unlock(team) => self.unlock(team),
            HostCommand::NextQuestion => self.next_question(),
            HostCommand::PreviousQuestion => self.previous_question(),
            HostCommand::ToggleOptions => self.toggle_options(),
            HostCommand::ToggleAnswer => self.toggle_answer(),
            HostCommand::EndGame => self.end_game(),
            HostCommand::Restart => self.restart(),
        }
    }

    /// Handles an alarm scheduled earlier by the engine
    ///
    /// Alarms from a stopped countdown or a cancelled dare are ignored.
    ///
    /// # Arguments
    ///
    /// * `message` - The alarm being delivered
    /// * `schedule_message` - Function to schedule the next tick
    pub fn receive_alarm<F: FnMut(AlarmMessage, Duration)>(
        &mut self,
        message: AlarmMessage,
        schedule_message: F,
    ) -> Outcome {
        match message {
            AlarmMessage::Tick { team, epoch } => {
                if !self.clock.accepts_tick(team, epoch) {
                    return Outcome::Declined(Reason::NotActive);
                }
                let outcome = self.tick(team, self.config.tick_seconds());
                self.clock
                    .reschedule(self.config.tick_interval, schedule_message);
                outcome
            }
            AlarmMessage::DareDue { team, epoch } => {
                if !self.clock.accepts_dare(team, epoch) {
                    return Outcome::Declined(Reason::NoDare);
                }
                self.trigger_dare(team)
            }
        }
    }

    /// Gives the current question to `team` and starts its countdown
    ///
    /// A frozen team instead has its freeze consumed and receives nothing.
    /// Assigning while another team is active moves the clock to `team`.
    pub fn assign_question<F: FnMut(AlarmMessage, Duration)>(
        &mut self,
        team: TeamId,
        schedule_message: F,
    ) -> Outcome {
        if let Err(reason) = self.check_playing() {
            return self.decline(reason);
        }
        let state = &mut self.teams[team];
        if !state.is_assignable() {
            let reason = if state.eliminated {
                Reason::TeamEliminated
            } else {
                Reason::TeamLocked
            };
            return self.decline(reason);
        }

        if state.frozen {
            state.frozen = false;
            tracing::info!(%team, "frozen turn skipped");
            self.updates.push(UpdateMessage::FreezeConsumed(team));
            return self.applied();
        }

        self.clock
            .start(team, self.config.tick_interval, schedule_message);
        self.question_started = Some(SystemTime::now());
        tracing::info!(%team, index = self.deck.index(), "question assigned");
        self.updates.push(UpdateMessage::QuestionAssigned {
            team,
            index: self.deck.index(),
        });
        self.applied()
    }

    /// Counts `seconds` off the active team's clock
    ///
    /// Reaching zero stops the clock and resolves the timeout.
    /// Negative or non-finite amounts are declined.
    pub fn tick(&mut self, team: TeamId, seconds: f64) -> Outcome {
        if let Err(reason) = self.check_playing() {
            return self.decline(reason);
        }
        if !seconds.is_finite() || seconds < 0.0 {
            return self.decline(Reason::InvalidDuration);
        }
        if self.clock.active() != Some(team) {
            return self.decline(Reason::NotActive);
        }
        let state = &mut self.teams[team];
        if state.eliminated {
            return self.decline(Reason::TeamEliminated);
        }
        if state.locked {
            return self.decline(Reason::TeamLocked);
        }

        let remaining = (state.time_remaining - seconds).max(0.0);
        if remaining <= 0.0 {
            self.time_out(team);
        } else {
            state.time_remaining = remaining;
        }
        self.applied()
    }

    /// Judges the active team's answer
    ///
    /// The stakes are doubled when double or nothing is armed. A wrong answer
    /// that completes a streak schedules a dare after the configured delay.
    pub fn submit_answer<F: FnMut(AlarmMessage, Duration)>(
        &mut self,
        team: TeamId,
        correct: bool,
        schedule_message: F,
    ) -> Outcome {
        if let Err(reason) = self.check_playing() {
            return self.decline(reason);
        }
        if self.clock.active() != Some(team) {
            return self.decline(Reason::NotActive);
        }

        self.clock.stop();
        self.question_started = None;

        let cap = self.config.time_gain_cap;
        let state = &mut self.teams[team];
        let stakes = self.config.stakes.select(state.double_or_nothing);
        let before = state.time_remaining;
        state.double_or_nothing = false;

        if correct {
            state.gain_time(stakes.gain, cap);
            state.points += stakes.points;
            state.consecutive_wrong = 0;
        } else {
            state.lose_time(stakes.penalty);
            state.consecutive_wrong += 1;
        }

        let streak = state.consecutive_wrong;
        let (time_remaining, points) = (state.time_remaining, state.points);
        tracing::info!(%team, correct, time_remaining, points, "answer resolved");
        self.updates.push(UpdateMessage::AnswerResolved {
            team,
            correct,
            time_remaining,
            points,
        });

        if !correct {
            self.updates.push(UpdateMessage::TimePenalty(team));
            if streak >= self.config.dare_streak {
                self.clock
                    .schedule_dare(team, self.config.dare_delay, schedule_message);
            }
            if before > 0.0 && time_remaining <= 0.0 {
                self.time_out(team);
            }
        }

        self.applied()
    }

    /// Draws a lifeline for `team` and holds it until applied or cancelled
    pub fn draw_lifeline(&mut self, team: TeamId) -> Outcome {
        if let Err(reason) = self.check_playing() {
            return self.decline(reason);
        }
        if self.pending_lifeline.is_some() {
            return self.decline(Reason::LifelinePending);
        }
        if !self.teams[team].can_use_lifeline() {
            return self.decline(Reason::NoLifelinesLeft);
        }

        let Ok(lifeline) = self.lifelines.draw_with_auto_reset(&self.catalogs.lifelines) else {
            return self.decline(Reason::CatalogEmpty);
        };

        tracing::info!(%team, lifeline = %lifeline.id, "lifeline drawn");
        self.updates.push(UpdateMessage::LifelineDrawn {
            team,
            lifeline: lifeline.clone(),
        });
        self.pending_lifeline = Some(PendingLifeline { team, lifeline });
        self.applied()
    }

    /// Applies a lifeline for `team` and counts it against its budget
    ///
    /// # Arguments
    ///
    /// * `team` - The acting team
    /// * `target` - The opponent, required by targeted lifelines and
    ///   ignored by the others
    /// * `lifeline` - Catalog id to apply; `None` applies the lifeline
    ///   `team` drew
    pub fn apply_lifeline(
        &mut self,
        team: TeamId,
        target: Option<TeamId>,
        lifeline: Option<&str>,
    ) -> Outcome {
        if let Err(reason) = self.check_playing() {
            return self.decline(reason);
        }
        let state = &self.teams[team];
        if state.eliminated {
            return self.decline(Reason::TeamEliminated);
        }
        if state.remaining_lifelines() == 0 {
            return self.decline(Reason::NoLifelinesLeft);
        }

        let lifeline = match lifeline {
            Some(id) => match self.catalogs.lifelines.iter().find(|l| l.id == id) {
                Some(lifeline) => lifeline.clone(),
                None => return self.decline(Reason::UnknownEntry(id.to_owned())),
            },
            None => match &self.pending_lifeline {
                Some(pending) if pending.team == team => pending.lifeline.clone(),
                _ => return self.decline(Reason::NoLifeline),
            },
        };

        let target = if lifeline.requires_target() {
            match target {
                Some(target) if target == team => return self.decline(Reason::InvalidTarget),
                Some(target) => Some(target),
                None => return self.decline(Reason::TargetRequired),
            }
        } else {
            None
        };

        let before = EnumMap::from_fn(|t| self.teams[t].time_remaining);
        let Some(summary) = self.resolve_effect(lifeline.effect, team, target) else {
            return self.decline(Reason::TargetRequired);
        };
        self.teams[team].lifelines_used += 1;

        if self
            .pending_lifeline
            .as_ref()
            .is_some_and(|pending| pending.team == team && pending.lifeline.id == lifeline.id)
        {
            self.pending_lifeline = None;
        }

        tracing::info!(%team, lifeline = %lifeline.id, %summary, "lifeline applied");
        self.updates.push(UpdateMessage::LifelineApplied {
            team,
            lifeline: lifeline.id,
            summary,
        });
        self.settle_zeroed(&before);
        self.applied()
    }

    /// Executes a lifeline effect and describes what happened
    ///
    /// # Returns
    ///
    /// `None` if a targeted effect has no target
    fn resolve_effect(
        &mut self,
        effect: LifelineEffect,
        team: TeamId,
        target: Option<TeamId>,
    ) -> Option<String> {
        let cap = self.config.time_gain_cap;
        let summary = match (effect, target) {
            (LifelineEffect::AddSelfTime { seconds }, _) => {
                self.teams[team].gain_time(seconds, cap);
                format!("{team} gained {seconds} seconds!")
            }
            (LifelineEffect::StealTime { seconds }, Some(target)) => {
                self.teams[target].lose_time(seconds);
                format!("{team} stole {seconds} seconds from {target}!")
            }
            (LifelineEffect::SwapTime, Some(target)) => {
                let theirs = self.teams[target].time_remaining;
                self.teams[target].time_remaining = self.teams[team].time_remaining;
                self.teams[team].time_remaining = theirs;
                format!("{team} and {target} swapped times!")
            }
            (LifelineEffect::Freeze, Some(target)) => {
                self.teams[target].frozen = true;
                if self.clock.active() == Some(target) {
                    self.clock.stop();
                    self.question_started = None;
                }
                format!("{target} is frozen for their next turn!")
            }
            (LifelineEffect::DrainAll { seconds }, _) => {
                let mut drained = 0.0;
                for opponent in team.opponents() {
                    if self.teams[opponent].time_remaining > 0.0 {
                        drained += self.teams[opponent].lose_time(seconds);
                    }
                }
                self.teams[team].gain_time(drained, cap);
                format!("{team} stole {drained} seconds from opponents!")
            }
            (LifelineEffect::ArmDoubleOrNothing, _) => {
                self.teams[team].double_or_nothing = true;
                format!("{team} activated Double or Nothing!")
            }
            (
                LifelineEffect::StealTime { .. } | LifelineEffect::SwapTime | LifelineEffect::Freeze,
                None,
            ) => return None,
        };
        Some(summary)
    }

    /// Discards the drawn lifeline without using it
    pub fn cancel_lifeline(&mut self) -> Outcome {
        if let Err(reason) = self.check_playing() {
            return self.decline(reason);
        }
        if self.pending_lifeline.take().is_none() {
            return self.decline(Reason::NoLifeline);
        }
        self.applied()
    }

    /// Draws a dare and presents it to `team`
    ///
    /// A newly presented dare replaces one still on screen. Presenting does
    /// not touch the dare budget; only completion does.
    pub fn trigger_dare(&mut self, team: TeamId) -> Outcome {
        if let Err(reason) = self.check_playing() {
            return self.decline(reason);
        }
        if self.teams[team].eliminated {
            return self.decline(Reason::TeamEliminated);
        }

        let Ok(dare) = self.dares.draw_with_auto_reset(&self.catalogs.dares) else {
            return self.decline(Reason::CatalogEmpty);
        };

        tracing::info!(%team, dare = %dare.id, "dare presented");
        self.updates.push(UpdateMessage::DarePresented {
            team,
            dare: dare.clone(),
        });
        self.presented_dare = Some(PresentedDare { team, dare });
        self.applied()
    }

    /// Records a completed dare and grants its reward
    ///
    /// The reward is not limited by the gain cap.
    ///
    /// # Arguments
    ///
    /// * `team` - The team that completed the dare
    /// * `dare` - Catalog id of the dare; `None` uses the dare presented to
    ///   `team`
    pub fn complete_dare(&mut self, team: TeamId, dare: Option<&str>) -> Outcome {
        if let Err(reason) = self.check_playing() {
            return self.decline(reason);
        }
        if !self.teams[team].can_use_dare() {
            return self.decline(Reason::NoDaresLeft);
        }

        let dare = match dare {
            Some(id) => match self.catalogs.dares.iter().find(|d| d.id == id) {
                Some(dare) => dare.clone(),
                None => return self.decline(Reason::UnknownEntry(id.to_owned())),
            },
            None => match &self.presented_dare {
                Some(presented) if presented.team == team => presented.dare.clone(),
                _ => return self.decline(Reason::NoDare),
            },
        };

        let state = &mut self.teams[team];
        state.dares_used += 1;
        state.consecutive_wrong = 0;
        state.add_uncapped(dare.reward_seconds());

        if self
            .presented_dare
            .as_ref()
            .is_some_and(|presented| presented.team == team)
        {
            self.presented_dare = None;
        }

        tracing::info!(%team, dare = %dare.id, reward = dare.reward, "dare completed");
        self.updates.push(UpdateMessage::DareCompleted {
            team,
            reward: dare.reward,
        });
        self.applied()
    }

    /// Dismisses the presented dare without completing it
    pub fn close_dare(&mut self) -> Outcome {
        if let Err(reason) = self.check_playing() {
            return self.decline(reason);
        }
        if self.presented_dare.take().is_none() {
            return self.decline(Reason::NoDare);
        }
        self.applied()
    }

    /// Spends a lifeline to close `team`'s fallback window
    pub fn fallback_use_lifeline(&mut self, team: TeamId) -> Outcome {
        self.use_fallback(team, Resource::Lifeline)
    }

    /// Spends a dare to close `team`'s fallback window
    pub fn fallback_use_dare(&mut self, team: TeamId) -> Outcome {
        self.use_fallback(team, Resource::Dare)
    }

    fn use_fallback(&mut self, team: TeamId, resource: Resource) -> Outcome {
        if let Err(reason) = self.check_playing() {
            return self.decline(reason);
        }
        let state = &mut self.teams[team];
        if !state.fallback_available {
            return self.decline(Reason::NoFallback);
        }

        match resource {
            Resource::Lifeline if state.remaining_lifelines() > 0 => state.lifelines_used += 1,
            Resource::Dare if state.remaining_dares() > 0 => state.dares_used += 1,
            Resource::Lifeline => return self.decline(Reason::NoLifelinesLeft),
            Resource::Dare => return self.decline(Reason::NoDaresLeft),
        }
        state.fallback_available = false;
        state.timeout_occurred = false;
        state.locked = false;

        tracing::info!(%team, ?resource, "recovered from timeout");
        self.updates
            .push(UpdateMessage::FallbackUsed { team, resource });
        self.applied()
    }

    /// Removes `team` from the game
    pub fn eliminate(&mut self, team: TeamId) -> Outcome {
        if let Err(reason) = self.check_playing() {
            return self.decline(reason);
        }
        if self.teams[team].eliminated {
            return self.decline(Reason::TeamEliminated);
        }

        self.teams[team].eliminate();
        if self.clock.active() == Some(team) {
            self.clock.stop();
            self.question_started = None;
        }
        tracing::info!(%team, "team eliminated by host");
        self.updates.push(UpdateMessage::Eliminated(team));
        self.applied()
    }

    /// Releases a locked team, closing any fallback window
    pub fn unlock(&mut self, team: TeamId) -> Outcome {
        if let Err(reason) = self.check_playing() {
            return self.decline(reason);
        }
        let state = &mut self.teams[team];
        if state.eliminated {
            return self.decline(Reason::TeamEliminated);
        }
        if !state.locked {
            return self.decline(Reason::NotLocked);
        }

        state.locked = false;
        state.timeout_occurred = false;
        state.fallback_available = false;
        tracing::info!(%team, "team unlocked by host");
        self.updates.push(UpdateMessage::Unlocked(team));
        self.applied()
    }

    /// Moves the deck forward
    pub fn next_question(&mut self) -> Outcome {
        self.navigate(QuestionDeck::next)
    }

    /// Moves the deck back
    pub fn previous_question(&mut self) -> Outcome {
        self.navigate(QuestionDeck::previous)
    }

    fn navigate(&mut self, step: fn(&mut QuestionDeck) -> bool) -> Outcome {
        if let Err(reason) = self.check_playing() {
            return self.decline(reason);
        }
        if !step(&mut self.deck) {
            return self.decline(Reason::EndOfDeck);
        }
        self.updates.push(UpdateMessage::QuestionChanged {
            index: self.deck.index(),
            count: self.deck.len(),
        });
        self.applied()
    }

    /// Shows or hides the options
    pub fn toggle_options(&mut self) -> Outcome {
        self.reveal(QuestionDeck::toggle_options)
    }

    /// Shows or hides the correct answer
    pub fn toggle_answer(&mut self) -> Outcome {
        self.reveal(QuestionDeck::toggle_answer)
    }

    fn reveal(&mut self, toggle: fn(&mut QuestionDeck) -> bool) -> Outcome {
        if let Err(reason) = self.check_playing() {
            return self.decline(reason);
        }
        toggle(&mut self.deck);
        self.updates.push(UpdateMessage::RevealChanged {
            options: self.deck.options_shown(),
            answer: self.deck.answer_shown(),
        });
        self.applied()
    }

    /// Ends the game, computes the standings and deletes the saved snapshot
    pub fn end_game(&mut self) -> Outcome {
        if let Err(reason) = self.check_playing() {
            return self.decline(reason);
        }

        self.phase = Phase::Ended;
        self.clock.cancel_all();
        self.question_started = None;
        self.pending_lifeline = None;
        self.presented_dare = None;

        let standings = self
            .standings
            .get_or_init(|| Standings::compute(&self.teams))
            .clone();
        tracing::info!(winner = ?standings.winner(), "game over");
        self.updates.push(UpdateMessage::GameOver(standings));
        self.clear_store();
        Outcome::Applied
    }

    /// Starts over with fresh teams and pools
    ///
    /// The question order is kept and the deck returns to its first
    /// question.
    pub fn restart(&mut self) -> Outcome {
        self.teams = fresh_teams(&self.config);
        self.lifelines = ResourcePool::new(&self.catalogs.lifelines);
        self.dares = ResourcePool::new(&self.catalogs.dares);
        self.deck.rewind();
        self.clock.cancel_all();
        self.phase = Phase::Playing;
        self.pending_lifeline = None;
        self.presented_dare = None;
        self.question_started = None;
        self.standings = once_cell_serde::sync::OnceCell::new();

        tracing::info!("game restarted");
        self.updates.push(UpdateMessage::Restarted);
        self.clear_store();
        Outcome::Applied
    }

    /// Resolves a team whose clock just reached zero
    fn time_out(&mut self, team: TeamId) {
        if self.clock.active() == Some(team) {
            self.clock.stop();
            self.question_started = None;
        }

        let decision = elimination::handle_timeout(&self.teams[team]);
        let state = &mut self.teams[team];
        state.time_remaining = 0.0;
        state.locked = true;
        state.timeout_occurred = true;

        if decision.should_eliminate {
            state.eliminate();
            tracing::info!(%team, "clock ran out with nothing left, team eliminated");
            self.updates.push(UpdateMessage::Eliminated(team));
        } else {
            state.fallback_available = true;
            tracing::info!(
                %team,
                remaining_lifelines = decision.remaining_lifelines,
                remaining_dares = decision.remaining_dares,
                "clock ran out"
            );
            self.updates
                .push(UpdateMessage::TimedOut { team, decision });
        }
    }

    /// Times out every team that a lifeline took from positive time to zero
    fn settle_zeroed(&mut self, before: &EnumMap<TeamId, f64>) {
        for team in TeamId::ALL {
            let state = &self.teams[team];
            if before[team] > 0.0 && state.time_remaining <= 0.0 && !state.eliminated {
                self.time_out(team);
            }
        }
    }

    fn check_playing(&self) -> Result<(), Reason> {
        match self.phase {
            Phase::Playing => Ok(()),
            Phase::Ended => Err(Reason::GameOver),
        }
    }

    fn decline(&self, reason: Reason) -> Outcome {
        tracing::debug!(%reason, "command declined");
        Outcome::Declined(reason)
    }

    fn applied(&mut self) -> Outcome {
        if let Err(e) = persistence::save_teams(&mut self.store, &self.teams) {
            tracing::warn!(error = %e, "failed to save teams");
        }
        Outcome::Applied
    }

    fn clear_store(&mut self) {
        if let Err(e) = self.store.clear() {
            tracing::warn!(error = %e, "failed to clear saved teams");
        }
    }

    /// Takes the events queued since the last call
    pub fn drain_updates(&mut self) -> Vec<UpdateMessage> {
        std::mem::take(&mut self.updates)
    }

    /// A serializable view of the whole game
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            phase: self.phase,
            teams: self.teams.clone(),
            critical: EnumMap::from_fn(|team| self.config.thresholds.classify(&self.teams[team])),
            active_team: self.clock.active(),
            elapsed: self
                .question_started
                .and_then(|started| SystemTime::now().duration_since(started).ok()),
            question: self.deck.current().map(|question| QuestionView {
                index: self.deck.index(),
                count: self.deck.len(),
                question: question.clone(),
                options_shown: self.deck.options_shown(),
                answer_shown: self.deck.answer_shown(),
            }),
            pending_lifeline: self.pending_lifeline.clone(),
            presented_dare: self.presented_dare.clone(),
            standings: self.standings.get().cloned(),
        }
    }

    /// The record of one team
    pub fn team(&self, team: TeamId) -> &TeamState {
        &self.teams[team]
    }

    /// Every team's record
    pub fn teams(&self) -> &Teams {
        &self.teams
    }

    /// The team whose clock is running
    pub fn active_team(&self) -> Option<TeamId> {
        self.clock.active()
    }

    /// Whether the game is running
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// The rules in force
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// The question deck
    pub fn deck(&self) -> &QuestionDeck {
        &self.deck
    }

    /// The drawn lifeline awaiting application
    pub fn pending_lifeline(&self) -> Option<&PendingLifeline> {
        self.pending_lifeline.as_ref()
    }

    /// The dare on screen
    pub fn presented_dare(&self) -> Option<&PresentedDare> {
        self.presented_dare.as_ref()
    }

    /// Final standings, once the game has ended
    pub fn standings(&self) -> Option<&Standings> {
        self.standings.get()
    }

    /// Draw statistics of the lifeline pool
    pub fn lifeline_pool_stats(&self) -> PoolStats {
        self.lifelines.stats()
    }

    /// Draw statistics of the dare pool
    pub fn dare_pool_stats(&self) -> PoolStats {
        self.dares.stats()
    }

    /// The snapshot store
    pub fn store(&self) -> &S {
        &self.store
    }
}
