#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Orchestrator that wires player input, matching, spreading and level flow.
//!
//! The game loop owns the authoritative [`Board`] for the lifetime of a level
//! and drives it exclusively through `board::apply`. Every input handler and
//! every fired task runs to completion before returning, so board mutations
//! never interleave. Delayed work (automatic spread steps and the pauses
//! after win or lose transitions) lives in a [`Scheduler`] whose tasks carry
//! the level generation they were scheduled in; a task or transition
//! completion from an earlier generation is discarded.

pub mod scheduler;

use std::time::Duration;

use contagion_board::{self as board, query, Board};
use contagion_core::{Command, Event, LevelNumber, Match, Tile, TilePosition};
use contagion_system_levels::{LevelCatalog, LevelController};
use contagion_system_matching::MatchEngine;
use contagion_system_spread::{SpreadEngine, SpreadOutcome};

pub use scheduler::{ScheduledTask, Scheduler, TaskId, TaskPurpose};

const DEFAULT_SPREAD_DELAY: Duration = Duration::from_millis(150);
const DEFAULT_TRANSITION_DELAY: Duration = Duration::from_millis(500);
const DEFAULT_LOSS_VIBRATION: Duration = Duration::from_millis(500);
const MIN_SPREAD_DELAY: Duration = Duration::from_millis(1);

/// Timing and feedback parameters of the game loop.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    spread_delay: Duration,
    transition_delay: Duration,
    loss_vibration: Duration,
    haptics_enabled: bool,
}

impl Config {
    /// Creates a configuration with explicit delays and default feedback settings.
    ///
    /// Spread delays shorter than one millisecond are raised to one
    /// millisecond, so every automatic step lands strictly after the step
    /// that scheduled it.
    #[must_use]
    pub fn new(spread_delay: Duration, transition_delay: Duration) -> Self {
        Self {
            spread_delay: spread_delay.max(MIN_SPREAD_DELAY),
            transition_delay,
            loss_vibration: DEFAULT_LOSS_VIBRATION,
            haptics_enabled: true,
        }
    }

    /// Overrides how long the device vibrates when a level is lost.
    #[must_use]
    pub fn with_loss_vibration(mut self, loss_vibration: Duration) -> Self {
        self.loss_vibration = loss_vibration;
        self
    }

    /// Enables or disables haptic feedback.
    #[must_use]
    pub fn with_haptics(mut self, haptics_enabled: bool) -> Self {
        self.haptics_enabled = haptics_enabled;
        self
    }

    /// Delay between automatic spread steps.
    #[must_use]
    pub const fn spread_delay(&self) -> Duration {
        self.spread_delay
    }

    /// Pause between a completed win or lose transition and the level change.
    #[must_use]
    pub const fn transition_delay(&self) -> Duration {
        self.transition_delay
    }

    /// Vibration length requested when a level is lost.
    #[must_use]
    pub const fn loss_vibration(&self) -> Duration {
        self.loss_vibration
    }

    /// Whether haptic feedback is requested at all.
    #[must_use]
    pub const fn haptics_enabled(&self) -> bool {
        self.haptics_enabled
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(DEFAULT_SPREAD_DELAY, DEFAULT_TRANSITION_DELAY)
    }
}

/// Fire-and-forget vibration requests.
pub trait Haptics {
    /// Requests a vibration of the provided length.
    fn vibrate(&mut self, duration: Duration);
}

/// Haptics collaborator that ignores every request.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoHaptics;

impl Haptics for NoHaptics {
    fn vibrate(&mut self, _duration: Duration) {}
}

/// State of the orchestrator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Waiting for the player to press a tile.
    AwaitingSelection,
    /// A gesture is in progress; drags and the release are tracked.
    Dragging,
    /// The released gesture is being turned into a match.
    Resolving,
    /// No legal match remains; spread steps repeat on their own.
    AutoSpreading,
    /// Every malignant tile was cleared.
    Won,
    /// An external loss signal ended the level.
    Lost,
    /// The requested level does not exist; gameplay is over.
    Exited,
}

/// Presentation transitions the game loop requests.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Transition {
    /// The level was won.
    Win,
    /// The level was lost.
    Lose,
}

/// Handle the presentation returns once a requested transition has finished.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TransitionToken {
    transition: Transition,
    generation: u64,
}

impl TransitionToken {
    /// Transition the token belongs to.
    #[must_use]
    pub const fn transition(&self) -> Transition {
        self.transition
    }
}

/// Mutable session state, reset whenever a level (re)starts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Progress {
    level: LevelNumber,
    auto_play: bool,
    lost: bool,
    generation: u64,
    pending_spread: Option<TaskId>,
}

impl Progress {
    fn new(level: LevelNumber) -> Self {
        Self {
            level,
            auto_play: false,
            lost: false,
            generation: 0,
            pending_spread: None,
        }
    }

    /// Level currently being played.
    #[must_use]
    pub const fn level(&self) -> LevelNumber {
        self.level
    }

    /// Whether spread steps currently repeat automatically.
    #[must_use]
    pub const fn auto_play(&self) -> bool {
        self.auto_play
    }

    /// Whether the level has been lost.
    #[must_use]
    pub const fn lost(&self) -> bool {
        self.lost
    }

    /// Counter bumped on every level (re)start.
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// Handle of the pending automatic spread step, if any.
    #[must_use]
    pub const fn pending_spread(&self) -> Option<TaskId> {
        self.pending_spread
    }
}

/// Notifications for the presentation layer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GameEvent {
    /// A fresh board was built for the level.
    LevelStarted {
        /// Level that started.
        level: LevelNumber,
        /// Display title of the level.
        title: String,
    },
    /// The requested level does not exist; the presentation should leave gameplay.
    ExitToMenu {
        /// Level that was requested.
        requested: LevelNumber,
    },
    /// The live selection path changed.
    PathChanged {
        /// Tiles of the path, in selection order.
        tiles: Vec<Tile>,
    },
    /// The board changed; carries the board's own events.
    BoardChanged {
        /// Events reported by the board.
        events: Vec<Event>,
    },
    /// A released gesture produced a match.
    MatchResolved {
        /// Descriptor of the removed tiles.
        matched: Match,
    },
    /// A spread step ran.
    SpreadStepped {
        /// Summary of the step.
        outcome: SpreadOutcome,
        /// Malignant tiles left after the step.
        malignant_remaining: usize,
        /// Legal matches left after the step.
        matches_remaining: usize,
    },
    /// The presentation should play the win transition and complete the token.
    ShowWin {
        /// Token to hand back through `complete_transition`.
        token: TransitionToken,
    },
    /// The presentation should play the lose transition and complete the token.
    ShowLose {
        /// Token to hand back through `complete_transition`.
        token: TransitionToken,
    },
}

/// Event-driven orchestrator for one play session.
#[derive(Debug)]
pub struct GameLoop<C, H> {
    config: Config,
    board: Board,
    matching: MatchEngine,
    spread: SpreadEngine,
    levels: LevelController<C>,
    haptics: H,
    scheduler: Scheduler,
    progress: Progress,
    phase: Phase,
    pending_transition: Option<TransitionToken>,
}

impl<C: LevelCatalog, H: Haptics> GameLoop<C, H> {
    /// Creates a game loop from its collaborators. No level is loaded until [`Self::start`].
    #[must_use]
    pub fn new(levels: LevelController<C>, haptics: H, config: Config) -> Self {
        Self {
            config,
            board: Board::new(),
            matching: MatchEngine::new(),
            spread: SpreadEngine::new(),
            levels,
            haptics,
            scheduler: Scheduler::new(),
            progress: Progress::new(LevelNumber::FIRST),
            phase: Phase::AwaitingSelection,
            pending_transition: None,
        }
    }

    /// Starts playing the provided level.
    pub fn start(&mut self, level: LevelNumber, out: &mut Vec<GameEvent>) {
        self.progress.level = level;
        self.restart_level(out);
    }

    /// Handles a press, returning whether it started a gesture.
    pub fn press(&mut self, position: TilePosition, out: &mut Vec<GameEvent>) -> bool {
        if !matches!(self.phase, Phase::AwaitingSelection | Phase::AutoSpreading) {
            return false;
        }

        let accepted = self
            .matching
            .select_tile(query::tile_view(&self.board), position);
        if accepted {
            self.phase = Phase::Dragging;
            self.publish_path(out);
        }
        accepted
    }

    /// Handles pointer movement during a gesture, returning whether the path changed.
    pub fn drag(&mut self, position: TilePosition, out: &mut Vec<GameEvent>) -> bool {
        if self.phase != Phase::Dragging {
            return false;
        }

        let changed = self
            .matching
            .select_tile(query::tile_view(&self.board), position);
        if changed {
            self.publish_path(out);
        }
        changed
    }

    /// Ends the gesture, resolving the path and triggering a spread step on a match.
    pub fn release(&mut self, out: &mut Vec<GameEvent>) -> Option<Match> {
        if self.phase != Phase::Dragging {
            return None;
        }
        self.phase = Phase::Resolving;

        let mut commands = Vec::new();
        let resolved = self
            .matching
            .resolve_match(query::tile_view(&self.board), &mut commands);
        self.matching.clear_path();
        out.push(GameEvent::PathChanged { tiles: Vec::new() });

        if let Some(matched) = &resolved {
            self.apply_commands(commands, out);
            out.push(GameEvent::MatchResolved {
                matched: matched.clone(),
            });
            self.trigger_spread(out);
        }

        if self.phase == Phase::Resolving {
            self.phase = self.idle_phase();
        }
        resolved
    }

    /// Reacts to the external loss signal. Returns whether the signal was accepted.
    pub fn signal_loss(&mut self, out: &mut Vec<GameEvent>) -> bool {
        if self.progress.lost || matches!(self.phase, Phase::Won | Phase::Exited) {
            return false;
        }

        self.progress.lost = true;
        self.cancel_pending_spread();
        if self.config.haptics_enabled {
            self.haptics.vibrate(self.config.loss_vibration);
        }
        self.matching.clear_path();
        self.phase = Phase::Lost;
        log::info!("level {} lost", self.progress.level.get());

        let token = self.request_transition(Transition::Lose);
        out.push(GameEvent::ShowLose { token });
        true
    }

    /// Acknowledges that the presentation finished a transition.
    ///
    /// Tokens from an earlier level generation, or tokens already completed,
    /// are ignored and reported as `false`.
    pub fn complete_transition(&mut self, token: TransitionToken) -> bool {
        if self.pending_transition != Some(token) {
            log::debug!("ignoring stale transition completion {token:?}");
            return false;
        }
        self.pending_transition = None;

        let purpose = match token.transition {
            Transition::Win => TaskPurpose::AdvanceLevel,
            Transition::Lose => TaskPurpose::RestartLevel,
        };
        let _ = self.scheduler.schedule(
            purpose,
            self.config.transition_delay,
            self.progress.generation,
        );
        true
    }

    /// Advances the simulation clock, firing every task that falls due.
    pub fn advance(&mut self, dt: Duration, out: &mut Vec<GameEvent>) {
        let horizon = self.scheduler.now().saturating_add(dt);

        while let Some(task) = self.scheduler.pop_due(horizon) {
            if task.generation != self.progress.generation {
                log::debug!("discarding stale task {task:?}");
                continue;
            }

            match task.purpose {
                TaskPurpose::SpreadStep => {
                    if self.progress.pending_spread != Some(task.id) {
                        continue;
                    }
                    self.progress.pending_spread = None;
                    self.trigger_spread(out);
                }
                TaskPurpose::AdvanceLevel => self.next_level(out),
                TaskPurpose::RestartLevel => self.restart_level(out),
            }
        }

        self.scheduler.settle(horizon);
    }

    /// Moves to the following level.
    pub fn next_level(&mut self, out: &mut Vec<GameEvent>) {
        self.progress.level = self.progress.level.next();
        self.restart_level(out);
    }

    /// Moves to the preceding level, never going below the first.
    pub fn prev_level(&mut self, out: &mut Vec<GameEvent>) {
        self.progress.level = self.progress.level.previous();
        self.restart_level(out);
    }

    /// Rebuilds the current level from its template and resets progress.
    pub fn restart_level(&mut self, out: &mut Vec<GameEvent>) {
        self.progress.generation = self.progress.generation.saturating_add(1);
        self.progress.auto_play = false;
        self.progress.lost = false;
        self.cancel_pending_spread();
        self.pending_transition = None;
        self.matching.clear_path();

        let level = self.progress.level;
        let mut commands = Vec::new();
        let loaded = self
            .levels
            .load_level(level, &mut commands)
            .map(|template| template.title().to_owned());

        match loaded {
            Ok(title) => {
                self.apply_commands(commands, out);
                self.phase = Phase::AwaitingSelection;
                out.push(GameEvent::LevelStarted { level, title });
            }
            Err(error) => {
                log::info!("{error}; leaving gameplay");
                self.phase = Phase::Exited;
                out.push(GameEvent::ExitToMenu { requested: level });
            }
        }
    }

    /// Enables or disables haptic feedback at runtime.
    pub fn set_haptics_enabled(&mut self, enabled: bool) {
        self.config = self.config.with_haptics(enabled);
    }

    /// Current state of the orchestrator.
    #[must_use]
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    /// Session state of the current level.
    #[must_use]
    pub const fn progress(&self) -> &Progress {
        &self.progress
    }

    /// Read-only access to the active board.
    #[must_use]
    pub const fn board(&self) -> &Board {
        &self.board
    }

    /// Tiles of the live selection path.
    #[must_use]
    pub fn path_tiles(&self) -> Vec<Tile> {
        self.matching.tiles_in_match(query::tile_view(&self.board))
    }

    /// Queued delayed tasks.
    #[must_use]
    pub const fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Transition the presentation still has to complete, if any.
    #[must_use]
    pub const fn pending_transition(&self) -> Option<TransitionToken> {
        self.pending_transition
    }

    /// Read-only access to the haptics collaborator.
    #[must_use]
    pub const fn haptics(&self) -> &H {
        &self.haptics
    }

    fn trigger_spread(&mut self, out: &mut Vec<GameEvent>) {
        if self.progress.lost {
            return;
        }

        let mut commands = Vec::new();
        let outcome = self.spread.step(
            query::tile_view(&self.board),
            self.progress.auto_play,
            &mut commands,
        );
        self.apply_commands(commands, out);

        let malignant_remaining = self.spread.malignant_remaining(query::tile_view(&self.board));
        let matches_remaining = self.spread.matches_remaining(query::tile_view(&self.board));
        out.push(GameEvent::SpreadStepped {
            outcome,
            malignant_remaining,
            matches_remaining,
        });

        if malignant_remaining == 0 {
            self.enter_won(out);
            return;
        }

        if self.progress.auto_play || matches_remaining == 0 {
            if !self.progress.auto_play {
                log::info!("no legal match left; spreading automatically");
            }
            self.progress.auto_play = true;
            self.schedule_spread();
        }

        if self.phase != Phase::Dragging {
            self.phase = self.idle_phase();
        }
    }

    fn enter_won(&mut self, out: &mut Vec<GameEvent>) {
        self.cancel_pending_spread();
        self.matching.clear_path();
        self.phase = Phase::Won;
        log::info!("level {} won", self.progress.level.get());

        let token = self.request_transition(Transition::Win);
        out.push(GameEvent::ShowWin { token });
    }

    fn request_transition(&mut self, transition: Transition) -> TransitionToken {
        let token = TransitionToken {
            transition,
            generation: self.progress.generation,
        };
        self.pending_transition = Some(token);
        token
    }

    fn schedule_spread(&mut self) {
        self.cancel_pending_spread();
        self.progress.pending_spread = Some(self.scheduler.schedule(
            TaskPurpose::SpreadStep,
            self.config.spread_delay,
            self.progress.generation,
        ));
    }

    fn cancel_pending_spread(&mut self) {
        if let Some(id) = self.progress.pending_spread.take() {
            let _ = self.scheduler.cancel(id);
        }
    }

    fn idle_phase(&self) -> Phase {
        if self.progress.auto_play {
            Phase::AutoSpreading
        } else {
            Phase::AwaitingSelection
        }
    }

    fn apply_commands(&mut self, commands: Vec<Command>, out: &mut Vec<GameEvent>) {
        let mut events = Vec::new();
        for command in commands {
            board::apply(&mut self.board, command, &mut events);
        }
        if !events.is_empty() {
            out.push(GameEvent::BoardChanged { events });
        }
    }

    fn publish_path(&self, out: &mut Vec<GameEvent>) {
        out.push(GameEvent::PathChanged {
            tiles: self.path_tiles(),
        });
    }
}
