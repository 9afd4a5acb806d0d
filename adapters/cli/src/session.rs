//! Scripted terminal session around the game loop.

use std::{io::Write, mem, time::Duration};

use anyhow::{Context, Result};
use contagion_core::LevelNumber;
use contagion_system_game_loop::{GameEvent, GameLoop, Haptics, Phase};
use contagion_system_levels::{LevelCatalog, LevelController};

use crate::{damage::DamageMonitor, render::render_board, script::Step, settings::Settings};

/// Haptics collaborator for terminals, which have no vibration motor.
#[derive(Debug, Default)]
pub(crate) struct TerminalHaptics {
    requests: usize,
}

impl Haptics for TerminalHaptics {
    fn vibrate(&mut self, duration: Duration) {
        self.requests += 1;
        log::info!("vibrate for {} ms", duration.as_millis());
    }
}

/// Drives a game loop from scripted steps and reports what happens as text.
///
/// Transitions are acknowledged as soon as they are requested, and the
/// damage monitor is consulted after every step.
pub(crate) struct Session<C, W> {
    game: GameLoop<C, TerminalHaptics>,
    damage: DamageMonitor,
    events: Vec<GameEvent>,
    output: W,
}

impl<C: LevelCatalog, W: Write> Session<C, W> {
    pub(crate) fn new(catalog: C, settings: Settings, output: W) -> Self {
        Self {
            game: GameLoop::new(
                LevelController::new(catalog),
                TerminalHaptics::default(),
                settings.config,
            ),
            damage: DamageMonitor::new(settings.damage_threshold),
            events: Vec::new(),
            output,
        }
    }

    pub(crate) fn start(&mut self, level: LevelNumber) -> Result<()> {
        self.game.start(level, &mut self.events);
        self.settle()
    }

    /// Performs the steps in order, stopping early once gameplay is exited.
    pub(crate) fn run(&mut self, steps: &[Step]) -> Result<()> {
        for step in steps {
            if self.game.phase() == Phase::Exited {
                log::info!("gameplay exited; ignoring remaining steps");
                break;
            }
            self.perform(*step)?;
            self.settle()?;
        }
        Ok(())
    }

    /// Prints the final board and state.
    pub(crate) fn finish(&mut self) -> Result<()> {
        if self.game.phase() != Phase::Exited {
            self.show()?;
        }
        writeln!(
            self.output,
            "final state: {:?} on level {} ({} vibration requests)",
            self.game.phase(),
            self.game.progress().level().get(),
            self.game.haptics().requests
        )
        .context("failed to write session summary")
    }

    #[cfg(test)]
    pub(crate) fn phase(&self) -> Phase {
        self.game.phase()
    }

    #[cfg(test)]
    pub(crate) fn into_output(self) -> W {
        self.output
    }

    fn perform(&mut self, step: Step) -> Result<()> {
        let events = &mut self.events;
        match step {
            Step::Press(position) => {
                if !self.game.press(position, events) {
                    log::debug!("press at {position:?} ignored");
                }
            }
            Step::Drag(position) => {
                if !self.game.drag(position, events) {
                    log::debug!("drag over {position:?} ignored");
                }
            }
            Step::Release => {
                let _ = self.game.release(events);
            }
            Step::Wait(duration) => return self.wait(duration),
            Step::Lose => {
                let _ = self.game.signal_loss(events);
            }
            Step::Next => self.game.next_level(events),
            Step::Prev => self.game.prev_level(events),
            Step::Restart => self.game.restart_level(events),
            Step::Haptics(enabled) => self.game.set_haptics_enabled(enabled),
            Step::Show => return self.show(),
        }
        Ok(())
    }

    // Advances in spread-sized slices so the damage monitor sees every step.
    fn wait(&mut self, duration: Duration) -> Result<()> {
        let slice = self.game.config().spread_delay();
        let mut remaining = duration;
        while !remaining.is_zero() {
            let dt = if slice.is_zero() {
                remaining
            } else {
                remaining.min(slice)
            };
            self.game.advance(dt, &mut self.events);
            remaining -= dt;
            self.settle()?;
        }
        Ok(())
    }

    fn show(&mut self) -> Result<()> {
        let text = render_board(self.game.board(), &self.game.path_tiles());
        write!(self.output, "{text}").context("failed to write board")
    }

    fn settle(&mut self) -> Result<()> {
        loop {
            self.report_events()?;
            if !self.observe_damage() {
                return Ok(());
            }
        }
    }

    fn observe_damage(&mut self) -> bool {
        if self.game.progress().lost() || matches!(self.game.phase(), Phase::Won | Phase::Exited) {
            return false;
        }
        self.damage.observe(self.game.board()) && self.game.signal_loss(&mut self.events)
    }

    fn report_events(&mut self) -> Result<()> {
        for event in mem::take(&mut self.events) {
            match event {
                GameEvent::LevelStarted { level, title } => {
                    self.damage.reset();
                    writeln!(self.output, "== level {}: {title} ==", level.get())?;
                }
                GameEvent::ExitToMenu { requested } => {
                    writeln!(
                        self.output,
                        "level {} does not exist; returning to the menu",
                        requested.get()
                    )?;
                }
                GameEvent::MatchResolved { matched } => {
                    writeln!(
                        self.output,
                        "matched {} {:?} tiles, cured {}",
                        matched.count(),
                        matched.kind(),
                        matched.cured()
                    )?;
                }
                GameEvent::SpreadStepped {
                    outcome,
                    malignant_remaining,
                    matches_remaining,
                } => {
                    writeln!(
                        self.output,
                        "spread {}{}: {} infected, {malignant_remaining} malignant, {matches_remaining} matches left",
                        outcome.step_index,
                        if outcome.auto_play { " (auto)" } else { "" },
                        outcome.infected.len()
                    )?;
                }
                GameEvent::ShowWin { token } => {
                    writeln!(self.output, "level cleared")?;
                    let _ = self.game.complete_transition(token);
                }
                GameEvent::ShowLose { token } => {
                    writeln!(self.output, "contamination overwhelmed the board")?;
                    let _ = self.game.complete_transition(token);
                }
                GameEvent::PathChanged { tiles } => {
                    log::debug!("path now {} tiles long", tiles.len());
                }
                GameEvent::BoardChanged { events } => {
                    log::debug!("board reported {events:?}");
                }
            }
        }
        Ok(())
    }
}
