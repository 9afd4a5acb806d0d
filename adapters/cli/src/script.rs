//! Line-oriented input scripts for terminal sessions.
//!
//! One step per line; `#` starts a comment:
//!
//! ```text
//! press 0 0
//! drag 0 1
//! release
//! wait 300
//! haptics off
//! show
//! ```

use std::time::Duration;

use anyhow::{bail, Context, Result};
use contagion_core::TilePosition;

/// Single scripted input.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Step {
    /// Presses the tile at the position.
    Press(TilePosition),
    /// Drags the pointer over the tile at the position.
    Drag(TilePosition),
    /// Lifts the pointer.
    Release,
    /// Lets simulated time pass.
    Wait(Duration),
    /// Signals a loss from outside the game loop.
    Lose,
    /// Skips to the next level.
    Next,
    /// Returns to the previous level.
    Prev,
    /// Restarts the current level.
    Restart,
    /// Turns haptic feedback on or off.
    Haptics(bool),
    /// Prints the board.
    Show,
}

/// Parses a whole script, reporting the offending line on failure.
pub(crate) fn parse_script(source: &str) -> Result<Vec<Step>> {
    let mut steps = Vec::new();
    for (index, line) in source.lines().enumerate() {
        let line = line.split('#').next().unwrap_or_default().trim();
        if line.is_empty() {
            continue;
        }
        let step = parse_step(line).with_context(|| format!("script line {}", index + 1))?;
        steps.push(step);
    }
    Ok(steps)
}

fn parse_step(line: &str) -> Result<Step> {
    let mut words = line.split_whitespace();
    let verb = words.next().unwrap_or_default();
    let arguments: Vec<&str> = words.collect();

    let step = match (verb, arguments.as_slice()) {
        ("press", [row, column]) => Step::Press(parse_position(row, column)?),
        ("drag", [row, column]) => Step::Drag(parse_position(row, column)?),
        ("release", []) => Step::Release,
        ("wait", [ms]) => Step::Wait(Duration::from_millis(
            ms.parse::<u64>()
                .with_context(|| format!("invalid duration `{ms}`"))?,
        )),
        ("lose", []) => Step::Lose,
        ("next", []) => Step::Next,
        ("prev", []) => Step::Prev,
        ("restart", []) => Step::Restart,
        ("haptics", ["on"]) => Step::Haptics(true),
        ("haptics", ["off"]) => Step::Haptics(false),
        ("show", []) => Step::Show,
        _ => bail!("unrecognised step `{line}`"),
    };
    Ok(step)
}

fn parse_position(row: &str, column: &str) -> Result<TilePosition> {
    let row = row
        .parse::<u32>()
        .with_context(|| format!("invalid row `{row}`"))?;
    let column = column
        .parse::<u32>()
        .with_context(|| format!("invalid column `{column}`"))?;
    Ok(TilePosition::new(row, column))
}
