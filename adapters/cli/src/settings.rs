//! Optional TOML settings overriding the game loop configuration.
//!
//! ```toml
//! version = 1
//! spread_delay_ms = 150
//! transition_delay_ms = 500
//! loss_vibration_ms = 500
//! haptics = true
//! damage_threshold = 0.6
//! ```

use std::{fs, path::Path, time::Duration};

use anyhow::{bail, Context, Result};
use contagion_system_game_loop::Config;
use serde::Deserialize;

const SUPPORTED_SETTINGS_VERSION: u32 = 1;
const DEFAULT_DAMAGE_THRESHOLD: f32 = 0.6;

/// Resolved settings of a terminal session.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Settings {
    /// Configuration handed to the game loop.
    pub(crate) config: Config,
    /// Share of malignant live tiles at which the level is lost.
    pub(crate) damage_threshold: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            config: Config::default(),
            damage_threshold: DEFAULT_DAMAGE_THRESHOLD,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SettingsFile {
    version: u32,
    spread_delay_ms: Option<u64>,
    transition_delay_ms: Option<u64>,
    loss_vibration_ms: Option<u64>,
    haptics: Option<bool>,
    damage_threshold: Option<f32>,
}

/// Reads settings from the provided TOML file.
pub(crate) fn load(path: &Path) -> Result<Settings> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read settings at {}", path.display()))?;
    parse(&contents).with_context(|| format!("invalid settings in {}", path.display()))
}

fn parse(contents: &str) -> Result<Settings> {
    let file: SettingsFile =
        toml::from_str(contents).context("failed to parse settings toml contents")?;
    if file.version != SUPPORTED_SETTINGS_VERSION {
        bail!(
            "unsupported settings version {}; expected {}",
            file.version,
            SUPPORTED_SETTINGS_VERSION
        );
    }

    let defaults = Config::default();
    let spread_delay = file
        .spread_delay_ms
        .map_or(defaults.spread_delay(), Duration::from_millis);
    let transition_delay = file
        .transition_delay_ms
        .map_or(defaults.transition_delay(), Duration::from_millis);
    if spread_delay.is_zero() {
        bail!("spread_delay_ms must be greater than zero");
    }

    let mut config = Config::new(spread_delay, transition_delay)
        .with_haptics(file.haptics.unwrap_or(defaults.haptics_enabled()));
    if let Some(ms) = file.loss_vibration_ms {
        config = config.with_loss_vibration(Duration::from_millis(ms));
    }

    let damage_threshold = file.damage_threshold.unwrap_or(DEFAULT_DAMAGE_THRESHOLD);
    if !(damage_threshold > 0.0 && damage_threshold <= 1.0) {
        bail!("damage_threshold must be within (0, 1], got {damage_threshold}");
    }

    Ok(Settings {
        config,
        damage_threshold,
    })
}
