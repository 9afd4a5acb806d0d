#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Level catalog and controller that turn level numbers into fresh boards.
//!
//! The controller never builds a board itself: it emits
//! `Command::LoadLevel` for the authoritative board to apply, or reports
//! [`LevelError::OutOfRange`] so the caller can leave gameplay.

mod builtin;
pub mod pack;

use contagion_core::{Command, LevelNumber, LevelTemplate, TemplateError};
use thiserror::Error;

/// Errors surfaced while loading a level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum LevelError {
    /// The requested level lies beyond the last level in the catalog.
    #[error("level {requested} does not exist; the catalog ends at level {max}")]
    OutOfRange {
        /// Level that was requested.
        requested: u32,
        /// Highest level known to the catalog.
        max: u32,
    },
}

/// Supplies level templates by number.
pub trait LevelCatalog {
    /// Returns the template for the provided level, if the catalog has one.
    fn template(&self, level: LevelNumber) -> Option<&LevelTemplate>;

    /// Highest level number the catalog knows about.
    fn max_level(&self) -> u32;
}

/// Level catalog backed by an ordered list of templates; level one is the first entry.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Catalog {
    levels: Vec<LevelTemplate>,
}

impl Catalog {
    /// Creates a catalog from templates ordered by level number.
    #[must_use]
    pub fn new(levels: Vec<LevelTemplate>) -> Self {
        Self { levels }
    }

    /// Creates the catalog of levels that ship with the game.
    pub fn builtin() -> Result<Self, TemplateError> {
        builtin::templates().map(Self::new)
    }

    /// Iterates over every level together with its number.
    pub fn iter(&self) -> impl Iterator<Item = (LevelNumber, &LevelTemplate)> {
        (1..)
            .zip(&self.levels)
            .map(|(number, template)| (LevelNumber::clamped(number), template))
    }
}

impl LevelCatalog for Catalog {
    fn template(&self, level: LevelNumber) -> Option<&LevelTemplate> {
        let index = usize::try_from(level.get()).ok()?.checked_sub(1)?;
        self.levels.get(index)
    }

    fn max_level(&self) -> u32 {
        u32::try_from(self.levels.len()).unwrap_or(u32::MAX)
    }
}

/// First level of the purple group.
pub const PURPLE_GROUP_START: u32 = 11;
/// First level of the green group.
pub const GREEN_GROUP_START: u32 = 21;

/// Name of the level group the provided level belongs to.
#[must_use]
pub fn group_title(level: LevelNumber) -> &'static str {
    match level.get() {
        n if n >= GREEN_GROUP_START => "Green",
        n if n >= PURPLE_GROUP_START => "Purple",
        _ => "Blue",
    }
}

/// Default display title of a level: its group name and position in the group.
#[must_use]
pub fn default_title(level: LevelNumber) -> String {
    let group_start = match level.get() {
        n if n >= GREEN_GROUP_START => GREEN_GROUP_START,
        n if n >= PURPLE_GROUP_START => PURPLE_GROUP_START,
        _ => 1,
    };
    format!(
        "{} {}",
        group_title(level),
        level.get() - group_start + 1
    )
}

/// Loads level templates from a catalog and emits board construction commands.
#[derive(Debug)]
pub struct LevelController<C> {
    catalog: C,
    loaded: Option<LevelNumber>,
}

impl<C: LevelCatalog> LevelController<C> {
    /// Creates a controller reading from the provided catalog.
    #[must_use]
    pub fn new(catalog: C) -> Self {
        Self {
            catalog,
            loaded: None,
        }
    }

    /// Looks up the level and emits a command that builds a fresh board from it.
    ///
    /// Levels past the end of the catalog yield [`LevelError::OutOfRange`] and
    /// emit nothing.
    pub fn load_level(
        &mut self,
        level: LevelNumber,
        out: &mut Vec<Command>,
    ) -> Result<&LevelTemplate, LevelError> {
        let max = self.catalog.max_level();
        let out_of_range = LevelError::OutOfRange {
            requested: level.get(),
            max,
        };
        if level.get() > max {
            log::info!("level {} requested past the last level {max}", level.get());
            return Err(out_of_range);
        }

        let template = self.catalog.template(level).ok_or(out_of_range)?;
        log::info!("loading level {} '{}'", level.get(), template.title());
        out.push(Command::LoadLevel {
            template: template.clone(),
        });
        self.loaded = Some(level);
        Ok(template)
    }

    /// Level most recently loaded successfully.
    #[must_use]
    pub fn loaded(&self) -> Option<LevelNumber> {
        self.loaded
    }

    /// Highest level number known to the catalog.
    #[must_use]
    pub fn max_level(&self) -> u32 {
        self.catalog.max_level()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn group_titles_follow_level_ranges() {
        assert_eq!(group_title(LevelNumber::clamped(1)), "Blue");
        assert_eq!(group_title(LevelNumber::clamped(10)), "Blue");
        assert_eq!(group_title(LevelNumber::clamped(11)), "Purple");
        assert_eq!(group_title(LevelNumber::clamped(21)), "Green");
        assert_eq!(default_title(LevelNumber::clamped(3)), "Blue 3");
        assert_eq!(default_title(LevelNumber::clamped(12)), "Purple 2");
        assert_eq!(default_title(LevelNumber::clamped(25)), "Green 5");
    }

    #[test]
    fn empty_catalog_rejects_every_level() {
        let mut controller = LevelController::new(Catalog::default());
        let mut out = Vec::new();

        assert_eq!(
            controller.load_level(LevelNumber::FIRST, &mut out),
            Err(LevelError::OutOfRange {
                requested: 1,
                max: 0,
            })
        );
        assert!(out.is_empty());
        assert_eq!(controller.loaded(), None);
    }
}
