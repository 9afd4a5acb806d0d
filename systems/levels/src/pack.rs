//! TOML level packs that replace the built-in catalog.
//!
//! ```toml
//! version = 1
//!
//! [[level]]
//! title = "Warm up"
//! adjacency = "octile"
//! layout = """
//! bbR
//! gyy
//! """
//! ```
//!
//! `title` defaults to the group title of the level and `adjacency`
//! defaults to `orthogonal`.

use contagion_core::{Adjacency, LevelNumber, LevelTemplate, TemplateError};
use serde::Deserialize;
use thiserror::Error;

use crate::{default_title, Catalog};

/// Pack format version understood by [`parse_pack`].
pub const SUPPORTED_PACK_VERSION: u32 = 1;

/// Errors raised while reading a level pack.
#[derive(Debug, Error)]
pub enum LevelPackError {
    /// The pack is not valid TOML or does not follow the pack schema.
    #[error("failed to parse level pack: {0}")]
    Toml(#[from] toml::de::Error),
    /// The pack declares a format version this build does not support.
    #[error("unsupported level pack version {found}; expected {expected}")]
    UnsupportedVersion {
        /// Version declared by the pack.
        found: u32,
        /// Version this build supports.
        expected: u32,
    },
    /// The pack declares no levels.
    #[error("level pack contains no levels")]
    Empty,
    /// A level layout failed validation.
    #[error("level {level} has an invalid layout")]
    Layout {
        /// Number of the offending level.
        level: u32,
        /// Underlying validation failure.
        #[source]
        source: TemplateError,
    },
}

#[derive(Debug, Deserialize)]
struct PackFile {
    version: u32,
    #[serde(default, rename = "level")]
    levels: Vec<PackLevel>,
}

#[derive(Debug, Deserialize)]
struct PackLevel {
    title: Option<String>,
    #[serde(default)]
    adjacency: Adjacency,
    layout: String,
}

/// Parses a level pack into a catalog, numbering levels in file order.
pub fn parse_pack(contents: &str) -> Result<Catalog, LevelPackError> {
    let pack: PackFile = toml::from_str(contents)?;
    if pack.version != SUPPORTED_PACK_VERSION {
        return Err(LevelPackError::UnsupportedVersion {
            found: pack.version,
            expected: SUPPORTED_PACK_VERSION,
        });
    }
    if pack.levels.is_empty() {
        return Err(LevelPackError::Empty);
    }

    let mut templates = Vec::with_capacity(pack.levels.len());
    for (number, entry) in (1..).zip(pack.levels) {
        let level = LevelNumber::clamped(number);
        let title = entry.title.unwrap_or_else(|| default_title(level));
        let template = LevelTemplate::from_ascii(title, entry.adjacency, &entry.layout).map_err(
            |source| LevelPackError::Layout {
                level: level.get(),
                source,
            },
        )?;
        templates.push(template);
    }

    log::info!("parsed level pack with {} levels", templates.len());
    Ok(Catalog::new(templates))
}
