#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that plays Contagion levels from input scripts.

mod damage;
mod level_transfer;
mod render;
mod script;
mod session;
mod settings;

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use contagion_core::LevelNumber;
use contagion_system_levels::{pack::parse_pack, Catalog, LevelCatalog};
use env_logger::Env;

use crate::{session::Session, settings::Settings};

#[derive(Debug, Parser)]
#[command(name = "contagion", about = "Match tiles before the contamination spreads")]
struct Cli {
    /// TOML settings file overriding delays, haptics and the damage threshold.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// TOML level pack replacing the built-in levels.
    #[arg(long, global = true)]
    levels: Option<PathBuf>,
    #[command(subcommand)]
    command: Option<CliCommand>,
}

#[derive(Debug, Subcommand)]
enum CliCommand {
    /// Plays a level by running an input script.
    Play(PlayArgs),
    /// Lists the available levels.
    Levels,
    /// Prints the sharing code of a level.
    Export {
        /// Level to export.
        level: u32,
    },
}

#[derive(Debug, Default, Args)]
struct PlayArgs {
    /// Level to start on.
    #[arg(long, default_value_t = 1)]
    level: u32,
    /// Plays the level described by a sharing code instead of the catalog.
    #[arg(long, conflicts_with = "level")]
    level_code: Option<String>,
    /// Script to run; read from stdin when omitted.
    #[arg(long)]
    script: Option<PathBuf>,
}

/// Entry point for the Contagion command-line interface.
fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let settings = match &cli.config {
        Some(path) => settings::load(path)?,
        None => Settings::default(),
    };

    match cli.command {
        Some(CliCommand::Play(args)) => play(cli.levels.as_deref(), settings, &args),
        None => play(cli.levels.as_deref(), settings, &PlayArgs::default()),
        Some(CliCommand::Levels) => list_levels(&load_catalog(cli.levels.as_deref())?),
        Some(CliCommand::Export { level }) => {
            export_level(&load_catalog(cli.levels.as_deref())?, level)
        }
    }
}

fn load_catalog(levels: Option<&Path>) -> Result<Catalog> {
    match levels {
        Some(path) => {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("failed to read level pack at {}", path.display()))?;
            parse_pack(&contents)
                .with_context(|| format!("invalid level pack {}", path.display()))
        }
        None => Catalog::builtin().context("built-in levels failed to parse"),
    }
}

fn play(levels: Option<&Path>, settings: Settings, args: &PlayArgs) -> Result<()> {
    let (catalog, level) = match &args.level_code {
        Some(code) => {
            let template = level_transfer::decode(code).context("invalid level code")?;
            (Catalog::new(vec![template]), LevelNumber::FIRST)
        }
        None => (load_catalog(levels)?, LevelNumber::clamped(args.level)),
    };

    let source = match &args.script {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("failed to read script at {}", path.display()))?,
        None => io::read_to_string(io::stdin()).context("failed to read script from stdin")?,
    };
    let steps = script::parse_script(&source)?;

    let mut session = Session::new(catalog, settings, io::stdout().lock());
    session.start(level)?;
    session.run(&steps)?;
    session.finish()
}

fn list_levels(catalog: &Catalog) -> Result<()> {
    for (level, template) in catalog.iter() {
        println!(
            "{:>3}  {:<12} {}x{} {:?}",
            level.get(),
            template.title(),
            template.columns(),
            template.rows(),
            template.adjacency()
        );
    }
    Ok(())
}

fn export_level(catalog: &Catalog, level: u32) -> Result<()> {
    let template = catalog
        .template(LevelNumber::clamped(level))
        .with_context(|| format!("level {level} does not exist"))?;
    println!("{}", level_transfer::encode(template)?);
    Ok(())
}
