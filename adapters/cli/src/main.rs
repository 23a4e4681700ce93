#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter for generating puzzles and rehearsing arena rounds.

mod config;
mod rehearsal;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use knapsack_arena_core::Item;
use knapsack_arena_system_puzzle::PuzzleGenerator;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::ArenaConfig;

/// Command-line arguments accepted by the arena binary.
#[derive(Debug, Parser)]
#[command(name = "knapsack-arena", about = "Knapsack table-filling arena tools")]
struct CliArgs {
    /// TOML configuration file; defaults apply when omitted.
    #[arg(long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Solves a knapsack instance and prints the puzzle as JSON.
    Puzzle {
        /// Knapsack capacity.
        #[arg(long)]
        capacity: u32,
        /// Item as `weight:value`; repeat for each item.
        #[arg(
            long = "item",
            value_name = "WEIGHT:VALUE",
            value_parser = parse_item,
            required = true
        )]
        items: Vec<(u32, u32)>,
        /// Number of cells to hide.
        #[arg(long, default_value_t = 5)]
        blanks: usize,
        /// Seed for reproducible blank selection.
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Plays a full two-player round against in-memory stores.
    Rehearse {
        /// Seed for identifiers and blank selection.
        #[arg(long, default_value_t = 0)]
        seed: u64,
    },
}

/// Entry point for the knapsack arena command-line interface.
#[tokio::main]
async fn main() -> Result<()> {
    let args = CliArgs::parse();
    let config = ArenaConfig::load(args.config.as_deref())?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.log.filter.as_str())),
        )
        .with_writer(std::io::stderr)
        .init();

    match args.command {
        Command::Puzzle {
            capacity,
            items,
            blanks,
            seed,
        } => {
            let items: Vec<Item> = items
                .into_iter()
                .enumerate()
                .map(|(index, (weight, value))| Item::new(format!("item{index}"), weight, value))
                .collect();
            let mut generator =
                seed.map_or_else(PuzzleGenerator::from_entropy, PuzzleGenerator::from_seed);
            let puzzle = generator
                .generate(&items, capacity, blanks)
                .context("invalid knapsack instance")?;
            info!(
                optimum = puzzle.dp_table.final_value(),
                blanks = puzzle.blank_cells.len(),
                "puzzle generated"
            );
            println!("{}", serde_json::to_string_pretty(&puzzle)?);
        }
        Command::Rehearse { seed } => {
            let report = rehearsal::run(&config, seed).await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }
    Ok(())
}

fn parse_item(raw: &str) -> Result<(u32, u32), String> {
    let (weight, value) = raw
        .split_once(':')
        .ok_or_else(|| format!("expected WEIGHT:VALUE, got `{raw}`"))?;
    let weight = weight
        .trim()
        .parse()
        .map_err(|error| format!("invalid weight in `{raw}`: {error}"))?;
    let value = value
        .trim()
        .parse()
        .map_err(|error| format!("invalid value in `{raw}`: {error}"))?;
    Ok((weight, value))
}
