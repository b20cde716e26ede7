//! CLI frontend for Mystic Oracle three-card readings.

mod commands;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "mystic",
    about = "Mystic Oracle: a three-card tarot reading in the terminal",
    version,
    propagate_version = true
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Ask a question and draw a Past, Present, Future spread
    Read {
        /// The question to ask (prompted for when omitted)
        question: Option<String>,

        /// RNG seed for a reproducible spread
        #[arg(short, long)]
        seed: Option<u64>,

        /// Use the local narrator instead of the remote service
        #[arg(long)]
        offline: bool,

        /// Skip the shuffle and reveal pauses
        #[arg(long)]
        fast: bool,

        /// Draw all three cards without waiting for Enter
        #[arg(long)]
        auto: bool,

        /// Print the finished reading as JSON only
        #[arg(long)]
        json: bool,

        /// Also write the reading as Markdown to this file
        #[arg(short, long)]
        export: Option<PathBuf>,

        /// Check each card's artwork sources after the reveal
        #[arg(long)]
        probe_artwork: bool,

        /// Chat-completions base URL (overrides MYSTIC_API_BASE)
        #[arg(long)]
        api_base: Option<String>,

        /// Model name (overrides MYSTIC_MODEL)
        #[arg(long)]
        model: Option<String>,
    },

    /// List the cards of the deck
    Deck {
        /// Only show one suit (wands, cups, swords, pentacles, major)
        #[arg(short, long)]
        suit: Option<String>,
    },

    /// Show one card by name or id
    Card {
        /// Card name or id (case-insensitive), e.g. "the star" or "cups-6"
        name: String,
    },
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Read {
            question,
            seed,
            offline,
            fast,
            auto,
            json,
            export,
            probe_artwork,
            api_base,
            model,
        } => commands::read::run(commands::read::ReadOptions {
            question,
            seed,
            offline,
            fast,
            auto,
            json,
            export,
            probe_artwork,
            api_base,
            model,
        }),
        Commands::Deck { suit } => commands::deck::run(suit.as_deref()),
        Commands::Card { name } => commands::card::run(&name),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        process::exit(1);
    }
}
