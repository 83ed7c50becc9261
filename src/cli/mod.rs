// src/cli/mod.rs — CLI definition (clap derive)

pub mod report;
pub mod score;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "dermbench",
    about = "Auto-score dermatology benchmark dialogues with an LLM judge",
    version
)]
pub struct Cli {
    /// Config file path
    #[arg(long)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Score benchmark dialogues with the judge model
    Score {
        /// Results file to score (defaults to the newest gemini_results_*.json
        /// under validation/results/)
        file: Option<PathBuf>,

        /// Re-score only dialogues with retryable errors from a previous run
        #[arg(long)]
        retry: bool,

        /// Output path (defaults to scored_results_<timestamp>.json next to
        /// the input file)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Judge model override
        #[arg(short, long)]
        model: Option<String>,
    },
    /// Re-print the summary report for an already-scored results file
    Report {
        /// Scored results file
        file: PathBuf,
    },
}
