//! Command-line front end for the word-level Markov model.
//!
//! ```bash
//! # Build a table from one or more corpora
//! markov build --prefix 2 --output data/poe.txt poe.txt raven.txt
//!
//! # Ramble 100 words from the table, reproducibly
//! markov generate --table data/poe.txt --words 100 --seed 7
//!
//! # Or straight from a corpus on stdin
//! cat poe.txt | markov generate --prefix 2
//! ```

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::info;

use markov_core::codec;
use markov_core::model::chain::ChainBuilder;
use markov_core::model::freq_table::FrequencyTable;
use markov_core::model::random::RngSource;

#[derive(Parser)]
#[command(name = "markov")]
#[command(version)]
#[command(about = "Builds Markov frequency tables and generates text from them", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Build a frequency table from corpus files (stdin if none) and save it.
    Build {
        /// Prefix length in words
        #[arg(short, long, default_value_t = 2)]
        prefix: usize,

        /// Table file to write
        #[arg(short, long)]
        output: PathBuf,

        /// Corpus files, ingested in order
        corpus: Vec<PathBuf>,
    },

    /// Generate text from a saved table or from corpus files (stdin if none).
    Generate {
        /// Prefix length in words, when building from a corpus
        #[arg(short, long, default_value_t = 2)]
        prefix: usize,

        /// Maximum number of words to generate
        #[arg(short = 'n', long, default_value_t = 100)]
        words: usize,

        /// Seed for reproducible output
        #[arg(short, long)]
        seed: Option<u64>,

        /// Table file written by `build`
        #[arg(short, long, conflicts_with = "corpus")]
        table: Option<PathBuf>,

        /// Corpus files, ingested in order
        corpus: Vec<PathBuf>,
    },

    /// Print the size of a saved table.
    Stats {
        /// Table file written by `build`
        #[arg(short, long)]
        table: PathBuf,
    },
}

/// Ingests every corpus file, or stdin when the list is empty.
fn build_table(prefix: usize, corpus: &[PathBuf]) -> Result<FrequencyTable> {
    let mut builder = ChainBuilder::new(prefix)?;
    if corpus.is_empty() {
        builder.ingest_reader(io::stdin().lock()).context("Failed to read corpus from stdin")?;
    }
    for path in corpus {
        builder
            .ingest_file(path)
            .with_context(|| format!("Failed to read corpus {}", path.display()))?;
    }
    info!("chain holds {} prefixes", builder.len());
    Ok(builder.into_frequency_table())
}

fn load_table(path: &Path) -> Result<FrequencyTable> {
    codec::load_from_file(path).with_context(|| format!("Failed to load table {}", path.display()))
}

fn generate(table: &FrequencyTable, words: usize, seed: Option<u64>) -> String {
    match seed {
        Some(seed) => table.generate(words, &mut RngSource::seeded(seed)),
        None => table.generate(words, &mut RngSource::thread()),
    }
}

fn run(cli: Cli, out: &mut impl Write) -> Result<()> {
    match cli.command {
        Command::Build { prefix, output, corpus } => {
            let table = build_table(prefix, &corpus)?;
            codec::save_to_file(&table, &output)
                .with_context(|| format!("Failed to write table {}", output.display()))?;
            info!("wrote {} prefixes to {}", table.len(), output.display());
        }
        Command::Generate { prefix, words, seed, table, corpus } => {
            let table = match table {
                Some(path) => load_table(&path)?,
                None => build_table(prefix, &corpus)?,
            };
            writeln!(out, "{}", generate(&table, words, seed))?;
        }
        Command::Stats { table } => {
            let stats = load_table(&table)?.stats();
            writeln!(out, "prefix length: {}", stats.prefix_len)?;
            writeln!(out, "prefixes: {}", stats.prefixes)?;
            writeln!(out, "observations: {}", stats.observations)?;
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();
    run(Cli::parse(), &mut io::stdout().lock())
}
