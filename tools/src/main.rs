mod build_dataset;
mod build_vocab;
mod curate;
mod encode_dataset;

use crate::build_dataset::{build_dataset, BuildDatasetCommand};
use crate::build_vocab::{build_vocab, BuildVocabCommand};
use crate::encode_dataset::{encode_dataset, EncodeDatasetCommand};
use clap::{Parser, Subcommand};
use std::error::Error;

#[derive(Parser)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Curates an evaluation corpus into a training CSV with one best move per position
    BuildDataset(BuildDatasetCommand),
    /// Builds the move vocabulary JSON from a curated CSV
    BuildVocab(BuildVocabCommand),
    /// Encodes a curated CSV into tensor and label files for training
    EncodeDataset(EncodeDatasetCommand),
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Cli::parse();

    match args.command {
        Commands::BuildDataset(cmd) => build_dataset(cmd),
        Commands::BuildVocab(cmd) => build_vocab(cmd),
        Commands::EncodeDataset(cmd) => encode_dataset(cmd),
    }
}
