use crate::curate::read_csv;
use clap::Args;
use nn::vocab::MoveVocab;
use std::error::Error;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

#[derive(Args)]
pub struct BuildVocabCommand {
    /// Curated CSV to read move labels from
    #[arg(long, value_name = "input")]
    input: String,

    /// Output JSON file mapping move text to network index
    #[arg(long, value_name = "output")]
    output: String,
}

pub fn build_vocab(cmd: BuildVocabCommand) -> Result<(), Box<dyn Error>> {
    let rows = read_csv(BufReader::new(File::open(&cmd.input)?))?;

    // indices follow the row order of the corpus, first occurrence wins
    let vocab = MoveVocab::build(
        rows.iter()
            .filter(|row| !row.best_move.is_empty())
            .map(|row| row.best_move.as_str()),
    );

    let unlabelled = rows.iter().filter(|row| row.best_move.is_empty()).count();
    if unlabelled > 0 {
        println!("Rows without a label: {}", unlabelled);
    }

    vocab.save(Path::new(&cmd.output))?;

    println!("Done. Moves in vocabulary: {}", vocab.len());

    Ok(())
}
