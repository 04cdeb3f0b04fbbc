use crate::curate::read_csv;
use byteorder::{LittleEndian, WriteBytesExt};
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use nn::encoding::board_tensor;
use nn::vocab::MoveVocab;
use rand::seq::SliceRandom;
use shakmaty::fen::Fen;
use shakmaty::{CastlingMode, Chess};
use std::error::Error;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

#[derive(Args)]
pub struct EncodeDatasetCommand {
    /// Curated CSV with position and move-label rows
    #[arg(long, value_name = "input")]
    input: String,

    /// Move vocabulary JSON built from the same corpus
    #[arg(long, value_name = "vocab")]
    vocab: String,

    /// Output file for the position tensors (little-endian f32)
    #[arg(long, value_name = "out-x")]
    out_x: String,

    /// Output file for the label indices (little-endian u32)
    #[arg(long, value_name = "out-y")]
    out_y: String,

    /// Shuffle rows before writing
    #[arg(long, default_value = "false")]
    shuffle: bool,
}

pub fn encode_dataset(cmd: EncodeDatasetCommand) -> Result<(), Box<dyn Error>> {
    let vocab = MoveVocab::load(Path::new(&cmd.vocab))?;
    let mut rows = read_csv(BufReader::new(File::open(&cmd.input)?))?;

    if cmd.shuffle {
        rows.shuffle(&mut rand::thread_rng());
    }

    let mut write_x = BufWriter::new(File::create(&cmd.out_x)?);
    let mut write_y = BufWriter::new(File::create(&cmd.out_y)?);

    let bar = ProgressBar::new(rows.len() as u64).with_style(
        ProgressStyle::with_template(
            "{spinner:.green} [Elapsed {elapsed_precise}] (ETA {eta}) [{bar:.cyan/blue}] {human_pos}/{human_len}  {per_sec} ",
        )
        .unwrap()
        .progress_chars("#987654321-"),
    );

    let mut written = 0u64;
    let mut skipped = 0u64;

    for row in &rows {
        bar.inc(1);

        // rows without a usable label carry no vocabulary index
        let index = match vocab.encode(&row.best_move) {
            Some(index) => index,
            None => {
                skipped += 1;
                continue;
            }
        };

        let position: Chess = row
            .fen
            .parse::<Fen>()?
            .into_position(CastlingMode::Standard)
            .map_err(|e| format!("bad position {}: {}", row.fen, e))?;

        for value in board_tensor(&position).iter() {
            write_x.write_f32::<LittleEndian>(*value)?;
        }
        write_y.write_u32::<LittleEndian>(index)?;
        written += 1;
    }
    bar.finish();

    write_x.flush()?;
    write_y.flush()?;

    if skipped > 0 {
        println!("Skipped rows without a vocabulary entry: {}", skipped);
    }
    println!("Done. Encoded samples: {}", written);

    Ok(())
}
