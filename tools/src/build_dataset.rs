use crate::curate::{attach_popular_move, extract, extract_best_move, select_best_rows, write_csv};
use clap::Args;
use indicatif::{HumanCount, ProgressBar, ProgressStyle};
use std::error::Error;
use std::fs::File;
use std::io;
use std::io::{BufReader, BufWriter};
use zstd::Encoder;

#[derive(Args)]
pub struct BuildDatasetCommand {
    /// Path or URL of a .jsonl or .jsonl.zst file with evaluated positions
    #[arg(long, value_name = "input")]
    input: String,

    /// Output .csv (or csv.zst) file to write the curated rows
    #[arg(long, value_name = "output")]
    output: String,

    /// Maximum number of input lines to read
    #[arg(long, default_value = "1000000")]
    max_rows: usize,

    /// Keep the per-position popularity label as a diagnostic column
    #[arg(long, default_value = "false")]
    keep_popular: bool,

    /// Whether to compress the output CSV with the ZSTD algorithm
    #[arg(long, default_value = "false")]
    compress: bool,
}

pub fn build_dataset(cmd: BuildDatasetCommand) -> Result<(), Box<dyn Error>> {
    // raw data stream (may be compressed)
    let raw_reader: Box<dyn io::Read> = if cmd.input.starts_with("http") {
        Box::new(reqwest::blocking::get(cmd.input.clone())?)
    } else {
        Box::new(File::open(&cmd.input)?)
    };

    // decompress if necessary
    let reader: Box<dyn io::Read> = if cmd.input.ends_with(".zst") {
        Box::new(zstd::Decoder::new(raw_reader)?)
    } else {
        raw_reader
    };

    // compress output if asked
    let output_file = File::create(cmd.output.clone())?;
    let mut writer: Box<dyn io::Write> = if cmd.compress {
        // the encoder is buffered internally
        Box::new(Encoder::new(output_file, 3)?.auto_finish())
    } else {
        Box::new(BufWriter::new(output_file))
    };

    println!("Input: {}", cmd.input);
    println!("Output: {}", cmd.output);
    println!("Write compressed: {}", cmd.compress);

    let bar = ProgressBar::new_spinner().with_style(
        ProgressStyle::default_spinner()
            .template(
                "{spinner:.green} [Elapsed {elapsed_precise}] [Lines {human_pos} @ {per_sec}] {msg}",
            )
            .unwrap(),
    );

    let mut rows = extract(BufReader::new(reader), cmd.max_rows, || bar.inc(1))?;
    bar.finish();
    println!("Extracted records: {}", HumanCount(rows.len() as u64));

    extract_best_move(&mut rows);
    attach_popular_move(&mut rows);
    let selected = select_best_rows(rows)?;

    write_csv(writer.as_mut(), &selected, cmd.keep_popular)?;

    println!(
        "Done. Curated positions: {}",
        HumanCount(selected.len() as u64)
    );

    Ok(())
}
