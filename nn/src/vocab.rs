use std::collections::HashMap;
use std::fs::File;
use std::io::{self, BufReader, BufWriter};
use std::path::Path;

/// Bidirectional mapping between UCI move text and dense network indices.
///
/// Indices are assigned in the order move strings are first encountered
/// while building from the training corpus. The mapping is persisted as a
/// JSON object next to the trained model; the inverse mapping is derived
/// in memory on load and never persisted. Training-time and
/// inference-time mappings must be identical for predictions to mean
/// anything, so `load` validates that indices are exactly `0..len`.
#[derive(Debug, Clone, Default)]
pub struct MoveVocab {
    index_by_move: HashMap<String, u32>,
    move_by_index: Vec<String>,
}

impl MoveVocab {
    /// Builds a vocabulary from move texts, assigning indices in
    /// first-seen order. Repeated moves keep their first index.
    pub fn build<I, S>(moves: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut vocab = MoveVocab::default();
        for m in moves {
            vocab.insert(m.as_ref());
        }
        vocab
    }

    fn insert(&mut self, text: &str) {
        if !self.index_by_move.contains_key(text) {
            self.index_by_move
                .insert(text.to_string(), self.move_by_index.len() as u32);
            self.move_by_index.push(text.to_string());
        }
    }

    pub fn len(&self) -> usize {
        self.move_by_index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.move_by_index.is_empty()
    }

    pub fn encode(&self, text: &str) -> Option<u32> {
        self.index_by_move.get(text).copied()
    }

    pub fn decode(&self, index: u32) -> Option<&str> {
        self.move_by_index.get(index as usize).map(String::as_str)
    }

    /// Writes the move → index mapping as a JSON object.
    pub fn save(&self, path: &Path) -> io::Result<()> {
        let file = BufWriter::new(File::create(path)?);
        serde_json::to_writer(file, &self.index_by_move).map_err(io::Error::from)
    }

    /// Reads a mapping written by `save` and rebuilds the inverse table.
    pub fn load(path: &Path) -> io::Result<Self> {
        let file = BufReader::new(File::open(path)?);
        let map: HashMap<String, u32> =
            serde_json::from_reader(file).map_err(io::Error::from)?;
        Self::from_map(map)
    }

    fn from_map(map: HashMap<String, u32>) -> io::Result<Self> {
        let mut move_by_index: Vec<Option<String>> = vec![None; map.len()];

        for (text, index) in &map {
            let slot = move_by_index.get_mut(*index as usize).ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("move index {} out of range for {} moves", index, map.len()),
                )
            })?;
            if slot.is_some() {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("duplicate move index {}", index),
                ));
            }
            *slot = Some(text.clone());
        }

        // every index < len and no duplicates, so all slots are filled
        let move_by_index = move_by_index.into_iter().flatten().collect();

        Ok(Self {
            index_by_move: map,
            move_by_index,
        })
    }
}
