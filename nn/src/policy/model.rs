use super::layers::{relu, softmax, ConvLayer, DenseLayer};
use crate::encoding::{NUM_PLANES, TENSOR_LEN};
use byteorder::{LittleEndian, ReadBytesExt};
use std::fs::File;
use std::io::{BufRead, Cursor, Read};

const CONV1: usize = 64;
const CONV2: usize = 128;
const HIDDEN: usize = 256;

/// Flattened size after the two valid 3x3 convolutions (128 x 4 x 4)
const FLAT: usize = CONV2 * 4 * 4;

/// Convolutional move-prediction network.
///
/// The weight blob is produced by the training side: a null-terminated
/// architecture tag, the move-vocabulary size as u32, then the parameters
/// of each layer as little-endian f32, weights before biases.
pub struct PolicyModel {
    pub arch: String,
    pub params: usize,

    num_moves: usize,

    conv1: ConvLayer,
    conv2: ConvLayer,
    hidden: DenseLayer,
    output: DenseLayer,
}

impl PolicyModel {
    pub fn load(model_path: &str) -> std::io::Result<Self> {
        let mut file = File::open(model_path)?;
        let mut buffer = Vec::new();
        file.read_to_end(&mut buffer)?;
        Self::from_memory(&buffer)
    }

    pub fn from_memory(buffer: &[u8]) -> std::io::Result<Self> {
        let mut cursor = Cursor::new(buffer);

        let mut str_buffer = Vec::new();
        cursor.read_until(0, &mut str_buffer)?;
        str_buffer.pop(); // remove null byte
        let arch = String::from_utf8_lossy(&str_buffer).to_string();

        match arch.as_str() {
            "conv2-dense2" => {}
            _ => panic!("Unknown policy model architecture: {}", arch),
        }

        let num_moves = cursor.read_u32::<LittleEndian>()? as usize;

        let conv1 = ConvLayer::from_read(&mut cursor, NUM_PLANES, CONV1)?;
        let conv2 = ConvLayer::from_read(&mut cursor, CONV1, CONV2)?;
        let hidden = DenseLayer::from_read(&mut cursor, FLAT, HIDDEN)?;
        let output = DenseLayer::from_read(&mut cursor, HIDDEN, num_moves)?;

        let params =
            conv1.num_params() + conv2.num_params() + hidden.num_params() + output.num_params();

        Ok(Self {
            arch,
            params,
            num_moves,
            conv1,
            conv2,
            hidden,
            output,
        })
    }

    /// Size of the move vocabulary the network was trained against
    pub fn num_moves(&self) -> usize {
        self.num_moves
    }

    /// Scores an encoded position: one probability per vocabulary index.
    pub fn predict(&self, tensor: &[f32; TENSOR_LEN]) -> Vec<f32> {
        let mut planes = self.conv1.forward(tensor, 8, 8);
        relu(&mut planes);

        let mut planes = self.conv2.forward(&planes, 6, 6);
        relu(&mut planes);

        let mut hidden = self.hidden.forward(&planes);
        relu(&mut hidden);

        let mut output = self.output.forward(&hidden);
        softmax(&mut output);
        output
    }
}
