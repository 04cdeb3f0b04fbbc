use byteorder::{LittleEndian, ReadBytesExt};
use std::io::{self, Read};

fn read_f32_vec(read: &mut impl Read, len: usize) -> io::Result<Vec<f32>> {
    let mut data = vec![0f32; len];
    read.read_f32_into::<LittleEndian>(&mut data)?;
    Ok(data)
}

/// 3x3 valid convolution, weights stored [out][in][3][3], then biases
pub struct ConvLayer {
    in_channels: usize,
    out_channels: usize,

    weight: Vec<f32>,
    bias: Vec<f32>,
}

impl ConvLayer {
    pub fn from_read(
        read: &mut impl Read,
        in_channels: usize,
        out_channels: usize,
    ) -> io::Result<Self> {
        Ok(Self {
            in_channels,
            out_channels,
            weight: read_f32_vec(read, out_channels * in_channels * 9)?,
            bias: read_f32_vec(read, out_channels)?,
        })
    }

    pub fn num_params(&self) -> usize {
        self.weight.len() + self.bias.len()
    }

    /// Input laid out [in_channels][height][width]; output shrinks by two
    /// in each spatial dimension.
    pub fn forward(&self, input: &[f32], height: usize, width: usize) -> Vec<f32> {
        debug_assert_eq!(input.len(), self.in_channels * height * width);

        let out_h = height - 2;
        let out_w = width - 2;
        let mut output = vec![0f32; self.out_channels * out_h * out_w];

        for oc in 0..self.out_channels {
            for oy in 0..out_h {
                for ox in 0..out_w {
                    let mut acc = self.bias[oc];
                    for ic in 0..self.in_channels {
                        for ky in 0..3 {
                            for kx in 0..3 {
                                let w =
                                    self.weight[((oc * self.in_channels + ic) * 3 + ky) * 3 + kx];
                                let x = input[(ic * height + oy + ky) * width + ox + kx];
                                acc += w * x;
                            }
                        }
                    }
                    output[(oc * out_h + oy) * out_w + ox] = acc;
                }
            }
        }

        output
    }
}

/// Fully connected layer, weights stored [out][in], then biases
pub struct DenseLayer {
    num_inputs: usize,
    num_outputs: usize,

    weight: Vec<f32>,
    bias: Vec<f32>,
}

impl DenseLayer {
    pub fn from_read(
        read: &mut impl Read,
        num_inputs: usize,
        num_outputs: usize,
    ) -> io::Result<Self> {
        Ok(Self {
            num_inputs,
            num_outputs,
            weight: read_f32_vec(read, num_outputs * num_inputs)?,
            bias: read_f32_vec(read, num_outputs)?,
        })
    }

    pub fn num_params(&self) -> usize {
        self.weight.len() + self.bias.len()
    }

    pub fn forward(&self, input: &[f32]) -> Vec<f32> {
        debug_assert_eq!(input.len(), self.num_inputs);

        (0..self.num_outputs)
            .map(|o| {
                let row = &self.weight[o * self.num_inputs..(o + 1) * self.num_inputs];
                row.iter()
                    .zip(input)
                    .fold(self.bias[o], |acc, (w, x)| acc + w * x)
            })
            .collect()
    }
}

pub fn relu(values: &mut [f32]) {
    for v in values.iter_mut() {
        *v = v.max(0.0);
    }
}

/// Numerically stable in-place softmax
pub fn softmax(values: &mut [f32]) {
    let max = values.iter().fold(f32::NEG_INFINITY, |a, &b| a.max(b));
    let mut sum = 0.0;
    for v in values.iter_mut() {
        *v = (*v - max).exp();
        sum += *v;
    }
    for v in values.iter_mut() {
        *v /= sum;
    }
}
