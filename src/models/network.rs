//! Feed-forward network artifact and its forward pass

use crate::error::{PipelineError, PipelineResult};
use ndarray::{Array1, Array2};
use serde::Deserialize;

const MODEL_ARTIFACT: &str = "model";

fn corrupt(reason: impl Into<String>) -> PipelineError {
    PipelineError::ArtifactCorrupt {
        artifact: MODEL_ARTIFACT,
        reason: reason.into(),
    }
}

/// Layer activation function
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Activation {
    Linear,
    Relu,
    Sigmoid,
    Tanh,
}

impl Activation {
    #[inline]
    fn apply(self, x: f32) -> f32 {
        match self {
            Activation::Linear => x,
            Activation::Relu => x.max(0.0),
            Activation::Sigmoid => 1.0 / (1.0 + (-x).exp()),
            Activation::Tanh => x.tanh(),
        }
    }
}

/// Fully connected layer as stored in the artifact.
///
/// `kernel[i][j]` connects input `i` to unit `j`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DenseLayer {
    pub units: usize,
    pub activation: Activation,
    pub kernel: Vec<Vec<f32>>,
    pub bias: Vec<f32>,
}

/// Validated layer ready for evaluation
#[derive(Debug, Clone, PartialEq)]
struct Layer {
    activation: Activation,
    /// Shape `(inputs, units)`
    kernel: Array2<f32>,
    bias: Array1<f32>,
}

impl Layer {
    fn forward(&self, input: &Array1<f32>) -> Array1<f32> {
        let activation = self.activation;
        let mut output = input.dot(&self.kernel) + &self.bias;
        output.mapv_inplace(|v| activation.apply(v));
        output
    }
}

/// Trained network: weights, biases and topology.
///
/// Validated on construction: layers chain, every number is finite and the
/// network ends in a single sigmoid unit.
#[derive(Debug, Clone, PartialEq)]
pub struct NetworkArtifact {
    input_width: usize,
    layers: Vec<Layer>,
}

#[derive(Debug, Deserialize)]
struct NetworkFile {
    input_width: usize,
    layers: Vec<DenseLayer>,
}

impl NetworkArtifact {
    pub fn new(input_width: usize, layers: Vec<DenseLayer>) -> PipelineResult<Self> {
        if input_width == 0 {
            return Err(corrupt("input width is zero"));
        }
        if layers.is_empty() {
            return Err(corrupt("network has no layers"));
        }

        let mut width = input_width;
        let mut compiled = Vec::with_capacity(layers.len());
        for (idx, layer) in layers.into_iter().enumerate() {
            if layer.units == 0 {
                return Err(corrupt(format!("layer {} has no units", idx)));
            }
            if layer.kernel.len() != width {
                return Err(corrupt(format!(
                    "layer {} kernel has {} rows, expected {}",
                    idx,
                    layer.kernel.len(),
                    width
                )));
            }
            if let Some(row) = layer.kernel.iter().position(|r| r.len() != layer.units) {
                return Err(corrupt(format!(
                    "layer {} kernel row {} has {} columns, expected {}",
                    idx,
                    row,
                    layer.kernel[row].len(),
                    layer.units
                )));
            }
            if layer.bias.len() != layer.units {
                return Err(corrupt(format!(
                    "layer {} bias has {} entries, expected {}",
                    idx,
                    layer.bias.len(),
                    layer.units
                )));
            }

            let kernel = Array2::from_shape_vec(
                (width, layer.units),
                layer.kernel.into_iter().flatten().collect(),
            )
            .map_err(|e| corrupt(format!("layer {} kernel: {}", idx, e)))?;
            let bias = Array1::from(layer.bias);

            if !kernel.iter().chain(bias.iter()).all(|v| v.is_finite()) {
                return Err(corrupt(format!("layer {} has non-finite weights", idx)));
            }

            width = layer.units;
            compiled.push(Layer {
                activation: layer.activation,
                kernel,
                bias,
            });
        }

        if let Some(output) = compiled.last() {
            if output.bias.len() != 1 || output.activation != Activation::Sigmoid {
                return Err(corrupt(format!(
                    "output layer must be a single sigmoid unit, found {} {:?} units",
                    output.bias.len(),
                    output.activation
                )));
            }
        }

        Ok(Self {
            input_width,
            layers: compiled,
        })
    }

    /// Decode the JSON artifact
    pub fn from_json(json: &str) -> PipelineResult<Self> {
        let file: NetworkFile = serde_json::from_str(json).map_err(|e| corrupt(e.to_string()))?;
        Self::new(file.input_width, file.layers)
    }

    /// Declared input width
    pub fn input_width(&self) -> usize {
        self.input_width
    }

    pub fn num_layers(&self) -> usize {
        self.layers.len()
    }

    /// Total number of weights and biases
    pub fn num_parameters(&self) -> usize {
        self.layers
            .iter()
            .map(|l| l.kernel.len() + l.bias.len())
            .sum()
    }

    /// Evaluate the network on one input vector.
    ///
    /// Computation is carried out in `f32`, matching the precision the
    /// network was trained in.
    pub fn forward(&self, input: &[f64]) -> PipelineResult<f32> {
        if input.len() != self.input_width {
            return Err(PipelineError::InferenceError(format!(
                "input has {} features, network expects {}",
                input.len(),
                self.input_width
            )));
        }

        let mut activations: Array1<f32> = input.iter().map(|&x| x as f32).collect();
        for layer in &self.layers {
            activations = layer.forward(&activations);
        }

        match activations.as_slice() {
            Some([p]) if p.is_finite() => Ok(*p),
            Some([p]) => Err(PipelineError::InferenceError(format!(
                "network produced non-finite output {}",
                p
            ))),
            _ => Err(PipelineError::InferenceError(format!(
                "network produced {} outputs, expected 1",
                activations.len()
            ))),
        }
    }
}
