//! Classifier adapter: scale a feature vector and score it.
//!
//! The decision core only sees the [`ScaleAndClassify`] port. The bundled
//! [`ModelPipeline`] is a linear scaler followed by a softmax layer, loaded
//! from a JSON export of the trained model:
//!
//! ```json
//! {
//!   "scaler": { "center": [..5], "scale": [..5] },
//!   "weights": [[..5], [..5], [..5]],
//!   "bias": [..3]
//! }
//! ```
//!
//! A min-max scaler is exported as `center = data_min`,
//! `scale = data_max - data_min`; a standard scaler as `center = mean`,
//! `scale = std`.

use std::path::Path;

use async_trait::async_trait;
use millguard_core::reading::{FeatureVector, FEATURE_COUNT};
use serde::Deserialize;

/// Errors raised while loading or running a classifier.
#[derive(Debug, thiserror::Error)]
pub enum ClassifierError {
    /// The model produced no usable output.
    #[error("Model error: {0}")]
    Model(String),

    #[error("Failed to read model file: {0}")]
    Io(#[from] std::io::Error),

    /// The model file is not a valid pipeline export.
    #[error("Invalid model format: {0}")]
    Format(String),
}

/// External scaler + model pipeline.
///
/// Returns one probability per class, in class index order.
#[async_trait]
pub trait ScaleAndClassify: Send + Sync + 'static {
    async fn predict_proba(&self, features: &FeatureVector) -> Result<Vec<f64>, ClassifierError>;
}

// ---------------------------------------------------------------------------
// ModelPipeline
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
struct ScalerParams {
    center: Vec<f64>,
    scale: Vec<f64>,
}

#[derive(Debug, Clone, Deserialize)]
struct PipelineFile {
    scaler: ScalerParams,
    weights: Vec<Vec<f64>>,
    bias: Vec<f64>,
}

/// Linear scaler followed by a multinomial logistic layer.
#[derive(Debug, Clone)]
pub struct ModelPipeline {
    center: [f64; FEATURE_COUNT],
    scale: [f64; FEATURE_COUNT],
    weights: Vec<[f64; FEATURE_COUNT]>,
    bias: Vec<f64>,
}

impl ModelPipeline {
    /// Parse and validate a pipeline export.
    pub fn from_json(json: &str) -> Result<Self, ClassifierError> {
        let file: PipelineFile =
            serde_json::from_str(json).map_err(|e| ClassifierError::Format(e.to_string()))?;

        let center = fixed("scaler.center", &file.scaler.center)?;
        let scale = fixed("scaler.scale", &file.scaler.scale)?;
        if scale.iter().any(|s| *s == 0.0) {
            return Err(ClassifierError::Format(
                "scaler.scale contains a zero entry".to_string(),
            ));
        }

        if file.weights.len() < 2 {
            return Err(ClassifierError::Format(format!(
                "expected at least 2 classes, got {}",
                file.weights.len()
            )));
        }
        if file.bias.len() != file.weights.len() {
            return Err(ClassifierError::Format(format!(
                "bias has {} entries for {} classes",
                file.bias.len(),
                file.weights.len()
            )));
        }

        let weights = file
            .weights
            .iter()
            .enumerate()
            .map(|(i, row)| fixed(&format!("weights[{i}]"), row))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            center,
            scale,
            weights,
            bias: file.bias,
        })
    }

    /// Load a pipeline export from disk.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self, ClassifierError> {
        let json = tokio::fs::read_to_string(path.as_ref()).await?;
        Self::from_json(&json)
    }

    /// Number of classes the model scores.
    pub fn class_count(&self) -> usize {
        self.weights.len()
    }

    fn scale(&self, features: &FeatureVector) -> [f64; FEATURE_COUNT] {
        let mut scaled = [0.0; FEATURE_COUNT];
        for (i, x) in features.as_slice().iter().enumerate() {
            scaled[i] = (x - self.center[i]) / self.scale[i];
        }
        scaled
    }

    fn probabilities(&self, scaled: &[f64; FEATURE_COUNT]) -> Vec<f64> {
        let logits: Vec<f64> = self
            .weights
            .iter()
            .zip(&self.bias)
            .map(|(row, b)| row.iter().zip(scaled).map(|(w, x)| w * x).sum::<f64>() + b)
            .collect();

        softmax(&logits)
    }
}

#[async_trait]
impl ScaleAndClassify for ModelPipeline {
    async fn predict_proba(&self, features: &FeatureVector) -> Result<Vec<f64>, ClassifierError> {
        let probs = self.probabilities(&self.scale(features));
        if probs.iter().any(|p| !p.is_finite()) {
            return Err(ClassifierError::Model(
                "softmax produced a non-finite probability".to_string(),
            ));
        }
        Ok(probs)
    }
}

fn fixed(field: &str, values: &[f64]) -> Result<[f64; FEATURE_COUNT], ClassifierError> {
    let arr: [f64; FEATURE_COUNT] = values.try_into().map_err(|_| {
        ClassifierError::Format(format!(
            "{field} has {} values, expected {FEATURE_COUNT}",
            values.len()
        ))
    })?;
    if arr.iter().any(|v| !v.is_finite()) {
        return Err(ClassifierError::Format(format!("{field} contains a non-finite value")));
    }
    Ok(arr)
}

fn softmax(logits: &[f64]) -> Vec<f64> {
    let max = logits.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = logits.iter().map(|z| (z - max).exp()).collect();
    let sum: f64 = exps.iter().sum();
    exps.into_iter().map(|e| e / sum).collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
