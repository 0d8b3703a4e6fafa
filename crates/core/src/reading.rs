//! Sensor readings and the ordered feature vector fed to the classifier.
//!
//! The scaler and model were trained on five channels in a fixed order; the
//! order of [`FEATURE_NAMES`] is that order and must not change.

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::CoreError;

/// Number of feature channels the classifier expects.
pub const FEATURE_COUNT: usize = 5;

/// Feature channel names, in training order.
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "Vibration",
    "Temperature",
    "Pressure",
    "RMS_Vibration",
    "Mean_Temp",
];

/// One raw reading as published by the sensor gateway.
///
/// Values may arrive as JSON numbers or numeric strings. Fields are optional
/// at the wire level so a missing channel is reported by name from
/// [`SensorReading::to_features`] instead of as a generic parse error.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SensorReading {
    #[serde(rename = "Vibration", default, deserialize_with = "lenient_f64")]
    pub vibration: Option<f64>,
    #[serde(rename = "Temperature", default, deserialize_with = "lenient_f64")]
    pub temperature: Option<f64>,
    #[serde(rename = "Pressure", default, deserialize_with = "lenient_f64")]
    pub pressure: Option<f64>,
    #[serde(rename = "RMS_Vibration", default, deserialize_with = "lenient_f64")]
    pub rms_vibration: Option<f64>,
    #[serde(rename = "Mean_Temp", default, deserialize_with = "lenient_f64")]
    pub mean_temp: Option<f64>,
}

impl SensorReading {
    /// Validate the reading and convert it to the ordered feature vector.
    pub fn to_features(&self) -> Result<FeatureVector, CoreError> {
        let values = [
            self.vibration,
            self.temperature,
            self.pressure,
            self.rms_vibration,
            self.mean_temp,
        ];

        let mut out = [0.0; FEATURE_COUNT];
        for (i, value) in values.iter().enumerate() {
            out[i] = value.ok_or_else(|| {
                CoreError::Validation(format!("Missing sensor value: {}", FEATURE_NAMES[i]))
            })?;
        }
        FeatureVector::new(out)
    }
}

/// Validated, ordered feature vector (one finite value per channel).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureVector([f64; FEATURE_COUNT]);

impl FeatureVector {
    /// Wrap an array, rejecting NaN and infinite values.
    pub fn new(values: [f64; FEATURE_COUNT]) -> Result<Self, CoreError> {
        if let Some(i) = values.iter().position(|v| !v.is_finite()) {
            return Err(CoreError::Validation(format!(
                "Sensor value for {} is not a finite number",
                FEATURE_NAMES[i]
            )));
        }
        Ok(Self(values))
    }

    /// Build from a slice that must contain exactly [`FEATURE_COUNT`] values.
    pub fn from_slice(values: &[f64]) -> Result<Self, CoreError> {
        let array: [f64; FEATURE_COUNT] = values.try_into().map_err(|_| {
            CoreError::Validation(format!(
                "Expected {FEATURE_COUNT} sensor values, got {}",
                values.len()
            ))
        })?;
        Self::new(array)
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }
}

/// Accept `12.5`, `"12.5"` or `null`.
fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumOrString {
        Num(f64),
        Str(String),
    }

    match Option::<NumOrString>::deserialize(deserializer)? {
        None => Ok(None),
        Some(NumOrString::Num(n)) => Ok(Some(n)),
        Some(NumOrString::Str(s)) => s
            .trim()
            .parse::<f64>()
            .map(Some)
            .map_err(|_| serde::de::Error::custom(format!("'{s}' is not a number"))),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
