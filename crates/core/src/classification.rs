//! Verdict selection over a classifier probability vector.
//!
//! The normal class wins whenever its probability reaches the override
//! threshold, even if a fault class scores higher. This biases the monitor
//! toward fewer false-positive fault alerts.

use serde::Serialize;

use crate::error::CoreError;
use crate::fault::{FaultClass, FaultClassMap, NORMAL_INDEX};
use crate::types::Timestamp;

/// Default probability at or above which the verdict is forced to normal.
pub const DEFAULT_NORMAL_OVERRIDE_THRESHOLD: f64 = 0.14;

/// Outcome of classifying one reading.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassificationResult {
    pub class: FaultClass,
    /// One probability per known class, in class index order.
    pub probabilities: Vec<f64>,
    pub timestamp: Timestamp,
}

/// Pick the verdict index for a probability vector.
///
/// Returns [`NORMAL_INDEX`] when `probabilities[NORMAL_INDEX] >= threshold`,
/// otherwise the index of the maximum probability (first occurrence wins
/// ties). The vector must be non-empty.
pub fn select_verdict(probabilities: &[f64], threshold: f64) -> usize {
    if probabilities[NORMAL_INDEX] >= threshold {
        return NORMAL_INDEX;
    }

    let mut best = 0;
    for (i, p) in probabilities.iter().enumerate().skip(1) {
        if *p > probabilities[best] {
            best = i;
        }
    }
    best
}

/// Validate a probability vector against the class map and build the result.
pub fn classify(
    classes: &FaultClassMap,
    probabilities: Vec<f64>,
    threshold: f64,
    now: Timestamp,
) -> Result<ClassificationResult, CoreError> {
    if probabilities.len() != classes.len() {
        return Err(CoreError::Validation(format!(
            "Classifier returned {} probabilities for {} classes",
            probabilities.len(),
            classes.len()
        )));
    }
    if probabilities.iter().any(|p| !p.is_finite()) {
        return Err(CoreError::Validation(
            "Classifier returned a non-finite probability".to_string(),
        ));
    }

    let class = classes.get(select_verdict(&probabilities, threshold))?;
    Ok(ClassificationResult {
        class,
        probabilities,
        timestamp: now,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
