//! Fault class registry.
//!
//! The classifier emits one probability per class index. [`FaultClassMap`]
//! maps those indices to human-readable names so the class set is
//! configuration rather than code. Index 0 is always the normal condition.

use serde::Serialize;

use crate::error::CoreError;

/// Index of the normal (no fault) class in every [`FaultClassMap`].
pub const NORMAL_INDEX: usize = 0;

/// Class names used when no explicit list is configured.
pub const DEFAULT_CLASS_NAMES: &[&str] = &["Normal", "Bearing Fault", "Overheating"];

/// One machine condition the classifier can output.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct FaultClass {
    /// Position in the classifier's probability vector.
    pub index: usize,
    /// Display name, also used as the cooldown key suffix.
    pub name: String,
}

impl FaultClass {
    pub fn is_normal(&self) -> bool {
        self.index == NORMAL_INDEX
    }
}

/// Ordered index-to-name mapping of every class the classifier knows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FaultClassMap {
    names: Vec<String>,
}

impl FaultClassMap {
    /// Build a map from names in classifier index order.
    ///
    /// Requires at least two classes (normal plus one fault) and rejects
    /// blank or duplicate names.
    pub fn new<I, S>(names: I) -> Result<Self, CoreError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names
            .into_iter()
            .map(|n| n.into().trim().to_string())
            .collect();

        if names.len() < 2 {
            return Err(CoreError::Validation(format!(
                "At least two fault classes are required, got {}",
                names.len()
            )));
        }
        if let Some(pos) = names.iter().position(|n| n.is_empty()) {
            return Err(CoreError::Validation(format!(
                "Fault class name at index {pos} is empty"
            )));
        }
        for (i, name) in names.iter().enumerate() {
            if names[..i].contains(name) {
                return Err(CoreError::Validation(format!(
                    "Duplicate fault class name: '{name}'"
                )));
            }
        }

        Ok(Self { names })
    }

    /// Parse a comma-separated list, e.g. `"Normal,Bearing Fault,Overheating"`.
    pub fn parse(list: &str) -> Result<Self, CoreError> {
        Self::new(list.split(','))
    }

    /// Number of known classes (and expected probability vector length).
    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Resolve a class index to its [`FaultClass`].
    pub fn get(&self, index: usize) -> Result<FaultClass, CoreError> {
        self.names
            .get(index)
            .map(|name| FaultClass {
                index,
                name: name.clone(),
            })
            .ok_or(CoreError::UnknownFaultClass(index))
    }

    /// The normal class (always index 0).
    pub fn normal(&self) -> FaultClass {
        FaultClass {
            index: NORMAL_INDEX,
            name: self.names[NORMAL_INDEX].clone(),
        }
    }

    /// Iterate over every class in index order.
    pub fn iter(&self) -> impl Iterator<Item = FaultClass> + '_ {
        self.names.iter().enumerate().map(|(index, name)| FaultClass {
            index,
            name: name.clone(),
        })
    }
}

impl Default for FaultClassMap {
    fn default() -> Self {
        Self {
            names: DEFAULT_CLASS_NAMES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
