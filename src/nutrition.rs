use crate::error::StateError;
use serde::Deserialize;
use std::{collections::HashMap, path::Path};

/// One entry of the nutrition database. Every field is optional in the source data.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct NutritionRecord {
    pub serving_size: Option<String>,
    pub calories: Option<f64>,
    pub protein: Option<f64>,
    pub fat: Option<f64>,
    pub carbs: Option<f64>,
    pub fiber: Option<f64>,
    pub sugar: Option<f64>,
}

impl NutritionRecord {
    fn validate(&self, key: &str) -> Result<(), StateError> {
        let values = [
            ("calories", self.calories),
            ("protein", self.protein),
            ("fat", self.fat),
            ("carbs", self.carbs),
            ("fiber", self.fiber),
            ("sugar", self.sugar),
        ];

        for (name, value) in values {
            if let Some(v) = value {
                if !v.is_finite() || v < 0.0 {
                    return Err(StateError::InvalidRecord {
                        key: key.to_string(),
                        reason: format!("{} must be a non-negative number, got {}", name, v),
                    });
                }
            }
        }

        Ok(())
    }
}

/// Lower-cases a label and swaps spaces for underscores, matching the database keys.
pub fn lookup_key(label: &str) -> String {
    label.to_lowercase().replace(' ', "_")
}

#[derive(Debug, Clone, Default)]
pub struct NutritionTable {
    records: HashMap<String, NutritionRecord>,
}

impl NutritionTable {
    pub fn load(path: &Path) -> Result<Self, StateError> {
        let raw = std::fs::read_to_string(path).map_err(|source| StateError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self, StateError> {
        let records: HashMap<String, NutritionRecord> = serde_json::from_str(raw)?;
        for (key, record) in &records {
            record.validate(key)?;
        }
        Ok(Self { records })
    }

    pub fn get(&self, key: &str) -> Option<&NutritionRecord> {
        self.records.get(key)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
