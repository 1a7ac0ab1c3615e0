use crate::{
    config::{LabelsConfig, NutritionConfig, Validatable},
    error::StateError,
    nutrition::NutritionTable,
};
use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

/// Read-only tables shared by every request: the class labels and the nutrition database.
#[derive(Debug)]
pub struct ServiceState {
    class_labels: Vec<String>,
    nutrition: NutritionTable,
}

impl ServiceState {
    pub fn new(
        labels_cfg: &LabelsConfig,
        nutrition_cfg: &NutritionConfig,
    ) -> Result<Self, StateError> {
        let class_labels = load_class_labels(&labels_cfg.get_path())?;
        let nutrition = NutritionTable::load(&nutrition_cfg.get_path())?;

        tracing::info!(
            "Loaded {} class labels and {} nutrition records",
            class_labels.len(),
            nutrition.len()
        );

        Ok(Self::from_parts(class_labels, nutrition))
    }

    pub fn from_parts(class_labels: Vec<String>, nutrition: NutritionTable) -> Self {
        Self {
            class_labels,
            nutrition,
        }
    }

    pub fn get_labels(&self) -> &[String] {
        &self.class_labels
    }

    pub fn get_nutrition(&self) -> &NutritionTable {
        &self.nutrition
    }
}

/// One label per line, trimmed; line order is the classifier's class index.
pub fn load_class_labels(filepath: &Path) -> Result<Vec<String>, StateError> {
    let io_error = |source: std::io::Error| StateError::Io {
        path: filepath.to_path_buf(),
        source,
    };

    let file = File::open(filepath).map_err(io_error)?;
    let reader = BufReader::new(file);

    let labels = reader
        .lines()
        .map(|line| line.map(|l| l.trim().to_string()))
        .collect::<Result<Vec<String>, _>>()
        .map_err(io_error)?;

    if labels.is_empty() {
        return Err(StateError::EmptyLabels(filepath.to_path_buf()));
    }

    Ok(labels)
}
