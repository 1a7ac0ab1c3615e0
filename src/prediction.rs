use crate::nutrition::{lookup_key, NutritionRecord, NutritionTable};
use serde::{Deserialize, Serialize};

pub const UNKNOWN: &str = "Unknown";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MacroPrediction {
    pub food_item: String,
    pub serving_size: String,
    pub protein_g: f64,
    pub fat_g: f64,
    pub carbs_g: f64,
    pub fiber_g: f64,
    pub sugar_g: f64,
    pub calories_kcal: f64,
}

impl MacroPrediction {
    /// Zeroed macros for a food item with no nutrition data.
    pub fn unknown(food_item: &str) -> Self {
        Self::merge(food_item, &NutritionRecord::default())
    }

    /// Builds the response for a predicted label. An unmatched label, or no label at all,
    /// still yields a fully populated record with zeroed macros.
    pub fn resolve(label: Option<&str>, table: &NutritionTable) -> Self {
        let Some(label) = label else {
            return Self::unknown(UNKNOWN);
        };

        match table.get(&lookup_key(label)) {
            Some(record) => Self::merge(label, record),
            None => Self::unknown(label),
        }
    }

    fn merge(food_item: &str, record: &NutritionRecord) -> Self {
        let serving_size = record
            .serving_size
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(UNKNOWN);

        Self {
            food_item: food_item.to_string(),
            serving_size: serving_size.to_string(),
            protein_g: record.protein.unwrap_or(0.0),
            fat_g: record.fat.unwrap_or(0.0),
            carbs_g: record.carbs.unwrap_or(0.0),
            fiber_g: record.fiber.unwrap_or(0.0),
            sugar_g: record.sugar.unwrap_or(0.0),
            calories_kcal: record.calories.unwrap_or(0.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> NutritionTable {
        NutritionTable::from_json(
            r#"{
                "pizza": {"serving_size": "1 slice", "calories": 285, "protein": 12, "fat": 10, "carbs": 36, "fiber": 2, "sugar": 4},
                "apple_pie": {"serving_size": "1 slice", "calories": 296},
                "ramen": {"serving_size": "  ", "protein": 10}
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_resolve_matched_label() {
        let prediction = MacroPrediction::resolve(Some("Pizza"), &table());
        assert_eq!(
            prediction,
            MacroPrediction {
                food_item: "Pizza".to_string(),
                serving_size: "1 slice".to_string(),
                protein_g: 12.0,
                fat_g: 10.0,
                carbs_g: 36.0,
                fiber_g: 2.0,
                sugar_g: 4.0,
                calories_kcal: 285.0,
            }
        );
    }

    #[test]
    fn test_resolve_unmatched_label() {
        let prediction = MacroPrediction::resolve(Some("Unknown Dish"), &table());
        assert_eq!(
            prediction,
            MacroPrediction {
                food_item: "Unknown Dish".to_string(),
                serving_size: "Unknown".to_string(),
                protein_g: 0.0,
                fat_g: 0.0,
                carbs_g: 0.0,
                fiber_g: 0.0,
                sugar_g: 0.0,
                calories_kcal: 0.0,
            }
        );
    }

    #[test]
    fn test_resolve_partial_record_uses_defaults() {
        let prediction = MacroPrediction::resolve(Some("Apple Pie"), &table());
        assert_eq!(prediction.food_item, "Apple Pie");
        assert_eq!(prediction.serving_size, "1 slice");
        assert_eq!(prediction.calories_kcal, 296.0);
        assert_eq!(prediction.protein_g, 0.0);
        assert_eq!(prediction.sugar_g, 0.0);

        let prediction = MacroPrediction::resolve(Some("Ramen"), &table());
        assert_eq!(prediction.serving_size, "Unknown");
        assert_eq!(prediction.protein_g, 10.0);
    }

    #[test]
    fn test_resolve_keeps_serving_size_verbatim() {
        let table = NutritionTable::from_json(
            r#"{"pizza": {"serving_size": " 1 slice "}, "sushi": {"serving_size": ""}}"#,
        )
        .unwrap();

        let prediction = MacroPrediction::resolve(Some("Pizza"), &table);
        assert_eq!(prediction.serving_size, " 1 slice ");

        let prediction = MacroPrediction::resolve(Some("Sushi"), &table);
        assert_eq!(prediction.serving_size, "Unknown");
    }

    #[test]
    fn test_resolve_without_prediction() {
        let prediction = MacroPrediction::resolve(None, &table());
        assert_eq!(prediction, MacroPrediction::unknown("Unknown"));
        assert_eq!(prediction.food_item, "Unknown");
        assert_eq!(prediction.serving_size, "Unknown");
    }

    #[test]
    fn test_serialized_shape() {
        let value = serde_json::to_value(MacroPrediction::resolve(Some("Pizza"), &table())).unwrap();
        let object = value.as_object().unwrap();

        let mut keys: Vec<&str> = object.keys().map(String::as_str).collect();
        keys.sort_unstable();
        assert_eq!(
            keys,
            vec![
                "calories_kcal",
                "carbs_g",
                "fat_g",
                "fiber_g",
                "food_item",
                "protein_g",
                "serving_size",
                "sugar_g"
            ]
        );
        assert_eq!(object["calories_kcal"], 285.0);
    }
}
