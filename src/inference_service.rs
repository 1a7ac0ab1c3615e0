use crate::{
    error::PredictError, model_service::ModelService, prediction::MacroPrediction,
    preprocess::transform_image, state::ServiceState,
};
use ndarray::{Array, Ix4};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub class_id: usize,
    pub label: String,
    pub score: f32,
}

/// Index and value of the highest score. Ties go to the lowest index.
pub fn top_class(scores: &[f32]) -> Option<(usize, f32)> {
    scores
        .iter()
        .copied()
        .enumerate()
        .reduce(|accum, row| if row.1 > accum.1 { row } else { accum })
}

#[derive(Debug)]
pub struct InferenceService<M: ModelService> {
    model_service: Arc<M>,
    service_state: Arc<ServiceState>,
}

impl<M: ModelService> Clone for InferenceService<M> {
    fn clone(&self) -> Self {
        Self {
            model_service: self.model_service.clone(),
            service_state: self.service_state.clone(),
        }
    }
}

impl<M: ModelService> InferenceService<M> {
    pub fn new(model_service: M, state: ServiceState) -> Self {
        Self {
            model_service: Arc::new(model_service),
            service_state: Arc::new(state),
        }
    }

    pub fn state(&self) -> &ServiceState {
        &self.service_state
    }

    pub async fn classify(&self, input: Array<f32, Ix4>) -> Result<Classification, PredictError> {
        let scores = self.model_service.predict(input).await?;
        let labels = self.service_state.get_labels();

        if scores.len() != labels.len() {
            tracing::warn!(
                "Model returned {} scores for {} labels",
                scores.len(),
                labels.len()
            );
        }

        let (class_id, score) = top_class(&scores)
            .ok_or_else(|| PredictError::Inference("model returned no scores".to_string()))?;

        let label = labels.get(class_id).ok_or_else(|| {
            PredictError::Inference(format!(
                "class index {} is outside of the {} known labels",
                class_id,
                labels.len()
            ))
        })?;

        Ok(Classification {
            class_id,
            label: label.clone(),
            score,
        })
    }

    /// Decode, classify and look up nutrition for one uploaded image.
    pub async fn predict_macros(&self, image_data: &[u8]) -> Result<MacroPrediction, PredictError> {
        let input = transform_image(image_data)?;
        let classification = self.classify(input).await?;

        tracing::debug!(
            "Predicted class_id={}, label={}, score={:.3}",
            classification.class_id,
            classification.label,
            classification.score
        );

        Ok(MacroPrediction::resolve(
            Some(&classification.label),
            self.service_state.get_nutrition(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nutrition::NutritionTable;
    use async_trait::async_trait;
    use image::{ImageBuffer, Rgb};
    use std::io::Cursor;

    #[derive(Clone)]
    struct MockModelService {
        scores: Vec<f32>,
    }

    #[async_trait]
    impl ModelService for MockModelService {
        async fn predict(&self, input: Array<f32, Ix4>) -> Result<Vec<f32>, PredictError> {
            assert_eq!(input.shape(), &[1, 224, 224, 3]);
            Ok(self.scores.clone())
        }
    }

    fn mock_state() -> ServiceState {
        let nutrition = NutritionTable::from_json(
            r#"{"pizza": {"serving_size": "1 slice", "calories": 285, "protein": 12, "fat": 10, "carbs": 36, "fiber": 2, "sugar": 4}}"#,
        )
        .unwrap();
        ServiceState::from_parts(
            vec!["Sushi".into(), "Pizza".into(), "Unknown Dish".into()],
            nutrition,
        )
    }

    fn png_bytes() -> Vec<u8> {
        let img = ImageBuffer::<Rgb<u8>, Vec<u8>>::from_pixel(64, 48, Rgb([200, 120, 40]));
        let mut image_data: Vec<u8> = Vec::new();
        img.write_to(&mut Cursor::new(&mut image_data), image::ImageFormat::Png)
            .unwrap();
        image_data
    }

    #[test]
    fn test_top_class() {
        assert_eq!(top_class(&[0.1, 0.7, 0.2]), Some((1, 0.7)));
        assert_eq!(top_class(&[0.4, 0.1, 0.4]), Some((0, 0.4)));
        assert_eq!(top_class(&[0.2, 0.5, 0.5, 0.1]), Some((1, 0.5)));
        assert_eq!(top_class(&[]), None);
    }

    #[tokio::test]
    async fn test_predict_macros_matched() -> Result<(), Box<dyn std::error::Error>> {
        let service = InferenceService::new(
            MockModelService {
                scores: vec![0.1, 0.8, 0.1],
            },
            mock_state(),
        );

        let prediction = service.predict_macros(&png_bytes()).await?;
        assert_eq!(prediction.food_item, "Pizza");
        assert_eq!(prediction.serving_size, "1 slice");
        assert_eq!(prediction.calories_kcal, 285.0);
        assert_eq!(prediction.carbs_g, 36.0);

        Ok(())
    }

    #[tokio::test]
    async fn test_predict_macros_unmatched() -> Result<(), Box<dyn std::error::Error>> {
        let service = InferenceService::new(
            MockModelService {
                scores: vec![0.1, 0.2, 0.7],
            },
            mock_state(),
        );

        let prediction = service.predict_macros(&png_bytes()).await?;
        assert_eq!(prediction, MacroPrediction::unknown("Unknown Dish"));

        Ok(())
    }

    #[tokio::test]
    async fn test_classify_index_out_of_range() {
        let service = InferenceService::new(
            MockModelService {
                scores: vec![0.0, 0.0, 0.0, 0.9],
            },
            mock_state(),
        );

        let err = service.predict_macros(&png_bytes()).await.unwrap_err();
        assert!(matches!(err, PredictError::Inference(_)));
    }

    #[tokio::test]
    async fn test_classify_empty_scores() {
        let service = InferenceService::new(MockModelService { scores: vec![] }, mock_state());

        let err = service
            .classify(Array::zeros((1, 224, 224, 3)))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("no scores"));
    }

    #[tokio::test]
    async fn test_predict_macros_decode_error() {
        let service = InferenceService::new(
            MockModelService {
                scores: vec![1.0, 0.0, 0.0],
            },
            mock_state(),
        );

        let err = service.predict_macros(b"\x89PNG garbage").await.unwrap_err();
        assert!(matches!(err, PredictError::Decode(_)));
    }
}
