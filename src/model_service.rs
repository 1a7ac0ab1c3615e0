use crate::error::PredictError;
use async_trait::async_trait;
use ndarray::{Array, Ix4};

#[async_trait]
pub trait ModelService: Send + Sync + Clone + 'static {
    /// Runs the classifier on a single-image batch and returns one score per class label.
    async fn predict(&self, input: Array<f32, Ix4>) -> Result<Vec<f32>, PredictError>;
}
