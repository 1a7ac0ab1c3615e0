use crate::{
    config::{ModelConfig, Validatable},
    error::PredictError,
    model_service::ModelService,
};
use async_trait::async_trait;
use ndarray::{Array, Ix4};
use ort::{
    session::{builder::GraphOptimizationLevel, Session},
    value::TensorRef,
};
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, Mutex,
};

#[derive(Clone)]
pub struct OrtModelService {
    sessions: Arc<Vec<Arc<Mutex<Session>>>>,
    counter: Arc<AtomicUsize>,
    output_name: Arc<str>,
}

impl OrtModelService {
    pub fn new(model_config: &ModelConfig) -> anyhow::Result<Self> {
        ort::init().with_name("food_macros").commit()?;

        let num_instances = model_config.num_instances.max(1);
        let sessions = (0..num_instances)
            .map(|_| {
                let session = Session::builder()?
                    .with_optimization_level(GraphOptimizationLevel::Level3)?
                    .commit_from_file(model_config.get_path())?;
                Ok(Arc::new(Mutex::new(session)))
            })
            .collect::<Result<Vec<_>, ort::Error>>()?;

        {
            let session = sessions[0]
                .lock()
                .map_err(|e| anyhow::anyhow!("session mutex poisoned: {}", e))?;
            let output_names: Vec<&str> = session.outputs.iter().map(|o| o.name.as_str()).collect();
            if !output_names.contains(&model_config.output_name.as_str()) {
                anyhow::bail!(
                    "Model has no output named `{}`, available outputs: {:?}",
                    model_config.output_name,
                    output_names
                );
            }
        }

        tracing::info!("Created {} ONNX sessions", num_instances);

        Ok(Self {
            sessions: Arc::new(sessions),
            counter: Arc::new(AtomicUsize::new(0)),
            output_name: Arc::from(model_config.output_name.as_str()),
        })
    }

    pub fn run_inference(&self, input: &Array<f32, Ix4>) -> Result<Vec<f32>, PredictError> {
        let index = self.counter.fetch_add(1, Ordering::SeqCst) % self.sessions.len();
        let mut session = self.sessions[index]
            .lock()
            .map_err(|e| PredictError::Inference(format!("session mutex poisoned: {}", e)))?;

        tracing::debug!("Handling request with session {}", index);
        let tensor_ref = TensorRef::from_array_view(input.view())
            .map_err(|e| PredictError::Inference(format!("failed to build tensor: {}", e)))?;

        let outputs = session
            .run(ort::inputs![tensor_ref])
            .map_err(|e| PredictError::Inference(e.to_string()))?;

        let (_shape, scores) = outputs[&*self.output_name]
            .try_extract_tensor::<f32>()
            .map_err(|e| PredictError::Inference(format!("failed to extract tensor: {}", e)))?;

        Ok(scores.to_vec())
    }
}

#[async_trait]
impl ModelService for OrtModelService {
    async fn predict(&self, input: Array<f32, Ix4>) -> Result<Vec<f32>, PredictError> {
        let model_service = self.clone();
        tokio::task::spawn_blocking(move || model_service.run_inference(&input))
            .await
            .map_err(|e| PredictError::Inference(format!("inference task failed: {}", e)))?
    }
}
