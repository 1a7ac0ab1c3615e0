use crate::{
    config::Config,
    inference_service::InferenceService,
    ort_service::OrtModelService,
    server::{HttpServer, SharedState},
    state::ServiceState,
    telemetry::Metrics,
};
use std::sync::Arc;

pub async fn start_app(config: Config) -> anyhow::Result<()> {
    let service_state = match ServiceState::new(&config.labels, &config.nutrition) {
        Ok(state) => state,
        Err(e) => {
            tracing::error!("Failed to load service state: {}", e);
            return Err(e.into());
        }
    };

    let ort_model_service = match OrtModelService::new(&config.model) {
        Ok(service) => service,
        Err(e) => {
            tracing::error!("Failed to instantiate ort model service: {:?}", e);
            return Err(e);
        }
    };

    let state = SharedState {
        inference_service: InferenceService::new(ort_model_service, service_state),
        metrics: Arc::new(Metrics::new()?),
    };

    let server = HttpServer::new(state, &config.server).await?;
    tracing::info!("Listening on {}", config.server.get_address());

    server.run().await
}
