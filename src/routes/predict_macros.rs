use crate::{
    error::PredictError,
    model_service::ModelService,
    nutrition::lookup_key,
    prediction::MacroPrediction,
    server::SharedState,
    telemetry::PredictionOutcome,
};
use axum::{
    body::Bytes,
    extract::{multipart::MultipartRejection, Multipart, State},
    response::Json,
};
use std::time::Instant;
use tracing::instrument;

const ROUTE: &str = "/predict_macros/";
const FILE_FIELD: &str = "file";
const INVALID_FILE_TYPE: &str = "Invalid file type. Please upload an image.";

#[instrument(skip(state, multipart))]
pub async fn predict_macros<M: ModelService>(
    State(state): State<SharedState<M>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<MacroPrediction>, PredictError> {
    state.metrics.record_request(ROUTE);
    let start = Instant::now();

    let result = match read_image_upload(multipart).await {
        Ok(image_data) => state
            .inference_service
            .predict_macros(&image_data)
            .await
            .map_err(PredictError::into_processing),
        Err(e) => Err(e),
    };

    let outcome = match &result {
        Ok(prediction) => {
            let nutrition = state.inference_service.state().get_nutrition();
            if nutrition.get(&lookup_key(&prediction.food_item)).is_some() {
                PredictionOutcome::Matched
            } else {
                PredictionOutcome::Unmatched
            }
        }
        Err(PredictError::InvalidInput(_)) => PredictionOutcome::Rejected,
        Err(_) => PredictionOutcome::Error,
    };
    state.metrics.record_prediction(outcome);
    state
        .metrics
        .record_prediction_duration(start.elapsed().as_millis() as u64, ROUTE);

    let prediction = result?;
    tracing::info!(
        "Predicted {} ({}) in {} ms",
        prediction.food_item,
        outcome.as_str(),
        start.elapsed().as_millis()
    );

    Ok(Json(prediction))
}

/// Pulls the `file` field out of the form, rejecting anything not declared as an image.
async fn read_image_upload(
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Bytes, PredictError> {
    let mut multipart = multipart.map_err(|e| PredictError::InvalidInput(e.body_text()))?;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        PredictError::InvalidInput(format!("Failed to read multipart data: {}", e.body_text()))
    })? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let is_image = field
            .content_type()
            .is_some_and(|content_type| content_type.starts_with("image/"));
        if !is_image {
            return Err(PredictError::InvalidInput(INVALID_FILE_TYPE.to_string()));
        }

        return field.bytes().await.map_err(|e| {
            PredictError::InvalidInput(format!("Failed to read file data: {}", e.body_text()))
        });
    }

    Err(PredictError::InvalidInput(format!(
        "No file provided. Upload an image in the `{}` field.",
        FILE_FIELD
    )))
}
