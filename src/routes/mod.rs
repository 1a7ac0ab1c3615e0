mod health;
mod metrics;
mod predict_macros;
mod root;

use crate::{model_service::ModelService, server::SharedState};
use axum::{
    routing::{get, post},
    Router,
};

pub fn api_routes<M: ModelService>() -> Router<SharedState<M>> {
    Router::new()
        .route("/", get(root::root))
        .route("/health", get(health::healthcheck))
        .route("/metrics", get(metrics::metrics_handler::<M>))
        .route(
            "/predict_macros/",
            post(predict_macros::predict_macros::<M>),
        )
        .route(
            "/predict_macros",
            post(predict_macros::predict_macros::<M>),
        )
}
