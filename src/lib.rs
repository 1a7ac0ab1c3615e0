mod app;
mod inference_service;
mod ort_service;
mod preprocess;
mod routes;
mod server;
mod telemetry;

pub mod config;
pub mod error;
pub mod model_service;
pub mod nutrition;
pub mod prediction;
pub mod state;

pub use app::start_app;
pub use inference_service::InferenceService;
pub use server::{build_router, SharedState};
pub use telemetry::Metrics;
