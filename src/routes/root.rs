use axum::response::Json;
use serde::{Deserialize, Serialize};

pub const WELCOME_MESSAGE: &str = "Welcome to the Food Macros Finder API!";

#[derive(Serialize, Deserialize)]
pub struct Welcome {
    message: String,
}

pub async fn root() -> Json<Welcome> {
    Json(Welcome {
        message: WELCOME_MESSAGE.into(),
    })
}
