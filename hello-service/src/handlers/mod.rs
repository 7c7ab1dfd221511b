use axum::{body::Bytes, Json};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

#[derive(Deserialize, Debug)]
pub struct GreetingRequest {
    pub name: String,
}

#[derive(Serialize, Debug)]
pub struct GreetingResponse {
    pub message: String,
}

pub fn greeting_for(name: &str) -> String {
    format!("Hello {}!", name)
}

// POST /
pub async fn greet(body: Bytes) -> Result<Json<GreetingResponse>> {
    let request: GreetingRequest = serde_json::from_slice(&body)?;
    tracing::info!("Greeting {}", request.name);

    Ok(Json(GreetingResponse {
        message: greeting_for(&request.name),
    }))
}

// Any other method
pub async fn method_not_allowed() -> AppError {
    AppError::MethodNotAllowed
}
