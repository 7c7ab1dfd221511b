use serde::Deserialize;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, StoreError>;

#[derive(Error, Debug)]
pub enum StoreError {
    /// Error reported by the store itself; the message is passed through untouched.
    #[error("{message}")]
    Api {
        message: String,
        code: Option<String>,
        details: Option<String>,
        hint: Option<String>,
    },

    #[error("Store request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Change feed error: {0}")]
    Feed(String),
}

impl StoreError {
    pub fn api(message: impl Into<String>) -> Self {
        StoreError::Api {
            message: message.into(),
            code: None,
            details: None,
            hint: None,
        }
    }

    pub fn with_code(message: impl Into<String>, code: &str) -> Self {
        StoreError::Api {
            message: message.into(),
            code: Some(code.to_string()),
            details: None,
            hint: None,
        }
    }
}

// PostgREST error body: {"message": ..., "code": ..., "details": ..., "hint": ...}
#[derive(Deserialize, Debug)]
pub struct PostgrestErrorBody {
    pub message: Option<String>,
    pub code: Option<String>,
    pub details: Option<String>,
    pub hint: Option<String>,
}

// Helper function to map a non-success store response into a StoreError
pub fn map_postgrest_error(status: u16, body: &str) -> StoreError {
    match serde_json::from_str::<PostgrestErrorBody>(body) {
        Ok(err) => StoreError::Api {
            message: err
                .message
                .unwrap_or_else(|| format!("Store responded with status {}", status)),
            code: err.code,
            details: err.details,
            hint: err.hint,
        },
        Err(_) if body.trim().is_empty() => {
            StoreError::api(format!("Store responded with status {}", status))
        }
        Err(_) => StoreError::api(body.trim().to_string()),
    }
}
