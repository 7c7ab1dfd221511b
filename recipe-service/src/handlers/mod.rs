pub mod recipe_handlers;

use serde::de::DeserializeOwned;

use crate::error::Result;

/// Parses a required JSON request body
pub fn parse_json_body<T>(body: &[u8]) -> Result<T>
where
    T: DeserializeOwned,
{
    tracing::debug!("Parsing request body: {} bytes", body.len());
    Ok(serde_json::from_slice(body)?)
}
