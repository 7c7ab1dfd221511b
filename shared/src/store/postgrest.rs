use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use tracing::{debug, error};

use crate::config::StoreConfig;
use crate::error::{map_postgrest_error, Result};
use crate::models::{RecipeId, Row};
use crate::store::{Columns, RecipeStore};

const RETURN_REPRESENTATION: &str = "return=representation";

/// Store backed by the PostgREST API of the hosted database
pub struct PostgrestRecipeStore {
    client: Client,
    endpoint: String,
    api_key: String,
}

impl PostgrestRecipeStore {
    /// Creates a store for the configured table. Fails when the HTTP client
    /// cannot be built, e.g. the TLS backend does not initialise.
    pub fn new(config: &StoreConfig) -> Result<Self> {
        let client = Client::builder().build()?;
        Ok(Self::with_client_and_endpoint(
            client,
            config.rest_url(),
            config.service_role_key.clone(),
        ))
    }

    /// Creates a store with the specified client and table endpoint.
    /// This is mainly useful for testing against a mock server.
    pub fn with_client_and_endpoint(client: Client, endpoint: String, api_key: String) -> Self {
        Self {
            client,
            endpoint,
            api_key,
        }
    }

    // Every request carries the service key both as apikey and as bearer token
    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .header("Content-Type", "application/json")
    }

    async fn send(&self, operation: &str, builder: RequestBuilder) -> Result<Response> {
        let response = self.authorized(builder).send().await?;
        let status = response.status();
        debug!("Store {} responded with status {}", operation, status);

        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        error!("Store {} failed: status={}, body={}", operation, status, body);
        Err(map_postgrest_error(status.as_u16(), &body))
    }

    async fn rows(response: Response) -> Result<Vec<Row>> {
        let bytes = response.bytes().await?;
        if bytes.is_empty() {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_slice(&bytes)?)
    }
}

#[async_trait]
impl RecipeStore for PostgrestRecipeStore {
    async fn select(&self, columns: &Columns) -> Result<Vec<Row>> {
        let request = self
            .client
            .get(&self.endpoint)
            .query(&[("select", columns.to_string())]);

        let response = self.send("select", request).await?;
        Self::rows(response).await
    }

    async fn insert(&self, row: Row) -> Result<Vec<Row>> {
        let request = self
            .client
            .post(&self.endpoint)
            .header("Prefer", RETURN_REPRESENTATION)
            .query(&[("select", "*")])
            .json(&[row]);

        let response = self.send("insert", request).await?;
        Self::rows(response).await
    }

    async fn update(&self, id: &RecipeId, fields: Row) -> Result<Vec<Row>> {
        let request = self
            .client
            .patch(&self.endpoint)
            .header("Prefer", RETURN_REPRESENTATION)
            .query(&[("id", format!("eq.{}", id)), ("select", "*".to_string())])
            .json(&fields);

        let response = self.send("update", request).await?;
        Self::rows(response).await
    }

    async fn delete(&self, id: &RecipeId) -> Result<()> {
        let request = self
            .client
            .delete(&self.endpoint)
            .query(&[("id", format!("eq.{}", id))]);

        self.send("delete", request).await?;
        Ok(())
    }
}
