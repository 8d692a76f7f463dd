use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::clients::errors::ClientError;
use crate::config::NamingConfig;

/// Generative naming service interface.
///
/// Takes the item set, returns one suggested collection name. No side
/// effects; every invocation is independent. Failures are always
/// infrastructure-level (`ClientError`), never a business outcome.
#[async_trait]
pub trait NamingService<I>: Send + Sync {
    async fn suggest_name(&self, items: &[I]) -> Result<String, ClientError>;
}

#[derive(Debug, Serialize)]
struct SuggestionRequest<'a, I> {
    items: &'a [I],
}

#[derive(Debug, Deserialize)]
struct SuggestionResponse {
    name: String,
}

/// HTTP-backed naming service.
///
/// Posts the item payload as JSON to the configured endpoint and expects
/// `{ "name": "..." }` back.
#[derive(Debug)]
pub struct HttpNamingService {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
}

impl HttpNamingService {
    pub fn new(config: &NamingConfig) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| ClientError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            api_key: config.api_key.clone(),
        })
    }
}

#[async_trait]
impl<I> NamingService<I> for HttpNamingService
where
    I: Serialize + Send + Sync,
{
    async fn suggest_name(&self, items: &[I]) -> Result<String, ClientError> {
        debug!(endpoint = %self.endpoint, items = items.len(), "requesting name suggestion");

        let mut request = self
            .client
            .post(&self.endpoint)
            .json(&SuggestionRequest { items });
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ClientError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ClientError::Service {
                status: status.as_u16(),
                message,
            });
        }

        let body: SuggestionResponse = response
            .json()
            .await
            .map_err(|e| ClientError::BadResponse(e.to_string()))?;

        let name = body.name.trim();
        if name.is_empty() {
            return Err(ClientError::BadResponse(
                "naming service returned an empty name".to_string(),
            ));
        }

        Ok(name.to_string())
    }
}
