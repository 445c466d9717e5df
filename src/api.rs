use crate::models::{ArchiveEntry, GenerationRequest, GenerationResponse, HistoryRecord};
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;

// Trait for the remote service that turns a prompt into text
#[async_trait]
pub trait GenerationService: Send + Sync {
    async fn generate(&self, request: &GenerationRequest) -> Result<GenerationResponse>;
}

// Trait for the remote list service that keeps past documents
#[async_trait]
pub trait HistoryBackend: Send + Sync {
    async fn list(&self) -> Result<Vec<HistoryRecord>>;
    async fn archive(&self, entry: &ArchiveEntry) -> Result<()>;
}

// --- HTTP implementations ---

pub struct HttpGenerationService {
    client: Client,
    endpoint: String,
}

impl HttpGenerationService {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl GenerationService for HttpGenerationService {
    async fn generate(&self, request: &GenerationRequest) -> Result<GenerationResponse> {
        log::info!(
            "Sending generation request to {} (topic: {}, max_tokens: {})",
            self.endpoint,
            request.topic,
            request.max_tokens
        );

        let response = self
            .client
            .post(&self.endpoint)
            .json(request)
            .send()
            .await
            .context("Failed to send generation request")?;

        if !response.status().is_success() {
            let status = response.status();
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "<Failed to read error body>".to_string());
            log::error!("Generation request failed with status {}: {}", status, error_body);
            return Err(anyhow::anyhow!(
                "Generation request failed with status {}: {}",
                status,
                error_body
            ));
        }

        response
            .json::<GenerationResponse>()
            .await
            .context("Failed to parse generation response")
    }
}

pub struct HttpHistoryBackend {
    client: Client,
    endpoint: String,
}

impl HttpHistoryBackend {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl HistoryBackend for HttpHistoryBackend {
    async fn list(&self) -> Result<Vec<HistoryRecord>> {
        log::info!("Fetching history from {}", self.endpoint);

        let response = self
            .client
            .get(&self.endpoint)
            .send()
            .await
            .context("Failed to send history request")?;

        if !response.status().is_success() {
            return Err(anyhow::anyhow!(
                "History request failed with status {}",
                response.status()
            ));
        }

        // Decode records one by one so a single odd row doesn't sink the list
        let rows: Option<Vec<serde_json::Value>> = response
            .json()
            .await
            .context("Failed to parse history response")?;

        let records = rows
            .unwrap_or_default()
            .into_iter()
            .filter_map(|row| match serde_json::from_value::<HistoryRecord>(row) {
                Ok(record) => Some(record),
                Err(e) => {
                    log::warn!("Skipping malformed history record: {}", e);
                    None
                }
            })
            .collect();

        Ok(records)
    }

    async fn archive(&self, entry: &ArchiveEntry) -> Result<()> {
        log::info!("Archiving document '{}' to {}", entry.topic, self.endpoint);

        let response = self
            .client
            .post(&self.endpoint)
            .json(entry)
            .send()
            .await
            .context("Failed to send archive request")?;

        if !response.status().is_success() {
            return Err(anyhow::anyhow!(
                "Archive request failed with status {}",
                response.status()
            ));
        }
        Ok(())
    }
}
