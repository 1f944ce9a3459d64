// Remote data source - JSON client for another instance of this service
use crate::application::usage_repository::UsageDataSource;
use crate::domain::model::ModelDescriptor;
use crate::domain::usage::{parse_usage, Acknowledgement, ModelUsage, UsageEntry, WireModelUsage, WireUsageEntry};
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct RemoteRepository {
    base_url: String,
    client: reqwest::Client,
}

impl RemoteRepository {
    pub fn new(base_url: String, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = self
            .client
            .get(self.url(path))
            .header("Accept", "application/json")
            .send()
            .await
            .with_context(|| format!("Failed to send request to {}", path))?;

        Self::decode(path, response).await
    }

    async fn post_json<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T> {
        let response = self
            .client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .with_context(|| format!("Failed to send request to {}", path))?;

        Self::decode(path, response).await
    }

    async fn decode<T: DeserializeOwned>(path: &str, response: reqwest::Response) -> Result<T> {
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Request to {} failed with status {}: {}", path, status, body);
        }

        response
            .json::<T>()
            .await
            .with_context(|| format!("Failed to parse response from {}", path))
    }
}

#[async_trait]
impl UsageDataSource for RemoteRepository {
    async fn list_models(&self) -> Result<Vec<ModelDescriptor>> {
        self.get_json("models").await
    }

    async fn list_model_usage(&self) -> Result<Vec<ModelUsage>> {
        let wire: Vec<WireModelUsage> = self.get_json("usage").await?;
        tracing::debug!("Fetched usage for {} models from {}", wire.len(), self.base_url);
        Ok(parse_usage(wire)?)
    }

    async fn append_usage(&self, entries: Vec<UsageEntry>) -> Result<Acknowledgement> {
        let wire: Vec<WireUsageEntry> = entries.iter().map(UsageEntry::to_wire).collect();
        self.post_json("usage", &wire).await
    }

    async fn register_models(&self, models: Vec<ModelDescriptor>) -> Result<Acknowledgement> {
        self.post_json("models", &models).await
    }
}
