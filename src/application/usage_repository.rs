// Data source trait for model catalog and usage records
use crate::domain::model::ModelDescriptor;
use crate::domain::usage::{Acknowledgement, ModelUsage, UsageEntry};
use async_trait::async_trait;

/// The four operations of the usage backend. Implementations validate usage
/// payloads at this boundary, so callers only ever see parsed records.
#[async_trait]
pub trait UsageDataSource: Send + Sync {
    /// List the registered models in catalog order
    async fn list_models(&self) -> anyhow::Result<Vec<ModelDescriptor>>;

    /// List every model's usage records in insertion order
    async fn list_model_usage(&self) -> anyhow::Result<Vec<ModelUsage>>;

    /// Append usage records, creating unknown models on the fly
    async fn append_usage(&self, entries: Vec<UsageEntry>) -> anyhow::Result<Acknowledgement>;

    /// Register models, replacing any entry with the same id
    async fn register_models(&self, models: Vec<ModelDescriptor>) -> anyhow::Result<Acknowledgement>;
}
