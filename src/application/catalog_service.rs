// Catalog service - Use cases for the models listing and data-source writes
use crate::application::snapshot_service::SnapshotService;
use crate::domain::model::{query_models, ModelDescriptor, ModelPage, ModelQuery};
use crate::domain::usage::{Acknowledgement, ModelUsage, UsageEntry};

#[derive(Clone)]
pub struct CatalogService {
    snapshots: SnapshotService,
}

impl CatalogService {
    pub fn new(snapshots: SnapshotService) -> Self {
        Self { snapshots }
    }

    pub async fn list_models(&self) -> anyhow::Result<Vec<ModelDescriptor>> {
        self.snapshots.repository().list_models().await
    }

    pub async fn list_model_usage(&self) -> anyhow::Result<Vec<ModelUsage>> {
        self.snapshots.repository().list_model_usage().await
    }

    pub async fn query_models(&self, query: &ModelQuery) -> anyhow::Result<ModelPage> {
        let snapshot = self.snapshots.current().await?;
        Ok(query_models(&snapshot.models, query)?)
    }

    pub async fn register_models(&self, models: Vec<ModelDescriptor>) -> anyhow::Result<Acknowledgement> {
        let ack = self.snapshots.repository().register_models(models).await?;
        self.snapshots.invalidate().await;
        Ok(ack)
    }

    pub async fn append_usage(&self, entries: Vec<UsageEntry>) -> anyhow::Result<Acknowledgement> {
        let ack = self.snapshots.repository().append_usage(entries).await?;
        self.snapshots.invalidate().await;
        Ok(ack)
    }
}
