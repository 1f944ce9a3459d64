// Snapshot service - Latest fetched catalog and usage, refreshed periodically
use crate::application::usage_repository::UsageDataSource;
use crate::domain::model::ModelDescriptor;
use crate::domain::usage::ModelUsage;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio_stream::wrappers::IntervalStream;
use tokio_stream::StreamExt;

/// One fetch of the data source, replaced wholesale by the next.
#[derive(Debug, Clone)]
pub struct UsageSnapshot {
    pub models: Vec<ModelDescriptor>,
    pub usage: Vec<ModelUsage>,
    pub fetched_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct SnapshotState {
    latest: Option<Arc<UsageSnapshot>>,
    // Bumped on every store and invalidation
    epoch: u64,
}

#[derive(Clone)]
pub struct SnapshotService {
    repository: Arc<dyn UsageDataSource>,
    state: Arc<RwLock<SnapshotState>>,
}

impl SnapshotService {
    pub fn new(repository: Arc<dyn UsageDataSource>) -> Self {
        Self {
            repository,
            state: Arc::new(RwLock::new(SnapshotState::default())),
        }
    }

    pub fn repository(&self) -> &Arc<dyn UsageDataSource> {
        &self.repository
    }

    /// The stored snapshot, fetching one if there is none yet
    pub async fn current(&self) -> anyhow::Result<Arc<UsageSnapshot>> {
        if let Some(snapshot) = &self.state.read().await.latest {
            return Ok(snapshot.clone());
        }
        self.refresh().await
    }

    /// Fetch a fresh snapshot.
    ///
    /// The result is only stored when nothing was stored or invalidated while
    /// the fetch was in flight; otherwise it is handed back to the caller and
    /// dropped.
    pub async fn refresh(&self) -> anyhow::Result<Arc<UsageSnapshot>> {
        let epoch = self.state.read().await.epoch;
        let fetched_at = Utc::now();

        let (models, usage) = futures::try_join!(
            self.repository.list_models(),
            self.repository.list_model_usage()
        )?;
        let snapshot = Arc::new(UsageSnapshot {
            models,
            usage,
            fetched_at,
        });

        let mut state = self.state.write().await;
        if state.epoch == epoch {
            state.latest = Some(snapshot.clone());
            state.epoch += 1;
        } else {
            tracing::debug!("Discarding snapshot fetched at {}, superseded", fetched_at);
        }

        Ok(snapshot)
    }

    /// Drop the stored snapshot so the next read fetches again
    pub async fn invalidate(&self) {
        let mut state = self.state.write().await;
        state.latest = None;
        state.epoch += 1;
    }

    /// Refresh on a fixed interval until the runtime shuts down.
    /// Failed refreshes keep the previous snapshot.
    pub fn spawn_refresh(&self, every: Duration) -> JoinHandle<()> {
        let service = self.clone();

        tokio::spawn(async move {
            let mut ticks = IntervalStream::new(tokio::time::interval(every));
            // The first tick fires immediately
            ticks.next().await;

            while ticks.next().await.is_some() {
                match service.refresh().await {
                    Ok(snapshot) => tracing::debug!(
                        "Refreshed snapshot: {} models, {} usage series",
                        snapshot.models.len(),
                        snapshot.usage.len()
                    ),
                    Err(e) => tracing::warn!("Snapshot refresh failed, keeping previous: {:#}", e),
                }
            }
        })
    }
}
