// Dashboard service - Use cases for the overview and per-model analytics
use crate::application::snapshot_service::SnapshotService;
use crate::domain::dashboard::{ModelAnalytics, ModelTotal, Overview, RankedModel, TimePoint};
use crate::domain::series::align_series;
use crate::domain::time_axis::build_time_axis;
use crate::domain::usage::ModelUsage;
use crate::domain::window::{sum_by_hour_window, top_n_by_recent_usage, WindowSpec};
use crate::infrastructure::config::DashboardSettings;
use std::num::NonZeroUsize;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown model {0:?}")]
pub struct UnknownModel(pub String);

#[derive(Clone)]
pub struct DashboardService {
    snapshots: SnapshotService,
    top_models: NonZeroUsize,
    recent_samples: NonZeroUsize,
}

impl DashboardService {
    pub fn new(snapshots: SnapshotService, settings: &DashboardSettings) -> Self {
        Self {
            snapshots,
            top_models: settings.top_models,
            recent_samples: settings.recent_samples,
        }
    }

    pub async fn overview(&self) -> anyhow::Result<Overview> {
        let snapshot = self.snapshots.current().await?;
        let usage = &snapshot.usage;

        let axis = build_time_axis(usage);
        let series = align_series(usage, &axis);

        let totals = usage
            .iter()
            .map(|u| ModelTotal {
                model_id: u.model_id.clone(),
                display_name: u.display_name.clone(),
                total: u.total_requests(),
            })
            .collect();

        // Only catalogued models are ranked
        let catalogued: Vec<ModelUsage> = usage
            .iter()
            .filter(|u| snapshot.models.iter().any(|m| m.model_id == u.model_id))
            .cloned()
            .collect();
        let top_models = top_n_by_recent_usage(&catalogued, self.top_models, self.recent_samples)
            .into_iter()
            .enumerate()
            .filter_map(|(i, result)| {
                let descriptor = snapshot.models.iter().find(|m| m.model_id == result.model_id)?;
                Some(RankedModel::new(i + 1, result, descriptor))
            })
            .collect();

        tracing::debug!(
            "Built overview: {} series over {} timestamps",
            usage.len(),
            axis.len()
        );

        Ok(Overview {
            axis,
            series,
            totals,
            top_models,
            fetched_at: snapshot.fetched_at,
        })
    }

    pub async fn model_analytics(&self, model_id: &str, window: WindowSpec) -> anyhow::Result<ModelAnalytics> {
        let snapshot = self.snapshots.current().await?;
        let usage = snapshot
            .usage
            .iter()
            .find(|u| u.model_id == model_id)
            .ok_or_else(|| UnknownModel(model_id.to_string()))?;

        let window = sum_by_hour_window(usage, window)?;

        let mut points: Vec<TimePoint> = usage
            .records
            .iter()
            .map(|r| TimePoint {
                timestamp: r.timestamp,
                request_count: r.request_count,
            })
            .collect();
        points.sort_by_key(|p| p.timestamp);

        Ok(ModelAnalytics {
            model_id: usage.model_id.clone(),
            display_name: usage.display_name.clone(),
            descriptor: snapshot.models.iter().find(|m| m.model_id == model_id).cloned(),
            points,
            window,
        })
    }
}
