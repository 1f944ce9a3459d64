// Dashboard view models
use super::model::ModelDescriptor;
use super::series::AlignedSeries;
use super::time_axis::TimeAxis;
use super::window::WindowResult;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// All-time request total for one model (the usage breakdown donut).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModelTotal {
    pub model_id: String,
    pub display_name: String,
    pub total: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankedModel {
    pub rank: usize,
    #[serde(flatten)]
    pub usage: WindowResult,
    pub provider: String,
    pub version: String,
    pub image: String,
}

impl RankedModel {
    pub fn new(rank: usize, usage: WindowResult, descriptor: &ModelDescriptor) -> Self {
        Self {
            rank,
            usage,
            provider: descriptor.provider.clone(),
            version: descriptor.version.clone(),
            image: descriptor.image.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Overview {
    pub axis: TimeAxis,
    pub series: Vec<AlignedSeries>,
    pub totals: Vec<ModelTotal>,
    pub top_models: Vec<RankedModel>,
    pub fetched_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimePoint {
    pub timestamp: DateTime<Utc>,
    pub request_count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModelAnalytics {
    pub model_id: String,
    pub display_name: String,
    pub descriptor: Option<ModelDescriptor>,
    pub points: Vec<TimePoint>,
    pub window: WindowResult,
}
