// Shared time axis across all models' usage records
use super::usage::ModelUsage;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeSet;

/// Strictly increasing union of every record timestamp.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TimeAxis {
    instants: Vec<DateTime<Utc>>,
}

impl TimeAxis {
    pub fn len(&self) -> usize {
        self.instants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instants.is_empty()
    }

    pub fn instants(&self) -> &[DateTime<Utc>] {
        &self.instants
    }

    pub fn position(&self, instant: &DateTime<Utc>) -> Option<usize> {
        self.instants.binary_search(instant).ok()
    }
}

pub fn build_time_axis(models: &[ModelUsage]) -> TimeAxis {
    let instants: BTreeSet<DateTime<Utc>> = models
        .iter()
        .flat_map(|m| m.records.iter().map(|r| r.timestamp))
        .collect();

    TimeAxis {
        instants: instants.into_iter().collect(),
    }
}
