// Per-model series re-expressed on a shared time axis
use super::time_axis::TimeAxis;
use super::usage::ModelUsage;
use serde::Serialize;

/// A sample on the axis. `Absent` means "no observation" and serializes as
/// `null` so charts draw a gap instead of a zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(into = "Option<u64>")]
pub enum SampleValue {
    Observed(u64),
    Absent,
}

impl From<SampleValue> for Option<u64> {
    fn from(value: SampleValue) -> Self {
        match value {
            SampleValue::Observed(count) => Some(count),
            SampleValue::Absent => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SeriesPoint {
    pub axis_index: usize,
    pub value: SampleValue,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AlignedSeries {
    pub model_id: String,
    pub display_name: String,
    pub points: Vec<SeriesPoint>,
}

/// Align every model onto `axis`, keeping model input order.
///
/// Records match an axis slot only on the exact instant. Several records of
/// one model on the same instant are summed, saturating at `u64::MAX`.
pub fn align_series(models: &[ModelUsage], axis: &TimeAxis) -> Vec<AlignedSeries> {
    models.iter().map(|m| align_model(m, axis)).collect()
}

fn align_model(model: &ModelUsage, axis: &TimeAxis) -> AlignedSeries {
    let mut values = vec![SampleValue::Absent; axis.len()];

    for record in &model.records {
        // Records outside the axis have no slot to land in
        let Some(idx) = axis.position(&record.timestamp) else {
            continue;
        };
        values[idx] = match values[idx] {
            SampleValue::Observed(sum) => SampleValue::Observed(sum.saturating_add(record.request_count)),
            SampleValue::Absent => SampleValue::Observed(record.request_count),
        };
    }

    let points = values
        .into_iter()
        .enumerate()
        .map(|(axis_index, value)| SeriesPoint { axis_index, value })
        .collect();

    AlignedSeries {
        model_id: model.model_id.clone(),
        display_name: model.display_name.clone(),
        points,
    }
}
