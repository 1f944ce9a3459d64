// Rolling-window totals and recent-usage ranking
use super::usage::{saturating_total, ModelUsage};
use serde::Serialize;
use std::num::NonZeroUsize;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WindowError {
    #[error("invalid window: custom window must cover at least one hour, got {hours}")]
    InvalidWindow { hours: i64 },
}

/// A named or custom span of hours. Records are assumed to be hourly, so a
/// span resolves to a sample count rather than a chronological range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowSpec {
    Day,
    Week,
    Month,
    Year,
    Custom { hours: i64 },
}

impl WindowSpec {
    pub fn hours(&self) -> Result<NonZeroUsize, WindowError> {
        let hours = match self {
            WindowSpec::Day => 24,
            WindowSpec::Week => 168,
            WindowSpec::Month => 720,
            WindowSpec::Year => 8760,
            WindowSpec::Custom { hours } => *hours,
        };

        usize::try_from(hours)
            .ok()
            .and_then(NonZeroUsize::new)
            .ok_or(WindowError::InvalidWindow { hours })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WindowResult {
    pub model_id: String,
    pub display_name: String,
    pub window_label: String,
    pub total: u64,
    pub sample_count: usize,
}

/// Sum the last `n` records in insertion order.
///
/// Records are not re-sorted: callers wanting "most recent" must pass them
/// chronologically ordered.
pub fn sum_last_n(model: &ModelUsage, n: NonZeroUsize) -> WindowResult {
    let label = format!("last {n} samples");
    sum_tail(model, n.get(), label)
}

pub fn sum_by_hour_window(model: &ModelUsage, window: WindowSpec) -> Result<WindowResult, WindowError> {
    let hours = window.hours()?;
    let hours_to_sum = hours.get().min(model.records.len());
    Ok(sum_tail(model, hours_to_sum, format!("{hours} hour(s)")))
}

/// Rank models by their last `recent_sample_count` records, highest first.
///
/// Equal totals keep their input order. Models without records still rank,
/// with a total of zero.
pub fn top_n_by_recent_usage(
    models: &[ModelUsage],
    n: NonZeroUsize,
    recent_sample_count: NonZeroUsize,
) -> Vec<WindowResult> {
    let mut ranked: Vec<WindowResult> = models
        .iter()
        .map(|m| sum_last_n(m, recent_sample_count))
        .collect();

    ranked.sort_by(|a, b| b.total.cmp(&a.total));
    ranked.truncate(n.get());
    ranked
}

fn sum_tail(model: &ModelUsage, n: usize, window_label: String) -> WindowResult {
    let start = model.records.len().saturating_sub(n);
    let tail = &model.records[start..];

    WindowResult {
        model_id: model.model_id.clone(),
        display_name: model.display_name.clone(),
        window_label,
        total: saturating_total(tail),
        sample_count: tail.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::usage::{parse_timestamp, UsageRecord};
    use chrono::Duration;

    fn nz(n: usize) -> NonZeroUsize {
        NonZeroUsize::new(n).unwrap()
    }

    fn model(id: &str, counts: &[u64]) -> ModelUsage {
        let start = parse_timestamp("2024-05-01T00:00:00Z").unwrap();
        ModelUsage::new(
            id.to_string(),
            format!("Model {id}"),
            counts
                .iter()
                .enumerate()
                .map(|(i, c)| UsageRecord::new(start + Duration::hours(i as i64), *c))
                .collect(),
        )
    }

    #[test]
    fn test_sum_last_n_of_empty_is_zero() {
        let result = sum_last_n(&model("a", &[]), nz(5));
        assert_eq!(result.total, 0);
        assert_eq!(result.sample_count, 0);
        assert_eq!(result.window_label, "last 5 samples");
    }

    #[test]
    fn test_sum_last_n_takes_tail_in_insertion_order() {
        let result = sum_last_n(&model("a", &[100, 1, 2, 3]), nz(3));
        assert_eq!(result.total, 6);
        assert_eq!(result.sample_count, 3);
    }

    #[test]
    fn test_sum_last_n_does_not_resort() {
        let mut m = model("a", &[1, 2, 3]);
        // Oldest record appended last
        m.records.swap(0, 2);
        let result = sum_last_n(&m, nz(1));
        assert_eq!(result.total, 1);
    }

    #[test]
    fn test_sample_count_is_min_of_n_and_len() {
        let m = model("a", &[1, 2, 3, 4]);
        for n in 1..8 {
            assert_eq!(sum_last_n(&m, nz(n)).sample_count, n.min(4));
        }
    }

    #[test]
    fn test_totals_saturate_instead_of_wrapping() {
        let m = model("a", &[u64::MAX, 1]);
        assert_eq!(sum_last_n(&m, nz(5)).total, u64::MAX);
        assert_eq!(sum_by_hour_window(&m, WindowSpec::Day).unwrap().total, u64::MAX);

        let models = [model("small", &[3]), m];
        let top = top_n_by_recent_usage(&models, nz(1), nz(5));
        assert_eq!(top[0].model_id, "a");
        assert_eq!(top[0].total, u64::MAX);
    }

    #[test]
    fn test_windows_are_idempotent() {
        let models = [model("a", &[1, 2, 3]), model("b", &[4]), model("c", &[])];
        assert_eq!(sum_last_n(&models[0], nz(2)), sum_last_n(&models[0], nz(2)));
        assert_eq!(
            sum_by_hour_window(&models[0], WindowSpec::Custom { hours: 2 }),
            sum_by_hour_window(&models[0], WindowSpec::Custom { hours: 2 })
        );
        assert_eq!(
            top_n_by_recent_usage(&models, nz(2), nz(2)),
            top_n_by_recent_usage(&models, nz(2), nz(2))
        );
    }

    #[test]
    fn test_named_windows_resolve_hours() {
        assert_eq!(WindowSpec::Day.hours(), Ok(nz(24)));
        assert_eq!(WindowSpec::Week.hours(), Ok(nz(168)));
        assert_eq!(WindowSpec::Month.hours(), Ok(nz(720)));
        assert_eq!(WindowSpec::Year.hours(), Ok(nz(8760)));
        assert_eq!(WindowSpec::Custom { hours: 6 }.hours(), Ok(nz(6)));
    }

    #[test]
    fn test_week_over_short_history_sums_everything() {
        let counts: Vec<u64> = (1..=10).collect();
        let result = sum_by_hour_window(&model("a", &counts), WindowSpec::Week).unwrap();
        assert_eq!(result.total, 55);
        assert_eq!(result.sample_count, 10);
        assert_eq!(result.window_label, "168 hour(s)");
    }

    #[test]
    fn test_custom_window_sums_tail() {
        let result = sum_by_hour_window(&model("a", &[5, 5, 1, 2]), WindowSpec::Custom { hours: 2 }).unwrap();
        assert_eq!(result.total, 3);
        assert_eq!(result.sample_count, 2);
        assert_eq!(result.window_label, "2 hour(s)");
    }

    #[test]
    fn test_non_positive_custom_window_is_rejected() {
        for hours in [0, -3] {
            let err = sum_by_hour_window(&model("a", &[1]), WindowSpec::Custom { hours }).unwrap_err();
            assert_eq!(err, WindowError::InvalidWindow { hours });
        }
    }

    #[test]
    fn test_ranking_example() {
        let a = ModelUsage::new(
            "a".to_string(),
            "A".to_string(),
            vec![
                UsageRecord::new(parse_timestamp("2024-05-01T10:00:00Z").unwrap(), 5),
                UsageRecord::new(parse_timestamp("2024-05-01T11:00:00Z").unwrap(), 3),
            ],
        );
        let b = ModelUsage::new(
            "b".to_string(),
            "B".to_string(),
            vec![UsageRecord::new(parse_timestamp("2024-05-01T10:00:00Z").unwrap(), 7)],
        );
        let c = ModelUsage::new("c".to_string(), "C".to_string(), vec![]);

        let models = [a, b, c];
        let top = top_n_by_recent_usage(&models, nz(2), nz(5));
        let ids: Vec<&str> = top.iter().map(|r| r.model_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert_eq!(top[0].total, 8);
        assert_eq!(top[1].total, 7);

        let all = top_n_by_recent_usage(&models, nz(10), nz(5));
        assert_eq!(all.len(), 3);
        assert_eq!(all[2].model_id, "c");
        assert_eq!(all[2].total, 0);
        assert_eq!(all[2].sample_count, 0);
    }

    #[test]
    fn test_ranking_ties_keep_input_order() {
        let models = [
            model("first", &[2, 2]),
            model("big", &[9]),
            model("second", &[4]),
            model("third", &[1, 3]),
        ];

        let top = top_n_by_recent_usage(&models, nz(4), nz(5));
        let ids: Vec<&str> = top.iter().map(|r| r.model_id.as_str()).collect();
        assert_eq!(ids, vec!["big", "first", "second", "third"]);
    }

    #[test]
    fn test_ranking_is_prefix_of_full_ranking() {
        let models = [
            model("a", &[1, 2, 3]),
            model("b", &[10]),
            model("c", &[]),
            model("d", &[4, 4]),
        ];

        let full = top_n_by_recent_usage(&models, nz(models.len()), nz(2));
        for n in 1..=6 {
            let top = top_n_by_recent_usage(&models, nz(n), nz(2));
            assert_eq!(top.len(), n.min(models.len()));
            assert!(top.windows(2).all(|w| w[0].total >= w[1].total));
            assert_eq!(top.as_slice(), &full[..top.len()]);
        }
    }
}
