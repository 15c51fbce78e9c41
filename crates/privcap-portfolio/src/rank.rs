//! Top-N ranking by metric.

use derive_more::Display;
use privcap_metrics::{MetricKind, ScoredRecord};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Sort direction.
#[derive(Debug, Display, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    /// Largest first
    #[default]
    #[display("descending")]
    Descending,
    /// Smallest first
    #[display("ascending")]
    Ascending,
}

/// Compare two optional values, putting `None` last regardless of `order`.
fn compare(a: Option<f64>, b: Option<f64>, order: SortOrder) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => match order {
            SortOrder::Ascending => x.total_cmp(&y),
            SortOrder::Descending => y.total_cmp(&x),
        },
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// The first `n` records ordered by `metric`.
///
/// The sort is stable, so ties keep input order. Records with an undefined
/// value go last in either direction.
pub fn top_n(
    scored: &[ScoredRecord],
    metric: MetricKind,
    n: usize,
    order: SortOrder,
) -> Vec<ScoredRecord> {
    let mut ranked: Vec<&ScoredRecord> = scored.iter().collect();
    ranked.sort_by(|a, b| compare(a.metrics.get(metric), b.metrics.get(metric), order));
    ranked.into_iter().take(n).cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use privcap_data::InvestmentRecord;
    use privcap_metrics::MetricsEngine;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn scored() -> Vec<ScoredRecord> {
        let records = vec![
            InvestmentRecord::new("Mid", "F", 100.0, 150.0, date(2020, 1, 1)),
            InvestmentRecord::new("Undefined", "F", 0.0, 150.0, date(2020, 1, 1)),
            InvestmentRecord::new("Best", "F", 100.0, 400.0, date(2020, 1, 1)),
            InvestmentRecord::new("Worst", "F", 100.0, 20.0, date(2020, 1, 1)),
            InvestmentRecord::new("Mid Twin", "F", 200.0, 300.0, date(2021, 1, 1)),
        ];
        MetricsEngine::new(date(2024, 1, 1)).score(&records)
    }

    fn names(ranked: &[ScoredRecord]) -> Vec<&str> {
        ranked.iter().map(|s| s.record.name.as_str()).collect()
    }

    #[test]
    fn test_descending_with_stable_ties() {
        let ranked = top_n(&scored(), MetricKind::Moic, 3, SortOrder::Descending);
        assert_eq!(names(&ranked), vec!["Best", "Mid", "Mid Twin"]);
    }

    #[test]
    fn test_undefined_last_in_both_directions() {
        let desc = top_n(&scored(), MetricKind::Moic, 10, SortOrder::Descending);
        let asc = top_n(&scored(), MetricKind::Moic, 10, SortOrder::Ascending);

        assert_eq!(desc.len(), 5);
        assert_eq!(desc.last().unwrap().record.name, "Undefined");
        assert_eq!(names(&asc), vec!["Worst", "Mid", "Mid Twin", "Best", "Undefined"]);
    }

    #[test]
    fn test_zero_n() {
        assert!(top_n(&scored(), MetricKind::Irr, 0, SortOrder::Descending).is_empty());
    }
}
