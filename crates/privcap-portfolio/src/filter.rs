//! Record filters.
//!
//! All criteria are optional and combine with AND. Ranges are inclusive on
//! both ends; an open end is `None`.

use chrono::NaiveDate;
use privcap_data::InvestmentRecord;
use privcap_metrics::moic;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Inclusive range with optional ends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Bounds<T> {
    /// Lower bound
    pub min: Option<T>,
    /// Upper bound
    pub max: Option<T>,
}

impl<T: PartialOrd + Copy> Bounds<T> {
    /// Range between two optional ends.
    pub const fn new(min: Option<T>, max: Option<T>) -> Self {
        Self { min, max }
    }

    /// Whether neither end is set.
    pub const fn is_unbounded(&self) -> bool {
        self.min.is_none() && self.max.is_none()
    }

    /// Whether `value` lies inside the range.
    pub fn contains(&self, value: T) -> bool {
        self.min.is_none_or(|min| value >= min) && self.max.is_none_or(|max| value <= max)
    }
}

/// Criteria for selecting records.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecordFilter {
    /// Keep only these funds (empty keeps all)
    pub fund_names: Vec<String>,
    /// Investment date range
    pub date_range: Option<Bounds<NaiveDate>>,
    /// Keep only realized (`true`) or unrealized (`false`) positions
    pub realized: Option<bool>,
    /// MOIC range
    pub moic_range: Option<Bounds<f64>>,
}

impl RecordFilter {
    /// Whether no criterion is active.
    pub fn is_empty(&self) -> bool {
        self.fund_names.is_empty()
            && self.date_range.is_none_or(|r| r.is_unbounded())
            && self.realized.is_none()
            && self.moic_range.is_none_or(|r| r.is_unbounded())
    }

    /// Whether `record` passes every active criterion.
    ///
    /// A record with undefined MOIC fails an active MOIC range, and one
    /// without a realized flag fails an active realized filter.
    pub fn matches(&self, record: &InvestmentRecord) -> bool {
        if !self.fund_names.is_empty() && !self.fund_names.iter().any(|f| f == &record.fund) {
            return false;
        }
        if let Some(range) = self.date_range
            && !range.contains(record.investment_date)
        {
            return false;
        }
        if let Some(wanted) = self.realized
            && record.realized != Some(wanted)
        {
            return false;
        }
        if let Some(range) = self.moic_range
            && !range.is_unbounded()
        {
            return moic(record.cost, record.fair_value).is_some_and(|m| range.contains(m));
        }
        true
    }
}

/// Records passing `filter`, in input order. The input is not modified.
pub fn apply_filters(records: &[InvestmentRecord], filter: &RecordFilter) -> Vec<InvestmentRecord> {
    let kept: Vec<InvestmentRecord> = records
        .iter()
        .filter(|r| filter.matches(r))
        .cloned()
        .collect();
    debug!(kept = kept.len(), total = records.len(), "applied record filter");
    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample() -> Vec<InvestmentRecord> {
        vec![
            InvestmentRecord::new("Acme", "Fund I", 100.0, 250.0, date(2020, 1, 1)).with_realized(true),
            InvestmentRecord::new("Globex", "Fund II", 200.0, 100.0, date(2021, 6, 1)).with_realized(false),
            InvestmentRecord::new("Initech", "Fund II", 300.0, 450.0, date(2022, 1, 1)),
            InvestmentRecord::new("Grant", "Fund I", 0.0, 50.0, date(2022, 3, 1)),
        ]
    }

    fn names(records: &[InvestmentRecord]) -> Vec<&str> {
        records.iter().map(|r| r.name.as_str()).collect()
    }

    #[test]
    fn test_empty_filter_keeps_everything() {
        let records = sample();
        let filter = RecordFilter::default();
        assert!(filter.is_empty());
        assert_eq!(apply_filters(&records, &filter), records);
    }

    #[test]
    fn test_fund_filter() {
        let filter = RecordFilter {
            fund_names: vec!["Fund II".into()],
            ..Default::default()
        };
        assert_eq!(names(&apply_filters(&sample(), &filter)), vec!["Globex", "Initech"]);
    }

    #[rstest]
    #[case(Some(date(2021, 6, 1)), None, vec!["Globex", "Initech", "Grant"])]
    #[case(None, Some(date(2021, 6, 1)), vec!["Acme", "Globex"])]
    #[case(Some(date(2021, 6, 1)), Some(date(2022, 1, 1)), vec!["Globex", "Initech"])]
    fn test_date_range_is_inclusive(
        #[case] min: Option<NaiveDate>,
        #[case] max: Option<NaiveDate>,
        #[case] expected: Vec<&str>,
    ) {
        let filter = RecordFilter {
            date_range: Some(Bounds::new(min, max)),
            ..Default::default()
        };
        assert_eq!(names(&apply_filters(&sample(), &filter)), expected);
    }

    #[test]
    fn test_realized_filter_skips_unflagged() {
        let realized = RecordFilter {
            realized: Some(true),
            ..Default::default()
        };
        let unrealized = RecordFilter {
            realized: Some(false),
            ..Default::default()
        };
        assert_eq!(names(&apply_filters(&sample(), &realized)), vec!["Acme"]);
        assert_eq!(names(&apply_filters(&sample(), &unrealized)), vec!["Globex"]);
    }

    #[test]
    fn test_moic_range_excludes_undefined() {
        let filter = RecordFilter {
            moic_range: Some(Bounds::new(Some(0.5), Some(2.5))),
            ..Default::default()
        };
        assert_eq!(
            names(&apply_filters(&sample(), &filter)),
            vec!["Acme", "Globex", "Initech"]
        );

        let at_least_two = RecordFilter {
            moic_range: Some(Bounds::new(Some(2.0), None)),
            ..Default::default()
        };
        assert_eq!(names(&apply_filters(&sample(), &at_least_two)), vec!["Acme"]);
    }

    #[test]
    fn test_criteria_combine_with_and() {
        let filter = RecordFilter {
            fund_names: vec!["Fund II".into()],
            moic_range: Some(Bounds::new(Some(1.0), None)),
            ..Default::default()
        };
        assert_eq!(names(&apply_filters(&sample(), &filter)), vec!["Initech"]);
    }

    #[test]
    fn test_source_untouched() {
        let records = sample();
        let before = records.clone();
        let filter = RecordFilter {
            realized: Some(true),
            ..Default::default()
        };
        let _ = apply_filters(&records, &filter);
        assert_eq!(records, before);
    }
}
