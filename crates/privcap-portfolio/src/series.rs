//! Cumulative cost versus fair value over investment dates.

use chrono::NaiveDate;
use privcap_data::InvestmentRecord;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One investment date in the cumulative series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CumulativePoint {
    /// Investment date
    pub date: NaiveDate,
    /// Cost invested on this date
    pub cost: f64,
    /// Fair value of investments made on this date
    pub fair_value: f64,
    /// Running total of cost up to and including this date
    pub cumulative_cost: f64,
    /// Running total of fair value up to and including this date
    pub cumulative_fair_value: f64,
}

/// Running totals of cost and fair value, one point per distinct date in
/// ascending order. Same-day records are merged.
pub fn cumulative_cost_vs_value(records: &[InvestmentRecord]) -> Vec<CumulativePoint> {
    let mut by_date: BTreeMap<NaiveDate, (f64, f64)> = BTreeMap::new();
    for record in records {
        let entry = by_date.entry(record.investment_date).or_insert((0.0, 0.0));
        entry.0 += record.cost;
        entry.1 += record.fair_value;
    }

    let mut cumulative_cost = 0.0;
    let mut cumulative_fair_value = 0.0;
    by_date
        .into_iter()
        .map(|(date, (cost, fair_value))| {
            cumulative_cost += cost;
            cumulative_fair_value += fair_value;
            CumulativePoint {
                date,
                cost,
                fair_value,
                cumulative_cost,
                cumulative_fair_value,
            }
        })
        .collect()
}
