//! Metric Registry
//!
//! Central registry for the per-record metrics. Allows lookup by name, which
//! is how ranking and export code refers to a metric.

use derive_more::Display;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

use crate::engine::MetricSet;

/// Unknown metric name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown metric: {0}")]
pub struct UnknownMetric(pub String);

/// Metrics computed for every record and group.
#[derive(
    Debug, Display, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    /// Multiple on invested capital
    #[display("MOIC")]
    Moic,
    /// Return on investment
    #[display("ROI")]
    Roi,
    /// ROI divided by (possibly capped) holding years
    #[display("Annualized ROI")]
    AnnualizedRoi,
    /// Internal rate of return
    #[display("IRR")]
    Irr,
}

/// Metric metadata
#[derive(Debug, Clone)]
pub struct MetricInfo {
    /// Metric kind
    pub kind: MetricKind,
    /// Metric name (unique identifier)
    pub name: &'static str,
    /// Brief description of what the metric measures
    pub description: &'static str,
    /// Whether the value reads as a percentage
    pub is_rate: bool,
}

impl MetricKind {
    /// All metrics in display order.
    pub const ALL: [Self; 4] = [Self::Moic, Self::Roi, Self::AnnualizedRoi, Self::Irr];

    /// Stable identifier.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Moic => "moic",
            Self::Roi => "roi",
            Self::AnnualizedRoi => "annualized_roi",
            Self::Irr => "irr",
        }
    }

    /// Read this metric from a metric set.
    pub const fn value(&self, metrics: &MetricSet) -> Option<f64> {
        match self {
            Self::Moic => metrics.moic,
            Self::Roi => metrics.roi,
            Self::AnnualizedRoi => metrics.annualized_roi,
            Self::Irr => metrics.irr,
        }
    }

    /// Metadata for this metric.
    pub fn info(&self) -> MetricInfo {
        match self {
            Self::Moic => MetricInfo {
                kind: *self,
                name: self.name(),
                description: "Fair value divided by cost",
                is_rate: false,
            },
            Self::Roi => MetricInfo {
                kind: *self,
                name: self.name(),
                description: "Gain over cost, (fair value - cost) / cost",
                is_rate: true,
            },
            Self::AnnualizedRoi => MetricInfo {
                kind: *self,
                name: self.name(),
                description: "ROI divided by holding years, optionally capped by a horizon",
                is_rate: true,
            },
            Self::Irr => MetricInfo {
                kind: *self,
                name: self.name(),
                description: "Discount rate that zeroes the NPV of the dated cash flows",
                is_rate: true,
            },
        }
    }
}

impl FromStr for MetricKind {
    type Err = UnknownMetric;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_lowercase().replace(['-', ' '], "_");
        match key.as_str() {
            "moic" | "multiple" => Ok(Self::Moic),
            "roi" | "return" => Ok(Self::Roi),
            "annualized_roi" | "annual_roi" | "ann_roi" | "annualized" => Ok(Self::AnnualizedRoi),
            "irr" | "xirr" => Ok(Self::Irr),
            _ => Err(UnknownMetric(s.to_string())),
        }
    }
}

/// Get all available metric info
pub fn available_metrics() -> Vec<MetricInfo> {
    MetricKind::ALL.iter().map(MetricKind::info).collect()
}

/// Get metric info by name
pub fn get_metric_info(name: &str) -> Option<MetricInfo> {
    name.parse::<MetricKind>().ok().map(|kind| kind.info())
}
