//! Annualization horizons.

use derive_more::Display;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// Unknown horizon text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown horizon: {0} (expected inception, 1y, 3y or 5y)")]
pub struct ParseHorizonError(String);

/// Cap on the holding period used when annualizing ROI.
///
/// Only the denominator is capped: a record held ten years and annualized
/// over a one-year horizon divides its full ROI by one year.
#[derive(
    Debug, Display, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
pub enum Horizon {
    /// Full holding period
    #[default]
    #[display("Since Inception")]
    #[serde(rename = "since_inception", alias = "inception")]
    SinceInception,
    /// At most one year
    #[display("1 Year")]
    #[serde(rename = "1y")]
    OneYear,
    /// At most three years
    #[display("3 Years")]
    #[serde(rename = "3y")]
    ThreeYears,
    /// At most five years
    #[display("5 Years")]
    #[serde(rename = "5y")]
    FiveYears,
}

impl Horizon {
    /// All horizons in menu order.
    pub const ALL: [Self; 4] = [Self::SinceInception, Self::OneYear, Self::ThreeYears, Self::FiveYears];

    /// Horizon length in years; `None` for since-inception.
    pub const fn years(&self) -> Option<i64> {
        match self {
            Self::SinceInception => None,
            Self::OneYear => Some(1),
            Self::ThreeYears => Some(3),
            Self::FiveYears => Some(5),
        }
    }

    /// Days used for annualization given the actual days held.
    ///
    /// Non-inception horizons cap the period at `years * 365` days.
    pub fn capped_days(&self, days_held: i64) -> i64 {
        self.years()
            .map_or(days_held, |years| days_held.min(years * 365))
    }
}

impl FromStr for Horizon {
    type Err = ParseHorizonError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_lowercase().replace(['_', '-'], " ");
        match key.as_str() {
            "since inception" | "inception" | "all" | "max" => Ok(Self::SinceInception),
            "1y" | "1" | "1 year" => Ok(Self::OneYear),
            "3y" | "3" | "3 years" => Ok(Self::ThreeYears),
            "5y" | "5" | "5 years" => Ok(Self::FiveYears),
            _ => Err(ParseHorizonError(s.to_string())),
        }
    }
}
