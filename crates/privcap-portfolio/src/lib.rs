#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/privcap/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod filter;
pub mod fund;
pub mod overview;
pub mod rank;
pub mod series;

pub use filter::{Bounds, RecordFilter, apply_filters};
pub use fund::{FundAggregate, aggregate_by_fund, group_by_fund};
pub use overview::{PortfolioOverview, overview, undefined_counts};
pub use rank::{SortOrder, top_n};
pub use series::{CumulativePoint, cumulative_cost_vs_value};
