#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/privcap/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod export;
pub mod report;
pub mod summary;

pub use export::{
    CumulativeExportRow, ExportError, ExportFormat, ExportRow, Exporter, FundExportRow,
    cumulative_rows, fund_rows, record_rows,
};
pub use report::{Report, ReportBuilder, ReportError};
pub use summary::{
    PortfolioSummary, RankingTable, format_amount, format_metric, format_multiple, format_rate,
};
