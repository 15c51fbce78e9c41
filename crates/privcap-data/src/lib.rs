#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/privcap/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod columns;
pub mod error;
pub mod normalize;
pub mod table;

pub use columns::{
    CanonicalField, ColumnMapping, ColumnPreset, Resolution, ResolutionMode, ResolveOptions,
    auto_detect, find_preset, presets, resolve_columns,
};
pub use error::{DataError, Result};
pub use normalize::{
    InvestmentRecord, NormalizeDiagnostics, NormalizedTable, RowIssue, RowParseFailure, normalize,
    parse_date, parse_number, parse_realized,
};
pub use table::{RawTable, RowView};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
