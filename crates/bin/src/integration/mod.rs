//! Glue between the command line and the privcap library.
//!
//! Turns CLI flags and config files into an `AnalysisConfig`, loads input
//! tables, and installs the log subscriber.

pub(crate) mod config_loader;
pub(crate) mod input;
pub(crate) mod logging;
