//! Input table loading.

use privcap_data::{DataError, RawTable};
use std::path::Path;
use tracing::debug;

/// Load a CSV export into a raw table.
pub(crate) fn load_table(path: &Path) -> Result<RawTable, DataError> {
    let table = RawTable::from_csv_path(path)?;
    debug!(
        path = %path.display(),
        columns = table.headers().len(),
        rows = table.len(),
        "loaded input table"
    );
    Ok(table)
}
