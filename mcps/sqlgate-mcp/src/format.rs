//! Tabular text rendering of query results
//!
//! Each row becomes one line of `"<column>: <value>\t"` tokens followed by a
//! newline. Rows keep database order.

use std::fmt::Write;

use crate::db::ResultSet;
use crate::types::GateError;

/// Render a result set as tabular text
///
/// A row whose width disagrees with the column list fails the whole
/// render; partial output is never returned.
pub fn format_rows(result: &ResultSet) -> Result<String, GateError> {
    let mut output = String::new();

    for (index, row) in result.rows.iter().enumerate() {
        if row.len() != result.columns.len() {
            return Err(GateError::ResultReadFailed(format!(
                "row {} has {} values for {} columns",
                index,
                row.len(),
                result.columns.len()
            )));
        }

        for (column, value) in result.columns.iter().zip(row) {
            // Writing to a String cannot fail
            let _ = write!(output, "{}: {}\t", column, value);
        }
        output.push('\n');
    }

    Ok(output)
}
