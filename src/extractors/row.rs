// src/extractors/row.rs

use scraper::ElementRef;

use crate::extractors::markup::NodeExt;
use crate::extractors::schema::{ResolvedSchema, TableRecord};
use crate::utils::error::ExtractError;

/// Tag of the children that count as columns.
pub const CELL_TAG: &str = "td";

/// Materializes one record from one table row.
///
/// Columns are counted among `<td>` children only. A column the row does not
/// have leaves its fields at their `Default` value. The first extractor error
/// aborts the row and is returned unchanged.
pub fn extract_row<T: TableRecord>(schema: &ResolvedSchema<T>, row: ElementRef<'_>) -> Result<T, ExtractError> {
    // Only <td> children count; text, comments and <th> are not columns
    let cells = row.children_by(CELL_TAG);
    let mut record = T::default();

    for rules in schema.columns() {
        // Short row: leave this column's fields at their defaults
        let Some(cell) = cells.get(rules.column) else {
            tracing::trace!("{}: row has no column {}, keeping defaults", schema.record(), rules.column);
            continue;
        };
        // The cell is selected once and shared by every field bound to it
        for binding in &rules.bindings {
            binding.apply(&mut record, *cell)?;
        }
    }

    Ok(record)
}
