use crate::error::{ClaimsError, Result};
use crate::types::{PivotDict, PivotRow, PivotTable};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn flipped(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }
}

/// Column/direction a table is currently sorted by. The default is
/// unsorted, which leaves rows in pivot order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortState {
    pub column: Option<String>,
    pub direction: Option<SortDirection>,
}

impl SortState {
    pub fn new(column: &str, direction: SortDirection) -> Self {
        SortState { column: Some(column.to_string()), direction: Some(direction) }
    }

    /// State after the user clicks `column`: the same column flips
    /// direction, a new column starts descending.
    pub fn toggle(&self, column: &str) -> SortState {
        match (&self.column, self.direction) {
            (Some(c), Some(dir)) if c == column => SortState::new(column, dir.flipped()),
            _ => SortState::new(column, SortDirection::Descending),
        }
    }
}

/// Reorder a pivot table's rows.
///
/// The TOTAL row is pulled out before sorting and always re-appended last.
/// Numeric columns compare by value, the category column compares
/// case-insensitively. The sort is stable. An unknown column or an
/// unsorted state returns the rows unchanged.
pub fn sort_table(table: &PivotTable, state: &SortState) -> PivotTable {
    let (Some(column), Some(direction)) = (state.column.as_deref(), state.direction) else {
        return table.clone();
    };
    let Some(col) = table.column_index(column) else {
        return table.clone();
    };

    let mut rows = table.rows.clone();
    let total = rows.iter().rposition(PivotRow::is_total).map(|i| rows.remove(i));

    rows.sort_by(|a, b| {
        let ord = compare(a, b, col);
        match direction {
            SortDirection::Ascending => ord,
            SortDirection::Descending => ord.reverse(),
        }
    });
    rows.extend(total);

    PivotTable { columns: table.columns.clone(), rows }
}

/// Look up `dimension` in `pivots` and sort it.
pub fn sort_pivot(pivots: &PivotDict, dimension: &str, state: &SortState) -> Result<PivotTable> {
    pivots
        .get(dimension)
        .map(|t| sort_table(t, state))
        .ok_or_else(|| ClaimsError::UnknownDimension(dimension.to_string()))
}

fn compare(a: &PivotRow, b: &PivotRow, col: usize) -> Ordering {
    if col == 0 {
        return a.label.to_lowercase().cmp(&b.label.to_lowercase());
    }
    let av = a.values.get(col - 1).copied().unwrap_or(0.0);
    let bv = b.values.get(col - 1).copied().unwrap_or(0.0);
    av.partial_cmp(&bv).unwrap_or(Ordering::Equal)
}
