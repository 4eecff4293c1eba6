use crate::models::{Cell, TicketTable};
use crate::schema::NUMERIC_COLUMNS;

/// Lenient numeric coercion used for hours and SLA cells.
///
/// Never fails: anything that does not read as a finite, non-negative number
/// becomes `0.0`.
pub fn normalize_cell(cell: &Cell) -> f64 {
    let value = match cell {
        Cell::Empty | Cell::DateTime(_) => 0.0,
        Cell::Number(value) => *value,
        Cell::Bool(true) => 1.0,
        Cell::Bool(false) => 0.0,
        Cell::Text(text) => parse_lenient(text),
    };

    if value.is_finite() && value >= 0.0 {
        value
    } else {
        0.0
    }
}

/// Only ASCII digits survive; other Unicode digits are dropped like any other
/// character.
fn parse_lenient(text: &str) -> f64 {
    let cleaned: String = text
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == ',')
        .map(|c| if c == ',' { '.' } else { c })
        .collect();
    cleaned.parse::<f64>().unwrap_or(0.0)
}

/// One value per row; an absent column yields zeros.
pub fn normalize_column(table: &TicketTable, column: &str) -> Vec<f64> {
    match table.column_index(column) {
        Some(index) => (0..table.len())
            .map(|row| normalize_cell(table.cell(row, index)))
            .collect(),
        None => vec![0.0; table.len()],
    }
}

/// Replaces the hours and SLA cells with their normalized numbers.
pub fn normalize_numeric_columns(table: &mut TicketTable) {
    for column in NUMERIC_COLUMNS {
        let Some(index) = table.column_index(column) else {
            continue;
        };
        let values = normalize_column(table, column);
        for (row, value) in table.rows.iter_mut().zip(values) {
            row[index] = Cell::Number(value);
        }
    }
}
