use std::collections::{BTreeSet, HashMap};

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::error::DashboardError;
use crate::models::{
    AssigneeKey, Cell, ProductivitySummary, SummaryOverview, SummaryRow, TicketTable,
};
use crate::normalize::{normalize_column, normalize_numeric_columns};
use crate::schema::{ASSIGNEE, HANDLING_HOURS, STATUS};

static CLOSED_STATUS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)fechado|encerrado|resolvido").expect("static pattern"));

pub fn is_closed_status(cell: &Cell) -> bool {
    cell.as_text()
        .map(|status| CLOSED_STATUS.is_match(status))
        .unwrap_or(false)
}

/// Two-decimal rounding with halves going to the even neighbour.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}

pub fn closure_rate(closed: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let rate = closed as f64 / total as f64 * 100.0;
    if rate.is_finite() {
        round2(rate)
    } else {
        0.0
    }
}

/// Normalizes the numeric columns in place, then builds one row per assignee.
pub fn summarize(table: &mut TicketTable) -> Result<ProductivitySummary, DashboardError> {
    normalize_numeric_columns(table);
    summarize_normalized(table)
}

pub fn summarize_normalized(table: &TicketTable) -> Result<ProductivitySummary, DashboardError> {
    let missing = |column: &str| {
        DashboardError::Aggregation(format!("coluna '{column}' não encontrada"))
    };
    let assignee_index = table.column_index(ASSIGNEE).ok_or_else(|| missing(ASSIGNEE))?;
    let status_index = table.column_index(STATUS).ok_or_else(|| missing(STATUS))?;
    let hours = normalize_column(table, HANDLING_HOURS);

    let keys: Vec<AssigneeKey> = (0..table.len())
        .map(|row| AssigneeKey::from_cell(table.cell(row, assignee_index)))
        .collect();

    let mut totals: HashMap<AssigneeKey, usize> = HashMap::new();
    let mut hour_sums: HashMap<AssigneeKey, (f64, usize)> = HashMap::new();
    for (key, hours) in keys.iter().zip(&hours) {
        *totals.entry(key.clone()).or_insert(0) += 1;
        let entry = hour_sums.entry(key.clone()).or_insert((0.0, 0));
        entry.0 += hours;
        entry.1 += 1;
    }

    // Closed rows are counted in their own pass; groups without any are
    // filled from the key union below.
    let mut closed: HashMap<AssigneeKey, usize> = HashMap::new();
    for (row, key) in keys.iter().enumerate() {
        if is_closed_status(table.cell(row, status_index)) {
            *closed.entry(key.clone()).or_insert(0) += 1;
        }
    }

    let groups: BTreeSet<&AssigneeKey> = totals
        .keys()
        .chain(closed.keys())
        .chain(hour_sums.keys())
        .collect();

    let rows: Vec<SummaryRow> = groups
        .into_iter()
        .map(|key| {
            let total_tickets = totals.get(key).copied().unwrap_or(0);
            let closed_tickets = closed.get(key).copied().unwrap_or(0);
            let avg_handling_hours = match hour_sums.get(key) {
                Some((sum, count)) if *count > 0 => round2(sum / *count as f64),
                _ => 0.0,
            };
            SummaryRow {
                assignee: key.clone(),
                total_tickets,
                closed_tickets,
                closure_rate_pct: closure_rate(closed_tickets, total_tickets),
                avg_handling_hours,
            }
        })
        .collect();

    debug!(groups = rows.len(), rows = table.len(), "aggregated productivity summary");
    Ok(ProductivitySummary { rows })
}

/// Headline figures shown under the summary table.
pub fn overview(summary: &ProductivitySummary) -> SummaryOverview {
    let groups = summary.rows.len();
    let mean = |values: f64| if groups == 0 { 0.0 } else { values / groups as f64 };

    SummaryOverview {
        avg_closure_rate_pct: mean(summary.rows.iter().map(|r| r.closure_rate_pct).sum()),
        avg_handling_hours: mean(summary.rows.iter().map(|r| r.avg_handling_hours).sum()),
        total_tickets: summary.total_tickets(),
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use crate::models::{Cell, ProductivitySummary, SummaryRow, TicketTable};
    use crate::schema::{full_headers, ASSIGNEE, HANDLING_HOURS, STATUS};

    pub fn row_for<'a>(summary: &'a ProductivitySummary, label: &str) -> &'a SummaryRow {
        summary
            .rows
            .iter()
            .find(|row| row.assignee.label() == label)
            .unwrap_or_else(|| panic!("no summary row for {label}"))
    }

    /// Full-schema table with one row per `(assignee, status, hours)` triple.
    pub fn tickets(rows: &[(Option<&str>, Option<&str>, &str)]) -> TicketTable {
        let mut table = TicketTable::new(full_headers());
        let assignee = table.column_index(ASSIGNEE).unwrap();
        let status = table.column_index(STATUS).unwrap();
        let hours = table.column_index(HANDLING_HOURS).unwrap();

        for (id, (who, state, spent)) in rows.iter().enumerate() {
            let mut row = vec![Cell::Empty; table.headers.len()];
            row[0] = Cell::Number((id + 1) as f64);
            row[assignee] = who.map(|w| Cell::Text(w.to_string())).unwrap_or(Cell::Empty);
            row[status] = state.map(|s| Cell::Text(s.to_string())).unwrap_or(Cell::Empty);
            row[hours] = Cell::Text(spent.to_string());
            table.push_row(row);
        }
        table
    }
}
