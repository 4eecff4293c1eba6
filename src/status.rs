use std::collections::HashMap;

use crate::error::DashboardError;
use crate::models::{
    AssigneeKey, ChartSpec, StatusCount, StatusDistribution, TicketTable, UNASSIGNED_LABEL,
};
use crate::schema::{ASSIGNEE, STATUS};

pub const ALL_ASSIGNEES: &str = "Todos";
pub const CHART_TITLE: &str = "Distribuição de Chamados por Status";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AssigneeFilter {
    #[default]
    All,
    Only(AssigneeKey),
}

impl AssigneeFilter {
    /// `Todos`/`All` (any case) disable filtering; the unassigned label
    /// selects rows without an assignee.
    pub fn parse(value: Option<&str>) -> Self {
        match value {
            None => AssigneeFilter::All,
            Some(v) if v.eq_ignore_ascii_case(ALL_ASSIGNEES) || v.eq_ignore_ascii_case("all") => {
                AssigneeFilter::All
            }
            Some(UNASSIGNED_LABEL) => AssigneeFilter::Only(AssigneeKey::Unassigned),
            Some(name) => AssigneeFilter::Only(AssigneeKey::Named(name.to_string())),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            AssigneeFilter::All => ALL_ASSIGNEES,
            AssigneeFilter::Only(key) => key.label(),
        }
    }
}

/// Rows belonging to the selected assignee, or a copy of the whole table.
pub fn filter_by_assignee(
    table: &TicketTable,
    filter: &AssigneeFilter,
) -> Option<TicketTable> {
    match filter {
        AssigneeFilter::All => Some(table.clone()),
        AssigneeFilter::Only(key) => {
            let index = table.column_index(ASSIGNEE)?;
            Some(table.filter_rows(|row| {
                row.get(index)
                    .map(AssigneeKey::from_cell)
                    .unwrap_or(AssigneeKey::Unassigned)
                    == *key
            }))
        }
    }
}

/// Filter choices in the order assignees first appear in the sheet.
pub fn assignee_options(table: &TicketTable) -> Vec<String> {
    let mut options = vec![ALL_ASSIGNEES.to_string()];
    let Some(index) = table.column_index(ASSIGNEE) else {
        return options;
    };

    let mut seen: Vec<AssigneeKey> = Vec::new();
    for row in 0..table.len() {
        let key = AssigneeKey::from_cell(table.cell(row, index));
        if !seen.contains(&key) {
            seen.push(key);
        }
    }
    options.extend(seen.iter().map(|key| key.label().to_string()));
    options
}

pub fn status_distribution(
    table: &TicketTable,
    filter: &AssigneeFilter,
) -> Result<StatusDistribution, DashboardError> {
    if !table.has_column(STATUS) {
        return Err(DashboardError::Chart(format!("coluna '{STATUS}' não encontrada")));
    }
    let scoped = filter_by_assignee(table, filter)
        .ok_or_else(|| DashboardError::Chart(format!("coluna '{ASSIGNEE}' não encontrada")))?;
    let status_index = scoped
        .column_index(STATUS)
        .ok_or_else(|| DashboardError::Chart(format!("coluna '{STATUS}' não encontrada")))?;

    let mut positions: HashMap<String, usize> = HashMap::new();
    let mut counts: Vec<StatusCount> = Vec::new();
    for row in 0..scoped.len() {
        let cell = scoped.cell(row, status_index);
        if cell.is_empty() {
            continue;
        }
        let status = cell.to_string();
        match positions.get(&status) {
            Some(&position) => counts[position].count += 1,
            None => {
                positions.insert(status.clone(), counts.len());
                counts.push(StatusCount { status, count: 1 });
            }
        }
    }

    // Stable: ties keep first-seen order.
    counts.sort_by(|a, b| b.count.cmp(&a.count));

    Ok(StatusDistribution {
        scope: filter.label().to_string(),
        counts,
    })
}

pub fn status_chart(
    table: &TicketTable,
    filter: &AssigneeFilter,
) -> Result<ChartSpec, DashboardError> {
    let distribution = status_distribution(table, filter)?;
    Ok(ChartSpec {
        title: CHART_TITLE.to_string(),
        x_label: "Status".to_string(),
        y_label: "Quantidade".to_string(),
        tick_angle: -45,
        show_legend: false,
        labels: distribution.labels(),
        values: distribution.values(),
    })
}
