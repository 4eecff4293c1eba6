use std::fmt;

use chrono::NaiveDateTime;
use serde::{Serialize, Serializer};

pub const UNASSIGNED_LABEL: &str = "(sem responsável)";

static EMPTY_CELL: Cell = Cell::Empty;

#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Number(f64),
    Text(String),
    Bool(bool),
    DateTime(NaiveDateTime),
}

impl Cell {
    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Cell::Text(value) => Some(value),
            _ => None,
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Empty => Ok(()),
            Cell::Number(value) => write!(f, "{value}"),
            Cell::Text(value) => f.write_str(value),
            Cell::Bool(value) => write!(f, "{value}"),
            Cell::DateTime(value) => write!(f, "{}", value.format("%Y-%m-%d %H:%M:%S")),
        }
    }
}

/// An ingested sheet: header names plus rows padded to the header width.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TicketTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl TicketTable {
    pub fn new(headers: Vec<String>) -> Self {
        Self {
            headers,
            rows: Vec::new(),
        }
    }

    pub fn push_row(&mut self, mut row: Vec<Cell>) {
        row.resize(self.headers.len(), Cell::Empty);
        self.rows.push(row);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|header| header == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    pub fn cell(&self, row: usize, column: usize) -> &Cell {
        self.rows
            .get(row)
            .and_then(|cells| cells.get(column))
            .unwrap_or(&EMPTY_CELL)
    }

    /// Copy of the table keeping only the rows the predicate accepts.
    pub fn filter_rows<F>(&self, mut keep: F) -> TicketTable
    where
        F: FnMut(&[Cell]) -> bool,
    {
        TicketTable {
            headers: self.headers.clone(),
            rows: self
                .rows
                .iter()
                .filter(|row| keep(row))
                .cloned()
                .collect(),
        }
    }
}

/// Grouping key taken from the literal `Responsável` cell.
///
/// Empty cells collapse into [`AssigneeKey::Unassigned`], which orders after
/// every named assignee.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AssigneeKey {
    Named(String),
    Unassigned,
}

impl AssigneeKey {
    pub fn from_cell(cell: &Cell) -> Self {
        match cell {
            Cell::Empty => AssigneeKey::Unassigned,
            other => AssigneeKey::Named(other.to_string()),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            AssigneeKey::Named(name) => name,
            AssigneeKey::Unassigned => UNASSIGNED_LABEL,
        }
    }
}

impl fmt::Display for AssigneeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for AssigneeKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryRow {
    #[serde(rename = "Responsável")]
    pub assignee: AssigneeKey,
    #[serde(rename = "Total de Chamados")]
    pub total_tickets: usize,
    #[serde(rename = "Chamados Encerrados")]
    pub closed_tickets: usize,
    #[serde(rename = "Taxa de Produtividade (%)")]
    pub closure_rate_pct: f64,
    #[serde(rename = "Tempo Médio (horas)")]
    pub avg_handling_hours: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProductivitySummary {
    pub rows: Vec<SummaryRow>,
}

impl ProductivitySummary {
    pub fn total_tickets(&self) -> usize {
        self.rows.iter().map(|row| row.total_tickets).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryOverview {
    #[serde(rename = "Taxa Média de Produtividade")]
    pub avg_closure_rate_pct: f64,
    #[serde(rename = "Tempo Médio de Atendimento")]
    pub avg_handling_hours: f64,
    #[serde(rename = "Total de Chamados")]
    pub total_tickets: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusCount {
    pub status: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusDistribution {
    pub scope: String,
    pub counts: Vec<StatusCount>,
}

impl StatusDistribution {
    pub fn labels(&self) -> Vec<String> {
        self.counts.iter().map(|entry| entry.status.clone()).collect()
    }

    pub fn values(&self) -> Vec<usize> {
        self.counts.iter().map(|entry| entry.count).collect()
    }
}

/// Bar chart description handed to whatever renders it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSpec {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub tick_angle: i32,
    pub show_legend: bool,
    pub labels: Vec<String>,
    pub values: Vec<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_rows_are_padded_to_header_width() {
        let mut table = TicketTable::new(vec!["Id".to_string(), "Status".to_string()]);
        table.push_row(vec![Cell::Number(1.0)]);
        assert_eq!(table.rows[0].len(), 2);
        assert!(table.cell(0, 1).is_empty());
        assert!(table.cell(5, 0).is_empty());
    }

    #[test]
    fn unassigned_orders_after_named() {
        let mut keys = vec![
            AssigneeKey::Unassigned,
            AssigneeKey::Named("Bia".to_string()),
            AssigneeKey::Named("Ana".to_string()),
        ];
        keys.sort();
        assert_eq!(keys[0].label(), "Ana");
        assert_eq!(keys[2].label(), UNASSIGNED_LABEL);
    }

    #[test]
    fn assignee_key_uses_literal_cell_text() {
        assert_eq!(
            AssigneeKey::from_cell(&Cell::Text(" Ana".to_string())),
            AssigneeKey::Named(" Ana".to_string())
        );
        assert_eq!(AssigneeKey::from_cell(&Cell::Empty), AssigneeKey::Unassigned);
        assert_eq!(AssigneeKey::from_cell(&Cell::Number(42.0)).label(), "42");
    }

    #[test]
    fn numeric_and_text_assignees_share_a_group() {
        assert_eq!(
            AssigneeKey::from_cell(&Cell::Number(42.0)),
            AssigneeKey::from_cell(&Cell::Text("42".to_string()))
        );
    }
}
