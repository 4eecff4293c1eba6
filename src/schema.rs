use tracing::warn;

use crate::error::DashboardError;
use crate::models::TicketTable;

pub const ASSIGNEE: &str = "Responsável";
pub const STATUS: &str = "Status";
pub const HANDLING_HOURS: &str = "Tempo de atendimento(horas)";
pub const SLA_HANDLING: &str = "Sla de atendimento";
pub const SLA_RESOLUTION: &str = "Sla de solução";

pub const NUMERIC_COLUMNS: [&str; 3] = [HANDLING_HOURS, SLA_HANDLING, SLA_RESOLUTION];

/// Columns every uploaded sheet must carry, in display order.
pub const REQUIRED_COLUMNS: [&str; 20] = [
    "Id",
    "Categoria",
    "Data da ultima movimentação",
    "Data de abertura",
    "Data de solução",
    "Título",
    "Nome do solicitante",
    "E-mail do solicitante",
    "CPF do solicitante",
    ASSIGNEE,
    STATUS,
    "Organização",
    "Departamento",
    "Times",
    "Localização",
    HANDLING_HOURS,
    SLA_HANDLING,
    SLA_RESOLUTION,
    "Houve mal uso?",
    "Situação no encerramento",
];

pub fn missing_columns(table: &TicketTable) -> Vec<String> {
    REQUIRED_COLUMNS
        .iter()
        .filter(|column| !table.has_column(column))
        .map(|column| column.to_string())
        .collect()
}

pub fn validate(table: TicketTable) -> Result<TicketTable, DashboardError> {
    let missing = missing_columns(&table);
    if missing.is_empty() {
        return Ok(table);
    }

    warn!(missing = missing.len(), "uploaded sheet is missing required columns");
    Err(DashboardError::Schema { missing })
}

#[cfg(test)]
pub(crate) fn full_headers() -> Vec<String> {
    REQUIRED_COLUMNS.iter().map(|c| c.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Cell;

    #[test]
    fn accepts_table_with_every_column_plus_extras() {
        let mut headers = full_headers();
        headers.push("Observações".to_string());
        let mut table = TicketTable::new(headers);
        table.push_row(vec![Cell::Number(1.0)]);

        let validated = validate(table.clone()).expect("table should pass");
        assert_eq!(validated, table);
    }

    #[test]
    fn reports_missing_columns_in_canonical_order() {
        let headers: Vec<String> = full_headers()
            .into_iter()
            .filter(|h| h != "Status" && h != "Id" && h != "Sla de solução")
            .rev()
            .collect();
        let err = validate(TicketTable::new(headers)).unwrap_err();
        assert_eq!(
            err,
            DashboardError::Schema {
                missing: vec![
                    "Id".to_string(),
                    "Status".to_string(),
                    "Sla de solução".to_string()
                ]
            }
        );
    }

    #[test]
    fn column_names_are_case_sensitive() {
        let headers: Vec<String> = full_headers()
            .into_iter()
            .map(|h| if h == "Times" { "times".to_string() } else { h })
            .collect();
        assert_eq!(missing_columns(&TicketTable::new(headers)), vec!["Times"]);
    }

    #[test]
    fn empty_table_misses_everything() {
        assert_eq!(missing_columns(&TicketTable::default()).len(), 20);
    }
}
