use std::io::Cursor;
use std::path::Path;

use calamine::{open_workbook_auto, open_workbook_from_rs, Data, Range, Reader, Xlsx};
use tracing::{debug, info};

use crate::error::DashboardError;
use crate::models::{Cell, TicketTable};

fn ingestion_error(err: impl std::fmt::Display) -> DashboardError {
    DashboardError::Ingestion(err.to_string())
}

/// Reads the first sheet of a workbook, or a CSV file, by extension.
pub fn read_table(path: &Path) -> Result<TicketTable, DashboardError> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase());

    let table = match extension.as_deref() {
        Some("csv") => read_csv(path)?,
        Some("xlsx" | "xlsm" | "xlsb" | "xls" | "ods") => read_workbook(path)?,
        _ => {
            return Err(DashboardError::Ingestion(format!(
                "formato não suportado: {}",
                path.display()
            )))
        }
    };

    info!(
        file = %path.display(),
        rows = table.len(),
        columns = table.headers.len(),
        "loaded ticket sheet"
    );
    Ok(table)
}

fn read_workbook(path: &Path) -> Result<TicketTable, DashboardError> {
    let mut workbook = open_workbook_auto(path).map_err(ingestion_error)?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| DashboardError::Ingestion("a planilha não possui abas".to_string()))?
        .map_err(ingestion_error)?;
    Ok(table_from_range(&range))
}

/// Parses an uploaded `.xlsx` held in memory; `sheet` defaults to the first one.
pub fn read_xlsx_bytes(bytes: &[u8], sheet: Option<&str>) -> Result<TicketTable, DashboardError> {
    let mut workbook: Xlsx<_> =
        open_workbook_from_rs(Cursor::new(bytes.to_vec())).map_err(ingestion_error)?;

    let range = match sheet {
        Some(name) => workbook.worksheet_range(name).map_err(ingestion_error)?,
        None => workbook
            .worksheet_range_at(0)
            .ok_or_else(|| DashboardError::Ingestion("a planilha não possui abas".to_string()))?
            .map_err(ingestion_error)?,
    };
    Ok(table_from_range(&range))
}

fn table_from_range(range: &Range<Data>) -> TicketTable {
    let mut rows = range.rows();
    let Some(header) = rows.next() else {
        debug!("sheet has no header row");
        return TicketTable::default();
    };

    let mut table = TicketTable::new(header.iter().map(header_name).collect());
    for row in rows {
        table.push_row(row.iter().map(cell_from_data).collect());
    }
    table
}

fn header_name(data: &Data) -> String {
    match data {
        Data::String(name) => name.clone(),
        Data::Empty => String::new(),
        other => other.to_string(),
    }
}

fn cell_from_data(data: &Data) -> Cell {
    match data {
        Data::Empty | Data::Error(_) => Cell::Empty,
        Data::String(text) if text.is_empty() => Cell::Empty,
        Data::String(text) => Cell::Text(text.clone()),
        Data::Float(value) => Cell::Number(*value),
        Data::Int(value) => Cell::Number(*value as f64),
        Data::Bool(value) => Cell::Bool(*value),
        Data::DateTime(value) => value
            .as_datetime()
            .map(Cell::DateTime)
            .unwrap_or_else(|| Cell::Number(value.as_f64())),
        Data::DateTimeIso(text) | Data::DurationIso(text) => Cell::Text(text.clone()),
    }
}

fn read_csv(path: &Path) -> Result<TicketTable, DashboardError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .map_err(ingestion_error)?;

    let headers = reader
        .headers()
        .map_err(ingestion_error)?
        .iter()
        .map(String::from)
        .collect();
    let mut table = TicketTable::new(headers);

    for result in reader.records() {
        let record = result.map_err(ingestion_error)?;
        table.push_row(
            record
                .iter()
                .map(|field| {
                    if field.is_empty() {
                        Cell::Empty
                    } else {
                        Cell::Text(field.to_string())
                    }
                })
                .collect(),
        );
    }

    Ok(table)
}
