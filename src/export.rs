use chrono::NaiveDateTime;
use rust_xlsxwriter::{Format, Workbook, Worksheet, XlsxError};
use tracing::info;

use crate::error::DashboardError;
use crate::models::{Cell, ProductivitySummary, TicketTable};
use crate::status::{filter_by_assignee, AssigneeFilter};

pub const SUMMARY_SHEET: &str = "Produtividade";
pub const DETAIL_SHEET: &str = "Dados Detalhados";
pub const XLSX_MIME: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

pub const SUMMARY_HEADERS: [&str; 5] = [
    "Responsável",
    "Total de Chamados",
    "Chamados Encerrados",
    "Taxa de Produtividade (%)",
    "Tempo Médio (horas)",
];

/// A finished workbook, ready to be handed to a download or written to disk.
#[derive(Debug, Clone)]
pub struct ExportFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl ExportFile {
    pub fn mime_type(&self) -> &'static str {
        XLSX_MIME
    }
}

pub fn report_file_name(generated_at: NaiveDateTime) -> String {
    format!(
        "relatorio_produtividade_{}.xlsx",
        generated_at.format("%Y%m%d_%H%M%S")
    )
}

fn export_error(err: XlsxError) -> DashboardError {
    DashboardError::Export(err.to_string())
}

pub fn export_report(
    summary: &ProductivitySummary,
    table: &TicketTable,
    filter: &AssigneeFilter,
    generated_at: NaiveDateTime,
) -> Result<ExportFile, DashboardError> {
    let detail = filter_by_assignee(table, filter).ok_or_else(|| {
        DashboardError::Export("coluna 'Responsável' não encontrada".to_string())
    })?;

    let mut workbook = Workbook::new();
    let header_format = Format::new().set_bold();

    let sheet = workbook.add_worksheet();
    sheet.set_name(SUMMARY_SHEET).map_err(export_error)?;
    write_summary(sheet, summary, &header_format).map_err(export_error)?;

    let sheet = workbook.add_worksheet();
    sheet.set_name(DETAIL_SHEET).map_err(export_error)?;
    write_detail(sheet, &detail, &header_format)?;

    // Each export builds a fresh buffer; nothing is shared between calls.
    let bytes = workbook.save_to_buffer().map_err(export_error)?;
    let file_name = report_file_name(generated_at);

    info!(
        file = %file_name,
        bytes = bytes.len(),
        detail_rows = detail.len(),
        scope = filter.label(),
        "built productivity report"
    );
    Ok(ExportFile { file_name, bytes })
}

fn write_summary(
    sheet: &mut Worksheet,
    summary: &ProductivitySummary,
    header_format: &Format,
) -> Result<(), XlsxError> {
    for (col, header) in SUMMARY_HEADERS.iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, *header, header_format)?;
    }

    for (index, row) in summary.rows.iter().enumerate() {
        let line = index as u32 + 1;
        sheet.write_string(line, 0, row.assignee.label())?;
        sheet.write_number(line, 1, row.total_tickets as f64)?;
        sheet.write_number(line, 2, row.closed_tickets as f64)?;
        sheet.write_number(line, 3, row.closure_rate_pct)?;
        sheet.write_number(line, 4, row.avg_handling_hours)?;
    }
    Ok(())
}

fn write_detail(
    sheet: &mut Worksheet,
    table: &TicketTable,
    header_format: &Format,
) -> Result<(), DashboardError> {
    let width = u16::try_from(table.headers.len())
        .map_err(|_| DashboardError::Export("planilha com colunas demais".to_string()))?;
    let height = u32::try_from(table.len())
        .map_err(|_| DashboardError::Export("planilha com linhas demais".to_string()))?;

    for (col, header) in (0..width).zip(&table.headers) {
        sheet
            .write_string_with_format(0, col, header.as_str(), header_format)
            .map_err(export_error)?;
    }

    for line in 0..height {
        for col in 0..width {
            let cell = table.cell(line as usize, col as usize);
            write_cell(sheet, line + 1, col, cell).map_err(export_error)?;
        }
    }
    Ok(())
}

fn write_cell(sheet: &mut Worksheet, row: u32, col: u16, cell: &Cell) -> Result<(), XlsxError> {
    match cell {
        Cell::Empty => {}
        Cell::Number(value) => {
            sheet.write_number(row, col, *value)?;
        }
        Cell::Bool(value) => {
            sheet.write_boolean(row, col, *value)?;
        }
        Cell::Text(value) => {
            sheet.write_string(row, col, value.as_str())?;
        }
        Cell::DateTime(_) => {
            sheet.write_string(row, col, cell.to_string())?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::read_xlsx_bytes;
    use crate::productivity::{fixtures::tickets, summarize};
    use chrono::NaiveDate;

    fn generated_at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 3, 7)
            .and_then(|d| d.and_hms_opt(14, 5, 9))
            .unwrap()
    }

    fn sample() -> (ProductivitySummary, TicketTable) {
        let mut table = tickets(&[
            (Some("Ana"), Some("Fechado"), "2,5h"),
            (Some("Ana"), Some("Aberto"), "1"),
            (Some("Bia"), Some("Resolvido"), "3"),
            (None, Some("Aberto"), ""),
        ]);
        let summary = summarize(&mut table).unwrap();
        (summary, table)
    }

    #[test]
    fn file_name_embeds_timestamp_to_the_second() {
        assert_eq!(
            report_file_name(generated_at()),
            "relatorio_produtividade_20260307_140509.xlsx"
        );
    }

    #[test]
    fn summary_sheet_reads_back_unchanged() {
        let (summary, table) = sample();
        let export =
            export_report(&summary, &table, &AssigneeFilter::All, generated_at()).unwrap();
        assert_eq!(export.mime_type(), XLSX_MIME);

        let sheet = read_xlsx_bytes(&export.bytes, Some(SUMMARY_SHEET)).unwrap();
        assert_eq!(sheet.headers, SUMMARY_HEADERS);
        assert_eq!(sheet.len(), summary.rows.len());

        for (line, row) in summary.rows.iter().enumerate() {
            assert_eq!(sheet.cell(line, 0), &Cell::Text(row.assignee.label().to_string()));
            assert_eq!(sheet.cell(line, 1), &Cell::Number(row.total_tickets as f64));
            assert_eq!(sheet.cell(line, 2), &Cell::Number(row.closed_tickets as f64));
            assert_eq!(sheet.cell(line, 3), &Cell::Number(row.closure_rate_pct));
            assert_eq!(sheet.cell(line, 4), &Cell::Number(row.avg_handling_hours));
        }
    }

    #[test]
    fn detail_sheet_follows_assignee_filter() {
        let (summary, table) = sample();

        let all = export_report(&summary, &table, &AssigneeFilter::All, generated_at()).unwrap();
        let detail = read_xlsx_bytes(&all.bytes, Some(DETAIL_SHEET)).unwrap();
        assert_eq!(detail.headers, table.headers);
        assert_eq!(detail.len(), 4);

        let only_ana = AssigneeFilter::parse(Some("Ana"));
        let filtered = export_report(&summary, &table, &only_ana, generated_at()).unwrap();
        let detail = read_xlsx_bytes(&filtered.bytes, Some(DETAIL_SHEET)).unwrap();
        assert_eq!(detail.len(), 2);

        let hours = detail.column_index(crate::schema::HANDLING_HOURS).unwrap();
        assert_eq!(detail.cell(0, hours), &Cell::Number(2.5));
    }
}
