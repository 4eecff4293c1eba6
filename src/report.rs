use std::fmt::Write;

use crate::export::SUMMARY_HEADERS;
use crate::models::{ProductivitySummary, StatusDistribution, SummaryOverview};
use crate::status::CHART_TITLE;

const BAR_WIDTH: usize = 30;

pub fn render_summary_table(summary: &ProductivitySummary) -> String {
    let mut output = String::new();

    if summary.rows.is_empty() {
        let _ = writeln!(output, "Nenhum chamado encontrado.");
        return output;
    }

    let _ = writeln!(output, "| {} |", SUMMARY_HEADERS.join(" | "));
    let _ = writeln!(output, "|{}", "---|".repeat(SUMMARY_HEADERS.len()));
    for row in &summary.rows {
        let _ = writeln!(
            output,
            "| {} | {} | {} | {:.2} | {:.2} |",
            row.assignee,
            row.total_tickets,
            row.closed_tickets,
            row.closure_rate_pct,
            row.avg_handling_hours
        );
    }
    output
}

/// Horizontal text bars scaled against the largest status count.
pub fn render_status_chart(distribution: &StatusDistribution) -> String {
    let mut output = String::new();
    let _ = writeln!(output, "{} ({})", CHART_TITLE, distribution.scope);

    let Some(max) = distribution.counts.iter().map(|entry| entry.count).max() else {
        let _ = writeln!(output, "Nenhum status para exibir.");
        return output;
    };
    let label_width = distribution
        .counts
        .iter()
        .map(|entry| entry.status.chars().count())
        .max()
        .unwrap_or(0);

    for entry in &distribution.counts {
        let bar = (entry.count * BAR_WIDTH).div_ceil(max.max(1));
        let padding = label_width - entry.status.chars().count();
        let _ = writeln!(
            output,
            "{}{} | {} {}",
            entry.status,
            " ".repeat(padding),
            "#".repeat(bar),
            entry.count
        );
    }
    output
}

pub fn render_overview(overview: &SummaryOverview) -> String {
    let mut output = String::new();
    let _ = writeln!(
        output,
        "- Taxa Média de Produtividade: {:.2}%",
        overview.avg_closure_rate_pct
    );
    let _ = writeln!(
        output,
        "- Tempo Médio de Atendimento: {:.2}h",
        overview.avg_handling_hours
    );
    let _ = writeln!(output, "- Total de Chamados: {}", overview.total_tickets);
    output
}

pub fn build_report(
    source: &str,
    summary: &ProductivitySummary,
    overview: &SummaryOverview,
    distribution: &StatusDistribution,
) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "# Dashboard de Produtividade");
    let _ = writeln!(
        output,
        "Gerado a partir de {} (responsável: {})",
        source, distribution.scope
    );
    let _ = writeln!(output);
    let _ = writeln!(output, "## Métricas de Produtividade");
    output.push_str(&render_summary_table(summary));

    let _ = writeln!(output);
    let _ = writeln!(output, "## Distribuição de Status");
    let _ = writeln!(output, "```");
    output.push_str(&render_status_chart(distribution));
    let _ = writeln!(output, "```");

    let _ = writeln!(output);
    let _ = writeln!(output, "## Resumo Geral");
    output.push_str(&render_overview(overview));

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AssigneeKey, StatusCount, SummaryRow};

    fn summary() -> ProductivitySummary {
        ProductivitySummary {
            rows: vec![
                SummaryRow {
                    assignee: AssigneeKey::Named("Ana".to_string()),
                    total_tickets: 2,
                    closed_tickets: 1,
                    closure_rate_pct: 50.0,
                    avg_handling_hours: 2.5,
                },
                SummaryRow {
                    assignee: AssigneeKey::Unassigned,
                    total_tickets: 1,
                    closed_tickets: 0,
                    closure_rate_pct: 0.0,
                    avg_handling_hours: 0.0,
                },
            ],
        }
    }

    fn distribution() -> StatusDistribution {
        StatusDistribution {
            scope: "Todos".to_string(),
            counts: vec![
                StatusCount {
                    status: "Fechado".to_string(),
                    count: 4,
                },
                StatusCount {
                    status: "Aberto".to_string(),
                    count: 2,
                },
            ],
        }
    }

    #[test]
    fn summary_table_has_one_line_per_group() {
        let table = render_summary_table(&summary());
        assert!(table.contains("| Ana | 2 | 1 | 50.00 | 2.50 |"));
        assert!(table.contains("(sem responsável)"));
        assert_eq!(table.lines().count(), 4);
    }

    #[test]
    fn bars_scale_to_largest_count() {
        let chart = render_status_chart(&distribution());
        let lines: Vec<&str> = chart.lines().collect();
        assert_eq!(lines[1], format!("Fechado | {} 4", "#".repeat(30)));
        assert_eq!(lines[2], format!("Aberto  | {} 2", "#".repeat(15)));
    }

    #[test]
    fn empty_distribution_says_so() {
        let empty = StatusDistribution {
            scope: "Zé".to_string(),
            counts: Vec::new(),
        };
        assert!(render_status_chart(&empty).contains("Nenhum status"));
    }

    #[test]
    fn report_contains_all_sections() {
        let overview = SummaryOverview {
            avg_closure_rate_pct: 25.0,
            avg_handling_hours: 1.25,
            total_tickets: 3,
        };
        let report = build_report("tickets.xlsx", &summary(), &overview, &distribution());
        assert!(report.starts_with("# Dashboard de Produtividade"));
        assert!(report.contains("## Métricas de Produtividade"));
        assert!(report.contains("## Distribuição de Status"));
        assert!(report.contains("- Taxa Média de Produtividade: 25.00%"));
        assert!(report.contains("- Total de Chamados: 3"));
    }
}
