use thiserror::Error;

/// Failures surfaced to the person driving the dashboard.
///
/// Every step converts its own lower-level errors into one of these at its
/// boundary, so no step hands back a partially computed result.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DashboardError {
    #[error("Colunas ausentes na planilha: {}", missing.join(", "))]
    Schema { missing: Vec<String> },

    #[error("Erro ao processar dados: {0}")]
    Aggregation(String),

    #[error("Erro ao criar gráfico: {0}")]
    Chart(String),

    #[error(
        "Erro ao processar o arquivo: {0}. Por favor, verifique se o arquivo está no formato correto e tente novamente."
    )]
    Ingestion(String),

    #[error("Erro ao gerar relatório: {0}")]
    Export(String),

    #[error("Sessão não autenticada")]
    NotLoggedIn,

    #[error("Nenhuma planilha carregada")]
    NoUpload,
}

impl DashboardError {
    pub fn missing_columns(&self) -> Option<&[String]> {
        match self {
            DashboardError::Schema { missing } => Some(missing),
            _ => None,
        }
    }
}
