use std::path::Path;

use chrono::NaiveDateTime;
use tracing::info;

use crate::error::DashboardError;
use crate::export::{self, ExportFile};
use crate::ingest;
use crate::models::{
    ChartSpec, ProductivitySummary, StatusDistribution, SummaryOverview, TicketTable,
};
use crate::productivity;
use crate::schema;
use crate::session::Session;
use crate::status::{self, AssigneeFilter};

/// A validated, normalized sheet together with its summary.
#[derive(Debug, Clone)]
pub struct Upload {
    pub source: String,
    pub table: TicketTable,
    pub summary: ProductivitySummary,
}

/// State of one interactive session: who is logged in and what was uploaded.
#[derive(Debug, Default)]
pub struct Dashboard {
    session: Session,
    upload: Option<Upload>,
}

impl Dashboard {
    pub fn new(session: Session) -> Self {
        Self {
            session,
            upload: None,
        }
    }

    pub fn login(&mut self, username: &str, password: &str) -> bool {
        self.session.login(username, password)
    }

    pub fn logout(&mut self) {
        self.session.logout();
        self.upload = None;
    }

    pub fn upload_path(&mut self, path: &Path) -> Result<&Upload, DashboardError> {
        self.session.require_login()?;
        self.upload = None;
        let table = ingest::read_table(path)?;
        self.accept(path.display().to_string(), table)
    }

    pub fn upload_bytes(
        &mut self,
        source: &str,
        bytes: &[u8],
    ) -> Result<&Upload, DashboardError> {
        self.session.require_login()?;
        self.upload = None;
        let table = ingest::read_xlsx_bytes(bytes, None)?;
        self.accept(source.to_string(), table)
    }

    /// Validate, then aggregate; a failure leaves no upload behind.
    pub fn accept(
        &mut self,
        source: String,
        table: TicketTable,
    ) -> Result<&Upload, DashboardError> {
        self.session.require_login()?;
        self.upload = None;

        let mut table = schema::validate(table)?;
        let summary = productivity::summarize(&mut table)?;
        info!(
            session = %self.session.id(),
            source = %source,
            assignees = summary.rows.len(),
            "upload processed"
        );

        Ok(self.upload.insert(Upload {
            source,
            table,
            summary,
        }))
    }

    pub fn current(&self) -> Result<&Upload, DashboardError> {
        self.session.require_login()?;
        self.upload.as_ref().ok_or(DashboardError::NoUpload)
    }

    pub fn summary(&self) -> Result<&ProductivitySummary, DashboardError> {
        Ok(&self.current()?.summary)
    }

    pub fn overview(&self) -> Result<SummaryOverview, DashboardError> {
        Ok(productivity::overview(self.summary()?))
    }

    pub fn assignee_options(&self) -> Result<Vec<String>, DashboardError> {
        Ok(status::assignee_options(&self.current()?.table))
    }

    pub fn status_distribution(
        &self,
        filter: &AssigneeFilter,
    ) -> Result<StatusDistribution, DashboardError> {
        status::status_distribution(&self.current()?.table, filter)
    }

    pub fn status_chart(&self, filter: &AssigneeFilter) -> Result<ChartSpec, DashboardError> {
        status::status_chart(&self.current()?.table, filter)
    }

    pub fn export(
        &self,
        filter: &AssigneeFilter,
        generated_at: NaiveDateTime,
    ) -> Result<ExportFile, DashboardError> {
        let upload = self.current()?;
        export::export_report(&upload.summary, &upload.table, filter, generated_at)
    }
}
