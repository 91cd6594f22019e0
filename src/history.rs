use crate::calendar::YearMonth;
use crate::error::ValidationError;
use crate::matrix::{build_monthly_matrix, AttendanceSource, MatrixError, MonthlyMatrix};
use crate::model::{Workshop, WorkshopId};
use tracing::{debug, error};

pub const LOAD_FAILED: &str = "Falló al cargar historial";
pub const NO_RECORDS: &str = "No hay registros para este mes.";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum HistoryStatus {
    #[default]
    Idle,
    Loading,
    Loaded(MonthlyMatrix),
    Failed(String),
}

/// Identifies one build. Only the ticket of the latest build may apply its result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildTicket {
    generation: u64,
    pub workshop: WorkshopId,
    pub month: YearMonth,
}

/// State of the monthly history view: the selection and what is currently shown.
#[derive(Debug, Clone)]
pub struct HistoryView {
    workshop: Option<WorkshopId>,
    month: YearMonth,
    generation: u64,
    status: HistoryStatus,
}

impl HistoryView {
    pub fn new(month: YearMonth) -> Self {
        HistoryView {
            workshop: None,
            month,
            generation: 0,
            status: HistoryStatus::Idle,
        }
    }

    pub fn workshop(&self) -> Option<WorkshopId> {
        self.workshop
    }

    pub fn month(&self) -> YearMonth {
        self.month
    }

    pub fn status(&self) -> &HistoryStatus {
        &self.status
    }

    /// Changing the selection invalidates any build still in flight.
    pub fn select_workshop(&mut self, workshop: Option<WorkshopId>) {
        if self.workshop != workshop {
            self.workshop = workshop;
            self.invalidate();
        }
    }

    pub fn select_month(&mut self, month: YearMonth) {
        if self.month != month {
            self.month = month;
            self.invalidate();
        }
    }

    fn invalidate(&mut self) {
        self.generation += 1;
        self.status = HistoryStatus::Idle;
    }

    /// Starts a build for the current selection.
    pub fn begin(&mut self) -> Result<BuildTicket, ValidationError> {
        let workshop = self.workshop.ok_or(ValidationError::MissingWorkshop)?;
        self.generation += 1;
        self.status = HistoryStatus::Loading;

        Ok(BuildTicket {
            generation: self.generation,
            workshop,
            month: self.month,
        })
    }

    /// Applies the outcome of a build. Returns `false` and leaves the view untouched if the ticket is stale.
    pub fn finish(
        &mut self,
        ticket: BuildTicket,
        result: Result<MonthlyMatrix, MatrixError>,
    ) -> bool {
        if ticket.generation != self.generation {
            debug!(
                "Discarding stale matrix for {} {}",
                ticket.workshop, ticket.month
            );
            return false;
        }

        self.status = match result {
            Ok(matrix) => HistoryStatus::Loaded(matrix),
            Err(e) => {
                error!("Failed to load history: {}", e);
                HistoryStatus::Failed(LOAD_FAILED.to_string())
            }
        };
        true
    }

    pub async fn load<S>(
        &mut self,
        source: &S,
        workshops: &[Workshop],
    ) -> Result<(), ValidationError>
    where
        S: AttendanceSource + ?Sized,
    {
        let ticket = self.begin()?;
        let result = build_monthly_matrix(source, workshops, ticket.workshop, ticket.month).await;
        self.finish(ticket, result);
        Ok(())
    }

    /// The line shown instead of a table, if any.
    pub fn message(&self) -> Option<&str> {
        match &self.status {
            HistoryStatus::Failed(message) => Some(message),
            HistoryStatus::Loaded(matrix) if matrix.is_empty() && self.workshop.is_some() => {
                Some(NO_RECORDS)
            }
            _ => None,
        }
    }
}
