//! Monthly attendance matrix: one row per student, one column per meeting date.

use crate::api::ApiError;
use crate::calendar::YearMonth;
use crate::model::{full_name, AttendanceRecord, StudentId, Workshop, WorkshopId};
use crate::weekday::Days;
use chrono::NaiveDate;
use futures::future::{try_join_all, BoxFuture};
use std::collections::{BTreeMap, HashMap, HashSet};
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

/// Where attendance records for a (workshop, date) pair come from.
pub trait AttendanceSource {
    fn attendance(
        &self,
        workshop: WorkshopId,
        date: NaiveDate,
    ) -> BoxFuture<'_, Result<Vec<AttendanceRecord>, ApiError>>;
}

#[derive(Debug, Error)]
pub enum MatrixError {
    #[error("failed to load attendance for {date}: {source}")]
    Load {
        date: NaiveDate,
        #[source]
        source: ApiError,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatrixRow {
    pub student_id: StudentId,
    pub first_name: String,
    pub last_name: String,
    pub presence: BTreeMap<NaiveDate, bool>,
    /// Number of dates the student was present on.
    pub total: u32,
}

impl MatrixRow {
    pub fn full_name(&self) -> String {
        full_name(&self.first_name, &self.last_name)
    }

    pub fn is_present(&self, date: NaiveDate) -> bool {
        self.presence.get(&date).copied().unwrap_or(false)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MonthlyMatrix {
    pub dates: Vec<NaiveDate>,
    pub rows: Vec<MatrixRow>,
    /// Number of students present, aligned with `dates`.
    pub column_totals: Vec<u32>,
}

impl MonthlyMatrix {
    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }
}

/// Records fetched for one meeting date.
pub type DayRecords = (NaiveDate, Vec<AttendanceRecord>);

/// The dates of `month` on which `workshop` meets.
pub fn meeting_dates(workshop: &Workshop, month: YearMonth) -> Vec<NaiveDate> {
    month.dates_on(Days::from_names(&workshop.days))
}

/// Fetches every date concurrently. Fails as a whole if any single fetch fails.
pub async fn fetch_days<S>(
    source: &S,
    workshop: WorkshopId,
    dates: &[NaiveDate],
) -> Result<Vec<DayRecords>, MatrixError>
where
    S: AttendanceSource + ?Sized,
{
    try_join_all(dates.iter().map(|&date| async move {
        source
            .attendance(workshop, date)
            .await
            .map(|records| (date, records))
            .map_err(|source| MatrixError::Load { date, source })
    }))
    .await
}

/// Pivots fetched records into the matrix.
///
/// Rows appear in order of first appearance, and the first record seen for a student
/// provides their name. A date with no record for a student counts as absent.
pub fn pivot(dates: Vec<NaiveDate>, days: &[DayRecords]) -> MonthlyMatrix {
    let mut index: HashMap<StudentId, usize> = HashMap::new();
    let mut rows: Vec<MatrixRow> = Vec::new();

    for record in days.iter().flat_map(|(_, records)| records) {
        index.entry(record.student_id).or_insert_with(|| {
            rows.push(MatrixRow {
                student_id: record.student_id,
                first_name: record.first_name.clone(),
                last_name: record.last_name.clone(),
                presence: dates.iter().map(|&date| (date, false)).collect(),
                total: 0,
            });
            rows.len() - 1
        });
    }

    for (date, records) in days {
        let present: HashSet<StudentId> = records
            .iter()
            .filter(|r| r.present)
            .map(|r| r.student_id)
            .collect();

        for row in rows.iter_mut() {
            if let Some(cell) = row.presence.get_mut(date) {
                *cell = present.contains(&row.student_id);
            }
        }
    }

    for row in rows.iter_mut() {
        row.total = row.presence.values().filter(|&&present| present).count() as u32;
    }

    let column_totals = dates
        .iter()
        .map(|&date| rows.iter().filter(|row| row.is_present(date)).count() as u32)
        .collect();

    MonthlyMatrix {
        dates,
        rows,
        column_totals,
    }
}

/// Builds the matrix of `workshop_id` for `month`.
///
/// `workshops` is the list the workshop is looked up in; an id not in it yields an empty matrix.
#[instrument(skip(source, workshops))]
pub async fn build_monthly_matrix<S>(
    source: &S,
    workshops: &[Workshop],
    workshop_id: WorkshopId,
    month: YearMonth,
) -> Result<MonthlyMatrix, MatrixError>
where
    S: AttendanceSource + ?Sized,
{
    let Some(workshop) = workshops.iter().find(|w| w.id == workshop_id) else {
        warn!("Workshop {} not found", workshop_id);
        return Ok(MonthlyMatrix::default());
    };

    let dates = meeting_dates(workshop, month);
    debug!("{} meets on {} dates in {}", workshop.name, dates.len(), month);

    let days = fetch_days(source, workshop_id, &dates).await?;
    let matrix = pivot(dates, &days);

    info!(
        "Built matrix for {} {}: {} students, {} dates",
        workshop.name,
        month,
        matrix.rows.len(),
        matrix.dates.len()
    );

    Ok(matrix)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn record(id: i64, name: &str, present: bool) -> AttendanceRecord {
        AttendanceRecord {
            student_id: StudentId(id),
            first_name: name.to_string(),
            last_name: "Test".to_string(),
            present,
        }
    }

    #[test]
    fn missing_records_default_to_absent() {
        let d1 = ymd(2025, 2, 3);
        let d2 = ymd(2025, 2, 5);
        let days = vec![
            (d1, vec![record(1, "Ana", true), record(2, "Luis", true)]),
            (d2, vec![record(1, "Ana", true)]),
        ];

        let matrix = pivot(vec![d1, d2], &days);
        let luis = &matrix.rows[1];
        assert_eq!(luis.first_name, "Luis");
        assert!(luis.is_present(d1));
        assert!(!luis.is_present(d2));
        assert_eq!(luis.presence.get(&d2), Some(&false));
    }

    #[test]
    fn totals_count_present_cells() {
        let d1 = ymd(2025, 2, 3);
        let d2 = ymd(2025, 2, 5);
        let d3 = ymd(2025, 2, 10);
        let days = vec![
            (d1, vec![record(1, "Ana", true), record(2, "Luis", false)]),
            (d2, vec![record(1, "Ana", false), record(2, "Luis", true)]),
            (d3, vec![record(1, "Ana", true), record(2, "Luis", true), record(3, "Eva", false)]),
        ];

        let matrix = pivot(vec![d1, d2, d3], &days);
        assert_eq!(matrix.rows.len(), 3);
        assert_eq!(
            matrix.rows.iter().map(|r| r.total).collect::<Vec<_>>(),
            vec![2, 2, 0]
        );
        assert_eq!(matrix.column_totals, vec![1, 1, 2]);

        for row in &matrix.rows {
            let trues = row.presence.values().filter(|&&p| p).count() as u32;
            assert_eq!(row.total, trues);
        }
        for (i, &date) in matrix.dates.iter().enumerate() {
            let present = matrix.rows.iter().filter(|r| r.is_present(date)).count() as u32;
            assert_eq!(matrix.column_totals[i], present);
        }
    }

    #[test]
    fn first_occurrence_names_the_row() {
        let d1 = ymd(2025, 2, 3);
        let d2 = ymd(2025, 2, 5);
        let days = vec![
            (d1, vec![record(1, "Ana", false)]),
            (d2, vec![record(1, "Anita", true)]),
        ];

        let matrix = pivot(vec![d1, d2], &days);
        assert_eq!(matrix.rows.len(), 1);
        assert_eq!(matrix.rows[0].first_name, "Ana");
        assert_eq!(matrix.rows[0].total, 1);
    }

    #[test]
    fn no_records_no_rows() {
        let d1 = ymd(2025, 2, 3);
        let matrix = pivot(vec![d1], &[(d1, vec![])]);
        assert!(matrix.rows.is_empty());
        assert_eq!(matrix.column_totals, vec![0]);
        assert!(!matrix.is_empty());
    }
}
