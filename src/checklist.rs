use crate::api::ApiError;
use crate::error::ValidationError;
use crate::matrix::AttendanceSource;
use crate::model::{AttendanceMark, AttendanceRecord, AttendanceSheet, StudentId, WorkshopId};
use chrono::NaiveDate;
use tracing::{debug, instrument};

/// One day's attendance list for a workshop, as edited before saving.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Checklist {
    pub workshop: WorkshopId,
    pub date: NaiveDate,
    pub entries: Vec<AttendanceRecord>,
}

/// Both a workshop and a date must be chosen before a list can be loaded.
pub fn require_selection(
    workshop: Option<WorkshopId>,
    date: Option<NaiveDate>,
) -> Result<(WorkshopId, NaiveDate), ValidationError> {
    let workshop = workshop.ok_or(ValidationError::MissingWorkshop)?;
    let date = date.ok_or(ValidationError::MissingDate)?;
    Ok((workshop, date))
}

impl Checklist {
    #[instrument(skip(source))]
    pub async fn load<S>(source: &S, workshop: WorkshopId, date: NaiveDate) -> Result<Self, ApiError>
    where
        S: AttendanceSource + ?Sized,
    {
        let entries = source.attendance(workshop, date).await?;
        debug!("Loaded {} entries", entries.len());

        Ok(Checklist {
            workshop,
            date,
            entries,
        })
    }

    /// Flips one student's presence, returning the new value, or `None` if the student is not listed.
    pub fn toggle(&mut self, student: StudentId) -> Option<bool> {
        let entry = self.entries.iter_mut().find(|e| e.student_id == student)?;
        entry.present = !entry.present;
        Some(entry.present)
    }

    /// Returns `false` if the student is not listed.
    pub fn set(&mut self, student: StudentId, present: bool) -> bool {
        match self.entries.iter_mut().find(|e| e.student_id == student) {
            Some(entry) => {
                entry.present = present;
                true
            }
            None => false,
        }
    }

    pub fn present_count(&self) -> usize {
        self.entries.iter().filter(|e| e.present).count()
    }

    pub fn sheet(&self) -> AttendanceSheet {
        AttendanceSheet {
            workshop_id: self.workshop,
            date: self.date,
            marks: self
                .entries
                .iter()
                .map(|e| AttendanceMark {
                    student_id: e.student_id,
                    present: e.present,
                })
                .collect(),
        }
    }
}

pub const SAVED: &str = "Asistencia guardada correctamente";

pub fn save_error_message(e: &ApiError) -> String {
    format!("Error al guardar: {}", e.user_message())
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    fn checklist() -> Checklist {
        let entry = |id, name: &str, present| AttendanceRecord {
            student_id: StudentId(id),
            first_name: name.to_string(),
            last_name: String::new(),
            present,
        };
        Checklist {
            workshop: WorkshopId(1),
            date: NaiveDate::from_ymd_opt(2025, 2, 3).unwrap(),
            entries: vec![entry(1, "Ana", false), entry(2, "Luis", true)],
        }
    }

    #[test]
    fn toggles_listed_students_only() {
        let mut list = checklist();
        assert_eq!(list.toggle(StudentId(1)), Some(true));
        assert_eq!(list.toggle(StudentId(2)), Some(false));
        assert_eq!(list.toggle(StudentId(3)), None);
        assert_eq!(list.present_count(), 1);
    }

    #[test]
    fn sheet_carries_every_entry() {
        let mut list = checklist();
        assert!(list.set(StudentId(1), true));
        assert!(!list.set(StudentId(5), true));

        let sheet = list.sheet();
        assert_eq!(sheet.workshop_id, WorkshopId(1));
        assert_eq!(
            sheet.marks,
            vec![
                AttendanceMark { student_id: StudentId(1), present: true },
                AttendanceMark { student_id: StudentId(2), present: true },
            ]
        );
    }

    #[test]
    fn selection_is_required() {
        let date = NaiveDate::from_ymd_opt(2025, 2, 3);
        assert_eq!(require_selection(None, date), Err(ValidationError::MissingWorkshop));
        assert_eq!(
            require_selection(Some(WorkshopId(1)), None),
            Err(ValidationError::MissingDate)
        );
        assert!(require_selection(Some(WorkshopId(1)), date).is_ok());
    }

    #[test]
    fn save_error_uses_server_message() {
        let e = ApiError::Status {
            status: StatusCode::BAD_REQUEST,
            message: "fecha inválida".into(),
        };
        assert_eq!(save_error_message(&e), "Error al guardar: fecha inválida");
    }
}
