use crate::error::ValidationError;
use crate::model::{NewStudent, Student, StudentUpdate, Workshop, WorkshopForm, WorkshopId};
use crate::names::split_full_name;
use crate::weekday::{normalize_days, UnknownWeekday};
use thiserror::Error;

/// Students whose full name contains `term`, ignoring case.
pub fn search_students<'a>(students: &'a [Student], term: &str) -> Vec<&'a Student> {
    let term = term.to_lowercase();
    students
        .iter()
        .filter(|s| s.full_name().to_lowercase().contains(&term))
        .collect()
}

pub fn search_workshops<'a>(workshops: &'a [Workshop], term: &str) -> Vec<&'a Workshop> {
    let term = term.to_lowercase();
    workshops
        .iter()
        .filter(|w| w.name.to_lowercase().contains(&term))
        .collect()
}

/// Each workshop, in order, with the students enrolled in it.
pub fn group_by_workshop<'a>(
    workshops: &'a [Workshop],
    students: &[&'a Student],
) -> Vec<(&'a Workshop, Vec<&'a Student>)> {
    workshops
        .iter()
        .map(|w| {
            let enrolled = students
                .iter()
                .filter(|s| s.workshops.contains(&w.id))
                .copied()
                .collect();
            (w, enrolled)
        })
        .collect()
}

pub fn new_student(
    full_name: &str,
    address: &str,
    phone: &str,
    workshop: Option<WorkshopId>,
) -> Result<NewStudent, ValidationError> {
    let (first_name, last_name) = split_full_name(full_name)?;
    let workshop_id = workshop.ok_or(ValidationError::MissingWorkshop)?;

    Ok(NewStudent {
        first_name,
        last_name,
        address: address.to_string(),
        phone: phone.to_string(),
        workshop_id,
    })
}

pub fn student_update(
    full_name: &str,
    address: &str,
    phone: &str,
) -> Result<StudentUpdate, ValidationError> {
    let (first_name, last_name) = split_full_name(full_name)?;

    Ok(StudentUpdate {
        first_name,
        last_name,
        address: address.to_string(),
        phone: phone.to_string(),
    })
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum WorkshopFormError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Day(#[from] UnknownWeekday),
}

pub fn workshop_form<S: AsRef<str>>(name: &str, days: &[S]) -> Result<WorkshopForm, WorkshopFormError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ValidationError::EmptyWorkshopName.into());
    }

    Ok(WorkshopForm {
        name: name.to_string(),
        days: normalize_days(days)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::StudentId;

    fn student(id: i64, first: &str, last: &str, workshops: &[i64]) -> Student {
        Student {
            id: StudentId(id),
            first_name: first.to_string(),
            last_name: last.to_string(),
            address: String::new(),
            phone: String::new(),
            workshops: workshops.iter().map(|&w| WorkshopId(w)).collect(),
        }
    }

    fn workshop(id: i64, name: &str) -> Workshop {
        Workshop {
            id: WorkshopId(id),
            name: name.to_string(),
            days: vec![],
        }
    }

    #[test]
    fn search_matches_full_name_case_insensitively() {
        let students = vec![
            student(1, "Ana", "Pérez López", &[1]),
            student(2, "Luis", "Gómez", &[1]),
        ];
        let found = search_students(&students, "PÉREZ L");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, StudentId(1));
        assert_eq!(search_students(&students, "").len(), 2);
    }

    #[test]
    fn groups_students_by_enrollment() {
        let workshops = vec![workshop(1, "Cerámica"), workshop(2, "Teatro")];
        let students = vec![
            student(1, "Ana", "", &[1, 2]),
            student(2, "Luis", "", &[2]),
            student(3, "Eva", "", &[]),
        ];
        let all: Vec<_> = students.iter().collect();

        let groups = group_by_workshop(&workshops, &all);
        let ids = |i: usize| groups[i].1.iter().map(|s| s.id.0).collect::<Vec<_>>();
        assert_eq!(groups[0].0.name, "Cerámica");
        assert_eq!(ids(0), vec![1]);
        assert_eq!(ids(1), vec![1, 2]);
    }

    #[test]
    fn new_student_requires_name_and_workshop() {
        let s = new_student("Ana María López", "Calle 1", "555", Some(WorkshopId(3))).unwrap();
        assert_eq!(s.first_name, "Ana");
        assert_eq!(s.last_name, "María López");
        assert_eq!(s.workshop_id, WorkshopId(3));

        assert_eq!(
            new_student(" ", "", "", Some(WorkshopId(3))),
            Err(ValidationError::EmptyName)
        );
        assert_eq!(
            new_student("Ana", "", "", None),
            Err(ValidationError::MissingWorkshop)
        );
    }

    #[test]
    fn workshop_form_trims_and_normalizes() {
        let form = workshop_form("  Teatro ", &["viernes", "lunes"]).unwrap();
        assert_eq!(form.name, "Teatro");
        assert_eq!(form.days, vec!["Lunes", "Viernes"]);

        assert_eq!(
            workshop_form::<&str>("   ", &[]),
            Err(WorkshopFormError::Validation(ValidationError::EmptyWorkshopName))
        );
        assert!(matches!(
            workshop_form("Teatro", &["feriado"]),
            Err(WorkshopFormError::Day(_))
        ));
    }
}
