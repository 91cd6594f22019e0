//! Monthly attendance as a spreadsheet.

use crate::calendar::{day_label, YearMonth};
use crate::matrix::MonthlyMatrix;
use crate::model::{Student, StudentId, WorkshopId};
use camino::Utf8Path;
use rust_xlsxwriter::{Format, Workbook, XlsxError};
use std::collections::HashMap;
use thiserror::Error;
use tracing::{info, instrument};

pub const SHEET_NAME: &str = "Asistencia";
const FIXED_HEADERS: [&str; 3] = ["Nombre Completo", "Dirección", "Teléfono"];

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to write spreadsheet: {0}")]
    Xlsx(#[from] XlsxError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mark {
    Present,
    Absent,
}

impl Mark {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mark::Present => "P",
            Mark::Absent => "A",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportRow {
    pub full_name: String,
    pub address: String,
    pub phone: String,
    pub marks: Vec<Mark>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportTable {
    pub headers: Vec<String>,
    pub rows: Vec<ExportRow>,
}

/// Shapes the matrix into spreadsheet rows, taking contact details from `directory`.
pub fn export_table(matrix: &MonthlyMatrix, directory: &[Student]) -> ExportTable {
    let contacts: HashMap<StudentId, &Student> = directory.iter().map(|s| (s.id, s)).collect();

    let headers = FIXED_HEADERS
        .iter()
        .map(|h| h.to_string())
        .chain(matrix.dates.iter().map(|&date| day_label(date)))
        .collect();

    let rows = matrix
        .rows
        .iter()
        .map(|row| {
            let contact = contacts.get(&row.student_id);
            ExportRow {
                full_name: row.full_name(),
                address: contact.map(|s| s.address.clone()).unwrap_or_default(),
                phone: contact.map(|s| s.phone.clone()).unwrap_or_default(),
                marks: matrix
                    .dates
                    .iter()
                    .map(|&date| {
                        if row.is_present(date) {
                            Mark::Present
                        } else {
                            Mark::Absent
                        }
                    })
                    .collect(),
            }
        })
        .collect();

    ExportTable { headers, rows }
}

pub fn file_name(workshop: WorkshopId, month: YearMonth) -> String {
    format!("asistencia_{}_{}.xlsx", workshop, month)
}

#[instrument(skip(table), fields(rows = table.rows.len()))]
pub fn write_xlsx(table: &ExportTable, path: &Utf8Path) -> Result<(), ExportError> {
    let mut workbook = Workbook::new();
    let bold = Format::new().set_bold();

    let worksheet = workbook.add_worksheet();
    worksheet.set_name(SHEET_NAME)?;

    for (col, header) in table.headers.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, header, &bold)?;
    }

    for (i, row) in table.rows.iter().enumerate() {
        let r = i as u32 + 1;
        worksheet.write_string(r, 0, &row.full_name)?;
        worksheet.write_string(r, 1, &row.address)?;
        worksheet.write_string(r, 2, &row.phone)?;
        for (j, mark) in row.marks.iter().enumerate() {
            worksheet.write_string(r, (FIXED_HEADERS.len() + j) as u16, mark.as_str())?;
        }
    }

    workbook.save(path)?;
    info!("Wrote {}", path);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::pivot;
    use crate::model::AttendanceRecord;
    use chrono::NaiveDate;

    fn ymd(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 2, d).unwrap()
    }

    fn record(id: i64, first: &str, last: &str, present: bool) -> AttendanceRecord {
        AttendanceRecord {
            student_id: StudentId(id),
            first_name: first.into(),
            last_name: last.into(),
            present,
        }
    }

    fn matrix() -> MonthlyMatrix {
        let days = vec![
            (ymd(3), vec![record(1, "Ana", "Pérez", true), record(2, "Luis", "Gómez", false)]),
            (ymd(5), vec![record(1, "Ana", "Pérez", false)]),
        ];
        pivot(vec![ymd(3), ymd(5)], &days)
    }

    #[test]
    fn headers_use_two_digit_days() {
        let table = export_table(&matrix(), &[]);
        assert_eq!(
            table.headers,
            vec!["Nombre Completo", "Dirección", "Teléfono", "03", "05"]
        );
    }

    #[test]
    fn marks_follow_matrix_and_contacts_come_from_directory() {
        let directory = vec![Student {
            id: StudentId(1),
            first_name: "Ana".into(),
            last_name: "Pérez".into(),
            address: "Calle 1".into(),
            phone: "555".into(),
            workshops: vec![],
        }];
        let table = export_table(&matrix(), &directory);

        assert_eq!(table.rows[0].full_name, "Ana Pérez");
        assert_eq!(table.rows[0].address, "Calle 1");
        assert_eq!(table.rows[0].marks, vec![Mark::Present, Mark::Absent]);

        assert_eq!(table.rows[1].full_name, "Luis Gómez");
        assert_eq!(table.rows[1].phone, "");
        assert_eq!(table.rows[1].marks, vec![Mark::Absent, Mark::Absent]);
    }

    #[test]
    fn file_name_includes_workshop_and_month() {
        assert_eq!(
            file_name(WorkshopId(4), "2025-02".parse().unwrap()),
            "asistencia_4_2025-02.xlsx"
        );
    }

    #[test]
    fn writes_workbook() {
        let dir = tempfile::tempdir().unwrap();
        let path = Utf8Path::from_path(dir.path()).unwrap().join("out.xlsx");

        write_xlsx(&export_table(&matrix(), &[]), &path).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.starts_with(b"PK"));
    }
}
