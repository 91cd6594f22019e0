use crate::model::ImportedStudent;
use itertools::Itertools;
use std::io::Read;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("missing required column {0:?}")]
    MissingColumn(&'static str),
}

/// Parses students from a CSV with a header row. Blank lines are skipped.
pub fn parse_students<R: Read>(reader: R) -> Result<Vec<ImportedStudent>, ImportError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader.headers()?.clone();
    if !headers.iter().any(|h| h == "nombre") {
        return Err(ImportError::MissingColumn("nombre"));
    }

    let mut students = Vec::new();
    for record in reader.records() {
        let record = record?;
        if record.iter().all(str::is_empty) {
            continue;
        }
        students.push(record.deserialize(Some(&headers))?);
    }

    Ok(students)
}

const PREVIEW_HEADERS: [&str; 5] = ["nombre", "apellidos", "direccion", "telefono", "tallerId"];

fn preview_cells(student: &ImportedStudent) -> [String; 5] {
    [
        student.first_name.clone(),
        student.last_name.clone(),
        student.address.clone(),
        student.phone.clone(),
        student
            .workshop_id
            .map(|id| id.to_string())
            .unwrap_or_default(),
    ]
}

/// Renders parsed rows as an aligned text table.
///
/// Always shows the five uploaded columns in a fixed order; other CSV columns are dropped by
/// [`parse_students`] and never reach the preview.
pub fn preview_table(students: &[ImportedStudent]) -> String {
    let rows: Vec<[String; 5]> = students.iter().map(preview_cells).collect();

    let widths: Vec<usize> = (0..PREVIEW_HEADERS.len())
        .map(|i| {
            rows.iter()
                .map(|row| row[i].chars().count())
                .chain(std::iter::once(PREVIEW_HEADERS[i].len()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let line = |cells: Vec<&str>| {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, &width)| format!("{:<width$}", cell, width = width))
            .join(" | ")
            .trim_end()
            .to_string()
    };

    std::iter::once(line(PREVIEW_HEADERS.to_vec()))
        .chain(std::iter::once(
            widths.iter().map(|&w| "-".repeat(w)).join("-+-"),
        ))
        .chain(
            rows.iter()
                .map(|row| line(row.iter().map(String::as_str).collect())),
        )
        .join("\n")
}

/// Whether the parsed rows should be sent to the server.
pub fn should_upload(students: &[ImportedStudent], preview_only: bool) -> bool {
    !preview_only && !students.is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::WorkshopId;

    #[test]
    fn parses_rows_and_skips_blank_lines() {
        let csv = "nombre,apellidos,direccion,telefono,tallerId\n\
                   Ana,Pérez,Calle 1,555,2\n\
                   \n\
                   Luis,Gómez Ruiz,,,\n";
        let students = parse_students(csv.as_bytes()).unwrap();

        assert_eq!(students.len(), 2);
        assert_eq!(students[0].first_name, "Ana");
        assert_eq!(students[0].workshop_id, Some(WorkshopId(2)));
        assert_eq!(students[1].last_name, "Gómez Ruiz");
        assert_eq!(students[1].address, "");
        assert_eq!(students[1].workshop_id, None);
    }

    #[test]
    fn optional_columns_may_be_missing() {
        let csv = "nombre,apellidos\nEva,Soto\n";
        let students = parse_students(csv.as_bytes()).unwrap();
        assert_eq!(
            students,
            vec![ImportedStudent {
                first_name: "Eva".into(),
                last_name: "Soto".into(),
                ..Default::default()
            }]
        );
    }

    #[test]
    fn skips_rows_of_empty_fields() {
        let csv = "nombre,apellidos\n , \nEva,Soto\n";
        assert_eq!(parse_students(csv.as_bytes()).unwrap().len(), 1);
    }

    #[test]
    fn requires_name_column() {
        let csv = "apellidos,telefono\nSoto,555\n";
        assert!(matches!(
            parse_students(csv.as_bytes()),
            Err(ImportError::MissingColumn("nombre"))
        ));
    }

    #[test]
    fn bad_workshop_id_is_an_error() {
        let csv = "nombre,tallerId\nEva,taller\n";
        assert!(matches!(parse_students(csv.as_bytes()), Err(ImportError::Csv(_))));
    }

    #[test]
    fn upload_needs_rows_and_no_preview_flag() {
        let students = parse_students("nombre\nEva\n".as_bytes()).unwrap();
        assert!(should_upload(&students, false));
        assert!(!should_upload(&students, true));
        assert!(!should_upload(&[], false));
        assert!(!should_upload(&[], true));
    }

    #[test]
    fn extra_columns_are_dropped_from_the_preview() {
        let csv = "nombre,email,tallerId\nEva,eva@example.com,3\n";
        let students = parse_students(csv.as_bytes()).unwrap();
        let table = preview_table(&students);

        assert!(!table.contains("email"));
        assert!(!table.contains("eva@example.com"));
        assert!(table.lines().next().unwrap().ends_with("| tallerId"));
    }

    #[test]
    fn preview_aligns_columns() {
        let students = vec![ImportedStudent {
            first_name: "Ana".into(),
            last_name: "Pérez".into(),
            address: "Calle 1".into(),
            phone: "555".into(),
            workshop_id: Some(WorkshopId(2)),
        }];
        let table = preview_table(&students);
        let lines: Vec<_> = table.lines().collect();

        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("nombre | apellidos | direccion"));
        assert!(lines[2].starts_with("Ana    | Pérez     | Calle 1"));
        assert!(lines[2].ends_with("| 2"));
    }
}
