use chrono::NaiveDate;
use serde::{de, Deserialize, Deserializer, Serialize};
use std::fmt::Display;

/// Treats an explicit `null` the same as a missing field.
fn null_as_default<'de, D, T>(de: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(de)?.unwrap_or_default())
}

/// Accepts `true`/`false`, `0`/`1` (any non-zero number is true) and `null` (false).
fn presence_flag<'de, D>(de: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    struct FlagVisitor;

    impl<'de> de::Visitor<'de> for FlagVisitor {
        type Value = bool;

        fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
            f.write_str("a boolean, a number or null")
        }

        fn visit_bool<E: de::Error>(self, v: bool) -> Result<bool, E> {
            Ok(v)
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<bool, E> {
            Ok(v != 0)
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<bool, E> {
            Ok(v != 0)
        }

        fn visit_unit<E: de::Error>(self) -> Result<bool, E> {
            Ok(false)
        }

        fn visit_none<E: de::Error>(self) -> Result<bool, E> {
            Ok(false)
        }
    }

    de.deserialize_any(FlagVisitor)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkshopId(pub i64);

impl Display for WorkshopId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StudentId(pub i64);

impl Display for StudentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A taller, as returned by `GET /talleres`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Workshop {
    pub id: WorkshopId,
    #[serde(rename = "nombre")]
    pub name: String,
    /// Weekday names as entered, e.g. `"Lunes"` or `"miercoles"`.
    #[serde(rename = "dias", default, deserialize_with = "null_as_default")]
    pub days: Vec<String>,
}

/// Body of `POST /talleres` and `PUT /talleres/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkshopForm {
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "dias")]
    pub days: Vec<String>,
}

/// An alumno, as returned by `GET /alumnos`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Student {
    pub id: StudentId,
    #[serde(rename = "nombre")]
    pub first_name: String,
    #[serde(rename = "apellidos", default, deserialize_with = "null_as_default")]
    pub last_name: String,
    #[serde(rename = "direccion", default, deserialize_with = "null_as_default")]
    pub address: String,
    #[serde(rename = "telefono", default, deserialize_with = "null_as_default")]
    pub phone: String,
    #[serde(rename = "talleres", default, deserialize_with = "null_as_default")]
    pub workshops: Vec<WorkshopId>,
}

impl Student {
    pub fn full_name(&self) -> String {
        full_name(&self.first_name, &self.last_name)
    }
}

pub fn full_name(first_name: &str, last_name: &str) -> String {
    if last_name.is_empty() {
        first_name.to_string()
    } else {
        format!("{} {}", first_name, last_name)
    }
}

/// Body of `POST /alumnos`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewStudent {
    #[serde(rename = "nombre")]
    pub first_name: String,
    #[serde(rename = "apellidos")]
    pub last_name: String,
    #[serde(rename = "direccion")]
    pub address: String,
    #[serde(rename = "telefono")]
    pub phone: String,
    #[serde(rename = "tallerId")]
    pub workshop_id: WorkshopId,
}

/// Body of `PUT /alumnos/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StudentUpdate {
    #[serde(rename = "nombre")]
    pub first_name: String,
    #[serde(rename = "apellidos")]
    pub last_name: String,
    #[serde(rename = "direccion")]
    pub address: String,
    #[serde(rename = "telefono")]
    pub phone: String,
}

/// One row of a CSV import, as sent to `POST /alumnos/bulk`.
///
/// Only the columns below are kept; `tallerId` must be a number.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportedStudent {
    #[serde(rename = "nombre")]
    pub first_name: String,
    #[serde(rename = "apellidos", default)]
    pub last_name: String,
    #[serde(rename = "direccion", default)]
    pub address: String,
    #[serde(rename = "telefono", default)]
    pub phone: String,
    #[serde(
        rename = "tallerId",
        alias = "taller_id",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub workshop_id: Option<WorkshopId>,
}

#[derive(Debug, Serialize)]
pub struct BulkImport<'a> {
    #[serde(rename = "alumnos")]
    pub students: &'a [ImportedStudent],
}

/// One student's presence at a workshop on a date, from `GET /asistencias`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AttendanceRecord {
    #[serde(rename = "alumno_id")]
    pub student_id: StudentId,
    #[serde(rename = "nombre", default, deserialize_with = "null_as_default")]
    pub first_name: String,
    #[serde(rename = "apellidos", default, deserialize_with = "null_as_default")]
    pub last_name: String,
    #[serde(rename = "presente", default, deserialize_with = "presence_flag")]
    pub present: bool,
}

impl AttendanceRecord {
    pub fn full_name(&self) -> String {
        full_name(&self.first_name, &self.last_name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AttendanceMark {
    #[serde(rename = "alumno_id")]
    pub student_id: StudentId,
    #[serde(rename = "presente")]
    pub present: bool,
}

/// Body of `POST /asistencias`: one day's checklist for a workshop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttendanceSheet {
    #[serde(rename = "taller_id")]
    pub workshop_id: WorkshopId,
    #[serde(rename = "fecha")]
    pub date: NaiveDate,
    #[serde(rename = "asistencias")]
    pub marks: Vec<AttendanceMark>,
}
