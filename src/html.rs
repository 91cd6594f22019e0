//! HTML rendering of the history view.

use crate::calendar::day_label;
use crate::history::{HistoryStatus, HistoryView};
use crate::matrix::MonthlyMatrix;
use html_escape::encode_text;
use std::fmt::Write;

const STYLE: &str = "\
table { border-collapse: collapse; }
th, td { padding: 2px 8px; border-bottom: 1px solid #ccc; text-align: left; }
.sticky { position: sticky; left: 0; background: #fff; }
.error { color: #c00; }
.empty { color: #777; }";

/// The matrix as a `<table>`: names in a sticky first column, a total per row and per date.
pub fn render_matrix(matrix: &MonthlyMatrix) -> String {
    let mut out = String::new();

    out.push_str("<table class=\"matrix\">\n<thead>\n<tr><th class=\"sticky\">Alumno</th>");
    for &date in &matrix.dates {
        let _ = write!(out, "<th>{}</th>", day_label(date));
    }
    out.push_str("<th>Total</th></tr>\n</thead>\n<tbody>\n");

    for row in &matrix.rows {
        let _ = write!(
            out,
            "<tr><td class=\"sticky\">{}</td>",
            encode_text(&row.full_name())
        );
        for &date in &matrix.dates {
            out.push_str(if row.is_present(date) {
                "<td>✅</td>"
            } else {
                "<td></td>"
            });
        }
        let _ = writeln!(out, "<td>{}</td></tr>", row.total);
    }

    out.push_str("</tbody>\n<tfoot>\n<tr><td class=\"sticky\">Total</td>");
    for total in &matrix.column_totals {
        let _ = write!(out, "<td><strong>{}</strong></td>", total);
    }
    out.push_str("<td></td></tr>\n</tfoot>\n</table>\n");

    out
}

/// A standalone page showing whatever the view currently holds.
pub fn render_page(view: &HistoryView, workshop_name: &str) -> String {
    let body = match (view.status(), view.message()) {
        (HistoryStatus::Loading, _) => "<p class=\"loading\">Cargando…</p>\n".to_string(),
        (HistoryStatus::Failed(_), Some(message)) => {
            format!("<p class=\"error\">{}</p>\n", encode_text(message))
        }
        (HistoryStatus::Loaded(_), Some(message)) => {
            format!("<p class=\"empty\">{}</p>\n", encode_text(message))
        }
        (HistoryStatus::Loaded(matrix), None) => render_matrix(matrix),
        _ => String::new(),
    };

    format!(
        "<!DOCTYPE html>\n<html lang=\"es\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>Historial de Asistencia</title>\n<style>\n{}\n</style>\n</head>\n<body>\n\
         <h1>Historial de Asistencia: {} ({})</h1>\n{}</body>\n</html>\n",
        STYLE,
        encode_text(workshop_name),
        view.month(),
        body
    )
}
