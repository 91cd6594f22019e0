use super::{Context, HistorialArgs};
use anyhow::{bail, Context as _, Result};
use asistencia::calendar::{day_label, YearMonth};
use asistencia::history::{HistoryStatus, HistoryView};
use asistencia::html::render_page;
use asistencia::matrix::MonthlyMatrix;
use asistencia::model::WorkshopId;
use itertools::Itertools;
use tracing::info;

/// The matrix as a fixed-width table for the terminal.
fn render_text(matrix: &MonthlyMatrix) -> String {
    let names: Vec<String> = matrix.rows.iter().map(|row| row.full_name()).collect();
    let width = names
        .iter()
        .map(|name| name.chars().count())
        .chain(std::iter::once("Alumno".len()))
        .max()
        .unwrap_or(0);

    let mut lines = Vec::with_capacity(matrix.rows.len() + 2);
    lines.push(format!(
        "{:<width$}  {}  Total",
        "Alumno",
        matrix.dates.iter().map(|&date| day_label(date)).join(" "),
        width = width
    ));

    for (row, name) in matrix.rows.iter().zip(&names) {
        let cells = matrix
            .dates
            .iter()
            .map(|&date| if row.is_present(date) { " x" } else { " ." })
            .join(" ");
        lines.push(format!("{:<width$}  {}  {:>5}", name, cells, row.total, width = width));
    }

    lines.push(format!(
        "{:<width$}  {}",
        "Total",
        matrix
            .column_totals
            .iter()
            .map(|total| format!("{:>2}", total))
            .join(" "),
        width = width
    ));

    lines.join("\n")
}

pub async fn run(ctx: &Context, args: HistorialArgs) -> Result<()> {
    let workshops = ctx
        .api
        .workshops()
        .await
        .context("Error al cargar talleres")?;

    let mut view = HistoryView::new(args.mes.unwrap_or_else(YearMonth::current));
    view.select_workshop(args.taller.map(WorkshopId));
    view.load(&ctx.api, &workshops)
        .await
        .context("Seleccione un taller")?;

    let name = workshops
        .iter()
        .find(|w| Some(w.id) == view.workshop())
        .map(|w| w.name.as_str())
        .unwrap_or_default();

    if let Some(path) = &args.html {
        std::fs::write(path, render_page(&view, name))
            .with_context(|| format!("Writing {}", path))?;
        info!("Wrote {}", path);
    } else {
        match (view.status(), view.message()) {
            (HistoryStatus::Loaded(matrix), None) => {
                println!("{} ({})", name, view.month());
                println!("{}", render_text(matrix));
            }
            (_, Some(message)) => println!("{}", message),
            _ => {}
        }
    }

    if let HistoryStatus::Failed(message) = view.status() {
        bail!("{}", message);
    }

    Ok(())
}
