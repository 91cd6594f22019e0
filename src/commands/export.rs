use super::{Context, ExportarArgs};
use anyhow::{anyhow, Context as _, Result};
use asistencia::calendar::YearMonth;
use asistencia::error::ValidationError;
use asistencia::export::{export_table, file_name, write_xlsx};
use asistencia::matrix::{fetch_days, meeting_dates, pivot};
use asistencia::model::WorkshopId;

pub async fn run(ctx: &Context, args: ExportarArgs) -> Result<()> {
    let workshop_id = args
        .taller
        .map(WorkshopId)
        .ok_or(ValidationError::MissingWorkshop)?;
    let month = args.mes.unwrap_or_else(YearMonth::current);

    let (workshops, students) = futures::try_join!(ctx.api.workshops(), ctx.api.students())
        .context("Error al exportar")?;
    let workshop = workshops
        .iter()
        .find(|w| w.id == workshop_id)
        .ok_or_else(|| anyhow!("Taller {} no encontrado", workshop_id))?;

    let dates = meeting_dates(workshop, month);
    let days = fetch_days(&ctx.api, workshop_id, &dates)
        .await
        .context("Error al exportar")?;
    let table = export_table(&pivot(dates, &days), &students);

    let dir = args.salida.as_ref().unwrap_or(&ctx.config.export.dir);
    let path = dir.join(file_name(workshop_id, month));
    write_xlsx(&table, &path).context("Error al exportar")?;
    println!("{}", path);

    Ok(())
}
