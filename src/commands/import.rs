use super::{Context, ImportarArgs};
use anyhow::{Context as _, Result};
use asistencia::import::{parse_students, preview_table, should_upload};
use tracing::info;

pub async fn run(ctx: &Context, args: ImportarArgs) -> Result<()> {
    let file = std::fs::File::open(&args.archivo)
        .with_context(|| format!("Opening {}", args.archivo))?;
    let students = parse_students(file).context("Error parseando CSV")?;

    println!("{}", preview_table(&students));

    if !should_upload(&students, args.vista_previa) {
        return Ok(());
    }

    ctx.api
        .import_students(&students)
        .await
        .context("Error al importar alumnos")?;
    info!("Imported {} students", students.len());
    println!("Alumnos importados correctamente");

    Ok(())
}
