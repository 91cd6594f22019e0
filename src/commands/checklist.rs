use super::{AsistenciaCommand, Context, Selection};
use anyhow::{anyhow, Context as _, Result};
use asistencia::checklist::{require_selection, save_error_message, Checklist, SAVED};
use asistencia::model::{StudentId, WorkshopId};
use tracing::warn;

async fn load(ctx: &Context, selection: &Selection) -> Result<Checklist> {
    let (workshop, date) = require_selection(selection.taller.map(WorkshopId), selection.fecha)?;
    Checklist::load(&ctx.api, workshop, date)
        .await
        .context("Error al cargar la lista")
}

fn print(checklist: &Checklist) {
    for entry in &checklist.entries {
        println!(
            "[{}] {:>4}  {}",
            if entry.present { "x" } else { " " },
            entry.student_id,
            entry.full_name()
        );
    }
    println!(
        "{} de {} presentes",
        checklist.present_count(),
        checklist.entries.len()
    );
}

pub async fn run(ctx: &Context, command: AsistenciaCommand) -> Result<()> {
    match command {
        AsistenciaCommand::Ver(selection) => {
            let checklist = load(ctx, &selection).await?;
            print(&checklist);
        }
        AsistenciaCommand::Guardar {
            selection,
            presente,
            ausente,
            alternar,
        } => {
            let mut checklist = load(ctx, &selection).await?;

            let changes = presente
                .iter()
                .map(|&id| (id, Some(true)))
                .chain(ausente.iter().map(|&id| (id, Some(false))))
                .chain(alternar.iter().map(|&id| (id, None)));
            for (id, present) in changes {
                let listed = match present {
                    Some(present) => checklist.set(StudentId(id), present),
                    None => checklist.toggle(StudentId(id)).is_some(),
                };
                if !listed {
                    warn!("Student {} is not on the list, ignoring", id);
                }
            }

            print(&checklist);
            ctx.api
                .save_attendance(&checklist.sheet())
                .await
                .map_err(|e| anyhow!(save_error_message(&e)))?;
            println!("{}", SAVED);
        }
    }

    Ok(())
}
