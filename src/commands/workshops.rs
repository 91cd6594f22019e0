use super::{Context, TalleresCommand};
use anyhow::{Context as _, Result};
use asistencia::model::WorkshopId;
use asistencia::roster::{search_workshops, workshop_form};
use tracing::info;

pub async fn run(ctx: &Context, command: TalleresCommand) -> Result<()> {
    match command {
        TalleresCommand::Listar { buscar } => {
            let workshops = ctx
                .api
                .workshops()
                .await
                .context("Error al cargar talleres")?;

            for workshop in search_workshops(&workshops, &buscar) {
                println!(
                    "{:>4}  {}  [{}]",
                    workshop.id,
                    workshop.name,
                    workshop.days.join(", ")
                );
            }
        }
        TalleresCommand::Crear { nombre, dias } => {
            let form = workshop_form(&nombre, &dias)?;
            ctx.api
                .create_workshop(&form)
                .await
                .context("Error creando taller")?;
            info!("Created workshop {}", form.name);
        }
        TalleresCommand::Editar { id, nombre, dias } => {
            let form = workshop_form(&nombre, &dias)?;
            ctx.api
                .update_workshop(WorkshopId(id), &form)
                .await
                .context("Error actualizando taller")?;
            info!("Updated workshop {}", id);
        }
        TalleresCommand::Eliminar { id } => {
            ctx.api
                .delete_workshop(WorkshopId(id))
                .await
                .context("Error eliminando taller")?;
            info!("Deleted workshop {}", id);
        }
    }

    Ok(())
}
