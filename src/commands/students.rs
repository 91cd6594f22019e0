use super::{AlumnosCommand, Context};
use anyhow::{Context as _, Result};
use asistencia::model::{StudentId, WorkshopId};
use asistencia::roster::{group_by_workshop, new_student, search_students, student_update};
use tracing::info;

pub async fn run(ctx: &Context, command: AlumnosCommand) -> Result<()> {
    match command {
        AlumnosCommand::Listar { buscar } => {
            let (students, workshops) = futures::try_join!(ctx.api.students(), ctx.api.workshops())
                .context("Error al cargar alumnos")?;

            let found = search_students(&students, &buscar);
            for (workshop, enrolled) in group_by_workshop(&workshops, &found) {
                println!("{}", workshop.name);
                for student in enrolled {
                    println!("  {:>4}  {}", student.id, student.full_name());
                }
            }
        }
        AlumnosCommand::Crear {
            nombre_completo,
            direccion,
            telefono,
            taller,
        } => {
            let student = new_student(
                &nombre_completo,
                &direccion,
                &telefono,
                taller.map(WorkshopId),
            )?;
            ctx.api
                .create_student(&student)
                .await
                .context("No se pudo crear el alumno")?;
            info!("Created student {} {}", student.first_name, student.last_name);
        }
        AlumnosCommand::Editar {
            id,
            nombre_completo,
            direccion,
            telefono,
        } => {
            let update = student_update(&nombre_completo, &direccion, &telefono)?;
            ctx.api
                .update_student(StudentId(id), &update)
                .await
                .context("No se pudo actualizar")?;
            info!("Updated student {}", id);
        }
        AlumnosCommand::Eliminar { id } => {
            ctx.api
                .delete_student(StudentId(id))
                .await
                .context("No se pudo eliminar")?;
            info!("Deleted student {}", id);
        }
        AlumnosCommand::Inscribir { id, taller } => {
            ctx.api
                .enroll(StudentId(id), WorkshopId(taller))
                .await
                .context("No se pudo inscribir al alumno")?;
            info!("Enrolled student {} in workshop {}", id, taller);
        }
        AlumnosCommand::Desinscribir { id, taller } => {
            ctx.api
                .unenroll(StudentId(id), WorkshopId(taller))
                .await
                .context("No se pudo quitar al alumno del taller")?;
            info!("Removed student {} from workshop {}", id, taller);
        }
    }

    Ok(())
}
