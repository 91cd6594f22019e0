mod checklist;
mod export;
mod history;
mod import;
mod students;
mod workshops;

use asistencia::api::ApiClient;
use asistencia::calendar::YearMonth;
use asistencia::config::Config;
use anyhow::Result;
use camino::Utf8PathBuf;
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "asistencia",
    version,
    about = "Attendance tracking for recurring workshops"
)]
pub struct Cli {
    /// Configuration file (defaults to $CONFIG or config.yaml)
    #[arg(short, long, global = true)]
    pub config: Option<Utf8PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Manage workshops
    #[command(subcommand)]
    Talleres(TalleresCommand),
    /// Manage students
    #[command(subcommand)]
    Alumnos(AlumnosCommand),
    /// Daily attendance checklist
    #[command(subcommand)]
    Asistencia(AsistenciaCommand),
    /// Monthly attendance matrix of a workshop
    Historial(HistorialArgs),
    /// Import students from a CSV file
    Importar(ImportarArgs),
    /// Export a month of attendance to a spreadsheet
    Exportar(ExportarArgs),
}

#[derive(Subcommand)]
pub enum TalleresCommand {
    /// List workshops
    Listar {
        #[arg(short, long, default_value = "")]
        buscar: String,
    },
    /// Create a workshop
    Crear {
        #[arg(long)]
        nombre: String,
        /// Weekdays the workshop meets on, e.g. lunes,miercoles
        #[arg(long, value_delimiter = ',')]
        dias: Vec<String>,
    },
    /// Rename a workshop or change its days
    Editar {
        id: i64,
        #[arg(long)]
        nombre: String,
        #[arg(long, value_delimiter = ',')]
        dias: Vec<String>,
    },
    /// Delete a workshop
    Eliminar { id: i64 },
}

#[derive(Subcommand)]
pub enum AlumnosCommand {
    /// List students grouped by workshop
    Listar {
        #[arg(short, long, default_value = "")]
        buscar: String,
    },
    /// Register a student in a workshop
    Crear {
        #[arg(long)]
        nombre_completo: String,
        #[arg(long, default_value = "")]
        direccion: String,
        #[arg(long, default_value = "")]
        telefono: String,
        #[arg(long)]
        taller: Option<i64>,
    },
    /// Update a student's name and contact details
    Editar {
        id: i64,
        #[arg(long)]
        nombre_completo: String,
        #[arg(long, default_value = "")]
        direccion: String,
        #[arg(long, default_value = "")]
        telefono: String,
    },
    /// Delete a student
    Eliminar { id: i64 },
    /// Enroll a student in a workshop
    Inscribir { id: i64, taller: i64 },
    /// Remove a student from a workshop
    Desinscribir { id: i64, taller: i64 },
}

#[derive(Args)]
pub struct Selection {
    #[arg(long)]
    pub taller: Option<i64>,
    /// Date, YYYY-MM-DD
    #[arg(long)]
    pub fecha: Option<NaiveDate>,
}

#[derive(Subcommand)]
pub enum AsistenciaCommand {
    /// Show the checklist of a workshop on a date
    Ver(Selection),
    /// Change and save the checklist of a workshop on a date
    Guardar {
        #[command(flatten)]
        selection: Selection,
        /// Students to mark present
        #[arg(long, value_delimiter = ',')]
        presente: Vec<i64>,
        /// Students to mark absent
        #[arg(long, value_delimiter = ',')]
        ausente: Vec<i64>,
        /// Students whose mark is flipped
        #[arg(long, value_delimiter = ',')]
        alternar: Vec<i64>,
    },
}

#[derive(Args)]
pub struct HistorialArgs {
    #[arg(long)]
    pub taller: Option<i64>,
    /// Month, YYYY-MM (defaults to the current month)
    #[arg(long)]
    pub mes: Option<YearMonth>,
    /// Write an HTML page here instead of printing a table
    #[arg(long)]
    pub html: Option<Utf8PathBuf>,
}

#[derive(Args)]
pub struct ImportarArgs {
    pub archivo: Utf8PathBuf,
    /// Only show the parsed rows
    #[arg(long)]
    pub vista_previa: bool,
}

#[derive(Args)]
pub struct ExportarArgs {
    #[arg(long)]
    pub taller: Option<i64>,
    #[arg(long)]
    pub mes: Option<YearMonth>,
    /// Output directory (defaults to export.dir)
    #[arg(long)]
    pub salida: Option<Utf8PathBuf>,
}

pub struct Context {
    pub config: Config,
    pub api: ApiClient,
}

pub async fn run(ctx: &Context, command: Command) -> Result<()> {
    match command {
        Command::Talleres(command) => workshops::run(ctx, command).await,
        Command::Alumnos(command) => students::run(ctx, command).await,
        Command::Asistencia(command) => checklist::run(ctx, command).await,
        Command::Historial(args) => history::run(ctx, args).await,
        Command::Importar(args) => import::run(ctx, args).await,
        Command::Exportar(args) => export::run(ctx, args).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_history_arguments() {
        let cli = Cli::try_parse_from([
            "asistencia",
            "historial",
            "--taller",
            "3",
            "--mes",
            "2025-02",
        ])
        .unwrap();

        match cli.command {
            Command::Historial(args) => {
                assert_eq!(args.taller, Some(3));
                assert_eq!(args.mes, Some("2025-02".parse().unwrap()));
            }
            _ => panic!("expected historial"),
        }
    }

    #[test]
    fn parses_comma_separated_lists() {
        let cli = Cli::try_parse_from([
            "asistencia",
            "asistencia",
            "guardar",
            "--taller",
            "1",
            "--fecha",
            "2025-02-03",
            "--presente",
            "4,5",
        ])
        .unwrap();

        match cli.command {
            Command::Asistencia(AsistenciaCommand::Guardar {
                selection,
                presente,
                ..
            }) => {
                assert_eq!(selection.fecha, NaiveDate::from_ymd_opt(2025, 2, 3));
                assert_eq!(presente, vec![4, 5]);
            }
            _ => panic!("expected asistencia guardar"),
        }
    }

    #[test]
    fn rejects_bad_month() {
        assert!(Cli::try_parse_from(["asistencia", "historial", "--mes", "2025-13"]).is_err());
    }
}
