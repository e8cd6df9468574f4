use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Parser};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use scrub3mf::options::parse_date;
use scrub3mf::{DateRedaction, RuleCatalog, ScrubError, ScrubOptions, scrub_archive};

mod ui;

/// Limpia metadata sensible de un proyecto 3MF antes de compartirlo.
#[derive(Debug, Parser)]
#[command(name = "scrub3mf", version, about)]
struct Cli {
    /// Proyecto 3MF de origen.
    input: PathBuf,

    /// Ruta del proyecto limpio. Puede coincidir con la de origen.
    output: PathBuf,

    /// Conserva Designer, DesignerUserId y DesignerCover.
    #[arg(long)]
    keep_designer: bool,

    /// Conserva la ruta original del modelo en model_settings.config.
    #[arg(long)]
    keep_model_path: bool,

    /// Sustituye la ruta del modelo solo por su nombre de archivo.
    #[arg(long)]
    keep_model_filename: bool,

    #[arg(long)]
    keep_creation_date: bool,

    #[arg(long)]
    keep_modification_date: bool,

    /// Escribe esta fecha (AAAA-MM-DD) en lugar de vaciar CreationDate.
    #[arg(long, value_name = "AAAA-MM-DD")]
    creation_date: Option<String>,

    /// Escribe esta fecha (AAAA-MM-DD) en lugar de vaciar ModificationDate.
    #[arg(long, value_name = "AAAA-MM-DD")]
    modification_date: Option<String>,

    /// Elimina también la versión de la aplicación que generó el proyecto.
    #[arg(long)]
    strip_app_version: bool,

    /// Conserva los parámetros de empaquetado por defecto del ZIP.
    #[arg(long)]
    no_normalize: bool,

    /// Catálogo de reglas JSON que sustituye al incluido.
    #[arg(long, value_name = "RUTA")]
    catalog: Option<PathBuf>,

    /// Aumenta el detalle del registro (-v, -vv, -vvv).
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn scrub_options(&self) -> Result<ScrubOptions, ScrubError> {
        let creation = self.creation_date.as_deref().map(parse_date).transpose()?;
        let modification = self
            .modification_date
            .as_deref()
            .map(parse_date)
            .transpose()?;

        Ok(ScrubOptions {
            strip_designer: !self.keep_designer,
            strip_model_path: !self.keep_model_path,
            keep_model_filename: self.keep_model_filename,
            creation_date: DateRedaction::from_flags(self.keep_creation_date, creation),
            modification_date: DateRedaction::from_flags(self.keep_modification_date, modification),
            strip_application_version: self.strip_app_version,
            normalize_archive: !self.no_normalize,
        })
    }

    fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.log_level()));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    ui::render_header();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            tracing::error!(%error, "La limpieza falló");
            ui::render_error(&error.to_string());
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), ScrubError> {
    let options = cli.scrub_options()?;
    let catalog = match &cli.catalog {
        Some(path) => RuleCatalog::from_path(path)?,
        None => RuleCatalog::default(),
    };

    let report = scrub_archive(&cli.input, &cli.output, &options, &catalog)?;
    ui::render_report(&cli.output.display().to_string(), &report);
    Ok(())
}
