use std::path::PathBuf;

use clap::{Parser, Subcommand};
use eyre::Result;
use intake_cli::commands::{self, App, RecordKind};
use intake_cli::config::{self, LogFormat};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

#[derive(Parser, Debug)]
#[command(name = "intake-cli")]
#[command(version, about = "Child mental-health intake assessment in the terminal")]
struct Cli {
    /// Config file. Defaults to the platform config directory.
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Conversational assessment. Starts a new session when no id is given.
    Chat { id: Option<Uuid> },
    /// Three-page form assessment.
    Form { id: Option<Uuid> },
    /// Store an onboarding record read from a JSON file.
    Record {
        id: Uuid,
        #[arg(value_enum)]
        kind: RecordKind,
        file: PathBuf,
    },
    /// Print the stored summary.
    Summary { id: Uuid },
    /// Clear the session and its summary.
    Reset { id: Uuid },
    /// Local progress and pending sync items.
    Status { id: Uuid },
}

fn init_tracing(format: LogFormat) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    match format {
        LogFormat::Pretty => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    let path = match cli.config {
        Some(path) => path,
        None => config::config_path()?,
    };
    let config = config::load_or_init(&path)?;
    init_tracing(config.log_format);
    tracing::debug!(path = %path.display(), storage = %config.storage_dir.display(), "config loaded");

    let app = App::new(config);
    let input = tokio::io::BufReader::new(tokio::io::stdin());

    match cli.command {
        Command::Chat { id } => {
            commands::assess(&app, id.unwrap_or_else(Uuid::new_v4), false, input).await?
        }
        Command::Form { id } => {
            commands::assess(&app, id.unwrap_or_else(Uuid::new_v4), true, input).await?
        }
        Command::Record { id, kind, file } => {
            let json = std::fs::read_to_string(&file)
                .map_err(|e| eyre::eyre!("failed to read {}: {e}", file.display()))?;
            commands::record(&app, id, kind, &json)?
        }
        Command::Summary { id } => commands::summary(&app, id)?,
        Command::Reset { id } => commands::reset(&app, id)?,
        Command::Status { id } => commands::status(&app, id)?,
    }

    Ok(())
}
