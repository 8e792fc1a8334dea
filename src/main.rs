mod commands;
mod render;
mod utils;

use std::path::PathBuf;

use agenda_core::AgendaError;
use anyhow::Result;
use clap::{Parser, Subcommand};
use owo_colors::OwoColorize;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "agenda")]
#[command(about = "Browse the events calendar, manage events and submit justificantes")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in to the events API
    Login {
        #[arg(short, long)]
        email: Option<String>,
    },
    /// Forget the stored session
    Logout,
    /// Show who is logged in and with which roles
    Whoami,
    /// Show the calendar: events, plus your justificantes if you are an employee
    Calendar {
        /// Show items from this date (YYYY-MM-DD, default today)
        #[arg(long)]
        from: Option<String>,

        /// Show items until this date (YYYY-MM-DD, default 30 days ahead)
        #[arg(long)]
        to: Option<String>,
    },
    /// Show the details of one calendar item
    Show {
        /// Item id, e.g. "12" or "justificante_7"
        id: String,
    },
    /// Manage events (requires login)
    #[command(subcommand)]
    Events(EventsCommand),
    /// Submit a justificante for an absence (employees only)
    Justificar {
        /// Day to justify (YYYY-MM-DD)
        #[arg(short, long)]
        dia: Option<String>,

        /// Supporting document to upload
        #[arg(long)]
        documento: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
enum EventsCommand {
    /// List all events, newest first
    List,
    /// Create an event
    Create {
        title: String,

        /// Start date/time (e.g. "2025-03-20T15:00")
        #[arg(short, long)]
        start: String,

        /// End date/time
        #[arg(short, long)]
        end: String,

        #[arg(short, long)]
        description: Option<String>,
    },
    /// Edit an event; omitted fields keep their value
    Update {
        id: String,

        #[arg(long)]
        title: Option<String>,

        #[arg(short, long)]
        start: Option<String>,

        #[arg(short, long)]
        end: Option<String>,

        #[arg(short, long)]
        description: Option<String>,
    },
    /// Delete an event
    Delete {
        id: String,

        /// Don't ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Login { email } => commands::login::run(email).await,
        Commands::Logout => commands::logout::run(),
        Commands::Whoami => commands::whoami::run(),
        Commands::Calendar { from, to } => {
            commands::calendar::run(from.as_deref(), to.as_deref()).await
        }
        Commands::Show { id } => commands::show::run(&id).await,
        Commands::Events(cmd) => match cmd {
            EventsCommand::List => commands::events::list().await,
            EventsCommand::Create {
                title,
                start,
                end,
                description,
            } => commands::events::create(title, &start, &end, description).await,
            EventsCommand::Update {
                id,
                title,
                start,
                end,
                description,
            } => {
                commands::events::update(
                    &id,
                    title,
                    start.as_deref(),
                    end.as_deref(),
                    description,
                )
                .await
            }
            EventsCommand::Delete { id, yes } => commands::events::delete(&id, yes).await,
        },
        Commands::Justificar { dia, documento } => {
            commands::justificar::run(dia.as_deref(), documento.as_deref()).await
        }
    };

    if let Err(e) = &result
        && e.downcast_ref::<AgendaError>()
            .is_some_and(AgendaError::is_unauthorized)
    {
        eprintln!("{}", e.to_string().red());
        eprintln!("Log in again with:\n  agenda login");
        std::process::exit(1);
    }

    result
}
