/// Melos - offline music player
use clap::{Parser, Subcommand};
use melos_cli::{commands, player, MelosConfig, Workspace};
use melos_playback::ControlCommand;
use std::io::Write;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "melos")]
#[command(about = "Offline music player with a looping queue", long_about = None)]
struct Cli {
    /// Configuration file path (defaults to ./melos.toml when present)
    #[arg(short, long, global = true, env = "MELOS_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage imported tracks
    Library {
        #[command(subcommand)]
        action: LibraryAction,
    },
    /// Inspect and edit the playback queue
    Queue {
        #[command(subcommand)]
        action: QueueAction,
    },
    /// Show or change user settings
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },
    /// Start an interactive player on the current queue entry
    Play,
}

#[derive(Subcommand)]
enum LibraryAction {
    /// List tracks, newest first
    List {
        /// Print the manifest as JSON
        #[arg(long)]
        json: bool,
    },
    /// Import audio files
    Import {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
    /// Remove tracks by ID
    Remove {
        #[arg(required = true)]
        ids: Vec<String>,
    },
}

#[derive(Subcommand)]
enum QueueAction {
    /// Print the queue, marking the current entry
    Show,
    /// Queue tracks by ID
    Add {
        #[arg(required = true)]
        ids: Vec<String>,
        /// Insert right after the current entry instead of at the end
        #[arg(long)]
        next: bool,
    },
    /// Start the player at a queue position
    PlayFrom { index: usize },
    /// Remove entries by position
    Remove {
        #[arg(required = true)]
        indices: Vec<usize>,
    },
    /// Move entries to a new position
    Move {
        #[arg(required = true)]
        from: Vec<usize>,
        /// Destination position
        #[arg(long)]
        to: usize,
    },
    /// Make a position current without playing
    Jump { index: usize },
    /// Empty the queue
    Clear,
}

#[derive(Subcommand)]
enum SettingsAction {
    /// Print current settings
    Show,
    /// Set the skip forward/backward interval (5, 10, 15 or 30 seconds)
    SetSkip { secs: u32 },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "melos=info,melos_cli=info,melos_playback=info,melos_storage=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config = MelosConfig::load(cli.config.as_deref())?;
    config.validate()?;
    let ws = Workspace::open(&config);

    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    match cli.command {
        Commands::Library { action } => match action {
            LibraryAction::List { json } => commands::library_list(&ws, json, &mut out)?,
            LibraryAction::Import { paths } => commands::library_import(&ws, &paths, &mut out)?,
            LibraryAction::Remove { ids } => commands::library_remove(&ws, &ids, &mut out)?,
        },
        Commands::Queue { action } => match action {
            QueueAction::Show => commands::queue_show(&ws, &mut out)?,
            QueueAction::Add { ids, next } => commands::queue_add(&ws, &ids, next, &mut out)?,
            QueueAction::PlayFrom { index } => {
                commands::check_position(&ws, index)?;
                play(&ws, &config, ControlCommand::PlayFrom(index), &mut out).await?;
            }
            QueueAction::Remove { indices } => commands::queue_remove(&ws, &indices, &mut out)?,
            QueueAction::Move { from, to } => commands::queue_move(&ws, &from, to, &mut out)?,
            QueueAction::Jump { index } => commands::queue_jump(&ws, index, &mut out)?,
            QueueAction::Clear => commands::queue_clear(&ws, &mut out)?,
        },
        Commands::Settings { action } => match action {
            SettingsAction::Show => commands::settings_show(&ws, &mut out)?,
            SettingsAction::SetSkip { secs } => commands::settings_set_skip(&ws, secs, &mut out)?,
        },
        Commands::Play => play(&ws, &config, ControlCommand::Play, &mut out).await?,
    }

    out.flush()?;
    Ok(())
}

async fn play(
    ws: &Workspace,
    config: &MelosConfig,
    start: ControlCommand,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    writeln!(out, "Type 'help' for commands")?;
    let input = tokio::io::BufReader::new(tokio::io::stdin());
    player::run(ws, config, start, input, out).await?;
    Ok(())
}
