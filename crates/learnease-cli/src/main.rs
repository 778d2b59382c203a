use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod notifier;

#[derive(Parser)]
#[command(name = "learnease", version, about = "LearnEase study companion")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the message host (JSON lines on stdin/stdout)
    Serve {
        /// Keep all state in memory instead of the database
        #[arg(long)]
        memory: bool,
    },
    /// Word, sentence and reading-time statistics
    Text(commands::text::TextArgs),
    /// Journal entries and the word goal
    Journal {
        #[command(subcommand)]
        action: commands::journal::JournalAction,
    },
    /// Sticky notes
    Notes {
        #[command(subcommand)]
        action: commands::notes::NotesAction,
    },
    /// Focus blocker
    Blocker {
        #[command(subcommand)]
        action: commands::blocker::BlockerAction,
    },
    /// Saved reading sessions
    Reading {
        #[command(subcommand)]
        action: commands::reading::ReadingAction,
    },
    /// Weekly study statistics
    Stats {
        #[command(subcommand)]
        action: commands::stats::StatsAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn init_logging() {
    let filter = EnvFilter::try_from_env("LEARNEASE_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    init_logging();
    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Serve { memory } => commands::serve::run(memory),
        Commands::Text(args) => commands::text::run(args),
        Commands::Journal { action } => commands::journal::run(action),
        Commands::Notes { action } => commands::notes::run(action),
        Commands::Blocker { action } => commands::blocker::run(action),
        Commands::Reading { action } => commands::reading::run(action),
        Commands::Stats { action } => commands::stats::run(action),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
