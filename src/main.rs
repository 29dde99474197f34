mod cli;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "chat-digest", version, about = "Chat Digest — daily topic summaries for group chats")]
struct App {
    /// Config file (defaults to the data directory's config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Record messages read as JSON lines from stdin
    Ingest,
    /// Build the digest for one chat and day
    Summary {
        /// Chat id
        #[arg(long)]
        chat: i64,
        /// Day as YYYY-MM-DD (defaults to today)
        #[arg(long)]
        date: Option<String>,
        /// JSON file with rating changes to include
        #[arg(long)]
        ratings: Option<PathBuf>,
        /// Deliver to the chat instead of printing
        #[arg(long)]
        send: bool,
    },
    /// List chats with activity on a day
    Chats {
        /// Day as YYYY-MM-DD (defaults to today)
        #[arg(long)]
        date: Option<String>,
    },
    /// Run the daily scheduler in the foreground
    Daemon,
    /// View configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Display the effective configuration (secrets masked)
    Show,
    /// Print the config file path
    Path,
}

fn main() {
    let app = App::parse();
    let config = app.config.as_deref();

    // The scheduler logs to its own file; everything else to stderr.
    if !matches!(app.command, Commands::Daemon) {
        chat_digest::tracing_init::init_stderr_tracing();
    }

    let result = match app.command {
        Commands::Ingest => cli::ingest::run(config),
        Commands::Summary { chat, date, ratings, send } => {
            cli::summary::run(config, chat, date.as_deref(), ratings.as_deref(), send)
        }
        Commands::Chats { date } => cli::chats::run(config, date.as_deref()),
        Commands::Daemon => cli::daemon::run(config),
        Commands::Config { action } => match action {
            ConfigAction::Show => cli::config::run_show(config),
            ConfigAction::Path => cli::config::run_path(config),
        },
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
