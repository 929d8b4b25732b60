use clap::{ArgAction, Parser, Subcommand};
use color_eyre::eyre::eyre;
use commands::{catalog, clear, config, lists, play, subs, Context};
use media_watch_config::{Config, PathManager};
use media_watch_models::ListName;
use std::path::PathBuf;

mod commands;
mod logging;
mod output;

#[derive(Parser)]
#[command(name = "streamflix")]
#[command(about = "Streamflix - keep track of what you watch and pick up where you left off")]
#[command(version)]
struct Cli {
    /// Enable verbose output (use multiple times for more verbosity: -v, -vv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Output format
    #[arg(long, global = true, default_value = "human", value_enum)]
    output: output::OutputFormat,

    /// Use this config file instead of the default location
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show stored lists
    #[command(long_about = "Show the watchlist, the in-progress list and the completed list. Pass a list name (watchlist, watching, completed) to show just one.")]
    List {
        /// Which list to show (defaults to all three)
        list: Option<ListName>,
    },
    /// Show titles that are still in progress, most recent first
    Continue,
    /// Manage the watchlist
    Watchlist {
        #[command(subcommand)]
        cmd: WatchlistCommands,
    },
    /// Manage titles in progress
    Watching {
        #[command(subcommand)]
        cmd: WatchingCommands,
    },
    /// Record a playback position
    #[command(long_about = "Record a playback position in seconds. Movie positions are written to every list holding the title; episode positions also flag the episode as completed once the position reaches its running time.")]
    Progress {
        /// Title id
        id: String,

        /// Position in seconds
        seconds: f64,

        /// Episode id, for shows and anime
        #[arg(long)]
        episode: Option<String>,
    },
    /// Search the configured catalog
    Search {
        query: String,
    },
    /// Resolve a stream and run a playback session against the stored lists
    #[command(long_about = "Resolve the stream for a title (and episode), resume from the stored position, optionally advance to a given position or to the next episode, then close the session and record progress.")]
    Play {
        /// Title id
        id: String,

        /// Episode id (defaults to the first unfinished episode)
        #[arg(long)]
        episode: Option<String>,

        /// Play up to this position in seconds before closing
        #[arg(long, value_name = "SECONDS")]
        to: Option<f64>,

        /// Move on to the next episode before closing
        #[arg(long, action = ArgAction::SetTrue)]
        next: bool,

        /// Skip loading subtitles
        #[arg(long, action = ArgAction::SetTrue)]
        no_subs: bool,
    },
    /// Parse a caption file or URL and print its cues
    Subs {
        /// Local path or http(s) URL
        source: String,

        /// Only print the caption shown at this time (seconds)
        #[arg(long, value_name = "SECONDS")]
        at: Option<f64>,
    },
    /// Show or create configuration
    Config {
        #[command(subcommand)]
        cmd: Option<ConfigCommands>,
    },
    /// Remove stored lists or logs
    #[command(long_about = "Remove the stored lists file (and its backup) or the log directory. Use --all to remove both.")]
    Clear {
        /// Clear lists and logs
        #[arg(long, action = ArgAction::SetTrue)]
        all: bool,

        /// Clear the stored lists
        #[arg(long, action = ArgAction::SetTrue)]
        lists: bool,

        /// Clear log files
        #[arg(long, action = ArgAction::SetTrue)]
        logs: bool,
    },
}

#[derive(Subcommand)]
enum WatchlistCommands {
    /// Save a title from the catalog to the watchlist
    Add { id: String },
    /// Remove a title from the watchlist
    Remove { id: String },
}

#[derive(Subcommand)]
enum WatchingCommands {
    /// Start watching a title from the catalog
    Start { id: String },
    /// Drop a title from the in-progress list
    Remove { id: String },
    /// Mark a title as watched and move it to the completed list
    Complete { id: String },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Write a default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long, action = ArgAction::SetTrue)]
        force: bool,
    },
    /// Check the configuration and configured providers
    Validate,
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();

    let paths = PathManager::new().map_err(|e| eyre!("{}", e))?;
    let config_path = cli.config.clone().unwrap_or_else(|| paths.config_file());
    let config = Config::load_or_default(&config_path)
        .map_err(|e| eyre!("Failed to load config from {}: {}", config_path.display(), e))?;

    logging::init_logging(cli.verbose, cli.quiet, &config.logging).map_err(|e| eyre!("{}", e))?;

    let output = output::Output::new(cli.output, cli.quiet);
    let ctx = Context {
        paths,
        config,
        config_path,
    };

    match cli.command {
        Commands::List { list } => lists::run_list(&ctx, list, &output),
        Commands::Continue => lists::run_continue(&ctx, &output),
        Commands::Watchlist { cmd } => match cmd {
            WatchlistCommands::Add { id } => catalog::run_watchlist_add(&ctx, &id, &output).await,
            WatchlistCommands::Remove { id } => lists::run_watchlist_remove(&ctx, &id, &output),
        },
        Commands::Watching { cmd } => match cmd {
            WatchingCommands::Start { id } => catalog::run_start(&ctx, &id, &output).await,
            WatchingCommands::Remove { id } => lists::run_watching_remove(&ctx, &id, &output),
            WatchingCommands::Complete { id } => lists::run_complete(&ctx, &id, &output),
        },
        Commands::Progress { id, seconds, episode } => {
            lists::run_progress(&ctx, &id, seconds, episode.as_deref(), &output)
        }
        Commands::Search { query } => catalog::run_search(&ctx, &query, &output).await,
        Commands::Play {
            id,
            episode,
            to,
            next,
            no_subs,
        } => {
            let options = play::PlayOptions {
                episode,
                to,
                next,
                subtitles: !no_subs,
            };
            play::run_play(&ctx, &id, options, &output).await
        }
        Commands::Subs { source, at } => subs::run_subs(&ctx, &source, at, &output).await,
        Commands::Config { cmd } => config::run_config(&ctx, cmd.unwrap_or(ConfigCommands::Show), &output).await,
        Commands::Clear { all, lists, logs } => clear::run_clear(&ctx, all || lists, all || logs, &output),
    }
}
