use clap::{ArgAction, Parser, Subcommand};
use commands::{clear, config, rate, ratings, search, swipe};
use movie_swipe_models::CatalogType;

mod commands;
mod logging;
mod output;

#[derive(Parser)]
#[command(name = "reelswipe")]
#[command(about = "ReelSwipe - Swipe through movies, keep the ones you like")]
#[command(version)]
struct Cli {
    /// Enable verbose output (use multiple times for more verbosity: -v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Output format
    #[arg(long, global = true, default_value = "human", value_enum)]
    output: output::OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Swipe through a movie catalog
    #[command(long_about = "Show movies one card at a time and like, dislike or skip them. The queue refills from the catalog in the background, skipping anything already rated. Use --auto to swipe a number of cards without prompting.")]
    Swipe {
        /// Catalog to page through (popular, top-rated, upcoming, now-playing)
        #[arg(long, value_name = "CATALOG")]
        catalog: Option<CatalogType>,

        /// Swipe every card the same way without prompting
        #[arg(long, value_enum, value_name = "DECISION")]
        auto: Option<swipe::AutoDecision>,

        /// Number of cards to swipe with --auto
        #[arg(long, default_value_t = 10, requires = "auto")]
        count: usize,
    },
    /// Search movies by title
    Search {
        /// Title to search for
        query: String,
    },
    /// Show one movie with cast, crew and reviews
    Show {
        /// Movie ID
        id: u64,
    },
    /// Rate a movie directly
    #[command(long_about = "Store a like, dislike and/or star rating for a movie without swiping. Values that are not given keep what is already stored.")]
    Rate {
        /// Movie ID
        id: u64,

        /// Mark as liked
        #[arg(long, action = ArgAction::SetTrue, conflicts_with = "dislike")]
        like: bool,

        /// Mark as disliked
        #[arg(long, action = ArgAction::SetTrue)]
        dislike: bool,

        /// Stars from 0 to 5 in half steps (e.g. 3.5)
        #[arg(long)]
        stars: Option<f32>,
    },
    /// List stored ratings
    Ratings {
        /// Only liked movies
        #[arg(long, action = ArgAction::SetTrue, conflicts_with = "disliked")]
        liked: bool,

        /// Only disliked movies
        #[arg(long, action = ArgAction::SetTrue)]
        disliked: bool,
    },
    /// View or change configuration
    Config {
        #[command(subcommand)]
        cmd: ConfigCommands,
    },
    /// Clear stored data
    #[command(long_about = "Clear the saved catalog position, the rating history, or both. Clearing the cursor restarts the catalog at page 1.")]
    Clear {
        /// Clear cursor and ratings
        #[arg(long, action = ArgAction::SetTrue)]
        all: bool,

        /// Clear the catalog cursor
        #[arg(long, action = ArgAction::SetTrue)]
        cursor: bool,

        /// Clear rating history
        #[arg(long, action = ArgAction::SetTrue)]
        ratings: bool,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show current configuration (masks the API key)
    Show {
        /// Show the API key unmasked
        #[arg(long, action = ArgAction::SetTrue)]
        full: bool,
    },
    /// Write a default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long, action = ArgAction::SetTrue)]
        force: bool,
    },
    /// Store the TMDB API key
    SetApiKey {
        /// API key (if not provided, will prompt)
        key: Option<String>,
    },
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();

    // The interactive swipe menu owns the terminal, so its logs go to a file
    let log_file = match &cli.command {
        Commands::Swipe { auto: None, .. } => Some(movie_swipe_config::PathManager::default().log_file()),
        _ => None,
    };
    logging::init_logging_with_file(cli.verbose, cli.quiet, log_file).map_err(|e| color_eyre::eyre::eyre!("{}", e))?;

    let output = output::Output::new(cli.output, cli.quiet);

    match cli.command {
        Commands::Swipe { catalog, auto, count } => swipe::run_swipe(catalog, auto, count, &output).await,
        Commands::Search { query } => search::run_search(&query, &output).await,
        Commands::Show { id } => search::run_show(id, &output).await,
        Commands::Rate {
            id,
            like,
            dislike,
            stars,
        } => rate::run_rate(id, like, dislike, stars, &output).await,
        Commands::Ratings { liked, disliked } => ratings::run_ratings(liked, disliked, &output).await,
        Commands::Config { cmd } => config::run_config(cmd, &output).await,
        Commands::Clear { all, cursor, ratings } => clear::run_clear(all, cursor, ratings, &output).await,
    }
}
