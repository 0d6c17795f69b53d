use anyhow::{Context, Result};
use catalog::{
    parse_genre_list, AvailabilityOffer, Candidate, OfferKind, RecommendRequest,
    RecommendResponse, ResponseStatus,
};
use clap::{Parser, Subcommand};
use colored::Colorize;
use provider::{TmdbClient, Tool, ToolParams, ToolProvider};
use server::{Orchestrator, ServerConfig};
use tracing::debug;

/// movie-agents - Movie recommendations with watch availability
#[derive(Parser)]
#[command(name = "movie-agents")]
#[command(about = "Movie recommendations resolved by cooperating agents", long_about = None)]
struct Cli {
    #[command(flatten)]
    config: ServerConfig,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Get movie recommendations
    Recommend {
        /// Free-text title search
        #[arg(long)]
        query: Option<String>,

        /// Recommend titles similar to this movie
        #[arg(long)]
        seed_movie: Option<String>,

        /// Browse a genre by name (e.g. "action") or id
        #[arg(long)]
        genre: Option<String>,

        /// Number of recommendations to return
        #[arg(long)]
        num: Option<i64>,

        /// Watch region (ISO 3166-1 alpha-2, e.g. "US")
        #[arg(long)]
        region: Option<String>,

        /// User the request is made for
        #[arg(long)]
        user_id: Option<String>,

        /// Print the raw JSON response
        #[arg(long)]
        json: bool,
    },

    /// Show where a movie can be watched
    Watch {
        /// Provider movie id
        #[arg(long)]
        movie_id: u64,

        /// Watch region (defaults to the configured region)
        #[arg(long)]
        region: Option<String>,
    },

    /// List the genre names the provider understands
    Genres,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    // Dispatch to appropriate command handler
    match cli.command {
        Commands::Recommend {
            query,
            seed_movie,
            genre,
            num,
            region,
            user_id,
            json,
        } => {
            let request = RecommendRequest {
                user_id,
                query,
                seed_movie,
                genre,
                num,
                region,
            };
            handle_recommend(&cli.config, request, json).await?
        }
        Commands::Watch { movie_id, region } => {
            handle_watch(&cli.config, movie_id, region).await?
        }
        Commands::Genres => handle_genres(&cli.config).await?,
    }

    Ok(())
}

fn build_orchestrator(config: &ServerConfig) -> Result<Orchestrator> {
    config
        .build_orchestrator()
        .context("Failed to initialise agents")
}

/// Handle the 'recommend' command
async fn handle_recommend(config: &ServerConfig, request: RecommendRequest, json: bool) -> Result<()> {
    let orchestrator = build_orchestrator(config)?;
    debug!("Routing request {:?}", request);
    let response = orchestrator
        .route(request)
        .await
        .context("Recommendation failed")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&response)?);
    } else {
        print_recommendations(&response);
    }
    Ok(())
}

/// Handle the 'watch' command
async fn handle_watch(config: &ServerConfig, movie_id: u64, region: Option<String>) -> Result<()> {
    let orchestrator = build_orchestrator(config)?;
    debug!("Looking up offers for movie {} (region {:?})", movie_id, region);
    let result = orchestrator
        .where_to_watch(movie_id, region.as_deref())
        .await
        .context("Availability lookup failed")?;

    println!(
        "{}",
        format!("Where to watch movie {} in {}:", result.movie_id, result.region)
            .bold()
            .blue()
    );
    print_offers(&result.offers);
    Ok(())
}

/// Handle the 'genres' command
async fn handle_genres(config: &ServerConfig) -> Result<()> {
    let client = TmdbClient::new(config.tmdb_config()).context("Failed to create TMDb client")?;
    debug!("Fetching genre list from {}", client.base_url());
    let body = client
        .call(Tool::ListGenres.name(), ToolParams::new())
        .await
        .context("Failed to fetch genres")?;
    let genres = parse_genre_list(&body).context("Unexpected genre list format")?;

    let mut sorted: Vec<_> = genres.into_iter().collect();
    sorted.sort();
    println!("{}", "Genres:".bold().blue());
    for (name, id) in sorted {
        println!("  {} {}", format!("{id:>6}").dimmed(), name);
    }
    Ok(())
}

/// Helper function to format and print recommendations
fn print_recommendations(response: &RecommendResponse) {
    if response.status == ResponseStatus::NoResults {
        println!(
            "{} {}",
            "No results.".yellow(),
            response.reason.as_deref().unwrap_or_default()
        );
        return;
    }

    print!("{}", "Movie Recommendations:\n".bold().blue());
    for (i, movie) in response.movies.iter().enumerate() {
        println!(
            "{}. {} ({}) [id {}]",
            (i + 1).to_string().green(),
            movie.title,
            release_year(movie).unwrap_or("????"),
            movie.id
        );
        print_offers(&movie.offers);
    }
}

fn print_offers(offers: &[AvailabilityOffer]) {
    if offers.is_empty() {
        println!("   {}", "no watch offers found".dimmed());
        return;
    }
    for kind in OfferKind::ALL {
        let names: Vec<&str> = offers
            .iter()
            .filter(|o| o.kind == kind)
            .map(|o| o.provider_name.as_str())
            .collect();
        if !names.is_empty() {
            println!("   {} {}", format!("{kind:?}:").cyan(), names.join(", "));
        }
    }
}

fn release_year(movie: &Candidate) -> Option<&str> {
    movie
        .metadata
        .get("release_date")
        .and_then(|v| v.as_str())
        .and_then(|date| date.get(..4))
        .filter(|year| !year.is_empty())
}
