use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use engine::{load_session_context, DecisionCommitter, DeckStatus, EngineConfig, SwipeSession, Transition};
use records::{LatLng, RestaurantRecord, SwipeDirection};
use sources::{CandidateSource, FixedLocation, FixtureSource, PlacesApiSource, SourceError, UnavailableLocation};
use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use store::JsonFileStore;
use tracing::info;

/// swipe-deck - swipe through nearby restaurants
#[derive(Parser)]
#[command(name = "swipe-deck")]
#[command(about = "Swipe through nearby restaurants and keep the ones you like", long_about = None)]
struct Cli {
    /// TOML engine configuration
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// JSON file holding seen restaurants, favorites and stats
    #[arg(long, global = true, default_value = "swipe-deck.json")]
    store: PathBuf,

    /// Read candidates from a saved Places API response instead of the network
    #[arg(long, global = true)]
    places_file: Option<PathBuf>,

    /// Google Places API key
    #[arg(long, global = true, env = "GOOGLE_PLACES_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    #[arg(long, global = true, default_value = "local")]
    user: String,

    /// Search center latitude (the configured default location is used otherwise)
    #[arg(long, global = true, requires = "lng", allow_negative_numbers = true)]
    lat: Option<f64>,

    #[arg(long, global = true, requires = "lat", allow_negative_numbers = true)]
    lng: Option<f64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Swipe interactively (type `help` at the prompt)
    Swipe {
        /// Filter keys to enable, e.g. --filter rating4Plus --filter openNow
        #[arg(long = "filter")]
        filters: Vec<String>,
    },

    /// Swipe randomly through the deck
    Simulate {
        /// Maximum number of swipes
        #[arg(long, default_value = "20")]
        count: usize,

        /// Probability of a right swipe
        #[arg(long, default_value = "0.5")]
        like_ratio: f32,

        #[arg(long = "filter")]
        filters: Vec<String>,
    },

    /// List favorites, most recent first
    Likes,

    /// Remove a favorite
    Unlike {
        /// Restaurant id (as shown by `likes`)
        id: String,
    },

    /// Show swipe totals
    Stats,

    /// List the filter keys that can be enabled
    Filters,
}

/// The candidate sources the binary can be wired to.
enum AnySource {
    Fixture(FixtureSource),
    Places(PlacesApiSource),
}

impl CandidateSource for AnySource {
    fn name(&self) -> &str {
        match self {
            AnySource::Fixture(source) => source.name(),
            AnySource::Places(source) => source.name(),
        }
    }

    async fn fetch_nearby(
        &self,
        location: LatLng,
        radius_meters: u32,
    ) -> std::result::Result<Vec<RestaurantRecord>, SourceError> {
        match self {
            AnySource::Fixture(source) => source.fetch_nearby(location, radius_meters).await,
            AnySource::Places(source) => source.fetch_nearby(location, radius_meters).await,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => EngineConfig::load(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => EngineConfig::default(),
    };

    let store = Arc::new(
        JsonFileStore::open(&cli.store)
            .await
            .with_context(|| format!("Failed to open store at {}", cli.store.display()))?,
    );

    match &cli.command {
        Commands::Swipe { filters } => {
            let session = start_session(&cli, config, store, filters).await?;
            handle_swipe(session).await?
        }
        Commands::Simulate {
            count,
            like_ratio,
            filters,
        } => {
            let session = start_session(&cli, config, store, filters).await?;
            handle_simulate(session, *count, *like_ratio).await?
        }
        Commands::Likes => handle_likes(store, &cli.user, &config).await,
        Commands::Unlike { id } => handle_unlike(store, &cli.user, &config, id).await?,
        Commands::Stats => handle_stats(store, &cli.user, &config).await,
        Commands::Filters => handle_filters(),
    }

    Ok(())
}

fn build_source(cli: &Cli) -> Result<AnySource> {
    if let Some(path) = &cli.places_file {
        let source = FixtureSource::from_file(path)
            .with_context(|| format!("Failed to load places from {}", path.display()))?;
        return Ok(AnySource::Fixture(source));
    }
    match &cli.api_key {
        Some(key) if !key.is_empty() => Ok(AnySource::Places(PlacesApiSource::new(key.clone()))),
        _ => bail!("No candidate source: pass --places-file or set GOOGLE_PLACES_API_KEY"),
    }
}

async fn start_session(
    cli: &Cli,
    config: EngineConfig,
    store: Arc<JsonFileStore>,
    filters: &[String],
) -> Result<SwipeSession<AnySource>> {
    let source = build_source(cli)?;
    let start = Instant::now();

    let mut session = match (cli.lat, cli.lng) {
        (Some(lat), Some(lng)) => {
            let locator = FixedLocation(LatLng::new(lat, lng));
            SwipeSession::start(config, source, store, &locator, &cli.user).await
        }
        _ => {
            let locator = UnavailableLocation::new("no --lat/--lng given");
            SwipeSession::start(config, source, store, &locator, &cli.user).await
        }
    };

    if !filters.is_empty() {
        let mut set = session.filters().clone();
        for key in filters {
            if !session.filter_engine().contains(key) {
                return Err(anyhow!("Unknown filter key '{}' (see `swipe-deck filters`)", key));
            }
            set.enable(key.clone());
        }
        session.set_filters(set);
    }

    println!(
        "{} {} restaurants within {}m, {} to swipe ({:.2?})",
        "✓".green(),
        session.candidate_count(),
        session.radius_meters(),
        session.remaining_count(),
        start.elapsed()
    );
    Ok(session)
}

/// Handle the 'swipe' command
async fn handle_swipe(mut session: SwipeSession<AnySource>) -> Result<()> {
    print_help();
    let stdin = std::io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        if !print_deck(&session) {
            println!("Try `expand 1000`, another `filter`, `seen` or `reset`.");
        }
        print!("{} ", ">".bold());
        std::io::stdout().flush().context("Failed to write prompt")?;

        let Some(line) = lines.next() else {
            break;
        };
        let line = line.context("Failed to read input")?;
        let mut words = line.split_whitespace();
        let Some(command) = words.next() else {
            continue;
        };
        let argument = words.next();

        match command {
            "like" | "r" => report_swipe(session.swipe(SwipeDirection::Right), SwipeDirection::Right),
            "pass" | "l" => report_swipe(session.swipe(SwipeDirection::Left), SwipeDirection::Left),
            "drag" => {
                let Some(dx) = argument.and_then(|a| a.parse::<f32>().ok()) else {
                    println!("usage: drag <dx>");
                    continue;
                };
                drag(&mut session, dx);
            }
            "expand" => {
                let delta = argument.and_then(|a| a.parse::<u32>().ok()).unwrap_or(1000);
                let radius = session.expand_search_radius(delta).await;
                println!("Search radius is now {}m", radius);
            }
            "filter" => match argument {
                Some(key) if session.filter_engine().contains(key) => {
                    let enabled = session.toggle_filter(key);
                    println!("{} {}", key, if enabled { "on".green() } else { "off".red() });
                }
                Some(key) => println!("Unknown filter key '{}'", key),
                None => println!("Active filters: {:?}", session.filters().enabled_keys().collect::<Vec<_>>()),
            },
            "seen" => {
                let include = !session.include_previously_seen();
                session.set_include_previously_seen(include);
                println!("Previously seen restaurants {}", if include { "shown" } else { "hidden" });
            }
            "reset" => {
                let forgotten = session.reset_progress();
                println!("Forgot {} seen restaurants", forgotten);
            }
            "help" | "?" => print_help(),
            "quit" | "q" | "exit" => break,
            other => println!("Unknown command '{}', type `help`", other),
        }
    }

    finish(session).await;
    Ok(())
}

fn drag(session: &mut SwipeSession<AnySource>, dx: f32) {
    session.drag_start();
    session.drag_move(dx, 0.0);
    let position = session.active_gesture_position();
    println!("  card at {:+.0}px, tilted {:+.1}°", position.dx, position.rotation);

    match session.release() {
        Transition::Committing(direction) => {
            let record = session.current_card().cloned();
            session.animation_complete();
            report_swipe(record, direction);
        }
        Transition::SnappingBack => {
            session.animation_complete();
            println!("  {}", "snapped back".dimmed());
        }
        _ => println!("  nothing to drag"),
    }
}

/// Handle the 'simulate' command
async fn handle_simulate(mut session: SwipeSession<AnySource>, count: usize, like_ratio: f32) -> Result<()> {
    if !(0.0..=1.0).contains(&like_ratio) {
        bail!("--like-ratio must be between 0 and 1");
    }
    info!("Simulating up to {} swipes, like ratio {:.2}", count, like_ratio);

    let mut swipes = 0;
    while swipes < count && session.remaining_count() > 0 {
        let magnitude: f32 = rand::random_range(20.0..300.0);
        let dx = if rand::random::<f32>() < like_ratio { magnitude } else { -magnitude };

        session.drag_start();
        session.drag_move(dx, 0.0);
        let outcome = session.release();
        let record = session.current_card().cloned();
        session.animation_complete();

        match outcome {
            Transition::Committing(direction) => {
                report_swipe(record, direction);
                swipes += 1;
            }
            _ => println!("  {} ({:+.0}px)", "snapped back".dimmed(), dx),
        }
    }

    finish(session).await;
    Ok(())
}

/// Handle the 'likes' command
async fn handle_likes(store: Arc<JsonFileStore>, user: &str, config: &EngineConfig) {
    let context = load_session_context(store.as_ref(), user, config.timeouts.load()).await;
    let favorites = context.liked.by_most_recent();

    println!("{}", format!("Favorites ({}):", favorites.len()).bold().blue());
    for entry in favorites {
        println!(
            "{} {} {} - saved {}",
            "•".green(),
            entry.record.name.bold(),
            format_rating(&entry.record).yellow(),
            entry.saved_at.format("%Y-%m-%d %H:%M")
        );
        let vicinity = entry.record.vicinity.as_deref().unwrap_or("");
        println!("    {} {}", entry.record.id.dimmed(), vicinity);
    }
}

/// Handle the 'unlike' command
async fn handle_unlike(store: Arc<JsonFileStore>, user: &str, config: &EngineConfig, id: &str) -> Result<()> {
    let context = load_session_context(store.as_ref(), user, config.timeouts.load()).await;
    let mut committer = DecisionCommitter::spawn(store, user.to_string(), context, config.stats.flush_every);

    let removed = committer.unlike(id);
    committer.close().await;

    match removed {
        Some(entry) => {
            println!("{} Removed {} from favorites", "✓".green(), entry.record.name);
            Ok(())
        }
        None => Err(anyhow!("{} is not in your favorites", id)),
    }
}

/// Handle the 'stats' command
async fn handle_stats(store: Arc<JsonFileStore>, user: &str, config: &EngineConfig) {
    let context = load_session_context(store.as_ref(), user, config.timeouts.load()).await;
    let stats = context.stats;
    let like_rate = if stats.total_seen > 0 {
        stats.total_liked as f64 / stats.total_seen as f64 * 100.0
    } else {
        0.0
    };

    println!("{}", format!("Stats for {}:", user).bold().blue());
    println!("{}Swiped: {}", "• ".cyan(), stats.total_seen);
    println!("{}Liked: {} ({:.0}%)", "• ".cyan(), stats.total_liked, like_rate);
    println!("{}Seen restaurants stored: {}", "• ".cyan(), context.seen.len());
    println!("{}Favorites stored: {}", "• ".cyan(), context.liked.len());
}

/// Handle the 'filters' command
fn handle_filters() {
    println!("{}", "Filter keys:".bold().blue());
    for key in pipeline::default_keys() {
        println!("  {}", key);
    }
}

async fn finish(mut session: SwipeSession<AnySource>) {
    session.flush().await;
    let stats = session.stats();
    println!(
        "{} {} swiped, {} liked, {} favorites",
        "✓".green(),
        stats.total_seen,
        stats.total_liked,
        session.liked().len()
    );
    session.close().await;
}

/// Print the active card and the preview stack. Returns false when there is
/// nothing to swipe.
fn print_deck(session: &SwipeSession<AnySource>) -> bool {
    match session.deck_status() {
        DeckStatus::Empty => {
            println!("{}", "No restaurants match your filters.".yellow());
            false
        }
        DeckStatus::Exhausted => {
            println!("{}", "You've seen everything nearby.".yellow());
            false
        }
        DeckStatus::Active => {
            if let Some(card) = session.current_card() {
                println!();
                println!(
                    "{} {} {}",
                    card.name.bold(),
                    format_rating(card).yellow(),
                    format_open(card)
                );
                if let Some(vicinity) = &card.vicinity {
                    println!("  {}", vicinity.dimmed());
                }
            }
            for next in session.preview() {
                println!("  {} {}", "next:".dimmed(), next.name.dimmed());
            }
            println!("  {} left", session.remaining_count());
            true
        }
    }
}

fn report_swipe(record: Option<RestaurantRecord>, direction: SwipeDirection) {
    match record {
        Some(record) if direction.is_like() => println!("  {} {}", "♥ liked".green(), record.name),
        Some(record) => println!("  {} {}", "✗ passed".red(), record.name),
        None => println!("  nothing to swipe"),
    }
}

fn format_rating(record: &RestaurantRecord) -> String {
    match (record.rating, record.rating_count) {
        (Some(rating), Some(count)) => format!("★ {:.1} ({})", rating, count),
        (Some(rating), None) => format!("★ {:.1}", rating),
        _ => "no rating".to_string(),
    }
}

fn format_open(record: &RestaurantRecord) -> colored::ColoredString {
    match record.open_now.as_option() {
        Some(true) => "open".green(),
        Some(false) => "closed".red(),
        None => "".normal(),
    }
}

fn print_help() {
    println!("{}", "Commands:".bold());
    println!("  like | r          swipe right");
    println!("  pass | l          swipe left");
    println!("  drag <dx>         drag the card by dx pixels and let go");
    println!("  expand [meters]   widen the search radius and fetch again");
    println!("  filter [key]      toggle a filter (no key: list active filters)");
    println!("  seen              show/hide restaurants you already swiped");
    println!("  reset             forget every swipe (favorites are kept)");
    println!("  quit");
}
