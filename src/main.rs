// Paadal - Tamil film-song explorer
// Terminal front-end over the session: filter the catalog, print chart data and the playlist

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use paadal::aggregate::{Bucketed, CountEntry};
use paadal::catalog::{Catalog, Dimension, DimensionValue};
use paadal::config::{Config, LoggingConfig};
use paadal::playback::DisabledLookup;
use paadal::session::{Action, Session, SessionHandle};
use paadal::TreeOrder;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "paadal")]
#[command(about = "Explore a catalog of Tamil film songs by year, singer, composer and lyricist")]
struct Args {
    /// Enable developer logging (stderr + file)
    #[arg(long)]
    dev: bool,

    /// Config file to use instead of the per-user one
    #[arg(long)]
    config: Option<PathBuf>,

    /// Song catalog (JSON array), overrides the config
    #[arg(long)]
    catalog: Option<PathBuf>,

    #[command(flatten)]
    filters: FilterArgs,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(clap::Args)]
struct FilterArgs {
    /// Free-text search; every word must match movie, title or an artist
    #[arg(long, global = true)]
    search: Option<String>,

    #[arg(long, global = true)]
    year: Vec<u16>,

    #[arg(long, global = true)]
    composer: Vec<String>,

    #[arg(long, global = true)]
    singer: Vec<String>,

    #[arg(long, global = true)]
    lyricist: Vec<String>,

    /// Shuffle the playlist
    #[arg(long, global = true)]
    shuffle: bool,
}

impl FilterArgs {
    /// Selections to dispatch; a repeated flag selects once instead of toggling back off
    fn actions(&self) -> Vec<Action> {
        let mut actions = Vec::new();
        if let Some(search) = &self.search {
            actions.push(Action::SetSearch(search.clone()));
        }
        let years = self.year.iter().map(|&year| DimensionValue::Year(year));
        let names = [
            (Dimension::Composer, &self.composer),
            (Dimension::Singer, &self.singer),
            (Dimension::Lyricist, &self.lyricist),
        ]
        .into_iter()
        .flat_map(|(dimension, names)| {
            names
                .iter()
                .filter_map(move |name| DimensionValue::parse(dimension, name))
        });
        for value in years.chain(names) {
            let action = Action::ToggleSelected(value);
            if !actions.contains(&action) {
                actions.push(action);
            }
        }
        actions
    }
}

#[derive(Subcommand)]
enum Command {
    /// Song totals and the top artists per role
    Stats,
    /// Decade hierarchy as JSON
    Tree {
        /// Level order below the decade: lyricist or composer first
        #[arg(long, default_value = "lyricist")]
        order: TreeOrder,
    },
    /// Composer / singer / lyricist collaborations
    Collabs,
    /// The current playlist
    Playlist,
}

fn init_logging(dev: bool, logging: &LoggingConfig) -> Result<WorkerGuard> {
    std::fs::create_dir_all(&logging.directory)?;

    // Daily rotating file appender
    let file_appender = tracing_appender::rolling::daily(&logging.directory, "paadal.log");
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&logging.filter));

    let file_layer = fmt::layer()
        .with_writer(file_writer)
        .with_target(true)
        .with_level(true)
        .with_ansi(false);

    // Dev mode mirrors everything to stderr as well
    let stderr_layer = dev.then(|| fmt::layer().with_writer(std::io::stderr));

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(stderr_layer)
        .try_init()?;

    Ok(guard)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Load config - falls back to defaults if missing
    let config = match &args.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    let _guard = init_logging(args.dev, &config.logging)?;
    info!("🎵 Paadal starting up");

    let catalog_path = args.catalog.clone().unwrap_or_else(|| config.catalog_path.clone());
    let catalog = Catalog::load(&catalog_path)
        .with_context(|| format!("Failed to load catalog from {}", catalog_path.display()))?;

    let session = Session::new(Arc::new(catalog), config.session_options());
    let handle = SessionHandle::spawn(session, Arc::new(DisabledLookup));

    let mut snapshot = handle.snapshot().await?;
    for action in args.filters.actions() {
        snapshot = handle.dispatch(action).await?;
    }
    if args.filters.shuffle && !snapshot.playlist.is_shuffled {
        snapshot = handle.dispatch(Action::ToggleShuffle).await?;
    }

    match args.command.unwrap_or(Command::Stats) {
        Command::Stats => {
            println!(
                "🎵 {} of {} songs ({} active filters)",
                snapshot.filtered_songs, snapshot.total_songs, snapshot.active_filters
            );
            let dashboard = handle.query(|session| session.dashboard()).await?;
            if let (Some(first), Some(last)) = (dashboard.years.first(), dashboard.years.last()) {
                println!("📅 {} - {} across {} years", first.year, last.year, dashboard.years.len());
            }
            print_bucket("🎤 Singers", &dashboard.singers);
            print_bucket("🎹 Composers", &dashboard.composers);
            print_bucket("✍️  Lyricists", &dashboard.lyricists);
        }
        Command::Tree { order } => {
            let tree = handle.query(move |session| session.tree(order)).await?;
            println!("{}", serde_json::to_string_pretty(&tree)?);
        }
        Command::Collabs => {
            let mut collaborations = handle
                .query(|session| session.networks().collaborations)
                .await?;
            collaborations.sort_by(|a, b| b.song_count().cmp(&a.song_count()));
            for collab in collaborations {
                let years: Vec<String> = collab.years.iter().map(u16::to_string).collect();
                println!(
                    "{} x {} x {} - {} songs ({}) in {}",
                    collab.composer,
                    collab.singer,
                    collab.lyricist,
                    collab.song_count(),
                    years.join(", "),
                    collab.movies.iter().cloned().collect::<Vec<_>>().join(", ")
                );
            }
        }
        Command::Playlist => {
            let playlist = &snapshot.playlist;
            let current = playlist.clamped_index();
            println!(
                "🎶 {} songs{}",
                playlist.len(),
                if playlist.is_shuffled { " (shuffled)" } else { "" }
            );
            for (index, song) in playlist.order.iter().enumerate() {
                let marker = if index == current { "▶" } else { " " };
                println!("{} {:>3}. {}", marker, index + 1, song.display_line());
            }
        }
    }

    Ok(())
}

fn print_bucket(title: &str, bucketed: &Bucketed<CountEntry>) {
    println!("{}", title);
    for entry in &bucketed.kept {
        println!("  {:<32} {}", entry.key.to_string(), entry.count);
    }
    if let Some(others) = &bucketed.others {
        println!("  {:<32} {}", others.label, others.count);
    }
}
