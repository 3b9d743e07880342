//! `concerto` - browse festivals, star sets and plan a day from the terminal.

mod render;

use std::path::PathBuf;

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use directories::ProjectDirs;
use shared::data::LOAD_FAILED_MESSAGE;
use shared::lineup::lineup_day_keys;
use shared::{
    find_festival, load_festivals, Bookmarks, CatalogQuery, CatalogState, Config, DetailView,
    Festival, FileStorage, PlanEndpointClient, PlanRequest, SlotKey, SortMode,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const BOOKMARKS_FILE_NAME: &str = "bookmarks.json";

#[derive(Debug, Parser)]
#[command(name = "concerto", version, about = "Festival directory and day planner")]
struct Cli {
    /// Festival document (path or http(s) URL)
    #[arg(long, global = true, env = "FESTIVALS_DATA")]
    data: Option<String>,

    /// File holding saved sets
    #[arg(long, global = true, env = "CONCERTO_BOOKMARKS")]
    bookmarks: Option<PathBuf>,

    /// Deployed plan endpoint URL
    #[arg(long, global = true, env = "PLAN_ENDPOINT")]
    endpoint: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List festivals matching the filters
    List {
        /// Free-text search over name, city, state, venue and genres
        #[arg(long, default_value = "")]
        q: String,
        /// Full month name, or "all"
        #[arg(long, default_value = shared::catalog::ALL)]
        month: String,
        /// Genre, or "all"
        #[arg(long, default_value = shared::catalog::ALL)]
        genre: String,
        /// "soonest" or "name"
        #[arg(long, default_value_t = SortMode::Soonest)]
        sort: SortMode,
    },
    /// Show the months and genres available for filtering
    Filters,
    /// Show one festival's detail page
    Show {
        id: String,
        /// Day key to open, or "__myday__"
        #[arg(long)]
        tab: Option<String>,
    },
    /// Save or unsave a set
    Star {
        id: String,
        day: String,
        stage: String,
        artist: String,
        time: String,
    },
    /// Generate a one-day plan
    Plan {
        id: String,
        /// Day key; defaults to the first day of the lineup
        #[arg(long)]
        day: Option<String>,
        /// What you care about today
        #[arg(long, default_value = "")]
        prompt: String,
        /// Leave saved sets out of the request
        #[arg(long)]
        no_saved: bool,
    },
}

fn default_bookmarks_path() -> Option<PathBuf> {
    ProjectDirs::from("app", "concerto", "concerto")
        .map(|dirs| dirs.data_dir().join(BOOKMARKS_FILE_NAME))
}

async fn load(source: &str) -> Result<Vec<Festival>> {
    load_festivals(source)
        .await
        .map_err(|e| anyhow!("{}: {}", LOAD_FAILED_MESSAGE, e.message()))
}

fn slot_key(festival: &Festival, day: &str, stage: &str, artist: &str, time: &str) -> Result<SlotKey> {
    let slot = festival
        .lineup
        .as_ref()
        .and_then(|l| l.day(day))
        .and_then(|d| d.stages.iter().find(|s| s.name == stage))
        .and_then(|s| s.slots.iter().find(|slot| slot.artist == artist && slot.time == time))
        .ok_or_else(|| anyhow!("No {} set at {} on {} / {}", artist, time, day, stage))?;
    Ok(SlotKey::new(&festival.id, day, stage, slot))
}

async fn plan(
    festival: &Festival,
    bookmarks: &Bookmarks<FileStorage>,
    endpoint: Option<&str>,
    day: Option<String>,
    prompt: &str,
    no_saved: bool,
) -> Result<String> {
    let day_keys = lineup_day_keys(festival.lineup.as_ref());
    let Some(first_day) = day_keys.first() else {
        return Ok(render::no_lineup());
    };
    let day = day.unwrap_or_else(|| first_day.clone());
    if !day_keys.contains(&day) {
        bail!("Unknown day {} (available: {})", day, day_keys.join(", "));
    }
    let endpoint = endpoint.context("No plan endpoint configured (set --endpoint or PLAN_ENDPOINT)")?;

    let saved = (!no_saved).then(|| bookmarks.load(&festival.id));
    let request = PlanRequest::for_day(festival, &day, prompt, saved.as_ref())?;

    info!(festival = %festival.id, day = %day, "Generating plan");

    match PlanEndpointClient::new(endpoint).request_plan(&request).await {
        Ok(day_plan) => Ok(render::plan(&day_plan)),
        Err(e) => {
            warn!("Plan request failed: {}", e);
            Ok(render::plan_error(&e.message()))
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = Config::from_env();
    let source = cli.data.unwrap_or(config.data_source);
    let festivals = load(&source).await?;

    let bookmarks_path = cli
        .bookmarks
        .or_else(default_bookmarks_path)
        .context("Could not determine a bookmarks file location")?;
    let mut bookmarks = Bookmarks::new(FileStorage::new(bookmarks_path), config.bookmark_namespace);

    match cli.command {
        Command::List { q, month, genre, sort } => {
            let state = CatalogState::new(festivals).with_sort_mode(sort);
            let query = CatalogQuery { term: q, month, genre };
            println!("{}", render::catalog(&state.render(&query)));
        }
        Command::Filters => {
            let state = CatalogState::new(festivals);
            println!("{}", render::filters(&state.filter_options()));
        }
        Command::Show { id, tab } => {
            let festival = find_festival(&festivals, Some(&id)).map_err(|e| anyhow!(e.message()))?;
            let saved = bookmarks.load(&festival.id);
            let mut view = DetailView::build(festival, &saved, &config.city_guide_base);
            if let (Some(tab), Some(lineup)) = (tab, view.lineup.as_mut()) {
                lineup.select(&tab);
            }
            println!("{}", render::detail(&view));
        }
        Command::Star { id, day, stage, artist, time } => {
            let festival = find_festival(&festivals, Some(&id)).map_err(|e| anyhow!(e.message()))?;
            let key = slot_key(festival, &day, &stage, &artist, &time)?;
            let now_saved = bookmarks.toggle(&festival.id, key)?;
            println!("{} {} at {}", if now_saved { "★ Saved" } else { "☆ Removed" }, artist, time);

            let saved = bookmarks.load(&festival.id);
            if let Some(mut lineup) = shared::LineupView::build(festival, &saved) {
                lineup.select(&day);
                println!("\n{}", render::lineup(&lineup));
            }
        }
        Command::Plan { id, day, prompt, no_saved } => {
            let festival = find_festival(&festivals, Some(&id)).map_err(|e| anyhow!(e.message()))?;
            let output = plan(festival, &bookmarks, cli.endpoint.as_deref(), day, &prompt, no_saved).await?;
            println!("{}", output);
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    run(Cli::parse()).await
}
