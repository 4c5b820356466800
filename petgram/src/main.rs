//! Operator CLI for inspecting and seeding the realtime database.

use std::ffi::OsString;
use std::io::{self, Write};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Context, Result, eyre};
use mockable::{Clock, DefaultClock};
use ortho_config::OrthoConfig;
use tokio::runtime::Builder;
use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt};
use url::Url;

use petgram::config::PetgramSettings;
use petgram::domain::{CategoryFilter, Post, PostService, SeedingResult};
use petgram::fixtures::load_fixture_posts;
use petgram::outbound::RealtimeDbStore;

/// Inspect and seed the Petgram feed.
#[derive(Debug, Parser)]
#[command(name = "petgram", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List posts newest first.
    Posts {
        /// Restrict the listing to one category (dog, cat, bird, other).
        #[arg(long, default_value_t = CategoryFilter::All)]
        category: CategoryFilter,
    },
    /// Write the fixture posts when the posts collection is empty.
    Seed,
    /// Overwrite the posts collection with the fixture posts.
    ForceSeed,
}

fn main() -> Result<()> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let cli = Cli::parse();
    let settings = PetgramSettings::load_from_iter([OsString::from("petgram")])
        .wrap_err("failed to load petgram settings")?;

    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .wrap_err("failed to build petgram runtime")?;
    runtime.block_on(execute(cli.command, &settings))
}

async fn execute(command: Command, settings: &PetgramSettings) -> Result<()> {
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    let store = Arc::new(build_store(settings, Arc::clone(&clock))?);
    let posts = PostService::new(store, Arc::clone(&clock));
    let mut stdout = io::stdout().lock();

    match command {
        Command::Posts { category } => {
            let listed = posts.list_posts().await;
            for post in category.apply(&listed) {
                writeln!(stdout, "{}", describe(&post)).wrap_err("failed to write listing")?;
            }
        }
        Command::Seed => {
            let fixtures = load_fixture_posts(settings.fixtures_path(), clock.utc())
                .wrap_err("failed to load fixture posts")?;
            let outcome = posts
                .seed_if_empty(&fixtures)
                .await
                .wrap_err("failed to seed posts")?;
            let summary = match outcome {
                SeedingResult::Applied => format!("seeded {} posts", fixtures.len()),
                SeedingResult::AlreadySeeded => "posts already present; nothing written".to_owned(),
            };
            writeln!(stdout, "{summary}").wrap_err("failed to write summary")?;
        }
        Command::ForceSeed => {
            let fixtures = load_fixture_posts(settings.fixtures_path(), clock.utc())
                .wrap_err("failed to load fixture posts")?;
            posts
                .force_seed(&fixtures)
                .await
                .wrap_err("failed to force seed posts")?;
            writeln!(stdout, "replaced posts with {} fixtures", fixtures.len())
                .wrap_err("failed to write summary")?;
        }
    }
    Ok(())
}

fn build_store(settings: &PetgramSettings, clock: Arc<dyn Clock>) -> Result<RealtimeDbStore> {
    let raw = settings
        .database_url()
        .ok_or_else(|| eyre!("PETGRAM_DATABASE_URL must be set"))?;
    let base = Url::parse(raw).with_context(|| format!("invalid database url '{raw}'"))?;
    RealtimeDbStore::new(
        base,
        settings.request_timeout(),
        settings.database_auth().map(ToOwned::to_owned),
        clock,
    )
    .wrap_err("failed to build realtime database client")
}

fn describe(post: &Post) -> String {
    format!(
        "{} {} [{}] @{} {} likes {} comments: {}",
        post.timestamp.to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
        post.id,
        post.category,
        post.username,
        post.like_count(),
        post.comment_count(),
        post.caption,
    )
}
