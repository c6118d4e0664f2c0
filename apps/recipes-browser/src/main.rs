use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use mimalloc::MiMalloc;
use query_core::SortDir;
use recipes::config::RecipesConfig;
use recipes::contract::error::ControllerError;
use recipes::contract::model::{AccessLevel, Document, PaginationState, CATEGORY_FIELD};
use recipes::infra::storage::InMemoryStore;
use recipes::Recipes;
use runtime::{AppConfig, CliArgs};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

/// Recipes shipped with the binary, used when no fixture file is given.
const SAMPLE_RECIPES: &str = include_str!("../data/recipes.json");

/// Recipes Browser - page through a recipe collection
#[derive(Parser)]
#[command(name = "recipes-browser")]
#[command(about = "Recipes Browser - page through a recipe collection")]
#[command(version = "0.1.0")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print current configuration and exit
    #[arg(long)]
    print_config: bool,

    /// Log verbosity level (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// JSON file with documents to seed the store with
    #[arg(long)]
    fixtures: Option<PathBuf>,

    /// Only show recipes in this category
    #[arg(long)]
    category: Option<String>,

    /// Publish date order: asc or desc
    #[arg(long)]
    order: Option<SortDir>,

    /// Recipes per page (overrides config)
    #[arg(long)]
    page_size: Option<u32>,

    /// How many pages to load
    #[arg(long, global = true, default_value_t = 1)]
    pages: u32,

    /// Include unpublished recipes
    #[arg(long)]
    elevated: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Load pages and print them
    Browse,
    /// Check configuration
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let args = CliArgs {
        config: cli.config.as_ref().map(|p| p.to_string_lossy().to_string()),
        print_config: cli.print_config,
        verbose: cli.verbose,
    };

    let mut config = AppConfig::load_or_default(cli.config.as_deref())?;
    config.apply_cli_overrides(&args);

    let logging_config = config.logging.as_ref().cloned().unwrap_or_default();
    runtime::logging::init_logging_from_config(&logging_config, Path::new(&config.log_dir));
    tracing::info!("Recipes Browser starting");

    if cli.print_config {
        println!("{}", config.to_yaml()?);
        return Ok(());
    }

    let recipes_cfg: RecipesConfig = config.module_config("recipes")?;

    match &cli.command {
        Some(Commands::Check) => check_config(&config, &recipes_cfg),
        Some(Commands::Browse) | None => browse(&cli, &recipes_cfg).await,
    }
}

async fn browse(cli: &Cli, cfg: &RecipesConfig) -> Result<()> {
    if cli.pages == 0 {
        bail!("--pages must be at least 1");
    }

    let fixtures = match &cli.fixtures {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read fixtures from {}", path.display()))?,
        None => SAMPLE_RECIPES.to_string(),
    };
    let store = Arc::new(InMemoryStore::new());
    let loaded = store.load_fixtures(&cfg.collection, &fixtures)?;
    tracing::info!(loaded, collection = %cfg.collection, "Store seeded");

    let access = if cli.elevated {
        AccessLevel::Elevated
    } else {
        AccessLevel::Public
    };
    let module = Recipes::init(cfg, store, access);
    let api = module.api();
    let controller = module.controller();

    let mut changed = false;
    if let Some(dir) = cli.order {
        api.set_order(dir)?;
        changed = true;
    }
    if let Some(size) = cli.page_size {
        api.set_page_size(size)?;
        changed = true;
    }
    if let Some(category) = cli.category.as_deref() {
        api.set_category_filter(Some(category))?;
        changed = true;
    }
    if !changed {
        module.start()?;
    }

    let mut state = controller.settled().await;
    let mut shown = 0;
    for page in 1..=cli.pages {
        if let Some(err) = state.error() {
            bail!("Fetch failed: {}", err);
        }
        println!("--- page {} ---", page);
        for doc in &state.accumulated[shown..] {
            println!("{}", render(doc));
        }
        shown = state.accumulated.len();

        if page == cli.pages {
            break;
        }
        match api.load_more() {
            Ok(()) => state = controller.settled().await,
            Err(ControllerError::NoMoreResults | ControllerError::NoCursorAvailable) => break,
            Err(e) => return Err(e.into()),
        }
    }

    print_summary(&state);
    Ok(())
}

fn render(doc: &Document) -> String {
    let date = doc
        .published_at()
        .map(|dt| dt.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "----------".to_string());
    let marker = if doc.is_published() { ' ' } else { '*' };
    format!(
        "{}{}  {:<28} {:<26} {}",
        marker,
        date,
        doc.get_str("name").unwrap_or("(untitled)"),
        doc.get_str(CATEGORY_FIELD).unwrap_or("-"),
        doc.id
    )
}

fn print_summary(state: &PaginationState) {
    let more = if state.has_more { "yes" } else { "no" };
    println!(
        "{} recipes shown, more available: {}",
        state.accumulated.len(),
        more
    );
}

fn check_config(config: &AppConfig, recipes_cfg: &RecipesConfig) -> Result<()> {
    tracing::info!("Checking configuration...");
    if recipes_cfg.default_page_size == 0 {
        bail!("modules.recipes.default_page_size must be positive");
    }
    println!("Configuration check passed");
    println!("{}", config.to_yaml()?);
    Ok(())
}
