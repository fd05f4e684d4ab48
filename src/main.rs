use clap::{Parser, Subcommand};
use codelab_index::engine::CardIndexEngine;
use codelab_index::normalize::clean_joined;
use codelab_index::sort::Order;
use codelab_index::{config, output, scan, view};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "codelab-index")]
#[command(about = "Codelab index pages: metadata collection, views and card filtering")]
#[command(long_about = "\
Codelab index pages: metadata collection, views and card filtering

Exported codelabs and view definitions are the data source. Each view
selects codelabs by tags and categories and becomes one index page whose
cards can be sorted and filtered, with the state carried in the URL.

Site structure:

  site/
  ├── config.toml                  # Site config (optional)
  ├── codelabs/
  │   ├── intro-web/
  │   │   └── codelab.json         # id, title, category, tags, status, duration, updated
  │   └── beacons-101/
  │       └── codelab.json
  └── views/
      ├── default/
      │   └── view.json            # Base view; other views inherit missing keys
      └── kiosk/
          └── view.json            # tags, categories, exclude, pins, sort, catLevel

Index state in the URL:
  sort=duration|recent   cat=<category>   tags=<a,b>   filter=<text>

Run 'codelab-index gen-config' to generate a documented config.toml.")]
#[command(version)]
struct Cli {
    /// Site root directory
    #[arg(long, default_value = ".", global = true)]
    root: PathBuf,

    /// Directory for intermediate files (manifest)
    #[arg(long, default_value = ".codelab-index-temp", global = true)]
    temp_dir: PathBuf,

    /// Log progress (repeat for debug output)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Collect codelab and view metadata into a manifest
    Scan,
    /// List views with their canonical URLs and selection sizes
    Views,
    /// Show the cards of one view after sorting and filtering
    Cards(CardsArgs),
    /// Validate the site root without writing anything
    Check,
    /// Print a stock config.toml with all options documented
    GenConfig,
}

#[derive(clap::Args)]
struct CardsArgs {
    /// View id
    #[arg(default_value = scan::DEFAULT_VIEW)]
    view: String,

    /// Start from a page query string, e.g. "sort=recent&tags=web"
    #[arg(long)]
    query: Option<String>,

    /// Order: alpha, duration or recent
    #[arg(long)]
    sort: Option<String>,

    /// Category filter
    #[arg(long)]
    cat: Option<String>,

    /// Comma-separated tag filter; kiosk tags from --query stay in force
    #[arg(long)]
    tags: Option<String>,

    /// Free-text filter
    #[arg(long)]
    filter: Option<String>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose)?;

    match cli.command {
        Command::Scan => {
            let config = config::load_config(&cli.root)?;
            let manifest = scan::collect(&config, &cli.root)?;
            std::fs::create_dir_all(&cli.temp_dir)?;
            let manifest_path = cli.temp_dir.join("manifest.json");
            let json = serde_json::to_string_pretty(&manifest)?;
            std::fs::write(&manifest_path, json)?;
            info!(path = %manifest_path.display(), "wrote manifest");
            output::print_scan_output(&manifest, &config.base_url);
        }
        Command::Views => {
            let config = config::load_config(&cli.root)?;
            let manifest = scan::collect(&config, &cli.root)?;
            let selections = manifest
                .views
                .values()
                .map(|v| {
                    view::select(v, &manifest.codelabs, &config.default_category).map(|s| (v, s))
                })
                .collect::<Result<Vec<_>, _>>()?;
            output::print_views(&selections, &config.base_url);
        }
        Command::Cards(args) => {
            let engine = build_engine(&cli.root, &args)?;
            output::print_cards(&engine);
        }
        Command::Check => {
            println!("==> Checking {}", cli.root.display());
            let config = config::load_config(&cli.root)?;
            let manifest = scan::collect(&config, &cli.root)?;
            for v in manifest.views.values() {
                view::select(v, &manifest.codelabs, &config.default_category)?;
            }
            output::print_scan_output(&manifest, &config.base_url);
            println!("==> Site is valid");
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Log to stderr. `RUST_LOG` wins over `-v`.
fn init_tracing(verbose: u8) -> Result<(), Box<dyn std::error::Error>> {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

/// Select a view, load its cards and apply the requested state.
///
/// A `--query` replaces the whole state; the other flags then override single
/// criteria. Without a query or `--sort`, the configured default order applies.
fn build_engine(root: &Path, args: &CardsArgs) -> Result<CardIndexEngine, Box<dyn std::error::Error>> {
    let config = config::load_config(root)?;
    let manifest = scan::collect(&config, root)?;
    let selected_view = manifest.view(&args.view)?;
    let selection = view::select(selected_view, &manifest.codelabs, &config.default_category)?;
    let mut engine = CardIndexEngine::new(view::raw_cards(selected_view, &selection.codelabs));

    match &args.query {
        Some(query) => engine.restore_from_query(query),
        None => engine.sort(config.index.default_sort),
    }
    if let Some(sort) = &args.sort {
        engine.sort(Order::from_param(sort));
    }
    if let Some(cat) = &args.cat {
        engine.filter_by_category(cat);
    }
    if let Some(tags) = &args.tags {
        engine.select_tags(clean_joined([tags]));
    }
    if let Some(text) = &args.filter {
        engine.filter_by_text(text);
    }
    Ok(engine)
}
