mod render;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

use nextwatch_api::CatalogError;
use nextwatch_core::config::{AppConfig, ListSource};
use nextwatch_core::deeplink::StremioLinks;
use nextwatch_core::models::{DetailRecord, MediaKind};
use nextwatch_runtime::{ImportMode, Runtime, RuntimeError, API_KEY_ENV};

#[derive(Parser)]
#[command(name = "nextwatch")]
#[command(version, about = "Pick something to watch from MDBList lists")]
#[command(propagate_version = true)]
struct Cli {
    /// Debug logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Pick a random title from a list
    Pick {
        /// List ID (see `nextwatch lists`); defaults to the first list
        #[arg(short, long)]
        list: Option<u64>,

        /// Only titles in this genre
        #[arg(short, long)]
        genre: Option<String>,

        #[arg(short = 't', long = "type", value_enum)]
        media_type: Option<KindArg>,

        /// Minimum score, 0-100
        #[arg(short, long)]
        min_score: Option<u32>,

        /// Include titles from the watched list this time
        #[arg(long)]
        show_watched: bool,

        /// Refetch the list instead of using cached items
        #[arg(long)]
        refresh: bool,

        /// Open the pick in Stremio
        #[arg(long, value_enum)]
        open: Option<OpenTarget>,
    },

    /// Show curated lists
    Lists {
        /// `top` or `my`; defaults to the saved setting
        #[arg(short, long, value_parser = parse_source)]
        source: Option<ListSource>,
    },

    /// Show available genres
    Genres,

    /// Search titles by name
    Search {
        query: String,

        #[arg(short = 't', long = "type", value_enum)]
        media_type: Option<KindArg>,

        /// Show the full card for the Nth result
        #[arg(short, long)]
        pick: Option<usize>,

        #[arg(long, value_enum, requires = "pick")]
        open: Option<OpenTarget>,
    },

    /// Import watch-history CSV exports
    Import {
        #[arg(required = true, num_args = 1..)]
        files: Vec<PathBuf>,

        /// Add to the current watched list instead of replacing it
        #[arg(short, long)]
        append: bool,
    },

    /// Manage the watched list
    Watched {
        #[command(subcommand)]
        action: Option<WatchedAction>,
    },

    /// Recent picks
    History {
        #[command(subcommand)]
        action: Option<HistoryAction>,
    },

    /// Show or change settings
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },

    /// Remaining API requests
    Quota,
}

#[derive(Subcommand)]
enum WatchedAction {
    /// How many titles are imported
    Status,
    /// Forget all watched titles
    Clear,
    /// Hide watched titles from picks by default
    Hide {
        #[arg(value_enum)]
        state: Toggle,
    },
}

#[derive(Subcommand)]
enum HistoryAction {
    List,
    Clear,
    /// Open the Nth entry in Stremio
    Open {
        index: usize,

        #[arg(long, value_enum, default_value = "web")]
        target: OpenTarget,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    Show,
    /// Save the MDBList API key
    SetKey { key: String },
    /// Default list source for `lists`
    DefaultList {
        #[arg(value_parser = parse_source)]
        source: ListSource,
    },
    /// Write the current configuration to config.toml
    Save,
}

#[derive(Clone, Copy, ValueEnum)]
enum KindArg {
    Movie,
    Show,
}

impl From<KindArg> for MediaKind {
    fn from(k: KindArg) -> Self {
        match k {
            KindArg::Movie => MediaKind::Movie,
            KindArg::Show => MediaKind::Show,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum OpenTarget {
    Web,
    App,
}

#[derive(Clone, Copy, ValueEnum)]
enum Toggle {
    On,
    Off,
}

fn parse_source(s: &str) -> Result<ListSource, String> {
    ListSource::parse(s).ok_or_else(|| format!("unknown list source `{s}` (expected top or my)"))
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let _guard = init_logging(cli.verbose);

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Error: cannot start async runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    match rt.block_on(run(cli.command)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::debug!(error = ?e, "Command failed");
            eprintln!("Error: {e}");
            if let Some(hint) = hint_for(&e) {
                eprintln!("{hint}");
            }
            ExitCode::FAILURE
        }
    }
}

/// Stderr logging filtered by `RUST_LOG` (default `nextwatch=info`), plus a
/// daily rolling debug log in the data directory.
fn init_logging(verbose: bool) -> Option<WorkerGuard> {
    let default = if verbose { "nextwatch=debug" } else { "nextwatch=info" };
    let stderr_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_filter(stderr_filter);

    let log_dir = AppConfig::data_dir();
    let (file_layer, guard) = match std::fs::create_dir_all(&log_dir) {
        Ok(()) => {
            let appender = tracing_appender::rolling::daily(&log_dir, "nextwatch.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_filter(EnvFilter::new("nextwatch=debug"));
            (Some(layer), Some(guard))
        }
        Err(_) => (None, None),
    };

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(file_layer)
        .init();
    guard
}

fn hint_for(e: &RuntimeError) -> Option<String> {
    match e {
        RuntimeError::Catalog(CatalogError::MissingApiKey) => Some(format!(
            "Set one with `nextwatch config set-key <KEY>` or the {API_KEY_ENV} environment variable."
        )),
        RuntimeError::Catalog(CatalogError::RateLimited) => {
            Some("MDBList request limit reached; try again later.".into())
        }
        RuntimeError::NoListSelected => {
            Some("No lists were found for the default source; pass one with --list.".into())
        }
        _ => None,
    }
}

async fn run(command: Commands) -> Result<(), RuntimeError> {
    let app = Runtime::open().await?;

    match command {
        Commands::Pick {
            list,
            genre,
            media_type,
            min_score,
            show_watched,
            refresh,
            open,
        } => {
            let mut filters = app.default_filters().await;
            filters.genre = genre.filter(|g| !g.trim().is_empty());
            if let Some(kind) = media_type {
                filters.media_type = Some(kind.into());
            }
            if let Some(score) = min_score {
                filters.min_score = score;
            }
            if show_watched {
                filters.hide_watched = false;
            }

            let detail = app.pick_random(list, &filters, refresh).await?;
            show_detail(&app, &detail, open);
            print_quota(&app);
        }
        Commands::Lists { source } => {
            let lists = app.load_lists(source).await?;
            if lists.is_empty() {
                println!("No lists found.");
            }
            for list in &lists {
                println!("{}", render::list_line(list));
            }
            print_quota(&app);
        }
        Commands::Genres => {
            for genre in app.load_genres().await {
                println!("{}", genre.name);
            }
        }
        Commands::Search {
            query,
            media_type,
            pick,
            open,
        } => {
            let results = app.search(&query, media_type.map(Into::into)).await?;
            match pick {
                Some(n) => {
                    let Some(item) = n.checked_sub(1).and_then(|i| results.get(i)) else {
                        println!("No result #{n} ({} results).", results.len());
                        return Ok(());
                    };
                    let detail = app.show_result(item).await?;
                    show_detail(&app, &detail, open);
                }
                None if results.is_empty() => println!("No results."),
                None => {
                    for (i, item) in results.iter().enumerate() {
                        println!("{:>2}. {}", i + 1, render::headline(item));
                    }
                }
            }
            print_quota(&app);
        }
        Commands::Import { files, append } => {
            let mode = if append {
                ImportMode::Append
            } else {
                ImportMode::Replace
            };
            let outcome = app.import_watched(&files, mode).await?;
            if append {
                println!("Read {} titles.", outcome.imported);
            }
            println!("{}", app.watched_status().await);
        }
        Commands::Watched { action } => match action.unwrap_or(WatchedAction::Status) {
            WatchedAction::Status => {
                println!("{}", app.watched_status().await);
                let hidden = if app.hide_watched().await { "on" } else { "off" };
                println!("Hide watched: {hidden}");
            }
            WatchedAction::Clear => {
                app.clear_watched().await?;
                println!("{}", app.watched_status().await);
            }
            WatchedAction::Hide { state } => {
                let hide = matches!(state, Toggle::On);
                app.set_hide_watched(hide).await?;
                println!("Hide watched: {}", if hide { "on" } else { "off" });
            }
        },
        Commands::History { action } => match action.unwrap_or(HistoryAction::List) {
            HistoryAction::List => {
                let entries = app.recent_history().await;
                if entries.is_empty() {
                    println!("No picks yet.");
                }
                for (i, entry) in entries.iter().enumerate() {
                    println!("{}", render::history_line(i + 1, entry));
                }
            }
            HistoryAction::Clear => {
                app.clear_history().await?;
                println!("History cleared.");
            }
            HistoryAction::Open { index, target } => {
                let entries = app.recent_history().await;
                let Some(entry) = index.checked_sub(1).and_then(|i| entries.get(i)) else {
                    println!("No history entry #{index}.");
                    return Ok(());
                };
                match app.links_for_history(entry) {
                    Some(links) => open_link(&links, target),
                    None => println!("No IMDb ID for {}.", entry.title),
                }
            }
        },
        Commands::Config { action } => match action.unwrap_or(ConfigAction::Show) {
            ConfigAction::Show => {
                let config = app.config();
                println!("Config file:   {}", AppConfig::config_path().display());
                println!("Database:      {}", AppConfig::db_path().display());
                println!("API base URL:  {}", config.api.base_url);
                let key = match app.stored_api_key().await? {
                    Some(_) => "saved",
                    None if std::env::var(API_KEY_ENV).is_ok() => "from environment",
                    None => "not set",
                };
                println!("API key:       {key}");
                println!("Default list:  {}", app.default_list().await);
                println!("Min score:     {}", config.picker.min_score);
                println!("Hide watched:  {}", app.hide_watched().await);
                println!("Watched:       {}", app.watched_status().await);
            }
            ConfigAction::SetKey { key } => {
                app.save_settings(Some(&key), None).await?;
                println!("API key saved.");
            }
            ConfigAction::DefaultList { source } => {
                app.save_settings(None, Some(source)).await?;
                println!("Default list: {source}");
            }
            ConfigAction::Save => {
                app.config()
                    .save()
                    .map_err(|e| RuntimeError::Config(e.to_string()))?;
                println!("Wrote {}", AppConfig::config_path().display());
            }
        },
        Commands::Quota => {
            let info = app.startup().await;
            if let Err(e) = &info.lists {
                tracing::debug!(error = %e, "List lookup failed during quota check");
            }
            match info.quota {
                Some(n) => println!("{}", render::quota_line(n)),
                None => println!("Quota unknown."),
            }
        }
    }

    Ok(())
}

fn show_detail(app: &Runtime, detail: &DetailRecord, open: Option<OpenTarget>) {
    let links = app.links_for(&detail.item);
    print!("{}", render::result_card(detail, links.as_ref()));
    if let (Some(target), Some(links)) = (open, links.as_ref()) {
        open_link(links, target);
    }
}

fn open_link(links: &StremioLinks, target: OpenTarget) {
    let url = match target {
        OpenTarget::Web => &links.web,
        OpenTarget::App => &links.app,
    };
    if let Err(e) = open::that(url) {
        tracing::warn!(url, error = %e, "Failed to open link");
        println!("Open manually: {url}");
    }
}

fn print_quota(app: &Runtime) {
    if let Some(n) = app.quota() {
        println!("\n{}", render::quota_line(n));
    }
}
